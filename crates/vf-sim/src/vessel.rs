//! Vessel state and the per-mode pressure update.

use vf_core::constants::R_UNIVERSAL;
use vf_core::units::{Pressure, Temperature, Volume, k, m3, pa};
use vf_fluids::{Composition, GasProperties, PropertyProvider};

use crate::config::{InitialConditions, OperatingMode, VesselSpec};
use crate::error::SimResult;

/// Lowest absolute pressure (Pa) an evolving vessel may reach.
pub const PRESSURE_FLOOR_PA: f64 = 1.0;

/// Pressure/Z passes per property refresh.
const REFRESH_PASSES: usize = 2;

/// Lumped state of one rigid, isothermal vessel.
#[derive(Clone, Debug)]
pub struct VesselState {
    pub pressure: Pressure,
    pub temperature: Temperature,
    pub volume: Volume,
    /// Gas inventory, mol
    pub moles: f64,
    /// Properties at the current pressure and temperature
    pub props: GasProperties,
}

impl VesselState {
    /// Vessel at `spec` with its inventory from PV = ZnRT.
    pub fn new(spec: &VesselSpec, props: GasProperties) -> Self {
        let mut vessel = Self {
            pressure: pa(spec.pressure),
            temperature: k(spec.temperature),
            volume: m3(spec.volume),
            moles: 0.0,
            props,
        };
        vessel.moles = vessel.moles_at(spec.pressure);
        vessel
    }

    /// Z·R·T/V, the pressure rise per mole added (Pa/mol).
    fn pressure_per_mole(&self) -> f64 {
        self.props.z * R_UNIVERSAL * self.temperature.value / self.volume.value
    }

    fn moles_at(&self, pressure: f64) -> f64 {
        pressure / self.pressure_per_mole()
    }

    /// Pressure of the current inventory under the current Z.
    fn pressure_of_inventory(&self) -> f64 {
        self.moles * self.pressure_per_mole()
    }
}

/// Rates and transfer produced by one update.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VesselUpdate {
    /// Pa/s, zero for a boundary vessel
    pub dp_dt_upstream: f64,
    /// Pa/s, zero for a boundary vessel
    pub dp_dt_downstream: f64,
    /// Moles that left the source this step
    pub moles_transferred: f64,
    /// The source hit [`PRESSURE_FLOOR_PA`] and the transfer was cut.
    pub floor_clamped: bool,
}

/// Both vessels plus the rule for which of them evolves.
#[derive(Clone, Debug)]
pub struct VesselPair {
    pub mode: OperatingMode,
    pub upstream: VesselState,
    pub downstream: VesselState,
}

impl VesselPair {
    pub fn new(
        mode: OperatingMode,
        initial: &InitialConditions,
        upstream_props: GasProperties,
        downstream_props: GasProperties,
    ) -> Self {
        Self {
            mode,
            upstream: VesselState::new(&initial.upstream, upstream_props),
            downstream: VesselState::new(&initial.downstream, downstream_props),
        }
    }

    /// Advance pressures by one forward-Euler step.
    ///
    /// `mass_flow` (kg/s) leaves upstream and enters downstream; it becomes a
    /// molar rate through `molar_mass` (kg/mol). Boundary vessels keep their
    /// pressure and inventory.
    pub fn step(&mut self, mass_flow: f64, molar_mass: f64, dt: f64) -> VesselUpdate {
        let mut dn = mass_flow / molar_mass * dt;
        let mut floor_clamped = false;

        if self.mode.upstream_evolves() {
            let up = &self.upstream;
            let p_next = up.pressure.value - dn * up.pressure_per_mole();
            if p_next < PRESSURE_FLOOR_PA {
                dn = ((up.pressure.value - PRESSURE_FLOOR_PA) / up.pressure_per_mole()).max(0.0);
                floor_clamped = true;
            }
        }

        let molar_rate = dn / dt;
        let mut update = VesselUpdate {
            moles_transferred: dn,
            floor_clamped,
            ..VesselUpdate::default()
        };

        if self.mode.upstream_evolves() {
            let up = &mut self.upstream;
            update.dp_dt_upstream = -molar_rate * up.pressure_per_mole();
            up.pressure = if floor_clamped {
                pa(PRESSURE_FLOOR_PA)
            } else {
                pa(up.pressure.value + update.dp_dt_upstream * dt)
            };
            up.moles -= dn;
        }
        if self.mode.downstream_evolves() {
            let down = &mut self.downstream;
            update.dp_dt_downstream = molar_rate * down.pressure_per_mole();
            down.pressure = pa(down.pressure.value + update.dp_dt_downstream * dt);
            down.moles += dn;
        }

        update
    }

    /// Re-evaluate properties of every evolving vessel.
    ///
    /// The inventory is the integrated state: Z is evaluated at the stepped
    /// pressure, then the pressure is re-derived from n·Z·R·T/V, twice.
    /// A vessel re-derived below the floor is held there with its inventory
    /// matched to the floor pressure.
    pub fn refresh_properties(
        &mut self,
        provider: &dyn PropertyProvider,
        composition: &Composition,
    ) -> SimResult<()> {
        let mode = self.mode;
        for (evolves, vessel) in [
            (mode.upstream_evolves(), &mut self.upstream),
            (mode.downstream_evolves(), &mut self.downstream),
        ] {
            if !evolves {
                continue;
            }
            for _ in 0..REFRESH_PASSES {
                let props =
                    provider.properties(composition, vessel.pressure, vessel.temperature)?;
                props.validate()?;
                vessel.props = props;
                let p = vessel.pressure_of_inventory();
                if p < PRESSURE_FLOOR_PA {
                    vessel.pressure = pa(PRESSURE_FLOOR_PA);
                    vessel.moles = vessel.moles_at(PRESSURE_FLOOR_PA);
                } else {
                    vessel.pressure = pa(p);
                }
            }
        }
        Ok(())
    }

    /// Vessel whose state is reported: downstream unless only upstream evolves.
    pub fn reported(&self) -> &VesselState {
        match self.mode {
            OperatingMode::ReceiverConstant => &self.upstream,
            OperatingMode::SupplyConstant | OperatingMode::BothEvolve => &self.downstream,
        }
    }

    pub fn total_moles(&self) -> f64 {
        self.upstream.moles + self.downstream.moles
    }
}
