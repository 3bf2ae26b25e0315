//! End-to-end runs of the three operating modes with constant gas properties.

use vf_components::{FlowRegime, OpeningProfile, ValveAction};
use vf_core::constants::R_UNIVERSAL;
use vf_core::units::eng;
use vf_sim::{
    GuardEvent, InitialConditions, OperatingMode, PRESSURE_FLOOR_PA, PropertySource, RunOutcome,
    RunStatus, SimulationConfig, SimulationDriver, VesselSpec,
};

const T: f64 = 300.0;
const M_AIR: f64 = 0.029;

fn vessel(pressure: f64, volume: f64) -> VesselSpec {
    VesselSpec {
        pressure,
        temperature: T,
        volume,
    }
}

fn air() -> PropertySource {
    PropertySource::Manual {
        z: 1.0,
        k: 1.4,
        molar_mass: M_AIR,
    }
}

fn run(config: SimulationConfig, initial: InitialConditions) -> RunOutcome {
    SimulationDriver::new(config, initial).unwrap().run_to_end()
}

/// 500 psia supply into a near-vacuum 1 m³ receiver through a 1 inch bore,
/// linear opening over 5 s.
fn fill_scenario() -> (SimulationConfig, InitialConditions) {
    let config = SimulationConfig {
        mode: OperatingMode::SupplyConstant,
        opening_time: Some(5.0),
        time_step: 0.05,
        max_simulation_time: Some(120.0),
        properties: air(),
        ..SimulationConfig::new(eng::bore_area_from_inch(1.0))
    };
    let initial = InitialConditions {
        upstream: vessel(eng::psia_to_pa(500.0), 1.0),
        downstream: vessel(100.0, 1.0),
    };
    (config, initial)
}

#[test]
fn choked_then_subsonic_fill() {
    let (config, initial) = fill_scenario();
    let p_supply = initial.upstream.pressure;
    let outcome = run(config, initial);
    let rows = &outcome.rows;

    assert_eq!(outcome.status, RunStatus::Converged);
    let kpi = outcome.kpi.unwrap();
    assert!(kpi.completed);

    // Choked from the first step
    for row in &rows[1..10] {
        assert_eq!(row.flow_regime, FlowRegime::Choked, "t = {}", row.time);
    }

    // Supply held, receiver only rises
    assert!(rows.iter().all(|r| r.upstream_pressure == p_supply));
    for pair in rows.windows(2) {
        assert!(pair[1].downstream_pressure >= pair[0].downstream_pressure);
    }

    // Flat maximum flow while choked with the valve fully open
    let open_choked: Vec<f64> = rows
        .iter()
        .filter(|r| r.time > 5.0 + 1e-9 && r.flow_regime == FlowRegime::Choked)
        .map(|r| r.mass_flow_rate)
        .collect();
    assert!(open_choked.len() > 10);
    assert!(open_choked.iter().all(|&m| m == open_choked[0]));
    assert_eq!(kpi.peak_flow_rate, open_choked[0]);
    assert!(kpi.peak_flow_rate > 2.5 && kpi.peak_flow_rate < 2.8);

    // One-way transition, then decaying flow
    let first_subsonic = rows
        .iter()
        .position(|r| r.flow_regime == FlowRegime::Subsonic)
        .expect("reaches subsonic flow");
    assert!(
        rows[first_subsonic..]
            .iter()
            .all(|r| r.flow_regime != FlowRegime::Choked)
    );
    let subsonic: Vec<f64> = rows[first_subsonic..]
        .iter()
        .filter(|r| r.flow_regime == FlowRegime::Subsonic)
        .map(|r| r.mass_flow_rate)
        .collect();
    for pair in subsonic.windows(2) {
        assert!(pair[1] <= pair[0]);
    }

    // Receiver ends at the supply pressure
    let last = rows.last().unwrap();
    assert!(last.mass_flow_rate < 1e-3 * kpi.peak_flow_rate);
    assert!((kpi.final_pressure - p_supply).abs() / p_supply < 1e-3);
    assert_eq!(kpi.equilibrium_time, last.time);
}

#[test]
fn transferred_mass_matches_receiver_inventory() {
    let (config, initial) = fill_scenario();
    let p0 = initial.downstream.pressure;
    let kpi = run(config, initial).kpi.unwrap();
    let gained = (kpi.final_pressure - p0) * 1.0 / (R_UNIVERSAL * T) * M_AIR;
    let rel = (kpi.total_mass_transferred - gained).abs() / gained;
    assert!(
        rel < 0.01,
        "integrated {} kg vs inventory {} kg",
        kpi.total_mass_transferred,
        gained
    );
}

#[test]
fn identical_runs_are_identical() {
    let (config, initial) = fill_scenario();
    let a = run(config.clone(), initial);
    let b = run(config, initial);
    assert_eq!(a.rows, b.rows);
    assert_eq!(a.kpi, b.kpi);
}

#[test]
fn zero_opening_at_start_gives_exact_zero_flow() {
    let (config, initial) = fill_scenario();
    let driver = SimulationDriver::new(config, initial).unwrap();
    let first = &driver.rows()[0];
    assert_eq!(first.valve_opening_fraction, 0.0);
    assert_eq!(first.mass_flow_rate, 0.0);
    assert!(!first.mass_flow_rate.is_nan());
}

#[test]
fn linear_profile_is_half_open_at_half_time() {
    let (config, initial) = fill_scenario();
    let rows = run(config, initial).rows;
    let mid = rows
        .iter()
        .find(|r| (r.time - 2.5).abs() < 1e-9)
        .expect("row at t = 2.5 s");
    assert!((mid.valve_opening_fraction - 0.5).abs() < 1e-9);
}

#[test]
fn fixed_instant_is_open_from_first_row() {
    let config = SimulationConfig {
        mode: OperatingMode::ReceiverConstant,
        opening_profile: OpeningProfile::FixedInstant,
        max_simulation_time: Some(300.0),
        properties: air(),
        ..SimulationConfig::new(1e-4)
    };
    let initial = InitialConditions {
        upstream: vessel(1.0e6, 0.1),
        downstream: vessel(101_325.0, 1.0),
    };
    let outcome = run(config, initial);
    assert_eq!(outcome.status, RunStatus::Converged);
    assert!(outcome.rows.iter().all(|r| r.valve_opening_fraction == 1.0));
}

#[test]
fn receiver_constant_drains_to_sink() {
    let config = SimulationConfig {
        mode: OperatingMode::ReceiverConstant,
        opening_time: Some(1.0),
        max_simulation_time: Some(300.0),
        properties: air(),
        ..SimulationConfig::new(1e-4)
    };
    let initial = InitialConditions {
        upstream: vessel(1.0e6, 0.1),
        downstream: vessel(101_325.0, 1.0),
    };
    let outcome = run(config, initial);
    assert_eq!(outcome.status, RunStatus::Converged);

    let rows = &outcome.rows;
    assert!(rows.iter().all(|r| r.downstream_pressure == 101_325.0));
    for pair in rows.windows(2) {
        assert!(pair[1].upstream_pressure <= pair[0].upstream_pressure);
        assert!(pair[1].dp_dt_upstream <= 0.0);
    }
    let kpi = outcome.kpi.unwrap();
    assert!((kpi.final_pressure - 101_325.0).abs() / 101_325.0 < 1e-3);
}

#[test]
fn both_evolve_conserves_inventory() {
    let (v_up, v_down) = (0.3, 0.7);
    let config = SimulationConfig {
        mode: OperatingMode::BothEvolve,
        opening_time: Some(2.0),
        max_simulation_time: Some(300.0),
        properties: air(),
        ..SimulationConfig::new(2e-4)
    };
    let initial = InitialConditions {
        upstream: vessel(2.0e6, v_up),
        downstream: vessel(2.0e5, v_down),
    };
    let inventory = |p_up: f64, p_down: f64| (p_up * v_up + p_down * v_down) / (R_UNIVERSAL * T);
    let n0 = inventory(2.0e6, 2.0e5);

    let outcome = run(config, initial);
    assert_eq!(outcome.status, RunStatus::Converged);
    for row in &outcome.rows {
        let n = inventory(row.upstream_pressure, row.downstream_pressure);
        assert!((n - n0).abs() / n0 < 1e-9, "t = {}", row.time);
    }

    // Equalized pressure follows from the shared inventory
    let p_eq = n0 * R_UNIVERSAL * T / (v_up + v_down);
    let kpi = outcome.kpi.unwrap();
    assert!((kpi.final_pressure - p_eq).abs() / p_eq < 1e-3);
}

#[test]
fn closing_valve_stops_flow_at_travel_time() {
    let config = SimulationConfig {
        mode: OperatingMode::BothEvolve,
        valve_action: ValveAction::Closing,
        opening_profile: OpeningProfile::QuickActing,
        opening_time: Some(2.0),
        properties: air(),
        ..SimulationConfig::new(1e-4)
    };
    let initial = InitialConditions {
        upstream: vessel(1.0e6, 1.0),
        downstream: vessel(1.0e5, 1.0),
    };
    let outcome = run(config, initial);
    assert_eq!(outcome.status, RunStatus::Converged);

    let rows = &outcome.rows;
    assert_eq!(rows[0].valve_opening_fraction, 1.0);
    let last = rows.last().unwrap();
    assert!(last.valve_opening_fraction < 1e-9);
    assert!((last.time - 2.0).abs() < 1e-6);
    // Valve shut before the vessels could equalize
    assert!(last.upstream_pressure > last.downstream_pressure);
}

#[test]
fn draining_vessel_is_held_at_pressure_floor() {
    let config = SimulationConfig {
        mode: OperatingMode::ReceiverConstant,
        opening_profile: OpeningProfile::FixedInstant,
        properties: air(),
        ..SimulationConfig::new(1e-3)
    };
    let initial = InitialConditions {
        upstream: vessel(1.0e5, 0.001),
        downstream: vessel(1.0, 1.0),
    };
    let outcome = run(config, initial);
    let rows = &outcome.rows;

    assert!(rows.iter().all(|r| r.upstream_pressure >= PRESSURE_FLOOR_PA));
    let clamped = &rows[1];
    assert_eq!(clamped.guard, Some(GuardEvent::PressureFloor));
    assert_eq!(clamped.flow_regime, FlowRegime::None);
    assert_eq!(clamped.upstream_pressure, PRESSURE_FLOOR_PA);
    assert_eq!(outcome.status, RunStatus::Converged);
}
