//! Writers for the run message stream.

use std::io::Write;

use clap::ValueEnum;

use crate::error::CliResult;
use vf_core::units::eng;
use vf_sim::{GuardEvent, SimulationRow, StreamMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One JSON message per line, SI units
    #[default]
    Jsonl,
    /// Rows only, engineering units
    Csv,
}

pub const CSV_HEADER: &str = "time_s,upstream_psig,downstream_psig,mass_flow_lb_hr,\
opening_pct,regime,z,k,molar_mass_g_mol,dp_dt_upstream_psi_s,dp_dt_downstream_psi_s,guard";

pub struct MessageWriter<W: Write> {
    format: OutputFormat,
    out: W,
}

impl<W: Write> MessageWriter<W> {
    pub fn new(format: OutputFormat, mut out: W) -> CliResult<Self> {
        if format == OutputFormat::Csv {
            writeln!(out, "{CSV_HEADER}")?;
        }
        Ok(Self { format, out })
    }

    pub fn write(&mut self, message: &StreamMessage) -> CliResult<()> {
        match self.format {
            OutputFormat::Jsonl => {
                serde_json::to_writer(&mut self.out, message)?;
                writeln!(self.out)?;
            }
            OutputFormat::Csv => {
                for row in message.rows() {
                    writeln!(self.out, "{}", csv_line(row))?;
                }
            }
        }
        Ok(())
    }

    pub fn finish(mut self) -> CliResult<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

fn csv_line(row: &SimulationRow) -> String {
    let guard = match row.guard {
        Some(GuardEvent::PressureFloor) => "pressure-floor",
        Some(GuardEvent::BracketClamp) => "bracket-clamp",
        None => "",
    };
    format!(
        "{:.3},{:.4},{:.4},{:.3},{:.2},{},{:.5},{:.5},{:.4},{:.5},{:.5},{}",
        row.time,
        eng::pa_to_psig(row.upstream_pressure),
        eng::pa_to_psig(row.downstream_pressure),
        eng::kgps_to_lb_per_hr(row.mass_flow_rate),
        100.0 * row.valve_opening_fraction,
        row.flow_regime,
        row.z,
        row.k,
        row.molar_mass * 1000.0,
        row.dp_dt_upstream / eng::PSI_TO_PA,
        row.dp_dt_downstream / eng::PSI_TO_PA,
        guard,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use vf_components::FlowRegime;
    use vf_sim::{KpiSummary, OperatingMode, Termination};

    fn row(time: f64) -> SimulationRow {
        SimulationRow {
            time,
            upstream_pressure: eng::psig_to_pa(100.0),
            downstream_pressure: eng::psig_to_pa(0.0),
            mass_flow_rate: 0.5,
            valve_opening_fraction: 0.25,
            flow_regime: FlowRegime::Choked,
            z: 0.98,
            k: 1.31,
            molar_mass: 0.01804,
            dp_dt_upstream: 0.0,
            dp_dt_downstream: eng::PSI_TO_PA,
            guard: None,
        }
    }

    fn complete() -> StreamMessage {
        let rows = vec![row(0.0), row(0.05)];
        let kpi = KpiSummary::from_rows(&rows, OperatingMode::SupplyConstant, Termination::Converged);
        StreamMessage::Complete {
            rows,
            total_rows: 2,
            kpi,
        }
    }

    #[test]
    fn csv_rows_in_engineering_units() {
        let mut writer = MessageWriter::new(OutputFormat::Csv, Vec::new()).unwrap();
        writer.write(&complete()).unwrap();
        writer
            .write(&StreamMessage::Cancelled { total_rows: 2 })
            .unwrap();
        let text = String::from_utf8(writer.finish().unwrap()).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        let fields: Vec<&str> = lines[2].split(',').collect();
        let number = |i: usize| fields[i].parse::<f64>().unwrap();
        assert_eq!(fields[0], "0.050");
        assert!((number(1) - 100.0).abs() < 1e-3);
        assert!(number(2).abs() < 1e-3);
        assert!((number(3) - 3968.32).abs() < 1e-2);
        assert_eq!(fields[4], "25.00");
        assert_eq!(fields[5], "choked");
        assert_eq!(fields[8], "18.0400");
        assert!((number(10) - 1.0).abs() < 1e-9);
        assert_eq!(fields[11], "");
        let columns = CSV_HEADER.split(',').count();
        assert!(lines.iter().all(|l| l.split(',').count() == columns));
    }

    #[test]
    fn jsonl_is_one_message_per_line() {
        let mut writer = MessageWriter::new(OutputFormat::Jsonl, Vec::new()).unwrap();
        writer.write(&complete()).unwrap();
        writer
            .write(&StreamMessage::Cancelled { total_rows: 2 })
            .unwrap();
        let text = String::from_utf8(writer.finish().unwrap()).unwrap();

        let messages: Vec<StreamMessage> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(messages.len(), 2);
        assert!(matches!(messages[0], StreamMessage::Complete { .. }));
        assert_eq!(messages[0].rows().len(), 2);
        assert_eq!(messages[0].rows()[1].flow_regime, FlowRegime::Choked);
        assert!(messages[1].is_terminal());
    }
}
