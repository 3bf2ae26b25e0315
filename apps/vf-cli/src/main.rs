mod error;
mod output;
mod scenario;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use error::{CliError, CliResult};
use output::{MessageWriter, OutputFormat};
use scenario::Scenario;
use vf_core::units::{eng, k, pa};
use vf_fluids::{Composition, PengRobinson, Preset, PropertyProvider};
use vf_sim::{KpiSummary, SimulationDriver, SimulationWorker, StreamMessage};

#[derive(Parser)]
#[command(name = "vf-cli")]
#[command(about = "ValveFlow CLI - Transient gas flow through a valve between two vessels", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a scenario file and show the resolved run setup
    Validate {
        /// Path to the scenario YAML file
        scenario_path: PathBuf,
    },
    /// Run a scenario and stream its messages
    Run {
        /// Path to the scenario YAML file
        scenario_path: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Jsonl)]
        format: OutputFormat,
        /// Output file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Hide the progress line
        #[arg(short, long)]
        quiet: bool,
    },
    /// Evaluate Z, k and M for a gas at one condition
    Props {
        /// Mole fractions, e.g. "Methane=0.9, Ethane=0.1"
        #[arg(long, conflicts_with = "preset", required_unless_present = "preset")]
        composition: Option<String>,
        /// Preset mixture id (see `presets`)
        #[arg(long)]
        preset: Option<String>,
        /// Gauge pressure in psig
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        pressure_psig: f64,
        /// Temperature in °F
        #[arg(long, default_value_t = 60.0, allow_negative_numbers = true)]
        temperature_f: f64,
        /// Print the properties as JSON
        #[arg(long)]
        json: bool,
    },
    /// List preset gas mixtures
    Presets,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::Run {
            scenario_path,
            format,
            output,
            quiet,
        } => cmd_run(&scenario_path, format, output.as_deref(), quiet),
        Commands::Props {
            composition,
            preset,
            pressure_psig,
            temperature_f,
            json,
        } => cmd_props(
            composition.as_deref(),
            preset.as_deref(),
            pressure_psig,
            temperature_f,
            json,
        ),
        Commands::Presets => cmd_presets(),
    }
}

fn cmd_validate(scenario_path: &Path) -> CliResult<()> {
    println!("Validating scenario: {}", scenario_path.display());
    let scenario = Scenario::load(scenario_path)?;
    let (config, initial) = scenario.to_run();

    // Building the driver runs every config check and the initial property lookup
    let driver = SimulationDriver::new(config, initial)?;
    let config = driver.config();
    println!("✓ Scenario is valid");

    if let Some(name) = &scenario.name {
        println!("  Name: {}", name);
    }
    println!("  Mode: {}", config.mode.label());
    println!(
        "  Valve: {:?} {:?}, travel {:.2} s, bore {:.4e} m², Cd {:.3}",
        config.valve_action,
        config.opening_profile,
        config.travel_time(),
        config.valve_bore_area,
        config.discharge_coefficient
    );
    println!(
        "  Time step: {} s, max time: {} s, batch: {} rows",
        config.time_step,
        config.effective_max_time(),
        config.batch_size
    );
    if let Some(row) = driver.rows().first() {
        println!(
            "  Initial gas: Z = {:.4}, k = {:.4}, M = {:.3} g/mol",
            row.z,
            row.k,
            row.molar_mass * 1000.0
        );
    }
    Ok(())
}

fn cmd_run(
    scenario_path: &Path,
    format: OutputFormat,
    output: Option<&Path>,
    quiet: bool,
) -> CliResult<()> {
    let scenario = Scenario::load(scenario_path)?;
    let (config, initial) = scenario.to_run();
    let max_time = config.effective_max_time();
    info!(
        scenario = %scenario_path.display(),
        mode = config.mode.label(),
        max_time,
        "starting run"
    );

    let sink: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let mut writer = MessageWriter::new(format, sink)?;

    let started = Instant::now();
    let worker = SimulationWorker::spawn(config, initial, Arc::new(PengRobinson::new()))?;
    let mut terminal = None;
    let mut last_emit = Instant::now();
    let mut last_time = 0.0;
    for message in worker.messages.iter() {
        writer.write(&message)?;
        if let Some(row) = message.rows().last() {
            last_time = row.time;
        }
        if !quiet && last_emit.elapsed().as_millis() >= 100 {
            render_progress(last_time, max_time, message.total_rows(), started);
            last_emit = Instant::now();
        }
        if message.is_terminal() {
            terminal = Some(message);
        }
    }
    writer.finish()?;
    worker.join().map_err(|_| CliError::WorkerPanicked)?;
    if !quiet {
        clear_progress_line();
    }

    match terminal {
        Some(StreamMessage::Complete {
            total_rows, kpi, ..
        }) => {
            if kpi.completed {
                eprintln!("✓ Simulation converged");
            } else {
                eprintln!("⚠ Simulation stopped at the time limit before equilibrium");
            }
            print_summary(&kpi, total_rows, started);
            if let Some(path) = output {
                eprintln!("  Output: {}", path.display());
            }
            Ok(())
        }
        Some(StreamMessage::Error {
            total_rows,
            message,
            kpi,
            ..
        }) => {
            eprintln!("✗ Simulation failed");
            print_summary(&kpi, total_rows, started);
            Err(CliError::RunFailed(message))
        }
        Some(StreamMessage::Cancelled { total_rows }) => Err(CliError::Cancelled(total_rows)),
        Some(StreamMessage::Chunk { .. }) | None => Err(CliError::WorkerPanicked),
    }
}

fn clear_progress_line() {
    eprint!("\r{}\r", " ".repeat(100));
    let _ = io::stderr().flush();
}

fn render_progress(sim_time: f64, max_time: f64, rows: usize, started: Instant) {
    let fraction = (sim_time / max_time).clamp(0.0, 1.0);
    let width = 28usize;
    let filled = ((fraction * width as f64).round() as usize).min(width);
    eprint!(
        "\r[{}{}] {:>6.2}%  t={:.2}/{:.2}s  rows={}  elapsed={:.1}s",
        "#".repeat(filled),
        "-".repeat(width - filled),
        fraction * 100.0,
        sim_time,
        max_time,
        rows,
        started.elapsed().as_secs_f64()
    );
    let _ = io::stderr().flush();
}

fn print_summary(kpi: &KpiSummary, total_rows: usize, started: Instant) {
    eprintln!("\nSummary:");
    eprintln!(
        "  Peak flow:        {:.1} lb/hr ({:.4} kg/s)",
        eng::kgps_to_lb_per_hr(kpi.peak_flow_rate),
        kpi.peak_flow_rate
    );
    eprintln!(
        "  Final pressure:   {:.2} psig",
        eng::pa_to_psig(kpi.final_pressure)
    );
    eprintln!("  Equilibrium time: {:.2} s", kpi.equilibrium_time);
    eprintln!(
        "  Mass transferred: {:.2} lb ({:.3} kg)",
        eng::kg_to_lb(kpi.total_mass_transferred),
        kpi.total_mass_transferred
    );
    eprintln!("  Rows:             {}", total_rows);
    eprintln!("  Wall time:        {:.3} s", started.elapsed().as_secs_f64());
}

fn cmd_props(
    composition: Option<&str>,
    preset: Option<&str>,
    pressure_psig: f64,
    temperature_f: f64,
    json: bool,
) -> CliResult<()> {
    let composition = match (composition, preset) {
        (Some(text), _) => Composition::parse(text)?,
        (None, Some(id)) => Preset::from_id(id)
            .ok_or_else(|| CliError::UnknownPreset(id.to_string()))?
            .composition()?,
        (None, None) => Preset::NaturalGas.composition()?,
    };

    let provider = PengRobinson::new();
    let props = provider.properties(
        &composition,
        pa(eng::psig_to_pa(pressure_psig)),
        k(eng::fahrenheit_to_kelvin(temperature_f)),
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&props)?);
        return Ok(());
    }
    println!(
        "Gas properties ({}) at {:.1} psig, {:.1} °F:",
        provider.name(),
        pressure_psig,
        temperature_f
    );
    println!("  Composition: {}", composition);
    println!("  Z = {:.5}", props.z);
    println!("  k = {:.5}", props.k);
    println!("  M = {:.3} g/mol", props.molar_mass * 1000.0);
    Ok(())
}

fn cmd_presets() -> CliResult<()> {
    println!("Preset mixtures:");
    for preset in Preset::ALL {
        let composition = preset.composition()?;
        println!(
            "  {:<14} {} ({:.2} g/mol)",
            preset.id(),
            preset.display_name(),
            composition.molar_mass() * 1000.0
        );
        println!("      {}", composition);
    }
    Ok(())
}
