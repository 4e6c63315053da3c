use clap::{Parser, Subcommand};
use hs_house::{HouseError, RunSummary, Simulation, TickRecord};
use hs_project::{Project, ProjectError};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error(transparent)]
    House(#[from] HouseError),
    #[error("trace output: {0}")]
    Io(#[from] io::Error),
    #[error("summary: {0}")]
    Json(#[from] serde_json::Error),
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "hs-cli")]
#[command(about = "HouseSim CLI - house thermal model with thermostat control", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load, migrate and validate a project file
    Validate {
        /// Path to the project file (.yaml or .json)
        project_path: PathBuf,
    },
    /// Run a scenario
    Run {
        /// Path to the project file; the baseline scenario when omitted
        project_path: Option<PathBuf>,
        /// Pass period in seconds
        #[arg(long)]
        dt: Option<f64>,
        /// End time in seconds
        #[arg(long)]
        t_end: Option<f64>,
        /// Write the tab-delimited trace to this file, or `-` for stdout
        #[arg(long)]
        trace: Option<PathBuf>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the baseline project as YAML
    Defaults,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Run {
            project_path,
            dt,
            t_end,
            trace,
            json,
        } => cmd_run(project_path.as_deref(), dt, t_end, trace.as_deref(), json),
        Commands::Defaults => cmd_defaults(),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn load_project(path: &Path) -> CliResult<Project> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    Ok(if is_json {
        hs_project::load_json(path)?
    } else {
        hs_project::load_yaml(path)?
    })
}

fn cmd_validate(project_path: &Path) -> CliResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = load_project(project_path)?;
    println!("✓ Project '{}' is valid", project.name);
    Ok(())
}

fn cmd_defaults() -> CliResult<()> {
    print!("{}", hs_project::to_yaml_string(&Project::default())?);
    Ok(())
}

fn open_trace(trace: Option<&Path>) -> CliResult<Option<Box<dyn Write>>> {
    Ok(match trace {
        None => None,
        Some(p) if p.as_os_str() == "-" => Some(Box::new(BufWriter::new(io::stdout()))),
        Some(p) => Some(Box::new(BufWriter::new(File::create(p)?))),
    })
}

fn cmd_run(
    project_path: Option<&Path>,
    dt: Option<f64>,
    t_end: Option<f64>,
    trace: Option<&Path>,
    json: bool,
) -> CliResult<()> {
    let mut project = match project_path {
        Some(p) => load_project(p)?,
        None => Project::default(),
    };
    if let Some(dt) = dt {
        project.run.dt_s = dt;
    }
    if let Some(t_end) = t_end {
        project.run.t_end_s = t_end;
    }

    let mut sim = Simulation::new(&project)?;
    let mut out = open_trace(trace)?;
    if let Some(w) = out.as_mut() {
        writeln!(w, "{}", TickRecord::TSV_HEADER)?;
    }

    // The observer cannot return errors; keep the first write failure.
    let mut write_err: Option<io::Error> = None;
    let started = Instant::now();
    let summary = sim.run(|record| {
        if write_err.is_some() {
            return;
        }
        if let Some(w) = out.as_mut() {
            if let Err(e) = writeln!(w, "{}", record.to_tsv()) {
                write_err = Some(e);
            }
        }
    })?;
    if let Some(e) = write_err {
        return Err(e.into());
    }
    if let Some(w) = out.as_mut() {
        w.flush()?;
    }
    let wall_s = started.elapsed().as_secs_f64();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&project, &summary, wall_s);
    }
    Ok(())
}

fn print_summary(project: &Project, summary: &RunSummary, wall_s: f64) {
    // Keep stdout clean for a `-` trace.
    let mut err = io::stderr().lock();
    let _ = writeln!(err, "\nRun summary ({}):", project.name);
    let _ = writeln!(
        err,
        "  Ticks:       {} ({:.0} s simulated, {:.2} s wall)",
        summary.ticks, summary.t_final_s, wall_s
    );
    if summary.stopped {
        let _ = writeln!(err, "  Stopped early by shutdown request");
    }
    let _ = writeln!(err, "  Energy:      {:.1} Wh", summary.energy_wh);
    let _ = writeln!(
        err,
        "  Starts:      heater {}, cooler {}",
        summary.heater_starts, summary.cooler_starts
    );
    match summary.inside_range_f {
        Some((lo, hi)) => {
            let _ = writeln!(err, "  Inside:      {lo:.2} .. {hi:.2} °F after settling");
        }
        None => {
            let _ = writeln!(err, "  Inside:      run ended before settling");
        }
    }
    let s = &summary.integrator;
    let _ = writeln!(
        err,
        "  Integrator:  {} accepted, {} rejected, {} forced",
        s.accepted, s.rejected, s.forced_accepts
    );
}
