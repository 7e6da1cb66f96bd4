//! Headless heated plate run
//!
//! ```text
//! heated-plate [COLUMNS] [ROWS] [ITERATIONS]
//! heated-plate 500 500 250
//! ```

use clap::{Parser, ValueEnum};
use heated_plate_core::snapshot::create_snapshot;
use heated_plate_core::{Backend, HeatedPlate, PlateConfig, PlateError};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

/// Backend choice on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendArg {
    Auto,
    Cpu,
    Gpu,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Auto => Backend::Auto,
            BackendArg::Cpu => Backend::Cpu,
            BackendArg::Gpu => Backend::Gpu,
        }
    }
}

/// Simulates heat flowing through a two-dimensional plate
#[derive(Parser, Debug)]
#[command(name = "heated-plate")]
#[command(about = "Heated plate stencil simulation", long_about = None)]
struct Args {
    /// Number of columns in the grid
    #[arg(default_value_t = heated_plate_core::config::DEFAULT_COLS)]
    columns: usize,

    /// Number of rows in the grid
    #[arg(default_value_t = heated_plate_core::config::DEFAULT_ROWS)]
    rows: usize,

    /// Number of iterations to simulate
    #[arg(default_value_t = heated_plate_core::config::DEFAULT_ITERATIONS)]
    iterations: u32,

    /// Execution backend
    #[arg(short, long, value_enum, default_value_t = BackendArg::Auto)]
    backend: BackendArg,

    /// Directory the snapshot is written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Skip writing the snapshot
    #[arg(long)]
    no_snapshot: bool,

    /// Print the final grid (boundary included) to stdout
    #[arg(long)]
    print: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let start_time = Instant::now();

    let config = PlateConfig::new(args.columns, args.rows, args.iterations)
        .with_backend(args.backend.into());

    println!(
        "Grid: {}x{}, Iterations: {}",
        config.cols, config.rows, config.iterations
    );

    let report = match HeatedPlate::new(config).and_then(HeatedPlate::run) {
        Ok(report) => report,
        Err(e) => {
            error!("{}", e);
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    println!(
        "\t Kernel execution ({}): {:.3} s",
        report.backend,
        report.kernel_time.as_secs_f64()
    );

    if args.print {
        print!("{}", report.final_grid);
    }

    if !args.no_snapshot {
        match create_snapshot(&report.final_grid, &args.output_dir, report.iterations) {
            Ok(path) => println!("Snapshot written to {}", path.display()),
            Err(e @ (PlateError::SnapshotDimensions { .. } | PlateError::Io(_))) => {
                warn!("Snapshot skipped: {}", e);
                println!("{e}");
            }
            Err(e) => {
                error!("{}", e);
                eprintln!("{e}");
                return ExitCode::FAILURE;
            }
        }
    }

    println!(
        "\nExecution time: {} seconds",
        start_time.elapsed().as_secs()
    );
    ExitCode::SUCCESS
}
