//! CLI for kvcsim: replay transport traces through the KVC photon detection pipeline.

mod commands;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "kvcsim")]
#[command(about = "kvcsim — photon detection and event bookkeeping for the KVC Cherenkov counter")]
#[command(version = kvcsim_core::VERSION)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG still applies.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a kernel trace through the detection pipeline and record a run
    Run {
        /// Configuration file (`key value` per line)
        #[arg(long)]
        config: Option<String>,

        /// Override a configuration key (repeatable), e.g. --set detection_mode=surface
        #[arg(long = "set", value_name = "KEY=VALUE")]
        overrides: Vec<String>,

        /// JSON-lines trace of kernel callbacks
        #[arg(long)]
        trace: String,

        /// Number of events (default: one per event in the trace)
        #[arg(long)]
        events: Option<u64>,

        /// Random seed
        #[arg(long, default_value_t = kvcsim_core::DEFAULT_SEED)]
        seed: u64,

        /// Run number used in the output directory name
        #[arg(long, default_value_t = 0)]
        run_number: u32,

        /// Output directory (default: ./runs/)
        #[arg(long)]
        output: Option<String>,

        /// Process events without writing a run directory
        #[arg(long)]
        dry_run: bool,
    },

    /// Evaluate the quantum efficiency model at photon energies
    Qe {
        /// Photon energies in eV; omit to sample the whole table range
        energies: Vec<f64>,

        /// Configuration file (qe_table_file, qe_table, qe_scale are honoured)
        #[arg(long)]
        config: Option<String>,

        /// Override a configuration key (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        overrides: Vec<String>,

        /// Grid points when no energies are given
        #[arg(long, default_value_t = 20)]
        steps: usize,

        /// Interpret the positional values as wavelengths in nm
        #[arg(long)]
        wavelength: bool,
    },

    /// List the embedded optical tables, or print one
    Tables {
        /// Table to print in full
        name: Option<String>,
    },

    /// Summarize a recorded run directory
    Inspect {
        /// Run directory (contains events.csv, hits.csv, run.json)
        run_dir: String,
    },

    /// Run the validation battery on a recorded run
    Report {
        /// Run directory
        run_dir: String,

        /// Expected mean detection probability for the binomial rate check
        #[arg(long)]
        efficiency: Option<f64>,

        /// Upper bound on the trapped fraction of radiator photons
        #[arg(long, default_value_t = 0.5)]
        max_trapped: f64,

        /// Write a Markdown report to this path
        #[arg(long)]
        output: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            config,
            overrides,
            trace,
            events,
            seed,
            run_number,
            output,
            dry_run,
        } => commands::run::run(commands::run::RunCommandConfig {
            config_path: config.as_deref(),
            overrides: &overrides,
            trace_path: &trace,
            events,
            seed,
            run_number,
            output_dir: output.as_deref(),
            dry_run,
        }),
        Commands::Qe {
            energies,
            config,
            overrides,
            steps,
            wavelength,
        } => commands::qe::run(&energies, config.as_deref(), &overrides, steps, wavelength),
        Commands::Tables { name } => commands::tables::run(name.as_deref()),
        Commands::Inspect { run_dir } => commands::inspect::run(&run_dir),
        Commands::Report {
            run_dir,
            efficiency,
            max_trapped,
            output,
        } => commands::report::run(&run_dir, efficiency, max_trapped, output.as_deref()),
    }
}

fn init_logging(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(log::LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
        }
    }
    builder.format_timestamp(None).init();
}
