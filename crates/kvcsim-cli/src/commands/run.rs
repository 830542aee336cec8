use std::path::PathBuf;
use std::sync::atomic::Ordering;

use kvcsim_core::{
    ConfigStore, DetectionMode, MemorySink, RunManager, RunSettings, RunSink, RunSummary,
    RunWriter, RunWriterConfig, TraceKernel,
};

pub struct RunCommandConfig<'a> {
    pub config_path: Option<&'a str>,
    pub overrides: &'a [String],
    pub trace_path: &'a str,
    pub events: Option<u64>,
    pub seed: u64,
    pub run_number: u32,
    pub output_dir: Option<&'a str>,
    pub dry_run: bool,
}

pub fn run(cfg: RunCommandConfig<'_>) {
    let config = super::load_config(cfg.config_path, cfg.overrides);

    // Reject a bad mode before anything touches the filesystem.
    let mode = match DetectionMode::from_config(&config) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let kernel = match TraceKernel::load(cfg.trace_path) {
        Ok(k) => k,
        Err(e) => {
            eprintln!("Error loading trace {}: {e}", cfg.trace_path);
            std::process::exit(1);
        }
    };
    if kernel.is_empty() {
        eprintln!("Trace {} contains no events.", cfg.trace_path);
        std::process::exit(1);
    }

    let settings = RunSettings {
        events: cfg.events,
        seed: cfg.seed,
        run_number: cfg.run_number,
    };

    println!("Run {}", cfg.run_number);
    println!("  Trace:     {} ({} events)", cfg.trace_path, kernel.event_count());
    println!("  Detection: {mode}");
    println!("  Seed:      {}", cfg.seed);

    if cfg.dry_run {
        println!("  Output:    none (dry run)");
        let (summary, _) = execute(&config, kernel, MemorySink::default(), settings);
        print_summary(&summary, None);
        return;
    }

    let writer = match RunWriter::new(RunWriterConfig {
        output_dir: PathBuf::from(cfg.output_dir.unwrap_or("runs")),
        run_number: cfg.run_number,
        detection_mode: mode.to_string(),
        seed: cfg.seed,
        config: config.snapshot(),
    }) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Error creating run output: {e}");
            std::process::exit(1);
        }
    };
    let run_dir = writer.run_dir().to_path_buf();
    println!("  Output:    {}", run_dir.display());

    let (summary, writer) = execute(&config, kernel, writer, settings);
    print_summary(&summary, Some(writer.total_hits()));
    println!("\nRun saved to: {}", run_dir.display());
}

/// Build the run manager, wire Ctrl+C to its stop flag and process every
/// event. Exits on failure; a run directory that never received an event is
/// removed.
fn execute<S: RunSink + RunDir>(
    config: &ConfigStore,
    kernel: TraceKernel,
    sink: S,
    settings: RunSettings,
) -> (RunSummary, S) {
    let cleanup = sink.dir();
    let mut manager = match RunManager::new(config, kernel, sink, settings) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: {e}");
            if let Some(dir) = cleanup {
                let _ = std::fs::remove_dir_all(dir);
            }
            std::process::exit(1);
        }
    };

    let stop = manager.stop_flag();
    if let Err(e) = ctrlc::set_handler(move || {
        stop.store(true, Ordering::SeqCst);
    }) {
        log::warn!("could not install Ctrl+C handler: {e}");
    }

    let summary = match manager.run() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Run failed after {} events: {e}", manager.aggregator().events_done());
            std::process::exit(1);
        }
    };
    (summary, manager.into_sink())
}

/// Sinks backed by a directory that should be removed if setup fails.
trait RunDir {
    fn dir(&self) -> Option<PathBuf>;
}

impl RunDir for RunWriter {
    fn dir(&self) -> Option<PathBuf> {
        Some(self.run_dir().to_path_buf())
    }
}

impl RunDir for MemorySink {
    fn dir(&self) -> Option<PathBuf> {
        None
    }
}

fn print_summary(summary: &RunSummary, hits: Option<u64>) {
    println!("\n{}", "=".repeat(60));
    if summary.interrupted {
        println!("Run interrupted");
    } else {
        println!("Run complete");
    }
    println!("{}", "-".repeat(60));
    println!("  Events:    {}", summary.events);
    println!("  Total npe: {}", summary.total_npe);
    if let Some(h) = hits {
        println!("  Hits:      {h}");
    }
    println!("  Mean npe:  {:.3}", summary.mean_npe());
    println!("  Elapsed:   {:.2}s", summary.elapsed.as_secs_f64());
}
