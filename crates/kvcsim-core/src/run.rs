//! Run orchestration.
//!
//! Every component is built once from the frozen configuration and handed to
//! the pieces that use it; nothing is global. For each event:
//! `begin_event → primary → transport → end_event`. The stop flag is checked
//! between events, so an interrupted run still finalizes its output with every
//! completed event. A failing event also finalizes the sink before its error is
//! returned.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::ConfigStore;
use crate::detection::{self, DetectionMode};
use crate::error::{Error, Result};
use crate::event::{EventAggregator, RunSink};
use crate::geometry::DetectorLayout;
use crate::hooks::OpticalHooks;
use crate::primary::PrimaryGenerator;
use crate::qe::QuantumEfficiencyModel;
use crate::trace::TransportKernel;

/// Seed used when none is given.
pub const DEFAULT_SEED: u64 = 345354;

#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Events to process; `None` uses the kernel's own count.
    pub events: Option<u64>,
    pub seed: u64,
    pub run_number: u32,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            events: None,
            seed: DEFAULT_SEED,
            run_number: 0,
        }
    }
}

/// Outcome of [`RunManager::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub events: u64,
    pub total_npe: u64,
    pub interrupted: bool,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn mean_npe(&self) -> f64 {
        if self.events == 0 {
            0.0
        } else {
            self.total_npe as f64 / self.events as f64
        }
    }
}

pub struct RunManager<K: TransportKernel, S: RunSink> {
    hooks: OpticalHooks,
    primary: PrimaryGenerator,
    kernel: K,
    aggregator: EventAggregator<S>,
    rng: StdRng,
    settings: RunSettings,
    mode: DetectionMode,
    stop: Arc<AtomicBool>,
}

impl<K: TransportKernel, S: RunSink> RunManager<K, S> {
    /// Build every component from `config`. Any misconfiguration fails here,
    /// before the first event.
    pub fn new(config: &ConfigStore, kernel: K, sink: S, settings: RunSettings) -> Result<Self> {
        let layout = Arc::new(DetectorLayout::from_config(config)?);
        let model = Arc::new(QuantumEfficiencyModel::from_config(config)?);
        let strategy = detection::build_strategy(config, Arc::clone(&layout), model)?;
        let mode = strategy.mode();
        let hooks = OpticalHooks::from_config(config, layout, strategy)?;
        let primary = PrimaryGenerator::from_config(config)?;

        if settings.events.is_none() && kernel.events_hint().is_none() {
            return Err(Error::invalid(
                "events",
                "no event count given and the kernel does not provide one",
            ));
        }

        Ok(Self {
            hooks,
            primary,
            kernel,
            aggregator: EventAggregator::new(sink),
            rng: StdRng::seed_from_u64(settings.seed),
            settings,
            mode,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Flag that ends the run after the current event when set.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn detection_mode(&self) -> DetectionMode {
        self.mode
    }

    pub fn hooks(&self) -> &OpticalHooks {
        &self.hooks
    }

    pub fn aggregator(&self) -> &EventAggregator<S> {
        &self.aggregator
    }

    pub fn event_target(&self) -> u64 {
        self.settings
            .events
            .or_else(|| self.kernel.events_hint())
            .unwrap_or(0)
    }

    /// Process every event and finalize the sink.
    pub fn run(&mut self) -> Result<RunSummary> {
        let target = self.event_target();
        let started = Instant::now();
        info!(
            "run {}: {target} events, seed {}, {} detection",
            self.settings.run_number, self.settings.seed, self.mode
        );
        self.aggregator.begin_run(self.settings.run_number);

        let mut interrupted = false;
        for event_id in 0..target {
            if self.stop.load(Ordering::Relaxed) {
                warn!("stop requested, ending run after {event_id} events");
                interrupted = true;
                break;
            }
            if let Err(err) = self.process_event(event_id as i64) {
                // Keep what was written: discard the partial event, finalize, report.
                if let Err(fin) = self.aggregator.end_run() {
                    warn!("finalize after failed event {event_id} also failed: {fin}");
                }
                return Err(err);
            }
        }

        self.aggregator.end_run()?;
        Ok(RunSummary {
            events: self.aggregator.events_done(),
            total_npe: self.aggregator.total_npe(),
            interrupted,
            elapsed: started.elapsed(),
        })
    }

    fn process_event(&mut self, event_id: i64) -> Result<()> {
        self.aggregator.begin_event(event_id);
        let primary = self.primary.generate(&mut self.aggregator, &mut self.rng);
        self.kernel
            .transport(&primary, &self.hooks, &mut self.aggregator, &mut self.rng)?;
        self.aggregator.end_event()?;
        Ok(())
    }

    pub fn into_sink(self) -> S {
        self.aggregator.into_sink()
    }
}
