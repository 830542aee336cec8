//! # kvcsim-core
//!
//! Photon detection and event bookkeeping for a quartz Cherenkov counter read
//! out by MPPCs.
//!
//! The particle-transport engine is external. This crate holds what sits
//! around it: the decision whether an optical photon reaching a sensor is
//! detected, the hit record it leaves, per-event and per-run aggregation, beam
//! generation, and the run output.
//!
//! ## Quick Start
//!
//! ```no_run
//! use kvcsim_core::{ConfigStore, MemorySink, RunManager, RunSettings, TraceKernel};
//!
//! let config = ConfigStore::parse("particle kaon-\nmomentum 0.735\ndetection_mode qe\n");
//! let kernel = TraceKernel::load("photons.jsonl").unwrap();
//! let mut run = RunManager::new(&config, kernel, MemorySink::default(), RunSettings::default()).unwrap();
//! let summary = run.run().unwrap();
//! println!("{} events, mean npe {:.2}", summary.events, summary.mean_npe());
//! ```
//!
//! ## Architecture
//!
//! kernel callbacks → [`OpticalHooks`] → [`DetectionStrategy`] → [`EventAggregator`] → [`RunSink`]
//!
//! Two detection policies exist and exactly one is active per run:
//! - **surface efficiency**: the kernel's boundary process decides, with a
//!   table draw for refractions into a sensor it did not already detect.
//! - **post-absorption QE** (default): the sensor absorbs every photon and a
//!   spline QE draw decides detection.

pub mod config;
pub mod detection;
pub mod error;
pub mod event;
pub mod geometry;
pub mod hits;
pub mod hooks;
pub mod optics;
pub mod output;
pub mod particle;
pub mod primary;
pub mod qe;
pub mod run;
pub mod spline;
pub mod trace;
pub mod units;

pub use glam;

pub use config::ConfigStore;
pub use detection::{
    Arrival, BoundaryStatus, Decision, DetectionMode, DetectionStrategy, PostAbsorptionQeDetector,
    SurfaceEfficiencyDetector, build_strategy,
};
pub use error::{Error, Result};
pub use event::{AggregatorState, BeamKinematics, EventAggregator, EventRecord, RunSink};
pub use geometry::{DetectorLayout, SensorPlacement, Volume, VolumeKind, WrapMaterial};
pub use hits::{HitRecorder, PhotonHit};
pub use hooks::{NewTrack, OpticalHooks, Step, TrackStatus, TrackTag};
pub use optics::{OPTICAL_TABLES_VERSION, OpticalTable};
pub use output::{MemorySink, RecordedEvent, RunData, RunMeta, RunReader, RunWriter, RunWriterConfig};
pub use particle::{OPTICAL_PHOTON_PDG, Species};
pub use primary::{Primary, PrimaryGenerator};
pub use qe::{ChannelCalibration, QuantumEfficiencyModel};
pub use run::{DEFAULT_SEED, RunManager, RunSettings, RunSummary};
pub use spline::CubicSpline;
pub use trace::{TraceKernel, TraceRecord, TransportKernel};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
