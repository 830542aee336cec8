//! Transport-kernel callbacks.
//!
//! The kernel calls [`OpticalHooks::on_new_track`] once per new track and
//! [`OpticalHooks::on_step`] once per step. Provenance travels as an explicit
//! [`TrackTag`]: the kernel stores the tag returned for a new track and hands
//! it back with each of that track's steps.

use std::sync::Arc;

use glam::DVec3;
use log::info;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::config::ConfigStore;
use crate::detection::{Arrival, BoundaryStatus, Decision, DetectionStrategy};
use crate::error::{Error, Result};
use crate::event::{EventAggregator, RunSink};
use crate::geometry::{DetectorLayout, Volume, VolumeKind};
use crate::hits::PhotonHit;
use crate::particle::OPTICAL_PHOTON_PDG;

/// Creator-process tag of Cherenkov photons.
pub const CERENKOV_PROCESS: &str = "Cerenkov";

/// Default accepted band for radiator Cherenkov photons (eV), `[min, max)`.
pub const DEFAULT_CHERENKOV_BAND: (f64, f64) = (1.37, 3.87);

/// A track just created by the kernel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTrack {
    pub track_id: i64,
    pub parent_id: i64,
    pub pdg: i32,
    /// Creator process; `None` for primaries.
    #[serde(default)]
    pub creator: Option<String>,
    /// Kinetic energy (eV).
    pub energy_ev: f64,
    /// Volume at the creation point.
    pub volume: Volume,
}

/// Provenance the kernel keeps with a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrackTag {
    /// Optical photon created inside the radiator.
    pub from_radiator: bool,
}

/// One kernel step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub track_id: i64,
    pub pdg: i32,
    pub pre_volume: Volume,
    /// `None` when the track leaves the world.
    #[serde(default)]
    pub post_volume: Option<Volume>,
    /// Post-step position, world frame (mm).
    pub position: DVec3,
    /// Global time (ns).
    pub time_ns: f64,
    /// Total energy (eV).
    pub energy_ev: f64,
    #[serde(default)]
    pub status: BoundaryStatus,
    /// The kernel itself stopped the track on this step.
    #[serde(default)]
    pub killed: bool,
}

/// What the kernel should do with the track after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackStatus {
    Alive,
    Killed,
}

/// Classification and detection logic wired into the kernel's callbacks.
pub struct OpticalHooks {
    layout: Arc<DetectorLayout>,
    strategy: Box<dyn DetectionStrategy>,
    band: (f64, f64),
}

impl OpticalHooks {
    pub fn new(layout: Arc<DetectorLayout>, strategy: Box<dyn DetectionStrategy>) -> Self {
        Self {
            layout,
            strategy,
            band: DEFAULT_CHERENKOV_BAND,
        }
    }

    /// Reads `cherenkov_emin` / `cherenkov_emax`.
    pub fn from_config(
        config: &ConfigStore,
        layout: Arc<DetectorLayout>,
        strategy: Box<dyn DetectionStrategy>,
    ) -> Result<Self> {
        let lo = config.double_or("cherenkov_emin", DEFAULT_CHERENKOV_BAND.0);
        let hi = config.double_or("cherenkov_emax", DEFAULT_CHERENKOV_BAND.1);
        let hooks = Self::new(layout, strategy).with_band(lo, hi)?;
        info!("Cherenkov band [{lo}, {hi}) eV");
        Ok(hooks)
    }

    pub fn with_band(mut self, lo: f64, hi: f64) -> Result<Self> {
        if !(lo.is_finite() && hi.is_finite() && lo < hi) {
            return Err(Error::invalid(
                "cherenkov_emin",
                format!("band must satisfy emin < emax, got [{lo}, {hi})"),
            ));
        }
        self.band = (lo, hi);
        Ok(self)
    }

    pub fn band(&self) -> (f64, f64) {
        self.band
    }

    pub fn layout(&self) -> &DetectorLayout {
        &self.layout
    }

    pub fn strategy(&self) -> &dyn DetectionStrategy {
        self.strategy.as_ref()
    }

    /// Classify a new track; Cherenkov photons are counted here, once each.
    pub fn on_new_track<S: RunSink>(
        &self,
        track: &NewTrack,
        aggregator: &mut EventAggregator<S>,
    ) -> TrackTag {
        if track.pdg != OPTICAL_PHOTON_PDG {
            return TrackTag::default();
        }
        let in_radiator = track.volume.kind == VolumeKind::Radiator;
        let is_cerenkov =
            track.parent_id > 0 && track.creator.as_deref() == Some(CERENKOV_PROCESS);
        if is_cerenkov {
            let in_band = (self.band.0..self.band.1).contains(&track.energy_ev);
            aggregator.record_cherenkov_generated(in_radiator, in_band);
        }
        TrackTag {
            from_radiator: in_radiator,
        }
    }

    /// Handle one step of a track tagged `tag`.
    pub fn on_step<S: RunSink>(
        &self,
        step: &Step,
        tag: TrackTag,
        aggregator: &mut EventAggregator<S>,
        rng: &mut dyn RngCore,
    ) -> TrackStatus {
        if step.pdg != OPTICAL_PHOTON_PDG {
            return if step.killed {
                TrackStatus::Killed
            } else {
                TrackStatus::Alive
            };
        }

        let post_is_sensor = step.post_volume.is_some_and(|v| v.is_sensor());
        if post_is_sensor || step.status == BoundaryStatus::Detection {
            return self.on_sensor_arrival(step, aggregator, rng);
        }

        if step.killed {
            if tag.from_radiator && self.layout.is_dead_volume(step.pre_volume.kind) {
                aggregator.record_trapped();
            }
            return TrackStatus::Killed;
        }
        TrackStatus::Alive
    }

    fn on_sensor_arrival<S: RunSink>(
        &self,
        step: &Step,
        aggregator: &mut EventAggregator<S>,
        rng: &mut dyn RngCore,
    ) -> TrackStatus {
        let volume = match step.post_volume {
            Some(v) if v.is_sensor() => v,
            _ if step.pre_volume.is_sensor() => step.pre_volume,
            other => other.unwrap_or(step.pre_volume),
        };
        aggregator.record_sensor_arrival();

        let arrival = Arrival {
            energy_ev: step.energy_ev,
            status: step.status,
            volume,
        };
        match self.strategy.decide(&arrival, rng) {
            Decision::Detected => {
                let hit = PhotonHit::detected(
                    self.layout.to_local(volume.copy_no, step.position),
                    step.position,
                    step.time_ns,
                    step.energy_ev,
                    step.pdg,
                    volume.copy_no,
                    aggregator.current().event_id,
                );
                aggregator.record_hit(hit);
                TrackStatus::Killed
            }
            Decision::Absorbed => TrackStatus::Killed,
            // A photon already inside a sensor never leaves it.
            Decision::Reflected if volume.is_sensor() => TrackStatus::Killed,
            Decision::Reflected if step.killed => TrackStatus::Killed,
            Decision::Reflected => TrackStatus::Alive,
        }
    }
}
