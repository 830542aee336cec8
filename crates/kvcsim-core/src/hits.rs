//! Detected-photon records and the per-event hit collection.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::units::wavelength_nm;

/// One detected optical photon.
///
/// Only detected photons are materialised, so `detect_flag` is always 1; it
/// is kept as a column for compatibility with downstream analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotonHit {
    /// Position in the sensor frame (mm).
    pub local_position: DVec3,
    /// Position in the world frame (mm).
    pub world_position: DVec3,
    /// Global arrival time (ns).
    pub time_ns: f64,
    /// Photon total energy (eV).
    pub energy_ev: f64,
    /// Derived from `energy_ev`.
    pub wavelength_nm: f64,
    /// PDG code of the detected particle.
    pub particle_id: i32,
    /// Sensor copy number.
    pub channel: i32,
    pub event_id: i64,
    pub detect_flag: u8,
}

impl PhotonHit {
    /// Build a detected hit; the wavelength is derived from the energy.
    pub fn detected(
        local_position: DVec3,
        world_position: DVec3,
        time_ns: f64,
        energy_ev: f64,
        particle_id: i32,
        channel: i32,
        event_id: i64,
    ) -> Self {
        Self {
            local_position,
            world_position,
            time_ns,
            energy_ev,
            wavelength_nm: wavelength_nm(energy_ev),
            particle_id,
            channel,
            event_id,
            detect_flag: 1,
        }
    }
}

/// Ordered hit collection for the event in progress.
///
/// Insertion order is detection order. One recorder belongs to one
/// aggregator; parallel tracking would need one per worker.
#[derive(Debug, Default)]
pub struct HitRecorder {
    hits: Vec<PhotonHit>,
}

impl HitRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, hit: PhotonHit) {
        debug_assert_eq!(hit.detect_flag, 1, "only detected photons are recorded");
        self.hits.push(hit);
    }

    /// Hand over every hit of the event and start empty.
    pub fn drain_and_reset(&mut self) -> Vec<PhotonHit> {
        std::mem::take(&mut self.hits)
    }

    pub fn clear(&mut self) {
        self.hits.clear();
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn hits(&self) -> &[PhotonHit] {
        &self.hits
    }
}
