//! Per-event and per-run aggregation.
//!
//! The aggregator is a three-state machine (`Idle → InEvent → Flushing →
//! Idle`). Counters and the hit recorder are reset at [`EventAggregator::begin_event`],
//! before any photon hook can fire for that event. [`EventAggregator::end_event`]
//! drains the hits, appends one row to the [`RunSink`] and returns the record.
//!
//! Calling an in-event operation outside an event panics: a silently dropped
//! count would corrupt the run statistics without any visible symptom.

use glam::DVec3;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::hits::{HitRecorder, PhotonHit};

/// Events between progress log lines.
pub const PROGRESS_INTERVAL: u64 = 100;

/// Beam state for one event, set by the primary generator.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BeamKinematics {
    /// Kinetic energy (GeV).
    pub energy_gev: f64,
    /// Momentum vector (GeV/c).
    pub momentum: DVec3,
    /// Vertex (mm).
    pub position: DVec3,
}

/// Scalar summary of one event.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position of the event in the run, starting at 0.
    pub evnum: u64,
    pub event_id: i64,
    /// Every Cherenkov photon created in the event.
    pub cerenkov_all: u64,
    /// Cherenkov photons created in the radiator.
    pub cerenkov_radiator: u64,
    /// Radiator Cherenkov photons inside the configured energy band.
    pub cerenkov_in_band: u64,
    /// Radiator photons lost in a dead volume.
    pub trapped: u64,
    /// Optical photons that reached a sensor, detected or not.
    pub sensor_arrivals: u64,
    pub n_hits: u64,
    /// Photoelectrons: hits with the detection flag set.
    pub npe: u64,
    pub beam: BeamKinematics,
}

/// Persistence collaborator: one row per event, finalized once per run.
pub trait RunSink {
    fn append_row(&mut self, record: &EventRecord, hits: &[PhotonHit]) -> Result<()>;

    fn finalize(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatorState {
    Idle,
    InEvent,
    Flushing,
}

/// Collects counters and hits for the event in progress and hands finished
/// events to a sink.
///
/// One aggregator, its hit recorder and its random stream belong to a single
/// tracking thread.
pub struct EventAggregator<S: RunSink> {
    sink: S,
    state: AggregatorState,
    recorder: HitRecorder,
    current: EventRecord,
    events_done: u64,
    total_npe: u64,
}

impl<S: RunSink> EventAggregator<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            state: AggregatorState::Idle,
            recorder: HitRecorder::new(),
            current: EventRecord::default(),
            events_done: 0,
            total_npe: 0,
        }
    }

    pub fn state(&self) -> AggregatorState {
        self.state
    }

    /// Events completed so far in this run.
    pub fn events_done(&self) -> u64 {
        self.events_done
    }

    pub fn total_npe(&self) -> u64 {
        self.total_npe
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Id of the event in progress.
    pub fn current_event_id(&self) -> Option<i64> {
        (self.state == AggregatorState::InEvent).then_some(self.current.event_id)
    }

    /// Read-only view of the event in progress.
    pub fn current(&self) -> &EventRecord {
        &self.current
    }

    /// Hits recorded so far in the event in progress.
    pub fn pending_hits(&self) -> &[PhotonHit] {
        self.recorder.hits()
    }

    /// Reset the run counters. The sink is already open.
    pub fn begin_run(&mut self, run_id: u32) {
        self.require_not_in_event("begin_run");
        self.events_done = 0;
        self.total_npe = 0;
        info!("run {run_id} started");
    }

    pub fn begin_event(&mut self, event_id: i64) {
        self.require_not_in_event("begin_event");
        self.recorder.clear();
        self.current = EventRecord {
            evnum: self.events_done,
            event_id,
            ..EventRecord::default()
        };
        self.state = AggregatorState::InEvent;
    }

    /// Count one new Cherenkov photon track.
    pub fn record_cherenkov_generated(&mut self, in_radiator: bool, in_band: bool) {
        self.require_in_event("record_cherenkov_generated");
        self.current.cerenkov_all += 1;
        if in_radiator {
            self.current.cerenkov_radiator += 1;
            if in_band {
                self.current.cerenkov_in_band += 1;
            }
        }
    }

    pub fn record_trapped(&mut self) {
        self.require_in_event("record_trapped");
        self.current.trapped += 1;
    }

    pub fn record_sensor_arrival(&mut self) {
        self.require_in_event("record_sensor_arrival");
        self.current.sensor_arrivals += 1;
    }

    pub fn record_hit(&mut self, hit: PhotonHit) {
        self.require_in_event("record_hit");
        self.recorder.record(hit);
    }

    pub fn set_beam_kinematics(&mut self, energy_gev: f64, momentum: DVec3, position: DVec3) {
        self.require_in_event("set_beam_kinematics");
        self.current.beam = BeamKinematics {
            energy_gev,
            momentum,
            position,
        };
    }

    /// Close the event: drain hits, append the row, return the record.
    ///
    /// The aggregator is back in `Idle` even if the sink fails.
    pub fn end_event(&mut self) -> Result<EventRecord> {
        self.require_in_event("end_event");
        self.state = AggregatorState::Flushing;

        let hits = self.recorder.drain_and_reset();
        let mut record = std::mem::take(&mut self.current);
        record.n_hits = hits.len() as u64;
        record.npe = hits.iter().filter(|h| h.detect_flag == 1).count() as u64;

        let appended = self.sink.append_row(&record, &hits);
        self.state = AggregatorState::Idle;
        appended?;

        self.events_done += 1;
        self.total_npe += record.npe;
        if record.evnum % PROGRESS_INTERVAL == 0 {
            info!(
                "event {} (id {}): {} Cherenkov, {} npe",
                record.evnum, record.event_id, record.cerenkov_all, record.npe
            );
        } else {
            debug!(
                "event {}: npe {} trapped {} arrivals {}",
                record.evnum, record.npe, record.trapped, record.sensor_arrivals
            );
        }
        Ok(record)
    }

    /// Finalize the sink. An event still open is discarded.
    pub fn end_run(&mut self) -> Result<()> {
        if self.state != AggregatorState::Idle {
            warn!(
                "run ended inside event {}; discarding its partial state",
                self.current.event_id
            );
            self.recorder.clear();
            self.current = EventRecord::default();
            self.state = AggregatorState::Idle;
        }
        info!(
            "run finished: {} events, {} photoelectrons",
            self.events_done, self.total_npe
        );
        self.sink.finalize()
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn require_in_event(&self, op: &str) {
        assert!(
            self.state == AggregatorState::InEvent,
            "EventAggregator::{op} called while {:?}",
            self.state
        );
    }

    fn require_not_in_event(&self, op: &str) {
        assert!(
            self.state != AggregatorState::InEvent,
            "EventAggregator::{op} called while event {} is still open",
            self.current.event_id
        );
    }
}
