//! Transport kernels.
//!
//! Tracking itself (stepping, navigation, boundary physics) is done by an
//! external engine. [`TransportKernel`] is the seam: one call tracks one event
//! to completion and feeds every new track and step to the hooks.
//!
//! [`TraceKernel`] replays a recorded kernel session from JSON lines:
//!
//! ```text
//! {"type":"track","track_id":2,"parent_id":1,"pdg":-22,"creator":"Cerenkov","energy_ev":2.4,"volume":{"kind":"Radiator","copy_no":0}}
//! {"type":"step","track_id":2,"pdg":-22,"pre_volume":{"kind":"Air"},"post_volume":{"kind":"Sensor","copy_no":5},"position":[1.0,60.0,5.0],"time_ns":0.7,"energy_ev":2.4,"status":"FresnelRefraction"}
//! {"type":"end_event","event_id":0}
//! ```
//!
//! Steps of a track the hooks already killed are skipped, as the kernel would
//! never have produced them.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use log::{debug, warn};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::event::{EventAggregator, RunSink};
use crate::hooks::{NewTrack, OpticalHooks, Step, TrackStatus, TrackTag};
use crate::primary::Primary;

/// Something that can track one event through the detector.
pub trait TransportKernel {
    /// Track `primary` and every secondary to completion.
    fn transport<S: RunSink>(
        &mut self,
        primary: &Primary,
        hooks: &OpticalHooks,
        aggregator: &mut EventAggregator<S>,
        rng: &mut dyn RngCore,
    ) -> Result<()>;

    /// Natural number of events, if the kernel has one.
    fn events_hint(&self) -> Option<u64> {
        None
    }
}

/// One line of a trace file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceRecord {
    Track(NewTrack),
    Step(Step),
    EndEvent { event_id: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Callback {
    Track(usize),
    Step(usize),
}

#[derive(Debug, Clone, Default)]
struct TracedEvent {
    tracks: Vec<NewTrack>,
    steps: Vec<Step>,
    /// Callbacks in recorded order.
    order: Vec<Callback>,
}

/// Replays recorded kernel callbacks. Events are reused cyclically when a
/// run asks for more events than the trace holds.
#[derive(Debug, Clone, Default)]
pub struct TraceKernel {
    events: Vec<TracedEvent>,
    cursor: usize,
}

impl TraceKernel {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut events = Vec::new();
        let mut current = TracedEvent::default();
        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let record: TraceRecord = serde_json::from_str(line).map_err(|err| Error::Parse {
                what: "trace",
                line: idx + 1,
                reason: err.to_string(),
            })?;
            match record {
                TraceRecord::Track(t) => {
                    current.order.push(Callback::Track(current.tracks.len()));
                    current.tracks.push(t);
                }
                TraceRecord::Step(s) => {
                    current.order.push(Callback::Step(current.steps.len()));
                    current.steps.push(s);
                }
                TraceRecord::EndEvent { event_id } => {
                    debug!("trace event {event_id}: {} callbacks", current.order.len());
                    events.push(std::mem::take(&mut current));
                }
            }
        }
        if !current.order.is_empty() {
            warn!("trace ends without end_event; keeping the trailing event");
            events.push(current);
        }
        Ok(Self { events, cursor: 0 })
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl TransportKernel for TraceKernel {
    fn transport<S: RunSink>(
        &mut self,
        _primary: &Primary,
        hooks: &OpticalHooks,
        aggregator: &mut EventAggregator<S>,
        rng: &mut dyn RngCore,
    ) -> Result<()> {
        if self.events.is_empty() {
            return Ok(());
        }
        let event = &self.events[self.cursor % self.events.len()];
        self.cursor += 1;

        let mut tags: HashMap<i64, TrackTag> = HashMap::new();
        let mut killed: HashSet<i64> = HashSet::new();
        let mut skipped = 0usize;
        for cb in &event.order {
            match *cb {
                Callback::Track(i) => {
                    let track = &event.tracks[i];
                    tags.insert(track.track_id, hooks.on_new_track(track, aggregator));
                }
                Callback::Step(i) => {
                    let step = &event.steps[i];
                    if killed.contains(&step.track_id) {
                        skipped += 1;
                        continue;
                    }
                    let tag = tags.get(&step.track_id).copied().unwrap_or_default();
                    if hooks.on_step(step, tag, aggregator, rng) == TrackStatus::Killed {
                        killed.insert(step.track_id);
                    }
                }
            }
        }
        if skipped > 0 {
            debug!("skipped {skipped} steps of killed tracks");
        }
        Ok(())
    }

    fn events_hint(&self) -> Option<u64> {
        Some(self.events.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{BoundaryStatus, PostAbsorptionQeDetector};
    use crate::geometry::{DetectorLayout, Volume, VolumeKind};
    use crate::optics::OpticalTable;
    use crate::output::MemorySink;
    use crate::particle::{OPTICAL_PHOTON_PDG, Species};
    use crate::qe::{ChannelCalibration, QuantumEfficiencyModel};
    use glam::DVec3;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::Arc;

    fn hooks(efficiency: f64) -> OpticalHooks {
        let table = OpticalTable::flat("flat", &[1.0, 5.0], efficiency).unwrap();
        let model = Arc::new(QuantumEfficiencyModel::new(&table, 1.0).unwrap());
        OpticalHooks::new(
            Arc::new(DetectorLayout::default()),
            Box::new(PostAbsorptionQeDetector::new(model, ChannelCalibration::default())),
        )
    }

    fn primary() -> Primary {
        Primary {
            species: Species::KaonMinus,
            momentum: DVec3::new(0.0, 0.0, 0.735),
            position: DVec3::new(0.0, 0.0, -100.0),
            kinetic_energy: 0.41,
        }
    }

    fn line(record: &TraceRecord) -> String {
        serde_json::to_string(record).unwrap()
    }

    fn photon_track(track_id: i64) -> TraceRecord {
        TraceRecord::Track(NewTrack {
            track_id,
            parent_id: 1,
            pdg: OPTICAL_PHOTON_PDG,
            creator: Some("Cerenkov".to_string()),
            energy_ev: 2.4,
            volume: VolumeKind::Radiator.into(),
        })
    }

    fn into_sensor(track_id: i64, channel: i32) -> TraceRecord {
        TraceRecord::Step(Step {
            track_id,
            pdg: OPTICAL_PHOTON_PDG,
            pre_volume: VolumeKind::Air.into(),
            post_volume: Some(Volume::sensor(channel)),
            position: DVec3::new(0.0, 60.0, 5.0),
            time_ns: 0.7,
            energy_ev: 2.4,
            status: BoundaryStatus::FresnelRefraction,
            killed: false,
        })
    }

    #[test]
    fn test_parse_documented_format() {
        let text = r#"
# one photon, one event
{"type":"track","track_id":2,"parent_id":1,"pdg":-22,"creator":"Cerenkov","energy_ev":2.4,"volume":{"kind":"Radiator","copy_no":0}}
{"type":"step","track_id":2,"pdg":-22,"pre_volume":{"kind":"Air"},"post_volume":{"kind":"Sensor","copy_no":5},"position":[1.0,60.0,5.0],"time_ns":0.7,"energy_ev":2.4,"status":"FresnelRefraction"}
{"type":"end_event","event_id":0}
"#;
        let kernel = TraceKernel::parse(text).unwrap();
        assert_eq!(kernel.event_count(), 1);
        assert_eq!(kernel.events[0].order, vec![Callback::Track(0), Callback::Step(0)]);
        assert_eq!(kernel.events[0].steps[0].post_volume, Some(Volume::sensor(5)));
    }

    #[test]
    fn test_parse_error_reports_line() {
        let err = TraceKernel::parse("{\"type\":\"end_event\",\"event_id\":0}\n{not json}\n").unwrap_err();
        assert!(matches!(err, Error::Parse { what: "trace", line: 2, .. }));
    }

    #[test]
    fn test_replay_counts_and_hits() {
        let text = [
            line(&photon_track(2)),
            line(&photon_track(3)),
            line(&into_sensor(2, 4)),
            line(&into_sensor(3, 40)),
            line(&TraceRecord::EndEvent { event_id: 0 }),
        ]
        .join("\n");
        let mut kernel = TraceKernel::parse(&text).unwrap();
        let hooks = hooks(1.0);
        let mut agg = EventAggregator::new(MemorySink::default());
        let mut rng = StdRng::seed_from_u64(0);

        agg.begin_event(0);
        kernel.transport(&primary(), &hooks, &mut agg, &mut rng).unwrap();
        let rec = agg.end_event().unwrap();
        assert_eq!(rec.cerenkov_all, 2);
        assert_eq!(rec.npe, 2);
        let channels: Vec<i32> = agg.sink().rows[0].1.iter().map(|h| h.channel).collect();
        assert_eq!(channels, vec![4, 40]);
    }

    #[test]
    fn test_steps_after_kill_are_skipped() {
        let text = [
            line(&photon_track(2)),
            line(&into_sensor(2, 1)),
            // The kernel would never deliver these once the sensor absorbed the photon.
            line(&into_sensor(2, 1)),
            line(&into_sensor(2, 1)),
            line(&TraceRecord::EndEvent { event_id: 0 }),
        ]
        .join("\n");
        let mut kernel = TraceKernel::parse(&text).unwrap();
        let hooks = hooks(1.0);
        let mut agg = EventAggregator::new(MemorySink::default());
        let mut rng = StdRng::seed_from_u64(0);
        agg.begin_event(0);
        kernel.transport(&primary(), &hooks, &mut agg, &mut rng).unwrap();
        let rec = agg.end_event().unwrap();
        assert_eq!(rec.npe, 1);
        assert_eq!(rec.sensor_arrivals, 1);
    }

    #[test]
    fn test_events_cycle_and_trailing_event_kept() {
        let text = [
            line(&photon_track(2)),
            line(&TraceRecord::EndEvent { event_id: 0 }),
            line(&photon_track(2)),
            line(&photon_track(3)),
        ]
        .join("\n");
        let mut kernel = TraceKernel::parse(&text).unwrap();
        assert_eq!(kernel.events_hint(), Some(2));

        let hooks = hooks(0.0);
        let mut agg = EventAggregator::new(MemorySink::default());
        let mut rng = StdRng::seed_from_u64(0);
        let mut counts = Vec::new();
        for id in 0..4 {
            agg.begin_event(id);
            kernel.transport(&primary(), &hooks, &mut agg, &mut rng).unwrap();
            counts.push(agg.end_event().unwrap().cerenkov_all);
        }
        assert_eq!(counts, vec![1, 2, 1, 2]);
    }

    #[test]
    fn test_empty_trace_transports_nothing() {
        let mut kernel = TraceKernel::parse("").unwrap();
        assert!(kernel.is_empty());
        let hooks = hooks(1.0);
        let mut agg = EventAggregator::new(MemorySink::default());
        agg.begin_event(0);
        kernel
            .transport(&primary(), &hooks, &mut agg, &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert_eq!(agg.end_event().unwrap(), crate::event::EventRecord::default());
    }
}
