//! Integration tests for kvcsim-core.
//!
//! These drive the full pipeline:
//! config → components → trace replay → aggregation → run output → read back.

use std::path::Path;

use glam::DVec3;
use kvcsim_core::{
    BoundaryStatus, ConfigStore, EventAggregator, MemorySink, NewTrack, OPTICAL_PHOTON_PDG,
    OpticalTable, QuantumEfficiencyModel, RunManager, RunReader, RunSettings, RunSink, RunWriter,
    RunWriterConfig, Species, Step, TraceKernel, TraceRecord, Volume, VolumeKind,
};
use kvcsim_tests::{detection_rate_binomial, npe_equals_hit_count};

const BEAM: &str = "particle kaon-\nmomentum 0.735\n";

fn track(track_id: i64, volume: VolumeKind) -> TraceRecord {
    TraceRecord::Track(NewTrack {
        track_id,
        parent_id: 1,
        pdg: OPTICAL_PHOTON_PDG,
        creator: Some("Cerenkov".to_string()),
        energy_ev: 2.5,
        volume: volume.into(),
    })
}

fn step(track_id: i64, pre: VolumeKind, post: Option<Volume>, status: BoundaryStatus, killed: bool) -> TraceRecord {
    TraceRecord::Step(Step {
        track_id,
        pdg: OPTICAL_PHOTON_PDG,
        pre_volume: pre.into(),
        post_volume: post,
        position: DVec3::new(6.5 * (track_id % 8) as f64, 60.0, 5.0),
        time_ns: 0.5 + track_id as f64 * 0.01,
        energy_ev: 2.5,
        status,
        killed,
    })
}

/// `photons` radiator photons per event, each refracting into a sensor.
fn sensor_trace(events: usize, photons: i64) -> TraceKernel {
    let mut lines = Vec::new();
    for ev in 0..events {
        for t in 0..photons {
            lines.push(track(t + 2, VolumeKind::Radiator));
        }
        for t in 0..photons {
            let channel = (t % 64) as i32;
            lines.push(step(t + 2, VolumeKind::Air, Some(Volume::sensor(channel)), BoundaryStatus::FresnelRefraction, false));
        }
        lines.push(TraceRecord::EndEvent { event_id: ev as i64 });
    }
    let text: Vec<String> = lines.iter().map(|l| serde_json::to_string(l).unwrap()).collect();
    TraceKernel::parse(&text.join("\n")).unwrap()
}

fn flat_table_config(dir: &Path, value: f64, extra: &str) -> ConfigStore {
    let path = dir.join("flat.dat");
    std::fs::write(&path, format!("# flat\n1.0 {value}\n2.0 {value}\n4.0 {value}\n")).unwrap();
    let mut config = ConfigStore::parse(&format!("{BEAM}{extra}"));
    config.set("qe_table_file", path.to_str().unwrap());
    config
}

fn settings(events: u64) -> RunSettings {
    RunSettings {
        events: Some(events),
        ..Default::default()
    }
}

#[test]
fn qe_is_probability_and_clamped_for_any_table() {
    let tables = [
        OpticalTable::new("two", vec![1.5, 3.5], vec![0.2, 0.9]).unwrap(),
        OpticalTable::new("wild", vec![1.0, 1.1, 2.0, 3.0, 3.2], vec![0.0, 1.3, -0.4, 0.95, 0.1]).unwrap(),
        kvcsim_core::optics::lookup("mppc_pde").unwrap(),
    ];
    for table in &tables {
        let qe = QuantumEfficiencyModel::new(table, 1.0).unwrap();
        let (lo, hi) = qe.energy_range();
        for i in 0..=400 {
            let e = i as f64 * 0.02;
            let p = qe.evaluate(e);
            assert!((0.0..=1.0).contains(&p), "{}: QE({e}) = {p}", table.name());
            if e <= lo {
                assert_eq!(p, qe.evaluate(lo));
            }
            if e >= hi {
                assert_eq!(p, qe.evaluate(hi));
            }
        }
    }
}

#[test]
fn qe_scale_saturates() {
    let table = OpticalTable::flat("flat06", &[1.0, 2.0, 3.0], 0.6).unwrap();
    let qe = QuantumEfficiencyModel::new(&table, 2.0).unwrap();
    assert_eq!(qe.evaluate(2.0), 1.0);
}

#[test]
fn aggregator_reset_is_idempotent() {
    let mut agg = EventAggregator::new(MemorySink::default());
    for id in 0..5 {
        agg.begin_event(id);
        assert_eq!(agg.current().cerenkov_all, 0);
        assert_eq!(agg.current().trapped, 0);
        assert!(agg.pending_hits().is_empty());
        for _ in 0..=id {
            agg.record_cherenkov_generated(true, true);
            agg.record_trapped();
        }
        agg.end_event().unwrap();
        assert_eq!(agg.state(), kvcsim_core::AggregatorState::Idle);
    }
}

#[test]
fn zero_efficiency_never_detects() {
    let tmp = tempfile::tempdir().unwrap();
    let config = flat_table_config(tmp.path(), 0.0, "detection_mode post_absorption_qe\n");
    let mut run = RunManager::new(&config, sensor_trace(3, 200), MemorySink::default(), settings(30)).unwrap();
    let summary = run.run().unwrap();
    assert_eq!(summary.events, 30);
    assert_eq!(summary.total_npe, 0);
    let sink = run.into_sink();
    assert!(sink.rows.iter().all(|(r, hits)| r.npe == 0 && hits.is_empty() && r.sensor_arrivals == 200));
}

#[test]
fn unit_efficiency_always_detects() {
    let tmp = tempfile::tempdir().unwrap();
    let config = flat_table_config(tmp.path(), 1.0, "qe_scale 1.0\n");
    let mut run = RunManager::new(&config, sensor_trace(2, 150), MemorySink::default(), settings(10)).unwrap();
    let summary = run.run().unwrap();
    assert_eq!(summary.total_npe, 1500);
    for (rec, hits) in &run.into_sink().rows {
        assert_eq!(rec.npe, 150);
        assert_eq!(hits.len(), 150);
        assert!(hits.iter().all(|h| h.detect_flag == 1 && h.event_id == rec.event_id));
    }
}

#[test]
fn detection_rate_follows_efficiency() {
    let tmp = tempfile::tempdir().unwrap();
    let config = flat_table_config(tmp.path(), 0.3, "");
    let mut run = RunManager::new(&config, sensor_trace(1, 500), MemorySink::default(), settings(20)).unwrap();
    run.run().unwrap();
    let sink = run.into_sink();
    let detected: u64 = sink.rows.iter().map(|(r, _)| r.npe).sum();
    let arrivals: u64 = sink.rows.iter().map(|(r, _)| r.sensor_arrivals).sum();
    assert_eq!(arrivals, 10_000);
    let result = detection_rate_binomial(detected, arrivals, 0.3);
    assert!(result.p_value.unwrap() > 1e-4, "{}", result.details);

    let npe: Vec<u64> = sink.rows.iter().map(|(r, _)| r.npe).collect();
    let hits: Vec<u64> = sink.rows.iter().map(|(_, h)| h.len() as u64).collect();
    assert!(npe_equals_hit_count(&npe, &hits).passed);
}

#[test]
fn kaon_beam_records_kinetic_energy() {
    let mut run = RunManager::new(&ConfigStore::parse(BEAM), sensor_trace(1, 1), MemorySink::default(), settings(1)).unwrap();
    run.run().unwrap();
    let sink = run.into_sink();
    let m = Species::KaonMinus.mass_gev();
    let expected = (m * m + 0.735f64 * 0.735).sqrt() - m;
    assert!((sink.rows[0].0.beam.energy_gev - expected).abs() < 1e-12);
}

#[test]
fn trapped_only_in_dead_volumes() {
    let lines = [
        track(2, VolumeKind::Radiator),
        track(3, VolumeKind::Radiator),
        track(4, VolumeKind::Radiator),
        step(2, VolumeKind::Air, Some(VolumeKind::Air.into()), BoundaryStatus::NotAtBoundary, true),
        step(3, VolumeKind::Radiator, Some(VolumeKind::Radiator.into()), BoundaryStatus::NotAtBoundary, true),
        step(4, VolumeKind::Wrap, Some(VolumeKind::Wrap.into()), BoundaryStatus::Absorption, true),
        // Already dead; the replay must not count it again.
        step(4, VolumeKind::Wrap, Some(VolumeKind::Wrap.into()), BoundaryStatus::Absorption, true),
        TraceRecord::EndEvent { event_id: 0 },
    ];
    let text: Vec<String> = lines.iter().map(|l| serde_json::to_string(l).unwrap()).collect();
    let kernel = TraceKernel::parse(&text.join("\n")).unwrap();
    let mut run = RunManager::new(&ConfigStore::parse(BEAM), kernel, MemorySink::default(), RunSettings::default()).unwrap();
    run.run().unwrap();
    let sink = run.into_sink();
    assert_eq!(sink.rows.len(), 1);
    assert_eq!(sink.rows[0].0.trapped, 2);
    assert_eq!(sink.rows[0].0.cerenkov_radiator, 3);
}

#[test]
fn surface_mode_runs_from_config() {
    let config = ConfigStore::parse(&format!("{BEAM}detection_mode surface\n"));
    let mut run = RunManager::new(&config, sensor_trace(1, 300), MemorySink::default(), settings(5)).unwrap();
    assert_eq!(run.detection_mode(), kvcsim_core::DetectionMode::SurfaceEfficiency);
    let summary = run.run().unwrap();
    // MPPC efficiency at 2.5 eV is well inside (0, 1).
    assert!(summary.total_npe > 0);
    assert!(summary.total_npe < 1500);
}

#[test]
fn surface_mode_honours_qe_scale() {
    let surface = |extra: &str| ConfigStore::parse(&format!("{BEAM}detection_mode surface\n{extra}"));

    // A vanishing scale switches the sensors off.
    let mut run = RunManager::new(&surface("qe_scale 1e-9\n"), sensor_trace(1, 300), MemorySink::default(), settings(5)).unwrap();
    assert_eq!(run.run().unwrap().total_npe, 0);

    // A large scale saturates every refraction into a detection.
    let mut run = RunManager::new(&surface("qe_scale 100\n"), sensor_trace(1, 300), MemorySink::default(), settings(5)).unwrap();
    assert_eq!(run.run().unwrap().total_npe, 1500);

    // The per-channel key beats the global one.
    let mut run = RunManager::new(
        &surface("qe_scale 100\nqe_scale.0 1e-9\n"),
        sensor_trace(1, 300),
        MemorySink::default(),
        settings(5),
    )
    .unwrap();
    let summary = run.run().unwrap();
    let sink = run.into_sink();
    let on_zero = sink.rows.iter().flat_map(|(_, h)| h).filter(|h| h.channel == 0).count();
    assert_eq!(on_zero, 0);
    let zero_arrivals = 5 * (0..300).filter(|t| t % 64 == 0).count() as u64;
    assert_eq!(summary.total_npe, 1500 - zero_arrivals);

    // Zero is not a usable scale.
    assert!(RunManager::new(&surface("qe_scale 0\n"), sensor_trace(1, 1), MemorySink::default(), settings(1)).is_err());
}

#[test]
fn run_output_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let config = flat_table_config(tmp.path(), 0.5, "");
    let writer = RunWriter::new(RunWriterConfig {
        output_dir: tmp.path().join("runs"),
        seed: 99,
        detection_mode: "post_absorption_qe".to_string(),
        config: config.snapshot(),
        ..Default::default()
    })
    .unwrap();
    let dir = writer.run_dir().to_path_buf();

    let settings = RunSettings {
        events: Some(8),
        seed: 99,
        run_number: 0,
    };
    let mut run = RunManager::new(&config, sensor_trace(2, 64), Recording::new(writer), settings).unwrap();
    run.run().unwrap();
    let recording = run.into_sink();

    let data = RunReader::open(&dir).unwrap();
    assert_eq!(data.events.len(), recording.rows.len());
    for (read, (rec, hits)) in data.events.iter().zip(&recording.rows) {
        assert_eq!(&read.record, rec);
        assert_eq!(&read.hits, hits);
    }
    let meta = data.meta.unwrap();
    assert_eq!(meta.total_events, 8);
    assert_eq!(meta.seed, 99);
    assert_eq!(meta.config["particle"], "kaon-");
}

/// Writes through to a `RunWriter` and keeps a copy of every row.
struct Recording {
    writer: RunWriter,
    rows: Vec<(kvcsim_core::EventRecord, Vec<kvcsim_core::PhotonHit>)>,
}

impl Recording {
    fn new(writer: RunWriter) -> Self {
        Self {
            writer,
            rows: Vec::new(),
        }
    }
}

impl RunSink for Recording {
    fn append_row(&mut self, record: &kvcsim_core::EventRecord, hits: &[kvcsim_core::PhotonHit]) -> kvcsim_core::Result<()> {
        self.rows.push((record.clone(), hits.to_vec()));
        self.writer.append_row(record, hits)
    }

    fn finalize(&mut self) -> kvcsim_core::Result<()> {
        self.writer.finalize()
    }
}
