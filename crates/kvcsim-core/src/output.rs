//! Run output on disk.
//!
//! # Storage Format
//!
//! Each run is a directory `<output_dir>/<timestamp>-run<NNNN>` containing:
//! - `events.csv`: one row per event (scalar counters and beam kinematics)
//! - `hits.csv`: one row per detected photon, keyed by `evnum`, in detection order
//! - `run.json`: metadata written when the run is finalized
//!
//! Rows are flushed as soon as they are appended, so an interrupted run keeps
//! every completed event even without `run.json`. Floats are written in their
//! shortest round-trip form; reading a run back reproduces the exact values.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use glam::DVec3;
use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::event::{BeamKinematics, EventRecord, RunSink};
use crate::hits::PhotonHit;

pub const EVENTS_FILE: &str = "events.csv";
pub const HITS_FILE: &str = "hits.csv";
pub const META_FILE: &str = "run.json";

const EVENTS_HEADER: &str = "evnum,event_id,cerenkov_all,cerenkov_quartz,n_cherenkov_gen,n_trapped,\
sensor_arrivals,nhit_mppc,npe,beam_energy,beam_mom_x,beam_mom_y,beam_mom_z,beam_pos_x,beam_pos_y,beam_pos_z";
const HITS_HEADER: &str = "evnum,event_id,seg,pos_x,pos_y,pos_z,world_x,world_y,world_z,\
time,energy,wave_length,particle_id,detect_flag";

// ---------------------------------------------------------------------------
// Run metadata (run.json)
// ---------------------------------------------------------------------------

/// Run metadata written to run.json at finalize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMeta {
    pub version: u32,
    pub id: String,
    pub run_number: u32,
    pub started_at: String,
    pub ended_at: String,
    pub duration_ms: u64,
    pub detection_mode: String,
    pub seed: u64,
    pub total_events: u64,
    pub total_hits: u64,
    pub total_npe: u64,
    pub optical_tables_version: u32,
    pub config: BTreeMap<String, String>,
    pub kvcsim_version: String,
}

/// Settings for a run directory.
#[derive(Debug, Clone)]
pub struct RunWriterConfig {
    pub output_dir: PathBuf,
    pub run_number: u32,
    pub detection_mode: String,
    pub seed: u64,
    pub config: BTreeMap<String, String>,
}

impl Default for RunWriterConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("runs"),
            run_number: 0,
            detection_mode: String::new(),
            seed: 0,
            config: BTreeMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Run writer
// ---------------------------------------------------------------------------

/// Incremental file output for one run.
pub struct RunWriter {
    run_dir: PathBuf,
    events_writer: BufWriter<File>,
    hits_writer: BufWriter<File>,
    total_events: u64,
    total_hits: u64,
    total_npe: u64,
    started_at: SystemTime,
    started_instant: Instant,
    run_id: String,
    config: RunWriterConfig,
    finished: bool,
}

impl RunWriter {
    /// Create the run directory and both CSV files with their headers.
    pub fn new(config: RunWriterConfig) -> Result<Self> {
        let run_id = Uuid::new_v4().to_string();
        let started_at = SystemTime::now();

        let ts = started_at.duration_since(UNIX_EPOCH).unwrap_or_default();
        let base = format!("{}-run{:04}", format_iso8601_compact(ts), config.run_number);
        let run_dir = unique_dir(&config.output_dir, &base);
        fs::create_dir_all(&run_dir)?;

        let mut events_writer = BufWriter::new(File::create(run_dir.join(EVENTS_FILE))?);
        writeln!(events_writer, "{EVENTS_HEADER}")?;
        events_writer.flush()?;

        let mut hits_writer = BufWriter::new(File::create(run_dir.join(HITS_FILE))?);
        writeln!(hits_writer, "{HITS_HEADER}")?;
        hits_writer.flush()?;

        info!("writing run {} to {}", config.run_number, run_dir.display());
        Ok(Self {
            run_dir,
            events_writer,
            hits_writer,
            total_events: 0,
            total_hits: 0,
            total_npe: 0,
            started_at,
            started_instant: Instant::now(),
            run_id,
            config,
            finished: false,
        })
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    pub fn total_events(&self) -> u64 {
        self.total_events
    }

    pub fn total_hits(&self) -> u64 {
        self.total_hits
    }

    pub fn elapsed(&self) -> Duration {
        self.started_instant.elapsed()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl RunSink for RunWriter {
    fn append_row(&mut self, record: &EventRecord, hits: &[PhotonHit]) -> Result<()> {
        if self.finished {
            return Err(Error::OutputClosed);
        }
        let b = &record.beam;
        writeln!(
            self.events_writer,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            record.evnum,
            record.event_id,
            record.cerenkov_all,
            record.cerenkov_radiator,
            record.cerenkov_in_band,
            record.trapped,
            record.sensor_arrivals,
            record.n_hits,
            record.npe,
            b.energy_gev,
            b.momentum.x,
            b.momentum.y,
            b.momentum.z,
            b.position.x,
            b.position.y,
            b.position.z
        )?;
        for h in hits {
            writeln!(
                self.hits_writer,
                "{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
                record.evnum,
                h.event_id,
                h.channel,
                h.local_position.x,
                h.local_position.y,
                h.local_position.z,
                h.world_position.x,
                h.world_position.y,
                h.world_position.z,
                h.time_ns,
                h.energy_ev,
                h.wavelength_nm,
                h.particle_id,
                h.detect_flag
            )?;
        }
        // Hits first: an events row must never point at missing hits.
        self.hits_writer.flush()?;
        self.events_writer.flush()?;

        self.total_events += 1;
        self.total_hits += hits.len() as u64;
        self.total_npe += record.npe;
        Ok(())
    }

    /// Write run.json. A second call is a no-op.
    fn finalize(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.events_writer.flush()?;
        self.hits_writer.flush()?;

        let ended_at = SystemTime::now();
        let meta = RunMeta {
            version: 1,
            id: self.run_id.clone(),
            run_number: self.config.run_number,
            started_at: format_iso8601(self.started_at.duration_since(UNIX_EPOCH).unwrap_or_default()),
            ended_at: format_iso8601(ended_at.duration_since(UNIX_EPOCH).unwrap_or_default()),
            duration_ms: self.started_instant.elapsed().as_millis() as u64,
            detection_mode: self.config.detection_mode.clone(),
            seed: self.config.seed,
            total_events: self.total_events,
            total_hits: self.total_hits,
            total_npe: self.total_npe,
            optical_tables_version: crate::optics::OPTICAL_TABLES_VERSION,
            config: self.config.config.clone(),
            kvcsim_version: crate::VERSION.to_string(),
        };
        let json = serde_json::to_string_pretty(&meta)?;
        fs::write(self.run_dir.join(META_FILE), json)?;
        self.finished = true;
        info!("run output finalized in {}", self.run_dir.display());
        Ok(())
    }
}

/// In-memory sink for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub rows: Vec<(EventRecord, Vec<PhotonHit>)>,
    pub finalized: bool,
}

impl RunSink for MemorySink {
    fn append_row(&mut self, record: &EventRecord, hits: &[PhotonHit]) -> Result<()> {
        if self.finalized {
            return Err(Error::OutputClosed);
        }
        self.rows.push((record.clone(), hits.to_vec()));
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.finalized = true;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Run reader
// ---------------------------------------------------------------------------

/// One event read back from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    pub record: EventRecord,
    pub hits: Vec<PhotonHit>,
}

/// Everything stored in a run directory.
#[derive(Debug, Clone)]
pub struct RunData {
    /// Absent when the run was interrupted before finalize.
    pub meta: Option<RunMeta>,
    pub events: Vec<RecordedEvent>,
}

impl RunData {
    pub fn total_hits(&self) -> usize {
        self.events.iter().map(|e| e.hits.len()).sum()
    }

    pub fn npe(&self) -> Vec<u64> {
        self.events.iter().map(|e| e.record.npe).collect()
    }
}

pub struct RunReader;

impl RunReader {
    /// Read a run directory back.
    pub fn open(dir: impl AsRef<Path>) -> Result<RunData> {
        let dir = dir.as_ref();
        let events_text = fs::read_to_string(dir.join(EVENTS_FILE))?;
        let hits_text = fs::read_to_string(dir.join(HITS_FILE))?;

        let meta_path = dir.join(META_FILE);
        let meta = if meta_path.exists() {
            Some(serde_json::from_str(&fs::read_to_string(meta_path)?)?)
        } else {
            None
        };

        let mut hits_by_event: HashMap<u64, Vec<PhotonHit>> = HashMap::new();
        for (line_no, fields) in data_rows(&hits_text, HITS_FILE, 14)? {
            let mut row = Row::new(HITS_FILE, line_no, &fields);
            let evnum: u64 = row.next()?;
            let event_id: i64 = row.next()?;
            let channel: i32 = row.next()?;
            let local_position = row.vec3()?;
            let world_position = row.vec3()?;
            let hit = PhotonHit {
                local_position,
                world_position,
                time_ns: row.next()?,
                energy_ev: row.next()?,
                wavelength_nm: row.next()?,
                particle_id: row.next()?,
                channel,
                event_id,
                detect_flag: row.next()?,
            };
            hits_by_event.entry(evnum).or_default().push(hit);
        }

        let mut events = Vec::new();
        for (line_no, fields) in data_rows(&events_text, EVENTS_FILE, 16)? {
            let mut row = Row::new(EVENTS_FILE, line_no, &fields);
            let record = EventRecord {
                evnum: row.next()?,
                event_id: row.next()?,
                cerenkov_all: row.next()?,
                cerenkov_radiator: row.next()?,
                cerenkov_in_band: row.next()?,
                trapped: row.next()?,
                sensor_arrivals: row.next()?,
                n_hits: row.next()?,
                npe: row.next()?,
                beam: BeamKinematics {
                    energy_gev: row.next()?,
                    momentum: row.vec3()?,
                    position: row.vec3()?,
                },
            };
            let hits = hits_by_event.remove(&record.evnum).unwrap_or_default();
            events.push(RecordedEvent { record, hits });
        }

        Ok(RunData { meta, events })
    }
}

/// Non-header, non-blank rows split on commas, with 1-based line numbers.
fn data_rows<'a>(
    text: &'a str,
    what: &'static str,
    columns: usize,
) -> Result<Vec<(usize, Vec<&'a str>)>> {
    let mut rows = Vec::new();
    for (idx, line) in text.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != columns {
            return Err(Error::Parse {
                what,
                line: idx + 1,
                reason: format!("expected {columns} columns, got {}", fields.len()),
            });
        }
        rows.push((idx + 1, fields));
    }
    Ok(rows)
}

/// Column cursor over one CSV row.
struct Row<'a> {
    what: &'static str,
    line: usize,
    fields: &'a [&'a str],
    pos: usize,
}

impl<'a> Row<'a> {
    fn new(what: &'static str, line: usize, fields: &'a [&'a str]) -> Self {
        Self {
            what,
            line,
            fields,
            pos: 0,
        }
    }

    fn next<T>(&mut self) -> Result<T>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.fields.get(self.pos).copied().unwrap_or("");
        self.pos += 1;
        raw.trim().parse().map_err(|err| Error::Parse {
            what: self.what,
            line: self.line,
            reason: format!("column {}: '{raw}': {err}", self.pos),
        })
    }

    fn vec3(&mut self) -> Result<DVec3> {
        Ok(DVec3::new(self.next()?, self.next()?, self.next()?))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `base`, or `base-2`, `base-3`, ... if a run directory of that name exists.
fn unique_dir(parent: &Path, base: &str) -> PathBuf {
    let mut candidate = parent.join(base);
    let mut n = 2;
    while candidate.exists() {
        candidate = parent.join(format!("{base}-{n}"));
        n += 1;
    }
    candidate
}

/// Compact ISO-8601 timestamp for directory names.
/// Example: `2026-02-15T013000Z`
fn format_iso8601_compact(since_epoch: Duration) -> String {
    let (year, month, day, hour, min, sec) = secs_to_utc(since_epoch.as_secs());
    format!("{year:04}-{month:02}-{day:02}T{hour:02}{min:02}{sec:02}Z")
}

/// Example: `2026-02-15T01:30:00Z`
fn format_iso8601(since_epoch: Duration) -> String {
    let (year, month, day, hour, min, sec) = secs_to_utc(since_epoch.as_secs());
    format!("{year:04}-{month:02}-{day:02}T{hour:02}:{min:02}:{sec:02}Z")
}

/// Seconds since the Unix epoch → (year, month, day, hour, minute, second) UTC.
/// No leap seconds.
fn secs_to_utc(secs: u64) -> (u64, u64, u64, u64, u64, u64) {
    let sec = secs % 60;
    let min = (secs / 60) % 60;
    let hour = (secs / 3600) % 24;

    let mut days = secs / 86400;
    let mut year = 1970u64;
    loop {
        let days_in_year = if is_leap(year) { 366 } else { 365 };
        if days < days_in_year {
            break;
        }
        days -= days_in_year;
        year += 1;
    }

    let feb = if is_leap(year) { 29 } else { 28 };
    let months_days: [u64; 12] = [31, feb, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    let mut month = 12u64;
    for (i, &md) in months_days.iter().enumerate() {
        if days < md {
            month = i as u64 + 1;
            break;
        }
        days -= md;
    }

    (year, month, days + 1, hour, min, sec)
}

fn is_leap(year: u64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}
