use std::collections::BTreeMap;

use kvcsim_core::RunData;

pub fn run(run_dir: &str) {
    let data = super::open_run(run_dir);

    println!("Run: {run_dir}");
    match &data.meta {
        Some(meta) => {
            println!("  ID:        {}", meta.id);
            println!("  Run:       {}", meta.run_number);
            println!("  Started:   {}", meta.started_at);
            println!("  Duration:  {:.1}s", meta.duration_ms as f64 / 1000.0);
            println!("  Detection: {}", meta.detection_mode);
            println!("  Seed:      {}", meta.seed);
            if let Some(p) = meta.config.get("particle") {
                let momentum = meta.config.get("momentum").map(String::as_str).unwrap_or("?");
                println!("  Beam:      {p} at {momentum} GeV/c");
            }
            println!("  Version:   kvcsim {}", meta.kvcsim_version);
        }
        None => println!("  (no run.json; run did not finish)"),
    }

    let stats = RunStats::from_data(&data);
    println!("\n{}", "=".repeat(60));
    println!("  Events:            {}", stats.events);
    println!("  Hits:              {}", stats.hits);
    println!("  Mean npe:          {:.3}", stats.mean_npe);
    println!("  Max npe:           {}", stats.max_npe);
    println!("  Empty events:      {}", stats.empty_events);
    println!("  Cherenkov (all):   {}", stats.cerenkov_all);
    println!("  Cherenkov (radiator): {}", stats.cerenkov_radiator);
    println!("  Sensor arrivals:   {}", stats.sensor_arrivals);
    println!("  Trapped:           {}", stats.trapped);
    if stats.sensor_arrivals > 0 {
        println!(
            "  Detected fraction: {:.4}",
            stats.npe_total as f64 / stats.sensor_arrivals as f64
        );
    }

    if !stats.channels.is_empty() {
        println!("\n  Busiest channels:");
        for (channel, count) in stats.top_channels(8) {
            println!("    ch {channel:>4}  {count:>8}");
        }
    }
}

#[derive(Debug, Default)]
struct RunStats {
    events: usize,
    hits: usize,
    npe_total: u64,
    mean_npe: f64,
    max_npe: u64,
    empty_events: usize,
    cerenkov_all: u64,
    cerenkov_radiator: u64,
    sensor_arrivals: u64,
    trapped: u64,
    channels: BTreeMap<i32, u64>,
}

impl RunStats {
    fn from_data(data: &RunData) -> Self {
        let mut stats = Self {
            events: data.events.len(),
            hits: data.total_hits(),
            ..Default::default()
        };
        for ev in &data.events {
            let r = &ev.record;
            stats.npe_total += r.npe;
            stats.max_npe = stats.max_npe.max(r.npe);
            if r.npe == 0 {
                stats.empty_events += 1;
            }
            stats.cerenkov_all += r.cerenkov_all;
            stats.cerenkov_radiator += r.cerenkov_radiator;
            stats.sensor_arrivals += r.sensor_arrivals;
            stats.trapped += r.trapped;
            for hit in &ev.hits {
                *stats.channels.entry(hit.channel).or_default() += 1;
            }
        }
        if stats.events > 0 {
            stats.mean_npe = stats.npe_total as f64 / stats.events as f64;
        }
        stats
    }

    /// Channels by descending hit count, ties by channel number.
    fn top_channels(&self, n: usize) -> Vec<(i32, u64)> {
        let mut v: Vec<(i32, u64)> = self.channels.iter().map(|(&c, &k)| (c, k)).collect();
        v.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        v.truncate(n);
        v
    }
}
