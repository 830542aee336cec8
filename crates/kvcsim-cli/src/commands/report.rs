use kvcsim_core::{DetectorLayout, RunData};
use kvcsim_tests::{RunSample, TestResult};

/// Channel count used when the run carries no usable geometry snapshot.
const DEFAULT_CHANNELS: usize = 64;

pub fn run(run_dir: &str, efficiency: Option<f64>, max_trapped: f64, output_path: Option<&str>) {
    if let Some(eff) = efficiency {
        if !(0.0..=1.0).contains(&eff) {
            eprintln!("Error: --efficiency must be in [0, 1], got {eff}");
            std::process::exit(1);
        }
    }

    let data = super::open_run(run_dir);
    if data.events.is_empty() {
        eprintln!("Run {run_dir} has no events.");
        std::process::exit(1);
    }

    let sample = build_sample(&data, efficiency, max_trapped);
    println!(
        "🔬 Running validation battery on {} events, {} hits...\n",
        sample.npe.len(),
        sample.hit_channels.len()
    );
    let results = kvcsim_tests::run_all_tests(&sample);
    let score = kvcsim_tests::calculate_quality_score(&results);
    let passed = results.iter().filter(|r| r.passed).count();

    println!("{}", "=".repeat(60));
    println!("{:<28} {:>5} {:>6} {:>12}", "Check", "Pass", "Grade", "p-value");
    println!("{}", "-".repeat(60));
    for r in &results {
        let ok = if r.passed { "✓" } else { "✗" };
        println!(
            "  {:<26} {:>5} {:>6} {:>12}",
            r.name,
            ok,
            r.grade,
            format_p(r.p_value)
        );
    }
    println!("{}", "-".repeat(60));
    println!("  Score: {score:.1}/100 ({passed}/{} passed)", results.len());

    for r in results.iter().filter(|r| !r.passed) {
        println!("  ✗ {}: {}", r.name, r.details);
    }

    if let Some(path) = output_path {
        let report = generate_report(run_dir, &data, &results);
        if let Err(e) = std::fs::write(path, &report) {
            eprintln!("Failed to write report to {path}: {e}");
        } else {
            println!("\n📄 Report saved to: {path}");
        }
    }
}

/// Flatten a run into the columns the battery checks.
fn build_sample(data: &RunData, efficiency: Option<f64>, max_trapped: f64) -> RunSample {
    let mut sample = RunSample {
        n_channels: channel_count(data),
        expected_efficiency: efficiency,
        max_trapped_fraction: max_trapped,
        ..Default::default()
    };
    for ev in &data.events {
        let r = &ev.record;
        sample.npe.push(r.npe);
        sample.n_hits.push(ev.hits.len() as u64);
        sample.sensor_arrivals.push(r.sensor_arrivals);
        sample.cerenkov_radiator.push(r.cerenkov_radiator);
        sample.trapped.push(r.trapped);
        sample.hit_channels.extend(ev.hits.iter().map(|h| h.channel));
    }
    sample
}

/// Sensor count of the geometry the run was recorded with.
fn channel_count(data: &RunData) -> usize {
    let Some(meta) = &data.meta else {
        return DEFAULT_CHANNELS;
    };
    let config = super::config_from_snapshot(&meta.config);
    match DetectorLayout::from_config(&config) {
        Ok(layout) => layout.sensor_count(),
        Err(e) => {
            log::warn!("cannot rebuild geometry from run.json ({e}); assuming {DEFAULT_CHANNELS} channels");
            DEFAULT_CHANNELS
        }
    }
}

fn format_p(p: Option<f64>) -> String {
    p.map(|p| format!("{p:.6}")).unwrap_or_else(|| "—".to_string())
}

fn generate_report(run_dir: &str, data: &RunData, results: &[TestResult]) -> String {
    let score = kvcsim_tests::calculate_quality_score(results);
    let passed = results.iter().filter(|r| r.passed).count();
    let npe = data.npe();
    let mean = npe.iter().sum::<u64>() as f64 / npe.len().max(1) as f64;

    let mut report = String::new();
    report.push_str("# kvcsim — Run Validation Report\n\n");
    report.push_str(&format!("Run directory: `{run_dir}`\n\n"));
    if let Some(meta) = &data.meta {
        report.push_str(&format!(
            "- Run: {} ({})\n- Started: {}\n- Detection: {}\n- Seed: {}\n",
            meta.run_number, meta.id, meta.started_at, meta.detection_mode, meta.seed
        ));
    }
    report.push_str(&format!(
        "- Events: {}\n- Hits: {}\n- Mean npe: {:.3}\n- Score: {:.1}/100\n- Passed: {}/{}\n\n",
        data.events.len(),
        data.total_hits(),
        mean,
        score,
        passed,
        results.len()
    ));

    report.push_str("| Check | P | Grade | p-value | Statistic | Details |\n");
    report.push_str("|-------|---|-------|---------|-----------|--------|\n");
    for t in results {
        let ok = if t.passed { "✓" } else { "✗" };
        report.push_str(&format!(
            "| {} | {} | {} | {} | {:.4} | {} |\n",
            t.name,
            ok,
            t.grade,
            format_p(t.p_value),
            t.statistic,
            t.details
        ));
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use kvcsim_core::glam::DVec3;
    use kvcsim_core::{EventRecord, PhotonHit, RecordedEvent, RunMeta};

    fn data_with(config: BTreeMap<String, String>) -> RunData {
        let hit = PhotonHit::detected(DVec3::ZERO, DVec3::ZERO, 1.0, 2.5, 0, 2, 0);
        RunData {
            meta: Some(RunMeta {
                version: 1,
                id: "test".to_string(),
                run_number: 7,
                started_at: String::new(),
                ended_at: String::new(),
                duration_ms: 0,
                detection_mode: "post_absorption_qe".to_string(),
                seed: 1,
                total_events: 1,
                total_hits: 1,
                total_npe: 1,
                optical_tables_version: 1,
                config,
                kvcsim_version: kvcsim_core::VERSION.to_string(),
            }),
            events: vec![RecordedEvent {
                record: EventRecord {
                    npe: 1,
                    n_hits: 1,
                    sensor_arrivals: 4,
                    cerenkov_radiator: 10,
                    trapped: 3,
                    ..Default::default()
                },
                hits: vec![hit],
            }],
        }
    }

    #[test]
    fn test_channel_count_from_snapshot() {
        let mut config = BTreeMap::new();
        config.insert("mppc_per_row".to_string(), "4".to_string());
        assert_eq!(channel_count(&data_with(config)), 16);
        assert_eq!(channel_count(&data_with(BTreeMap::new())), 64);

        let no_meta = RunData {
            meta: None,
            events: Vec::new(),
        };
        assert_eq!(channel_count(&no_meta), DEFAULT_CHANNELS);
    }

    #[test]
    fn test_build_sample_columns() {
        let sample = build_sample(&data_with(BTreeMap::new()), Some(0.3), 0.5);
        assert_eq!(sample.npe, vec![1]);
        assert_eq!(sample.n_hits, vec![1]);
        assert_eq!(sample.sensor_arrivals, vec![4]);
        assert_eq!(sample.trapped, vec![3]);
        assert_eq!(sample.hit_channels, vec![2]);
        assert_eq!(sample.expected_efficiency, Some(0.3));
    }

    #[test]
    fn test_markdown_report_lists_every_check() {
        let data = data_with(BTreeMap::new());
        let results = kvcsim_tests::run_all_tests(&build_sample(&data, None, 0.5));
        let report = generate_report("runs/x", &data, &results);
        assert!(report.starts_with("# kvcsim"));
        for r in &results {
            assert!(report.contains(&format!("| {} |", r.name)));
        }
    }
}
