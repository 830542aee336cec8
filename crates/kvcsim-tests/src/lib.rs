//! Statistical validation battery for recorded KVC runs.
//!
//! Each check returns a [`TestResult`] with a p-value (where applicable), a
//! pass/fail determination, and a letter grade (A through F). The battery
//! takes plain per-event columns, so it can score a run read from disk or
//! counters produced in a unit test alike.

use statrs::distribution::{Binomial, ChiSquared, ContinuousCDF, DiscreteCDF};

// ═══════════════════════════════════════════════════════════════════════════════
// Core types
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of a single validation check.
#[derive(Debug, Clone)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub p_value: Option<f64>,
    pub statistic: f64,
    pub details: String,
    pub grade: char,
}

impl TestResult {
    /// Assign a letter grade based on p-value.
    ///
    /// - A: p >= 0.1
    /// - B: p >= 0.01
    /// - C: p >= 0.001
    /// - D: p >= 0.0001
    /// - F: otherwise or None
    pub fn grade_from_p(p: Option<f64>) -> char {
        match p {
            Some(p) if p >= 0.1 => 'A',
            Some(p) if p >= 0.01 => 'B',
            Some(p) if p >= 0.001 => 'C',
            Some(p) if p >= 0.0001 => 'D',
            _ => 'F',
        }
    }

    /// Determine pass/fail from p-value against a threshold (default 0.01).
    pub fn pass_from_p(p: Option<f64>, threshold: f64) -> bool {
        match p {
            Some(p) => p >= threshold,
            None => false,
        }
    }

    fn from_p(name: &str, p: Option<f64>, statistic: f64, details: String) -> Self {
        Self {
            name: name.to_string(),
            passed: Self::pass_from_p(p, 0.01),
            p_value: p,
            statistic,
            details,
            grade: Self::grade_from_p(p),
        }
    }
}

/// Per-event columns of one run.
#[derive(Debug, Clone, Default)]
pub struct RunSample {
    pub npe: Vec<u64>,
    pub n_hits: Vec<u64>,
    pub sensor_arrivals: Vec<u64>,
    pub cerenkov_radiator: Vec<u64>,
    pub trapped: Vec<u64>,
    /// Channel of every hit in the run.
    pub hit_channels: Vec<i32>,
    pub n_channels: usize,
    /// Mean detection probability the run was configured with, if known.
    pub expected_efficiency: Option<f64>,
    /// Upper bound on the trapped fraction of radiator photons.
    pub max_trapped_fraction: f64,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════════════

/// Return a failing `TestResult` when data is too short.
fn insufficient(name: &str, needed: usize, got: usize) -> TestResult {
    TestResult {
        name: name.to_string(),
        passed: false,
        p_value: None,
        statistic: 0.0,
        details: format!("Insufficient data: need {needed}, got {got}"),
        grade: 'F',
    }
}

fn skipped(name: &str, reason: &str) -> TestResult {
    TestResult {
        name: name.to_string(),
        passed: true,
        p_value: None,
        statistic: 0.0,
        details: format!("Skipped: {reason}"),
        grade: 'A',
    }
}

fn mean_var(xs: &[u64]) -> (f64, f64) {
    let n = xs.len() as f64;
    let mean = xs.iter().map(|&x| x as f64).sum::<f64>() / n;
    let var = xs.iter().map(|&x| (x as f64 - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, var)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Detection checks
// ═══════════════════════════════════════════════════════════════════════════════

/// Detected photons vs. sensor arrivals against an expected efficiency.
/// Exact two-sided binomial test.
pub fn detection_rate_binomial(detected: u64, arrivals: u64, expected: f64) -> TestResult {
    let name = "Detection Rate";
    if arrivals == 0 {
        return insufficient(name, 1, 0);
    }
    let rate = detected as f64 / arrivals as f64;
    let details = format!("{detected}/{arrivals} = {rate:.4}, expected {expected:.4}");

    let p = if detected > arrivals || !(0.0..=1.0).contains(&expected) {
        Some(0.0)
    } else if expected == 0.0 {
        Some(if detected == 0 { 1.0 } else { 0.0 })
    } else if expected == 1.0 {
        Some(if detected == arrivals { 1.0 } else { 0.0 })
    } else {
        Binomial::new(expected, arrivals).ok().map(|dist| {
            let lower = dist.cdf(detected);
            let upper = if detected == 0 { 1.0 } else { dist.sf(detected - 1) };
            (2.0 * lower.min(upper)).min(1.0)
        })
    };
    TestResult::from_p(name, p, rate, details)
}

/// Photoelectron count must equal the hit count in every event.
pub fn npe_equals_hit_count(npe: &[u64], n_hits: &[u64]) -> TestResult {
    let name = "NPE Equals Hit Count";
    if npe.len() != n_hits.len() {
        return TestResult::from_p(
            name,
            Some(0.0),
            0.0,
            format!("column lengths differ: {} vs {}", npe.len(), n_hits.len()),
        );
    }
    let mismatches = npe.iter().zip(n_hits).filter(|(a, b)| a != b).count();
    let p = if mismatches == 0 { 1.0 } else { 0.0 };
    TestResult::from_p(
        name,
        Some(p),
        mismatches as f64,
        format!("{mismatches} of {} events differ", npe.len()),
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// Distribution checks
// ═══════════════════════════════════════════════════════════════════════════════

/// Index of dispersion of the per-event photoelectron count.
///
/// Under Poisson statistics `(n−1)·s²/mean ~ χ²(n−1)`. A replayed trace with a
/// fixed number of arrivals per event is binomial and shows up as
/// under-dispersed.
pub fn npe_poisson_dispersion(npe: &[u64]) -> TestResult {
    let name = "NPE Poisson Dispersion";
    let n = npe.len();
    if n < 10 {
        return insufficient(name, 10, n);
    }
    let (mean, var) = mean_var(npe);
    if mean <= 0.0 {
        return TestResult::from_p(name, None, 0.0, "mean npe is zero".to_string());
    }
    let dof = (n - 1) as f64;
    let d = dof * var / mean;
    let p = ChiSquared::new(dof)
        .ok()
        .map(|dist| (2.0 * dist.cdf(d).min(dist.sf(d))).min(1.0));
    let ratio = var / mean;
    let shape = if ratio < 1.0 { "under" } else { "over" };
    TestResult::from_p(
        name,
        p,
        ratio,
        format!("mean={mean:.3}, var={var:.3}, var/mean={ratio:.3} ({shape}-dispersed), n={n}"),
    )
}

/// Chi-squared test of hits per channel against a flat occupancy.
pub fn channel_occupancy_uniformity(channels: &[i32], n_channels: usize) -> TestResult {
    let name = "Channel Occupancy";
    if n_channels < 2 {
        return insufficient(name, 2, n_channels);
    }
    let needed = 5 * n_channels;
    if channels.len() < needed {
        return insufficient(name, needed, channels.len());
    }
    let mut counts = vec![0u64; n_channels];
    let mut out_of_range = 0usize;
    for &ch in channels {
        match usize::try_from(ch).ok().and_then(|i| counts.get_mut(i)) {
            Some(c) => *c += 1,
            None => out_of_range += 1,
        }
    }
    if out_of_range > 0 {
        return TestResult::from_p(
            name,
            Some(0.0),
            out_of_range as f64,
            format!("{out_of_range} hits on channels outside 0..{n_channels}"),
        );
    }
    let expected = channels.len() as f64 / n_channels as f64;
    let chi2: f64 = counts
        .iter()
        .map(|&c| (c as f64 - expected).powi(2) / expected)
        .sum();
    let p = ChiSquared::new((n_channels - 1) as f64).ok().map(|dist| dist.sf(chi2));
    let (min, max) = counts
        .iter()
        .fold((u64::MAX, 0u64), |(lo, hi), &c| (lo.min(c), hi.max(c)));
    TestResult::from_p(
        name,
        p,
        chi2,
        format!("chi2={chi2:.2}, channels={n_channels}, min={min}, max={max}"),
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// Light collection
// ═══════════════════════════════════════════════════════════════════════════════

/// Trapped radiator photons must not significantly exceed `max_fraction`.
/// One-sided binomial test on the run totals.
pub fn trapped_fraction_bound(trapped: &[u64], radiator: &[u64], max_fraction: f64) -> TestResult {
    let name = "Trapped Fraction";
    let k: u64 = trapped.iter().sum();
    let n: u64 = radiator.iter().sum();
    if n == 0 {
        return insufficient(name, 1, 0);
    }
    let fraction = k as f64 / n as f64;
    let details = format!("{k}/{n} = {fraction:.4}, bound {max_fraction:.4}");
    let p = if k > n {
        Some(0.0)
    } else if k == 0 || max_fraction >= 1.0 {
        Some(1.0)
    } else if max_fraction <= 0.0 {
        Some(0.0)
    } else {
        Binomial::new(max_fraction, n).ok().map(|dist| dist.sf(k - 1))
    };
    TestResult::from_p(name, p, fraction, details)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Test battery
// ═══════════════════════════════════════════════════════════════════════════════

/// Run every check on a run sample.
pub fn run_all_tests(sample: &RunSample) -> Vec<TestResult> {
    let detected: u64 = sample.npe.iter().sum();
    let arrivals: u64 = sample.sensor_arrivals.iter().sum();
    let rate = match sample.expected_efficiency {
        Some(eff) => detection_rate_binomial(detected, arrivals, eff),
        None => skipped("Detection Rate", "no expected efficiency"),
    };
    vec![
        rate,
        npe_equals_hit_count(&sample.npe, &sample.n_hits),
        npe_poisson_dispersion(&sample.npe),
        channel_occupancy_uniformity(&sample.hit_channels, sample.n_channels),
        trapped_fraction_bound(&sample.trapped, &sample.cerenkov_radiator, sample.max_trapped_fraction),
    ]
}

/// Calculate overall quality score (0-100) from test results.
///
/// Each grade maps to a score: A=100, B=75, C=50, D=25, F=0.
/// Returns the average across all tests.
pub fn calculate_quality_score(results: &[TestResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let total: f64 = results
        .iter()
        .map(|r| match r.grade {
            'A' => 100.0,
            'B' => 75.0,
            'C' => 50.0,
            'D' => 25.0,
            _ => 0.0,
        })
        .sum();
    total / results.len() as f64
}
