//! Quantum efficiency model: photon energy → detection probability.
//!
//! The tabulated curve is fitted with a natural cubic spline. A query is first
//! clamped to the tabulated energy range (no extrapolation), the spline value
//! is multiplied by the calibration scale, and the product is clamped to
//! `[0, 1]`. Measured curves are noisy, so the spline itself may overshoot.

use std::collections::HashMap;

use log::{info, warn};

use crate::config::ConfigStore;
use crate::error::{Error, Result};
use crate::optics::{self, OpticalTable};
use crate::spline::CubicSpline;

/// Config key of the global efficiency scale.
pub const QE_SCALE_KEY: &str = "qe_scale";
/// Config key naming a two-column table file that replaces the embedded curve.
pub const QE_TABLE_FILE_KEY: &str = "qe_table_file";
/// Config key naming an embedded table that replaces the default curve.
pub const QE_TABLE_KEY: &str = "qe_table";

/// Wavelength-dependent detection probability with a calibration scale.
#[derive(Debug, Clone)]
pub struct QuantumEfficiencyModel {
    table_name: String,
    spline: CubicSpline,
    range: (f64, f64),
    scale: f64,
}

impl QuantumEfficiencyModel {
    /// Fit a model to `table` with calibration `scale` (must be positive).
    pub fn new(table: &OpticalTable, scale: f64) -> Result<Self> {
        check_scale(QE_SCALE_KEY, scale)?;
        let spline = CubicSpline::new(table.energies(), table.values())?;
        Ok(Self {
            table_name: table.name().to_string(),
            range: table.range(),
            spline,
            scale,
        })
    }

    /// Build from configuration: curve from `qe_table_file`, else `qe_table`,
    /// else the embedded MPPC curve; scale from `qe_scale` (1.0 when absent).
    pub fn from_config(config: &ConfigStore) -> Result<Self> {
        let table = if config.has(QE_TABLE_FILE_KEY) {
            let path = config.get(QE_TABLE_FILE_KEY);
            info!("loading QE curve from {path}");
            OpticalTable::load(&path)?
        } else if config.has(QE_TABLE_KEY) {
            optics::require(&config.get(QE_TABLE_KEY))?
        } else {
            optics::require(optics::MPPC_PDE)?
        };
        let scale = if config.has(QE_SCALE_KEY) {
            config.get_double(QE_SCALE_KEY)
        } else {
            1.0
        };
        Self::new(&table, scale)
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Tabulated `(min, max)` energy in eV.
    pub fn energy_range(&self) -> (f64, f64) {
        self.range
    }

    /// Unscaled spline value at the clamped energy.
    pub fn raw(&self, energy_ev: f64) -> f64 {
        let (lo, hi) = self.range;
        self.spline.eval(energy_ev.clamp(lo, hi))
    }

    /// Detection probability in `[0, 1]` using the model's own scale.
    pub fn evaluate(&self, energy_ev: f64) -> f64 {
        self.evaluate_scaled(energy_ev, self.scale)
    }

    /// Detection probability in `[0, 1]` with an explicit scale, used for
    /// per-channel calibration overrides.
    pub fn evaluate_scaled(&self, energy_ev: f64, scale: f64) -> f64 {
        let p = self.raw(energy_ev) * scale;
        if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
    }
}

/// Per-channel efficiency scale overrides.
///
/// `qe_scale.<channel>` is more specific than `qe_scale` and wins for that
/// channel.
#[derive(Debug, Clone, Default)]
pub struct ChannelCalibration {
    overrides: HashMap<i32, f64>,
}

impl ChannelCalibration {
    /// Collect overrides for channels `0..n_channels`. Keys naming any other
    /// channel are ignored with a warning.
    pub fn from_config(config: &ConfigStore, n_channels: i32) -> Result<Self> {
        let prefix = format!("{QE_SCALE_KEY}.");
        let mut overrides = HashMap::new();
        for key in config.snapshot().into_keys() {
            let Some(suffix) = key.strip_prefix(&prefix) else {
                continue;
            };
            let ch = match suffix.parse::<i32>() {
                Ok(ch) if (0..n_channels).contains(&ch) => ch,
                _ => {
                    warn!("{key}: no such channel, ignored");
                    continue;
                }
            };
            let scale = config.get_double(&key);
            check_scale(&key, scale)?;
            overrides.insert(ch, scale);
        }
        if !overrides.is_empty() {
            info!("{} channel QE calibration override(s)", overrides.len());
        }
        Ok(Self { overrides })
    }

    pub fn with_override(mut self, channel: i32, scale: f64) -> Self {
        self.overrides.insert(channel, scale);
        self
    }

    /// Scale for `channel`, falling back to `default`.
    pub fn scale_for(&self, channel: i32, default: f64) -> f64 {
        self.overrides.get(&channel).copied().unwrap_or(default)
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

fn check_scale(key: &str, scale: f64) -> Result<()> {
    if !scale.is_finite() || scale <= 0.0 {
        warn!("rejecting {key} = {scale}");
        return Err(Error::invalid(key, format!("scale must be positive, got {scale}")));
    }
    Ok(())
}
