//! Named optical-constant tables.
//!
//! Every tabulated curve (photon detection efficiency, surface reflectivities)
//! lives once in [`tables`] and is referenced by name. Tables can also be read
//! from a two-column text resource (`energy_ev value`, `#` comments) so a new
//! calibration does not need a rebuild.

pub mod tables;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Bumped whenever an embedded table changes.
pub const OPTICAL_TABLES_VERSION: u32 = 1;

/// Name of the default sensor efficiency curve.
pub const MPPC_PDE: &str = "mppc_pde";

/// An immutable energy → value table with strictly increasing energies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpticalTable {
    name: String,
    energies_ev: Vec<f64>,
    values: Vec<f64>,
}

impl OpticalTable {
    /// Build and validate a table.
    pub fn new(name: &str, energies_ev: Vec<f64>, values: Vec<f64>) -> Result<Self> {
        if energies_ev.len() != values.len() {
            return Err(Error::LengthMismatch {
                name: name.to_string(),
                energies: energies_ev.len(),
                values: values.len(),
            });
        }
        if energies_ev.len() < 2 {
            return Err(Error::InsufficientPoints {
                name: name.to_string(),
                got: energies_ev.len(),
            });
        }
        if let Some(i) = energies_ev.windows(2).position(|w| !(w[1] > w[0])) {
            return Err(Error::NotAscending {
                name: name.to_string(),
                index: i + 1,
            });
        }
        Ok(Self {
            name: name.to_string(),
            energies_ev,
            values,
        })
    }

    /// Same value at every energy of an existing axis. Handy for flat test
    /// curves.
    pub fn flat(name: &str, energies_ev: &[f64], value: f64) -> Result<Self> {
        Self::new(name, energies_ev.to_vec(), vec![value; energies_ev.len()])
    }

    /// Parse a two-column text resource.
    pub fn parse(name: &str, text: &str) -> Result<Self> {
        let mut energies = Vec::new();
        let mut values = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut cols = line.split_whitespace();
            let (Some(e), Some(v)) = (cols.next(), cols.next()) else {
                return Err(Error::Parse {
                    what: "optical table",
                    line: idx + 1,
                    reason: "expected two columns".to_string(),
                });
            };
            let parse = |s: &str| {
                s.parse::<f64>().map_err(|err| Error::Parse {
                    what: "optical table",
                    line: idx + 1,
                    reason: format!("'{s}': {err}"),
                })
            };
            energies.push(parse(e)?);
            values.push(parse(v)?);
        }
        Self::new(name, energies, values)
    }

    /// Read a two-column text resource from disk. The file stem names the
    /// table.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "table".to_string());
        Self::parse(&name, &text)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn energies(&self) -> &[f64] {
        &self.energies_ev
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.energies_ev.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energies_ev.is_empty()
    }

    /// `(min, max)` energy covered by the table.
    pub fn range(&self) -> (f64, f64) {
        (self.energies_ev[0], self.energies_ev[self.energies_ev.len() - 1])
    }

    pub fn max_value(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Piecewise-linear value at `energy_ev`, holding the boundary values
    /// outside the tabulated range.
    pub fn linear_at(&self, energy_ev: f64) -> f64 {
        let e = &self.energies_ev;
        let v = &self.values;
        let last = e.len() - 1;
        if energy_ev <= e[0] {
            return v[0];
        }
        if energy_ev >= e[last] {
            return v[last];
        }
        // First knot strictly above the query; guaranteed in 1..=last here.
        let hi = e.partition_point(|&x| x <= energy_ev);
        let lo = hi - 1;
        let t = (energy_ev - e[lo]) / (e[hi] - e[lo]);
        v[lo] + t * (v[hi] - v[lo])
    }
}

/// Every embedded table name.
pub const TABLE_NAMES: [&str; 4] = [
    MPPC_PDE,
    "mppc_reflectivity",
    "teflon_reflectivity",
    "blacksheet_reflectivity",
];

/// Look up an embedded table by name.
pub fn lookup(name: &str) -> Option<OpticalTable> {
    let (energies, values): (&[f64], &[f64]) = match name {
        MPPC_PDE => (&tables::MPPC_PDE_ENERGY_EV, &tables::MPPC_PDE_VALUES),
        "mppc_reflectivity" => (
            &tables::MPPC_REFLECTIVITY_ENERGY_EV,
            &tables::MPPC_REFLECTIVITY_VALUES,
        ),
        "teflon_reflectivity" => (
            &tables::TEFLON_REFLECTIVITY_ENERGY_EV,
            &tables::TEFLON_REFLECTIVITY_VALUES,
        ),
        "blacksheet_reflectivity" => (
            &tables::BLACKSHEET_REFLECTIVITY_ENERGY_EV,
            &tables::BLACKSHEET_REFLECTIVITY_VALUES,
        ),
        _ => return None,
    };
    // Embedded tables are checked by the unit tests below.
    OpticalTable::new(name, energies.to_vec(), values.to_vec()).ok()
}

/// [`lookup`] that reports unknown names as an error.
pub fn require(name: &str) -> Result<OpticalTable> {
    lookup(name).ok_or_else(|| Error::UnknownTable(name.to_string()))
}
