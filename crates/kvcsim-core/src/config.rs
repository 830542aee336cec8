//! Line-oriented `key value` configuration.
//!
//! The store is filled once before a run (from a file, plus optional command
//! line overrides) and then shared read-only, usually behind an `Arc`.
//! Typed getters never fail: a missing key or an unparsable number logs a
//! warning and yields the zero value, so a misconfigured optional parameter
//! cannot abort a long run. Use [`ConfigStore::has`] when a key is optional
//! and the zero value would be wrong.

use std::collections::BTreeMap;
use std::path::Path;

use log::warn;

/// Immutable-after-load mapping from configuration key to raw string value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigStore {
    entries: BTreeMap<String, String>,
}

impl ConfigStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and parse a configuration file.
    pub fn load(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Ok(Self::parse(&text))
    }

    /// Parse configuration text.
    ///
    /// Each line contributes its first two whitespace-separated tokens as a
    /// key/value pair; extra tokens are ignored. Blank lines, `#` comments and
    /// lines with a single token are skipped. Later duplicates overwrite
    /// earlier ones.
    pub fn parse(text: &str) -> Self {
        let mut store = Self::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut tokens = line.split_whitespace();
            if let (Some(key), Some(value)) = (tokens.next(), tokens.next()) {
                store.set(key, value);
            }
        }
        store
    }

    /// Insert or overwrite a key. Intended for overrides applied before the
    /// store is frozen and shared.
    pub fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    /// Apply a `key=value` override string.
    pub fn apply_override(&mut self, spec: &str) -> bool {
        match spec.split_once('=') {
            Some((k, v)) if !k.trim().is_empty() => {
                self.set(k.trim(), v.trim());
                true
            }
            _ => false,
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Raw string value, or `""` with a warning when absent.
    pub fn get(&self, key: &str) -> String {
        match self.entries.get(key) {
            Some(v) => v.clone(),
            None => {
                warn!("config key '{key}' not found");
                String::new()
            }
        }
    }

    /// Value parsed as `f64`, or `0.0` with a warning.
    pub fn get_double(&self, key: &str) -> f64 {
        match self.entries.get(key) {
            Some(v) => v.parse().unwrap_or_else(|_| {
                warn!("config key '{key}' is not a number: '{v}'");
                0.0
            }),
            None => {
                warn!("config key '{key}' not found");
                0.0
            }
        }
    }

    /// Value parsed as `i64`, or `0` with a warning.
    pub fn get_int(&self, key: &str) -> i64 {
        match self.entries.get(key) {
            Some(v) => v.parse().unwrap_or_else(|_| {
                warn!("config key '{key}' is not an integer: '{v}'");
                0
            }),
            None => {
                warn!("config key '{key}' not found");
                0
            }
        }
    }

    /// `get_double` for keys that have a documented default. No warning is
    /// logged when the key is absent.
    pub fn double_or(&self, key: &str, default: f64) -> f64 {
        if self.has(key) {
            self.get_double(key)
        } else {
            default
        }
    }

    /// Integer counterpart of [`ConfigStore::double_or`].
    pub fn int_or(&self, key: &str, default: i64) -> i64 {
        if self.has(key) {
            self.get_int(key)
        } else {
            default
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sorted snapshot of every entry, for run metadata.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_pairs() {
        let c = ConfigStore::parse("particle kaon-\nmomentum 0.735\n");
        assert_eq!(c.get("particle"), "kaon-");
        assert!((c.get_double("momentum") - 0.735).abs() < 1e-12);
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn test_parse_last_write_wins() {
        let c = ConfigStore::parse("qe_scale 1.0\nqe_scale 2.0\n");
        assert_eq!(c.get_double("qe_scale"), 2.0);
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn test_parse_skips_blank_comment_and_malformed_lines() {
        let text = "\n# comment line\nlonely\n   \nkey value extra tokens\n";
        let c = ConfigStore::parse(text);
        assert_eq!(c.len(), 1);
        assert_eq!(c.get("key"), "value");
        assert!(!c.has("lonely"));
        assert!(!c.has("#"));
    }

    #[test]
    fn test_missing_keys_return_zero_values() {
        let c = ConfigStore::new();
        assert_eq!(c.get("nope"), "");
        assert_eq!(c.get_double("nope"), 0.0);
        assert_eq!(c.get_int("nope"), 0);
        assert!(!c.has("nope"));
    }

    #[test]
    fn test_unparsable_numbers_return_zero() {
        let c = ConfigStore::parse("n_events lots\nscale abc\n");
        assert_eq!(c.get_int("n_events"), 0);
        assert_eq!(c.get_double("scale"), 0.0);
    }

    #[test]
    fn test_defaults_only_apply_when_absent() {
        let c = ConfigStore::parse("cherenkov_emin 2.0\n");
        assert_eq!(c.double_or("cherenkov_emin", 1.37), 2.0);
        assert_eq!(c.double_or("cherenkov_emax", 3.87), 3.87);
        assert_eq!(c.int_or("mppc_per_row", 16), 16);
    }

    #[test]
    fn test_apply_override() {
        let mut c = ConfigStore::parse("momentum 0.735\n");
        assert!(c.apply_override("momentum = 1.2"));
        assert!(!c.apply_override("garbage"));
        assert!(!c.apply_override("=3"));
        assert_eq!(c.get_double("momentum"), 1.2);
    }

    #[test]
    fn test_load_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("kvc.conf");
        std::fs::write(&path, "detection_mode qe\nqe_scale 0.9\n").unwrap();
        let c = ConfigStore::load(&path).unwrap();
        assert_eq!(c.get("detection_mode"), "qe");
        assert!(ConfigStore::load(tmp.path().join("missing.conf")).is_err());
    }
}
