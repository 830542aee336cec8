pub mod inspect;
pub mod qe;
pub mod report;
pub mod run;
pub mod tables;

use std::collections::BTreeMap;

use kvcsim_core::{ConfigStore, RunData, RunReader};

/// Load the configuration file (if any) and apply `key=value` overrides.
/// Exits on an unreadable file or a malformed override.
pub fn load_config(path: Option<&str>, overrides: &[String]) -> ConfigStore {
    let mut config = match path {
        Some(p) => match ConfigStore::load(p) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error reading config {p}: {e}");
                std::process::exit(1);
            }
        },
        None => ConfigStore::new(),
    };
    for spec in overrides {
        if !config.apply_override(spec) {
            eprintln!("Invalid override '{spec}': expected KEY=VALUE");
            std::process::exit(1);
        }
    }
    config
}

/// Rebuild a configuration from the snapshot stored in run.json.
pub fn config_from_snapshot(snapshot: &BTreeMap<String, String>) -> ConfigStore {
    let mut config = ConfigStore::new();
    for (k, v) in snapshot {
        config.set(k, v);
    }
    config
}

/// Read a run directory or exit.
pub fn open_run(run_dir: &str) -> RunData {
    match RunReader::open(run_dir) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Error reading run {run_dir}: {e}");
            std::process::exit(1);
        }
    }
}
