//! [`PersistencePort`] adapter: the `key=value` run-cycle ledger file,
//! read on startup, written on every persistence tick and on graceful
//! termination.

use std::fs;
use std::path::PathBuf;

use crate::domain::ports::{PersistencePort, RunCycleLedger};

pub struct FileLedger {
    path: PathBuf,
}

impl FileLedger {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl PersistencePort for FileLedger {
    /// Parse `C1RunCs`/`C2RunCs` out of the file. A missing file yields
    /// a zeroed ledger and is created with zeros so `load` is
    /// idempotent across restarts, per the external interface contract.
    fn load(&mut self) -> Result<RunCycleLedger, String> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let ledger = RunCycleLedger::default();
                self.save(&ledger)?;
                return Ok(ledger);
            }
            Err(e) => return Err(format!("{}: {e}", self.path.display())),
        };

        let mut ledger = RunCycleLedger::default();
        for line in text.lines() {
            let line = line.trim();
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            match key.trim() {
                "C1RunCs" => ledger.c1_run_cs = value.trim().parse().unwrap_or(0),
                "C2RunCs" => ledger.c2_run_cs = value.trim().parse().unwrap_or(0),
                _ => {}
            }
        }
        Ok(ledger)
    }

    fn save(&mut self, ledger: &RunCycleLedger) -> Result<(), String> {
        let text = format!("C1RunCs={}\nC2RunCs={}\n", ledger.c1_run_cs, ledger.c2_run_cs);
        fs::write(&self.path, text).map_err(|e| format!("{}: {e}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_as_zero_and_creates_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hpmd.state");
        let mut ledger_file = FileLedger::new(path.clone());
        let ledger = ledger_file.load().unwrap();
        assert_eq!(ledger, RunCycleLedger::default());
        assert!(path.exists());
    }

    #[test]
    fn round_trips_nonzero_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hpmd.state");
        let mut ledger_file = FileLedger::new(path);
        let ledger = RunCycleLedger {
            c1_run_cs: 42,
            c2_run_cs: 7,
        };
        ledger_file.save(&ledger).unwrap();
        let loaded = ledger_file.load().unwrap();
        assert_eq!(loaded, ledger);
    }
}
