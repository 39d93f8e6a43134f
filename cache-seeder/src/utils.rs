/// Loading the work list from key files
pub mod keys {
    use crate::types::{InputKey, Result, SeederError};
    use std::fs;
    use std::path::{Path, PathBuf};
    use tracing::info;

    /// Reads a JSON array of identifier strings.
    pub fn load_key_file(path: &Path) -> Result<Vec<InputKey>> {
        let raw = fs::read_to_string(path).map_err(|e| SeederError::InputKeys {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| SeederError::InputKeys {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Concatenates key files in the order given. Duplicates are kept; the
    /// seeder skips repeats on its own.
    pub fn load_keys(paths: &[PathBuf]) -> Result<Vec<InputKey>> {
        let mut keys = Vec::new();
        for path in paths {
            let mut batch = load_key_file(path)?;
            info!("Loaded {} keys from {}", batch.len(), path.display());
            keys.append(&mut batch);
        }
        Ok(keys)
    }
}

/// Run timestamps and file naming
pub mod time {
    use chrono::{DateTime, TimeZone};
    use std::path::{Path, PathBuf};

    pub const STAMP_FORMAT: &str = "%Y_%m_%d_%H_%M_%S";

    pub fn run_stamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        at.format(STAMP_FORMAT).to_string()
    }

    pub fn log_file_path(output_dir: &Path, stamp: &str) -> PathBuf {
        output_dir.join(format!("{}.log", stamp))
    }

    pub fn results_file_path(output_dir: &Path, stamp: &str) -> PathBuf {
        output_dir.join(format!("{}_results.json", stamp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SeederError;
    use chrono::{TimeZone, Utc};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    #[test]
    fn concatenates_key_files_in_order() {
        let dir = TempDir::new().unwrap();
        let mondo = dir.path().join("mondo_curies.json");
        let hpo = dir.path().join("hpo_curies.json");
        fs::write(&mondo, r#"["MONDO:1", "MONDO:2"]"#).unwrap();
        fs::write(&hpo, r#"["HP:1", "MONDO:1"]"#).unwrap();

        let loaded = keys::load_keys(&[mondo, hpo]).unwrap();
        assert_eq!(loaded, vec!["MONDO:1", "MONDO:2", "HP:1", "MONDO:1"]);
    }

    #[test]
    fn bad_key_files_are_fatal() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            keys::load_keys(&[missing]),
            Err(SeederError::InputKeys { .. })
        ));

        let not_strings = dir.path().join("numbers.json");
        fs::write(&not_strings, "[1, 2, 3]").unwrap();
        assert!(matches!(
            keys::load_key_file(&not_strings),
            Err(SeederError::InputKeys { .. })
        ));
    }

    #[test]
    fn file_names_follow_run_stamp() {
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 1).unwrap();
        let stamp = time::run_stamp(&at);
        assert_eq!(stamp, "2024_03_07_09_05_01");

        let dir = Path::new("prod");
        assert_eq!(time::log_file_path(dir, &stamp), Path::new("prod/2024_03_07_09_05_01.log"));
        assert_eq!(
            time::results_file_path(dir, &stamp),
            Path::new("prod/2024_03_07_09_05_01_results.json")
        );
    }
}
