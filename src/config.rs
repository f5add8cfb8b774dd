//! Configuration for approval file naming and diff output
//!
//! Settings are optional: without a config file every approval uses the
//! defaults below. A `texpect.json` in the test directory or one of its
//! ancestors lets a project rename the artifact extensions or the stripped
//! test prefix without touching test code. The `texpect` binary looks the
//! file up the same way from the directory it scans.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::naming::TEST_PREFIX;

/// Config file name searched for in a directory and its ancestors.
pub const DEFAULT_CONFIG_FILE: &str = "texpect.json";

static ACTIVE: Lazy<ApprovalConfig> = Lazy::new(ApprovalConfig::load);

/// Configuration discovered from the working directory, loaded once per
/// process.
pub fn active() -> &'static ApprovalConfig {
    &ACTIVE
}

/// Complete approval configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApprovalConfig {
    /// Extension of the hand-curated reference file
    pub approved_extension: String,
    /// Extension of the artifact written on failure
    pub received_extension: String,
    /// Prefix stripped from test function and file names
    pub test_prefix: String,
    /// Unchanged lines shown around each difference
    pub context_lines: usize,
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self {
            approved_extension: "ok".to_string(),
            received_extension: "nok".to_string(),
            test_prefix: TEST_PREFIX.to_string(),
            context_lines: 1,
        }
    }
}

impl ApprovalConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The loaded configuration, or the defaults if the file is missing or
    /// its JSON is invalid.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::debug!(
                    "[Config] No config file {:?} ({}). Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load the nearest `texpect.json` found in `start` or one of its
    /// ancestors, or the defaults when there is none.
    pub fn discover<P: AsRef<Path>>(start: P) -> Self {
        let start =
            fs::canonicalize(start.as_ref()).unwrap_or_else(|_| start.as_ref().to_path_buf());
        match start
            .ancestors()
            .map(|dir| dir.join(DEFAULT_CONFIG_FILE))
            .find(|candidate| candidate.is_file())
        {
            Some(path) => Self::load_from_file(path),
            None => {
                log::debug!(
                    "[Config] No {} above {:?}. Using defaults.",
                    DEFAULT_CONFIG_FILE,
                    start
                );
                Self::default()
            }
        }
    }

    /// [`discover`](Self::discover) starting at the working directory.
    pub fn load() -> Self {
        match std::env::current_dir() {
            Ok(dir) => Self::discover(dir),
            Err(err) => {
                log::warn!("[Config] Working directory unavailable ({}). Using defaults.", err);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApprovalConfig::default();
        assert_eq!(config.approved_extension, "ok");
        assert_eq!(config.received_extension, "nok");
        assert_eq!(config.test_prefix, "test_");
        assert_eq!(config.context_lines, 1);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let parsed: ApprovalConfig =
            serde_json::from_str(r#"{"approved_extension": "approved.txt"}"#).unwrap();
        assert_eq!(parsed.approved_extension, "approved.txt");
        assert_eq!(parsed.received_extension, "nok");
        assert_eq!(parsed.context_lines, 1);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("texpect.json");
        fs::write(&path, r#"{"received_extension": "received", "context_lines": 3}"#).unwrap();

        let config = ApprovalConfig::load_from_file(&path);
        assert_eq!(config.received_extension, "received");
        assert_eq!(config.context_lines, 3);
    }

    #[test]
    fn test_invalid_or_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{not json").unwrap();

        assert_eq!(ApprovalConfig::load_from_file(&broken), ApprovalConfig::default());
        assert_eq!(
            ApprovalConfig::load_from_file(dir.path().join("absent.json")),
            ApprovalConfig::default()
        );
    }

    #[test]
    fn test_discover_walks_up_to_nearest_file() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("tests").join("golden");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            r#"{"received_extension": "received"}"#,
        )
        .unwrap();

        assert_eq!(ApprovalConfig::discover(&nested).received_extension, "received");

        fs::write(
            nested.join(DEFAULT_CONFIG_FILE),
            r#"{"received_extension": "closer"}"#,
        )
        .unwrap();
        assert_eq!(ApprovalConfig::discover(&nested).received_extension, "closer");
    }

    #[test]
    fn test_discover_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(ApprovalConfig::discover(dir.path()), ApprovalConfig::default());
    }

    #[test]
    fn test_active_config_is_loaded_once() {
        assert!(std::ptr::eq(active(), active()));
        assert_eq!(active(), &ApprovalConfig::load());
    }
}
