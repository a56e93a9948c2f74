//! Configuration and constants for the pipeline.
//!
//! Constants describe the fixed `.histo` record format and the defaults of
//! the tunable pipeline parameters. `PipelineConfig` groups the tunables and
//! can be loaded from a TOML file.

use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Current run summary schema version
pub const SUMMARY_VERSION: &str = "1.0.0";

/// Bucket count for active/inactive interval histograms
pub const INTERVAL_BUCKETS: usize = 20;

/// Bucket count for other duration distributions (inter-fault ticks)
pub const PAGING_BUCKETS: usize = 50;

/// Number of exit markers that pass before snapshot cuts start
pub const DEFAULT_GRACE_MARKERS: u32 = 2;

/// Administrative/bootstrap subjects, never written out
pub const RESERVED_SUBJECTS: &[u32] = &[0, 1];

/// Ordinal subject label table (index = subject id)
pub const SUBJECT_LABELS: &[&str] = &["OOPS", "OOPS", "A", "C", "D", "B"];

// Sentinel min/max printed for empty buckets and the underflow/overflow rows
pub const SENTINEL_MIN: i64 = i32::MAX as i64;
pub const SENTINEL_MAX: i64 = i32::MIN as i64;

/// Right-justified width of each integer in a histogram record
pub const RECORD_WIDTH: usize = 9;

/// Header prefix of a serialized histogram
pub const HSPEC_PREFIX: &str = "#HSPEC:";

pub const HISTO_EXTENSION: &str = "histo";
pub const STATS_EXTENSION: &str = "stats";
pub const SUMMARY_FILE_NAME: &str = "summary.json";

/// Tunable pipeline parameters
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Exit markers ignored before the first snapshot cut
    pub grace_markers: u32,

    /// Buckets per interval histogram
    pub interval_buckets: usize,

    /// Buckets per inter-fault histogram
    pub paging_buckets: usize,

    /// Subject label table (index = subject id)
    pub labels: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            grace_markers: DEFAULT_GRACE_MARKERS,
            interval_buckets: INTERVAL_BUCKETS,
            paging_buckets: PAGING_BUCKETS,
            labels: SUBJECT_LABELS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl PipelineConfig {
    /// Reject configurations the histogram builder cannot honour
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_buckets == 0 {
            return Err(ConfigError::Invalid(
                "interval_buckets must be greater than 0".to_string(),
            ));
        }
        if self.paging_buckets == 0 {
            return Err(ConfigError::Invalid(
                "paging_buckets must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load pipeline configuration from a TOML file
///
/// Missing keys fall back to their defaults.
///
/// # Example
/// ```ignore
/// let config = load_config("pipeline.toml")?;
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<PipelineConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: PipelineConfig = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.grace_markers, 2);
        assert_eq!(config.interval_buckets, 20);
        assert_eq!(config.paging_buckets, 50);
        assert_eq!(config.labels, vec!["OOPS", "OOPS", "A", "C", "D", "B"]);
    }

    #[test]
    fn test_load_partial_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "grace_markers = 0").unwrap();
        writeln!(file, "labels = [\"X\", \"Y\", \"Z\"]").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.grace_markers, 0);
        assert_eq!(config.interval_buckets, INTERVAL_BUCKETS);
        assert_eq!(config.labels, vec!["X", "Y", "Z"]);
    }

    #[test]
    fn test_load_rejects_zero_buckets() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "interval_buckets = 0").unwrap();

        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "grace_markers = \"two\"").unwrap();

        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
    }
}
