//! `.stats` writer for paging runs.

use super::{ensure_parent, validate_path};
use crate::aggregator::PagingReport;
use crate::utils::error::OutputError;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Write the run's `.stats` file into `dir`
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::InvalidPath` - Path cannot be created or is a directory
pub fn write_stats(dir: impl AsRef<Path>, report: &PagingReport) -> Result<PathBuf, OutputError> {
    let path = dir.as_ref().join(report.stats_file_name());

    validate_path(&path)?;
    ensure_parent(&path)?;
    fs::write(&path, report.stats_text())?;

    debug!("Paging stats written to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_write_stats() {
        let temp_dir = tempfile::tempdir().unwrap();
        let report = PagingReport {
            program: "sort".to_string(),
            policy: "lru".to_string(),
            delta: 8,
            page_faults: 31,
            page_outs: 12,
            page_ins: 19,
            inter_fault: vec![4, 5],
        };

        let path = write_stats(temp_dir.path(), &report).unwrap();

        assert_eq!(path.file_name().unwrap(), "sort_lru_8.stats");
        assert_eq!(fs::read_to_string(path).unwrap(), "sort lru 8\n31 12 19\n");
    }
}
