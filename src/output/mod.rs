//! Output writers for histograms and run statistics.
//!
//! This module handles writing pipeline results to disk:
//! - `.histo` text histograms
//! - `.stats` paging run summaries
//! - The JSON run summary

pub mod histo;
pub mod stats;
pub mod summary;

use crate::utils::error::OutputError;
use log::debug;
use std::path::Path;

// Re-export main functions
pub use histo::{read_histogram, write_histogram};
pub use stats::write_stats;
pub use summary::{read_summary, write_summary, HistogramEntry, PagingSummary, RunSummary};

/// Validate that an output path is writable
///
/// Empty paths and existing directories are rejected. A missing parent is
/// fine; writers create it.
pub fn validate_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

/// Create the parent directories of `path` when missing
pub(crate) fn ensure_parent(path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }
    Ok(())
}
