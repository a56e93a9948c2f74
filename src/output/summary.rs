//! JSON run summary.
//!
//! Lists every file a `process` run produced together with the settings and
//! counters of the run, so downstream tooling does not have to glob the
//! output directory.

use super::{ensure_parent, validate_path};
use crate::aggregator::{NamedHistogram, PagingReport};
use crate::event::{IntervalKind, SubjectId, Tick};
use crate::pipeline::PipelineStats;
use crate::utils::config::{PipelineConfig, SUMMARY_VERSION};
use crate::utils::error::OutputError;
use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Top-level summary of one processing run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Summary schema version
    pub version: String,

    /// Trace file the run consumed
    pub trace: String,

    /// Settings the run used
    pub config: PipelineConfig,

    pub stats: PipelineStats,

    /// Snapshot cut ticks, the closing cut included
    pub cut_keys: Vec<Tick>,

    pub histograms: Vec<HistogramEntry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging: Option<PagingSummary>,

    /// ISO 8601 timestamp
    pub generated_at: String,
}

/// One written interval histogram
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramEntry {
    pub file: String,
    pub subject: SubjectId,
    pub label: String,
    pub kind: IntervalKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epoch: Option<Tick>,
    pub samples: u64,
    pub bucket_width: u64,
}

impl From<&NamedHistogram> for HistogramEntry {
    fn from(named: &NamedHistogram) -> Self {
        Self {
            file: named.file_name(),
            subject: named.subject,
            label: named.label.clone(),
            kind: named.kind,
            epoch: named.epoch,
            samples: named.histogram.total_count(),
            bucket_width: named.histogram.spec().bucket_width(),
        }
    }
}

/// Paging run outputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingSummary {
    pub run: String,
    pub stats_file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub histogram_file: Option<String>,
    pub page_faults: u64,
    pub page_outs: u64,
    pub page_ins: u64,
}

impl PagingSummary {
    pub fn new(report: &PagingReport, histogram_written: bool) -> Self {
        Self {
            run: report.run_label(),
            stats_file: report.stats_file_name(),
            histogram_file: histogram_written.then(|| report.histogram_file_name()),
            page_faults: report.page_faults,
            page_outs: report.page_outs,
            page_ins: report.page_ins,
        }
    }
}

impl RunSummary {
    /// Start a summary stamped with the current time
    pub fn new(trace: impl Into<String>, config: &PipelineConfig, stats: PipelineStats) -> Self {
        Self {
            version: SUMMARY_VERSION.to_string(),
            trace: trace.into(),
            config: config.clone(),
            stats,
            cut_keys: Vec::new(),
            histograms: Vec::new(),
            paging: None,
            generated_at: Utc::now().to_rfc3339(),
        }
    }

    /// Total number of files the run wrote, the summary excluded
    pub fn file_count(&self) -> usize {
        let paging = self
            .paging
            .as_ref()
            .map_or(0, |p| 1 + usize::from(p.histogram_file.is_some()));
        self.histograms.len() + paging
    }
}

/// Write a run summary as pretty JSON
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is a directory
pub fn write_summary(
    summary: &RunSummary,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();
    info!("Writing run summary to: {}", output_path.display());

    validate_path(output_path)?;
    ensure_parent(output_path)?;

    let writer = BufWriter::new(File::create(output_path)?);
    serde_json::to_writer_pretty(writer, summary)?;

    Ok(())
}

/// Read a run summary back
pub fn read_summary(input_path: impl AsRef<Path>) -> Result<RunSummary, OutputError> {
    let input_path = input_path.as_ref();
    debug!("Reading run summary from: {}", input_path.display());

    let file = File::open(input_path)?;
    let summary: RunSummary = serde_json::from_reader(file)?;
    Ok(summary)
}
