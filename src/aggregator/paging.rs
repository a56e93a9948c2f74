//! Page-replacement run statistics.
//!
//! Paging runs describe themselves with a handful of pass-through events:
//!
//! | Event | Carries |
//! |---|---|
//! | `PRP` | replacement policy name (payload) |
//! | `PROGRAM` | program path (payload) |
//! | `DELTA` | working-set delta (tag) |
//! | `PAGE_FAULTS` / `PAGE_OUTS` / `PAGE_INS` | counters (tag) |
//! | `UserTicksSinceLastPageFault` | one inter-fault interval (tag) |

use crate::event::Event;
use crate::histogram::Histogram;
use crate::pipeline::{Record, RecordSink};
use crate::utils::config::{HISTO_EXTENSION, STATS_EXTENSION};
use crate::utils::error::{HistogramError, PagingError};
use log::{debug, warn};
use std::path::Path;

/// Collects paging counters and inter-fault samples from the event stream
#[derive(Debug, Default)]
pub struct PagingCollector {
    program: Option<String>,
    policy: Option<String>,
    delta: Option<u64>,
    page_faults: Option<u64>,
    page_outs: Option<u64>,
    page_ins: Option<u64>,
    inter_fault: Vec<u64>,
    seen: bool,
}

impl PagingCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any paging event has been observed
    pub fn is_active(&self) -> bool {
        self.seen
    }

    /// Record a paging event; other events are ignored
    pub fn observe(&mut self, event: &Event) {
        if !event.category.is_pass_through() {
            return;
        }

        match event.category.short_name() {
            "PRP" => self.policy = Some(event.payload_text().trim().to_string()),
            "PROGRAM" => self.program = Some(program_label(&event.payload_text())),
            "DELTA" => self.delta = Some(event.tag),
            "PAGE_FAULTS" => self.page_faults = Some(event.tag),
            "PAGE_OUTS" => self.page_outs = Some(event.tag),
            "PAGE_INS" => self.page_ins = Some(event.tag),
            "UserTicksSinceLastPageFault" => self.inter_fault.push(event.tag),
            _ => return,
        }
        self.seen = true;
    }

    /// Assemble the run report
    ///
    /// Returns `Ok(None)` when the stream carried no paging events.
    ///
    /// # Errors
    /// * `PagingError::MissingField` - a paging run without one of its descriptors
    pub fn finalize(self) -> Result<Option<PagingReport>, PagingError> {
        if !self.seen {
            return Ok(None);
        }

        let report = PagingReport {
            program: self.program.ok_or(PagingError::MissingField("PROGRAM"))?,
            policy: self.policy.ok_or(PagingError::MissingField("PRP"))?,
            delta: self.delta.ok_or(PagingError::MissingField("DELTA"))?,
            page_faults: self.page_faults.ok_or(PagingError::MissingField("PAGE_FAULTS"))?,
            page_outs: self.page_outs.ok_or(PagingError::MissingField("PAGE_OUTS"))?,
            page_ins: self.page_ins.ok_or(PagingError::MissingField("PAGE_INS"))?,
            inter_fault: self.inter_fault,
        };

        debug!(
            "Paging run {}: {} faults, {} inter-fault samples",
            report.run_label(),
            report.page_faults,
            report.inter_fault.len()
        );
        Ok(Some(report))
    }
}

impl RecordSink for PagingCollector {
    fn accept(&mut self, record: &Record) {
        if let Record::Event(event) = record {
            self.observe(event);
        }
    }
}

/// Summary of one page-replacement run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagingReport {
    pub program: String,
    pub policy: String,
    pub delta: u64,
    pub page_faults: u64,
    pub page_outs: u64,
    pub page_ins: u64,
    pub inter_fault: Vec<u64>,
}

impl PagingReport {
    /// `<program>_<policy>_<delta>`
    pub fn run_label(&self) -> String {
        format!("{}_{}_{}", self.program, self.policy, self.delta)
    }

    pub fn stats_file_name(&self) -> String {
        format!("{}.{}", self.run_label(), STATS_EXTENSION)
    }

    pub fn histogram_file_name(&self) -> String {
        format!("{}.{}", self.run_label(), HISTO_EXTENSION)
    }

    /// Run descriptor line followed by the counter triple
    pub fn stats_text(&self) -> String {
        format!(
            "{} {} {}\n{} {} {}\n",
            self.program, self.policy, self.delta, self.page_faults, self.page_outs, self.page_ins
        )
    }

    /// Inter-fault histogram, `None` when no samples were recorded
    pub fn histogram(&self, bucket_count: usize) -> Result<Option<Histogram>, HistogramError> {
        if self.inter_fault.is_empty() {
            warn!("Paging run {} has no inter-fault samples", self.run_label());
            return Ok(None);
        }
        Histogram::build(&self.inter_fault, bucket_count).map(Some)
    }
}

/// Program label: the file name of the program path
fn program_label(path: &str) -> String {
    let path = path.trim();
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}
