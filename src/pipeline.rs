//! Event stream dispatch.
//!
//! The interval extractor turns each raw event into an ordered batch of
//! records (closed intervals first, then the forwarded event). Every batch is
//! delivered to each downstream sink in the same order, so all consumers
//! observe one stream.

use crate::aggregator::{
    IntervalExtractor, PagingCollector, PagingReport, SnapshotAggregator, SnapshotReport,
};
use crate::event::{Category, Event, Interval};
use crate::utils::config::PipelineConfig;
use crate::utils::error::{PagingError, ParseError};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// One element of the processed stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Interval(Interval),
    Event(Event),
}

impl Record {
    pub fn as_interval(&self) -> Option<&Interval> {
        match self {
            Self::Interval(interval) => Some(interval),
            Self::Event(_) => None,
        }
    }

    pub fn as_event(&self) -> Option<&Event> {
        match self {
            Self::Event(event) => Some(event),
            Self::Interval(_) => None,
        }
    }

    /// Exit events double as epoch markers for snapshot cuts
    pub fn is_epoch_marker(&self) -> bool {
        matches!(self, Self::Event(e) if e.category == Category::SubjectExited)
    }
}

/// A downstream consumer of records
pub trait RecordSink {
    fn accept(&mut self, record: &Record);
}

/// Deliver each record to every sink, records in order
pub fn fan_out(records: &[Record], sinks: &mut [&mut dyn RecordSink]) {
    for record in records {
        for sink in sinks.iter_mut() {
            sink.accept(record);
        }
    }
}

/// Sink that keeps every record it sees
#[derive(Debug, Default)]
pub struct RecordLog {
    records: Vec<Record>,
}

impl RecordLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn intervals(&self) -> impl Iterator<Item = &Interval> {
        self.records.iter().filter_map(Record::as_interval)
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl RecordSink for RecordLog {
    fn accept(&mut self, record: &Record) {
        self.records.push(record.clone());
    }
}

/// Counters gathered while the stream is processed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub events: u64,
    pub ticks: u64,
    pub intervals: u64,
    pub forwarded: u64,
    pub epoch_markers: u64,
}

/// Everything the pipeline produces once the stream ends
#[derive(Debug)]
pub struct PipelineOutput {
    pub snapshots: SnapshotReport,
    pub paging: Option<PagingReport>,
    pub stats: PipelineStats,
}

/// Interval extraction wired to the snapshot aggregator and paging collector
#[derive(Debug)]
pub struct Pipeline {
    extractor: IntervalExtractor,
    snapshots: SnapshotAggregator,
    paging: PagingCollector,
    stats: PipelineStats,
}

impl Pipeline {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            extractor: IntervalExtractor::new(),
            snapshots: SnapshotAggregator::new(config.grace_markers),
            paging: PagingCollector::new(),
            stats: PipelineStats::default(),
        }
    }

    /// Process one event
    pub fn feed(&mut self, event: Event) {
        self.stats.events += 1;
        let records = self.extractor.feed(event);
        if records.is_empty() {
            self.stats.ticks += 1;
            return;
        }

        for record in &records {
            match record {
                Record::Interval(_) => self.stats.intervals += 1,
                Record::Event(_) => self.stats.forwarded += 1,
            }
            if record.is_epoch_marker() {
                self.stats.epoch_markers += 1;
            }
        }

        fan_out(&records, &mut [&mut self.snapshots, &mut self.paging]);
    }

    /// Process a whole event stream, stopping at the first read error
    ///
    /// # Errors
    /// * `ParseError` - the underlying reader failed
    pub fn feed_all<I>(&mut self, events: I) -> Result<(), ParseError>
    where
        I: IntoIterator<Item = Result<Event, ParseError>>,
    {
        for event in events {
            self.feed(event?);
        }
        debug!("Stream consumed at t={}", self.extractor.now());
        Ok(())
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Close the stream and collect the results
    ///
    /// # Errors
    /// * `PagingError::MissingField` - paging events seen but incomplete
    pub fn finalize(self) -> Result<PipelineOutput, PagingError> {
        info!(
            "Processed {} events ({} ticks, {} intervals)",
            self.stats.events, self.stats.ticks, self.stats.intervals
        );

        Ok(PipelineOutput {
            snapshots: self.snapshots.finalize(),
            paging: self.paging.finalize()?,
            stats: self.stats,
        })
    }
}
