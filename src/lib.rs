//! trace-histo
//!
//! Scheduling interval histograms and page-replacement statistics from
//! simulator event traces.
//!
//! The pipeline reads a JSON-lines trace, reconstructs per-subject
//! active/inactive intervals from scheduling events, partitions their
//! durations into epoch snapshots at exit markers, and bins each snapshot
//! into a fixed-format `.histo` text histogram.
//!
//! ## Getting Started
//!
//! ```bash
//! trace-histo process --trace run.jsonl --out-dir histograms
//! trace-histo inspect --file histograms/B.active.histo
//! ```

pub mod aggregator;
pub mod commands;
pub mod event;
pub mod histogram;
pub mod output;
pub mod pipeline;
pub mod utils;
