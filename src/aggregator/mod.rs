//! Stateful consumers of the event stream.
//!
//! This module turns the ordered trace into:
//! - Active/inactive intervals (per-subject state machine)
//! - Epoch snapshots of interval durations
//! - Page-replacement run statistics

pub mod intervals;
pub mod paging;
pub mod snapshot;
pub mod subjects;

// Re-export main types
pub use intervals::IntervalExtractor;
pub use paging::{PagingCollector, PagingReport};
pub use snapshot::{lookup_label, EpochSeries, NamedHistogram, SnapshotAggregator, SnapshotReport};
pub use subjects::SubjectArena;
