//! Trace events and their schema.
//!
//! This module handles:
//! - The category taxonomy of simulator events
//! - Event and interval record definitions
//! - Reading JSON-lines traces

pub mod category;
pub mod reader;
pub mod schema;

// Re-export main types
pub use category::Category;
pub use reader::{open_trace, parse_event_line, TraceReader};
pub use schema::{Event, Interval, IntervalKind, SubjectId, Tick};
