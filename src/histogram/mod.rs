//! Fixed-layout duration histograms.
//!
//! - `builder` fits a bucket layout to a sample set and bins it
//! - `format` renders and parses the `.histo` text record format

pub mod builder;
pub mod format;

pub use builder::{Bucket, Histogram, HistogramSpec};
pub use format::{parse_histogram, BucketRecord};
