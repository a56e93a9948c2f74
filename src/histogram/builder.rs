//! Bin durations into a fixed bucket layout.
//!
//! Buckets start at zero and share one width derived from the largest
//! sample. Bucket `i` nominally covers `[i*w, i*w + w - 1]`; a value lands in
//! the first bucket whose upper bound strictly exceeds it, and anything past
//! the last upper bound is absorbed by the last bucket.

use crate::utils::error::HistogramError;
use log::debug;

/// Bucket layout of a histogram
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistogramSpec {
    bucket_count: usize,
    bucket_width: u64,
}

impl HistogramSpec {
    /// Lower bound of the first bucket
    pub const MIN_VALUE: u64 = 0;

    /// Create a layout; a zero width is raised to 1
    pub fn new(bucket_count: usize, bucket_width: u64) -> Result<Self, HistogramError> {
        if bucket_count == 0 {
            return Err(HistogramError::ZeroBuckets);
        }
        Ok(Self {
            bucket_count,
            bucket_width: bucket_width.max(1),
        })
    }

    /// Fit a layout to a sample set
    ///
    /// `bucket_width = floor(max / bucket_count)`, or 1 when every sample is
    /// smaller than `bucket_count`.
    ///
    /// # Errors
    /// * `HistogramError::EmptyInput` - no samples to take a maximum over
    /// * `HistogramError::ZeroBuckets` - `bucket_count` is 0
    pub fn fit(durations: &[u64], bucket_count: usize) -> Result<Self, HistogramError> {
        if bucket_count == 0 {
            return Err(HistogramError::ZeroBuckets);
        }
        let high = durations
            .iter()
            .copied()
            .max()
            .ok_or(HistogramError::EmptyInput)?;

        Self::new(bucket_count, (high - Self::MIN_VALUE) / bucket_count as u64)
    }

    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    pub fn bucket_width(&self) -> u64 {
        self.bucket_width
    }

    /// Nominal lower bound of bucket `index`
    pub fn bucket_low(&self, index: usize) -> u64 {
        Self::MIN_VALUE + index as u64 * self.bucket_width
    }

    /// Nominal upper bound of bucket `index`
    pub fn bucket_high(&self, index: usize) -> u64 {
        self.bucket_low(index) + self.bucket_width - 1
    }

    /// Index of the bucket that receives `value`
    pub fn bucket_for(&self, value: u64) -> usize {
        // First i with (i + 1) * w - 1 > value, i.e. i = floor((value + 1) / w)
        let index = value.saturating_add(1) / self.bucket_width;
        usize::try_from(index)
            .unwrap_or(usize::MAX)
            .min(self.bucket_count - 1)
    }
}

/// Per-bucket tally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bucket {
    pub count: u64,
    pub min: Option<u64>,
    pub max: Option<u64>,
}

impl Bucket {
    fn record(&mut self, value: u64) {
        self.count += 1;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }
}

/// An immutable, fully binned histogram
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    spec: HistogramSpec,
    buckets: Vec<Bucket>,
}

impl Histogram {
    /// Fit a layout to `durations` and bin them
    ///
    /// **Public** - main entry point for histogram building
    ///
    /// # Example
    /// ```ignore
    /// let histogram = Histogram::build(&[1, 1, 1, 50], 10)?;
    /// assert_eq!(histogram.spec().bucket_width(), 5);
    /// ```
    pub fn build(durations: &[u64], bucket_count: usize) -> Result<Self, HistogramError> {
        let spec = HistogramSpec::fit(durations, bucket_count)?;
        Ok(Self::with_spec(spec, durations))
    }

    /// Bin `durations` against an existing layout
    ///
    /// An empty sample set yields a histogram of empty buckets.
    pub fn with_spec(spec: HistogramSpec, durations: &[u64]) -> Self {
        let mut buckets = vec![Bucket::default(); spec.bucket_count()];
        for &value in durations {
            buckets[spec.bucket_for(value)].record(value);
        }

        debug!(
            "Binned {} samples into {} buckets of width {}",
            durations.len(),
            spec.bucket_count(),
            spec.bucket_width()
        );

        Self { spec, buckets }
    }

    /// Assemble from already binned buckets
    pub(crate) fn from_parts(spec: HistogramSpec, buckets: Vec<Bucket>) -> Self {
        debug_assert_eq!(spec.bucket_count(), buckets.len());
        Self { spec, buckets }
    }

    pub fn spec(&self) -> &HistogramSpec {
        &self.spec
    }

    /// Real buckets, in index order
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// Number of samples binned
    pub fn total_count(&self) -> u64 {
        self.buckets.iter().map(|b| b.count).sum()
    }

    /// Largest sample binned, if any
    pub fn max_seen(&self) -> Option<u64> {
        self.buckets.iter().filter_map(|b| b.max).max()
    }
}
