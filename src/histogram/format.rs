//! Canonical `.histo` text record format.
//!
//! ```text
//! #HSPEC:<bucket_count>,<bucket_width>,0
//!         0	        0	2147483647	-2147483648
//!         1	        3	        1	        1
//! ...
//!        21	        0	2147483647	-2147483648
//! ```
//!
//! Every file carries `bucket_count + 2` records: an underflow sentinel at
//! index 0, the real buckets at `1..=bucket_count`, and an overflow sentinel
//! at `bucket_count + 1`. Sentinel rows are always empty.

use super::builder::{Bucket, Histogram, HistogramSpec};
use crate::utils::config::{HSPEC_PREFIX, RECORD_WIDTH, SENTINEL_MAX, SENTINEL_MIN};
use crate::utils::error::HistogramError;
use std::fmt;

/// One serialized row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketRecord {
    pub index: usize,
    pub count: u64,
    pub min: i64,
    pub max: i64,
}

impl BucketRecord {
    fn sentinel(index: usize) -> Self {
        Self {
            index,
            count: 0,
            min: SENTINEL_MIN,
            max: SENTINEL_MAX,
        }
    }

    fn from_bucket(index: usize, bucket: &Bucket) -> Self {
        Self {
            index,
            count: bucket.count,
            min: bucket.min.map_or(SENTINEL_MIN, clamp_to_i64),
            max: bucket.max.map_or(SENTINEL_MAX, clamp_to_i64),
        }
    }
}

impl fmt::Display for BucketRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>w$}\t{:>w$}\t{:>w$}\t{:>w$}",
            self.index,
            self.count,
            self.min,
            self.max,
            w = RECORD_WIDTH
        )
    }
}

impl fmt::Display for HistogramSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{},{},{}",
            HSPEC_PREFIX,
            self.bucket_count(),
            self.bucket_width(),
            HistogramSpec::MIN_VALUE
        )
    }
}

impl Histogram {
    /// All `bucket_count + 2` rows, sentinels included
    pub fn records(&self) -> Vec<BucketRecord> {
        let count = self.spec().bucket_count();
        let mut records = Vec::with_capacity(count + 2);

        records.push(BucketRecord::sentinel(0));
        records.extend(
            self.buckets()
                .iter()
                .enumerate()
                .map(|(i, bucket)| BucketRecord::from_bucket(i + 1, bucket)),
        );
        records.push(BucketRecord::sentinel(count + 1));

        records
    }
}

impl fmt::Display for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.spec())?;
        for record in self.records() {
            writeln!(f, "{}", record)?;
        }
        Ok(())
    }
}

/// Parse the text form back into a histogram
///
/// **Public** - used by the `inspect` command and round-trip checks
///
/// # Errors
/// * `HistogramError::InvalidRecord` - bad header, wrong row count or index,
///   a non-empty sentinel row, or a non-numeric field
pub fn parse_histogram(text: &str) -> Result<Histogram, HistogramError> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());

    let header = lines
        .next()
        .ok_or_else(|| invalid("missing #HSPEC header"))?;
    let spec = parse_header(header)?;
    let count = spec.bucket_count();

    let records = lines
        .map(parse_record)
        .collect::<Result<Vec<_>, _>>()?;

    if records.len() != count + 2 {
        return Err(invalid(format!(
            "expected {} records, found {}",
            count + 2,
            records.len()
        )));
    }

    let mut buckets = Vec::with_capacity(count);
    for (position, record) in records.iter().enumerate() {
        if record.index != position {
            return Err(invalid(format!(
                "record {} carries index {}",
                position, record.index
            )));
        }

        let is_sentinel = position == 0 || position == count + 1;
        if is_sentinel {
            if record.count != 0 {
                return Err(invalid(format!("sentinel row {} is not empty", position)));
            }
            continue;
        }

        buckets.push(bucket_from_record(record)?);
    }

    Ok(Histogram::from_parts(spec, buckets))
}

fn parse_header(line: &str) -> Result<HistogramSpec, HistogramError> {
    let body = line
        .trim()
        .strip_prefix(HSPEC_PREFIX)
        .ok_or_else(|| invalid(format!("header must start with {}", HSPEC_PREFIX)))?;

    let fields: Vec<&str> = body.split(',').map(str::trim).collect();
    let [count, width, min] = fields.as_slice() else {
        return Err(invalid(format!("header needs three fields: {}", line)));
    };

    let count: usize = parse_field(count)?;
    let width: u64 = parse_field(width)?;
    let min: u64 = parse_field(min)?;

    if width == 0 {
        return Err(invalid("bucket width must be positive"));
    }
    if min != HistogramSpec::MIN_VALUE {
        return Err(invalid(format!("unsupported minimum value {}", min)));
    }

    HistogramSpec::new(count, width)
}

fn parse_record(line: &str) -> Result<BucketRecord, HistogramError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [index, count, min, max] = fields.as_slice() else {
        return Err(invalid(format!("record needs four fields: {:?}", line)));
    };

    Ok(BucketRecord {
        index: parse_field(index)?,
        count: parse_field(count)?,
        min: parse_field(min)?,
        max: parse_field(max)?,
    })
}

fn bucket_from_record(record: &BucketRecord) -> Result<Bucket, HistogramError> {
    if record.count == 0 {
        return Ok(Bucket::default());
    }

    let to_u64 = |v: i64| {
        u64::try_from(v).map_err(|_| invalid(format!("negative sample in row {}", record.index)))
    };

    Ok(Bucket {
        count: record.count,
        min: Some(to_u64(record.min)?),
        max: Some(to_u64(record.max)?),
    })
}

fn parse_field<T: std::str::FromStr>(field: &str) -> Result<T, HistogramError> {
    field
        .parse()
        .map_err(|_| invalid(format!("not a number: {:?}", field)))
}

fn clamp_to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn invalid(message: impl Into<String>) -> HistogramError {
    HistogramError::InvalidRecord(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_example_serialization() {
        let histogram = Histogram::build(&[1, 1, 1, 50], 10).unwrap();
        let text = histogram.to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 13);
        assert_eq!(lines[0], "#HSPEC:10,5,0");
        assert_eq!(lines[1], "        0\t        0\t2147483647\t-2147483648");
        assert_eq!(lines[2], "        1\t        3\t        1\t        1");
        assert_eq!(lines[3], "        2\t        0\t2147483647\t-2147483648");
        assert_eq!(lines[10], "        9\t        0\t2147483647\t-2147483648");
        assert_eq!(lines[11], "       10\t        1\t       50\t       50");
        assert_eq!(lines[12], "       11\t        0\t2147483647\t-2147483648");
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_sentinel_rows() {
        let histogram = Histogram::build(&[4, 9, 13], 20).unwrap();
        let records = histogram.records();

        assert_eq!(records.len(), 22);
        for sentinel in [records[0], records[21]] {
            assert_eq!(sentinel.count, 0);
            assert_eq!(sentinel.min, 2147483647);
            assert_eq!(sentinel.max, -2147483648);
        }
        assert_eq!(records[0].index, 0);
        assert_eq!(records[21].index, 21);
        let real: u64 = records[1..21].iter().map(|r| r.count).sum();
        assert_eq!(real, 3);
    }

    #[test]
    fn test_parse_round_trip() {
        let histogram = Histogram::build(&[0, 2, 2, 17, 40, 41, 99], 20).unwrap();
        let parsed = parse_histogram(&histogram.to_string()).unwrap();
        assert_eq!(parsed, histogram);
    }

    #[test]
    fn test_parse_rejects_wrong_row_count() {
        let text = "#HSPEC:2,1,0\n0\t0\t2147483647\t-2147483648\n1\t0\t2147483647\t-2147483648\n";
        assert!(matches!(
            parse_histogram(text),
            Err(HistogramError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_parse_rejects_non_empty_sentinel() {
        let text = concat!(
            "#HSPEC:1,1,0\n",
            "0\t1\t3\t3\n",
            "1\t0\t2147483647\t-2147483648\n",
            "2\t0\t2147483647\t-2147483648\n",
        );
        assert!(parse_histogram(text).is_err());
    }

    #[test]
    fn test_parse_rejects_bad_header() {
        assert!(parse_histogram("#SPEC:1,1,0\n").is_err());
        assert!(parse_histogram("#HSPEC:1,0,0\n").is_err());
        assert!(parse_histogram("#HSPEC:1,1\n").is_err());
        assert!(parse_histogram("").is_err());
    }
}
