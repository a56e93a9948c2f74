use pretty_assertions::assert_eq;
use trace_histo::histogram::{parse_histogram, Histogram, HistogramSpec};
use trace_histo::utils::error::HistogramError;

#[test]
fn test_example_layout() {
    let histogram = Histogram::build(&[1, 1, 1, 50], 10).unwrap();

    assert_eq!(histogram.spec().bucket_width(), 5);
    assert_eq!(histogram.buckets()[0].count, 3);
    assert_eq!(histogram.buckets()[0].min, Some(1));
    assert_eq!(histogram.buckets()[9].count, 1);
    assert_eq!(histogram.buckets()[9].max, Some(50));
    assert!(histogram.buckets()[1..9].iter().all(|b| b.count == 0));
}

#[test]
fn test_example_text() {
    let text = Histogram::build(&[1, 1, 1, 50], 10).unwrap().to_string();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "#HSPEC:10,5,0");
    assert_eq!(lines[2], "        1\t        3\t        1\t        1");
    assert_eq!(lines[10], "       10\t        1\t       50\t       50");
    assert_eq!(lines[11], "       11\t        0\t2147483647\t-2147483648");
    assert!(text.ends_with('\n'));
}

#[test]
fn test_every_sample_counted_once() {
    let samples: Vec<u64> = (0..500).map(|i| (i * 37) % 1013).collect();
    let histogram = Histogram::build(&samples, 20).unwrap();

    assert_eq!(histogram.total_count(), samples.len() as u64);
    assert_eq!(histogram.max_seen(), samples.iter().copied().max());
}

#[test]
fn test_strict_upper_bound() {
    let spec = HistogramSpec::new(4, 5).unwrap();

    // Nominal upper bound of bucket 0 is 4, but 4 is not strictly below it
    assert_eq!(spec.bucket_for(3), 0);
    assert_eq!(spec.bucket_for(4), 1);
    assert_eq!(spec.bucket_for(9), 2);
    assert_eq!(spec.bucket_for(1_000), 3);
}

#[test]
fn test_small_samples_width_one() {
    let histogram = Histogram::build(&[0, 1, 2], 20).unwrap();

    assert_eq!(histogram.spec().bucket_width(), 1);
    assert_eq!(histogram.buckets()[1].min, Some(0));
    assert_eq!(histogram.buckets()[2].min, Some(1));
    assert_eq!(histogram.buckets()[3].min, Some(2));
}

#[test]
fn test_build_errors() {
    assert_eq!(Histogram::build(&[], 10), Err(HistogramError::EmptyInput));
    assert_eq!(Histogram::build(&[4], 0), Err(HistogramError::ZeroBuckets));
}

#[test]
fn test_text_round_trip() {
    let histogram = Histogram::build(&[7, 19, 19, 250, 3, 88], 20).unwrap();
    let text = histogram.to_string();

    let parsed = parse_histogram(&text).unwrap();
    assert_eq!(parsed, histogram);
    assert_eq!(parsed.to_string(), text);
}

#[test]
fn test_parse_rejects_zero_width() {
    let mut text = String::from("#HSPEC:1,0,0\n");
    text.push_str("        0\t        0\t2147483647\t-2147483648\n");
    text.push_str("        1\t        0\t2147483647\t-2147483648\n");
    text.push_str("        2\t        0\t2147483647\t-2147483648\n");

    assert!(matches!(
        parse_histogram(&text),
        Err(HistogramError::InvalidRecord(_))
    ));
}

#[test]
fn test_parse_rejects_missing_rows() {
    let text = Histogram::build(&[5, 10], 4).unwrap().to_string();
    let truncated: String = text.lines().take(4).map(|l| format!("{}\n", l)).collect();

    assert!(parse_histogram(&truncated).is_err());
}
