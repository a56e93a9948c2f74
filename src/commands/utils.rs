use crate::output::read_histogram;
use crate::utils::config::{HSPEC_PREFIX, SUMMARY_VERSION};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Parse and describe a `.histo` file
pub fn inspect_histogram_file(file_path: PathBuf) -> Result<()> {
    println!("Inspecting histogram: {}", file_path.display());

    let histogram = read_histogram(&file_path)
        .with_context(|| format!("Invalid histogram file {}", file_path.display()))?;
    let spec = histogram.spec();

    println!("✓ Valid histogram");
    println!("  Buckets: {}", spec.bucket_count());
    println!("  Bucket Width: {}", spec.bucket_width());
    println!("  Samples: {}", histogram.total_count());
    if let Some(max) = histogram.max_seen() {
        println!("  Largest Sample: {}", max);
    }

    for (index, bucket) in histogram.buckets().iter().enumerate() {
        if bucket.count == 0 {
            continue;
        }
        println!(
            "  [{:>6}, {:>6}) {:>8}",
            spec.bucket_low(index),
            spec.bucket_high(index),
            bucket.count
        );
    }

    Ok(())
}

/// Display version information
pub fn display_version() {
    println!("trace-histo v{}", env!("CARGO_PKG_VERSION"));
    println!("Histogram Format: {}<count>,<width>,0", HSPEC_PREFIX);
    println!("Run Summary Schema: v{}", SUMMARY_VERSION);
    println!();
    println!("Scheduling interval and paging histograms from simulator event traces.");
}
