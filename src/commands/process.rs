//! Process command implementation.
//!
//! The process command:
//! 1. Resolves the pipeline configuration
//! 2. Streams the trace through the pipeline
//! 3. Bins the snapshot durations into histograms
//! 4. Writes histogram and paging files
//! 5. Writes the run summary

use super::models::ProcessArgs;
use crate::aggregator::{PagingReport, SnapshotReport};
use crate::event::open_trace;
use crate::output::{
    write_histogram, write_stats, write_summary, HistogramEntry, PagingSummary, RunSummary,
};
use crate::pipeline::Pipeline;
use crate::utils::config::{load_config, PipelineConfig, SUMMARY_FILE_NAME};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::Path;
use std::time::Instant;

/// Execute the process command
///
/// **Public** - main entry point called from main.rs
///
/// # Arguments
/// * `args` - Process command arguments
///
/// # Returns
/// The summary that was written to `summary.json`
///
/// # Errors
/// * Configuration load or validation failures
/// * Trace read or parse errors
/// * Subjects without a label
/// * File write errors
///
/// # Example
/// ```ignore
/// let args = ProcessArgs {
///     trace: PathBuf::from("run.jsonl"),
///     out_dir: PathBuf::from("out"),
///     ..Default::default()
/// };
///
/// execute_process(args)?;
/// ```
pub fn execute_process(args: ProcessArgs) -> Result<RunSummary> {
    let start_time = Instant::now();

    info!("Processing trace: {}", args.trace.display());

    // Step 1: Resolve configuration
    info!("Step 1/5: Resolving configuration...");
    let config = resolve_config(&args)?;
    debug!("Pipeline configuration: {:?}", config);

    // Step 2: Stream the trace
    info!("Step 2/5: Streaming trace events...");
    let reader = open_trace(&args.trace)
        .with_context(|| format!("Failed to open trace {}", args.trace.display()))?;

    let mut pipeline = Pipeline::new(&config);
    pipeline
        .feed_all(reader)
        .with_context(|| format!("Failed to read trace {}", args.trace.display()))?;

    let output = pipeline
        .finalize()
        .context("Failed to finalize paging statistics")?;

    // Step 3: Build histograms
    info!("Step 3/5: Building histograms...");
    let named = output
        .snapshots
        .histograms(&config.labels, config.interval_buckets)
        .context("Failed to build interval histograms")?;

    if named.is_empty() {
        warn!("Trace produced no intervals for any labelled subject");
    }

    // Step 4: Write histogram and paging files
    info!("Step 4/5: Writing histogram files...");
    let mut summary = RunSummary::new(args.trace.display().to_string(), &config, output.stats);
    summary.cut_keys = output.snapshots.cut_keys().to_vec();

    for histogram in &named {
        write_histogram(&args.out_dir, &histogram.file_name(), &histogram.histogram)
            .with_context(|| format!("Failed to write {}", histogram.file_name()))?;
        summary.histograms.push(HistogramEntry::from(histogram));
    }

    if let Some(report) = &output.paging {
        summary.paging = Some(write_paging(&args.out_dir, report, config.paging_buckets)?);
    }

    // Step 5: Write summary
    info!("Step 5/5: Writing run summary...");
    let summary_path = args.out_dir.join(SUMMARY_FILE_NAME);
    write_summary(&summary, &summary_path).context("Failed to write run summary")?;

    info!(
        "✓ {} files written to: {}",
        summary.file_count(),
        args.out_dir.display()
    );

    if args.print_summary {
        print_summary(&summary, &output.snapshots);
    }

    let elapsed = start_time.elapsed();
    info!("Processing completed in {:.2}s", elapsed.as_secs_f64());

    Ok(summary)
}

/// Merge the config file (if any) with command-line overrides
///
/// **Public** - also used by tests to check override precedence
pub fn resolve_config(args: &ProcessArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if let Some(grace_markers) = args.grace_markers {
        config.grace_markers = grace_markers;
    }
    if let Some(interval_buckets) = args.interval_buckets {
        config.interval_buckets = interval_buckets;
    }

    config.validate().context("Invalid pipeline configuration")?;
    Ok(config)
}

/// Write the paging `.stats` file and, when samples exist, its histogram
///
/// **Private** - internal helper for execute_process
fn write_paging(
    out_dir: &Path,
    report: &PagingReport,
    bucket_count: usize,
) -> Result<PagingSummary> {
    write_stats(out_dir, report)
        .with_context(|| format!("Failed to write {}", report.stats_file_name()))?;

    let histogram = report
        .histogram(bucket_count)
        .context("Failed to build inter-fault histogram")?;

    let written = match histogram {
        Some(histogram) => {
            write_histogram(out_dir, &report.histogram_file_name(), &histogram)
                .with_context(|| format!("Failed to write {}", report.histogram_file_name()))?;
            true
        }
        None => false,
    };

    info!("✓ Paging statistics written for run {}", report.run_label());
    Ok(PagingSummary::new(report, written))
}

/// Print a text summary to stdout
///
/// **Private** - internal helper for execute_process
fn print_summary(summary: &RunSummary, snapshots: &SnapshotReport) {
    println!("\n{}", "=".repeat(80));
    println!("RUN SUMMARY");
    println!("{}", "=".repeat(80));
    println!("Trace:        {}", summary.trace);
    println!("Events:       {}", summary.stats.events);
    println!("Ticks:        {}", summary.stats.ticks);
    println!("Intervals:    {}", summary.stats.intervals);
    println!("Snapshot cuts: {:?}", summary.cut_keys);
    println!();

    for subject in snapshots.subjects() {
        let aggregates = summary
            .histograms
            .iter()
            .filter(|e| e.subject == subject && e.epoch.is_none());
        for entry in aggregates {
            println!(
                "  {:<6} {:<8} {:>8} samples  width {}",
                entry.label, entry.kind, entry.samples, entry.bucket_width
            );
        }
    }

    if let Some(paging) = &summary.paging {
        println!();
        println!(
            "Paging run {}: {} faults, {} page-outs, {} page-ins",
            paging.run, paging.page_faults, paging.page_outs, paging.page_ins
        );
    }
    println!("{}", "=".repeat(80));
}

/// Validate process arguments
///
/// **Public** - can be called before execute_process for early validation
///
/// # Arguments
/// * `args` - Arguments to validate
///
/// # Returns
/// Ok if arguments are valid, Err with message if not
pub fn validate_args(args: &ProcessArgs) -> Result<()> {
    if args.trace.as_os_str().is_empty() {
        anyhow::bail!("Trace path cannot be empty");
    }

    if !args.trace.is_file() {
        anyhow::bail!("Trace file not found: {}", args.trace.display());
    }

    if args.out_dir.as_os_str().is_empty() {
        anyhow::bail!("Output directory cannot be empty");
    }

    if args.out_dir.exists() && !args.out_dir.is_dir() {
        anyhow::bail!("Output path is not a directory: {}", args.out_dir.display());
    }

    if args.interval_buckets == Some(0) {
        anyhow::bail!("interval_buckets must be greater than 0");
    }

    if let Some(config) = &args.config {
        if !config.is_file() {
            anyhow::bail!("Config file not found: {}", config.display());
        }
    }

    Ok(())
}
