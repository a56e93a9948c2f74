//! `.histo` file writer and reader.

use super::{ensure_parent, validate_path};
use crate::histogram::{parse_histogram, Histogram};
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Write a histogram to `dir/name`
///
/// **Public** - main entry point for histogram output
///
/// # Arguments
/// * `dir` - Output directory (created if missing)
/// * `name` - File name, extension included
/// * `histogram` - Histogram to serialize
///
/// # Returns
/// The path written
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::InvalidPath` - Path cannot be created or is a directory
pub fn write_histogram(
    dir: impl AsRef<Path>,
    name: &str,
    histogram: &Histogram,
) -> Result<PathBuf, OutputError> {
    let path = dir.as_ref().join(name);

    validate_path(&path)?;
    ensure_parent(&path)?;

    let file = File::create(&path)?;
    let mut writer = BufWriter::new(file);
    write!(writer, "{}", histogram)?;
    writer.flush()?;

    debug!(
        "Histogram written to {} ({} samples)",
        path.display(),
        histogram.total_count()
    );
    Ok(path)
}

/// Read a `.histo` file back into a histogram
///
/// **Public** - used by `inspect` and output checks
///
/// # Errors
/// * `OutputError::WriteFailed` - File read error (reusing WriteFailed for I/O)
/// * `OutputError::Malformed` - The text is not a valid histogram
pub fn read_histogram(path: impl AsRef<Path>) -> Result<Histogram, OutputError> {
    let path = path.as_ref();
    info!("Reading histogram from: {}", path.display());

    let text = fs::read_to_string(path)?;
    let histogram = parse_histogram(&text)?;

    debug!(
        "Histogram loaded: {} buckets of width {}",
        histogram.spec().bucket_count(),
        histogram.spec().bucket_width()
    );
    Ok(histogram)
}
