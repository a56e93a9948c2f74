use std::path::PathBuf;

/// Arguments for the process command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ProcessArgs {
    /// JSON-lines trace to consume
    pub trace: PathBuf,

    /// Directory receiving `.histo`, `.stats` and `summary.json`
    pub out_dir: PathBuf,

    /// Optional TOML pipeline configuration
    pub config: Option<PathBuf>,

    /// Override for the number of ignored exit markers
    pub grace_markers: Option<u32>,

    /// Override for the interval histogram bucket count
    pub interval_buckets: Option<usize>,

    /// Print text summary to stdout
    pub print_summary: bool,
}

impl Default for ProcessArgs {
    fn default() -> Self {
        Self {
            trace: PathBuf::from("trace.jsonl"),
            out_dir: PathBuf::from("histograms"),
            config: None,
            grace_markers: None,
            interval_buckets: None,
            print_summary: false,
        }
    }
}
