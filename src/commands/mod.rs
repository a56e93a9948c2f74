//! CLI command implementations.
//!
//! Commands orchestrate the library components to perform user tasks.

pub mod models;
pub mod process;
pub mod utils;

// Re-export main command functions
pub use models::ProcessArgs;
pub use process::{execute_process, resolve_config, validate_args};
pub use utils::{display_version, inspect_histogram_file};
