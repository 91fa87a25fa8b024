//! Everything the action publishes once a scan has been parsed.

pub mod ci;
pub mod gist;
pub mod paths;

pub use ci::{ScanOutputs, write_ci_outputs, write_env_vars};
pub use gist::{GistClient, GistResult, gist_filenames};
pub use paths::copy_output_file;
