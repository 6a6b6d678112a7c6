use std::path::PathBuf;

use clap::Parser;

/// CLI surface for the materializer.
#[derive(Debug, Parser, Clone)]
#[command(
    author,
    version,
    about = "Materialize convention series records into site and calendar artifacts"
)]
pub struct CliArgs {
    /// Directory the artifact set is written beneath.
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Directory holding the per-series source records.
    #[arg(long = "input", value_name = "DIR", default_value = ".")]
    pub input: PathBuf,
}
