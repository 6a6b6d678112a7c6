//! Thin CLI wrapper around `consfyi-core`: argument parsing, logging
//! setup and the production timezone resolver.

pub mod cli_args;
pub mod tz;

use chrono::Utc;
use consfyi_core::{MaterializeOptions, error::MaterializeError, logging::init_logging};

use cli_args::CliArgs;
use tz::TzfResolver;

pub fn run(cli: CliArgs) -> Result<(), MaterializeError> {
    if let Err(err) = init_logging() {
        eprintln!("Warning: {err}");
    }

    let resolver = TzfResolver::new();
    let options = MaterializeOptions {
        input_dir: cli.input,
        output_dir: cli.output_dir,
    };
    consfyi_core::run(&options, &resolver, Utc::now())
}
