use clap::Parser;

use consfyi_cli::cli_args::CliArgs;

fn main() {
    let cli = CliArgs::parse();
    if let Err(err) = consfyi_cli::run(cli) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
