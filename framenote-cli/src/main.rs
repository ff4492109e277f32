// framenote-cli/src/main.rs
//
// Entry point of the `framenote` binary: parses arguments, sets up logging,
// runs the chosen command and maps failure to exit code 1.

use std::process;

use clap::Parser;
use framenote_cli::{Cli, logging};

fn main() {
    let cli = Cli::parse();
    logging::init_with_level(logging::level_for(cli.verbose));

    if let Err(err) = framenote_cli::run(&cli) {
        log::debug!("Command failed: {:?}", err);
        eprintln!("Error: {err}");
        process::exit(1);
    }
}
