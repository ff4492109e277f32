// framenote-cli/src/lib.rs
//
// Library portion of the FrameNote CLI application.
// Contains argument definitions, the interactive session and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod repl;
pub mod terminal;

use framenote_core::MediaTools;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands};
pub use error::{CliErrorContext, CliResult};
pub use terminal::Terminal;

/// Dispatches the parsed command line using the system ffmpeg/ffprobe.
pub fn run(cli: &Cli) -> CliResult<()> {
    let config = cli.core_config()?;
    log::debug!("Using configuration: {:?}", config);
    let tools = MediaTools::system(&config);
    let mut term = Terminal::stdout();

    match &cli.command {
        Commands::Probe(args) => commands::run_probe(&mut term, &tools, &config, args),
        Commands::Frame(args) => commands::run_frame(&mut term, &tools, &config, args),
        Commands::Annotate(args) => commands::run_annotate(&mut term, &tools, &config, args),
        Commands::Export(args) => commands::run_export(&mut term, &tools, &config, args),
    }
}
