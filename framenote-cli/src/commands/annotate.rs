// framenote-cli/src/commands/annotate.rs
//
// Runs the interactive session on stdin or on a script file.

use std::fs::File;
use std::io::{self, BufReader, IsTerminal, Write};

use framenote_core::{CoreConfig, MediaTools};

use crate::cli::AnnotateArgs;
use crate::error::{CliErrorContext, CliResult};
use crate::repl::Repl;
use crate::terminal::Terminal;

/// Runs `framenote annotate`.
///
/// The input video, when given, is loaded before the first command; failing
/// to open it is an error. A prompt is shown only for an interactive stdin.
pub fn run_annotate<W: Write>(
    term: &mut Terminal<W>,
    tools: &MediaTools,
    config: &CoreConfig,
    args: &AnnotateArgs,
) -> CliResult<()> {
    let mut repl = Repl::new(tools, config);
    if let Some(input) = &args.input {
        repl.load(input, term)?;
    }

    match &args.script {
        Some(script) => {
            let file = File::open(script)
                .cli_with_context(|| format!("Cannot open script '{}'", script.display()))?;
            log::debug!("Running session script {}", script.display());
            repl.run(BufReader::new(file), term, false)
        }
        None => {
            let stdin = io::stdin();
            let interactive = stdin.is_terminal();
            if interactive {
                term.line("Type 'help' for the list of commands.")?;
            }
            repl.run(stdin.lock(), term, interactive)
        }
    }
}
