// framenote-cli/src/commands/export.rs
//
// Batch export: notes come from the command line instead of a session.

use std::io::Write;
use std::path::PathBuf;

use framenote_core::utils::unescape_text;
use framenote_core::{Action, CoreConfig, MediaTools, ReportFormat, Session};

use crate::cli::ExportArgs;
use crate::commands::{open_with_spinner, write_report};
use crate::error::CliResult;
use crate::terminal::Terminal;

/// Reports requested by the flags; CSV with a default name when none are.
fn requested_reports(args: &ExportArgs) -> Vec<(ReportFormat, Option<PathBuf>)> {
    let mut reports = Vec::new();
    if let Some(path) = &args.csv {
        reports.push((ReportFormat::Csv, path.clone()));
    }
    if let Some(path) = &args.pdf {
        reports.push((ReportFormat::Pdf, path.clone()));
    }
    if reports.is_empty() {
        reports.push((ReportFormat::Csv, None));
    }
    reports
}

/// Runs `framenote export`.
///
/// Each `FRAME=TEXT` note is stored at its clamped frame; a later note for
/// the same frame replaces an earlier one.
pub fn run_export<W: Write>(
    term: &mut Terminal<W>,
    tools: &MediaTools,
    config: &CoreConfig,
    args: &ExportArgs,
) -> CliResult<()> {
    let handle = open_with_spinner(&args.input, tools, config)?;
    let mut session = Session::new().load(handle, config);

    for (frame, text) in &args.notes {
        session = session
            .apply(Action::GoTo(*frame))?
            .apply(Action::SaveNote(unescape_text(text)))?;
    }
    if let Some(global) = &args.global {
        session = session.apply(Action::SetGlobalComment(unescape_text(global)))?;
    }

    let loaded = session.require_loaded()?;
    for (format, path) in requested_reports(args) {
        write_report(term, loaded, tools, config, format, path)?;
    }
    Ok(())
}
