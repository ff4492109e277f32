//! Command implementations for the CLI.
//!
//! Each submodule implements one subcommand. Helpers shared by the batch
//! export and the interactive session live here.

pub mod annotate;
pub mod export;
pub mod frame;
pub mod probe;

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use framenote_core::export::{
    DecodedThumbnails, has_frame_notes, write_csv_report, write_pdf_report,
};
use framenote_core::{CoreConfig, LoadedSession, MediaTools, ReportFormat, VideoHandle, open_video};

use crate::error::CliResult;
use crate::terminal::{ScanSpinner, Terminal};

pub use annotate::run_annotate;
pub use export::run_export;
pub use frame::run_frame;
pub use probe::run_probe;

/// Opens `path`, showing a spinner if the frame count has to be measured.
pub fn open_with_spinner(
    path: &Path,
    tools: &MediaTools,
    config: &CoreConfig,
) -> CliResult<VideoHandle> {
    let spinner = ScanSpinner::new();
    let result = open_video(path, tools, config, &spinner);
    spinner.finish();
    result
}

/// Writes the session's notes as a `format` report.
///
/// Without a `path` the report goes to a timestamped file in the current
/// directory. When the session has no frame notes a warning is printed,
/// nothing is written and `Ok(None)` is returned.
pub fn write_report<W: Write>(
    term: &mut Terminal<W>,
    session: &LoadedSession,
    tools: &MediaTools,
    config: &CoreConfig,
    format: ReportFormat,
    path: Option<PathBuf>,
) -> CliResult<Option<PathBuf>> {
    let rows = session.export_rows();
    if !has_frame_notes(&rows) {
        term.warning("No frame notes to export; nothing was written")?;
        return Ok(None);
    }

    let path = path.unwrap_or_else(|| {
        PathBuf::from(format.default_file_name(config.report_language, Local::now()))
    });

    match format {
        ReportFormat::Csv => write_csv_report(
            &path,
            &rows,
            config.report_language,
            config.csv_byte_order_mark,
        )?,
        ReportFormat::Pdf => {
            let thumbnails = DecodedThumbnails::new(
                session.handle(),
                tools.decoder.as_ref(),
                config.thumbnail_size,
            );
            write_pdf_report(
                &path,
                &rows,
                config.report_language,
                config.thumbnail_size,
                &thumbnails,
            )?
        }
    }

    term.success(&format!(
        "Exported {} frame notes to {}",
        session.store().len(),
        path.display()
    ))?;
    Ok(Some(path))
}
