//! CSV annotation reports.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use ::csv::WriterBuilder;

use super::{ExportRow, ReportLanguage};
use crate::error::{CoreResult, export_error};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes `rows` as CSV to `out`: a header, then one record per row.
pub fn write_csv<W: Write>(
    mut out: W,
    rows: &[ExportRow],
    language: ReportLanguage,
    byte_order_mark: bool,
) -> std::io::Result<()> {
    if byte_order_mark {
        out.write_all(UTF8_BOM)?;
    }

    let mut writer = WriterBuilder::new().from_writer(out);
    writer.write_record(language.csv_header())?;
    for row in rows {
        writer.write_record([row.label.cell(language).as_str(), row.text.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes a CSV report to `path`, creating parent directories as needed.
///
/// # Errors
///
/// `CoreError::Export` with the underlying cause when the file cannot be written.
pub fn write_csv_report(
    path: &Path,
    rows: &[ExportRow],
    language: ReportLanguage,
    byte_order_mark: bool,
) -> CoreResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| export_error(path, e))?;
    }
    let file = File::create(path).map_err(|e| export_error(path, e))?;
    write_csv(BufWriter::new(file), rows, language, byte_order_mark)
        .map_err(|e| export_error(path, e))?;

    log::info!("Wrote CSV report with {} rows to {}", rows.len(), path.display());
    Ok(())
}
