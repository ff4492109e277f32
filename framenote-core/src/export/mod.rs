// ============================================================================
// framenote-core/src/export/mod.rs
// ============================================================================
//
// EXPORT: CSV and PDF Annotation Reports
//
// Both report formats consume AnnotationStore::export_rows(), so the row
// order (frames ascending, then the global comment) is identical in each.
//
// KEY COMPONENTS:
// - ExportRow / RowLabel: one report row
// - ReportLanguage: header, label and title strings (English or Portuguese)
// - ReportFormat: csv or pdf, with timestamped default file names
// - csv: CSV writer
// - pdf: paginated PDF writer with thumbnails

pub mod csv;
pub mod pdf;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::CoreError;
use crate::frame::FrameIndex;

pub use self::csv::{write_csv, write_csv_report};
pub use self::pdf::{DecodedThumbnails, ThumbnailSource, build_pdf, write_pdf, write_pdf_report};

/// Left-hand cell of a report row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RowLabel {
    Frame(FrameIndex),
    GlobalComment,
}

impl RowLabel {
    /// Text of the label cell: the numeric frame index or the localized global label.
    pub fn cell(self, language: ReportLanguage) -> String {
        match self {
            RowLabel::Frame(index) => index.to_string(),
            RowLabel::GlobalComment => language.global_comment_label().to_string(),
        }
    }
}

/// One row of an annotation report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub label: RowLabel,
    pub text: String,
}

impl ExportRow {
    pub fn new(label: RowLabel, text: impl Into<String>) -> Self {
        Self {
            label,
            text: text.into(),
        }
    }
}

/// True when `rows` contain at least one frame note.
pub fn has_frame_notes(rows: &[ExportRow]) -> bool {
    rows.iter().any(|row| matches!(row.label, RowLabel::Frame(_)))
}

/// Language of report headers, labels and titles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ReportLanguage {
    #[default]
    English,
    Portuguese,
}

impl ReportLanguage {
    /// CSV header cells.
    pub fn csv_header(self) -> [&'static str; 2] {
        match self {
            Self::English => ["Frame", "Note"],
            Self::Portuguese => ["Frame", "Observação"],
        }
    }

    pub fn global_comment_label(self) -> &'static str {
        match self {
            Self::English => "Global Comment",
            Self::Portuguese => "Comentário Global",
        }
    }

    pub fn report_title(self) -> &'static str {
        match self {
            Self::English => "Frame Annotation Report",
            Self::Portuguese => "Relatório de Anotações por Frame",
        }
    }

    /// PDF line for one annotated frame.
    pub fn frame_line(self, index: FrameIndex, note: &str) -> String {
        format!("Frame {index}: {note}")
    }

    /// Stem used for default report file names.
    pub fn file_stem(self) -> &'static str {
        match self {
            Self::English => "frame_report",
            Self::Portuguese => "relatorio_frames",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Portuguese => "pt",
        }
    }
}

impl FromStr for ReportLanguage {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Self::English),
            "pt" | "pt-br" | "portuguese" => Ok(Self::Portuguese),
            other => Err(CoreError::Config(format!(
                "unknown report language '{other}' (expected 'en' or 'pt')"
            ))),
        }
    }
}

impl fmt::Display for ReportLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Report file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Pdf,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Pdf => "pdf",
        }
    }

    /// Default file name, e.g. `frame_report_20240131_142501.csv`.
    pub fn default_file_name(self, language: ReportLanguage, now: DateTime<Local>) -> String {
        format!(
            "{}_{}.{}",
            language.file_stem(),
            now.format("%Y%m%d_%H%M%S"),
            self.extension()
        )
    }
}

impl FromStr for ReportFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "pdf" => Ok(Self::Pdf),
            other => Err(CoreError::Config(format!(
                "unknown report format '{other}' (expected 'csv' or 'pdf')"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn labels_follow_language() {
        assert_eq!(ReportLanguage::English.csv_header(), ["Frame", "Note"]);
        assert_eq!(ReportLanguage::Portuguese.csv_header(), ["Frame", "Observação"]);
        assert_eq!(RowLabel::GlobalComment.cell(ReportLanguage::Portuguese), "Comentário Global");
        assert_eq!(RowLabel::Frame(FrameIndex(12)).cell(ReportLanguage::English), "12");
    }

    #[test]
    fn parses_language_codes() {
        assert_eq!("pt".parse::<ReportLanguage>().unwrap(), ReportLanguage::Portuguese);
        assert_eq!("EN".parse::<ReportLanguage>().unwrap(), ReportLanguage::English);
        assert!("fr".parse::<ReportLanguage>().is_err());
    }

    #[test]
    fn default_file_name_is_timestamped() {
        let now = Local.with_ymd_and_hms(2024, 1, 31, 14, 25, 1).unwrap();
        assert_eq!(
            ReportFormat::Pdf.default_file_name(ReportLanguage::Portuguese, now),
            "relatorio_frames_20240131_142501.pdf"
        );
    }

    #[test]
    fn global_row_alone_has_no_frame_notes() {
        let rows = vec![ExportRow::new(RowLabel::GlobalComment, "text")];
        assert!(!has_frame_notes(&rows));
    }
}
