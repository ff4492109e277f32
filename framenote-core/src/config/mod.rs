//! Configuration structures and constants for the framenote-core library.
//!
//! This module holds the knobs that shape frame-count resolution, the
//! annotation session and the exported reports.

mod builder;

use std::path::PathBuf;

use crate::error::{CoreError, CoreResult};
use crate::export::ReportLanguage;

pub use builder::CoreConfigBuilder;

// Default constants

/// Default cap, in pixels, for the longest side of a report thumbnail.
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 200;

/// Smallest and largest accepted thumbnail caps.
pub const MIN_THUMBNAIL_SIZE: u32 = 32;
pub const MAX_THUMBNAIL_SIZE: u32 = 400;

/// Number of trailing stderr lines kept when an external tool fails.
pub const DEFAULT_DIAGNOSTIC_TAIL_LINES: usize = 10;

/// Number of decoded frames between progress callbacks during an exhaustive scan.
pub const DEFAULT_SCAN_PROGRESS_INTERVAL: u64 = 250;

/// Main configuration structure for the framenote-core library.
///
/// All fields have sensible defaults; the builder is the usual way to
/// override a handful of them.
///
/// # Examples
///
/// ```rust
/// use framenote_core::config::CoreConfigBuilder;
/// use framenote_core::export::ReportLanguage;
///
/// let config = CoreConfigBuilder::new()
///     .thumbnail_size(150)
///     .report_language(ReportLanguage::Portuguese)
///     .csv_byte_order_mark(true)
///     .build();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Directory for remuxed temporary videos (defaults to the system temp dir)
    pub temp_dir: Option<PathBuf>,

    /// Longest side, in pixels, of thumbnails embedded in PDF reports
    pub thumbnail_size: u32,

    /// Language used for report headers and labels
    pub report_language: ReportLanguage,

    /// Prefix CSV reports with a UTF-8 byte order mark (spreadsheet friendly)
    pub csv_byte_order_mark: bool,

    /// How many trailing stderr lines to keep from a failed ffmpeg run
    pub diagnostic_tail_lines: usize,

    /// Commit a pending draft note to its frame before navigating away
    pub autosave_drafts: bool,

    /// Frames between progress callbacks during an exhaustive scan
    pub scan_progress_interval: u64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            temp_dir: None,
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
            report_language: ReportLanguage::default(),
            csv_byte_order_mark: false,
            diagnostic_tail_lines: DEFAULT_DIAGNOSTIC_TAIL_LINES,
            autosave_drafts: true,
            scan_progress_interval: DEFAULT_SCAN_PROGRESS_INTERVAL,
        }
    }
}

impl CoreConfig {
    /// Checks value ranges. Returns `CoreError::Config` on the first violation.
    pub fn validate(&self) -> CoreResult<()> {
        if !(MIN_THUMBNAIL_SIZE..=MAX_THUMBNAIL_SIZE).contains(&self.thumbnail_size) {
            return Err(CoreError::Config(format!(
                "thumbnail size must be between {MIN_THUMBNAIL_SIZE} and {MAX_THUMBNAIL_SIZE} \
                 pixels, got {}",
                self.thumbnail_size
            )));
        }
        if self.diagnostic_tail_lines == 0 {
            return Err(CoreError::Config(
                "diagnostic tail must keep at least one line".to_string(),
            ));
        }
        if self.scan_progress_interval == 0 {
            return Err(CoreError::Config(
                "scan progress interval must be positive".to_string(),
            ));
        }
        if let Some(dir) = &self.temp_dir {
            if dir.exists() && !dir.is_dir() {
                return Err(CoreError::Config(format!(
                    "temp dir '{}' is not a directory",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = CoreConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.thumbnail_size, DEFAULT_THUMBNAIL_SIZE);
        assert!(config.autosave_drafts);
        assert!(!config.csv_byte_order_mark);
    }

    #[test]
    fn rejects_out_of_range_thumbnail() {
        let config = CoreConfig {
            thumbnail_size: 8,
            ..CoreConfig::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let config = CoreConfig {
            thumbnail_size: MAX_THUMBNAIL_SIZE + 1,
            ..CoreConfig::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        let config = CoreConfig {
            thumbnail_size: MAX_THUMBNAIL_SIZE,
            ..CoreConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_file_as_temp_dir() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = CoreConfig {
            temp_dir: Some(file.path().to_path_buf()),
            ..CoreConfig::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }
}
