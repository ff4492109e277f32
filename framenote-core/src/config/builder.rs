// ============================================================================
// framenote-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// Fluent construction of CoreConfig. Unset fields keep the defaults from
// config/mod.rs.

use std::path::PathBuf;

use super::CoreConfig;
use crate::export::ReportLanguage;

/// Builder for creating CoreConfig instances.
///
/// # Examples
///
/// ```rust
/// use framenote_core::config::CoreConfigBuilder;
///
/// let config = CoreConfigBuilder::new()
///     .temp_dir("/tmp/framenote")
///     .autosave_drafts(false)
///     .build();
/// assert!(!config.autosave_drafts);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl CoreConfigBuilder {
    /// Creates a new builder seeded with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory used for remuxed temporary videos.
    pub fn temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.config.temp_dir = Some(temp_dir.into());
        self
    }

    /// Sets the longest side, in pixels, of PDF thumbnails.
    pub fn thumbnail_size(mut self, size: u32) -> Self {
        self.config.thumbnail_size = size;
        self
    }

    /// Sets the language of report labels.
    pub fn report_language(mut self, language: ReportLanguage) -> Self {
        self.config.report_language = language;
        self
    }

    /// Enables or disables the UTF-8 BOM on CSV reports.
    pub fn csv_byte_order_mark(mut self, enabled: bool) -> Self {
        self.config.csv_byte_order_mark = enabled;
        self
    }

    /// Sets how many stderr lines are kept from a failed external tool.
    pub fn diagnostic_tail_lines(mut self, lines: usize) -> Self {
        self.config.diagnostic_tail_lines = lines;
        self
    }

    /// Enables or disables committing drafts on navigation.
    pub fn autosave_drafts(mut self, enabled: bool) -> Self {
        self.config.autosave_drafts = enabled;
        self
    }

    /// Sets the number of frames between scan progress callbacks.
    pub fn scan_progress_interval(mut self, frames: u64) -> Self {
        self.config.scan_progress_interval = frames;
        self
    }

    /// Builds the configuration. Call [`CoreConfig::validate`] to check ranges.
    pub fn build(self) -> CoreConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_only_requested_fields() {
        let config = CoreConfigBuilder::new()
            .thumbnail_size(150)
            .report_language(ReportLanguage::Portuguese)
            .build();

        assert_eq!(config.thumbnail_size, 150);
        assert_eq!(config.report_language, ReportLanguage::Portuguese);
        assert_eq!(config.diagnostic_tail_lines, super::super::DEFAULT_DIAGNOSTIC_TAIL_LINES);
        assert!(config.temp_dir.is_none());
    }
}
