// ============================================================================
// framenote-cli/src/cli.rs
// ============================================================================
//
// COMMAND LINE INTERFACE: Argument Definitions
//
// Defines the command-line argument structures using clap. Global flags shape
// the core configuration; each subcommand has its own argument struct.
//
// Every global flag can also be set through a FRAMENOTE_* environment
// variable.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use framenote_core::{CoreConfig, CoreConfigBuilder, ReportLanguage};

use crate::error::CliResult;

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "FrameNote: frame-by-frame video annotation",
    long_about = "Steps through a video frame by frame, collects notes per frame plus a \
                  global comment, and exports them as CSV or as a PDF with thumbnails."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, env = "FRAMENOTE_VERBOSE")]
    pub verbose: bool,

    /// Language of report headers and labels
    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = LanguageArg::En,
        env = "FRAMENOTE_LANG"
    )]
    pub lang: LanguageArg,

    /// Longest side, in pixels, of PDF thumbnails and `frame --thumbnail` output
    #[arg(long, global = true, value_name = "PX", env = "FRAMENOTE_THUMBNAIL_SIZE")]
    pub thumbnail_size: Option<u32>,

    /// Directory for temporary remuxed videos (defaults to the system temp dir)
    #[arg(long, global = true, value_name = "DIR", env = "FRAMENOTE_TEMP_DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Prefix CSV reports with a UTF-8 byte order mark
    #[arg(long, global = true, env = "FRAMENOTE_CSV_BOM")]
    pub csv_bom: bool,

    /// Do not commit a pending draft note when navigating away from a frame
    #[arg(long, global = true, env = "FRAMENOTE_NO_AUTOSAVE")]
    pub no_autosave: bool,
}

/// Report language as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LanguageArg {
    En,
    Pt,
}

impl From<LanguageArg> for ReportLanguage {
    fn from(value: LanguageArg) -> Self {
        match value {
            LanguageArg::En => ReportLanguage::English,
            LanguageArg::Pt => ReportLanguage::Portuguese,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolves and prints the frame count and basic properties of a video
    Probe(ProbeArgs),
    /// Extracts a single frame as an image
    Frame(FrameArgs),
    /// Interactive annotation session (commands from stdin or a script)
    Annotate(AnnotateArgs),
    /// Writes a report from notes given on the command line
    Export(ExportArgs),
}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Video file to inspect
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct FrameArgs {
    /// Video file to read from
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Zero-based frame index; out-of-range values are clamped
    #[arg(short, long, allow_negative_numbers = true)]
    pub index: i64,

    /// Image file to write (format from the extension, e.g. .png)
    #[arg(short, long, value_name = "IMAGE")]
    pub output: PathBuf,

    /// Scale the frame down to thumbnail size before saving
    #[arg(long)]
    pub thumbnail: bool,
}

#[derive(Args, Debug)]
pub struct AnnotateArgs {
    /// Video file to open; omit to start empty and use `load`
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Read commands from this file instead of stdin
    #[arg(short, long, value_name = "FILE")]
    pub script: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Video file the notes refer to
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// A note as FRAME=TEXT; repeatable. `\n` in TEXT becomes a newline
    #[arg(short, long = "note", value_name = "FRAME=TEXT", value_parser = parse_note)]
    pub notes: Vec<(i64, String)>,

    /// Global comment for the report
    #[arg(short, long = "global", value_name = "TEXT")]
    pub global: Option<String>,

    /// Write a CSV report (to PATH, or a timestamped name when PATH is omitted)
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    pub csv: Option<Option<PathBuf>>,

    /// Write a PDF report (to PATH, or a timestamped name when PATH is omitted)
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    pub pdf: Option<Option<PathBuf>>,
}

/// Parses a `FRAME=TEXT` note argument.
pub fn parse_note(raw: &str) -> Result<(i64, String), String> {
    let (frame, text) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FRAME=TEXT, got '{raw}'"))?;
    let frame = frame
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid frame index '{}': {e}", frame.trim()))?;
    Ok((frame, text.to_string()))
}

impl Cli {
    /// Builds and validates the core configuration from the global flags.
    pub fn core_config(&self) -> CliResult<CoreConfig> {
        let mut builder = CoreConfigBuilder::new()
            .report_language(self.lang.into())
            .csv_byte_order_mark(self.csv_bom)
            .autosave_drafts(!self.no_autosave);
        if let Some(size) = self.thumbnail_size {
            builder = builder.thumbnail_size(size);
        }
        if let Some(dir) = &self.temp_dir {
            builder = builder.temp_dir(dir);
        }
        let config = builder.build();
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_notes() {
        assert_eq!(parse_note("12=lane change"), Ok((12, "lane change".to_string())));
        assert_eq!(parse_note("3=a=b"), Ok((3, "a=b".to_string())));
        assert_eq!(parse_note("-1="), Ok((-1, String::new())));
        assert!(parse_note("no separator").is_err());
        assert!(parse_note("x=text").is_err());
    }

    #[test]
    fn global_flags_reach_config() {
        let cli = Cli::try_parse_from([
            "framenote",
            "--lang",
            "pt",
            "--csv-bom",
            "--no-autosave",
            "--thumbnail-size",
            "150",
            "probe",
            "clip.mp4",
        ])
        .unwrap();
        let config = cli.core_config().unwrap();
        assert_eq!(config.report_language, ReportLanguage::Portuguese);
        assert!(config.csv_byte_order_mark);
        assert!(!config.autosave_drafts);
        assert_eq!(config.thumbnail_size, 150);
    }

    #[test]
    fn invalid_thumbnail_size_is_config_error() {
        let cli = Cli::try_parse_from(["framenote", "--thumbnail-size", "4", "probe", "clip.mp4"])
            .unwrap();
        assert!(matches!(cli.core_config(), Err(framenote_core::CoreError::Config(_))));
    }

    #[test]
    fn export_report_paths_are_optional() {
        let cli = Cli::try_parse_from([
            "framenote", "export", "clip.mp4", "--note", "1=a", "--csv", "--pdf", "out.pdf",
        ])
        .unwrap();
        let Commands::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.csv, Some(None));
        assert_eq!(args.pdf, Some(Some(PathBuf::from("out.pdf"))));
        assert_eq!(args.notes, vec![(1, "a".to_string())]);
    }
}
