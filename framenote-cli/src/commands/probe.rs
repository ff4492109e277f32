// ============================================================================
// framenote-cli/src/commands/probe.rs
// ============================================================================
//
// PROBE COMMAND: Frame-Count Resolution Report
//
// Resolves the frame count of one video and reports where the number came
// from, which fallbacks were taken on the way, and the basic stream
// properties. `--json` prints the same report with serde_json.

use std::io::Write;
use std::path::Path;

use framenote_core::resolver::FallbackRecord;
use framenote_core::{
    MediaTools, ResolvedFrameCount, VideoHandle, VideoProperties, format_bytes, format_duration,
};
use serde::Serialize;

use crate::cli::ProbeArgs;
use crate::commands::open_with_spinner;
use crate::error::{CliErrorContext, CliResult};
use crate::terminal::Terminal;

/// Everything `probe` reports about a video.
#[derive(Debug, Serialize)]
pub struct ProbeReport<'a> {
    pub input: &'a Path,
    /// File the count was taken from; differs from `input` after a remux
    pub resource: &'a Path,
    pub remuxed: bool,
    pub frame_count: ResolvedFrameCount,
    pub fallbacks: &'a [FallbackRecord],
    pub properties: Option<&'a VideoProperties>,
    pub file_size_bytes: Option<u64>,
}

impl<'a> ProbeReport<'a> {
    pub fn new(input: &'a Path, handle: &'a VideoHandle) -> Self {
        Self {
            input,
            resource: handle.path(),
            remuxed: handle.resource().is_temporary(),
            frame_count: handle.resolved_frame_count(),
            fallbacks: handle.fallbacks(),
            properties: handle.properties(),
            file_size_bytes: std::fs::metadata(input).ok().map(|m| m.len()),
        }
    }

    /// Prints the report as styled terminal output.
    pub fn print<W: Write>(&self, term: &mut Terminal<W>) -> std::io::Result<()> {
        term.section("Video")?;
        term.status("Input", &self.input.display().to_string(), false)?;
        if self.remuxed {
            term.status("Remuxed copy", &self.resource.display().to_string(), false)?;
        }
        if let Some(size) = self.file_size_bytes {
            term.status("File size", &format_bytes(size), false)?;
        }
        if let Some(properties) = self.properties {
            term.status("Resolution", &properties.resolution(), false)?;
            if let Some(duration) = properties.duration_secs {
                term.status("Duration", &format_duration(duration), false)?;
            }
        }

        term.section("Frame count")?;
        term.status("Frames", &self.frame_count.get().to_string(), true)?;
        term.status("Source", self.frame_count.source(), false)?;
        if self.fallbacks.is_empty() {
            term.success("Container metadata was trusted")?;
        } else {
            term.processing("Fallbacks taken")?;
            for record in self.fallbacks {
                term.sub_item(&record.to_string())?;
                for line in record.reason.diagnostics() {
                    term.sub_item(&format!("  {line}"))?;
                }
            }
        }
        Ok(())
    }
}

/// Runs `framenote probe`.
pub fn run_probe<W: Write>(
    term: &mut Terminal<W>,
    tools: &MediaTools,
    config: &framenote_core::CoreConfig,
    args: &ProbeArgs,
) -> CliResult<()> {
    let handle = open_with_spinner(&args.input, tools, config)?;
    let report = ProbeReport::new(&args.input, &handle);

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| crate::cli_error!("Failed to serialize probe report: {e}"))?;
        term.line(&json)?;
    } else {
        report.print(term)?;
    }
    term.flush().cli_context("Writing probe report")
}
