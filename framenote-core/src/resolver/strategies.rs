//! The default frame-count strategies.
//!
//! Each strategy borrows the tool it needs and turns tool outcomes into an
//! [`Attempt`]. None of them keep state between calls.

use std::path::Path;

use super::{
    Attempt, AttemptResult, FallbackReason, FrameCountStrategy, ResolvedFrameCount, ScanObserver,
    classify_tool_error, tool_failure,
};
use crate::external::{FfprobeExecutor, FrameDecoder, Remuxer};
use crate::media::VideoResource;
use crate::utils::tail_lines;

/// Turns a container-reported count into an attempt outcome.
fn judge_reported_count(reported: Option<i64>) -> AttemptResult {
    match reported {
        Some(n) if n > 0 => AttemptResult::Resolved(ResolvedFrameCount::Trusted(n as u64)),
        other => AttemptResult::Fallback(FallbackReason::UnreliableCount { reported: other }),
    }
}

fn probe_count(ffprobe: &dyn FfprobeExecutor, path: &Path, tail: usize) -> AttemptResult {
    match ffprobe.get_reported_frame_count(path) {
        Ok(reported) => judge_reported_count(reported),
        Err(err) => classify_tool_error(err, tail),
    }
}

// ---- Step 1 ----

/// Accepts the container's `nb_frames` when it is positive.
pub struct ContainerMetadata<'a> {
    ffprobe: &'a dyn FfprobeExecutor,
}

impl<'a> ContainerMetadata<'a> {
    pub fn new(ffprobe: &'a dyn FfprobeExecutor) -> Self {
        Self { ffprobe }
    }
}

impl FrameCountStrategy for ContainerMetadata<'_> {
    fn name(&self) -> &'static str {
        "container-metadata"
    }

    fn attempt(&self, resource: &VideoResource) -> Attempt {
        Attempt {
            replacement: None,
            result: probe_count(self.ffprobe, resource.path(), 1),
        }
    }
}

// ---- Step 2 ----

/// Stream-copies the video into a faststart MP4 and re-reads its count.
pub struct RemuxFaststart<'a> {
    remuxer: &'a dyn Remuxer,
    ffprobe: &'a dyn FfprobeExecutor,
    temp_dir: Option<&'a Path>,
    diagnostic_tail_lines: usize,
}

impl<'a> RemuxFaststart<'a> {
    pub fn new(
        remuxer: &'a dyn Remuxer,
        ffprobe: &'a dyn FfprobeExecutor,
        temp_dir: Option<&'a Path>,
        diagnostic_tail_lines: usize,
    ) -> Self {
        Self {
            remuxer,
            ffprobe,
            temp_dir,
            diagnostic_tail_lines,
        }
    }
}

impl FrameCountStrategy for RemuxFaststart<'_> {
    fn name(&self) -> &'static str {
        "remux-faststart"
    }

    fn attempt(&self, resource: &VideoResource) -> Attempt {
        let remuxed = match self
            .remuxer
            .remux_faststart(resource.path(), self.temp_dir)
        {
            Ok(remuxed) => remuxed,
            Err(err) => {
                return Attempt {
                    replacement: None,
                    result: classify_tool_error(err, self.diagnostic_tail_lines),
                };
            }
        };

        // The copy replaces the input only once ffprobe can read it. Otherwise it
        // is dropped here and the scan runs on the input.
        match self.ffprobe.get_reported_frame_count(remuxed.path()) {
            Ok(reported) => {
                Attempt::from(judge_reported_count(reported)).with_replacement(remuxed)
            }
            Err(err) => {
                log::debug!(
                    "Discarding remuxed copy {}: ffprobe could not read it",
                    remuxed.path().display()
                );
                let tail = self.diagnostic_tail_lines;
                let reason = tool_failure(err, tail).unwrap_or_else(|err| {
                    FallbackReason::ToolFailed {
                        tool: "ffprobe".to_string(),
                        exit_code: None,
                        diagnostics: tail_lines(&err.to_string(), tail),
                    }
                });
                Attempt::fallback(reason)
            }
        }
    }
}

// ---- Step 3 ----

/// Decodes every frame and counts them. Authoritative but O(n).
pub struct ExhaustiveScan<'a> {
    decoder: &'a dyn FrameDecoder,
    observer: &'a dyn ScanObserver,
    diagnostic_tail_lines: usize,
}

impl<'a> ExhaustiveScan<'a> {
    pub fn new(
        decoder: &'a dyn FrameDecoder,
        observer: &'a dyn ScanObserver,
        diagnostic_tail_lines: usize,
    ) -> Self {
        Self {
            decoder,
            observer,
            diagnostic_tail_lines,
        }
    }
}

impl FrameCountStrategy for ExhaustiveScan<'_> {
    fn name(&self) -> &'static str {
        "exhaustive-scan"
    }

    fn attempt(&self, resource: &VideoResource) -> Attempt {
        log::info!(
            "Counting frames of {} by decoding the whole stream",
            resource.path().display()
        );
        let observer = self.observer;
        let result = match self
            .decoder
            .count_frames(resource.path(), &mut |n| observer.frames_scanned(n))
        {
            Ok(0) => AttemptResult::Fallback(FallbackReason::NoFrames),
            Ok(n) => AttemptResult::Resolved(ResolvedFrameCount::Measured(n)),
            Err(err) => classify_tool_error(err, self.diagnostic_tail_lines),
        };
        Attempt::from(result)
    }
}

impl From<AttemptResult> for Attempt {
    fn from(result: AttemptResult) -> Self {
        Attempt {
            replacement: None,
            result,
        }
    }
}
