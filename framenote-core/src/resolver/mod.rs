// ============================================================================
// framenote-core/src/resolver/mod.rs
// ============================================================================
//
// FRAME-COUNT RESOLVER: Trustworthy Total Frame Counts
//
// Container metadata is sometimes absent or wrong, so the total frame count of
// a video is determined by an ordered list of strategies, each more expensive
// than the last. A small driver tries them in sequence.
//
// KEY COMPONENTS:
// - FrameCountStrategy: one step of the chain, resource in, outcome out
// - Attempt / AttemptResult / FallbackReason: what a step reports back
// - FrameCountResolver: the driver that owns the current resource
// - strategies: the default chain (metadata, remux, exhaustive scan)
//
// A strategy may hand back a replacement resource (the remux step does). The
// driver always adopts it, which drops and deletes the resource it replaces.

use std::fmt;

use serde::Serialize;

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::MediaTools;
use crate::media::VideoResource;
use crate::utils::tail_lines;

pub mod strategies;

pub use strategies::{ContainerMetadata, ExhaustiveScan, RemuxFaststart};

/// A positive total frame count and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "frames", rename_all = "snake_case")]
pub enum ResolvedFrameCount {
    /// Reported by the container and accepted as-is
    Trusted(u64),
    /// Counted by decoding every frame
    Measured(u64),
}

impl ResolvedFrameCount {
    #[must_use]
    pub fn get(self) -> u64 {
        match self {
            Self::Trusted(n) | Self::Measured(n) => n,
        }
    }

    #[must_use]
    pub fn is_trusted(self) -> bool {
        matches!(self, Self::Trusted(_))
    }

    #[must_use]
    pub fn source(self) -> &'static str {
        match self {
            Self::Trusted(_) => "container metadata",
            Self::Measured(_) => "exhaustive scan",
        }
    }
}

impl fmt::Display for ResolvedFrameCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.get(), self.source())
    }
}

/// Why a strategy handed over to the next one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FallbackReason {
    /// Container count missing, unparsable or not positive
    UnreliableCount { reported: Option<i64> },
    /// An external tool is not installed
    ToolMissing { tool: String },
    /// An external tool ran and failed; `diagnostics` holds its last output lines
    ToolFailed {
        tool: String,
        exit_code: Option<i32>,
        diagnostics: Vec<String>,
    },
    /// The exhaustive scan decoded nothing
    NoFrames,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnreliableCount { reported: Some(n) } => {
                write!(f, "container reported an unusable frame count ({n})")
            }
            Self::UnreliableCount { reported: None } => {
                write!(f, "container reported no frame count")
            }
            Self::ToolMissing { tool } => write!(f, "'{tool}' is not installed"),
            Self::ToolFailed {
                tool,
                exit_code,
                diagnostics,
            } => {
                match exit_code {
                    Some(code) => write!(f, "'{tool}' failed with exit code {code}")?,
                    None => write!(f, "'{tool}' failed")?,
                }
                // The alternate form appends the kept tool output, one line each.
                if f.alternate() {
                    for line in diagnostics {
                        write!(f, "\n    {line}")?;
                    }
                }
                Ok(())
            }
            Self::NoFrames => write!(f, "no frames could be decoded"),
        }
    }
}

impl FallbackReason {
    /// Last output lines of a failed tool; empty for every other reason.
    #[must_use]
    pub fn diagnostics(&self) -> &[String] {
        match self {
            Self::ToolFailed { diagnostics, .. } => diagnostics,
            _ => &[],
        }
    }
}

/// Terminal or non-terminal outcome of one strategy.
#[derive(Debug)]
pub enum AttemptResult {
    Resolved(ResolvedFrameCount),
    Fallback(FallbackReason),
    Fatal(CoreError),
}

/// What a strategy returns: its outcome plus an optional replacement resource.
#[derive(Debug)]
pub struct Attempt {
    pub replacement: Option<VideoResource>,
    pub result: AttemptResult,
}

impl Attempt {
    pub fn resolved(count: ResolvedFrameCount) -> Self {
        Self {
            replacement: None,
            result: AttemptResult::Resolved(count),
        }
    }

    pub fn fallback(reason: FallbackReason) -> Self {
        Self {
            replacement: None,
            result: AttemptResult::Fallback(reason),
        }
    }

    pub fn fatal(err: CoreError) -> Self {
        Self {
            replacement: None,
            result: AttemptResult::Fatal(err),
        }
    }

    #[must_use]
    pub fn with_replacement(mut self, resource: VideoResource) -> Self {
        self.replacement = Some(resource);
        self
    }
}

/// One step of the frame-count chain.
pub trait FrameCountStrategy {
    /// Short name used in logs and fallback reports.
    fn name(&self) -> &'static str;

    /// Tries to determine the frame count of `resource`.
    fn attempt(&self, resource: &VideoResource) -> Attempt;
}

/// Receives the running frame count during an exhaustive scan.
pub trait ScanObserver {
    fn frames_scanned(&self, frames: u64);
}

impl<F: Fn(u64)> ScanObserver for F {
    fn frames_scanned(&self, frames: u64) {
        self(frames);
    }
}

/// A fallback taken while resolving, tagged with the strategy that took it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FallbackRecord {
    pub strategy: &'static str,
    pub reason: FallbackReason,
}

impl fmt::Display for FallbackRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{}: {:#}", self.strategy, self.reason)
        } else {
            write!(f, "{}: {}", self.strategy, self.reason)
        }
    }
}

/// Successful resolution: the resource that was counted and its count.
#[derive(Debug)]
pub struct Resolution {
    /// The final resource, possibly a remuxed replacement of the input
    pub resource: VideoResource,
    pub frame_count: ResolvedFrameCount,
    pub fallbacks: Vec<FallbackRecord>,
}

/// Tries strategies in order until one resolves.
pub struct FrameCountResolver<'a> {
    strategies: Vec<Box<dyn FrameCountStrategy + 'a>>,
}

impl<'a> FrameCountResolver<'a> {
    pub fn new(strategies: Vec<Box<dyn FrameCountStrategy + 'a>>) -> Self {
        Self { strategies }
    }

    /// The default chain: container metadata, faststart remux, exhaustive scan.
    pub fn standard(
        tools: &'a MediaTools,
        config: &'a CoreConfig,
        observer: &'a dyn ScanObserver,
    ) -> Self {
        Self::new(vec![
            Box::new(ContainerMetadata::new(tools.ffprobe.as_ref())),
            Box::new(RemuxFaststart::new(
                tools.remuxer.as_ref(),
                tools.ffprobe.as_ref(),
                config.temp_dir.as_deref(),
                config.diagnostic_tail_lines,
            )),
            Box::new(ExhaustiveScan::new(
                tools.decoder.as_ref(),
                observer,
                config.diagnostic_tail_lines,
            )),
        ])
    }

    /// Runs the chain on `resource`.
    ///
    /// # Errors
    ///
    /// Returns the error of the first `Fatal` attempt, or
    /// `CoreError::FrameCountUnresolved` with every fallback reason when the
    /// chain is exhausted. A count of zero is never returned.
    pub fn resolve(&self, resource: VideoResource) -> CoreResult<Resolution> {
        let mut current = resource;
        let mut fallbacks = Vec::new();

        for strategy in &self.strategies {
            log::debug!(
                "Trying frame-count strategy '{}' on {}",
                strategy.name(),
                current.path().display()
            );
            let Attempt {
                replacement,
                result,
            } = strategy.attempt(&current);

            if let Some(next) = replacement {
                log::debug!(
                    "Strategy '{}' replaced {} with {}",
                    strategy.name(),
                    current.path().display(),
                    next.path().display()
                );
                current = next;
            }

            match result {
                AttemptResult::Resolved(frame_count) => {
                    log::debug!(
                        "Resolved {} frames for {} via '{}'",
                        frame_count.get(),
                        current.path().display(),
                        strategy.name()
                    );
                    return Ok(Resolution {
                        resource: current,
                        frame_count,
                        fallbacks,
                    });
                }
                AttemptResult::Fallback(reason) => {
                    log::warn!("Frame-count strategy '{}' fell back: {}", strategy.name(), reason);
                    fallbacks.push(FallbackRecord {
                        strategy: strategy.name(),
                        reason,
                    });
                }
                AttemptResult::Fatal(err) => {
                    log::error!("Frame-count strategy '{}' failed: {}", strategy.name(), err);
                    return Err(err);
                }
            }
        }

        Err(CoreError::FrameCountUnresolved {
            path: current.path().to_path_buf(),
            reasons: fallbacks.iter().map(|record| format!("{record:#}")).collect(),
        })
    }
}

/// Maps a tool error to a fallback, or to a fatal outcome when the content itself is bad.
pub(crate) fn classify_tool_error(err: CoreError, tail: usize) -> AttemptResult {
    match tool_failure(err, tail) {
        Ok(reason) => AttemptResult::Fallback(reason),
        Err(err) => AttemptResult::Fatal(err),
    }
}

/// The fallback reason for a tool error, or the error back when it is not a tool problem.
pub(crate) fn tool_failure(err: CoreError, tail: usize) -> Result<FallbackReason, CoreError> {
    match err {
        CoreError::DependencyNotFound(tool) => Ok(FallbackReason::ToolMissing { tool }),
        CoreError::CommandFailed {
            tool,
            status,
            stderr,
        } => Ok(FallbackReason::ToolFailed {
            tool,
            exit_code: status.code(),
            diagnostics: tail_lines(&stderr, tail),
        }),
        CoreError::CommandStart(tool, e) | CoreError::CommandWait(tool, e) => {
            Ok(FallbackReason::ToolFailed {
                tool,
                exit_code: None,
                diagnostics: vec![e.to_string()],
            })
        }
        CoreError::FfprobeParse(msg) => Ok(FallbackReason::ToolFailed {
            tool: "ffprobe".to_string(),
            exit_code: None,
            diagnostics: vec![msg],
        }),
        CoreError::FrameDecode(msg) => Ok(FallbackReason::ToolFailed {
            tool: "ffmpeg".to_string(),
            exit_code: None,
            diagnostics: vec![msg],
        }),
        other => Err(other),
    }
}
