// ============================================================================
// framenote-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg and ffprobe
//
// This module wraps every external tool the library touches behind a trait so
// the resolver, the session and the exporters can be exercised without the
// real binaries installed.
//
// KEY COMPONENTS:
// - FfprobeExecutor: container metadata (reported frame count, dimensions)
// - FrameDecoder: single-frame extraction and exhaustive frame scans
// - Remuxer: stream-copy normalization into a faststart MP4
// - MediaTools: the bundle of all three handed to the rest of the crate
// - Dependency checking

use std::io;
use std::process::{Command, Stdio};

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Traits and implementations for spawning ffmpeg and decoding frames
pub mod ffmpeg_executor;

/// Traits and implementations for executing ffprobe
pub mod ffprobe_executor;

/// Stream-copy remuxing through the ffmpeg binary
pub mod remux;

pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg_executor::{
    FfmpegProcess, FfmpegSpawner, FrameDecoder, SidecarFrameDecoder, SidecarProcess,
    SidecarSpawner,
};
pub use ffprobe_executor::{CrateFfprobeExecutor, FfprobeExecutor};
pub use remux::{FfmpegRemuxer, Remuxer};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks that an external command exists and can be started.
///
/// Runs `<cmd_name> -version` and only looks at whether the process started.
///
/// # Errors
///
/// * `CoreError::DependencyNotFound` if the command is not on `PATH`
/// * `CoreError::CommandStart` if it exists but cannot be started
pub(crate) fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", cmd_name);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found.", cmd_name);
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!(
                "Failed to start dependency check command '{}': {}",
                cmd_name,
                e
            );
            Err(CoreError::CommandStart(cmd_name.to_string(), e))
        }
    }
}

// ============================================================================
// TOOL BUNDLE
// ============================================================================

/// The external collaborators used to open and read videos.
///
/// Production code uses [`MediaTools::system`]; tests swap in fakes through
/// [`MediaTools::new`].
pub struct MediaTools {
    pub ffprobe: Box<dyn FfprobeExecutor>,
    pub decoder: Box<dyn FrameDecoder>,
    pub remuxer: Box<dyn Remuxer>,
}

impl MediaTools {
    pub fn new(
        ffprobe: Box<dyn FfprobeExecutor>,
        decoder: Box<dyn FrameDecoder>,
        remuxer: Box<dyn Remuxer>,
    ) -> Self {
        Self {
            ffprobe,
            decoder,
            remuxer,
        }
    }

    /// Tools backed by the installed ffprobe and ffmpeg binaries.
    pub fn system(config: &CoreConfig) -> Self {
        Self::new(
            Box::new(CrateFfprobeExecutor::new()),
            Box::new(
                SidecarFrameDecoder::default()
                    .with_progress_interval(config.scan_progress_interval),
            ),
            Box::new(FfmpegRemuxer::default()),
        )
    }
}

impl std::fmt::Debug for MediaTools {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaTools").finish_non_exhaustive()
    }
}
