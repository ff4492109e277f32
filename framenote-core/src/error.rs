// ============================================================================
// framenote-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error Types for the FrameNote Core Library
//
// This module defines the error taxonomy used across the core library. Every
// failure that can reach the user is represented here so the CLI can report a
// precise reason (tool missing vs. tool failed vs. content unreadable).
//
// KEY COMPONENTS:
// - CoreError: the error enum for all core operations
// - CoreResult: result alias
// - Helper constructors for external command failures

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors produced by the FrameNote core library.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input cannot be opened as a video at all.
    #[error("Cannot read '{}' as a video: {reason}", .path.display())]
    ResourceUnreadable { path: PathBuf, reason: String },

    /// Every frame-count strategy was exhausted without a positive count.
    #[error(
        "Could not determine the frame count of '{}': {}",
        .path.display(),
        .reasons.join("; ")
    )]
    FrameCountUnresolved { path: PathBuf, reasons: Vec<String> },

    #[error("Required external tool not found: {0}")]
    DependencyNotFound(String),

    #[error("Failed to start '{0}': {1}")]
    CommandStart(String, #[source] std::io::Error),

    #[error("Failed while waiting for '{0}': {1}")]
    CommandWait(String, #[source] std::io::Error),

    #[error("'{tool}' exited with {status}")]
    CommandFailed {
        tool: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Failed to parse ffprobe output: {0}")]
    FfprobeParse(String),

    #[error("Failed to decode frame: {0}")]
    FrameDecode(String),

    /// Writing a CSV or PDF report failed. Annotation state is unaffected.
    #[error("Failed to export '{}': {reason}", .path.display())]
    Export { path: PathBuf, reason: String },

    #[error("No video is loaded")]
    NoVideoLoaded,

    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A front-end operation failed; the message carries its context.
    #[error("{0}")]
    OperationFailed(String),
}

/// Result type for core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Builds a [`CoreError::CommandStart`], mapping "not found" to [`CoreError::DependencyNotFound`].
pub fn command_start_error(tool: impl Into<String>, err: std::io::Error) -> CoreError {
    let tool = tool.into();
    if err.kind() == std::io::ErrorKind::NotFound {
        CoreError::DependencyNotFound(tool)
    } else {
        CoreError::CommandStart(tool, err)
    }
}

pub fn command_wait_error(tool: impl Into<String>, err: std::io::Error) -> CoreError {
    CoreError::CommandWait(tool.into(), err)
}

pub fn command_failed_error(
    tool: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed {
        tool: tool.into(),
        status,
        stderr: stderr.into(),
    }
}

pub(crate) fn export_error(path: impl Into<PathBuf>, reason: impl ToString) -> CoreError {
    CoreError::Export {
        path: path.into(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_missing_dependency() {
        let err = command_start_error(
            "ffmpeg",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        assert!(matches!(err, CoreError::DependencyNotFound(ref tool) if tool == "ffmpeg"));
    }

    #[test]
    fn other_spawn_errors_stay_command_start() {
        let err = command_start_error(
            "ffmpeg",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, CoreError::CommandStart(..)));
    }

    #[test]
    fn unresolved_message_lists_reasons() {
        let err = CoreError::FrameCountUnresolved {
            path: PathBuf::from("clip.mkv"),
            reasons: vec!["a".into(), "b".into()],
        };
        assert_eq!(
            err.to_string(),
            "Could not determine the frame count of 'clip.mkv': a; b"
        );
    }
}
