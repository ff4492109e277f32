//! Container normalization through an ffmpeg stream copy.
//!
//! Re-packages the existing encoded streams into a fresh MP4 with the index
//! moved to the front (`-movflags faststart`). Pixel data is not re-encoded.

use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{CoreResult, command_failed_error, command_start_error};
use crate::media::VideoResource;
use crate::temp_files;

use super::check_dependency;

/// Trait for re-packaging a video into a metadata-friendly container.
pub trait Remuxer {
    /// Writes a normalized copy of `input_path` to a new temporary resource.
    ///
    /// Fails with `DependencyNotFound` when the tool is missing and with
    /// `CommandFailed` (stderr attached) when it exits non-zero.
    fn remux_faststart(
        &self,
        input_path: &Path,
        temp_dir: Option<&Path>,
    ) -> CoreResult<VideoResource>;
}

/// [`Remuxer`] that shells out to the `ffmpeg` binary.
#[derive(Debug, Clone)]
pub struct FfmpegRemuxer {
    program: String,
}

impl Default for FfmpegRemuxer {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegRemuxer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Remuxer for FfmpegRemuxer {
    fn remux_faststart(
        &self,
        input_path: &Path,
        temp_dir: Option<&Path>,
    ) -> CoreResult<VideoResource> {
        check_dependency(&self.program)?;

        let output = temp_files::create_temp_file_path(temp_dir, "framenote_remux", "mp4")?;

        let mut cmd = Command::new(&self.program);
        cmd.arg("-y")
            .arg("-i")
            .arg(input_path)
            .args(["-c", "copy", "-movflags", "faststart"])
            .arg(&*output)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        log::debug!("Running remux command: {:?}", cmd);
        let result = cmd
            .output()
            .map_err(|e| command_start_error(self.program.as_str(), e))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).into_owned();
            log::error!(
                "Remux of {} failed with {}",
                input_path.display(),
                result.status
            );
            // `output` drops here and removes the partial file.
            return Err(command_failed_error(
                format!("{} (remux)", self.program),
                result.status,
                stderr,
            ));
        }

        log::debug!(
            "Remuxed {} to {}",
            input_path.display(),
            output.display()
        );
        Ok(VideoResource::temporary(output))
    }
}
