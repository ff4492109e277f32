//! FFprobe integration for container metadata.
//!
//! Reads the container-reported frame count and the basic properties of the
//! first video stream. The count is reported as a signed value because
//! containers can report zero or garbage; deciding whether it is trustworthy
//! is the resolver's job.

use std::path::Path;

use ffprobe::{FfProbe, FfProbeError, ffprobe};

use crate::error::{CoreError, CoreResult, command_start_error};
use crate::media::VideoProperties;
use crate::utils::tail_lines;

/// Trait for anything that can read container metadata from a video file.
pub trait FfprobeExecutor {
    /// Frame count reported by the container for the first video stream.
    ///
    /// Returns `Ok(None)` when the stream carries no parsable count.
    fn get_reported_frame_count(&self, input_path: &Path) -> CoreResult<Option<i64>>;

    /// Dimensions and duration of the first video stream.
    fn get_video_properties(&self, input_path: &Path) -> CoreResult<VideoProperties>;
}

/// Default executor backed by the `ffprobe` crate.
#[derive(Debug, Clone, Default)]
pub struct CrateFfprobeExecutor;

impl CrateFfprobeExecutor {
    pub fn new() -> Self {
        Self
    }

    fn probe(&self, input_path: &Path, context: &str) -> CoreResult<FfProbe> {
        log::debug!(
            "Running ffprobe (via crate) for {} on: {}",
            context,
            input_path.display()
        );
        ffprobe(input_path).map_err(|err| {
            log::error!(
                "ffprobe failed for {} on {}: {:?}",
                context,
                input_path.display(),
                err
            );
            map_ffprobe_error(err, input_path, context)
        })
    }
}

impl FfprobeExecutor for CrateFfprobeExecutor {
    fn get_reported_frame_count(&self, input_path: &Path) -> CoreResult<Option<i64>> {
        let metadata = self.probe(input_path, "frame count")?;
        let video_stream = metadata
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .ok_or_else(|| no_video_stream(input_path))?;

        let reported = parse_reported_count(video_stream.nb_frames.as_deref());
        log::debug!(
            "Container reports {:?} frames for {}",
            reported,
            input_path.display()
        );
        Ok(reported)
    }

    fn get_video_properties(&self, input_path: &Path) -> CoreResult<VideoProperties> {
        let metadata = self.probe(input_path, "video properties")?;

        let duration_secs = metadata
            .format
            .duration
            .as_deref()
            .and_then(|d| d.parse::<f64>().ok());

        let video_stream = metadata
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .ok_or_else(|| no_video_stream(input_path))?;

        let width = video_stream.width.ok_or_else(|| {
            CoreError::FfprobeParse(format!(
                "Video stream missing width in {}",
                input_path.display()
            ))
        })?;
        let height = video_stream.height.ok_or_else(|| {
            CoreError::FfprobeParse(format!(
                "Video stream missing height in {}",
                input_path.display()
            ))
        })?;

        if width < 0 || height < 0 {
            return Err(CoreError::FfprobeParse(format!(
                "Invalid dimensions (negative) found in {}: width={}, height={}",
                input_path.display(),
                width,
                height
            )));
        }

        Ok(VideoProperties {
            width: width as u32,
            height: height as u32,
            duration_secs,
        })
    }
}

/// Parses an `nb_frames` field. "N/A", empty and non-numeric values are `None`.
pub(crate) fn parse_reported_count(raw: Option<&str>) -> Option<i64> {
    raw.map(str::trim).and_then(|s| s.parse::<i64>().ok())
}

fn no_video_stream(input_path: &Path) -> CoreError {
    CoreError::ResourceUnreadable {
        path: input_path.to_path_buf(),
        reason: "no video stream found".to_string(),
    }
}

fn map_ffprobe_error(err: FfProbeError, input_path: &Path, context: &str) -> CoreError {
    match err {
        FfProbeError::Io(io_err) => command_start_error("ffprobe", io_err),
        FfProbeError::Status(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail = tail_lines(&stderr, 1);
            CoreError::ResourceUnreadable {
                path: input_path.to_path_buf(),
                reason: match tail.last() {
                    Some(line) => format!("ffprobe rejected the file ({line})"),
                    None => format!("ffprobe rejected the file ({})", output.status),
                },
            }
        }
        FfProbeError::Deserialize(err) => {
            CoreError::FfprobeParse(format!("ffprobe {context} output deserialization: {err}"))
        }
        #[allow(unreachable_patterns)]
        _ => CoreError::FfprobeParse(format!("Unknown ffprobe error during {context}: {err:?}")),
    }
}
