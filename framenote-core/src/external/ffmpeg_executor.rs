// ============================================================================
// framenote-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: FFmpeg Process Management and Frame Decoding
//
// This module provides abstractions for spawning and interacting with FFmpeg
// processes, and the frame decoder built on top of them.
//
// KEY COMPONENTS:
// - FfmpegProcess: Trait representing an active FFmpeg process
// - FfmpegSpawner: Trait for creating new FFmpeg processes
// - SidecarSpawner: Concrete implementation using ffmpeg-sidecar
// - FrameDecoder: Trait for reading single frames and counting decodable frames
// - SidecarFrameDecoder: rawvideo rgb24 decoder driven through a spawner

use std::path::Path;
use std::process::ExitStatus;

use ffmpeg_sidecar::child::FfmpegChild as SidecarChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use image::RgbImage;

use crate::config::DEFAULT_SCAN_PROGRESS_INTERVAL;
use crate::error::{
    CoreError, CoreResult, command_failed_error, command_start_error, command_wait_error,
};
use crate::frame::FrameIndex;

// --- FFmpeg Execution Abstraction ---

/// Trait representing an active ffmpeg process instance.
pub trait FfmpegProcess {
    /// Processes events from the running command using a provided handler closure.
    fn handle_events<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>;

    /// Waits for the command to complete and returns its exit status.
    fn wait(&mut self) -> CoreResult<ExitStatus>;
}

/// Trait representing something that can spawn an FfmpegProcess.
pub trait FfmpegSpawner {
    type Process: FfmpegProcess;
    /// Spawns the ffmpeg command, consuming the command object.
    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process>;
}

// --- Concrete Implementation using ffmpeg-sidecar ---

/// Wrapper around `ffmpeg_sidecar::child::FfmpegChild` implementing `FfmpegProcess`.
pub struct SidecarProcess(SidecarChild);

impl FfmpegProcess for SidecarProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        let iterator = self.0.iter().map_err(|e| {
            log::error!("Failed to get ffmpeg event iterator: {}", e);
            CoreError::FrameDecode(format!("ffmpeg event stream unavailable: {e}"))
        })?;
        for event in iterator {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        self.0
            .wait()
            .map_err(|e| command_wait_error("ffmpeg (sidecar)", e))
    }
}

/// Concrete implementation of `FfmpegSpawner` using `ffmpeg-sidecar`.
#[derive(Debug, Clone, Default)]
pub struct SidecarSpawner;

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        cmd.spawn()
            .map(SidecarProcess)
            .map_err(|e| command_start_error("ffmpeg", e))
    }
}

// --- Frame Decoding ---

/// Reads decoded frames out of a video file.
pub trait FrameDecoder {
    /// Decodes the frame at `index` as RGB.
    ///
    /// Returns `Ok(None)` when the stream ends before `index`.
    fn decode_frame(&self, input_path: &Path, index: FrameIndex) -> CoreResult<Option<RgbImage>>;

    /// Decodes every frame sequentially and returns how many were read.
    ///
    /// `progress` receives the running count periodically. The scan cannot
    /// be cancelled; it ends at end of stream or at the first unreadable frame.
    fn count_frames(&self, input_path: &Path, progress: &mut dyn FnMut(u64)) -> CoreResult<u64>;
}

/// [`FrameDecoder`] that pipes rawvideo rgb24 out of ffmpeg.
#[derive(Debug, Clone)]
pub struct SidecarFrameDecoder<S: FfmpegSpawner = SidecarSpawner> {
    spawner: S,
    progress_interval: u64,
}

impl Default for SidecarFrameDecoder<SidecarSpawner> {
    fn default() -> Self {
        Self::new(SidecarSpawner)
    }
}

impl<S: FfmpegSpawner> SidecarFrameDecoder<S> {
    pub fn new(spawner: S) -> Self {
        Self {
            spawner,
            progress_interval: DEFAULT_SCAN_PROGRESS_INTERVAL,
        }
    }

    /// Sets how many frames pass between progress callbacks during a scan.
    pub fn with_progress_interval(mut self, frames: u64) -> Self {
        self.progress_interval = frames.max(1);
        self
    }
}

/// Builds the single-frame extraction command: `select=eq(n\,N)`, one frame, rgb24 to stdout.
pub(crate) fn frame_extraction_command(input_path: &Path, index: FrameIndex) -> FfmpegCommand {
    let select = format!("select=eq(n\\,{})", index.get());
    let mut cmd = FfmpegCommand::new();
    cmd.hide_banner();
    cmd.input(input_path.to_string_lossy().as_ref());
    cmd.args(["-map", "0:v:0"]);
    cmd.args(["-vf", select.as_str()]);
    cmd.args(["-vsync", "0"]);
    cmd.frames(1);
    cmd.rawvideo();
    cmd
}

/// Builds the exhaustive scan command. Frames are shrunk to keep the pipe cheap.
pub(crate) fn frame_scan_command(input_path: &Path) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new();
    cmd.hide_banner();
    cmd.input(input_path.to_string_lossy().as_ref());
    cmd.args(["-map", "0:v:0"]);
    cmd.args(["-vf", "scale=16:16"]);
    cmd.args(["-vsync", "0"]);
    cmd.rawvideo();
    cmd
}

fn is_error_event(event: &FfmpegEvent) -> Option<&str> {
    match event {
        FfmpegEvent::Error(msg) => Some(msg),
        FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, msg) => Some(msg),
        _ => None,
    }
}

impl<S: FfmpegSpawner> FrameDecoder for SidecarFrameDecoder<S> {
    fn decode_frame(&self, input_path: &Path, index: FrameIndex) -> CoreResult<Option<RgbImage>> {
        let cmd = frame_extraction_command(input_path, index);
        log::debug!("Running frame extraction command: {:?}", cmd);

        let mut process = self.spawner.spawn(cmd)?;
        let mut decoded = None;
        let mut errors = Vec::new();

        process.handle_events(|event| {
            match event {
                FfmpegEvent::OutputFrame(frame) => {
                    if decoded.is_none() {
                        decoded = Some(frame);
                    }
                }
                other => {
                    if let Some(msg) = is_error_event(&other) {
                        errors.push(msg.to_string());
                    }
                }
            }
            Ok(())
        })?;
        let status = process.wait()?;

        match decoded {
            Some(frame) => {
                let (width, height) = (frame.width, frame.height);
                RgbImage::from_raw(width, height, frame.data)
                    .map(Some)
                    .ok_or_else(|| {
                        CoreError::FrameDecode(format!(
                            "frame {index} buffer does not match {width}x{height} rgb24"
                        ))
                    })
            }
            None if status.success() => {
                log::debug!(
                    "No frame {} in {} (end of stream)",
                    index,
                    input_path.display()
                );
                Ok(None)
            }
            None => Err(command_failed_error(
                "ffmpeg (frame extraction)",
                status,
                errors.join("\n"),
            )),
        }
    }

    fn count_frames(&self, input_path: &Path, progress: &mut dyn FnMut(u64)) -> CoreResult<u64> {
        let cmd = frame_scan_command(input_path);
        log::debug!("Running exhaustive frame scan: {:?}", cmd);

        let mut process = self.spawner.spawn(cmd)?;
        let mut count: u64 = 0;
        let mut errors = Vec::new();
        let interval = self.progress_interval;

        process.handle_events(|event| {
            match event {
                FfmpegEvent::OutputFrame(_) => {
                    count += 1;
                    if count % interval == 0 {
                        progress(count);
                    }
                }
                other => {
                    if let Some(msg) = is_error_event(&other) {
                        errors.push(msg.to_string());
                    }
                }
            }
            Ok(())
        })?;
        let status = process.wait()?;
        progress(count);

        if !status.success() {
            if count == 0 {
                return Err(command_failed_error(
                    "ffmpeg (frame scan)",
                    status,
                    errors.join("\n"),
                ));
            }
            log::warn!(
                "Frame scan of {} stopped with {} after {} frames; using the frames read so far",
                input_path.display(),
                status,
                count
            );
        }

        log::debug!("Counted {} decodable frames in {}", count, input_path.display());
        Ok(count)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use ffmpeg_sidecar::event::OutputVideoFrame;

    use super::*;
    use crate::external::mocks::{MockFfmpegProcess, MockFfmpegSpawner};

    fn args_of(cmd: &FfmpegCommand) -> Vec<String> {
        cmd.get_args()
            .map(|s| s.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn extraction_command_selects_exact_frame() {
        let args = args_of(&frame_extraction_command(Path::new("in.mp4"), FrameIndex(42)));
        assert!(args.iter().any(|a| a == "select=eq(n\\,42)"));
        assert!(args.iter().any(|a| a == "rawvideo"));
        assert!(args.iter().any(|a| a == "rgb24"));
    }

    #[test]
    fn scan_command_maps_first_video_stream() {
        let args = args_of(&frame_scan_command(Path::new("in.mkv")));
        let map_pos = args.iter().position(|a| a == "-map").unwrap();
        assert_eq!(args[map_pos + 1], "0:v:0");
    }

    #[test]
    fn decode_past_end_of_stream_is_none() {
        let spawner = MockFfmpegSpawner::new();
        spawner.push(MockFfmpegProcess::exiting(0, vec![]));
        let decoder = SidecarFrameDecoder::new(spawner.clone());

        let frame = decoder.decode_frame(Path::new("in.mp4"), FrameIndex(9_999)).unwrap();
        assert!(frame.is_none());
        assert_eq!(spawner.received_calls().len(), 1);
    }

    #[test]
    fn decode_failure_reports_ffmpeg_errors() {
        let spawner = MockFfmpegSpawner::new();
        spawner.push(MockFfmpegProcess::exiting(
            1,
            vec![FfmpegEvent::Error("moov atom not found".to_string())],
        ));
        let decoder = SidecarFrameDecoder::new(spawner);

        let err = decoder.decode_frame(Path::new("in.mp4"), FrameIndex(0)).unwrap_err();
        match err {
            CoreError::CommandFailed { stderr, .. } => assert!(stderr.contains("moov atom")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn scan_with_no_frames_and_failed_exit_is_an_error() {
        let spawner = MockFfmpegSpawner::new();
        spawner.push(MockFfmpegProcess::exiting(
            1,
            vec![FfmpegEvent::Log(LogLevel::Error, "Invalid data found".to_string())],
        ));
        let decoder = SidecarFrameDecoder::new(spawner);

        let mut seen = Vec::new();
        let result = decoder.count_frames(Path::new("in.mp4"), &mut |n| seen.push(n));
        assert!(matches!(result, Err(CoreError::CommandFailed { .. })));
        assert_eq!(seen, vec![0]);
    }

    #[test]
    fn scan_of_empty_stream_counts_zero() {
        let spawner = MockFfmpegSpawner::new();
        spawner.push(MockFfmpegProcess::exiting(0, vec![]));
        let decoder = SidecarFrameDecoder::new(spawner);

        assert_eq!(decoder.count_frames(Path::new("in.mp4"), &mut |_| {}).unwrap(), 0);
    }

    fn scan_frame(frame_num: u32) -> FfmpegEvent {
        FfmpegEvent::OutputFrame(OutputVideoFrame {
            width: 16,
            height: 16,
            pix_fmt: "rgb24".to_string(),
            output_index: 0,
            data: vec![0; 16 * 16 * 3],
            frame_num,
            timestamp: frame_num as f32 / 25.0,
        })
    }

    #[test]
    fn scan_cut_short_keeps_the_frames_read() {
        let spawner = MockFfmpegSpawner::new();
        let mut events: Vec<FfmpegEvent> = (0..3).map(scan_frame).collect();
        events.push(FfmpegEvent::Error("error while decoding MB 12 4".to_string()));
        spawner.push(MockFfmpegProcess::exiting(1, events));
        let decoder = SidecarFrameDecoder::new(spawner);

        let mut seen = Vec::new();
        let count = decoder
            .count_frames(Path::new("in.mp4"), &mut |n| seen.push(n))
            .unwrap();
        assert_eq!(count, 3);
        assert_eq!(seen.last(), Some(&3));
    }
}
