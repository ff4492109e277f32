// framenote-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// Compiled for unit tests and when the "test-mocks" feature is enabled.
#![cfg(any(test, feature = "test-mocks"))]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use image::{Rgb, RgbImage};
use tempfile::TempPath;

use super::{FfprobeExecutor, FrameDecoder, Remuxer};
use crate::error::{CoreError, CoreResult, command_failed_error};
use crate::frame::FrameIndex;
use crate::media::{VideoProperties, VideoResource};

#[cfg(unix)]
pub use self::ffmpeg::{MockFfmpegProcess, MockFfmpegSpawner};

#[cfg(unix)]
mod ffmpeg {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::os::unix::process::ExitStatusExt; // For ExitStatus::from_raw
    use std::process::ExitStatus;
    use std::rc::Rc;

    use ffmpeg_sidecar::command::FfmpegCommand;
    use ffmpeg_sidecar::event::FfmpegEvent;

    use crate::error::CoreResult;
    use crate::external::{FfmpegProcess, FfmpegSpawner};

    /// Mock implementation of FfmpegProcess.
    pub struct MockFfmpegProcess {
        /// Events to emit when handle_events is called.
        pub events_to_emit: Vec<FfmpegEvent>,
        /// Exit status to return when wait is called.
        pub exit_status: ExitStatus,
    }

    impl MockFfmpegProcess {
        /// A process that emits `events` and then exits with `code`.
        pub fn exiting(code: i32, events: Vec<FfmpegEvent>) -> Self {
            Self {
                events_to_emit: events,
                // Raw wait status: the exit code lives in the high byte.
                exit_status: ExitStatus::from_raw(code << 8),
            }
        }
    }

    impl FfmpegProcess for MockFfmpegProcess {
        fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
        where
            F: FnMut(FfmpegEvent) -> CoreResult<()>,
        {
            for event in self.events_to_emit.drain(..) {
                handler(event)?;
            }
            Ok(())
        }

        fn wait(&mut self) -> CoreResult<ExitStatus> {
            Ok(self.exit_status)
        }
    }

    /// Mock FfmpegSpawner handing out queued processes in order.
    #[derive(Clone, Default)]
    pub struct MockFfmpegSpawner {
        queue: Rc<RefCell<VecDeque<MockFfmpegProcess>>>,
        received_calls: Rc<RefCell<Vec<Vec<String>>>>,
    }

    impl MockFfmpegSpawner {
        pub fn new() -> Self {
            Default::default()
        }

        pub fn push(&self, process: MockFfmpegProcess) {
            self.queue.borrow_mut().push_back(process);
        }

        pub fn received_calls(&self) -> Vec<Vec<String>> {
            self.received_calls.borrow().clone()
        }
    }

    impl FfmpegSpawner for MockFfmpegSpawner {
        type Process = MockFfmpegProcess;

        fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process> {
            let args: Vec<String> = cmd
                .get_args()
                .map(|s| s.to_string_lossy().into_owned())
                .collect();
            self.received_calls.borrow_mut().push(args.clone());

            match self.queue.borrow_mut().pop_front() {
                Some(process) => Ok(process),
                None => panic!("MockFfmpegSpawner: no process queued for args: {:?}", args),
            }
        }
    }
}

/// What the mock ffprobe reports for one path.
#[derive(Debug, Clone, PartialEq)]
pub enum MockProbe {
    /// Container reports this `nb_frames` value (`None` for "N/A")
    Count(Option<i64>),
    /// ffprobe runs but rejects the file
    Unreadable(String),
    /// ffprobe is not installed
    Missing,
}

/// Mock implementation of FfprobeExecutor.
#[derive(Clone, Default)]
pub struct MockFfprobeExecutor {
    counts: Rc<RefCell<HashMap<PathBuf, MockProbe>>>,
    properties: Rc<RefCell<HashMap<PathBuf, VideoProperties>>>,
    count_calls: Rc<RefCell<Vec<PathBuf>>>,
}

impl MockFfprobeExecutor {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn expect_frame_count(&self, input_path: &Path, probe: MockProbe) {
        self.counts
            .borrow_mut()
            .insert(input_path.to_path_buf(), probe);
    }

    pub fn expect_video_properties(&self, input_path: &Path, properties: VideoProperties) {
        self.properties
            .borrow_mut()
            .insert(input_path.to_path_buf(), properties);
    }

    /// Paths passed to `get_reported_frame_count`, in call order.
    pub fn count_calls(&self) -> Vec<PathBuf> {
        self.count_calls.borrow().clone()
    }
}

impl FfprobeExecutor for MockFfprobeExecutor {
    fn get_reported_frame_count(&self, input_path: &Path) -> CoreResult<Option<i64>> {
        self.count_calls.borrow_mut().push(input_path.to_path_buf());
        match self.counts.borrow().get(input_path) {
            Some(MockProbe::Count(count)) => Ok(*count),
            Some(MockProbe::Unreadable(reason)) => Err(CoreError::ResourceUnreadable {
                path: input_path.to_path_buf(),
                reason: reason.clone(),
            }),
            Some(MockProbe::Missing) => Err(CoreError::DependencyNotFound("ffprobe".to_string())),
            None => {
                log::error!(
                    "MockFfprobeExecutor: No expectation set for frame count on path: {}",
                    input_path.display()
                );
                Err(CoreError::FfprobeParse(format!(
                    "MockFfprobeExecutor: No expectation set for path {}",
                    input_path.display()
                )))
            }
        }
    }

    fn get_video_properties(&self, input_path: &Path) -> CoreResult<VideoProperties> {
        self.properties
            .borrow()
            .get(input_path)
            .cloned()
            .ok_or_else(|| {
                CoreError::FfprobeParse(format!(
                    "MockFfprobeExecutor: No properties set for path {}",
                    input_path.display()
                ))
            })
    }
}

/// Mock implementation of FrameDecoder.
///
/// Each registered path decodes `frames` solid-colour frames of the given
/// size; the colour encodes the frame index so tests can tell frames apart.
#[derive(Clone, Default)]
pub struct MockFrameDecoder {
    videos: Rc<RefCell<HashMap<PathBuf, (u64, u32, u32)>>>,
    failing: Rc<RefCell<HashSet<PathBuf>>>,
    scan_calls: Rc<RefCell<Vec<PathBuf>>>,
}

impl MockFrameDecoder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_video(&self, input_path: &Path, frames: u64, width: u32, height: u32) {
        self.videos
            .borrow_mut()
            .insert(input_path.to_path_buf(), (frames, width, height));
    }

    /// Makes every decode and scan of `input_path` fail as if ffmpeg exited non-zero.
    pub fn fail_on(&self, input_path: &Path) {
        self.failing.borrow_mut().insert(input_path.to_path_buf());
    }

    /// Paths passed to `count_frames`, in call order.
    pub fn scan_calls(&self) -> Vec<PathBuf> {
        self.scan_calls.borrow().clone()
    }

    fn check_failure(&self, input_path: &Path, tool: &str) -> CoreResult<()> {
        if self.failing.borrow().contains(input_path) {
            #[cfg(unix)]
            let status = {
                use std::os::unix::process::ExitStatusExt;
                std::process::ExitStatus::from_raw(1 << 8)
            };
            #[cfg(not(unix))]
            let status = {
                use std::os::windows::process::ExitStatusExt;
                std::process::ExitStatus::from_raw(1)
            };
            return Err(command_failed_error(
                tool,
                status,
                "Invalid data found when processing input",
            ));
        }
        Ok(())
    }
}

impl FrameDecoder for MockFrameDecoder {
    fn decode_frame(&self, input_path: &Path, index: FrameIndex) -> CoreResult<Option<RgbImage>> {
        self.check_failure(input_path, "ffmpeg (frame extraction)")?;
        let videos = self.videos.borrow();
        let Some(&(frames, width, height)) = videos.get(input_path) else {
            return Ok(None);
        };
        if index.get() >= frames {
            return Ok(None);
        }
        let shade = (index.get() % 256) as u8;
        Ok(Some(RgbImage::from_pixel(width, height, Rgb([shade, shade, shade]))))
    }

    fn count_frames(&self, input_path: &Path, progress: &mut dyn FnMut(u64)) -> CoreResult<u64> {
        self.scan_calls.borrow_mut().push(input_path.to_path_buf());
        self.check_failure(input_path, "ffmpeg (frame scan)")?;
        let frames = self
            .videos
            .borrow()
            .get(input_path)
            .map_or(0, |&(frames, _, _)| frames);
        progress(frames);
        Ok(frames)
    }
}

/// Outcome of a mock remux.
#[derive(Debug, Clone, PartialEq)]
pub enum MockRemux {
    /// Writes `<temp_dir>/<stem>.remuxed.mp4` and returns it as a temporary resource
    Success,
    /// ffmpeg is not installed
    Missing,
    /// ffmpeg exits non-zero with this stderr
    Failed(String),
}

/// Mock implementation of Remuxer.
#[derive(Clone)]
pub struct MockRemuxer {
    outcome: Rc<RefCell<MockRemux>>,
    calls: Rc<RefCell<Vec<PathBuf>>>,
}

impl Default for MockRemuxer {
    fn default() -> Self {
        Self::new(MockRemux::Missing)
    }
}

impl MockRemuxer {
    pub fn new(outcome: MockRemux) -> Self {
        Self {
            outcome: Rc::new(RefCell::new(outcome)),
            calls: Rc::default(),
        }
    }

    /// Path the mock writes for `input_path` on success.
    pub fn output_path(input_path: &Path, temp_dir: &Path) -> PathBuf {
        let stem = input_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video".to_string());
        temp_dir.join(format!("{stem}.remuxed.mp4"))
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.borrow().clone()
    }
}

impl Remuxer for MockRemuxer {
    fn remux_faststart(
        &self,
        input_path: &Path,
        temp_dir: Option<&Path>,
    ) -> CoreResult<VideoResource> {
        self.calls.borrow_mut().push(input_path.to_path_buf());
        match &*self.outcome.borrow() {
            MockRemux::Success => {
                let dir = temp_dir.map_or_else(std::env::temp_dir, Path::to_path_buf);
                let output = Self::output_path(input_path, &dir);
                std::fs::write(&output, b"remuxed")?;
                Ok(VideoResource::temporary(TempPath::from_path(output)))
            }
            MockRemux::Missing => Err(CoreError::DependencyNotFound("ffmpeg".to_string())),
            MockRemux::Failed(stderr) => {
                #[cfg(unix)]
                let status = {
                    use std::os::unix::process::ExitStatusExt;
                    std::process::ExitStatus::from_raw(1 << 8)
                };
                #[cfg(not(unix))]
                let status = {
                    use std::os::windows::process::ExitStatusExt;
                    std::process::ExitStatus::from_raw(1)
                };
                Err(command_failed_error("ffmpeg (remux)", status, stderr.clone()))
            }
        }
    }
}
