// framenote-core/tests/common/mod.rs
//
// Local fakes of the public tool traits, shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use framenote_core::external::{FfprobeExecutor, FrameDecoder, Remuxer};
use framenote_core::{CoreError, CoreResult, FrameIndex, MediaTools, VideoProperties, VideoResource};
use image::{Rgb, RgbImage};

/// ffprobe fake: fixed reported counts per path, dimensions for any path.
#[derive(Clone, Default)]
pub struct FakeProbe {
    pub counts: Rc<RefCell<HashMap<PathBuf, Option<i64>>>>,
}

impl FakeProbe {
    pub fn report(&self, path: &Path, count: Option<i64>) {
        self.counts.borrow_mut().insert(path.to_path_buf(), count);
    }
}

impl FfprobeExecutor for FakeProbe {
    fn get_reported_frame_count(&self, input_path: &Path) -> CoreResult<Option<i64>> {
        self.counts
            .borrow()
            .get(input_path)
            .copied()
            .ok_or_else(|| CoreError::ResourceUnreadable {
                path: input_path.to_path_buf(),
                reason: "not a video".to_string(),
            })
    }

    fn get_video_properties(&self, _input_path: &Path) -> CoreResult<VideoProperties> {
        Ok(VideoProperties {
            width: 64,
            height: 36,
            duration_secs: Some(2.0),
        })
    }
}

/// Decoder fake: every path has `frames` decodable frames.
#[derive(Clone)]
pub struct FakeDecoder {
    pub frames: u64,
    pub scans: Rc<RefCell<u32>>,
}

impl FakeDecoder {
    pub fn with_frames(frames: u64) -> Self {
        Self {
            frames,
            scans: Rc::default(),
        }
    }
}

impl FrameDecoder for FakeDecoder {
    fn decode_frame(&self, _input_path: &Path, index: FrameIndex) -> CoreResult<Option<RgbImage>> {
        if index.get() >= self.frames {
            return Ok(None);
        }
        Ok(Some(RgbImage::from_pixel(64, 36, Rgb([200, 100, 50]))))
    }

    fn count_frames(&self, _input_path: &Path, progress: &mut dyn FnMut(u64)) -> CoreResult<u64> {
        *self.scans.borrow_mut() += 1;
        for n in 1..=self.frames {
            progress(n);
        }
        Ok(self.frames)
    }
}

/// Remuxer fake for a system without ffmpeg.
#[derive(Clone, Default)]
pub struct NoFfmpeg {
    pub calls: Rc<RefCell<u32>>,
}

impl Remuxer for NoFfmpeg {
    fn remux_faststart(
        &self,
        _input_path: &Path,
        _temp_dir: Option<&Path>,
    ) -> CoreResult<VideoResource> {
        *self.calls.borrow_mut() += 1;
        Err(CoreError::DependencyNotFound("ffmpeg".to_string()))
    }
}

pub fn tools(probe: &FakeProbe, decoder: &FakeDecoder, remuxer: &NoFfmpeg) -> MediaTools {
    MediaTools::new(
        Box::new(probe.clone()),
        Box::new(decoder.clone()),
        Box::new(remuxer.clone()),
    )
}

pub fn create_dummy_file(dir: &Path, filename: &str) -> PathBuf {
    let path = dir.join(filename);
    std::fs::write(&path, b"dummy content").expect("Failed to write dummy file");
    path
}
