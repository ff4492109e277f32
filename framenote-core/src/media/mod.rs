// ============================================================================
// framenote-core/src/media/mod.rs
// ============================================================================
//
// MEDIA: Opening Videos and Reading Frames
//
// A VideoHandle is the open video a session owns: the (possibly remuxed)
// resource, its resolved frame count and the stream properties. Opening a
// video runs the frame-count resolver once; navigation never re-resolves.
//
// KEY COMPONENTS:
// - VideoResource: a path plus optional ownership of a temporary file
// - VideoHandle / open_video: the open video and how to get one
// - make_thumbnail / save_frame_image: frame image helpers

mod properties;
mod resource;
mod thumbnail;

use std::path::Path;

use image::RgbImage;

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{FrameDecoder, MediaTools};
use crate::frame::FrameIndex;
use crate::resolver::{FallbackRecord, FrameCountResolver, ResolvedFrameCount, ScanObserver};

pub use properties::VideoProperties;
pub use resource::VideoResource;
pub use thumbnail::{make_thumbnail, save_frame_image};

/// An open video with a trustworthy frame count.
#[derive(Debug)]
pub struct VideoHandle {
    resource: VideoResource,
    frame_count: ResolvedFrameCount,
    properties: Option<VideoProperties>,
    fallbacks: Vec<FallbackRecord>,
}

impl VideoHandle {
    /// Assembles a handle from parts. `open_video` is the usual constructor.
    ///
    /// # Errors
    ///
    /// `CoreError::FrameCountUnresolved` when `frame_count` is zero.
    pub fn new(
        resource: VideoResource,
        frame_count: ResolvedFrameCount,
        properties: Option<VideoProperties>,
        fallbacks: Vec<FallbackRecord>,
    ) -> CoreResult<Self> {
        if frame_count.get() == 0 {
            return Err(CoreError::FrameCountUnresolved {
                path: resource.path().to_path_buf(),
                reasons: vec![format!("{} reported zero frames", frame_count.source())],
            });
        }
        Ok(Self {
            resource,
            frame_count,
            properties,
            fallbacks,
        })
    }

    /// Path of the resource frames are read from.
    pub fn path(&self) -> &Path {
        self.resource.path()
    }

    pub fn resource(&self) -> &VideoResource {
        &self.resource
    }

    /// Total frame count; always positive.
    pub fn frame_count(&self) -> u64 {
        self.frame_count.get()
    }

    pub fn resolved_frame_count(&self) -> ResolvedFrameCount {
        self.frame_count
    }

    pub fn properties(&self) -> Option<&VideoProperties> {
        self.properties.as_ref()
    }

    /// Fallbacks taken while resolving the frame count, in order.
    pub fn fallbacks(&self) -> &[FallbackRecord] {
        &self.fallbacks
    }

    /// Clamps a signed frame request into this video's bounds.
    pub fn clamp(&self, raw: i64) -> FrameIndex {
        FrameIndex::clamped(raw, self.frame_count())
    }

    /// Decodes one frame. The index is clamped first.
    pub fn read_frame(
        &self,
        decoder: &dyn FrameDecoder,
        index: FrameIndex,
    ) -> CoreResult<Option<RgbImage>> {
        let index = index.min(FrameIndex::last(self.frame_count()));
        decoder.decode_frame(self.path(), index)
    }
}

/// Opens `path` and resolves its frame count.
///
/// Properties are gathered on a best-effort basis; a failure there is logged
/// and leaves them unset.
///
/// # Errors
///
/// `CoreError::ResourceUnreadable` when the path is not a readable file or
/// the container is rejected, `CoreError::FrameCountUnresolved` when no
/// strategy produced a positive count.
pub fn open_video(
    path: &Path,
    tools: &MediaTools,
    config: &CoreConfig,
    observer: &dyn ScanObserver,
) -> CoreResult<VideoHandle> {
    if !path.is_file() {
        return Err(CoreError::ResourceUnreadable {
            path: path.to_path_buf(),
            reason: if path.exists() {
                "not a regular file".to_string()
            } else {
                "file does not exist".to_string()
            },
        });
    }

    log::info!("Opening video: {}", path.display());
    let resolution = FrameCountResolver::standard(tools, config, observer)
        .resolve(VideoResource::from_path(path))?;

    let properties = match tools.ffprobe.get_video_properties(resolution.resource.path()) {
        Ok(properties) => Some(properties),
        Err(err) => {
            log::warn!(
                "Could not read video properties of {}: {}",
                resolution.resource.path().display(),
                err
            );
            None
        }
    };

    log::info!(
        "Loaded {} with {}",
        path.display(),
        resolution.frame_count
    );
    VideoHandle::new(
        resolution.resource,
        resolution.frame_count,
        properties,
        resolution.fallbacks,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mocks::{MockFfprobeExecutor, MockFrameDecoder, MockProbe, MockRemuxer};

    fn tools(ffprobe: &MockFfprobeExecutor, decoder: &MockFrameDecoder) -> MediaTools {
        MediaTools::new(
            Box::new(ffprobe.clone()),
            Box::new(decoder.clone()),
            Box::new(MockRemuxer::default()),
        )
    }

    #[test]
    fn missing_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let tools = tools(&MockFfprobeExecutor::new(), &MockFrameDecoder::new());
        let err = open_video(
            &dir.path().join("absent.mp4"),
            &tools,
            &CoreConfig::default(),
            &|_: u64| {},
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CoreError::ResourceUnreadable { ref reason, .. } if reason.contains("does not exist")
        ));
    }

    #[test]
    fn directory_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let tools = tools(&MockFfprobeExecutor::new(), &MockFrameDecoder::new());
        let err =
            open_video(dir.path(), &tools, &CoreConfig::default(), &|_: u64| {}).unwrap_err();
        assert!(matches!(err, CoreError::ResourceUnreadable { .. }));
    }

    #[test]
    fn opens_with_properties_and_clamped_reads() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let ffprobe = MockFfprobeExecutor::new();
        ffprobe.expect_frame_count(file.path(), MockProbe::Count(Some(10)));
        ffprobe.expect_video_properties(
            file.path(),
            VideoProperties {
                width: 32,
                height: 18,
                duration_secs: Some(0.4),
            },
        );
        let decoder = MockFrameDecoder::new();
        decoder.add_video(file.path(), 10, 32, 18);
        let tools = tools(&ffprobe, &decoder);

        let handle = open_video(file.path(), &tools, &CoreConfig::default(), &|_: u64| {}).unwrap();
        assert_eq!(handle.frame_count(), 10);
        assert!(handle.resolved_frame_count().is_trusted());
        assert_eq!(
            handle.properties().map(VideoProperties::resolution),
            Some("32x18".to_string())
        );
        assert_eq!(handle.clamp(99), FrameIndex(9));

        let frame = handle
            .read_frame(tools.decoder.as_ref(), FrameIndex(500))
            .unwrap()
            .unwrap();
        assert_eq!(frame.dimensions(), (32, 18));
        assert_eq!(frame.get_pixel(0, 0).0[0], 9);
    }

    #[test]
    fn missing_properties_do_not_fail_the_load() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let ffprobe = MockFfprobeExecutor::new();
        ffprobe.expect_frame_count(file.path(), MockProbe::Count(Some(4)));
        let tools = tools(&ffprobe, &MockFrameDecoder::new());

        let handle = open_video(file.path(), &tools, &CoreConfig::default(), &|_: u64| {}).unwrap();
        assert!(handle.properties().is_none());
    }

    #[test]
    fn zero_frame_handle_is_rejected() {
        let err = VideoHandle::new(
            VideoResource::from_path("empty.mp4"),
            ResolvedFrameCount::Trusted(0),
            None,
            Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::FrameCountUnresolved { .. }));
    }
}
