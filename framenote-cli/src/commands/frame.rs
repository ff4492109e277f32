// framenote-cli/src/commands/frame.rs
//
// Extracts one frame of a video to an image file.

use std::io::Write;

use framenote_core::media::save_frame_image;
use framenote_core::{CoreConfig, MediaTools, make_thumbnail};

use crate::cli::FrameArgs;
use crate::commands::open_with_spinner;
use crate::error::{CliErrorContext, CliResult};
use crate::terminal::Terminal;

/// Runs `framenote frame`. The requested index is clamped to the video.
pub fn run_frame<W: Write>(
    term: &mut Terminal<W>,
    tools: &MediaTools,
    config: &CoreConfig,
    args: &FrameArgs,
) -> CliResult<()> {
    let handle = open_with_spinner(&args.input, tools, config)?;
    let index = handle.clamp(args.index);
    if index.get() as i64 != args.index {
        log::warn!(
            "Frame {} is out of range; using frame {} of {}",
            args.index,
            index,
            handle.frame_count()
        );
    }

    let image = handle
        .read_frame(tools.decoder.as_ref(), index)?
        .cli_with_context(|| format!("Frame {index} could not be decoded"))?;
    let image = if args.thumbnail {
        make_thumbnail(&image, config.thumbnail_size)
    } else {
        image
    };

    save_frame_image(&image, &args.output)?;
    term.success(&format!(
        "Saved frame {} ({}x{}) to {}",
        index,
        image.width(),
        image.height(),
        args.output.display()
    ))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use framenote_core::external::mocks::{
        MockFfprobeExecutor, MockFrameDecoder, MockProbe, MockRemuxer,
    };

    fn setup(frames: u64) -> (tempfile::TempDir, std::path::PathBuf, MediaTools) {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.mp4");
        std::fs::write(&input, b"video").unwrap();
        let ffprobe = MockFfprobeExecutor::new();
        ffprobe.expect_frame_count(&input, MockProbe::Count(Some(frames as i64)));
        let decoder = MockFrameDecoder::new();
        decoder.add_video(&input, frames, 320, 180);
        let tools = MediaTools::new(
            Box::new(ffprobe),
            Box::new(decoder),
            Box::new(MockRemuxer::default()),
        );
        (dir, input, tools)
    }

    #[test]
    fn clamps_index_and_writes_png() {
        let (dir, input, tools) = setup(10);
        let output = dir.path().join("out/frame.png");
        let args = FrameArgs {
            input,
            index: 500,
            output: output.clone(),
            thumbnail: false,
        };

        let mut term = Terminal::plain(Vec::new());
        run_frame(&mut term, &tools, &CoreConfig::default(), &args).unwrap();

        let saved = image::open(&output).unwrap().to_rgb8();
        assert_eq!(saved.dimensions(), (320, 180));
        // Mock frames are shaded by index; the last frame is 9.
        assert_eq!(saved.get_pixel(0, 0).0, [9, 9, 9]);
        let out = String::from_utf8(term.into_inner()).unwrap();
        assert!(out.contains("Saved frame 9 (320x180)"));
    }

    #[test]
    fn thumbnail_flag_scales_down() {
        let (dir, input, tools) = setup(3);
        let output = dir.path().join("thumb.png");
        let args = FrameArgs {
            input,
            index: 1,
            output: output.clone(),
            thumbnail: true,
        };

        let mut term = Terminal::plain(Vec::new());
        run_frame(&mut term, &tools, &CoreConfig::default(), &args).unwrap();

        let saved = image::open(&output).unwrap();
        assert_eq!((saved.width(), saved.height()), (200, 113));
    }
}
