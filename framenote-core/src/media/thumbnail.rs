//! Thumbnail scaling and frame image output.

use std::path::Path;

use image::RgbImage;
use image::imageops::{self, FilterType};

use crate::error::{CoreResult, export_error};

/// Scales `image` so its longest side is at most `max_side`, keeping the aspect ratio.
///
/// Images already within the cap are returned unchanged; thumbnails never upscale.
#[must_use]
pub fn make_thumbnail(image: &RgbImage, max_side: u32) -> RgbImage {
    let (width, height) = image.dimensions();
    let longest = width.max(height);
    if longest <= max_side || max_side == 0 {
        return image.clone();
    }

    let scaled = |side: u32| {
        let longest = u64::from(longest);
        let rounded = (u64::from(side) * u64::from(max_side) + longest / 2) / longest;
        (rounded as u32).clamp(1, max_side)
    };
    let (new_width, new_height) = (scaled(width), scaled(height));
    imageops::resize(image, new_width, new_height, FilterType::Triangle)
}

/// Writes a frame as an image file; the format follows the extension (PNG or JPEG).
pub fn save_frame_image(image: &RgbImage, path: &Path) -> CoreResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| export_error(path, e))?;
    }
    image.save(path).map_err(|e| export_error(path, e))?;
    log::debug!("Wrote frame image to {}", path.display());
    Ok(())
}
