//! Cover thumbnails

use std::io::Cursor;

use image::ImageFormat;
use image::imageops::FilterType;

pub const THUMBNAIL_WIDTH: u32 = 180;
pub const THUMBNAIL_HEIGHT: u32 = 292;

/// Resize an encoded image to fit the thumbnail box and re-encode as WEBP.
///
/// Aspect ratio is preserved and images that already fit are never scaled up.
pub fn render_thumbnail(source: &[u8]) -> Result<Vec<u8>, image::ImageError> {
    let img = image::load_from_memory(source)?;

    let img = if img.width() > THUMBNAIL_WIDTH || img.height() > THUMBNAIL_HEIGHT {
        img.resize(THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT, FilterType::Lanczos3)
    } else {
        img
    };

    // The WEBP encoder only takes 8-bit RGB(A)
    let rgba = image::DynamicImage::ImageRgba8(img.to_rgba8());
    let mut out = Cursor::new(Vec::new());
    rgba.write_to(&mut out, ImageFormat::WebP)?;
    Ok(out.into_inner())
}
