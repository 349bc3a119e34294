//! Image loading and PNG/base64 encoding.

use std::io::Cursor;
use std::path::Path;

use base64::Engine;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageFormat, RgbImage};

use crate::types::{WoundError, WoundResult};

/// Load an image from a file path.
pub fn load_image(path: &Path) -> WoundResult<DynamicImage> {
    if !path.exists() {
        return Err(WoundError::InvalidInput(format!(
            "Image not found: {}",
            path.display()
        )));
    }
    Ok(image::open(path)?)
}

/// Encode an RGB image as PNG bytes.
pub fn encode_png(img: &RgbImage) -> WoundResult<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_with_encoder(PngEncoder::new(&mut buf))?;
    Ok(buf)
}

/// Encode an RGB image as a base64 PNG string.
pub fn image_to_base64(img: &RgbImage) -> WoundResult<String> {
    let png = encode_png(img)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(png))
}

/// Re-encode any image as PNG through an in-memory buffer.
pub fn to_png_bytes(img: &DynamicImage) -> WoundResult<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

/// Check if a file path points to a supported image format.
pub fn is_supported_format(path: &str) -> bool {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    matches!(
        ext.as_str(),
        "png" | "jpg" | "jpeg" | "webp" | "gif" | "bmp" | "tiff" | "tif"
    )
}
