use std::io::Cursor;

use anyhow::Context;
use base64::Engine;

use crate::{
    StageResult,
    assets::SpriteImage,
    foundation::error::{GenerationError, StageError},
};

/// Decode encoded image bytes (PNG, JPEG, ...) into a straight-alpha [`SpriteImage`].
pub fn decode_image(bytes: &[u8]) -> StageResult<SpriteImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(SpriteImage::from_rgba8(width, height, rgba.into_raw()))
}

/// Encode a sprite image as PNG bytes.
pub fn encode_png(img: &SpriteImage) -> StageResult<Vec<u8>> {
    let buf = image::RgbaImage::from_raw(img.width, img.height, img.rgba8.as_ref().clone())
        .ok_or_else(|| StageError::validation("image buffer does not match its dimensions"))?;
    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(buf)
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(out)
}

/// Downscale `img` so its longer edge is at most `max_edge`, preserving aspect ratio.
///
/// Images already small enough are returned as-is (sharing pixels).
pub fn thumbnail(img: &SpriteImage, max_edge: u32) -> StageResult<SpriteImage> {
    let max_edge = max_edge.max(1);
    if img.width <= max_edge && img.height <= max_edge {
        return Ok(img.clone());
    }
    let buf = image::RgbaImage::from_raw(img.width, img.height, img.rgba8.as_ref().clone())
        .ok_or_else(|| StageError::validation("image buffer does not match its dimensions"))?;
    let scale = f64::from(max_edge) / f64::from(img.width.max(img.height));
    let w = ((f64::from(img.width) * scale).round() as u32).max(1);
    let h = ((f64::from(img.height) * scale).round() as u32).max(1);
    let small = image::imageops::thumbnail(&buf, w, h);
    Ok(SpriteImage::from_rgba8(w, h, small.into_raw()))
}

/// Decode the payload of a `data:<mime>;base64,<payload>` URL.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, GenerationError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| GenerationError::DataUrl("missing 'data:' scheme".to_string()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| GenerationError::DataUrl("missing ',' separator".to_string()))?;
    if !meta.ends_with(";base64") {
        return Err(GenerationError::DataUrl(
            "only base64 payloads are supported".to_string(),
        ));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| GenerationError::DataUrl(e.to_string()))
}

/// Encode PNG bytes as a `data:image/png;base64,` URL.
pub fn png_data_url(png: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    )
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

/// Convert premultiplied RGBA8 back to straight alpha in place.
pub fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        let un = |c: u8| -> u8 { ((c as u16 * 255 + a / 2) / a).min(255) as u8 };
        px[0] = un(px[0]);
        px[1] = un(px[1]);
        px[2] = un(px[2]);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
