use std::io::Cursor;

use anyhow::Context;

use crate::assets::SpriteImage;
use crate::foundation::error::{StageError, StageResult};
use crate::scene::sprite::Sprite;

/// Pixels of `sprite` as the user sees them: its matted artwork, mirrored when flipped.
pub fn export_image(sprite: &Sprite) -> StageResult<SpriteImage> {
    let rendered = sprite.rendered().ok_or_else(|| {
        StageError::validation(format!("sprite {} has no finished artwork", sprite.id.0))
    })?;
    let img = &rendered.image;
    if !sprite.flipped {
        return Ok(img.clone());
    }
    let buf = image::RgbaImage::from_raw(img.width, img.height, img.rgba8.to_vec())
        .ok_or_else(|| StageError::validation("image buffer does not match its dimensions"))?;
    let mirrored = image::imageops::flip_horizontal(&buf);
    Ok(SpriteImage::from_rgba8(
        img.width,
        img.height,
        mirrored.into_raw(),
    ))
}

/// Flattened PNG download of a finished sprite. One-way: nothing reads these files back.
pub fn export_png(sprite: &Sprite) -> StageResult<Vec<u8>> {
    let img = export_image(sprite)?;
    let buf = image::RgbaImage::from_raw(img.width, img.height, img.rgba8.to_vec())
        .ok_or_else(|| StageError::validation("image buffer does not match its dimensions"))?;
    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(buf)
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .with_context(|| format!("encode sprite {} as png", sprite.id.0))?;
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/export.rs"]
mod tests;
