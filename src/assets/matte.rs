//! Background matting: turns a generated raster with a roughly uniform backdrop into a
//! transparent sprite plus the tight bounds of what is left.

use crate::assets::SpriteImage;
use crate::foundation::core::PixelRect;
use crate::foundation::error::MattingFailure;

/// Result of a matting pass.
#[derive(Clone, Debug)]
pub struct Matte {
    /// Transparent sprite, same pixel dimensions as the input.
    pub image: SpriteImage,
    /// Tight rectangle around pixels with alpha > 0, in the image's own pixel space.
    pub content_bounds: PixelRect,
    /// `false` when pixel access failed and `image` is the untouched input.
    pub matted: bool,
}

/// Squared-distance threshold against a background colour sampled from the top-left pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatteParams {
    threshold_sq: u32,
}

impl MatteParams {
    /// Pixels whose RGB distance to the background is strictly below `threshold` become
    /// transparent.
    pub fn new(threshold: f64) -> Self {
        let t = if threshold.is_finite() {
            threshold.max(0.0)
        } else {
            0.0
        };
        // Max RGB distance squared is 3 * 255^2, so anything above saturates harmlessly.
        let threshold_sq = (t * t).ceil().min(f64::from(u32::MAX)) as u32;
        Self { threshold_sq }
    }

    /// Precomputed squared threshold.
    pub fn threshold_sq(self) -> u32 {
        self.threshold_sq
    }
}

/// Matte `src`, falling back to the untouched image with full-rectangle bounds when its pixel
/// buffer cannot be read. Never fails.
#[tracing::instrument(skip(src), fields(width = src.width, height = src.height))]
pub fn matte(src: &SpriteImage, params: MatteParams) -> Matte {
    match try_matte_rgba8(src.width, src.height, &src.rgba8, params) {
        Ok((rgba8, content_bounds)) => Matte {
            image: SpriteImage::from_rgba8(src.width, src.height, rgba8),
            content_bounds,
            matted: true,
        },
        Err(err) => {
            tracing::warn!(%err, "matting unavailable, keeping opaque image");
            Matte {
                image: src.clone(),
                content_bounds: src.full_rect(),
                matted: false,
            }
        }
    }
}

/// Single synchronous sweep over a straight RGBA8 buffer.
///
/// Returns the matted copy and its content bounds. When nothing survives, the bounds fall back
/// to the full image rectangle.
pub fn try_matte_rgba8(
    width: u32,
    height: u32,
    rgba8: &[u8],
    params: MatteParams,
) -> Result<(Vec<u8>, PixelRect), MattingFailure> {
    if width == 0 || height == 0 {
        return Err(MattingFailure::Empty { width, height });
    }
    let expected = (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(4);
    if rgba8.len() != expected {
        return Err(MattingFailure::BufferSize {
            expected,
            actual: rgba8.len(),
        });
    }

    let mut out = rgba8.to_vec();
    let bg = [i32::from(out[0]), i32::from(out[1]), i32::from(out[2])];
    let t2 = params.threshold_sq;

    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut any = false;

    for (i, px) in out.chunks_exact_mut(4).enumerate() {
        let dr = i32::from(px[0]) - bg[0];
        let dg = i32::from(px[1]) - bg[1];
        let db = i32::from(px[2]) - bg[2];
        let d2 = (dr * dr + dg * dg + db * db) as u32;
        if d2 < t2 {
            px[3] = 0;
            continue;
        }
        if px[3] == 0 {
            continue;
        }
        let x = (i % width as usize) as u32;
        let y = (i / width as usize) as u32;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
        any = true;
    }

    let bounds = if any {
        PixelRect::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
    } else {
        PixelRect::full(width, height)
    };
    Ok((out, bounds))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/matte.rs"]
mod tests;
