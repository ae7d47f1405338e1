use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::foundation::core::PixelRect;

pub(crate) mod decode;
pub(crate) mod export;
pub(crate) mod matte;

static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a decoded raster, used as a backend cache key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub u64);

/// Decoded raster with straight-alpha RGBA8 pixels.
///
/// Clones share the pixel buffer and keep the same [`ImageId`].
#[derive(Clone, Debug)]
pub struct SpriteImage {
    id: ImageId,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Straight RGBA8, row-major, tightly packed.
    pub rgba8: Arc<Vec<u8>>,
}

impl SpriteImage {
    /// Wrap raw straight-alpha RGBA8 bytes. The buffer is not checked against the dimensions;
    /// the matting engine and the backends do that where it matters.
    pub fn from_rgba8(width: u32, height: u32, rgba8: Vec<u8>) -> Self {
        Self {
            id: ImageId(NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed)),
            width,
            height,
            rgba8: Arc::new(rgba8),
        }
    }

    /// Solid-colour image, handy for placeholders and tests.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let n = (width as usize).saturating_mul(height as usize);
        let mut bytes = Vec::with_capacity(n.saturating_mul(4));
        for _ in 0..n {
            bytes.extend_from_slice(&rgba);
        }
        Self::from_rgba8(width, height, bytes)
    }

    /// Cache identity.
    pub fn id(&self) -> ImageId {
        self.id
    }

    /// Full pixel rectangle.
    pub fn full_rect(&self) -> PixelRect {
        PixelRect::full(self.width, self.height)
    }

    /// Straight RGBA of pixel `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.rgba8.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

impl PartialEq for SpriteImage {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height && self.rgba8 == other.rgba8
    }
}
