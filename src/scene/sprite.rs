use std::time::{Duration, SystemTime};

use crate::assets::SpriteImage;
use crate::foundation::core::{PixelRect, Point, Rect, Size};

/// Session-unique sprite identifier. Never reused, even after a canvas reset.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct SpriteId(pub u64);

/// Identifies one generation job against a sprite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GenerationTicket(pub u64);

/// Allowed display scales.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScaleFactor {
    /// 1.0x
    #[default]
    X1,
    /// 1.2x
    X1_2,
    /// 1.5x
    X1_5,
    /// 2.0x
    X2,
}

impl ScaleFactor {
    /// Every scale, smallest first.
    pub const ALL: [ScaleFactor; 4] = [Self::X1, Self::X1_2, Self::X1_5, Self::X2];

    /// Multiplier applied to base dimensions.
    pub fn value(self) -> f64 {
        match self {
            Self::X1 => 1.0,
            Self::X1_2 => 1.2,
            Self::X1_5 => 1.5,
            Self::X2 => 2.0,
        }
    }

    /// Exact inverse of [`ScaleFactor::value`].
    pub fn from_value(v: f64) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.value() == v)
    }

    /// Next larger scale, wrapping back to 1.0x.
    pub fn next(self) -> Self {
        match self {
            Self::X1 => Self::X1_2,
            Self::X1_2 => Self::X1_5,
            Self::X1_5 => Self::X2,
            Self::X2 => Self::X1,
        }
    }
}

/// Seed used to regenerate a sprite.
#[derive(Clone, Debug, PartialEq)]
pub enum Origin {
    /// Created from a text prompt.
    Text(String),
    /// Created from an uploaded, dropped or pasted image.
    Image(SpriteImage),
}

/// Finished, matted artwork.
#[derive(Clone, Debug, PartialEq)]
pub struct Rendered {
    /// Transparent sprite image.
    pub image: SpriteImage,
    /// Tight bounds of the opaque content, in `image` pixel space.
    pub content_bounds: PixelRect,
}

/// In-flight generation.
#[derive(Clone, Debug, PartialEq)]
pub struct Generation {
    /// Job that owns this state; completions carrying another ticket are ignored.
    pub ticket: GenerationTicket,
    /// Stale artwork shown under the loader while regenerating. `None` means the sprite has
    /// never finished a generation.
    pub previous: Option<Rendered>,
    /// Instruction of an in-flight remix, drawn above the loader.
    pub remix_prompt: Option<String>,
}

/// Lifecycle state.
#[derive(Clone, Debug, PartialEq)]
pub enum SpriteState {
    /// Waiting on the external generator.
    Generating(Generation),
    /// Stable and interactive.
    Ready(Rendered),
}

/// Coarse lifecycle phase, for callers that only need the bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Never generated; nothing to show but the input.
    Pending,
    /// Regenerating over a previous image.
    Generating,
    /// Stable.
    Ready,
}

/// Informational bookkeeping.
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteMetadata {
    /// Prompt the sprite was last generated with.
    pub prompt: String,
    /// Prompt as rewritten by the provider, when it reports one.
    pub revised_prompt: Option<String>,
    /// When the sprite entered the registry.
    pub created_at: SystemTime,
    /// When the last generation finished.
    pub completed_at: Option<SystemTime>,
    /// Wall time of the last generation.
    pub duration: Option<Duration>,
}

impl SpriteMetadata {
    pub(crate) fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            revised_prompt: None,
            created_at: SystemTime::now(),
            completed_at: None,
            duration: None,
        }
    }
}

/// A placed asset on the stage.
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    /// Identity.
    pub id: SpriteId,
    /// Regeneration seed.
    pub origin: Origin,
    /// Top-left corner in scene coordinates.
    pub position: Point,
    /// Unscaled footprint. Set from the finished image; the placeholder footprint before that.
    pub base_size: Size,
    /// Display scale.
    pub scale: ScaleFactor,
    /// Horizontal mirror.
    pub flipped: bool,
    /// Lifecycle.
    pub state: SpriteState,
    /// Latest generation job.
    pub ticket: GenerationTicket,
    /// Alternate prompts offered for remixing.
    pub remix_suggestions: Vec<String>,
    /// Bookkeeping.
    pub metadata: SpriteMetadata,
}

impl Sprite {
    /// New sprite waiting on its first generation job.
    pub fn pending(
        id: SpriteId,
        origin: Origin,
        prompt: impl Into<String>,
        position: Point,
        base_size: Size,
        ticket: GenerationTicket,
    ) -> Self {
        Self {
            id,
            origin,
            position,
            base_size,
            scale: ScaleFactor::X1,
            flipped: false,
            state: SpriteState::Generating(Generation {
                ticket,
                previous: None,
                remix_prompt: None,
            }),
            ticket,
            remix_suggestions: Vec::new(),
            metadata: SpriteMetadata::new(prompt),
        }
    }

    /// On-screen size: base size times scale.
    pub fn display_size(&self) -> Size {
        self.base_size * self.scale.value()
    }

    /// On-screen rectangle.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.display_size())
    }

    /// Centre of the on-screen rectangle.
    pub fn center(&self) -> Point {
        self.rect().center()
    }

    /// Coarse lifecycle phase.
    pub fn phase(&self) -> Phase {
        match &self.state {
            SpriteState::Ready(_) => Phase::Ready,
            SpriteState::Generating(g) if g.previous.is_some() => Phase::Generating,
            SpriteState::Generating(_) => Phase::Pending,
        }
    }

    /// `true` while a generation job is outstanding.
    pub fn is_generating(&self) -> bool {
        matches!(self.state, SpriteState::Generating(_))
    }

    /// Finished artwork, if stable.
    pub fn rendered(&self) -> Option<&Rendered> {
        match &self.state {
            SpriteState::Ready(r) => Some(r),
            SpriteState::Generating(_) => None,
        }
    }

    /// Latest artwork: the stable one, or the stale one under a regeneration.
    pub fn latest_rendered(&self) -> Option<&Rendered> {
        match &self.state {
            SpriteState::Ready(r) => Some(r),
            SpriteState::Generating(g) => g.previous.as_ref(),
        }
    }

    /// On-screen rectangle of the opaque content, mirrored with the sprite when flipped.
    ///
    /// Falls back to the full rectangle while no artwork exists.
    pub fn content_rect(&self) -> Rect {
        let rect = self.rect();
        let Some(r) = self.latest_rendered() else {
            return rect;
        };
        if r.image.width == 0 || r.image.height == 0 {
            return rect;
        }
        let sx = rect.width() / f64::from(r.image.width);
        let sy = rect.height() / f64::from(r.image.height);
        let b = r.content_bounds.to_rect();
        let (x0, x1) = if self.flipped {
            (rect.x1 - b.x1 * sx, rect.x1 - b.x0 * sx)
        } else {
            (rect.x0 + b.x0 * sx, rect.x0 + b.x1 * sx)
        };
        Rect::new(x0, rect.y0 + b.y0 * sy, x1, rect.y0 + b.y1 * sy)
    }
}

/// Fit `image_w x image_h` to `target_width`, preserving aspect ratio.
pub fn fit_to_width(image_w: u32, image_h: u32, target_width: f64) -> Size {
    if image_w == 0 {
        return Size::new(target_width, target_width);
    }
    Size::new(
        target_width,
        target_width * f64::from(image_h) / f64::from(image_w),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/scene/sprite.rs"]
mod tests;
