use crate::foundation::core::Point;
use crate::scene::registry::SpriteRegistry;
use crate::scene::sprite::{Sprite, SpriteState};

/// Topmost sprite under `p`, if any.
///
/// Generating sprites are hit anywhere inside their rectangle. Ready sprites only count when
/// `p` lands on their opaque-content bounds, so transparent margins click through to whatever
/// lies below.
#[tracing::instrument(level = "trace", skip(registry))]
pub fn hit_test(registry: &SpriteRegistry, p: Point) -> Option<&Sprite> {
    registry.iter_top_down().find(|s| sprite_hit(s, p))
}

/// Shape-aware hit check for a single sprite.
pub fn sprite_hit(sprite: &Sprite, p: Point) -> bool {
    let rect = sprite.rect();
    if !rect.contains(p) {
        return false;
    }
    match &sprite.state {
        SpriteState::Generating(_) => true,
        // Mirrored for flipped sprites.
        SpriteState::Ready(_) => sprite.content_rect().contains(p),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/hit.rs"]
mod tests;
