use std::collections::{HashMap, HashSet};

use crate::assets::SpriteImage;
use crate::foundation::core::Point;
use crate::scene::sprite::{GenerationTicket, ScaleFactor, Sprite, SpriteId};

/// Geometry patch applied by [`SpriteRegistry::patch`]. `None` fields are left alone.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpritePatch {
    /// New top-left corner.
    pub position: Option<Point>,
    /// New display scale.
    pub scale: Option<ScaleFactor>,
    /// New mirror flag.
    pub flipped: Option<bool>,
}

/// Ordered scene graph: last sprite paints on top and is hit-tested first.
///
/// Owns every sprite plus the id-keyed side-maps (un-matted originals, input thumbnails and the
/// per-sprite "show original" toggle). Side-map entries only exist for live sprites and are
/// dropped together with their sprite.
#[derive(Debug, Default)]
pub struct SpriteRegistry {
    sprites: Vec<Sprite>,
    next_id: u64,
    next_ticket: u64,
    selected: Option<SpriteId>,
    hovered: Option<SpriteId>,
    originals: HashMap<SpriteId, SpriteImage>,
    previews: HashMap<SpriteId, SpriteImage>,
    original_view: HashSet<SpriteId>,
    revision: u64,
}

impl SpriteRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a fresh id. Ids are never handed out twice.
    pub fn allocate_id(&mut self) -> SpriteId {
        self.next_id += 1;
        SpriteId(self.next_id)
    }

    /// Reserve a fresh generation ticket.
    pub fn allocate_ticket(&mut self) -> GenerationTicket {
        self.next_ticket += 1;
        GenerationTicket(self.next_ticket)
    }

    /// Append `sprite` on top. Returns `false` (and drops it) if its id is already present.
    pub fn insert(&mut self, sprite: Sprite) -> bool {
        if self.contains(sprite.id) {
            tracing::debug!(id = sprite.id.0, "insert rejected: duplicate id");
            return false;
        }
        // Keep the allocator ahead of ids minted elsewhere.
        self.next_id = self.next_id.max(sprite.id.0);
        self.sprites.push(sprite);
        self.touch();
        true
    }

    /// Remove a sprite and every side-map entry keyed by it.
    pub fn remove(&mut self, id: SpriteId) -> Option<Sprite> {
        let idx = self.index_of(id)?;
        let sprite = self.sprites.remove(idx);
        self.originals.remove(&id);
        self.previews.remove(&id);
        self.original_view.remove(&id);
        if self.selected == Some(id) {
            self.selected = None;
        }
        if self.hovered == Some(id) {
            self.hovered = None;
        }
        self.touch();
        Some(sprite)
    }

    /// Drop every sprite and side-map entry. Id allocation continues where it was.
    pub fn clear(&mut self) {
        self.sprites.clear();
        self.originals.clear();
        self.previews.clear();
        self.original_view.clear();
        self.selected = None;
        self.hovered = None;
        self.touch();
    }

    /// Mutate one sprite in place. Returns `false` for unknown ids.
    pub fn update(&mut self, id: SpriteId, f: impl FnOnce(&mut Sprite)) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        f(&mut self.sprites[idx]);
        self.touch();
        true
    }

    /// Apply a geometry patch. Returns `false` for unknown ids.
    pub fn patch(&mut self, id: SpriteId, patch: SpritePatch) -> bool {
        self.update(id, |s| {
            if let Some(p) = patch.position {
                s.position = p;
            }
            if let Some(scale) = patch.scale {
                s.scale = scale;
            }
            if let Some(flipped) = patch.flipped {
                s.flipped = flipped;
            }
        })
    }

    /// Move a sprite to the top of paint order. Already-topmost sprites are left alone.
    pub fn bring_to_top(&mut self, id: SpriteId) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        if idx + 1 != self.sprites.len() {
            let s = self.sprites.remove(idx);
            self.sprites.push(s);
            self.touch();
        }
        true
    }

    /// Sprite by id.
    pub fn get(&self, id: SpriteId) -> Option<&Sprite> {
        self.sprites.iter().find(|s| s.id == id)
    }

    /// `true` if `id` is live.
    pub fn contains(&self, id: SpriteId) -> bool {
        self.index_of(id).is_some()
    }

    /// Sprites in paint order (bottom first).
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Sprite> {
        self.sprites.iter()
    }

    /// Sprites in hit-test order (top first).
    pub fn iter_top_down(&self) -> impl Iterator<Item = &Sprite> {
        self.sprites.iter().rev()
    }

    /// Ids in paint order.
    pub fn ids(&self) -> Vec<SpriteId> {
        self.sprites.iter().map(|s| s.id).collect()
    }

    /// Number of sprites.
    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Currently selected sprite.
    pub fn selected(&self) -> Option<&Sprite> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Selected id.
    pub fn selected_id(&self) -> Option<SpriteId> {
        self.selected
    }

    /// Select a sprite (or nothing). Unknown ids clear the selection.
    pub fn select(&mut self, id: Option<SpriteId>) {
        let id = id.filter(|id| self.contains(*id));
        if self.selected != id {
            self.selected = id;
            self.touch();
        }
    }

    /// Hover-highlighted id.
    pub fn hovered_id(&self) -> Option<SpriteId> {
        self.hovered
    }

    /// Set the hover highlight. Unknown ids clear it.
    pub fn set_hovered(&mut self, id: Option<SpriteId>) {
        let id = id.filter(|id| self.contains(*id));
        if self.hovered != id {
            self.hovered = id;
            self.touch();
        }
    }

    /// Record the un-matted original for a live sprite.
    pub fn set_original(&mut self, id: SpriteId, image: SpriteImage) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.originals.insert(id, image);
        self.touch();
        true
    }

    /// Un-matted original for `id`.
    pub fn original(&self, id: SpriteId) -> Option<&SpriteImage> {
        self.originals.get(&id)
    }

    /// Record the input thumbnail for a live sprite.
    pub fn set_preview(&mut self, id: SpriteId, image: SpriteImage) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.previews.insert(id, image);
        self.touch();
        true
    }

    /// Input thumbnail for `id`.
    pub fn preview(&self, id: SpriteId) -> Option<&SpriteImage> {
        self.previews.get(&id)
    }

    /// Flip the "show original" toggle. Returns the new value, or `None` when the sprite is
    /// unknown or has no original.
    pub fn toggle_original_view(&mut self, id: SpriteId) -> Option<bool> {
        if !self.originals.contains_key(&id) {
            return None;
        }
        let on = if self.original_view.remove(&id) {
            false
        } else {
            self.original_view.insert(id);
            true
        };
        self.touch();
        Some(on)
    }

    /// Whether `id` currently displays its un-matted original.
    pub fn shows_original(&self, id: SpriteId) -> bool {
        self.original_view.contains(&id) && self.originals.contains_key(&id)
    }

    /// Mutation counter; bumps on every change that can affect a frame.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of entries across all side-maps (for leak checks).
    pub fn side_map_len(&self) -> usize {
        self.originals.len() + self.previews.len() + self.original_view.len()
    }

    fn index_of(&self, id: SpriteId) -> Option<usize> {
        self.sprites.iter().position(|s| s.id == id)
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/registry.rs"]
mod tests;
