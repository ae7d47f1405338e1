use crate::foundation::config::StageConfig;
use crate::foundation::core::{Point, Vec2};
use crate::interact::events::{Cursor, InputEvent, Key};
use crate::scene::hit::hit_test;
use crate::scene::registry::{SpritePatch, SpriteRegistry};
use crate::scene::sprite::{ScaleFactor, Sprite, SpriteId, SpriteState};

/// Asynchronous work requested by an input; the host hands it to the generation orchestrator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    /// Regenerate the sprite from its origin.
    Regenerate(SpriteId),
    /// Regenerate from the sprite's current artwork plus an instruction.
    Remix {
        /// Target sprite.
        id: SpriteId,
        /// What to change.
        instruction: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct DragSession {
    id: SpriteId,
    grab_offset: Vec2,
}

/// Turns pointer and keyboard input into registry mutations.
///
/// At most one drag session is active. Every mutating action except moving is refused while
/// nothing is selected or the selection is still generating.
#[derive(Debug)]
pub struct InteractionController {
    drag: Option<DragSession>,
    cursor: Cursor,
    nudge_step: f64,
    duplicate_offset: Vec2,
}

impl InteractionController {
    /// Controller using the nudge step and duplicate offset from `config`.
    pub fn new(config: &StageConfig) -> Self {
        Self {
            drag: None,
            cursor: Cursor::Default,
            nudge_step: config.nudge_step,
            duplicate_offset: config.duplicate_offset,
        }
    }

    /// Current pointer affordance.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Sprite being dragged, if any.
    pub fn dragging(&self) -> Option<SpriteId> {
        self.drag.map(|d| d.id)
    }

    /// Dispatch one input event.
    pub fn handle(&mut self, reg: &mut SpriteRegistry, event: InputEvent) -> Option<Intent> {
        match event {
            InputEvent::PointerDown { x, y } => {
                self.press(reg, Point::new(x, y));
                None
            }
            InputEvent::PointerMove { x, y } => {
                self.pointer_move(reg, Point::new(x, y));
                None
            }
            InputEvent::PointerUp { x, y } => {
                self.release(reg, Point::new(x, y));
                None
            }
            InputEvent::Key {
                key,
                text_input_focused,
            } => {
                if text_input_focused {
                    return None;
                }
                self.key(reg, key)
            }
        }
    }

    /// Select the sprite under `p` and start dragging it, or clear the selection.
    pub fn press(&mut self, reg: &mut SpriteRegistry, p: Point) {
        let hit = hit_test(reg, p).map(|s| (s.id, s.position));
        match hit {
            Some((id, position)) => {
                reg.select(Some(id));
                reg.bring_to_top(id);
                self.drag = Some(DragSession {
                    id,
                    grab_offset: p - position,
                });
                self.cursor = Cursor::Grabbing;
            }
            None => {
                reg.select(None);
                self.drag = None;
                self.cursor = Cursor::Default;
            }
        }
    }

    /// Drag the active sprite, or update hover feedback.
    pub fn pointer_move(&mut self, reg: &mut SpriteRegistry, p: Point) {
        if let Some(drag) = self.drag {
            let moved = reg.patch(
                drag.id,
                SpritePatch {
                    position: Some(p - drag.grab_offset),
                    ..SpritePatch::default()
                },
            );
            if moved {
                return;
            }
            tracing::debug!(id = drag.id.0, "dragged sprite vanished, ending drag");
            self.drag = None;
        }
        let hovered = hit_test(reg, p).map(|s| s.id);
        reg.set_hovered(hovered);
        self.cursor = if hovered.is_some() {
            Cursor::Pointer
        } else {
            Cursor::Default
        };
    }

    /// End the drag session; the sprite stays selected.
    pub fn release(&mut self, reg: &mut SpriteRegistry, p: Point) {
        self.drag = None;
        self.cursor = if hit_test(reg, p).is_some() {
            Cursor::Pointer
        } else {
            Cursor::Default
        };
    }

    /// Keyboard shortcuts. Callers must filter out keys typed into text fields.
    pub fn key(&mut self, reg: &mut SpriteRegistry, key: Key) -> Option<Intent> {
        let step = self.nudge_step;
        let handled = match key {
            Key::ArrowUp => self.nudge(reg, Vec2::new(0.0, -step)),
            Key::ArrowDown => self.nudge(reg, Vec2::new(0.0, step)),
            Key::ArrowLeft => self.nudge(reg, Vec2::new(-step, 0.0)),
            Key::ArrowRight => self.nudge(reg, Vec2::new(step, 0.0)),
            Key::Delete | Key::Backspace => self.delete(reg).is_some(),
            Key::Escape => {
                reg.select(None);
                true
            }
            Key::Char(c) => match c.to_ascii_lowercase() {
                'r' => return self.regenerate(reg),
                'f' => self.flip(reg),
                'd' => self.duplicate(reg).is_some(),
                'o' => self.toggle_original(reg).is_some(),
                c @ '1'..='4' => self.set_scale(reg, ScaleFactor::ALL[(c as u8 - b'1') as usize]),
                _ => false,
            },
        };
        if !handled {
            tracing::trace!(?key, "key had no effect");
        }
        None
    }

    /// Move the selection by `delta`.
    pub fn nudge(&mut self, reg: &mut SpriteRegistry, delta: Vec2) -> bool {
        let Some(sprite) = reg.selected() else {
            return false;
        };
        let (id, position) = (sprite.id, sprite.position);
        reg.patch(
            id,
            SpritePatch {
                position: Some(position + delta),
                ..SpritePatch::default()
            },
        )
    }

    /// Mirror the selection horizontally.
    pub fn flip(&mut self, reg: &mut SpriteRegistry) -> bool {
        let Some(sprite) = actionable(reg) else {
            return false;
        };
        let (id, flipped) = (sprite.id, sprite.flipped);
        reg.patch(
            id,
            SpritePatch {
                flipped: Some(!flipped),
                ..SpritePatch::default()
            },
        )
    }

    /// Change the selection's display scale.
    pub fn set_scale(&mut self, reg: &mut SpriteRegistry, scale: ScaleFactor) -> bool {
        let Some(id) = actionable(reg).map(|s| s.id) else {
            return false;
        };
        reg.patch(
            id,
            SpritePatch {
                scale: Some(scale),
                ..SpritePatch::default()
            },
        )
    }

    /// Copy the selection into a new ready sprite, offset by the duplicate delta. The copy
    /// becomes the selection.
    pub fn duplicate(&mut self, reg: &mut SpriteRegistry) -> Option<SpriteId> {
        let source = actionable(reg)?.clone();
        let rendered = source.rendered()?.clone();
        let id = reg.allocate_id();
        let ticket = reg.allocate_ticket();
        let mut copy = Sprite {
            id,
            position: source.position + self.duplicate_offset,
            state: SpriteState::Ready(rendered),
            ticket,
            ..source.clone()
        };
        copy.metadata.created_at = std::time::SystemTime::now();
        reg.insert(copy);
        if let Some(original) = reg.original(source.id).cloned() {
            reg.set_original(id, original);
        }
        if let Some(preview) = reg.preview(source.id).cloned() {
            reg.set_preview(id, preview);
        }
        reg.select(Some(id));
        Some(id)
    }

    /// Remove the selection.
    pub fn delete(&mut self, reg: &mut SpriteRegistry) -> Option<SpriteId> {
        let id = actionable(reg)?.id;
        reg.remove(id)?;
        if self.dragging() == Some(id) {
            self.drag = None;
            self.cursor = Cursor::Default;
        }
        Some(id)
    }

    /// Toggle display of the selection's un-matted original.
    pub fn toggle_original(&mut self, reg: &mut SpriteRegistry) -> Option<bool> {
        let id = actionable(reg)?.id;
        reg.toggle_original_view(id)
    }

    /// Request regeneration of the selection.
    pub fn regenerate(&mut self, reg: &SpriteRegistry) -> Option<Intent> {
        actionable(reg).map(|s| Intent::Regenerate(s.id))
    }

    /// Request a remix of the selection.
    pub fn remix(&mut self, reg: &SpriteRegistry, instruction: &str) -> Option<Intent> {
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return None;
        }
        actionable(reg).map(|s| Intent::Remix {
            id: s.id,
            instruction: instruction.to_string(),
        })
    }

    /// Full-canvas reset.
    pub fn reset(&mut self, reg: &mut SpriteRegistry) {
        reg.clear();
        self.drag = None;
        self.cursor = Cursor::Default;
    }
}

/// Selected sprite if mutating actions may target it.
fn actionable(reg: &SpriteRegistry) -> Option<&Sprite> {
    let sprite = reg.selected()?;
    if sprite.is_generating() {
        tracing::debug!(id = sprite.id.0, "action refused: sprite is generating");
        return None;
    }
    Some(sprite)
}

#[cfg(test)]
#[path = "../../tests/unit/interact/controller.rs"]
mod tests;
