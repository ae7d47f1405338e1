use crate::foundation::core::Point;

/// Keys the stage reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    /// Nudge up.
    ArrowUp,
    /// Nudge down.
    ArrowDown,
    /// Nudge left.
    ArrowLeft,
    /// Nudge right.
    ArrowRight,
    /// Delete the selection.
    Delete,
    /// Delete the selection.
    Backspace,
    /// Clear the selection.
    Escape,
    /// Printable character (shortcuts are matched case-insensitively).
    Char(char),
}

/// Host input, already mapped into scene coordinates.
///
/// Mouse and touch both arrive as pointer events.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// Mouse-down / touch-start.
    PointerDown {
        /// Scene x.
        x: f64,
        /// Scene y.
        y: f64,
    },
    /// Pointer moved.
    PointerMove {
        /// Scene x.
        x: f64,
        /// Scene y.
        y: f64,
    },
    /// Mouse-up / touch-end.
    PointerUp {
        /// Scene x.
        x: f64,
        /// Scene y.
        y: f64,
    },
    /// Key press.
    Key {
        /// Pressed key.
        key: Key,
        /// A text field owns keyboard focus; shortcuts must not fire.
        text_input_focused: bool,
    },
}

impl InputEvent {
    /// Pointer location, for pointer events.
    pub fn point(&self) -> Option<Point> {
        match *self {
            Self::PointerDown { x, y } | Self::PointerMove { x, y } | Self::PointerUp { x, y } => {
                Some(Point::new(x, y))
            }
            Self::Key { .. } => None,
        }
    }
}

/// Pointer affordance the host should display.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cursor {
    /// Nothing under the pointer.
    #[default]
    Default,
    /// A sprite is under the pointer.
    Pointer,
    /// A sprite is being dragged.
    Grabbing,
}
