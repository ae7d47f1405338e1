use kurbo::Shape;

use crate::assets::SpriteImage;
use crate::compile::grid::isometric_grid;
use crate::foundation::config::StageConfig;
use crate::foundation::core::{BezPath, Canvas, Point, Rect, Rgba8, Size, Vec2};
use crate::scene::registry::SpriteRegistry;
use crate::scene::sprite::{Sprite, SpriteState};

const STALE_OPACITY: f32 = 0.45;
const SELECTED_RING_ALPHA: f32 = 0.85;
const HOVERED_RING_ALPHA: f32 = 0.35;
const RING_WIDTH: f64 = 2.0;
const DASH_COUNT: usize = 24;
const DASH_SEGMENTS: usize = 4;
const PROMPT_TEXT_PX: f32 = 14.0;
const LOADER_TEXT_PX: f32 = 22.0;
const CAPTION_TEXT_PX: f32 = 13.0;
const MAX_PROMPT_LINES: usize = 4;
const GLYPH_WIDTH_RATIO: f64 = 0.55;
const PREVIEW_PADDING: f64 = 8.0;

const INK: Rgba8 = Rgba8::from_array([40, 36, 30, 255]);
const MUTED_INK: Rgba8 = Rgba8::from_array([40, 36, 30, 160]);
const WHITE: Rgba8 = Rgba8::from_array([255, 255, 255, 255]);
const BORDER: Rgba8 = Rgba8::from_array([40, 36, 30, 90]);
const RING: Rgba8 = Rgba8::from_array([38, 110, 235, 255]);

/// Backend-agnostic description of one frame, in paint order.
#[derive(Clone, Debug)]
pub struct FramePlan {
    /// Output surface size.
    pub canvas: Canvas,
    /// Draw operations, back to front.
    pub ops: Vec<DrawOp>,
}

/// Draw operation emitted by [`compile_frame`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// Fill the whole surface.
    Clear {
        /// Fill colour.
        color: Rgba8,
    },
    /// Stroke an open or closed path.
    StrokePath {
        /// Path in canvas coordinates.
        path: BezPath,
        /// Stroke colour.
        color: Rgba8,
        /// Stroke width in pixels.
        width: f64,
    },
    /// Fill an axis-aligned rectangle.
    FillRect {
        /// Canvas rectangle.
        rect: Rect,
        /// Fill colour.
        color: Rgba8,
    },
    /// Outline an axis-aligned rectangle.
    StrokeRect {
        /// Canvas rectangle.
        rect: Rect,
        /// Stroke colour.
        color: Rgba8,
        /// Stroke width in pixels.
        width: f64,
    },
    /// Paint `image` stretched into `dest`, mirrored inside `dest` when `flipped`.
    Image {
        /// Straight-alpha source pixels.
        image: SpriteImage,
        /// Destination rectangle.
        dest: Rect,
        /// Mirror horizontally.
        flipped: bool,
        /// Group opacity in `0.0..=1.0`.
        opacity: f32,
    },
    /// Single line of text centred on `center`.
    Text {
        /// Line to draw.
        text: String,
        /// Centre of the laid-out line.
        center: Point,
        /// Font size in pixels.
        size_px: f32,
        /// Text colour.
        color: Rgba8,
    },
}

impl FramePlan {
    /// Number of image draws; handy for assertions.
    pub fn image_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Image { .. }))
            .count()
    }

    /// All text strings in paint order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Ellipsis loader frame for `tick`: `.`, `..`, `...`, repeating.
pub fn loader_text(tick: u64) -> &'static str {
    match tick % 3 {
        0 => ".",
        1 => "..",
        _ => "...",
    }
}

/// Compile the registry into a [`FramePlan`].
///
/// Never fails: a sprite without an image in a transitional state is drawn with whatever
/// placeholder its state allows.
#[tracing::instrument(level = "trace", skip(reg, cfg), fields(sprites = reg.len()))]
pub fn compile_frame(reg: &SpriteRegistry, cfg: &StageConfig, tick: u64) -> FramePlan {
    let mut ops = Vec::with_capacity(2 + reg.len() * 3);
    ops.push(DrawOp::Clear {
        color: cfg.background(),
    });

    let mut grid = BezPath::new();
    for line in isometric_grid(cfg.canvas, cfg.grid_spacing, cfg.grid_overscan) {
        grid.move_to(line.from);
        grid.line_to(line.to);
    }
    if !grid.elements().is_empty() {
        ops.push(DrawOp::StrokePath {
            path: grid,
            color: cfg.grid_color(),
            width: 1.0,
        });
    }

    for sprite in reg.iter() {
        compile_sprite(reg, cfg, sprite, tick, &mut ops);
    }

    FramePlan {
        canvas: cfg.canvas,
        ops,
    }
}

fn compile_sprite(
    reg: &SpriteRegistry,
    cfg: &StageConfig,
    sprite: &Sprite,
    tick: u64,
    ops: &mut Vec<DrawOp>,
) {
    let rect = sprite.rect();
    match &sprite.state {
        SpriteState::Ready(rendered) => {
            let image = if reg.shows_original(sprite.id) {
                reg.original(sprite.id).unwrap_or(&rendered.image)
            } else {
                &rendered.image
            };
            ops.push(DrawOp::Image {
                image: image.clone(),
                dest: rect,
                flipped: sprite.flipped,
                opacity: 1.0,
            });
        }
        SpriteState::Generating(generation) => {
            if let Some(previous) = &generation.previous {
                ops.push(DrawOp::Image {
                    image: previous.image.clone(),
                    dest: rect,
                    flipped: sprite.flipped,
                    opacity: STALE_OPACITY,
                });
                let center = rect.center();
                if let Some(prompt) = &generation.remix_prompt {
                    ops.push(DrawOp::Text {
                        text: prompt.clone(),
                        center: center - Vec2::new(0.0, f64::from(LOADER_TEXT_PX) * 1.5),
                        size_px: PROMPT_TEXT_PX,
                        color: INK,
                    });
                }
                ops.push(DrawOp::Text {
                    text: loader_text(tick).to_string(),
                    center,
                    size_px: LOADER_TEXT_PX,
                    color: INK,
                });
            } else if let Some(preview) = reg.preview(sprite.id) {
                preview_placeholder(cfg, rect.center(), preview, tick, ops);
            } else {
                text_placeholder(cfg, rect.center(), &sprite.metadata.prompt, tick, ops);
            }
        }
    }

    let selected = reg.selected_id() == Some(sprite.id);
    let hovered = reg.hovered_id() == Some(sprite.id);
    if selected || hovered {
        let bounds = if sprite.rendered().is_some() {
            sprite.content_rect()
        } else {
            rect
        };
        let radius = bounds.width().min(bounds.height()) * cfg.ring_radius_ratio;
        let alpha = if selected {
            SELECTED_RING_ALPHA
        } else {
            HOVERED_RING_ALPHA
        };
        ops.push(DrawOp::StrokePath {
            path: kurbo::Circle::new(bounds.center(), radius).to_path(0.1),
            color: RING.with_opacity(alpha),
            width: RING_WIDTH,
        });
    }

    if selected && sprite.rendered().is_some() && !sprite.remix_suggestions.is_empty() {
        let n = sprite.remix_suggestions.len() as u64;
        let idx = (tick / cfg.suggestion_ticks.max(1)) % n;
        ops.push(DrawOp::Text {
            text: sprite.remix_suggestions[idx as usize].clone(),
            center: Point::new(rect.center().x, rect.y1 + f64::from(CAPTION_TEXT_PX) * 1.5),
            size_px: CAPTION_TEXT_PX,
            color: MUTED_INK,
        });
    }
}

fn preview_placeholder(
    cfg: &StageConfig,
    center: Point,
    preview: &SpriteImage,
    tick: u64,
    ops: &mut Vec<DrawOp>,
) {
    let side = cfg.preview_size;
    let frame = Rect::from_center_size(center, Size::new(side, side));
    ops.push(DrawOp::FillRect {
        rect: frame,
        color: WHITE,
    });
    let inner = frame.inset(-PREVIEW_PADDING);
    if preview.width > 0 && preview.height > 0 && inner.width() > 0.0 {
        let s = (inner.width() / f64::from(preview.width))
            .min(inner.height() / f64::from(preview.height));
        let size = Size::new(f64::from(preview.width) * s, f64::from(preview.height) * s);
        ops.push(DrawOp::Image {
            image: preview.clone(),
            dest: Rect::from_center_size(center, size),
            flipped: false,
            opacity: 1.0,
        });
    }
    ops.push(DrawOp::StrokeRect {
        rect: frame,
        color: BORDER,
        width: 1.0,
    });
    ops.push(DrawOp::Text {
        text: loader_text(tick).to_string(),
        center: Point::new(center.x, frame.y1 + f64::from(LOADER_TEXT_PX)),
        size_px: LOADER_TEXT_PX,
        color: INK,
    });
}

fn text_placeholder(
    cfg: &StageConfig,
    center: Point,
    prompt: &str,
    tick: u64,
    ops: &mut Vec<DrawOp>,
) {
    let radius = cfg.placeholder_size / 2.0;
    ops.push(DrawOp::StrokePath {
        path: dashed_circle(center, radius),
        color: BORDER,
        width: 1.5,
    });

    let line_h = f64::from(PROMPT_TEXT_PX) * 1.3;
    let max_chars = (radius * 1.4 / (f64::from(PROMPT_TEXT_PX) * GLYPH_WIDTH_RATIO)).floor();
    let lines = wrap_words(prompt, max_chars.max(1.0) as usize, MAX_PROMPT_LINES);
    let top = center.y - line_h * lines.len() as f64 / 2.0 - line_h / 2.0;
    for (i, line) in lines.into_iter().enumerate() {
        ops.push(DrawOp::Text {
            text: line,
            center: Point::new(center.x, top + line_h * (i as f64 + 0.5)),
            size_px: PROMPT_TEXT_PX,
            color: INK,
        });
    }
    ops.push(DrawOp::Text {
        text: loader_text(tick).to_string(),
        center: Point::new(center.x, center.y + radius * 0.6),
        size_px: LOADER_TEXT_PX,
        color: INK,
    });
}

fn dashed_circle(center: Point, radius: f64) -> BezPath {
    let mut path = BezPath::new();
    let step = std::f64::consts::TAU / DASH_COUNT as f64;
    for i in 0..DASH_COUNT {
        let start = step * i as f64;
        for s in 0..=DASH_SEGMENTS {
            let a = start + step * 0.5 * s as f64 / DASH_SEGMENTS as f64;
            let p = center + Vec2::from_angle(a) * radius;
            if s == 0 {
                path.move_to(p);
            } else {
                path.line_to(p);
            }
        }
    }
    path
}

/// Greedy word wrap to at most `max_lines` lines of `max_chars` characters.
///
/// Overflowing text ends the last line with `...`. Words longer than a line are cut.
pub fn wrap_words(text: &str, max_chars: usize, max_lines: usize) -> Vec<String> {
    if max_lines == 0 {
        return Vec::new();
    }
    let max_chars = max_chars.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut overflow = false;

    for word in text.split_whitespace() {
        let word: String = word.chars().take(max_chars).collect();
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed <= max_chars {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&word);
            continue;
        }
        lines.push(std::mem::take(&mut current));
        if lines.len() == max_lines {
            overflow = true;
            break;
        }
        current = word;
    }
    if !overflow && !current.is_empty() {
        lines.push(current);
    }

    if overflow && let Some(last) = lines.last_mut() {
        let keep = max_chars.saturating_sub(3);
        if last.chars().count() > keep {
            *last = last.chars().take(keep).collect();
        }
        last.push_str("...");
    }
    lines
}

#[cfg(test)]
#[path = "../../tests/unit/compile/plan.rs"]
mod tests;
