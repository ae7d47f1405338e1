use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::assets::decode::premultiply_rgba8_in_place;
use crate::assets::{ImageId, SpriteImage};
use crate::compile::plan::{DrawOp, FramePlan};
use crate::foundation::core::{Affine, BezPath, Point, Rect, Rgba8, Vec2};
use crate::foundation::error::{StageError, StageResult};
use crate::render::backend::{FrameRGBA, RenderBackend, RenderSettings};
use crate::render::text::{TextBrushRgba8, TextLayoutEngine};

/// `vello_cpu` raster backend.
///
/// Sprite pixels are converted to premultiplied pixmaps once per [`ImageId`] and dropped when a
/// frame no longer references them.
pub struct CpuBackend {
    image_cache: HashMap<ImageId, vello_cpu::Image>,
    text: Option<TextLayoutEngine>,
}

impl CpuBackend {
    /// Build a backend; loads the configured font, if any.
    pub fn new(settings: RenderSettings) -> StageResult<Self> {
        let text = match &settings.font_path {
            Some(path) => Some(TextLayoutEngine::from_path(path)?),
            None => None,
        };
        Ok(Self {
            image_cache: HashMap::new(),
            text,
        })
    }

    /// Whether text ops will be drawn.
    pub fn has_font(&self) -> bool {
        self.text.is_some()
    }

    /// Number of cached image paints.
    pub fn cached_images(&self) -> usize {
        self.image_cache.len()
    }

    fn image_paint_for(&mut self, image: &SpriteImage) -> StageResult<vello_cpu::Image> {
        if let Some(paint) = self.image_cache.get(&image.id()) {
            return Ok(paint.clone());
        }

        let mut premul = image.rgba8.to_vec();
        premultiply_rgba8_in_place(&mut premul);
        let pixmap = image_premul_bytes_to_pixmap(&premul, image.width, image.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };

        self.image_cache.insert(image.id(), paint.clone());
        Ok(paint)
    }
}

impl RenderBackend for CpuBackend {
    fn render_plan(&mut self, plan: &FramePlan) -> StageResult<FrameRGBA> {
        plan.canvas.validate()?;
        let width: u16 = plan
            .canvas
            .width
            .try_into()
            .map_err(|_| StageError::render("canvas width exceeds u16"))?;
        let height: u16 = plan
            .canvas
            .height
            .try_into()
            .map_err(|_| StageError::render("canvas height exceeds u16"))?;

        let mut ctx = vello_cpu::RenderContext::new(width, height);
        let mut used = HashSet::new();
        for op in &plan.ops {
            if let DrawOp::Image { image, .. } = op {
                used.insert(image.id());
            }
            draw_op(self, &mut ctx, op, plan.canvas.rect())?;
        }
        self.image_cache.retain(|id, _| used.contains(id));

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        Ok(FrameRGBA {
            width: plan.canvas.width,
            height: plan.canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn draw_op(
    backend: &mut CpuBackend,
    ctx: &mut vello_cpu::RenderContext,
    op: &DrawOp,
    canvas: Rect,
) -> StageResult<()> {
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);

    match op {
        DrawOp::Clear { color } => {
            ctx.set_paint(color_to_cpu(*color));
            ctx.fill_rect(&rect_to_cpu(canvas));
            Ok(())
        }
        DrawOp::StrokePath { path, color, width } => {
            ctx.set_paint(color_to_cpu(*color));
            ctx.set_stroke(vello_cpu::kurbo::Stroke::new(*width));
            ctx.stroke_path(&bezpath_to_cpu(path));
            Ok(())
        }
        DrawOp::FillRect { rect, color } => {
            ctx.set_paint(color_to_cpu(*color));
            ctx.fill_rect(&rect_to_cpu(*rect));
            Ok(())
        }
        DrawOp::StrokeRect { rect, color, width } => {
            ctx.set_paint(color_to_cpu(*color));
            ctx.set_stroke(vello_cpu::kurbo::Stroke::new(*width));
            ctx.stroke_rect(&rect_to_cpu(*rect));
            Ok(())
        }
        DrawOp::Image {
            image,
            dest,
            flipped,
            opacity,
        } => {
            if image.width == 0 || image.height == 0 || dest.area() <= 0.0 {
                return Ok(());
            }
            let image_paint = match backend.image_paint_for(image) {
                Ok(paint) => paint,
                Err(err) => {
                    tracing::warn!(%err, image = image.id().0, "image cannot be drawn; skipped");
                    return Ok(());
                }
            };
            let (w, h) = (f64::from(image.width), f64::from(image.height));

            ctx.set_transform(affine_to_cpu(image_transform(*dest, w, h, *flipped)));
            ctx.set_paint(image_paint);

            if *opacity < 1.0 {
                ctx.push_opacity_layer(*opacity);
            }
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
            if *opacity < 1.0 {
                ctx.pop_layer();
            }
            Ok(())
        }
        DrawOp::Text {
            text,
            center,
            size_px,
            color,
        } => {
            let Some(engine) = backend.text.as_mut() else {
                tracing::trace!(text = %text, "no font configured; text skipped");
                return Ok(());
            };
            let layout = engine.layout_line(text, *size_px, TextBrushRgba8::from(*color))?;
            let origin = *center
                - Vec2::new(
                    f64::from(layout.width()) / 2.0,
                    f64::from(layout.height()) / 2.0,
                );
            ctx.set_transform(affine_to_cpu(Affine::translate(origin.to_vec2())));

            let font = engine.font().clone();
            for line in layout.lines() {
                for item in line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };

                    let brush = run.style().brush;
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                        brush.r, brush.g, brush.b, brush.a,
                    ));

                    let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    ctx.glyph_run(&font)
                        .font_size(run.run().font_size())
                        .fill_glyphs(glyphs);
                }
            }
            Ok(())
        }
    }
}

/// Map image pixel space onto `dest`, mirrored inside `dest` when `flipped`.
pub(crate) fn image_transform(dest: Rect, w: f64, h: f64, flipped: bool) -> Affine {
    let sx = dest.width() / w;
    let sy = dest.height() / h;
    if flipped {
        Affine::translate((dest.x1, dest.y0)) * Affine::scale_non_uniform(-sx, sy)
    } else {
        Affine::translate((dest.x0, dest.y0)) * Affine::scale_non_uniform(sx, sy)
    }
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> StageResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| StageError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| StageError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(StageError::render("sprite image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
