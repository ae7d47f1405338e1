//! Isometric guide grid: two families of parallel lines at +/-30 degrees.

use crate::foundation::core::{Canvas, Point, Vec2};

/// One grid line segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLine {
    /// Start point.
    pub from: Point,
    /// End point.
    pub to: Point,
}

/// Grid lines covering `canvas` plus `overscan` times its diagonal on every side.
///
/// Lines sit at fixed multiples of `spacing` from the scene origin, so resizing the canvas
/// extends the grid without shifting it.
pub fn isometric_grid(canvas: Canvas, spacing: f64, overscan: f64) -> Vec<GridLine> {
    if !spacing.is_finite() || spacing <= 0.0 {
        return Vec::new();
    }
    let center = canvas.center();
    let half_diag = Vec2::new(f64::from(canvas.width), f64::from(canvas.height)).hypot() / 2.0;
    let reach = half_diag * (1.0 + overscan.max(0.0));

    let (sin, cos) = 30f64.to_radians().sin_cos();
    let mut out = Vec::new();
    for dir in [Vec2::new(cos, sin), Vec2::new(cos, -sin)] {
        let normal = Vec2::new(-dir.y, dir.x);
        let c = normal.dot(center.to_vec2());
        let k0 = ((c - reach) / spacing).floor() as i64;
        let k1 = ((c + reach) / spacing).ceil() as i64;
        for k in k0..=k1 {
            let offset = k as f64 * spacing;
            let q = center + normal * (offset - c);
            out.push(GridLine {
                from: q - dir * reach,
                to: q + dir * reach,
            });
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/compile/grid.rs"]
mod tests;
