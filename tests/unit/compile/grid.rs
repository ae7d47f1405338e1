use super::*;

fn canvas() -> Canvas {
    Canvas {
        width: 640,
        height: 480,
    }
}

#[test]
fn lines_run_at_plus_minus_thirty_degrees() {
    let lines = isometric_grid(canvas(), 48.0, 1.0);
    assert!(!lines.is_empty());
    for l in &lines {
        let d = l.to - l.from;
        let angle = d.y.atan2(d.x).to_degrees();
        assert!(
            (angle - 30.0).abs() < 1e-9 || (angle + 30.0).abs() < 1e-9,
            "unexpected angle {angle}"
        );
    }
}

#[test]
fn neighbouring_lines_are_spacing_apart() {
    let lines = isometric_grid(canvas(), 48.0, 0.0);
    let (sin, cos) = 30f64.to_radians().sin_cos();
    let normal = Vec2::new(-sin, cos);
    let mut offsets: Vec<f64> = lines
        .iter()
        .filter(|l| (l.to - l.from).y > 0.0)
        .map(|l| normal.dot(l.from.to_vec2()))
        .collect();
    offsets.sort_by(f64::total_cmp);
    for w in offsets.windows(2) {
        assert!((w[1] - w[0] - 48.0).abs() < 1e-6);
    }
    // Offsets are anchored to multiples of the spacing.
    for o in offsets {
        assert!((o / 48.0 - (o / 48.0).round()).abs() < 1e-9);
    }
}

#[test]
fn grid_extends_beyond_the_viewport() {
    let lines = isometric_grid(canvas(), 48.0, 1.0);
    let min_x = lines.iter().map(|l| l.from.x.min(l.to.x)).fold(f64::MAX, f64::min);
    let max_x = lines.iter().map(|l| l.from.x.max(l.to.x)).fold(f64::MIN, f64::max);
    assert!(min_x < -200.0);
    assert!(max_x > 840.0);
}

#[test]
fn overscan_adds_lines_and_bad_spacing_yields_none() {
    let tight = isometric_grid(canvas(), 48.0, 0.0).len();
    let wide = isometric_grid(canvas(), 48.0, 1.0).len();
    assert!(wide > tight);
    assert!(isometric_grid(canvas(), 0.0, 1.0).is_empty());
    assert!(isometric_grid(canvas(), f64::NAN, 1.0).is_empty());
}
