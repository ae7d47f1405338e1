use super::*;
use crate::foundation::core::Canvas;

fn canvas() -> Canvas {
    Canvas {
        width: 64,
        height: 48,
    }
}

fn backend() -> CpuBackend {
    CpuBackend::new(RenderSettings::default()).unwrap()
}

fn plan(ops: Vec<DrawOp>) -> FramePlan {
    FramePlan {
        canvas: canvas(),
        ops,
    }
}

fn clear(rgba: [u8; 4]) -> DrawOp {
    DrawOp::Clear {
        color: Rgba8::from_array(rgba),
    }
}

fn two_tone() -> SpriteImage {
    // Left pixel red, right pixel blue.
    SpriteImage::from_rgba8(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255])
}

#[test]
fn clear_fills_the_frame() {
    let frame = backend()
        .render_plan(&plan(vec![clear([10, 20, 30, 255])]))
        .unwrap();
    assert_eq!((frame.width, frame.height), (64, 48));
    assert!(frame.premultiplied);
    assert_eq!(frame.data.len(), 64 * 48 * 4);
    assert_eq!(frame.pixel(0, 0), Some([10, 20, 30, 255]));
    assert_eq!(frame.pixel(63, 47), Some([10, 20, 30, 255]));
    assert_eq!(frame.pixel(64, 0), None);
}

#[test]
fn image_lands_in_dest_rect() {
    let red = SpriteImage::solid(8, 8, [255, 0, 0, 255]);
    let frame = backend()
        .render_plan(&plan(vec![
            clear([255, 255, 255, 255]),
            DrawOp::Image {
                image: red,
                dest: Rect::new(10.0, 10.0, 30.0, 30.0),
                flipped: false,
                opacity: 1.0,
            },
        ]))
        .unwrap();
    assert_eq!(frame.pixel(20, 20), Some([255, 0, 0, 255]));
    assert_eq!(frame.pixel(5, 5), Some([255, 255, 255, 255]));
    assert_eq!(frame.pixel(40, 40), Some([255, 255, 255, 255]));
}

#[test]
fn flipped_image_is_mirrored_inside_its_rect() {
    let draw = |flipped| {
        backend()
            .render_plan(&plan(vec![DrawOp::Image {
                image: two_tone(),
                dest: Rect::new(0.0, 0.0, 40.0, 20.0),
                flipped,
                opacity: 1.0,
            }]))
            .unwrap()
    };
    let normal = draw(false);
    assert_eq!(normal.pixel(4, 10), Some([255, 0, 0, 255]));
    assert_eq!(normal.pixel(36, 10), Some([0, 0, 255, 255]));

    let mirrored = draw(true);
    assert_eq!(mirrored.pixel(4, 10), Some([0, 0, 255, 255]));
    assert_eq!(mirrored.pixel(36, 10), Some([255, 0, 0, 255]));
    // Nothing leaks outside the sprite's own rect.
    assert_eq!(mirrored.pixel(50, 10), Some([0, 0, 0, 0]));
}

#[test]
fn stale_opacity_blends_with_background() {
    let frame = backend()
        .render_plan(&plan(vec![
            clear([255, 255, 255, 255]),
            DrawOp::Image {
                image: SpriteImage::solid(4, 4, [0, 0, 0, 255]),
                dest: Rect::new(0.0, 0.0, 32.0, 32.0),
                flipped: false,
                opacity: 0.5,
            },
        ]))
        .unwrap();
    let [r, _, _, a] = frame.pixel(16, 16).unwrap();
    assert_eq!(a, 255);
    assert!((100..=155).contains(&r), "r = {r}");
}

#[test]
fn transparent_pixels_do_not_cover_background() {
    let frame = backend()
        .render_plan(&plan(vec![
            clear([0, 255, 0, 255]),
            DrawOp::Image {
                image: SpriteImage::solid(4, 4, [255, 0, 0, 0]),
                dest: Rect::new(0.0, 0.0, 32.0, 32.0),
                flipped: false,
                opacity: 1.0,
            },
        ]))
        .unwrap();
    assert_eq!(frame.pixel(16, 16), Some([0, 255, 0, 255]));
}

#[test]
fn fill_and_stroke_rects_paint() {
    let frame = backend()
        .render_plan(&plan(vec![
            DrawOp::FillRect {
                rect: Rect::new(0.0, 0.0, 20.0, 20.0),
                color: Rgba8::from_array([255, 255, 255, 255]),
            },
            DrawOp::StrokeRect {
                rect: Rect::new(30.5, 10.5, 60.5, 40.5),
                color: Rgba8::from_array([0, 0, 0, 255]),
                width: 1.0,
            },
        ]))
        .unwrap();
    assert_eq!(frame.pixel(10, 10), Some([255, 255, 255, 255]));
    assert_eq!(frame.pixel(45, 10), Some([0, 0, 0, 255]));
    assert_eq!(frame.pixel(45, 25), Some([0, 0, 0, 0]));
}

#[test]
fn text_is_skipped_without_a_font() {
    let mut b = backend();
    assert!(!b.has_font());
    let frame = b
        .render_plan(&plan(vec![DrawOp::Text {
            text: "castle".to_string(),
            center: Point::new(32.0, 24.0),
            size_px: 14.0,
            color: Rgba8::from_array([0, 0, 0, 255]),
        }]))
        .unwrap();
    assert!(frame.data.iter().all(|b| *b == 0));
}

#[test]
fn missing_font_file_is_an_error() {
    let settings = RenderSettings {
        font_path: Some("/definitely/not/a/font.ttf".into()),
    };
    assert!(CpuBackend::new(settings).is_err());
}

#[test]
fn image_cache_drops_unused_entries() {
    let mut b = backend();
    let img = SpriteImage::solid(2, 2, [1, 2, 3, 255]);
    let with_image = plan(vec![DrawOp::Image {
        image: img.clone(),
        dest: Rect::new(0.0, 0.0, 4.0, 4.0),
        flipped: false,
        opacity: 1.0,
    }]);
    b.render_plan(&with_image).unwrap();
    b.render_plan(&with_image).unwrap();
    assert_eq!(b.cached_images(), 1);
    b.render_plan(&plan(vec![])).unwrap();
    assert_eq!(b.cached_images(), 0);
}

#[test]
fn unrenderable_images_are_skipped_and_the_frame_still_draws() {
    let broken = SpriteImage::from_rgba8(4, 4, vec![0; 7]);
    let too_wide = SpriteImage::solid(u32::from(u16::MAX) + 1, 1, [0, 255, 0, 255]);
    let red = SpriteImage::solid(2, 2, [255, 0, 0, 255]);
    let image = |image: SpriteImage, dest: Rect| DrawOp::Image {
        image,
        dest,
        flipped: false,
        opacity: 1.0,
    };
    let mut b = backend();
    let frame = b
        .render_plan(&plan(vec![
            clear([255, 255, 255, 255]),
            image(broken, Rect::new(0.0, 0.0, 20.0, 20.0)),
            image(too_wide, Rect::new(0.0, 20.0, 64.0, 30.0)),
            image(red, Rect::new(40.0, 0.0, 60.0, 20.0)),
        ]))
        .unwrap();
    assert_eq!(frame.pixel(10, 10), Some([255, 255, 255, 255]));
    assert_eq!(frame.pixel(10, 25), Some([255, 255, 255, 255]));
    assert_eq!(frame.pixel(50, 10), Some([255, 0, 0, 255]));
    assert_eq!(b.cached_images(), 1);
}

#[test]
fn image_transform_mirrors_around_dest() {
    let dest = Rect::new(10.0, 20.0, 50.0, 40.0);
    let t = image_transform(dest, 4.0, 2.0, false);
    assert_eq!(t * Point::new(0.0, 0.0), Point::new(10.0, 20.0));
    assert_eq!(t * Point::new(4.0, 2.0), Point::new(50.0, 40.0));
    let f = image_transform(dest, 4.0, 2.0, true);
    assert_eq!(f * Point::new(0.0, 0.0), Point::new(50.0, 20.0));
    assert_eq!(f * Point::new(4.0, 2.0), Point::new(10.0, 40.0));
}
