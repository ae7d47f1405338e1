use super::*;

fn ready_sprite(image: SpriteImage, bounds: PixelRect) -> Sprite {
    let mut s = Sprite::pending(
        SpriteId(1),
        Origin::Text("castle".to_string()),
        "castle",
        Point::new(100.0, 50.0),
        Size::new(200.0, 100.0),
        GenerationTicket(1),
    );
    s.state = SpriteState::Ready(Rendered {
        image,
        content_bounds: bounds,
    });
    s
}

#[test]
fn scale_factor_values_and_cycle() {
    let values: Vec<f64> = ScaleFactor::ALL.iter().map(|s| s.value()).collect();
    assert_eq!(values, vec![1.0, 1.2, 1.5, 2.0]);
    assert_eq!(ScaleFactor::from_value(1.5), Some(ScaleFactor::X1_5));
    assert_eq!(ScaleFactor::from_value(1.7), None);
    assert_eq!(ScaleFactor::X2.next(), ScaleFactor::X1);
    assert_eq!(ScaleFactor::default(), ScaleFactor::X1);
}

#[test]
fn pending_sprite_phase_and_geometry() {
    let s = Sprite::pending(
        SpriteId(7),
        Origin::Text("tree".to_string()),
        "tree",
        Point::new(10.0, 20.0),
        Size::new(200.0, 200.0),
        GenerationTicket(3),
    );
    assert_eq!(s.phase(), Phase::Pending);
    assert!(s.is_generating());
    assert!(s.rendered().is_none());
    assert_eq!(s.rect(), Rect::new(10.0, 20.0, 210.0, 220.0));
    assert_eq!(s.center(), Point::new(110.0, 120.0));
    assert_eq!(s.content_rect(), s.rect());
    assert_eq!(s.metadata.prompt, "tree");
}

#[test]
fn regenerating_sprite_is_distinguishable_from_pending() {
    let mut s = ready_sprite(SpriteImage::solid(4, 2, [0; 4]), PixelRect::full(4, 2));
    let previous = s.rendered().cloned();
    s.state = SpriteState::Generating(Generation {
        ticket: GenerationTicket(2),
        previous,
        remix_prompt: None,
    });
    assert_eq!(s.phase(), Phase::Generating);
    assert!(s.rendered().is_none());
    assert!(s.latest_rendered().is_some());
}

#[test]
fn display_rect_follows_scale() {
    let mut s = ready_sprite(SpriteImage::solid(4, 2, [0; 4]), PixelRect::full(4, 2));
    s.scale = ScaleFactor::X1_5;
    assert_eq!(s.display_size(), Size::new(300.0, 150.0));
    assert_eq!(s.rect(), Rect::new(100.0, 50.0, 400.0, 200.0));
}

#[test]
fn content_rect_maps_bounds_and_mirrors_when_flipped() {
    // 200x100 image on a 200x100 footprint: 1px == 1 unit.
    let mut s = ready_sprite(
        SpriteImage::solid(200, 100, [0; 4]),
        PixelRect::new(10, 20, 30, 40),
    );
    assert_eq!(s.content_rect(), Rect::new(110.0, 70.0, 140.0, 110.0));

    s.flipped = true;
    assert_eq!(s.content_rect(), Rect::new(260.0, 70.0, 290.0, 110.0));

    s.flipped = false;
    s.scale = ScaleFactor::X2;
    assert_eq!(s.content_rect(), Rect::new(120.0, 90.0, 180.0, 170.0));
}

#[test]
fn fit_to_width_preserves_aspect() {
    assert_eq!(fit_to_width(400, 300, 375.0), Size::new(375.0, 281.25));
    assert_eq!(fit_to_width(100, 400, 375.0), Size::new(375.0, 1500.0));
    assert_eq!(fit_to_width(0, 10, 375.0), Size::new(375.0, 375.0));
}
