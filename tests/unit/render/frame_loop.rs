use super::*;
use crate::assets::SpriteImage;
use crate::foundation::core::{PixelRect, Point, Size};
use crate::scene::sprite::{Origin, Rendered, Sprite, SpriteId, SpriteState};

fn cfg() -> StageConfig {
    StageConfig {
        tick_interval_ms: 100,
        ..StageConfig::default()
    }
}

fn add(reg: &mut SpriteRegistry, ready: bool) -> SpriteId {
    let id = reg.allocate_id();
    let ticket = reg.allocate_ticket();
    let mut s = Sprite::pending(
        id,
        Origin::Text("tower".to_string()),
        "tower",
        Point::new(0.0, 0.0),
        Size::new(10.0, 10.0),
        ticket,
    );
    if ready {
        s.state = SpriteState::Ready(Rendered {
            image: SpriteImage::solid(1, 1, [0, 0, 0, 255]),
            content_bounds: PixelRect::full(1, 1),
        });
    }
    reg.insert(s);
    id
}

#[test]
fn ticks_follow_host_time_not_call_count() {
    let mut rl = RenderLoop::new(&cfg());
    assert_eq!(rl.advance(Duration::from_millis(40)), 0);
    assert_eq!(rl.advance(Duration::from_millis(40)), 0);
    assert_eq!(rl.advance(Duration::from_millis(40)), 1);
    assert_eq!(rl.tick(), 1);
    assert_eq!(rl.advance(Duration::from_millis(350)), 3);
    assert_eq!(rl.tick(), 4);
}

#[test]
fn long_stall_advances_in_one_step_and_keeps_the_remainder() {
    let mut rl = RenderLoop::new(&StageConfig {
        tick_interval_ms: 1,
        ..StageConfig::default()
    });
    let stall = Duration::from_secs(60 * 60 * 24 * 365) + Duration::from_micros(600);
    assert_eq!(rl.advance(stall), 31_536_000_000);
    assert_eq!(rl.tick(), 31_536_000_000);
    assert_eq!(rl.advance(Duration::from_micros(400)), 1);
    assert_eq!(rl.advance(Duration::from_micros(999)), 0);
}

#[test]
fn first_frame_and_mutations_need_redraw() {
    let c = cfg();
    let mut reg = SpriteRegistry::new();
    let mut rl = RenderLoop::new(&c);
    assert!(rl.needs_redraw(&reg));
    rl.plan(&reg, &c);
    assert!(!rl.needs_redraw(&reg));

    add(&mut reg, true);
    assert!(rl.needs_redraw(&reg));
    rl.plan(&reg, &c);
    assert!(!rl.needs_redraw(&reg));

    rl.invalidate();
    assert!(rl.needs_redraw(&reg));
}

#[test]
fn static_scene_ignores_ticks() {
    let c = cfg();
    let mut reg = SpriteRegistry::new();
    add(&mut reg, true);
    let mut rl = RenderLoop::new(&c);
    rl.plan(&reg, &c);
    rl.advance(Duration::from_secs(1));
    assert!(!rl.needs_redraw(&reg));
}

#[test]
fn generating_sprite_animates_on_tick() {
    let c = cfg();
    let mut reg = SpriteRegistry::new();
    add(&mut reg, false);
    let mut rl = RenderLoop::new(&c);
    let first = rl.plan(&reg, &c);
    assert!(first.texts().contains(&"."));
    rl.advance(Duration::from_millis(100));
    assert!(rl.needs_redraw(&reg));
    let second = rl.plan(&reg, &c);
    assert!(second.texts().contains(&".."));
}

#[test]
fn selected_sprite_with_suggestions_animates() {
    let c = cfg();
    let mut reg = SpriteRegistry::new();
    let id = add(&mut reg, true);
    reg.update(id, |s| {
        s.remix_suggestions = vec!["a".to_string(), "b".to_string()];
    });
    assert!(!is_animating(&reg));
    reg.select(Some(id));
    assert!(is_animating(&reg));
}
