use super::*;
use crate::foundation::core::Size;
use crate::scene::sprite::Origin;

fn add(reg: &mut SpriteRegistry, x: f64) -> SpriteId {
    let id = reg.allocate_id();
    let ticket = reg.allocate_ticket();
    assert!(reg.insert(Sprite::pending(
        id,
        Origin::Text(format!("s{}", id.0)),
        "p",
        Point::new(x, 0.0),
        Size::new(10.0, 10.0),
        ticket,
    )));
    id
}

#[test]
fn insert_appends_on_top() {
    let mut reg = SpriteRegistry::new();
    let a = add(&mut reg, 0.0);
    let b = add(&mut reg, 1.0);
    let c = add(&mut reg, 2.0);
    assert_eq!(reg.ids(), vec![a, b, c]);
    assert_eq!(reg.iter_top_down().map(|s| s.id).collect::<Vec<_>>(), vec![c, b, a]);
    assert_eq!(reg.len(), 3);
}

#[test]
fn duplicate_ids_are_rejected() {
    let mut reg = SpriteRegistry::new();
    let a = add(&mut reg, 0.0);
    let clone = reg.get(a).cloned().unwrap();
    assert!(!reg.insert(clone));
    assert_eq!(reg.len(), 1);
}

#[test]
fn ids_are_never_reused_after_remove_or_clear() {
    let mut reg = SpriteRegistry::new();
    let a = add(&mut reg, 0.0);
    reg.remove(a).unwrap();
    let b = add(&mut reg, 0.0);
    assert_ne!(a, b);
    reg.clear();
    let c = add(&mut reg, 0.0);
    assert!(c.0 > b.0);
}

#[test]
fn bring_to_top_reorders_and_is_idempotent_for_topmost() {
    let mut reg = SpriteRegistry::new();
    let a = add(&mut reg, 0.0);
    let b = add(&mut reg, 1.0);
    assert!(reg.bring_to_top(a));
    assert_eq!(reg.ids(), vec![b, a]);

    let rev = reg.revision();
    assert!(reg.bring_to_top(a));
    assert_eq!(reg.ids(), vec![b, a]);
    assert_eq!(reg.revision(), rev);

    assert!(!reg.bring_to_top(SpriteId(999)));
}

#[test]
fn patch_and_update_touch_only_known_ids() {
    let mut reg = SpriteRegistry::new();
    let a = add(&mut reg, 0.0);
    assert!(reg.patch(
        a,
        SpritePatch {
            position: Some(Point::new(5.0, 6.0)),
            scale: Some(ScaleFactor::X2),
            ..SpritePatch::default()
        }
    ));
    let s = reg.get(a).unwrap();
    assert_eq!(s.position, Point::new(5.0, 6.0));
    assert_eq!(s.scale, ScaleFactor::X2);
    assert!(!s.flipped);

    assert!(!reg.patch(SpriteId(42), SpritePatch::default()));
    assert!(!reg.update(SpriteId(42), |s| s.flipped = true));
}

#[test]
fn removal_clears_selection_hover_and_side_maps() {
    let mut reg = SpriteRegistry::new();
    let a = add(&mut reg, 0.0);
    let b = add(&mut reg, 1.0);
    reg.select(Some(a));
    reg.set_hovered(Some(a));
    assert!(reg.set_original(a, SpriteImage::solid(1, 1, [0; 4])));
    assert!(reg.set_preview(a, SpriteImage::solid(1, 1, [0; 4])));
    assert_eq!(reg.toggle_original_view(a), Some(true));
    assert!(reg.set_original(b, SpriteImage::solid(1, 1, [0; 4])));
    assert_eq!(reg.side_map_len(), 4);

    reg.remove(a).unwrap();
    assert!(reg.selected().is_none());
    assert!(reg.hovered_id().is_none());
    assert!(reg.original(a).is_none());
    assert!(reg.preview(a).is_none());
    assert!(!reg.shows_original(a));
    assert_eq!(reg.side_map_len(), 1);

    reg.clear();
    assert_eq!(reg.side_map_len(), 0);
    assert!(reg.is_empty());
}

#[test]
fn side_maps_refuse_unknown_ids() {
    let mut reg = SpriteRegistry::new();
    assert!(!reg.set_original(SpriteId(1), SpriteImage::solid(1, 1, [0; 4])));
    assert!(!reg.set_preview(SpriteId(1), SpriteImage::solid(1, 1, [0; 4])));
    assert_eq!(reg.toggle_original_view(SpriteId(1)), None);
    assert_eq!(reg.side_map_len(), 0);
}

#[test]
fn selection_lookup_is_derived() {
    let mut reg = SpriteRegistry::new();
    let a = add(&mut reg, 0.0);
    reg.select(Some(a));
    assert_eq!(reg.selected().map(|s| s.id), Some(a));
    reg.select(Some(SpriteId(77)));
    assert!(reg.selected().is_none());
}

#[test]
fn toggle_original_view_round_trips() {
    let mut reg = SpriteRegistry::new();
    let a = add(&mut reg, 0.0);
    reg.set_original(a, SpriteImage::solid(1, 1, [0; 4]));
    assert_eq!(reg.toggle_original_view(a), Some(true));
    assert!(reg.shows_original(a));
    assert_eq!(reg.toggle_original_view(a), Some(false));
    assert!(!reg.shows_original(a));
}
