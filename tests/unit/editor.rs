use super::*;
use crate::assets::SpriteImage;
use crate::assets::decode::encode_png;
use crate::generate::orchestrator::GenerationOutcome;
use crate::generate::service::EchoService;
use crate::interact::events::Key;
use crate::scene::sprite::Phase;

fn small_config() -> StageConfig {
    StageConfig {
        canvas: crate::foundation::core::Canvas {
            width: 400,
            height: 300,
        },
        target_width: 100.0,
        tick_interval_ms: 50,
        ..StageConfig::default()
    }
}

fn block_png() -> Vec<u8> {
    // 20x20 white with a 10x10 blue block in the middle.
    let mut bytes = Vec::new();
    for y in 0..20u32 {
        for x in 0..20u32 {
            if (5..15).contains(&x) && (5..15).contains(&y) {
                bytes.extend_from_slice(&[0, 0, 255, 255]);
            } else {
                bytes.extend_from_slice(&[255, 255, 255, 255]);
            }
        }
    }
    encode_png(&SpriteImage::from_rgba8(20, 20, bytes)).unwrap()
}

fn key(k: Key) -> InputEvent {
    InputEvent::Key {
        key: k,
        text_input_focused: false,
    }
}

#[test]
fn invalid_config_is_rejected() {
    let cfg = StageConfig {
        target_width: 0.0,
        ..small_config()
    };
    assert!(Editor::new(cfg, EchoService).is_err());
}

#[tokio::test]
async fn imported_image_can_be_selected_and_exported() {
    let mut ed = Editor::new(small_config(), EchoService).unwrap();
    let job = ed.submit_image(&block_png(), "", None).unwrap();
    let id = job.id();
    assert_eq!(job.run().await, GenerationOutcome::Ready(id));

    // Fitted to 100x100 around the canvas centre; content is the middle half.
    {
        let reg = ed.registry();
        let s = reg.get(id).unwrap();
        assert_eq!(s.phase(), Phase::Ready);
        assert_eq!(s.rect(), crate::foundation::core::Rect::new(150.0, 100.0, 250.0, 200.0));
    }

    assert!(ed.export_selected().is_err());
    ed.handle_input(InputEvent::PointerDown { x: 160.0, y: 110.0 });
    assert_eq!(ed.registry().selected_id(), None, "transparent margin clicks through");
    ed.handle_input(InputEvent::PointerDown { x: 200.0, y: 150.0 });
    assert_eq!(ed.registry().selected_id(), Some(id));
    assert_eq!(ed.cursor(), Cursor::Grabbing);
    ed.handle_input(InputEvent::PointerUp { x: 200.0, y: 150.0 });

    let png = ed.export_selected().unwrap();
    assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
}

#[tokio::test]
async fn regenerate_shortcut_hands_back_a_job() {
    let mut ed = Editor::new(small_config(), EchoService).unwrap();
    let job = ed.submit_image(&block_png(), "", None).unwrap();
    job.run().await;
    ed.handle_input(InputEvent::PointerDown { x: 200.0, y: 150.0 });

    let focused = InputEvent::Key {
        key: Key::Char('r'),
        text_input_focused: true,
    };
    assert!(ed.handle_input(focused).is_none());

    let job = ed.handle_input(key(Key::Char('r'))).expect("regenerate job");
    assert!(ed.registry().selected().unwrap().is_generating());
    assert!(ed.handle_input(key(Key::Char('r'))).is_none());
    assert!(matches!(job.run().await, GenerationOutcome::Ready(_)));

    assert!(ed.remix_selected("make it red").is_some());
}

#[test]
fn frames_track_revisions_and_ticks() {
    let mut ed = Editor::new(small_config(), EchoService).unwrap();
    assert!(ed.needs_redraw());
    let frame = ed.render_frame().unwrap();
    assert_eq!((frame.width, frame.height), (400, 300));
    assert!(!ed.needs_redraw());
    assert!(!ed.tick(Duration::from_millis(500)), "static scene");

    let _job = ed.submit_prompt("castle").unwrap();
    assert!(ed.needs_redraw());
    let plan = ed.plan_frame();
    assert_eq!(plan.canvas.width, 400);
    assert!(ed.tick(Duration::from_millis(50)), "loader animates");
}

#[test]
fn reset_clears_the_canvas() {
    let mut ed = Editor::new(small_config(), EchoService).unwrap();
    let _a = ed.submit_prompt("castle").unwrap();
    let _b = ed.submit_image(&block_png(), "", Some(Point::new(10.0, 10.0))).unwrap();
    assert_eq!(ed.registry().len(), 2);
    ed.reset();
    assert!(ed.registry().is_empty());
    assert_eq!(ed.registry().side_map_len(), 0);
}
