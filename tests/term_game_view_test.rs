use cascade_crush::adapter::LevelCatalog;
use cascade_crush::core::{RunState, SimpleRng};
use cascade_crush::term::{encode_diff_into, FrameBuffer, GameView, Hud, Viewport};
use cascade_crush::types::Coord;

fn frame_text(fb: &FrameBuffer) -> String {
    (0..fb.height()).map(|y| fb.row_text(y) + "\n").collect()
}

#[test]
fn shaped_level_leaves_holes_blank() {
    let catalog = LevelCatalog::builtin().unwrap();
    let config = catalog.get(5).unwrap().clone();
    let run = RunState::start_attempt(config, SimpleRng::new(11)).unwrap();
    let hud = Hud {
        level_name: "Chocolate Hills",
        remote: true,
    };

    let fb = GameView::default().render(&run.snapshot(), None, &hud, Viewport::new(100, 30));
    let text = frame_text(&fb);

    assert!(text.contains("LEVEL 5"));
    assert!(text.contains("Chocolate Hills"));
    assert!(text.contains("28/28"));
    assert!(text.contains("REMOTE ON"));
    assert_eq!(text.matches('●').count(), 52);
}

#[test]
fn moving_the_cursor_redraws_few_cells() {
    let catalog = LevelCatalog::builtin().unwrap();
    let run = RunState::start_attempt(catalog.get(1).unwrap().clone(), SimpleRng::new(2)).unwrap();
    let view = GameView::default();
    let vp = Viewport::new(80, 24);
    let hud = Hud::default();

    let a = view.render(&run.snapshot(), Some(Coord::new(3, 3)), &hud, vp);
    let b = view.render(&run.snapshot(), Some(Coord::new(3, 4)), &hud, vp);

    let mut full = Vec::new();
    encode_diff_into(&FrameBuffer::new(80, 24), &b, &mut full).unwrap();
    let mut diff = Vec::new();
    encode_diff_into(&a, &b, &mut diff).unwrap();
    assert!(!diff.is_empty());
    assert!(diff.len() * 4 < full.len());
}
