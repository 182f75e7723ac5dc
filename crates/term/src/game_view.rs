//! GameView: maps a `core::BoardView` into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::{BoardView, CellView, PhaseView};
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{ColorId, Coord, SpecialKind, Token, STAR_COUNT};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Side panel facts that are not part of the board view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hud<'a> {
    pub level_name: &'a str,
    /// Remote control adapter is listening.
    pub remote: bool,
}

const BOARD_BG: Rgb = Rgb::new(30, 30, 40);
const JELLY_BG: Rgb = Rgb::new(75, 40, 70);
const CURSOR_FG: Rgb = Rgb::new(250, 250, 250);
const HIGHLIGHT: Rgb = Rgb::new(255, 255, 255);

/// Token color for a palette entry.
pub fn color_rgb(color: ColorId) -> Rgb {
    match color {
        0 => Rgb::new(225, 70, 70),
        1 => Rgb::new(245, 150, 50),
        2 => Rgb::new(240, 220, 80),
        3 => Rgb::new(90, 200, 110),
        4 => Rgb::new(80, 130, 235),
        5 => Rgb::new(185, 100, 225),
        _ => Rgb::new(200, 200, 200),
    }
}

/// Glyph drawn for a token.
pub fn token_glyph(token: Token) -> char {
    match token.special {
        SpecialKind::None => '●',
        SpecialKind::StripedRow => '═',
        SpecialKind::StripedCol => '║',
        SpecialKind::Wrapped => '▣',
        SpecialKind::ColorBomb => '✹',
    }
}

/// A terminal renderer for one board.
pub struct GameView {
    /// Board cell width in terminal columns; the outer two hold cursor marks.
    cell_w: u16,
}

impl Default for GameView {
    fn default() -> Self {
        Self { cell_w: 3 }
    }
}

impl GameView {
    /// Render into an existing framebuffer, resizing it to the viewport.
    pub fn render_into(
        &self,
        view: &BoardView,
        cursor: Option<Coord>,
        hud: &Hud<'_>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default());

        let rows = view.rows.max(0) as u16;
        let cols = view.cols.max(0) as u16;
        let frame_w = cols * self.cell_w + 2;
        let frame_h = rows + 2;

        // Leave room for the side panel when the terminal is wide enough.
        let start_x = viewport.width.saturating_sub(frame_w + 30) / 2;
        let start_y = viewport.height.saturating_sub(frame_h) / 2;

        self.draw_border(fb, start_x, start_y, frame_w, frame_h);

        for row in 0..view.rows {
            for col in 0..view.cols {
                let at = Coord::new(row, col);
                self.draw_cell(fb, view, at, cursor == Some(at), start_x, start_y);
            }
        }

        self.draw_side_panel(fb, view, hud, viewport, start_x + frame_w + 2, start_y);

        match view.phase {
            PhaseView::Complete => {
                self.draw_overlay_text(fb, start_x, start_y, frame_w, frame_h, " LEVEL COMPLETE ")
            }
            PhaseView::Failed => {
                self.draw_overlay_text(fb, start_x, start_y, frame_w, frame_h, " OUT OF MOVES ")
            }
            _ => {}
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(
        &self,
        view: &BoardView,
        cursor: Option<Coord>,
        hud: &Hud<'_>,
        viewport: Viewport,
    ) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(view, cursor, hud, viewport, &mut fb);
        fb
    }

    fn draw_border(&self, fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16) {
        if w < 2 || h < 2 {
            return;
        }
        let style = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));
        fb.put_char(x, y, '╭', style);
        fb.put_char(x + w - 1, y, '╮', style);
        fb.put_char(x, y + h - 1, '╰', style);
        fb.put_char(x + w - 1, y + h - 1, '╯', style);
        for dx in 1..w - 1 {
            fb.put_char(x + dx, y, '─', style);
            fb.put_char(x + dx, y + h - 1, '─', style);
        }
        for dy in 1..h - 1 {
            fb.put_char(x, y + dy, '│', style);
            fb.put_char(x + w - 1, y + dy, '│', style);
        }
    }

    fn draw_cell(
        &self,
        fb: &mut FrameBuffer,
        view: &BoardView,
        at: Coord,
        is_cursor: bool,
        start_x: u16,
        start_y: u16,
    ) {
        let px = start_x + 1 + at.col as u16 * self.cell_w;
        let py = start_y + 1 + at.row as u16;
        let is_selected = view.selected == Some(at);

        let mut bg = if view.has_jelly(at) { JELLY_BG } else { BOARD_BG };
        if is_selected {
            bg = bg.mix(HIGHLIGHT, 170);
        }

        let (glyph, style) = match view.cell(at) {
            CellView::Inactive => {
                // Holes in the shape stay blank, even under the cursor.
                fb.fill_rect(px, py, self.cell_w, 1, ' ', CellStyle::default());
                if !is_cursor {
                    return;
                }
                (' ', CellStyle::default())
            }
            CellView::Empty => ('·', CellStyle::new(Rgb::new(90, 90, 100), bg).dim()),
            CellView::Token(token) => {
                let style = CellStyle::new(color_rgb(token.color), bg);
                let style = if token.is_special() { style.bold() } else { style };
                (token_glyph(token), style)
            }
        };

        fb.fill_rect(px, py, self.cell_w, 1, ' ', style);
        fb.put_char(px + self.cell_w / 2, py, glyph, style);
        if is_cursor {
            let mark = CellStyle::new(CURSOR_FG, style.bg).bold();
            fb.put_char(px, py, '[', mark);
            fb.put_char(px + self.cell_w - 1, py, ']', mark);
        }
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        view: &BoardView,
        hud: &Hud<'_>,
        viewport: Viewport,
        panel_x: u16,
        start_y: u16,
    ) {
        if panel_x >= viewport.width || viewport.width - panel_x < 14 {
            return;
        }

        let label = CellStyle::default().bold();
        let value = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));
        let dim = value.dim();

        let mut y = start_y;
        let mut line = |fb: &mut FrameBuffer, text: &str, style: CellStyle, gap: u16| {
            fb.put_str(panel_x, y, text, style);
            y = y.saturating_add(1 + gap);
        };

        line(fb, &format!("LEVEL {}", view.level_id), label, 0);
        line(fb, hud.level_name, value, 1);

        line(fb, "SCORE", label, 0);
        line(fb, &view.score.to_string(), value, 1);

        line(fb, "MOVES", label, 0);
        line(fb, &format!("{}/{}", view.moves_remaining, view.move_limit), value, 1);

        line(fb, "STARS", label, 0);
        let stars: String = (0..STAR_COUNT)
            .map(|i| if i < view.stars as usize { '★' } else { '☆' })
            .collect();
        line(fb, &stars, CellStyle::new(Rgb::new(240, 210, 80), Rgb::new(0, 0, 0)), 1);

        line(fb, "GOAL", label, 0);
        line(fb, &view.objective_text, value, 0);
        for p in &view.objective {
            let style = if p.is_met() { value.bold() } else { dim };
            let text = format!("{} {}/{}", p.label, p.current.min(p.target), p.target);
            line(fb, &text, style, 0);
        }
        y = y.saturating_add(1);

        if view.cascade_depth > 0 {
            fb.put_str(panel_x, y, &format!("CASCADE x{}", view.cascade_depth + 1), label);
        }
        y = y.saturating_add(2);

        let remote = if hud.remote { "REMOTE ON" } else { "REMOTE OFF" };
        fb.put_str(panel_x, y, remote, dim);
        y = y.saturating_add(1);
        let help = [
            "arrows/hjkl move",
            "space select  esc cancel",
            "r restart  n/p level",
            "q quit",
        ];
        for help in help {
            fb.put_str(panel_x, y, help, dim);
            y = y.saturating_add(1);
        }
    }

    fn draw_overlay_text(
        &self,
        fb: &mut FrameBuffer,
        start_x: u16,
        start_y: u16,
        frame_w: u16,
        frame_h: u16,
        text: &str,
    ) {
        let mid_y = start_y.saturating_add(frame_h / 2);
        let text_w = text.chars().count() as u16;
        let x = start_x.saturating_add(frame_w.saturating_sub(text_w) / 2);
        let style = CellStyle::new(Rgb::new(255, 255, 255), Rgb::new(0, 0, 0)).bold();
        fb.put_str(x, mid_y, text, style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LevelConfig, Objective, RunState, SimpleRng};

    fn view() -> BoardView {
        let level = LevelConfig::new(
            4,
            4,
            9,
            4,
            Objective::CollectColors {
                targets: vec![(0, 5)],
            },
            [10, 20, 30],
        )
        .with_id(2, "Tiny")
        .with_shape(vec![
            vec![false, true, true, true],
            vec![true; 4],
            vec![true; 4],
            vec![true; 4],
        ]);
        RunState::start_attempt(level, SimpleRng::new(5))
            .unwrap()
            .snapshot()
    }

    fn text(fb: &FrameBuffer) -> String {
        (0..fb.height()).map(|y| fb.row_text(y) + "\n").collect()
    }

    #[test]
    fn renders_board_and_panel() {
        let hud = Hud {
            level_name: "Tiny",
            remote: false,
        };
        let fb = GameView::default().render(&view(), None, &hud, Viewport::new(80, 24));
        let out = text(&fb);
        assert!(out.contains("LEVEL 2"));
        assert!(out.contains("Tiny"));
        assert!(out.contains("9/9"));
        assert!(out.contains("Collect 5 red"));
        assert!(out.contains("red 0/5"));
        assert!(out.contains("REMOTE OFF"));
        assert_eq!(out.matches('●').count(), 15);
    }

    #[test]
    fn cursor_is_bracketed() {
        let cursor = Some(Coord::new(1, 1));
        let fb = GameView::default().render(&view(), cursor, &Hud::default(), Viewport::new(80, 24));
        let out = text(&fb);
        assert_eq!(out.matches('[').count(), 1);
        assert_eq!(out.matches(']').count(), 1);
    }

    #[test]
    fn tiny_viewport_does_not_panic() {
        let cursor = Some(Coord::new(3, 3));
        let fb = GameView::default().render(&view(), cursor, &Hud::default(), Viewport::new(5, 3));
        assert_eq!(fb.width(), 5);
    }

    #[test]
    fn failed_phase_shows_overlay() {
        let mut v = view();
        v.phase = PhaseView::Failed;
        let fb = GameView::default().render(&v, None, &Hud::default(), Viewport::new(80, 24));
        assert!(text(&fb).contains("OUT OF MOVES"));
    }
}
