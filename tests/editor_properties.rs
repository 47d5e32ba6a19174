//! End-to-end behaviour of the editor core, driven the way the UI drives it:
//! pointer events in viewport space, tool setters, history and lifecycle.

use image::{Rgba, RgbaImage};
use pixelfe::{
    BACKGROUND, CanvasController, Color, EditorError, EditorSettings, HistoryDirection,
};

const INK: Color = Rgba([20, 40, 60, 255]);

/// 32×32 canvas at zoom 10 in a 320×320 viewport (no centring offset).
fn editor() -> CanvasController {
    let mut c = CanvasController::new(32, 32).unwrap();
    c.set_zoom(10);
    c.set_viewport(320, 320);
    c.set_color(INK);
    c
}

/// Press at cell `(x, y)`, drag through the given cells, release.
fn stroke(c: &mut CanvasController, start: (u32, u32), drag: &[(u32, u32)]) {
    let z = c.tools().zoom() as i32;
    let (ox, oy) = c.composite_offset();
    let (ox, oy) = (ox as i32, oy as i32);
    let at = |(x, y): (u32, u32)| (ox + x as i32 * z + z / 2, oy + y as i32 * z + z / 2);
    let (sx, sy) = at(start);
    c.pointer_down(sx, sy);
    for &cell in drag {
        let (dx, dy) = at(cell);
        c.pointer_drag(dx, dy);
    }
    c.pointer_up();
}

fn all_cells(c: &CanvasController, color: Color) -> bool {
    let buf = c.buffer();
    (0..buf.height()).all(|y| (0..buf.width()).all(|x| buf.get(x, y) == Some(color)))
}

#[test]
fn new_canvas_is_blank_with_empty_history() {
    let mut c = editor();
    stroke(&mut c, (1, 1), &[(2, 2)]);
    for (w, h) in [(1, 1), (7, 3), (64, 16), (32, 32)] {
        c.new_canvas(w, h).unwrap();
        assert_eq!(c.buffer().dimensions(), (w as u32, h as u32));
        assert!(all_cells(&c, BACKGROUND));
        assert_eq!(c.history().undo_count(), 0);
        assert_eq!(c.history().redo_count(), 0);
    }
}

#[test]
fn invalid_dimensions_change_nothing() {
    let mut c = editor();
    stroke(&mut c, (3, 3), &[]);
    let before = c.buffer().clone();
    for (w, h) in [(0, 10), (10, 0), (-5, 5), (0, 0)] {
        assert!(matches!(
            c.new_canvas(w, h),
            Err(EditorError::InvalidDimensions { .. })
        ));
    }
    assert_eq!(c.buffer(), &before);
    assert_eq!(c.history().undo_count(), 1);
}

#[test]
fn undo_restores_state_before_last_press() {
    let mut c = editor();
    stroke(&mut c, (0, 0), &[(1, 0)]);
    let before_last = c.buffer().clone();

    c.set_brush_size(3);
    stroke(&mut c, (10, 10), &[(11, 10), (12, 10), (13, 11), (20, 20)]);
    assert_ne!(c.buffer(), &before_last);

    c.undo().unwrap();
    assert_eq!(c.buffer(), &before_last);
}

#[test]
fn undo_then_redo_is_identity() {
    let mut c = editor();
    stroke(&mut c, (5, 5), &[(6, 6)]);
    stroke(&mut c, (8, 2), &[]);
    let before_undo = c.buffer().clone();

    c.undo().unwrap();
    c.redo().unwrap();
    assert_eq!(c.buffer(), &before_undo);
    assert_eq!(c.history().undo_count(), 2);
    assert!(!c.can_redo());
}

#[test]
fn mutation_after_undo_clears_redo() {
    let mut c = editor();
    stroke(&mut c, (1, 1), &[]);
    c.undo().unwrap();
    assert!(c.can_redo());

    stroke(&mut c, (2, 2), &[]);
    let current = c.buffer().clone();
    assert!(matches!(
        c.redo(),
        Err(EditorError::EmptyHistory(HistoryDirection::Redo))
    ));
    assert_eq!(c.buffer(), &current);
}

#[test]
fn load_and_new_canvas_clear_redo_too() {
    let mut c = editor();
    stroke(&mut c, (1, 1), &[]);
    c.undo().unwrap();
    c.load_image(RgbaImage::from_pixel(4, 4, INK)).unwrap();
    assert!(!c.can_redo());
    assert!(!c.can_undo());

    stroke(&mut c, (0, 0), &[]);
    c.undo().unwrap();
    c.new_canvas(8, 8).unwrap();
    assert!(!c.can_redo());
}

#[test]
fn pointer_mapping_matches_zoom() {
    let mut c = editor();
    assert_eq!(c.pointer_down(305, 305), Some((30, 30)));
    assert_eq!(c.buffer().get(30, 30), Some(INK));
    c.pointer_up();

    let before = c.buffer().clone();
    let undo_depth = c.history().undo_count();
    assert_eq!(c.pointer_down(325, 5), None);
    c.pointer_up();
    assert_eq!(c.buffer(), &before);
    assert_eq!(c.history().undo_count(), undo_depth);
}

#[test]
fn size_three_brush_touches_nine_cells() {
    let mut c = editor();
    c.set_brush_size(3);
    stroke(&mut c, (5, 5), &[]);
    let painted = (0..32)
        .flat_map(|y| (0..32).map(move |x| (x, y)))
        .filter(|&(x, y)| c.buffer().get(x, y) == Some(INK))
        .count();
    assert_eq!(painted, 9);
}

#[test]
fn brush_at_edge_is_clipped_without_error() {
    let mut c = editor();
    c.set_brush_size(3);
    stroke(&mut c, (0, 0), &[(31, 31), (31, 0)]);
    assert_eq!(c.buffer().get(0, 0), Some(INK));
    assert_eq!(c.buffer().get(1, 1), Some(INK));
    assert_eq!(c.buffer().get(30, 30), Some(INK));
    assert_eq!(c.buffer().get(2, 2), Some(BACKGROUND));
    assert_eq!(c.buffer().dimensions(), (32, 32));
}

#[test]
fn export_matches_live_buffer() {
    let mut c = editor();
    stroke(&mut c, (4, 4), &[(5, 4)]);
    c.set_zoom(20);
    stroke(&mut c, (1, 1), &[]);
    c.undo().unwrap();
    c.redo().unwrap();

    let exported = c.export_image();
    assert_eq!(exported.dimensions(), c.buffer().dimensions());
    assert_eq!(&exported, c.buffer().as_rgba_image());

    // Exporting leaves state untouched.
    let generation = c.generation();
    let _ = c.export_image();
    assert_eq!(c.generation(), generation);
}

#[test]
fn grid_toggle_only_changes_composite() {
    let mut c = editor();
    stroke(&mut c, (3, 3), &[]);
    let pixels = c.buffer().clone();

    c.set_grid_visible(true);
    let with_grid = c.composite().clone();
    c.set_grid_visible(false);
    let without_grid = c.composite().clone();

    assert_eq!(c.buffer(), &pixels);
    assert_eq!(with_grid.dimensions(), (320, 320));
    assert_ne!(with_grid, without_grid);
    // Inside a cell, away from lines, both agree.
    assert_eq!(with_grid.get_pixel(35, 35), without_grid.get_pixel(35, 35));
    assert_eq!(*without_grid.get_pixel(35, 35), INK);
}

#[test]
fn composite_follows_every_change() {
    let mut c = editor();
    c.set_grid_visible(false);
    assert_eq!(c.composite().dimensions(), (320, 320));

    stroke(&mut c, (0, 0), &[]);
    assert_eq!(*c.composite().get_pixel(0, 0), INK);

    c.undo().unwrap();
    assert_eq!(*c.composite().get_pixel(0, 0), BACKGROUND);

    c.set_zoom(5);
    assert_eq!(c.composite().dimensions(), (160, 160));

    c.new_canvas(3, 2).unwrap();
    assert_eq!(c.composite().dimensions(), (15, 10));
}

#[test]
fn centred_canvas_in_larger_viewport() {
    let mut c = CanvasController::new(8, 8).unwrap();
    c.set_zoom(10);
    c.set_color(INK);
    c.set_viewport(200, 100);
    // 80×80 composite centred at (60, 10).
    assert_eq!(c.composite_offset(), (60, 10));
    assert_eq!(c.pointer_down(60, 10), Some((0, 0)));
    assert_eq!(c.pointer_drag(139, 89), Some((7, 7)));
    assert_eq!(c.pointer_drag(140, 50), None);
    assert_eq!(c.pointer_drag(59, 50), None);
    c.pointer_up();
    assert_eq!(c.history().undo_count(), 1);
}

#[test]
fn composite_stays_within_configured_edge() {
    let mut c = CanvasController::with_settings(&EditorSettings::default()).unwrap();
    c.new_canvas(1024, 1024).unwrap();
    c.set_zoom(20);
    let (w, h) = c.composite_size();
    assert!(w <= 8192 && h <= 8192);

    let before = c.buffer().clone();
    assert!(matches!(
        c.load_image(RgbaImage::new(4000, 3000)),
        Err(EditorError::InvalidDimensions { .. })
    ));
    assert_eq!(c.buffer(), &before);
}
