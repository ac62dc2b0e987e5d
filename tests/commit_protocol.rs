use egui::pos2;
use pixel_gene::{
    BufferId, EditorConfig, EditorError, EditorState, InputEvent, LayerId, PointerEvent, Rgba,
    ScreenRaster, Size, ToolKind, rectangle_fill_color,
};

const PIXEL_SIZE: u32 = 5;

fn editor() -> EditorState {
    EditorState::new(EditorConfig {
        size: Size::new(40, 30),
        pixel_size: PIXEL_SIZE,
        ..EditorConfig::default()
    })
    .unwrap()
}

fn cell(x: i32, y: i32) -> PointerEvent {
    let s = PIXEL_SIZE as f32;
    PointerEvent::at(pos2(x as f32 * s + s / 2.0, y as f32 * s + s / 2.0))
}

/// Presses at the first cell, moves through the rest and releases at the last.
fn drag(state: &mut EditorState, raster: &mut ScreenRaster, path: &[(i32, i32)]) {
    let (first, rest) = path.split_first().unwrap();
    state.handle_input(&InputEvent::PointerDown(cell(first.0, first.1)), raster);
    for &(x, y) in rest {
        state.handle_input(&InputEvent::PointerMove(cell(x, y)), raster);
    }
    let &(x, y) = path.last().unwrap();
    state.handle_input(&InputEvent::PointerUp(cell(x, y)), raster);
}

#[test]
fn test_commit_moves_edits_into_layer() {
    let mut state = editor();
    let mut raster = ScreenRaster::new(1, 1);
    state.start_buffer();
    drag(&mut state, &mut raster, &[(3, 3), (4, 3), (5, 3)]);

    let layer = state.current_layer().unwrap();
    assert_eq!(layer.committed_buffers().len(), 1);
    assert_eq!(layer.merged_buffer().pixel_at(4, 3), Some(Rgba::GREEN));
    assert_eq!(state.merged_committed_buffer().pixel_at(4, 3), Some(Rgba::GREEN));
    assert_eq!(state.merged_committed_buffer().pixel_at(5, 3), Some(Rgba::GREEN));
    assert!(state.current_buffer().is_none());

    // a fresh edit does not carry the committed pixels
    state.start_buffer();
    assert!(state.current_buffer().unwrap().is_blank());
}

#[test]
fn test_commit_redraws_screen() {
    let mut state = editor();
    let mut raster = ScreenRaster::new(1, 1);
    drag(&mut state, &mut raster, &[(3, 3), (4, 3)]);

    assert_eq!(raster.size(), [40 * PIXEL_SIZE as usize, 30 * PIXEL_SIZE as usize]);
    let green = Rgba::GREEN.to_color32();
    assert_eq!(raster.pixel(4 * PIXEL_SIZE, 3 * PIXEL_SIZE), Some(green));
    assert_eq!(raster.pixel(4 * PIXEL_SIZE + 4, 3 * PIXEL_SIZE + 4), Some(green));
    // background shows through everywhere else
    assert_eq!(raster.pixel(0, 0), Some(Rgba::WHITE.to_color32()));
}

#[test]
fn test_upper_layer_wins_and_hiding_reveals_lower() {
    let mut state = editor();
    let mut raster = ScreenRaster::new(1, 1);
    drag(&mut state, &mut raster, &[(2, 2), (2, 3)]);

    let top = state.add_layer();
    assert_eq!(state.current_layer_id(), Some(LayerId(1)));
    state.select_layer(top).unwrap();
    state.set_tool(ToolKind::Rectangle).unwrap();
    drag(&mut state, &mut raster, &[(2, 2), (3, 3)]);

    let merged = state.merged_committed_buffer();
    assert_eq!(merged.pixel_at(2, 3), Some(rectangle_fill_color(2, 3)));

    state.set_layer_visibility(top, false).unwrap();
    assert!(state.layer(top).unwrap().is_hidden());
    assert_eq!(state.merged_committed_buffer().pixel_at(2, 3), Some(Rgba::GREEN));
    assert_eq!(state.merged_committed_buffer().pixel_at(3, 3), Some(Rgba::TRANSPARENT));

    state.set_layer_visibility(LayerId(1), false).unwrap();
    assert!(state.merged_committed_buffer().is_blank());

    state.set_layer_visibility(top, true).unwrap();
    state.set_layer_visibility(LayerId(1), true).unwrap();
    assert_eq!(state.merged_committed_buffer().pixel_at(2, 3), Some(rectangle_fill_color(2, 3)));
}

#[test]
fn test_remove_layer() {
    let mut state = editor();
    let second = state.add_layer();
    let third = state.add_layer();
    assert_eq!(state.layer(third).unwrap().name(), "Layer 3");

    state.select_layer(second).unwrap();
    let removed = state.remove_layer(second).unwrap();
    assert_eq!(removed.id(), second);
    assert_eq!(state.current_layer_id(), Some(third));
    assert_eq!(state.layers().len(), 2);

    assert!(matches!(state.remove_layer(second), Err(EditorError::UnknownLayer(id)) if id == second));
    assert!(matches!(state.select_layer(LayerId(99)), Err(EditorError::UnknownLayer(_))));
}

#[test]
fn test_committed_buffer_visibility_and_delete() {
    let mut state = editor();
    let mut raster = ScreenRaster::new(1, 1);
    drag(&mut state, &mut raster, &[(1, 1), (1, 2)]);
    drag(&mut state, &mut raster, &[(6, 6), (6, 7)]);

    let layer = state.current_layer().unwrap();
    let ids: Vec<BufferId> = layer.committed_buffers().iter().map(|b| b.id()).collect();
    assert_eq!(ids.len(), 2);

    assert!(state.set_committed_buffer_visibility(LayerId(1), ids[0], false).unwrap());
    assert_eq!(state.merged_committed_buffer().pixel_at(1, 2), Some(Rgba::TRANSPARENT));
    assert_eq!(state.merged_committed_buffer().pixel_at(6, 7), Some(Rgba::GREEN));

    let deleted = state.delete_committed_buffer(LayerId(1), ids[1]).unwrap();
    assert_eq!(deleted.map(|b| b.id()), Some(ids[1]));
    assert!(state.merged_committed_buffer().is_blank());

    assert!(!state.set_committed_buffer_visibility(LayerId(1), ids[1], true).unwrap());
    assert!(state.delete_committed_buffer(LayerId(1), ids[1]).unwrap().is_none());
    assert!(state.delete_committed_buffer(LayerId(7), ids[0]).is_err());
}

#[test]
fn test_preview_shows_live_edit_without_background() {
    let mut state = editor();
    let mut raster = ScreenRaster::new(1, 1);
    drag(&mut state, &mut raster, &[(1, 1), (2, 1)]);

    state.handle_input(&InputEvent::PointerDown(cell(8, 8)), &mut raster);
    state.handle_input(&InputEvent::PointerMove(cell(9, 8)), &mut raster);
    state.render(&mut raster, None);

    let preview = state.preview_buffer();
    assert_eq!(preview.pixel_at(2, 1), Some(Rgba::GREEN));
    assert_eq!(preview.pixel_at(9, 8), Some(Rgba::GREEN));
    assert_eq!(preview.pixel_at(0, 0), Some(Rgba::TRANSPARENT));
    // the composite does carry the checkerboard
    assert_eq!(state.composite().pixel_at(0, 0), Some(Rgba::WHITE));
}
