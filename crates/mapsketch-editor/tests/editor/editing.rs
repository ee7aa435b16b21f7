use mapsketch_core::EditorError;
use mapsketch_editor::{
    Bounds, Cursor, DragTarget, EdgeRef, EditOutcome, EditorState, Geometry, HandleKind, Point,
    ShapeEditor, ShapeKind, VertexRef,
};
use mapsketch_settings::Config;

use crate::{outer_ring, p, square, Fixture};

fn editing(fx: &Fixture, geometry: Geometry, at: Point) -> ShapeEditor {
    let editor = fx.placed(geometry);
    assert_eq!(editor.on_secondary_activation(at), Ok(EditOutcome::EnteredEditing));
    editor
}

fn editing_rectangle(fx: &Fixture, bounds: Bounds) -> ShapeEditor {
    let editor = fx.placed_as(ShapeKind::Rectangle, Geometry::rectangle(bounds));
    assert_eq!(editor.start_editing(), Ok(EditOutcome::EnteredEditing));
    editor
}

fn strict() -> Fixture {
    let mut config = Config::default();
    config.editor.move_throttle_ms = 0;
    config.editor.allow_self_intersect = false;
    Fixture::with_config(config)
}

fn drag(editor: &ShapeEditor, from: (f64, f64), to: (f64, f64)) {
    assert!(matches!(
        editor.on_pointer_down(p(from.0, from.1)),
        Ok(EditOutcome::DragStarted(_)) | Ok(EditOutcome::VertexInserted(_))
    ));
    assert!(matches!(
        editor.on_pointer_move(p(to.0, to.1)),
        Ok(EditOutcome::Dragged { .. })
    ));
    assert_eq!(editor.on_pointer_up(), Ok(EditOutcome::DragEnded { changed: true }));
}

#[test]
fn test_enter_editing_on_own_shape() {
    let fx = Fixture::new();
    let editor = fx.placed(square(0.0, 0.0, 100.0));
    assert_eq!(editor.state(), EditorState::Idle);
    assert!(editor.handles().is_empty());

    assert_eq!(
        editor.on_secondary_activation(p(500.0, 500.0)),
        Ok(EditOutcome::Ignored)
    );
    assert_eq!(
        editor.on_secondary_activation(p(50.0, 50.0)),
        Ok(EditOutcome::EnteredEditing)
    );
    assert_eq!(editor.state(), EditorState::Editing);
    assert!(editor.is_active());
    assert_eq!(fx.view.borrow().cursor(), Cursor::Pointer);
    assert!(!fx.interactions_enabled());
}

#[test]
fn test_handles_include_midpoints() {
    let fx = Fixture::new();
    let editor = editing(&fx, square(0.0, 0.0, 100.0), p(50.0, 50.0));
    let handles = editor.handles();
    assert_eq!(handles.len(), 8);
    let midpoint = handles
        .iter()
        .find(|h| h.kind == HandleKind::Midpoint(EdgeRef::new(0, 0, 0)))
        .expect("first edge midpoint");
    assert_eq!(midpoint.position, p(50.0, 0.0));
}

#[test]
fn test_vertex_drag_and_undo() {
    let fx = Fixture::new();
    let editor = editing(&fx, square(0.0, 0.0, 100.0), p(50.0, 50.0));

    assert_eq!(
        editor.on_pointer_down(p(100.0, 100.0)),
        Ok(EditOutcome::DragStarted(DragTarget::Vertex(VertexRef::new(0, 0, 2))))
    );
    assert_eq!(
        editor.on_pointer_move(p(120.0, 120.0)),
        Ok(EditOutcome::Dragged { valid: true })
    );
    assert_eq!(editor.on_pointer_up(), Ok(EditOutcome::DragEnded { changed: true }));
    assert_eq!(outer_ring(&editor)[2], p(120.0, 120.0));
    assert!(editor.can_undo());

    assert_eq!(editor.undo(), Ok(EditOutcome::Undone));
    assert_eq!(editor.geometry(), Some(square(0.0, 0.0, 100.0)));
    assert!(editor.can_redo());
    assert_eq!(editor.redo(), Ok(EditOutcome::Redone));
    assert_eq!(outer_ring(&editor)[2], p(120.0, 120.0));
}

#[test]
fn test_click_without_move_records_nothing() {
    let fx = Fixture::new();
    let editor = editing(&fx, square(0.0, 0.0, 100.0), p(50.0, 50.0));
    editor.on_pointer_down(p(0.0, 0.0)).expect("down");
    assert_eq!(editor.on_pointer_up(), Ok(EditOutcome::DragEnded { changed: false }));
    assert!(!editor.can_undo());
}

#[test]
fn test_n_edits_then_n_undos() {
    let fx = Fixture::new();
    let original = square(0.0, 0.0, 100.0);
    let editor = editing(&fx, original.clone(), p(50.0, 50.0));

    drag(&editor, (0.0, 0.0), (-10.0, -10.0));
    drag(&editor, (100.0, 0.0), (110.0, -10.0));
    drag(&editor, (100.0, 100.0), (110.0, 110.0));

    for _ in 0..3 {
        assert_eq!(editor.undo(), Ok(EditOutcome::Undone));
    }
    assert_eq!(editor.geometry(), Some(original));
    assert_eq!(editor.undo(), Ok(EditOutcome::Ignored));
}

#[test]
fn test_reset_to_initial() {
    let fx = Fixture::new();
    let original = square(0.0, 0.0, 100.0);
    let editor = editing(&fx, original.clone(), p(50.0, 50.0));
    drag(&editor, (0.0, 0.0), (-10.0, -10.0));
    drag(&editor, (100.0, 0.0), (110.0, -10.0));

    assert_eq!(editor.reset_to_initial(), Ok(EditOutcome::Reset));
    assert_eq!(editor.geometry(), Some(original));
    assert_eq!(editor.state(), EditorState::Editing);
    assert!(!editor.can_undo());
}

#[test]
fn test_midpoint_press_inserts_vertex() {
    let fx = Fixture::new();
    let editor = editing(&fx, square(0.0, 0.0, 100.0), p(50.0, 50.0));

    assert_eq!(
        editor.on_pointer_down(p(50.0, 0.0)),
        Ok(EditOutcome::VertexInserted(VertexRef::new(0, 0, 1)))
    );
    assert_eq!(outer_ring(&editor).len(), 5);
    assert_eq!(outer_ring(&editor)[1], p(50.0, 0.0));

    // the new vertex follows the pointer
    editor.on_pointer_move(p(50.0, -20.0)).expect("move");
    assert_eq!(editor.on_pointer_up(), Ok(EditOutcome::DragEnded { changed: true }));
    assert_eq!(outer_ring(&editor)[1], p(50.0, -20.0));

    editor.undo().expect("undo drag");
    assert_eq!(outer_ring(&editor)[1], p(50.0, 0.0));
    editor.undo().expect("undo insertion");
    assert_eq!(outer_ring(&editor).len(), 4);
}

#[test]
fn test_insert_vertex_by_edge() {
    let fx = Fixture::new();
    let editor = editing(&fx, square(0.0, 0.0, 100.0), p(50.0, 50.0));
    assert_eq!(
        editor.insert_vertex(EdgeRef::new(0, 0, 3)),
        Ok(EditOutcome::VertexInserted(VertexRef::new(0, 0, 4)))
    );
    assert_eq!(outer_ring(&editor)[4], p(0.0, 50.0));
    assert!(matches!(
        editor.insert_vertex(EdgeRef::new(0, 0, 9)),
        Err(EditorError::VertexNotFound { .. })
    ));
}

#[test]
fn test_context_action_removes_vertex_down_to_floor() {
    let fx = Fixture::new();
    let editor = editing(&fx, square(0.0, 0.0, 100.0), p(50.0, 50.0));

    assert_eq!(
        editor.on_context_action(p(0.0, 0.0)),
        Ok(EditOutcome::VertexRemoved(VertexRef::new(0, 0, 0)))
    );
    assert_eq!(outer_ring(&editor).len(), 3);

    assert_eq!(
        editor.on_context_action(p(100.0, 0.0)),
        Err(EditorError::VertexFloor { minimum: 3 })
    );
    assert_eq!(outer_ring(&editor).len(), 3);
}

#[test]
fn test_line_keeps_two_vertices() {
    let fx = Fixture::new();
    let line = Geometry::LineString(vec![p(0.0, 0.0), p(100.0, 0.0), p(200.0, 0.0)]);
    let editor = editing(&fx, line, p(50.0, 1.0));

    assert_eq!(
        editor.remove_vertex(VertexRef::new(0, 0, 1)),
        Ok(EditOutcome::VertexRemoved(VertexRef::new(0, 0, 1)))
    );
    assert_eq!(
        editor.remove_vertex(VertexRef::new(0, 0, 0)),
        Err(EditorError::VertexFloor { minimum: 2 })
    );
}

#[test]
fn test_line_midpoint_insertion() {
    let fx = Fixture::new();
    let line = Geometry::LineString(vec![p(0.0, 0.0), p(100.0, 0.0)]);
    let editor = editing(&fx, line, p(10.0, 2.0));
    // open lines have no closing edge
    assert_eq!(editor.handles().len(), 3);
    assert_eq!(
        editor.on_pointer_down(p(50.0, 0.0)),
        Ok(EditOutcome::VertexInserted(VertexRef::new(0, 0, 1)))
    );
}

#[test]
fn test_rectangle_corner_drag_keeps_rectangle() {
    let fx = Fixture::new();
    let editor = editing_rectangle(&fx, Bounds::new(0.0, 0.0, 100.0, 100.0));

    drag(&editor, (100.0, 100.0), (200.0, 150.0));
    assert_eq!(
        editor.geometry(),
        Some(Geometry::rectangle(Bounds::new(0.0, 0.0, 200.0, 150.0)))
    );
}

#[test]
fn test_rectangle_edge_drag_moves_one_side() {
    let fx = Fixture::new();
    let editor = editing_rectangle(&fx, Bounds::new(0.0, 0.0, 100.0, 100.0));

    assert_eq!(
        editor.on_pointer_down(p(100.0, 50.0)),
        Ok(EditOutcome::DragStarted(DragTarget::Edge(EdgeRef::new(0, 0, 1))))
    );
    editor.on_pointer_move(p(140.0, 70.0)).expect("move");
    editor.on_pointer_up().expect("up");
    assert_eq!(
        editor.geometry(),
        Some(Geometry::rectangle(Bounds::new(0.0, 0.0, 140.0, 100.0)))
    );
}

#[test]
fn test_rectangle_has_no_vertex_removal() {
    let fx = Fixture::new();
    let editor = editing_rectangle(&fx, Bounds::new(0.0, 0.0, 100.0, 100.0));
    assert!(matches!(
        editor.remove_vertex(VertexRef::new(0, 0, 0)),
        Err(EditorError::Unsupported { .. })
    ));
}

#[test]
fn test_circle_body_drag() {
    let fx = Fixture::new();
    let circle = Geometry::Circle {
        center: p(0.0, 0.0),
        radius: 50.0,
    };
    let editor = editing(&fx, circle, p(10.0, 10.0));
    assert!(editor.handles().is_empty());

    assert_eq!(
        editor.on_pointer_down(p(10.0, 10.0)),
        Ok(EditOutcome::DragStarted(DragTarget::Body))
    );
    editor.on_pointer_move(p(40.0, 50.0)).expect("move");
    assert_eq!(editor.on_pointer_up(), Ok(EditOutcome::DragEnded { changed: true }));
    assert_eq!(
        editor.geometry(),
        Some(Geometry::Circle {
            center: p(30.0, 40.0),
            radius: 50.0
        })
    );
}

#[test]
fn test_points_are_not_editable() {
    let fx = Fixture::new();
    let editor = fx.placed(Geometry::Point(p(5.0, 5.0)));
    assert_eq!(editor.kind(), ShapeKind::Point);
    assert_eq!(editor.on_secondary_activation(p(5.0, 5.0)), Ok(EditOutcome::Ignored));
    assert!(matches!(
        editor.start_editing(),
        Err(EditorError::Unsupported { .. })
    ));
}

#[test]
fn test_commit_ends_editing() {
    let fx = Fixture::new();
    let editor = editing(&fx, square(0.0, 0.0, 100.0), p(50.0, 50.0));
    drag(&editor, (0.0, 0.0), (-10.0, -10.0));

    assert_eq!(editor.commit(), Ok(EditOutcome::Committed));
    assert_eq!(editor.state(), EditorState::Idle);
    assert!(!editor.is_active());
    assert!(editor.handles().is_empty());
    assert!(!editor.can_undo());
    assert!(fx.interactions_enabled());
    assert_eq!(outer_ring(&editor)[0], p(-10.0, -10.0));

    assert!(matches!(editor.commit(), Err(EditorError::InvalidState { .. })));
    assert_eq!(editor.undo(), Ok(EditOutcome::Ignored));
}

#[test]
fn test_cancel_restores_entry_geometry() {
    let fx = Fixture::new();
    let original = square(0.0, 0.0, 100.0);
    let editor = editing(&fx, original.clone(), p(50.0, 50.0));
    drag(&editor, (0.0, 0.0), (-10.0, -10.0));

    assert_eq!(editor.cancel(), Ok(EditOutcome::Cancelled));
    assert_eq!(editor.geometry(), Some(original));
    assert_eq!(editor.state(), EditorState::Idle);
    assert!(fx.interactions_enabled());
}

#[test]
fn test_start_editing_directly() {
    let fx = Fixture::new();
    let editor = fx.placed(square(0.0, 0.0, 100.0));
    assert_eq!(editor.start_editing(), Ok(EditOutcome::EnteredEditing));
    assert!(matches!(
        editor.start_editing(),
        Err(EditorError::InvalidState { .. })
    ));
}

#[test]
fn test_vertex_drag_snaps_to_neighbour() {
    let fx = Fixture::new();
    let editor = editing(&fx, square(0.0, 0.0, 100.0), p(50.0, 50.0));
    editor.set_snap_sources(&[square(200.0, 0.0, 100.0)]);

    editor.on_pointer_down(p(100.0, 0.0)).expect("down");
    editor.on_pointer_move(p(195.0, 3.0)).expect("move");
    editor.on_pointer_up().expect("up");
    assert_eq!(outer_ring(&editor)[1], p(200.0, 0.0));
}

#[test]
fn test_self_intersecting_vertex_drag_is_rolled_back() {
    let fx = strict();
    let editor = editing(&fx, square(0.0, 0.0, 100.0), p(50.0, 50.0));

    editor.on_pointer_down(p(100.0, 100.0)).expect("down");
    assert_eq!(
        editor.on_pointer_move(p(50.0, -50.0)),
        Ok(EditOutcome::Dragged { valid: false })
    );
    assert_eq!(editor.on_pointer_up(), Ok(EditOutcome::DragReverted));

    assert_eq!(editor.geometry(), Some(square(0.0, 0.0, 100.0)));
    assert_eq!(editor.shape().map(|s| s.valid), Some(true));
    assert!(!editor.can_undo());

    assert_eq!(editor.commit(), Ok(EditOutcome::Committed));
    assert_eq!(editor.geometry(), Some(square(0.0, 0.0, 100.0)));
}

#[test]
fn test_self_intersecting_midpoint_drag_keeps_insertion_only() {
    let fx = strict();
    let editor = editing(&fx, square(0.0, 0.0, 100.0), p(50.0, 50.0));

    assert!(matches!(
        editor.on_pointer_down(p(50.0, 0.0)),
        Ok(EditOutcome::VertexInserted(_))
    ));
    assert_eq!(
        editor.on_pointer_move(p(50.0, 150.0)),
        Ok(EditOutcome::Dragged { valid: false })
    );
    assert_eq!(editor.on_pointer_up(), Ok(EditOutcome::DragReverted));

    let ring = outer_ring(&editor);
    assert_eq!(ring.len(), 5);
    assert_eq!(ring[1], p(50.0, 0.0));
    assert_eq!(editor.undo(), Ok(EditOutcome::Undone));
    assert_eq!(editor.geometry(), Some(square(0.0, 0.0, 100.0)));
}

#[test]
fn test_valid_drag_still_recorded_with_validation_on() {
    let fx = strict();
    let editor = editing(&fx, square(0.0, 0.0, 100.0), p(50.0, 50.0));
    drag(&editor, (100.0, 100.0), (120.0, 130.0));
    assert_eq!(outer_ring(&editor)[2], p(120.0, 130.0));
    assert!(editor.can_undo());
}

#[test]
fn test_commit_refuses_invalid_shape_mid_drag() {
    let fx = strict();
    let editor = editing(&fx, square(0.0, 0.0, 100.0), p(50.0, 50.0));

    editor.on_pointer_down(p(100.0, 100.0)).expect("down");
    editor.on_pointer_move(p(50.0, -50.0)).expect("move");
    assert!(matches!(
        editor.commit(),
        Err(EditorError::InvalidGeometry { .. })
    ));
    assert_eq!(editor.state(), EditorState::Editing);

    assert_eq!(editor.on_pointer_up(), Ok(EditOutcome::DragReverted));
    assert_eq!(editor.commit(), Ok(EditOutcome::Committed));
    assert_eq!(editor.geometry(), Some(square(0.0, 0.0, 100.0)));
}

#[test]
fn test_collapsed_rectangle_drag_is_rolled_back() {
    let fx = Fixture::new();
    let bounds = Bounds::new(0.0, 0.0, 100.0, 100.0);
    let editor = editing_rectangle(&fx, bounds);

    editor.on_pointer_down(p(100.0, 100.0)).expect("down");
    assert_eq!(
        editor.on_pointer_move(p(0.0, 0.0)),
        Ok(EditOutcome::Dragged { valid: false })
    );
    assert_eq!(editor.on_pointer_up(), Ok(EditOutcome::DragReverted));
    assert_eq!(editor.geometry(), Some(Geometry::rectangle(bounds)));

    // Edge handles still work on the restored rectangle.
    assert_eq!(
        editor.on_pointer_down(p(100.0, 50.0)),
        Ok(EditOutcome::DragStarted(DragTarget::Edge(EdgeRef::new(0, 0, 1))))
    );
    editor.on_pointer_move(p(150.0, 50.0)).expect("move");
    assert_eq!(editor.on_pointer_up(), Ok(EditOutcome::DragEnded { changed: true }));
    assert_eq!(
        editor.geometry(),
        Some(Geometry::rectangle(Bounds::new(0.0, 0.0, 150.0, 100.0)))
    );
    assert_eq!(editor.commit(), Ok(EditOutcome::Committed));
}

#[test]
fn test_rectangle_collapsed_onto_a_side_is_rolled_back() {
    let fx = Fixture::new();
    let bounds = Bounds::new(0.0, 0.0, 100.0, 100.0);
    let editor = editing_rectangle(&fx, bounds);

    editor.on_pointer_down(p(100.0, 50.0)).expect("down");
    editor.on_pointer_move(p(0.0, 50.0)).expect("move");
    assert_eq!(editor.on_pointer_up(), Ok(EditOutcome::DragReverted));
    assert_eq!(editor.geometry(), Some(Geometry::rectangle(bounds)));
}
