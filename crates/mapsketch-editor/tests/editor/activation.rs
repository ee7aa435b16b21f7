use mapsketch_core::EditorError;
use mapsketch_editor::{EditOutcome, EditorState, ShapeKind};

use crate::{p, record_states, square, Fixture};

#[test]
fn test_activating_another_editor_exits_the_first() {
    let fx = Fixture::new();
    let a = fx.placed(square(0.0, 0.0, 100.0));
    let b = fx.placed(square(300.0, 0.0, 100.0));
    let a_states = record_states(&a);

    assert_eq!(a.on_secondary_activation(p(50.0, 50.0)), Ok(EditOutcome::EnteredEditing));
    assert!(a.is_active());

    assert!(b.activate());
    assert!(b.is_active());
    assert!(!a.is_active());
    assert_eq!(a.state(), EditorState::Idle);
    assert_eq!(
        *a_states.borrow(),
        vec![EditorState::Idle, EditorState::Editing, EditorState::Idle]
    );
    assert_eq!(fx.registry.active_id(), Some(b.id()));
}

#[test]
fn test_force_exit_keeps_edits() {
    let fx = Fixture::new();
    let a = fx.placed(square(0.0, 0.0, 100.0));
    let b = fx.placed(square(300.0, 0.0, 100.0));
    a.on_secondary_activation(p(50.0, 50.0)).expect("enter");
    a.on_pointer_down(p(0.0, 0.0)).expect("down");
    a.on_pointer_move(p(-10.0, -10.0)).expect("move");
    a.on_pointer_up().expect("up");

    assert_eq!(b.on_secondary_activation(p(350.0, 50.0)), Ok(EditOutcome::EnteredEditing));
    assert_eq!(a.state(), EditorState::Idle);
    assert_eq!(a.geometry().and_then(|g| g.vertex(mapsketch_editor::VertexRef::new(0, 0, 0))), Some(p(-10.0, -10.0)));
    assert!(!a.can_undo());
}

#[test]
fn test_new_drawing_discards_unfinished_one() {
    let fx = Fixture::new();
    let a = fx.editor(ShapeKind::Rectangle);
    a.begin(None).expect("begin");
    a.on_primary_click(p(0.0, 0.0)).expect("corner");

    let b = fx.editor(ShapeKind::Polygon);
    b.begin(None).expect("begin");

    assert_eq!(a.state(), EditorState::Idle);
    assert!(a.geometry().is_none());
    assert_eq!(a.on_primary_click(p(5.0, 5.0)), Ok(EditOutcome::Ignored));
    assert_eq!(b.state(), EditorState::Drawing);
    assert!(!fx.interactions_enabled());
}

#[test]
fn test_idle_shape_does_not_steal_from_drawing() {
    let fx = Fixture::new();
    let drawing = fx.editor(ShapeKind::Polygon);
    drawing.begin(None).expect("begin");
    drawing.on_primary_click(p(0.0, 0.0)).expect("click");

    let placed = fx.placed(square(300.0, 300.0, 100.0));
    assert_eq!(
        placed.on_secondary_activation(p(350.0, 350.0)),
        Ok(EditOutcome::Ignored)
    );
    assert_eq!(drawing.state(), EditorState::Drawing);
    assert_eq!(placed.state(), EditorState::Idle);
    assert!(matches!(
        placed.start_editing(),
        Err(EditorError::InvalidState { .. })
    ));
}

#[test]
fn test_inactive_editor_ignores_pointer() {
    let fx = Fixture::new();
    let a = fx.placed(square(0.0, 0.0, 100.0));
    let b = fx.placed(square(300.0, 0.0, 100.0));
    a.on_secondary_activation(p(50.0, 50.0)).expect("enter");

    assert_eq!(b.on_pointer_down(p(300.0, 0.0)), Ok(EditOutcome::Ignored));
    assert_eq!(b.on_context_action(p(300.0, 0.0)), Ok(EditOutcome::Ignored));
    assert_eq!(b.geometry(), Some(square(300.0, 0.0, 100.0)));
}

#[test]
fn test_hidden_editor_is_inactive() {
    let fx = Fixture::new();
    let editor = fx.editor(ShapeKind::Line);
    editor.begin(None).expect("begin");
    editor.set_visible(false);
    assert!(!editor.is_active());
    assert_eq!(editor.on_primary_click(p(1.0, 1.0)), Ok(EditOutcome::Ignored));

    editor.set_visible(true);
    assert!(editor.is_active());
    assert_eq!(
        editor.on_primary_click(p(1.0, 1.0)),
        Ok(EditOutcome::VertexAdded { count: 1 })
    );

    let placed = fx.placed(square(300.0, 0.0, 100.0));
    placed.set_visible(false);
    assert_eq!(
        placed.on_secondary_activation(p(350.0, 50.0)),
        Ok(EditOutcome::Ignored)
    );
}

#[test]
fn test_destroy_is_idempotent() {
    let fx = Fixture::new();
    let editor = fx.editor(ShapeKind::Polygon);
    let states = record_states(&editor);
    editor.begin(None).expect("begin");
    editor.on_primary_click(p(0.0, 0.0)).expect("click");
    assert_eq!(fx.registry.len(), 1);

    editor.destroy();
    editor.destroy();

    assert!(editor.is_destroyed());
    assert!(editor.geometry().is_none());
    assert!(fx.interactions_enabled());
    assert_eq!(fx.registry.len(), 0);
    assert_eq!(fx.registry.active_id(), None);
    assert_eq!(editor.listener_count(), 0);
    assert_eq!(editor.begin(None), Err(EditorError::Destroyed));
    assert_eq!(editor.on_primary_click(p(1.0, 1.0)), Err(EditorError::Destroyed));
    assert_eq!(*states.borrow(), vec![EditorState::Idle, EditorState::Drawing]);
}

#[test]
fn test_dropping_last_handle_releases_surface() {
    let fx = Fixture::new();
    {
        let editor = fx.editor(ShapeKind::Line);
        editor.begin(None).expect("begin");
        assert!(!fx.interactions_enabled());
        assert_eq!(fx.registry.len(), 1);
    }
    assert!(fx.interactions_enabled());
    assert!(fx.registry.is_empty());
}
