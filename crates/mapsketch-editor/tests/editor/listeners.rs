use std::cell::{Cell, RefCell};
use std::rc::Rc;

use mapsketch_editor::{EditorState, ListenerId, ShapeKind};
use mapsketch_settings::Config;

use crate::{p, Fixture};

#[test]
fn test_fire_on_subscribe() {
    let fx = Fixture::new();
    let editor = fx.editor(ShapeKind::Point);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    editor.on_state_change(move |s| sink.borrow_mut().push(s));
    assert_eq!(*seen.borrow(), vec![EditorState::Idle]);
}

#[test]
fn test_subscribe_without_immediate_call() {
    let mut config = Config::default();
    config.editor.fire_on_subscribe = false;
    let fx = Fixture::with_config(config);
    let editor = fx.editor(ShapeKind::Point);
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    editor.on_state_change(move |_| counter.set(counter.get() + 1));
    assert_eq!(calls.get(), 0);

    editor.begin(None).expect("begin");
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_unsubscribe() {
    let fx = Fixture::new();
    let editor = fx.editor(ShapeKind::Line);
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let id = editor.on_state_change_with(move |_| counter.set(counter.get() + 1), false);
    assert_eq!(editor.listener_count(), 1);

    assert!(editor.off_state_change(id));
    assert!(!editor.off_state_change(id));
    editor.begin(None).expect("begin");
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_listener_may_unsubscribe_itself() {
    let fx = Fixture::new();
    let editor = fx.editor(ShapeKind::Point);
    let own_id: Rc<Cell<Option<ListenerId>>> = Rc::new(Cell::new(None));
    let calls = Rc::new(Cell::new(0));

    let handle = editor.clone();
    let slot = own_id.clone();
    let counter = calls.clone();
    let id = editor.on_state_change_with(
        move |_| {
            counter.set(counter.get() + 1);
            if let Some(id) = slot.get() {
                handle.off_state_change(id);
            }
        },
        false,
    );
    own_id.set(Some(id));

    editor.begin(None).expect("begin");
    editor.on_primary_click(p(1.0, 1.0)).expect("click");
    assert_eq!(calls.get(), 1);
    assert_eq!(editor.listener_count(), 0);
}

#[test]
fn test_listener_can_read_editor() {
    let fx = Fixture::new();
    let editor = fx.editor(ShapeKind::Point);
    let observed = Rc::new(RefCell::new(Vec::new()));
    let handle = editor.clone();
    let sink = observed.clone();
    editor.on_state_change_with(
        move |s| sink.borrow_mut().push((s, handle.state(), handle.geometry().is_some())),
        false,
    );

    editor.begin(None).expect("begin");
    editor.on_primary_click(p(1.0, 1.0)).expect("click");
    assert_eq!(
        *observed.borrow(),
        vec![
            (EditorState::Drawing, EditorState::Drawing, false),
            (EditorState::Idle, EditorState::Idle, true),
        ]
    );
}

#[test]
fn test_listener_subscribed_during_notify_waits_for_next_change() {
    let fx = Fixture::new();
    let editor = fx.editor(ShapeKind::Point);
    let late_calls = Rc::new(Cell::new(0));
    let handle = editor.clone();
    let counter = late_calls.clone();
    let subscribed = Rc::new(Cell::new(false));
    let flag = subscribed.clone();
    editor.on_state_change_with(
        move |_| {
            if !flag.replace(true) {
                let counter = counter.clone();
                handle.on_state_change_with(move |_| counter.set(counter.get() + 1), false);
            }
        },
        false,
    );

    editor.begin(None).expect("begin");
    assert_eq!(late_calls.get(), 0);
    assert_eq!(editor.listener_count(), 2);
    editor.on_primary_click(p(1.0, 1.0)).expect("click");
    assert_eq!(late_calls.get(), 1);
}
