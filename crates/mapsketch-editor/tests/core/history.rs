use mapsketch_editor::History;
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_undo_returns_to_entry_state(edits in prop::collection::vec(any::<i32>(), 0..40)) {
        let mut history = History::new(100);
        history.begin(i64::MIN);
        for e in &edits {
            history.push(*e as i64);
        }
        for _ in &edits {
            prop_assert!(history.undo().is_some());
        }
        prop_assert_eq!(history.current(), Some(&i64::MIN));
        prop_assert!(history.undo().is_none());
        prop_assert_eq!(history.current(), Some(&i64::MIN));
    }

    #[test]
    fn prop_undo_then_redo_restores(edits in prop::collection::vec(any::<i32>(), 1..40)) {
        let mut history = History::new(100);
        history.begin(0);
        for e in &edits {
            history.push(*e);
        }
        let before = history.current().copied();
        let undone = history.undo().is_some();
        prop_assert!(undone);
        let redone = history.redo();
        prop_assert_eq!(redone, before);
        prop_assert_eq!(history.current().copied(), before);
        prop_assert!(!history.can_redo());
    }

    #[test]
    fn prop_trimming_keeps_baseline(max in 2usize..12, pushes in 0usize..60) {
        let mut history = History::new(max);
        history.begin(-1i32);
        for i in 0..pushes {
            history.push(i as i32);
        }
        prop_assert!(history.undo_depth() < max);
        prop_assert_eq!(history.initial(), Some(&-1));
        while history.undo().is_some() {}
        prop_assert_eq!(history.current(), Some(&-1));
    }
}

#[test]
fn test_push_clears_redo() {
    let mut history = History::new(10);
    history.begin("a");
    history.push("b");
    history.push("c");
    assert_eq!(history.undo(), Some("b"));
    assert!(history.can_redo());
    history.push("d");
    assert!(!history.can_redo());
    assert_eq!(history.redo(), None);
}

#[test]
fn test_reset_to_initial() {
    let mut history = History::new(10);
    history.begin(1);
    assert_eq!(history.reset_to_initial(), None);
    history.push(2);
    history.push(3);
    history.undo();
    assert_eq!(history.reset_to_initial(), Some(1));
    assert!(!history.can_undo());
    assert!(!history.can_redo());
}
