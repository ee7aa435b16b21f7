//! Per-shape editors.
//!
//! - [`kind`]: what each shape kind needs to be drawn, validated and edited
//! - [`state`]: editor states, outcomes, handles and pointer events
//! - [`shape_editor`]: the state machine driving one shape

pub mod kind;
pub mod shape_editor;
pub mod state;

pub use kind::ShapeKind;
pub use shape_editor::ShapeEditor;
pub use state::{
    DragTarget, EditOutcome, EditorState, Handle, HandleKind, ListenerId, PointerEvent,
};
