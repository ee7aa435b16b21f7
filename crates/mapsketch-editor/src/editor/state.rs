use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{EdgeRef, Point, VertexRef};

/// Lifecycle state of a shape editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorState {
    /// No shape in progress and no handles exposed
    #[default]
    Idle,
    /// Collecting vertices for a new shape
    Drawing,
    /// A finished shape's vertices are exposed as handles
    Editing,
}

impl fmt::Display for EditorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Drawing => write!(f, "Drawing"),
            Self::Editing => write!(f, "Editing"),
        }
    }
}

/// Token returned by `on_state_change`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// What a drag moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    Vertex(VertexRef),
    /// A rectangle side, moved along its normal
    Edge(EdgeRef),
    /// The whole shape
    Body,
}

/// Result of an editor operation that did not fail.
///
/// Interactive rejections are outcomes rather than errors: the user keeps
/// working and the host may show feedback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditOutcome {
    /// The event did not apply (inactive editor, wrong state, nothing hit)
    Ignored,
    DrawingStarted,
    /// A pre-existing geometry was placed; the editor is Idle
    Placed,
    VertexAdded { count: usize },
    /// The candidate vertex would make the ring self-intersect
    VertexRejected,
    PreviewUpdated { valid: bool },
    /// A pointer move was held back by the throttle
    Throttled,
    Completed,
    EnteredEditing,
    DragStarted(DragTarget),
    Dragged { valid: bool },
    DragEnded { changed: bool },
    /// The drag ended on an invalid shape and was rolled back
    DragReverted,
    VertexInserted(VertexRef),
    VertexRemoved(VertexRef),
    Undone,
    Redone,
    Reset,
    Committed,
    Cancelled,
}

impl EditOutcome {
    pub fn is_ignored(&self) -> bool {
        matches!(self, EditOutcome::Ignored)
    }
}

/// Kind of editing handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    Vertex(VertexRef),
    Midpoint(EdgeRef),
}

/// An editing handle, derived from the geometry on demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub kind: HandleKind,
    pub position: Point,
}

/// Pointer input from the host surface, in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    PrimaryClick { x: f64, y: f64 },
    /// Double-click or equivalent
    SecondaryActivation { x: f64, y: f64 },
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp,
    /// Right-click or equivalent
    ContextAction { x: f64, y: f64 },
}

impl PointerEvent {
    pub fn point(&self) -> Option<Point> {
        match *self {
            PointerEvent::PrimaryClick { x, y }
            | PointerEvent::SecondaryActivation { x, y }
            | PointerEvent::PointerDown { x, y }
            | PointerEvent::PointerMove { x, y }
            | PointerEvent::ContextAction { x, y } => Some(Point::new(x, y)),
            PointerEvent::PointerUp => None,
        }
    }
}
