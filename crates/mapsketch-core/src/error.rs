//! Error handling for MapSketch
//!
//! Provides the error types shared by every layer of the engine:
//! - Editor errors (precondition violations, finalization failures)
//! - Topology errors (selection preconditions, unsupported sketches)
//!
//! Interactive rejections (a vertex that would make a ring self-intersect)
//! are reported as outcomes by the editors, not as errors. An error never
//! changes the state of the editor that produced it.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Editor error type
///
/// Raised by shape editors when an operation cannot be carried out in the
/// current state or when a drawing cannot be finalized.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    /// The editor was destroyed and no longer accepts operations
    #[error("Editor has been destroyed")]
    Destroyed,

    /// The operation needs a different editor state
    #[error("Operation '{operation}' is not valid while {state}")]
    InvalidState {
        /// The operation that was attempted.
        operation: String,
        /// The current state name.
        state: String,
    },

    /// A pre-existing geometry does not match the editor's shape kind
    #[error("Geometry mismatch: {kind} editor cannot take a {geometry}")]
    KindMismatch {
        /// The shape kind of the editor.
        kind: String,
        /// The kind of geometry that was supplied.
        geometry: String,
    },

    /// The shape cannot be finalized in its current form
    #[error("Invalid geometry: {reason}")]
    InvalidGeometry {
        /// The reason the geometry was rejected.
        reason: String,
    },

    /// Removing the vertex would leave too few vertices in its ring
    #[error("Cannot remove vertex: ring needs at least {minimum} vertices")]
    VertexFloor {
        /// The minimum vertex count of the ring.
        minimum: usize,
    },

    /// No vertex exists at the given address
    #[error("No vertex at part {part}, ring {ring}, index {index}")]
    VertexNotFound {
        /// Polygon part index.
        part: usize,
        /// Ring index within the part.
        ring: usize,
        /// Vertex index within the ring.
        index: usize,
    },

    /// The shape kind does not support the operation
    #[error("{kind} shapes do not support {operation}")]
    Unsupported {
        /// The shape kind name.
        kind: String,
        /// The operation that was attempted.
        operation: String,
    },
}

impl EditorError {
    /// Shorthand for an [`EditorError::InvalidGeometry`].
    pub fn invalid_geometry(reason: impl Into<String>) -> Self {
        EditorError::InvalidGeometry {
            reason: reason.into(),
        }
    }

    /// Shorthand for an [`EditorError::InvalidState`].
    pub fn invalid_state(operation: impl Into<String>, state: impl ToString) -> Self {
        EditorError::InvalidState {
            operation: operation.into(),
            state: state.to_string(),
        }
    }
}

/// Topology error type
///
/// Raised by clip, merge and reshape operations when their preconditions
/// are not met. Failures inside the geometric backend are not errors: the
/// affected shape is logged and left untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TopologyError {
    /// Not enough shapes are selected for the operation
    #[error("{operation} requires at least {required} selected shapes, {selected} selected")]
    NotEnoughSelected {
        /// The operation name.
        operation: String,
        /// The minimum selection size.
        required: usize,
        /// The current selection size.
        selected: usize,
    },

    /// Reshape works on exactly one shape
    #[error("Reshape requires exactly one selected shape, {selected} selected")]
    ExactlyOneRequired {
        /// The current selection size.
        selected: usize,
    },

    /// A selected shape could not be resolved
    #[error("Shape {id} not found")]
    ShapeNotFound {
        /// The missing shape id.
        id: u64,
    },

    /// The shape has no area (point or line)
    #[error("Shape {id} is not a polygon")]
    NotAreal {
        /// The offending shape id.
        id: u64,
    },

    /// The sketch line is degenerate
    #[error("Sketch needs at least 2 distinct vertices, got {count}")]
    InvalidSketch {
        /// The number of distinct sketch vertices.
        count: usize,
    },

    /// The sketch crosses an inner ring of the target
    #[error("Sketch crosses a hole of shape {id}; reshaping across holes is unsupported")]
    SketchCrossesHole {
        /// The target shape id.
        id: u64,
    },
}

/// Main error type for MapSketch
#[derive(Error, Debug, PartialEq)]
pub enum Error {
    /// Editor error
    #[error(transparent)]
    Editor(#[from] EditorError),

    /// Topology error
    #[error(transparent)]
    Topology(#[from] TopologyError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }
}

/// Result type alias using MapSketch's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Result type alias for editor operations.
pub type EditorResult<T> = std::result::Result<T, EditorError>;

/// Result type alias for topology operations.
pub type TopologyResult<T> = std::result::Result<T, TopologyError>;
