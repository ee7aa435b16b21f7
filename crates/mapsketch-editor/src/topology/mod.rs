//! Topology operations across finished shapes.
//!
//! - [`selection`]: the ordered set of shapes an operation applies to
//! - [`store`]: id-keyed storage and the lookup trait the engine reads through
//! - [`engine`]: clip-by-line, merge and reshape
//!
//! Results are delivered to a completion callback as a [`TopologyOutcome`];
//! applying them is up to the caller.

mod boolean;
pub mod engine;
pub mod selection;
pub mod store;

pub use engine::TopologyEngine;
pub use selection::Selection;
pub use store::{ShapeLookup, ShapeStore};

use crate::model::Geometry;

/// Identifier of a finished shape.
pub type ShapeId = u64;

/// What an operation consumed and what it produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopologyOutcome {
    pub removed: Vec<ShapeId>,
    pub created: Vec<Geometry>,
}

impl TopologyOutcome {
    /// True when the operation changed nothing.
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.created.is_empty()
    }
}
