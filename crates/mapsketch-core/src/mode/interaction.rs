//! Interaction mode values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What the user is currently doing on the map surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    /// Nothing in progress
    #[default]
    Idle,
    /// A shape is being drawn
    Draw,
    /// A finished shape is being edited
    Edit,
    /// Topology selection / sketching
    Topo,
    /// Shapes are being picked for deletion
    Delete,
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Draw => write!(f, "draw"),
            Self::Edit => write!(f, "edit"),
            Self::Topo => write!(f, "topo"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

impl FromStr for InteractionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "idle" => Ok(Self::Idle),
            "draw" => Ok(Self::Draw),
            "edit" => Ok(Self::Edit),
            "topo" => Ok(Self::Topo),
            "delete" => Ok(Self::Delete),
            other => Err(format!("Unknown interaction mode: {}", other)),
        }
    }
}
