use serde::{Deserialize, Serialize};

use mapsketch_settings::ShapeStyle;

use super::Geometry;

/// One drawn entity: geometry plus the presentation flags the host renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub geometry: Geometry,
    pub style: ShapeStyle,
    /// False while the in-progress geometry fails validation
    pub valid: bool,
    pub visible: bool,
}

impl Shape {
    pub fn new(geometry: Geometry, style: ShapeStyle) -> Self {
        Self {
            geometry,
            style,
            valid: true,
            visible: true,
        }
    }
}
