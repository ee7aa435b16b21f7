//! Finished shapes, addressed by id.

use std::collections::BTreeMap;

use crate::model::{Geometry, Point};

use super::{ShapeId, TopologyOutcome};

/// Resolves shape ids to geometries for the topology engine.
pub trait ShapeLookup {
    fn geometry(&self, id: ShapeId) -> Option<Geometry>;
}

impl ShapeLookup for BTreeMap<ShapeId, Geometry> {
    fn geometry(&self, id: ShapeId) -> Option<Geometry> {
        self.get(&id).cloned()
    }
}

/// Id-keyed geometry store. Ids are never reused.
#[derive(Debug, Clone, Default)]
pub struct ShapeStore {
    next_id: ShapeId,
    shapes: BTreeMap<ShapeId, Geometry>,
}

impl ShapeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, geometry: Geometry) -> ShapeId {
        self.next_id += 1;
        self.shapes.insert(self.next_id, geometry);
        self.next_id
    }

    pub fn get(&self, id: ShapeId) -> Option<&Geometry> {
        self.shapes.get(&id)
    }

    pub fn replace(&mut self, id: ShapeId, geometry: Geometry) -> Option<Geometry> {
        self.shapes.get_mut(&id).map(|g| std::mem::replace(g, geometry))
    }

    pub fn remove(&mut self, id: ShapeId) -> Option<Geometry> {
        self.shapes.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn ids(&self) -> Vec<ShapeId> {
        self.shapes.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ShapeId, &Geometry)> {
        self.shapes.iter().map(|(id, g)| (*id, g))
    }

    /// Every geometry but `id`'s, as snap sources.
    pub fn geometries_except(&self, id: Option<ShapeId>) -> Vec<Geometry> {
        self.shapes
            .iter()
            .filter(|(sid, _)| Some(**sid) != id)
            .map(|(_, g)| g.clone())
            .collect()
    }

    /// Most recently added areal shape containing `p`.
    pub fn topmost_at(&self, p: &Point) -> Option<ShapeId> {
        self.shapes
            .iter()
            .rev()
            .find(|(_, g)| g.contains(p))
            .map(|(id, _)| *id)
    }

    /// Remove consumed shapes and add created ones; returns the new ids.
    pub fn apply(&mut self, outcome: &TopologyOutcome) -> Vec<ShapeId> {
        for id in &outcome.removed {
            self.shapes.remove(id);
        }
        outcome
            .created
            .iter()
            .map(|g| self.insert(g.clone()))
            .collect()
    }
}

impl ShapeLookup for ShapeStore {
    fn geometry(&self, id: ShapeId) -> Option<Geometry> {
        self.get(id).cloned()
    }
}
