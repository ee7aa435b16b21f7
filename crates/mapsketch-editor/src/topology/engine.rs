//! Clip, merge and reshape over the current selection.
//!
//! Every operation validates the selection first and fails without touching
//! anything. Past that point, a shape whose backend call panics or yields
//! non-finite coordinates is logged and left out of the result.

use csgrs::sketch::Sketch;
use csgrs::traits::CSG;
use tracing::{debug, info, warn};

use mapsketch_core::constants::AREA_EPSILON;
use mapsketch_core::{TopologyError, TopologyResult};
use mapsketch_settings::{Config, ReshapeStrategy, TopologySettings};

use super::boolean::{self, guarded};
use super::selection::Selection;
use super::store::ShapeLookup;
use super::{ShapeId, TopologyOutcome};
use crate::model::{ring, Geometry, Point, PolygonGeometry};

enum PartChange {
    Unchanged,
    Replaced(Vec<PolygonGeometry>),
}

/// Runs topology operations against shapes resolved through a [`ShapeLookup`].
#[derive(Debug, Clone)]
pub struct TopologyEngine {
    settings: TopologySettings,
    circle_segments: u32,
    selection: Selection,
}

impl TopologyEngine {
    pub fn new(settings: TopologySettings, circle_segments: u32) -> Self {
        Self {
            settings,
            circle_segments,
            selection: Selection::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.topology.clone(), config.editor.circle_segments)
    }

    pub fn settings(&self) -> &TopologySettings {
        &self.settings
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    /// Toggle `id` in the selection; true when it ends up selected.
    pub fn toggle(&mut self, id: ShapeId) -> bool {
        self.selection.toggle(id)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    fn resolve<L: ShapeLookup + ?Sized>(
        &self,
        lookup: &L,
    ) -> TopologyResult<Vec<(ShapeId, Geometry)>> {
        self.selection
            .ids()
            .iter()
            .map(|&id| {
                lookup
                    .geometry(id)
                    .map(|g| (id, g))
                    .ok_or(TopologyError::ShapeNotFound { id })
            })
            .collect()
    }

    fn clean_sketch(sketch: &[Point]) -> TopologyResult<Vec<Point>> {
        let sketch = ring::normalize_open(sketch);
        let count = ring::distinct_count(&sketch);
        if count < 2 {
            return Err(TopologyError::InvalidSketch { count });
        }
        Ok(sketch)
    }

    fn finish<F>(&mut self, operation: &str, outcome: TopologyOutcome, on_complete: F)
    where
        F: FnOnce(TopologyOutcome),
    {
        for id in &outcome.removed {
            self.selection.remove(*id);
        }
        info!(
            "{} finished: {} shapes removed, {} created",
            operation,
            outcome.removed.len(),
            outcome.created.len()
        );
        on_complete(outcome);
    }

    /// Selection precondition of [`clip_by_line`](Self::clip_by_line).
    pub fn check_clip(&self) -> TopologyResult<()> {
        let selected = self.selection.len();
        if selected == 0 {
            return Err(TopologyError::NotEnoughSelected {
                operation: "Clip".to_string(),
                required: 1,
                selected,
            });
        }
        Ok(())
    }

    /// Selection precondition of [`reshape`](Self::reshape).
    pub fn check_reshape(&self) -> TopologyResult<()> {
        match self.selection.len() {
            1 => Ok(()),
            selected => Err(TopologyError::ExactlyOneRequired { selected }),
        }
    }

    /// Split every selected areal shape along `sketch`.
    ///
    /// A shape is replaced only when the cut yields more polygons than it
    /// had. MultiPolygon parts are cut by their outer rings; their holes are
    /// not carried into the fragments.
    pub fn clip_by_line<L, F>(
        &mut self,
        lookup: &L,
        sketch: &[Point],
        on_complete: F,
    ) -> TopologyResult<()>
    where
        L: ShapeLookup + ?Sized,
        F: FnOnce(TopologyOutcome),
    {
        self.check_clip()?;
        let shapes = self.resolve(lookup)?;
        let sketch = Self::clean_sketch(sketch)?;

        let width = self.settings.split_buffer_width;
        let Some(buffer) = guarded("sketch buffer", || boolean::line_buffer(&sketch, width)) else {
            self.finish("Clip", TopologyOutcome::default(), on_complete);
            return Ok(());
        };

        let mut outcome = TopologyOutcome::default();
        for (id, geometry) in shapes {
            if !geometry.is_areal() {
                debug!("Clip skips shape {}: {} has no area", id, geometry.kind());
                continue;
            }
            let parts: Vec<PolygonGeometry> = match &geometry {
                Geometry::MultiPolygon(parts) => parts
                    .iter()
                    .map(|p| PolygonGeometry::new(p.outer().to_vec()))
                    .collect(),
                other => other.to_polygons(self.circle_segments),
            };
            let min_area = self.settings.min_fragment_area;
            let fragments = guarded("clip", || {
                parts
                    .iter()
                    .flat_map(|part| boolean::split_polygon(part, &buffer, min_area))
                    .collect::<Vec<_>>()
            });
            let Some(fragments) = fragments else {
                warn!("Clip left shape {} untouched after a backend failure", id);
                continue;
            };
            if fragments.len() <= parts.len() {
                continue;
            }
            let created: Vec<Geometry> = fragments.into_iter().map(Geometry::Polygon).collect();
            if !created.iter().all(Geometry::is_finite) {
                warn!("Clip produced non-finite coordinates for shape {}", id);
                continue;
            }
            debug!("Clip split shape {} into {} fragments", id, created.len());
            outcome.removed.push(id);
            outcome.created.extend(created);
        }

        self.finish("Clip", outcome, on_complete);
        Ok(())
    }

    /// Union the selected areal shapes into one geometry.
    pub fn merge<L, F>(&mut self, lookup: &L, on_complete: F) -> TopologyResult<()>
    where
        L: ShapeLookup + ?Sized,
        F: FnOnce(TopologyOutcome),
    {
        let selected = self.selection.len();
        if selected < 2 {
            return Err(TopologyError::NotEnoughSelected {
                operation: "Merge".to_string(),
                required: 2,
                selected,
            });
        }
        let shapes = self.resolve(lookup)?;
        if let Some((id, _)) = shapes.iter().find(|(_, g)| !g.is_areal()) {
            return Err(TopologyError::NotAreal { id: *id });
        }

        let precision = self.settings.merge_precision;
        let segments = self.circle_segments;
        let merged = guarded("merge", || {
            let mut sketches = shapes.iter().map(|(_, g)| {
                let parts: Vec<PolygonGeometry> = g
                    .to_polygons(segments)
                    .iter()
                    .map(|p| boolean::rounded_polygon(p, precision))
                    .collect();
                boolean::polygons_sketch(&parts)
            });
            sketches
                .next()
                .map(|first| sketches.fold(first, |acc, s| acc.union(&s)))
                .map(|sketch| boolean::sketch_polygons(&sketch))
        });

        let geometry = merged.flatten().and_then(boolean::assemble);
        let outcome = match geometry {
            Some(geometry) if geometry.is_finite() => TopologyOutcome {
                removed: shapes.iter().map(|(id, _)| *id).collect(),
                created: vec![geometry],
            },
            Some(_) => {
                warn!("Merge produced non-finite coordinates; shapes left untouched");
                TopologyOutcome::default()
            }
            None => {
                warn!("Merge produced no geometry; shapes left untouched");
                TopologyOutcome::default()
            }
        };
        self.finish("Merge", outcome, on_complete);
        Ok(())
    }

    /// Reshape the single selected shape with `sketch`.
    ///
    /// A sketch starting and ending inside a part grows that part by the
    /// area it encloses. A sketch crossing a part's boundary at least twice
    /// cuts it: `Auto` keeps the fragment with the largest perimeter,
    /// `Manual` hands back every fragment as its own geometry. Parts the
    /// sketch does not reach pass through. Sketches through holes are
    /// rejected.
    pub fn reshape<L, F>(
        &mut self,
        lookup: &L,
        sketch: &[Point],
        strategy: ReshapeStrategy,
        on_complete: F,
    ) -> TopologyResult<()>
    where
        L: ShapeLookup + ?Sized,
        F: FnOnce(TopologyOutcome),
    {
        self.check_reshape()?;
        let Some((id, geometry)) = self.resolve(lookup)?.pop() else {
            return Err(TopologyError::ExactlyOneRequired { selected: 0 });
        };
        if !geometry.is_areal() {
            return Err(TopologyError::NotAreal { id });
        }
        let sketch = Self::clean_sketch(sketch)?;
        let parts = geometry.to_polygons(self.circle_segments);
        if parts
            .iter()
            .flat_map(|p| p.holes())
            .any(|hole| ring::touches(hole, &sketch))
        {
            warn!("Reshape sketch crosses a hole of shape {}", id);
            return Err(TopologyError::SketchCrossesHole { id });
        }

        let changes = guarded("reshape", || {
            let buffer = boolean::line_buffer(&sketch, self.settings.split_buffer_width);
            parts
                .iter()
                .map(|part| self.reshape_part(part, &sketch, &buffer, strategy))
                .collect::<Vec<_>>()
        });
        let Some(changes) = changes else {
            warn!("Reshape left shape {} untouched after a backend failure", id);
            self.finish("Reshape", TopologyOutcome::default(), on_complete);
            return Ok(());
        };
        if changes.iter().all(|c| matches!(c, PartChange::Unchanged)) {
            debug!("Reshape sketch does not change shape {}", id);
            self.finish("Reshape", TopologyOutcome::default(), on_complete);
            return Ok(());
        }

        let mut kept: Vec<PolygonGeometry> = Vec::new();
        let mut candidates: Vec<PolygonGeometry> = Vec::new();
        for (part, change) in parts.into_iter().zip(changes) {
            match change {
                PartChange::Unchanged => kept.push(part),
                PartChange::Replaced(polygons) => match strategy {
                    ReshapeStrategy::Auto => kept.extend(polygons),
                    ReshapeStrategy::Manual => candidates.extend(polygons),
                },
            }
        }

        let created: Vec<Geometry> = match strategy {
            ReshapeStrategy::Auto => boolean::assemble(kept).into_iter().collect(),
            ReshapeStrategy::Manual => candidates
                .into_iter()
                .chain(kept)
                .map(Geometry::Polygon)
                .collect(),
        };
        let outcome = if created.is_empty() || !created.iter().all(Geometry::is_finite) {
            warn!("Reshape produced no usable geometry for shape {}", id);
            TopologyOutcome::default()
        } else {
            TopologyOutcome {
                removed: vec![id],
                created,
            }
        };
        self.finish("Reshape", outcome, on_complete);
        Ok(())
    }

    fn reshape_part(
        &self,
        part: &PolygonGeometry,
        sketch: &[Point],
        buffer: &Sketch<()>,
        strategy: ReshapeStrategy,
    ) -> PartChange {
        let (Some(first), Some(last)) = (sketch.first(), sketch.last()) else {
            return PartChange::Unchanged;
        };

        if part.contains(first) && part.contains(last) {
            let closed = ring::normalize(sketch);
            if ring::distinct_count(&closed) < 3 || ring::area(&closed) <= AREA_EPSILON {
                return PartChange::Unchanged;
            }
            let outline = boolean::polygon_sketch(&PolygonGeometry::new(closed));
            let grown = boolean::sketch_polygons(&boolean::polygon_sketch(part).union(&outline));
            let grown_area: f64 = grown.iter().map(PolygonGeometry::area).sum();
            if grown.is_empty() || grown_area <= part.area() + AREA_EPSILON {
                return PartChange::Unchanged;
            }
            return PartChange::Replaced(grown);
        }

        if ring::crossings(part.outer(), sketch) < 2 {
            return PartChange::Unchanged;
        }
        let fragments = boolean::split_polygon(part, buffer, self.settings.min_fragment_area);
        if fragments.len() < 2 {
            return PartChange::Unchanged;
        }
        match strategy {
            ReshapeStrategy::Manual => PartChange::Replaced(fragments),
            ReshapeStrategy::Auto => fragments
                .into_iter()
                .max_by(|a, b| a.perimeter().total_cmp(&b.perimeter()))
                .map_or(PartChange::Unchanged, |best| PartChange::Replaced(vec![best])),
        }
    }
}
