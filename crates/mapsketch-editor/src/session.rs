//! Session: the glue a host drives.
//!
//! Owns the activation registry, the interaction mode bus, the store of
//! finished shapes with one editor per shape, and the topology engine.
//! Pointer events go to whichever editor is drawing, sketching or editing;
//! finished drawings move into the store and topology results are applied
//! to it.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use mapsketch_core::types::Shared;
use mapsketch_core::{mode_manager, Error, InteractionMode, ModeManager, Result};
use mapsketch_settings::{Config, ReshapeStrategy};

use crate::activation::ActivationRegistry;
use crate::editor::{EditOutcome, EditorState, PointerEvent, ShapeEditor, ShapeKind};
use crate::model::{Geometry, Point};
use crate::topology::{ShapeId, ShapeStore, TopologyEngine, TopologyOutcome};
use crate::viewport::MapSurface;

/// What a finished topology sketch is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SketchAction {
    Clip,
    Reshape(ReshapeStrategy),
}

pub struct Session {
    config: Config,
    registry: ActivationRegistry,
    modes: Arc<ModeManager>,
    surface: Shared<dyn MapSurface>,
    store: ShapeStore,
    editors: BTreeMap<ShapeId, ShapeEditor>,
    drawing: Option<ShapeEditor>,
    sketch: Option<(ShapeEditor, SketchAction)>,
    topology: TopologyEngine,
}

impl Session {
    /// Session reporting to the process-wide [`mode_manager`], so toolbars
    /// subscribed there follow it.
    pub fn new(config: Config, surface: Shared<dyn MapSurface>) -> Self {
        Self::with_modes(config, surface, mode_manager())
    }

    /// Session reporting to its own mode manager, for hosts running several
    /// independent maps.
    pub fn with_modes(
        config: Config,
        surface: Shared<dyn MapSurface>,
        modes: Arc<ModeManager>,
    ) -> Self {
        let topology = TopologyEngine::from_config(&config);
        Self {
            config,
            registry: ActivationRegistry::new(),
            modes,
            surface,
            store: ShapeStore::new(),
            editors: BTreeMap::new(),
            drawing: None,
            sketch: None,
            topology,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &ActivationRegistry {
        &self.registry
    }

    pub fn modes(&self) -> &Arc<ModeManager> {
        &self.modes
    }

    pub fn mode(&self) -> InteractionMode {
        self.modes.mode()
    }

    pub fn store(&self) -> &ShapeStore {
        &self.store
    }

    pub fn topology(&self) -> &TopologyEngine {
        &self.topology
    }

    pub fn editor(&self, id: ShapeId) -> Option<&ShapeEditor> {
        self.editors.get(&id)
    }

    pub fn drawing_editor(&self) -> Option<&ShapeEditor> {
        self.drawing.as_ref()
    }

    /// Id of the shape being edited, if any.
    pub fn editing_id(&self) -> Option<ShapeId> {
        self.editors
            .iter()
            .find(|(_, e)| e.state() == EditorState::Editing)
            .map(|(id, _)| *id)
    }

    fn make_editor(&self, kind: ShapeKind) -> ShapeEditor {
        ShapeEditor::new(kind, &self.config, &self.registry, self.surface.clone())
    }

    fn place(&mut self, geometry: Geometry) -> Result<ShapeId> {
        let editor = self.make_editor(ShapeKind::for_geometry(&geometry));
        editor.begin(Some(geometry.clone()))?;
        let id = self.store.insert(geometry);
        self.editors.insert(id, editor);
        Ok(id)
    }

    /// Add a finished geometry, e.g. one parsed from saved GeoJSON.
    pub fn add_shape(&mut self, geometry: Geometry) -> Result<ShapeId> {
        let id = self.place(geometry)?;
        debug!("Added shape {}", id);
        Ok(id)
    }

    /// Remove a shape and its editor.
    pub fn delete_shape(&mut self, id: ShapeId) -> bool {
        if let Some(editor) = self.editors.remove(&id) {
            editor.destroy();
        }
        self.topology.selection_mut().remove(id);
        self.store.remove(id).is_some()
    }

    fn discard_pending(&mut self) {
        if let Some(editor) = self.drawing.take() {
            editor.destroy();
        }
        if let Some((editor, _)) = self.sketch.take() {
            editor.destroy();
        }
    }

    /// Start drawing a new shape; an unfinished drawing or sketch is dropped.
    pub fn start_drawing(&mut self, kind: ShapeKind) -> Result<()> {
        self.discard_pending();
        self.sync_all();
        let editor = self.make_editor(kind);
        editor.set_snap_sources(&self.store.geometries_except(None));
        editor.begin(None)?;
        self.drawing = Some(editor);
        self.modes.set_mode(InteractionMode::Draw);
        Ok(())
    }

    /// Start sketching a line for clip or reshape over the selection.
    ///
    /// The selection must already satisfy the operation, so a finished
    /// sketch is never thrown away for want of a selection.
    pub fn begin_sketch(&mut self, action: SketchAction) -> Result<()> {
        match action {
            SketchAction::Clip => self.topology.check_clip()?,
            SketchAction::Reshape(_) => self.topology.check_reshape()?,
        }
        self.discard_pending();
        self.sync_all();
        let editor = self.make_editor(ShapeKind::Line);
        editor.set_snap_sources(&self.store.geometries_except(None));
        editor.begin(None)?;
        self.sketch = Some((editor, action));
        self.modes.set_mode(InteractionMode::Topo);
        Ok(())
    }

    /// Toggle the topmost areal shape under `p` in the topology selection.
    pub fn select_at(&mut self, p: Point) -> Option<(ShapeId, bool)> {
        let id = self.store.topmost_at(&p)?;
        let selected = self.topology.toggle(id);
        self.modes.set_mode(InteractionMode::Topo);
        Some((id, selected))
    }

    pub fn toggle_selection(&mut self, id: ShapeId) -> bool {
        self.topology.toggle(id)
    }

    /// Merge the selection into one shape; returns the new shape ids.
    pub fn merge_selected(&mut self) -> Result<Vec<ShapeId>> {
        self.sync_all();
        let mut result = None;
        self.topology.merge(&self.store, |o| result = Some(o))?;
        let created = match result {
            Some(outcome) => self.apply(outcome)?,
            None => Vec::new(),
        };
        self.modes.reset();
        Ok(created)
    }

    fn run_sketch(&mut self, action: SketchAction, line: Option<Geometry>) -> Result<Vec<ShapeId>> {
        let Some(Geometry::LineString(points)) = line else {
            return Ok(Vec::new());
        };
        let mut result = None;
        match action {
            SketchAction::Clip => {
                self.topology
                    .clip_by_line(&self.store, &points, |o| result = Some(o))?;
            }
            SketchAction::Reshape(strategy) => {
                self.topology
                    .reshape(&self.store, &points, strategy, |o| result = Some(o))?;
            }
        }
        match result {
            Some(outcome) => self.apply(outcome),
            None => Ok(Vec::new()),
        }
    }

    /// Apply a topology result to the store and the editors.
    pub fn apply(&mut self, outcome: TopologyOutcome) -> Result<Vec<ShapeId>> {
        for id in &outcome.removed {
            if let Some(editor) = self.editors.remove(id) {
                editor.destroy();
            }
            self.store.remove(*id);
        }
        let mut created = Vec::with_capacity(outcome.created.len());
        for geometry in outcome.created {
            created.push(self.place(geometry)?);
        }
        info!(
            "Applied topology result: {} removed, {} created",
            outcome.removed.len(),
            created.len()
        );
        Ok(created)
    }

    fn sync(&mut self, id: ShapeId) {
        let geometry = self.editors.get(&id).and_then(ShapeEditor::geometry);
        if let Some(geometry) = geometry {
            self.store.replace(id, geometry);
        }
    }

    fn sync_all(&mut self) {
        let ids: Vec<ShapeId> = self.editors.keys().copied().collect();
        for id in ids {
            self.sync(id);
        }
    }

    fn enter_editing_at(&mut self, p: Point) -> Result<EditOutcome> {
        let candidates: Vec<(ShapeId, ShapeEditor)> = self
            .editors
            .iter()
            .rev()
            .map(|(id, e)| (*id, e.clone()))
            .collect();
        for (id, editor) in candidates {
            editor.set_snap_sources(&self.store.geometries_except(Some(id)));
            let outcome = editor.on_secondary_activation(p)?;
            if outcome == EditOutcome::EnteredEditing {
                self.sync_all();
                self.modes.set_mode(InteractionMode::Edit);
                return Ok(outcome);
            }
        }
        Ok(EditOutcome::Ignored)
    }

    /// Route a pointer event to the editor it belongs to.
    pub fn handle_event(&mut self, event: PointerEvent) -> Result<EditOutcome> {
        if let Some(editor) = self.drawing.clone() {
            let outcome = editor.handle_event(event)?;
            if outcome == EditOutcome::Completed {
                self.drawing = None;
                match editor.geometry() {
                    Some(geometry) => {
                        let id = self.store.insert(geometry);
                        self.editors.insert(id, editor);
                        debug!("Drawing finished as shape {}", id);
                    }
                    None => editor.destroy(),
                }
                self.modes.reset();
            }
            return Ok(outcome);
        }

        if let Some((editor, action)) = self.sketch.clone() {
            let outcome = editor.handle_event(event)?;
            if outcome == EditOutcome::Completed {
                self.sketch = None;
                let line = editor.geometry();
                editor.destroy();
                let applied = self.run_sketch(action, line);
                self.modes.reset();
                applied?;
            }
            return Ok(outcome);
        }

        if let Some(id) = self.editing_id() {
            let editor = self
                .editors
                .get(&id)
                .cloned()
                .ok_or_else(|| Error::other(format!("editor for shape {} is missing", id)))?;
            let outcome = editor.handle_event(event)?;
            self.sync(id);
            if outcome != EditOutcome::Ignored {
                return Ok(outcome);
            }
        }

        match event {
            PointerEvent::SecondaryActivation { x, y } => self.enter_editing_at(Point::new(x, y)),
            _ => Ok(EditOutcome::Ignored),
        }
    }

    /// Commit the shape being edited.
    pub fn commit(&mut self) -> Result<EditOutcome> {
        let Some(id) = self.editing_id() else {
            return Ok(EditOutcome::Ignored);
        };
        let outcome = match self.editors.get(&id) {
            Some(editor) => editor.commit()?,
            None => EditOutcome::Ignored,
        };
        self.sync(id);
        self.modes.reset();
        Ok(outcome)
    }

    /// Drop an unfinished drawing or sketch, or abandon the current edit.
    pub fn cancel(&mut self) -> Result<EditOutcome> {
        let outcome = if self.drawing.is_some() || self.sketch.is_some() {
            self.discard_pending();
            EditOutcome::Cancelled
        } else if let Some(id) = self.editing_id() {
            let outcome = match self.editors.get(&id) {
                Some(editor) => editor.cancel()?,
                None => EditOutcome::Ignored,
            };
            self.sync(id);
            outcome
        } else {
            EditOutcome::Ignored
        };
        self.modes.reset();
        Ok(outcome)
    }

    /// Every stored shape as a GeoJSON FeatureCollection.
    pub fn feature_collection(&self) -> Value {
        let segments = self.config.editor.circle_segments;
        let features: Vec<Value> = self
            .store
            .iter()
            .map(|(id, geometry)| {
                let kind = ShapeKind::for_geometry(geometry);
                json!({
                    "type": "Feature",
                    "id": id,
                    "properties": { "kind": kind, "area": geometry.area() },
                    "geometry": geometry.geojson(segments),
                })
            })
            .collect();
        json!({ "type": "FeatureCollection", "features": features })
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.discard_pending();
        for editor in self.editors.values() {
            editor.destroy();
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("mode", &self.modes.mode())
            .field("shapes", &self.store.len())
            .field("drawing", &self.drawing.is_some())
            .field("sketching", &self.sketch.is_some())
            .field("selection", &self.topology.selection().ids())
            .finish()
    }
}
