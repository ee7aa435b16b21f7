//! The shape editor: one shape's lifecycle from pointer events to geometry.
//!
//! A [`ShapeEditor`] is a cheap handle over shared internals. The internals
//! are registered with the [`ActivationRegistry`] so another editor taking
//! the active slot can force this one out of editing.
//!
//! State listeners are always invoked after the internal borrow is released,
//! so a listener may call back into the editor.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, warn};

use mapsketch_core::types::{LocalCallback, Shared};
use mapsketch_core::{EditorError, EditorResult};
use mapsketch_settings::{Config, EditorSettings, ShapeStyle, StyleSettings};

use super::kind::ShapeKind;
use super::state::{
    DragTarget, EditOutcome, EditorState, Handle, HandleKind, ListenerId, PointerEvent,
};
use crate::activation::{Activatable, ActivationRegistry, EditorId};
use crate::history::History;
use crate::model::{ring, EdgeRef, Geometry, Point, Shape, Vector, VertexRef};
use crate::snapping::{SnapController, SnapHit};
use crate::throttle::Throttle;
use crate::viewport::{Cursor, MapSurface};

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, LocalCallback<EditorState>)>,
    notifying: bool,
    removed: Vec<ListenerId>,
    cleared: bool,
}

impl Listeners {
    fn clear(&mut self) {
        self.entries.clear();
        if self.notifying {
            self.cleared = true;
        }
    }
}

#[derive(Debug, Clone)]
struct DragState {
    target: DragTarget,
    origin: Point,
    start: Geometry,
}

struct EditorInner {
    kind: ShapeKind,
    settings: EditorSettings,
    styles: StyleSettings,
    state: EditorState,
    destroyed: bool,
    visible: bool,
    shape: Option<Shape>,
    draft: Vec<Point>,
    cursor: Option<Point>,
    snap: SnapController,
    history: History<Geometry>,
    drag: Option<DragState>,
    throttle: Throttle<Point>,
    surface: Shared<dyn MapSurface>,
    owns_interaction: bool,
}

impl EditorInner {
    fn new(kind: ShapeKind, config: &Config, surface: Shared<dyn MapSurface>) -> Self {
        Self {
            kind,
            settings: config.editor.clone(),
            styles: config.styles.clone(),
            state: EditorState::Idle,
            destroyed: false,
            visible: true,
            shape: None,
            draft: Vec::new(),
            cursor: None,
            snap: SnapController::new(config.snapping.clone(), config.editor.circle_segments),
            history: History::new(config.editor.max_history),
            drag: None,
            throttle: Throttle::from_millis(config.editor.move_throttle_ms),
            surface,
            owns_interaction: false,
        }
    }

    fn style_for(&self, valid: bool) -> ShapeStyle {
        if valid {
            self.styles.normal.clone()
        } else {
            self.styles.error.clone()
        }
    }

    fn acquire_surface(&mut self, cursor: Cursor) {
        let mut surface = self.surface.borrow_mut();
        surface.set_interactions_enabled(false);
        surface.set_cursor(cursor);
        self.owns_interaction = true;
    }

    fn release_surface(&mut self) {
        if !self.owns_interaction {
            return;
        }
        let mut surface = self.surface.borrow_mut();
        surface.set_interactions_enabled(true);
        surface.set_cursor(Cursor::Default);
        self.owns_interaction = false;
    }

    fn snap_point(&mut self, p: Point) -> Point {
        let surface = self.surface.borrow();
        self.snap.snap(p, &*surface)
    }

    fn snap_offset(&mut self, points: &[Point]) -> Vector {
        let surface = self.surface.borrow();
        self.snap
            .snap_translation(points, &*surface)
            .unwrap_or(Vector::ZERO)
    }

    fn screen_distance(&self, a: Point, b: Point) -> f64 {
        self.surface.borrow().screen_distance(a, b)
    }

    fn screen_segment_distance(&self, p: Point, a: Point, b: Point) -> f64 {
        let surface = self.surface.borrow();
        let to_point = |q: Point| {
            let s = surface.project(q);
            Point::new(s.x, s.y)
        };
        ring::distance_to_segment(&to_point(p), &to_point(a), &to_point(b))
    }

    fn is_duplicate(&self, a: Point, b: Point) -> bool {
        a.approx_eq(&b) || self.screen_distance(a, b) < self.settings.duplicate_tolerance_px
    }

    fn set_geometry(&mut self, geometry: Geometry) -> bool {
        let valid = self
            .kind
            .is_valid(&geometry, self.settings.allow_self_intersect);
        let style = self.style_for(valid);
        let visible = self.visible;
        match self.shape.as_mut() {
            Some(shape) => {
                shape.geometry = geometry;
                shape.valid = valid;
                shape.style = style;
            }
            None => {
                self.shape = Some(Shape {
                    geometry,
                    style,
                    valid,
                    visible,
                });
            }
        }
        valid
    }

    fn mark_invalid(&mut self) {
        let style = self.styles.error.clone();
        if let Some(shape) = self.shape.as_mut() {
            shape.valid = false;
            shape.style = style;
        }
    }

    fn current_geometry(&self) -> Option<Geometry> {
        self.shape.as_ref().map(|s| s.geometry.clone())
    }

    // ---- drawing ----

    fn begin_drawing(&mut self) -> EditOutcome {
        self.state = EditorState::Drawing;
        self.shape = None;
        self.draft.clear();
        self.cursor = None;
        self.drag = None;
        self.history.clear();
        self.throttle.reset();
        self.acquire_surface(Cursor::Crosshair);
        debug!("{} editor started drawing", self.kind);
        EditOutcome::DrawingStarted
    }

    fn place(&mut self, geometry: Geometry) -> EditorResult<EditOutcome> {
        if !self.kind.accepts(&geometry) {
            return Err(EditorError::KindMismatch {
                kind: self.kind.to_string(),
                geometry: geometry.kind().to_string(),
            });
        }
        let geometry = self.kind.normalize(geometry);
        self.shape = None;
        self.set_geometry(geometry);
        self.state = EditorState::Idle;
        debug!("{} editor placed an existing shape", self.kind);
        Ok(EditOutcome::Placed)
    }

    fn refresh_preview(&mut self) -> bool {
        match self.kind.preview(&self.draft, self.cursor) {
            Some(geometry) => self.set_geometry(geometry),
            None => {
                self.shape = None;
                true
            }
        }
    }

    fn complete(&mut self, geometry: Geometry) {
        let style = self.styles.normal.clone();
        let mut shape = Shape::new(geometry, style);
        shape.visible = self.visible;
        self.shape = Some(shape);
        self.draft.clear();
        self.cursor = None;
        self.throttle.reset();
        self.state = EditorState::Idle;
        self.release_surface();
        debug!("{} editor completed its shape", self.kind);
    }

    fn primary_click(&mut self, p: Point) -> EditorResult<EditOutcome> {
        if self.state != EditorState::Drawing {
            return Ok(EditOutcome::Ignored);
        }
        self.throttle.reset();
        self.cursor = None;
        let p = self.snap_point(p);

        if let Some(needed) = self.kind.clicks_to_complete() {
            let mut points = self.draft.clone();
            points.push(p);
            if points.len() < needed {
                self.draft = points;
                self.refresh_preview();
                return Ok(EditOutcome::VertexAdded {
                    count: self.draft.len(),
                });
            }
            let geometry = self
                .kind
                .build(&points, self.settings.allow_self_intersect)?;
            self.complete(geometry);
            return Ok(EditOutcome::Completed);
        }

        if self.kind == ShapeKind::Polygon && !self.settings.allow_self_intersect {
            let mut candidate = self.draft.clone();
            candidate.push(p);
            if ring::self_intersects(&ring::normalize(&candidate)) {
                warn!("Rejected vertex {}: ring would self-intersect", p);
                self.mark_invalid();
                return Ok(EditOutcome::VertexRejected);
            }
        }

        self.draft.push(p);
        self.refresh_preview();
        Ok(EditOutcome::VertexAdded {
            count: self.draft.len(),
        })
    }

    fn finish_drawing(&mut self, p: Point) -> EditorResult<EditOutcome> {
        if self.kind.clicks_to_complete().is_some() {
            return Ok(EditOutcome::Ignored);
        }
        let mut points = self.draft.clone();
        while points.len() >= 2 && self.is_duplicate(points[points.len() - 1], points[points.len() - 2]) {
            points.pop();
        }
        let p = self.snap_point(p);
        if points.last().is_none_or(|last| !self.is_duplicate(*last, p)) {
            points.push(p);
        }

        let geometry = self
            .kind
            .build(&points, self.settings.allow_self_intersect)
            .inspect_err(|e| warn!("{} drawing not finalized: {}", self.kind, e))?;
        self.complete(geometry);
        Ok(EditOutcome::Completed)
    }

    fn preview_at(&mut self, p: Point) -> EditOutcome {
        if self.draft.is_empty() {
            return EditOutcome::Ignored;
        }
        let p = self.snap_point(p);
        self.cursor = Some(p);
        let valid = self.refresh_preview();
        EditOutcome::PreviewUpdated { valid }
    }

    // ---- editing ----

    fn hit_body(&self, p: Point) -> bool {
        let Some(shape) = &self.shape else {
            return false;
        };
        let tolerance = self.settings.handle_tolerance_px;
        match &shape.geometry {
            Geometry::Point(q) => self.screen_distance(p, *q) <= tolerance,
            Geometry::LineString(points) => points
                .windows(2)
                .any(|w| self.screen_segment_distance(p, w[0], w[1]) <= tolerance),
            geometry => geometry.contains(&p),
        }
    }

    fn handles(&self) -> Vec<Handle> {
        if self.state != EditorState::Editing {
            return Vec::new();
        }
        let Some(shape) = &self.shape else {
            return Vec::new();
        };
        let ratio = self.settings.midpoint_ratio;
        let mut handles = Vec::new();
        for (part, ring_index, points, closed) in shape.geometry.rings() {
            if self.kind.has_vertex_handles() {
                for (index, p) in points.iter().enumerate() {
                    handles.push(Handle {
                        kind: HandleKind::Vertex(VertexRef::new(part, ring_index, index)),
                        position: *p,
                    });
                }
            }
            if self.kind.has_midpoint_handles() && points.len() >= 2 {
                let n = points.len();
                let edge_count = if closed { n } else { n - 1 };
                for index in 0..edge_count {
                    let a = points[index];
                    let b = points[(index + 1) % n];
                    handles.push(Handle {
                        kind: HandleKind::Midpoint(EdgeRef::new(part, ring_index, index)),
                        position: a.lerp(&b, ratio),
                    });
                }
            }
        }
        handles
    }

    /// Closest vertex handle within tolerance, else closest midpoint handle.
    fn hit_handle(&self, p: Point) -> Option<HandleKind> {
        let tolerance = self.settings.handle_tolerance_px;
        let handles = self.handles();
        let closest = |want_vertex: bool| {
            handles
                .iter()
                .filter(|h| matches!(h.kind, HandleKind::Vertex(_)) == want_vertex)
                .map(|h| (h.kind, self.screen_distance(p, h.position)))
                .filter(|(_, d)| *d <= tolerance)
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(kind, _)| kind)
        };
        closest(true).or_else(|| closest(false))
    }

    fn begin_editing(&mut self) -> EditorResult<EditOutcome> {
        let geometry = self
            .current_geometry()
            .ok_or_else(|| EditorError::invalid_state("start_editing", "no shape"))?;
        self.history = History::new(self.settings.max_history);
        self.history.begin(geometry);
        self.drag = None;
        self.throttle.reset();
        self.state = EditorState::Editing;
        self.acquire_surface(Cursor::Pointer);
        debug!("{} editor entered editing", self.kind);
        Ok(EditOutcome::EnteredEditing)
    }

    fn insert_at(&mut self, edge: EdgeRef) -> EditorResult<VertexRef> {
        if !self.kind.supports_insertion() {
            return Err(EditorError::Unsupported {
                kind: self.kind.to_string(),
                operation: "vertex insertion".to_string(),
            });
        }
        let ratio = self.settings.midpoint_ratio;
        let not_found = EditorError::VertexNotFound {
            part: edge.part,
            ring: edge.ring,
            index: edge.index,
        };
        let shape = self.shape.as_mut().ok_or_else(|| not_found.clone())?;
        let closed = !matches!(shape.geometry, Geometry::LineString(_));
        let points = shape
            .geometry
            .ring_mut(edge.part, edge.ring)
            .ok_or_else(|| not_found.clone())?;
        let n = points.len();
        let edge_count = if closed { n } else { n.saturating_sub(1) };
        if edge.index >= edge_count {
            return Err(not_found);
        }
        let a = points[edge.index];
        let b = points[(edge.index + 1) % n];
        points.insert(edge.index + 1, a.lerp(&b, ratio));

        let snapshot = shape.geometry.clone();
        self.history.push(snapshot);
        let inserted = VertexRef::new(edge.part, edge.ring, edge.index + 1);
        debug!("Inserted vertex {:?}", inserted);
        Ok(inserted)
    }

    fn insert_vertex(&mut self, edge: EdgeRef) -> EditorResult<EditOutcome> {
        if self.state != EditorState::Editing {
            return Err(EditorError::invalid_state("insert_vertex", self.state));
        }
        self.insert_at(edge).map(EditOutcome::VertexInserted)
    }

    fn remove_vertex(&mut self, at: VertexRef) -> EditorResult<EditOutcome> {
        if self.state != EditorState::Editing {
            return Err(EditorError::invalid_state("remove_vertex", self.state));
        }
        let floor = self.kind.vertex_floor().ok_or_else(|| EditorError::Unsupported {
            kind: self.kind.to_string(),
            operation: "vertex removal".to_string(),
        })?;
        let not_found = EditorError::VertexNotFound {
            part: at.part,
            ring: at.ring,
            index: at.index,
        };
        let shape = self.shape.as_mut().ok_or_else(|| not_found.clone())?;
        let points = shape
            .geometry
            .ring_mut(at.part, at.ring)
            .ok_or_else(|| not_found.clone())?;
        if at.index >= points.len() {
            return Err(not_found);
        }
        if points.len() <= floor {
            warn!(
                "Rejected removal of {:?}: ring would drop below {} vertices",
                at, floor
            );
            return Err(EditorError::VertexFloor { minimum: floor });
        }
        points.remove(at.index);

        let snapshot = shape.geometry.clone();
        self.drag = None;
        self.history.push(snapshot);
        debug!("Removed vertex {:?}", at);
        Ok(EditOutcome::VertexRemoved(at))
    }

    fn pointer_down(&mut self, p: Point) -> EditorResult<EditOutcome> {
        if self.state != EditorState::Editing {
            return Ok(EditOutcome::Ignored);
        }
        let (target, outcome) = match self.hit_handle(p) {
            Some(HandleKind::Vertex(v)) => (DragTarget::Vertex(v), None),
            Some(HandleKind::Midpoint(edge)) if self.kind.supports_insertion() => {
                let v = self.insert_at(edge)?;
                (DragTarget::Vertex(v), Some(EditOutcome::VertexInserted(v)))
            }
            Some(HandleKind::Midpoint(edge)) => (DragTarget::Edge(edge), None),
            None if self.hit_body(p) => (DragTarget::Body, None),
            None => return Ok(EditOutcome::Ignored),
        };
        let Some(start) = self.current_geometry() else {
            return Ok(EditOutcome::Ignored);
        };
        self.drag = Some(DragState {
            target,
            origin: p,
            start,
        });
        self.throttle.reset();
        Ok(outcome.unwrap_or(EditOutcome::DragStarted(target)))
    }

    fn apply_drag(&mut self, p: Point) -> EditOutcome {
        let Some(drag) = self.drag.clone() else {
            return EditOutcome::Ignored;
        };
        let geometry = match drag.target {
            DragTarget::Vertex(v) => {
                let target = self.snap_point(p);
                self.kind.drag_vertex(&drag.start, v, target)
            }
            DragTarget::Edge(edge) => self.drag_edge(&drag, edge, p),
            DragTarget::Body => {
                let moved = drag.start.translated(p - drag.origin);
                let correction = self.snap_offset(&moved.vertices());
                Some(moved.translated(correction))
            }
        };
        match geometry {
            Some(geometry) => {
                let valid = self.set_geometry(geometry);
                EditOutcome::Dragged { valid }
            }
            None => EditOutcome::Ignored,
        }
    }

    fn drag_edge(&mut self, drag: &DragState, edge: EdgeRef, p: Point) -> Option<Geometry> {
        let (ax, ay) = self.kind.edge_axis(edge)?;
        let raw = p - drag.origin;
        let delta = Vector::new(raw.dx * ax, raw.dy * ay);
        let n = drag.start.ring(edge.part, edge.ring)?.len();
        let a = drag.start.vertex(edge.start())?;
        let b = drag
            .start
            .vertex(VertexRef::new(edge.part, edge.ring, (edge.index + 1) % n))?;
        let correction = self.snap_offset(&[a + delta, b + delta]);
        let delta = Vector::new(delta.dx + correction.dx * ax, delta.dy + correction.dy * ay);
        self.kind.drag_edge(&drag.start, edge, delta)
    }

    fn pointer_move(&mut self, p: Point, at: Instant) -> EditOutcome {
        match self.state {
            EditorState::Drawing => match self.throttle.offer(at, p) {
                Some(p) => self.preview_at(p),
                None => EditOutcome::Throttled,
            },
            EditorState::Editing if self.drag.is_some() => match self.throttle.offer(at, p) {
                Some(p) => self.apply_drag(p),
                None => EditOutcome::Throttled,
            },
            _ => EditOutcome::Ignored,
        }
    }

    fn pointer_up(&mut self) -> EditOutcome {
        let pending = self.throttle.flush();
        match self.state {
            EditorState::Drawing => pending.map_or(EditOutcome::Ignored, |p| self.preview_at(p)),
            EditorState::Editing => {
                if let Some(p) = pending {
                    self.apply_drag(p);
                }
                if self.drag.take().is_none() {
                    return EditOutcome::Ignored;
                }
                if !self.shape.as_ref().is_some_and(|s| s.valid) {
                    if let Some(last) = self.history.current().cloned() {
                        self.set_geometry(last);
                    }
                    warn!("{} editor rolled back a drag onto an invalid shape", self.kind);
                    return EditOutcome::DragReverted;
                }
                let current = self.current_geometry();
                let changed = current.as_ref() != self.history.current();
                if let Some(geometry) = current.filter(|_| changed) {
                    self.history.push(geometry);
                }
                EditOutcome::DragEnded { changed }
            }
            EditorState::Idle => EditOutcome::Ignored,
        }
    }

    fn context_action(&mut self, p: Point) -> EditorResult<EditOutcome> {
        if self.state != EditorState::Editing {
            return Ok(EditOutcome::Ignored);
        }
        match self.hit_handle(p) {
            Some(HandleKind::Vertex(v)) => self.remove_vertex(v),
            _ => Ok(EditOutcome::Ignored),
        }
    }

    fn restore(&mut self, snapshot: Option<Geometry>, outcome: EditOutcome) -> EditOutcome {
        match snapshot {
            Some(geometry) => {
                self.drag = None;
                self.set_geometry(geometry);
                outcome
            }
            None => EditOutcome::Ignored,
        }
    }

    fn undo(&mut self) -> EditOutcome {
        if self.state != EditorState::Editing {
            return EditOutcome::Ignored;
        }
        let snapshot = self.history.undo();
        self.restore(snapshot, EditOutcome::Undone)
    }

    fn redo(&mut self) -> EditOutcome {
        if self.state != EditorState::Editing {
            return EditOutcome::Ignored;
        }
        let snapshot = self.history.redo();
        self.restore(snapshot, EditOutcome::Redone)
    }

    fn reset_to_initial(&mut self) -> EditOutcome {
        if self.state != EditorState::Editing {
            return EditOutcome::Ignored;
        }
        let snapshot = self.history.reset_to_initial();
        self.restore(snapshot, EditOutcome::Reset)
    }

    fn commit(&mut self) -> EditorResult<EditOutcome> {
        if self.state != EditorState::Editing {
            return Err(EditorError::invalid_state("commit", self.state));
        }
        let geometry = self
            .current_geometry()
            .ok_or_else(|| EditorError::invalid_state("commit", "no shape"))?;
        if !self.kind.is_valid(&geometry, self.settings.allow_self_intersect) {
            return Err(EditorError::invalid_geometry(format!(
                "{} cannot be committed in its current form",
                self.kind
            )));
        }
        self.history.commit(geometry);
        self.drag = None;
        self.throttle.reset();
        self.state = EditorState::Idle;
        self.release_surface();
        debug!("{} editor committed its edits", self.kind);
        Ok(EditOutcome::Committed)
    }

    fn cancel(&mut self) -> EditOutcome {
        match self.state {
            EditorState::Drawing => {
                self.draft.clear();
                self.cursor = None;
                self.shape = None;
            }
            EditorState::Editing => {
                if let Some(initial) = self.history.initial().cloned() {
                    self.set_geometry(initial);
                }
                self.history.clear();
                self.drag = None;
            }
            EditorState::Idle => return EditOutcome::Ignored,
        }
        self.throttle.reset();
        self.state = EditorState::Idle;
        self.release_surface();
        debug!("{} editor cancelled", self.kind);
        EditOutcome::Cancelled
    }

    /// Leave Drawing or Editing because another editor took the slot.
    /// Edits made so far are kept; an unfinished drawing is discarded.
    fn force_exit(&mut self) -> bool {
        match self.state {
            EditorState::Editing => {
                if !self.shape.as_ref().is_some_and(|s| s.valid) {
                    if let Some(last) = self.history.current().cloned() {
                        self.set_geometry(last);
                    }
                }
                if let Some(geometry) = self.current_geometry() {
                    self.history.commit(geometry);
                }
                self.drag = None;
            }
            EditorState::Drawing => {
                self.draft.clear();
                self.cursor = None;
                self.shape = None;
            }
            EditorState::Idle => {
                self.release_surface();
                return false;
            }
        }
        self.throttle.reset();
        self.state = EditorState::Idle;
        self.release_surface();
        debug!("{} editor force-exited", self.kind);
        true
    }

    fn destroy(&mut self) {
        self.destroyed = true;
        self.state = EditorState::Idle;
        self.shape = None;
        self.draft.clear();
        self.cursor = None;
        self.drag = None;
        self.history.clear();
        self.snap.clear_sources();
        self.throttle.reset();
        self.release_surface();
    }
}

struct EditorShared {
    id: EditorId,
    registry: ActivationRegistry,
    inner: RefCell<EditorInner>,
    listeners: RefCell<Listeners>,
}

impl EditorShared {
    fn state(&self) -> EditorResult<EditorState> {
        let inner = self.inner.borrow();
        if inner.destroyed {
            Err(EditorError::Destroyed)
        } else {
            Ok(inner.state)
        }
    }

    /// Run `op` on the internals, then notify listeners if the state moved.
    fn run<F>(&self, op: F) -> EditorResult<EditOutcome>
    where
        F: FnOnce(&mut EditorInner) -> EditorResult<EditOutcome>,
    {
        let (result, before, after) = {
            let mut inner = self.inner.borrow_mut();
            if inner.destroyed {
                return Err(EditorError::Destroyed);
            }
            let before = inner.state;
            let result = op(&mut inner);
            (result, before, inner.state)
        };
        if before != after {
            self.notify(after);
        }
        result
    }

    /// Like [`run`](Self::run) but only for the editor holding the active
    /// slot with a visible shape; others ignore the event.
    fn run_active<F>(&self, op: F) -> EditorResult<EditOutcome>
    where
        F: FnOnce(&mut EditorInner) -> EditorResult<EditOutcome>,
    {
        let active = self.registry.is_active(self.id);
        self.run(|inner| {
            if !active || !inner.visible {
                return Ok(EditOutcome::Ignored);
            }
            op(inner)
        })
    }

    fn notify(&self, state: EditorState) {
        let mut entries = {
            let mut listeners = self.listeners.borrow_mut();
            listeners.notifying = true;
            std::mem::take(&mut listeners.entries)
        };
        for (_, listener) in entries.iter_mut() {
            listener(state);
        }

        let mut listeners = self.listeners.borrow_mut();
        listeners.notifying = false;
        if std::mem::take(&mut listeners.cleared) {
            listeners.removed.clear();
            return;
        }
        let removed = std::mem::take(&mut listeners.removed);
        entries.retain(|(id, _)| !removed.contains(id));
        let added = std::mem::replace(&mut listeners.entries, entries);
        listeners.entries.extend(added);
    }
}

impl Activatable for EditorShared {
    fn force_exit(&self) {
        let changed = match self.inner.try_borrow_mut() {
            Ok(mut inner) => inner.force_exit(),
            Err(_) => {
                warn!("{} is busy and cannot be force-exited", self.id);
                false
            }
        };
        if changed {
            self.notify(EditorState::Idle);
        }
    }

    fn is_drawing(&self) -> bool {
        self.inner
            .try_borrow()
            .map(|inner| inner.state == EditorState::Drawing)
            .unwrap_or(false)
    }

    fn is_visible(&self) -> bool {
        self.inner
            .try_borrow()
            .map(|inner| inner.visible)
            .unwrap_or(false)
    }
}

impl Drop for EditorShared {
    fn drop(&mut self) {
        self.inner.get_mut().release_surface();
        self.registry.unregister(self.id);
    }
}

/// Editor for one shape of a given [`ShapeKind`].
///
/// Cloning yields another handle to the same editor.
#[derive(Clone)]
pub struct ShapeEditor {
    shared: Rc<EditorShared>,
}

impl ShapeEditor {
    pub fn new(
        kind: ShapeKind,
        config: &Config,
        registry: &ActivationRegistry,
        surface: Shared<dyn MapSurface>,
    ) -> Self {
        let shared = Rc::new_cyclic(|weak: &Weak<EditorShared>| {
            let handle: Weak<dyn Activatable> = weak.clone();
            EditorShared {
                id: registry.register(handle),
                registry: registry.clone(),
                inner: RefCell::new(EditorInner::new(kind, config, surface)),
                listeners: RefCell::new(Listeners::default()),
            }
        });
        debug!("Created {} editor {}", kind, shared.id);
        Self { shared }
    }

    pub fn id(&self) -> EditorId {
        self.shared.id
    }

    pub fn kind(&self) -> ShapeKind {
        self.shared.inner.borrow().kind
    }

    pub fn state(&self) -> EditorState {
        self.shared.inner.borrow().state
    }

    pub fn is_destroyed(&self) -> bool {
        self.shared.inner.borrow().destroyed
    }

    /// True when this editor holds the active slot and its shape is visible.
    pub fn is_active(&self) -> bool {
        self.shared.registry.is_active(self.shared.id) && self.shared.inner.borrow().visible
    }

    /// Take the active slot, force-exiting the previous holder.
    pub fn activate(&self) -> bool {
        self.shared.registry.activate(self.shared.id)
    }

    pub fn deactivate(&self) -> bool {
        self.shared.registry.deactivate(self.shared.id)
    }

    pub fn geometry(&self) -> Option<Geometry> {
        self.shared.inner.borrow().current_geometry()
    }

    pub fn shape(&self) -> Option<Shape> {
        self.shared.inner.borrow().shape.clone()
    }

    /// The shape as a GeoJSON geometry object.
    pub fn geojson(&self) -> Option<Value> {
        let inner = self.shared.inner.borrow();
        let segments = inner.settings.circle_segments;
        inner.shape.as_ref().map(|s| s.geometry.geojson(segments))
    }

    /// Vertex and midpoint handles; empty unless Editing.
    pub fn handles(&self) -> Vec<Handle> {
        self.shared.inner.borrow().handles()
    }

    pub fn set_visible(&self, visible: bool) {
        let mut inner = self.shared.inner.borrow_mut();
        inner.visible = visible;
        if let Some(shape) = inner.shape.as_mut() {
            shape.visible = visible;
        }
    }

    /// Rebuild the snap index from the shapes this one may align to.
    pub fn set_snap_sources(&self, sources: &[Geometry]) {
        self.shared.inner.borrow_mut().snap.set_sources(sources);
    }

    pub fn set_snapping_enabled(&self, enabled: bool) {
        self.shared.inner.borrow_mut().snap.set_enabled(enabled);
    }

    /// Most recent snap target, for highlight feedback.
    pub fn snap_hit(&self) -> Option<SnapHit> {
        self.shared.inner.borrow().snap.last_hit()
    }

    pub fn can_undo(&self) -> bool {
        self.shared.inner.borrow().history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.shared.inner.borrow().history.can_redo()
    }

    /// Start drawing a new shape, or place `existing` for later editing.
    pub fn begin(&self, existing: Option<Geometry>) -> EditorResult<EditOutcome> {
        let state = self.shared.state()?;
        if state != EditorState::Idle {
            return Err(EditorError::invalid_state("begin", state));
        }
        match existing {
            None => {
                self.activate();
                self.shared.run(|inner| Ok(inner.begin_drawing()))
            }
            Some(geometry) => self.shared.run(|inner| inner.place(geometry)),
        }
    }

    /// Enter Editing without a double activation.
    pub fn start_editing(&self) -> EditorResult<EditOutcome> {
        let state = self.shared.state()?;
        if state != EditorState::Idle {
            return Err(EditorError::invalid_state("start_editing", state));
        }
        {
            let inner = self.shared.inner.borrow();
            if !inner.kind.is_editable() {
                return Err(EditorError::Unsupported {
                    kind: inner.kind.to_string(),
                    operation: "editing".to_string(),
                });
            }
            if inner.shape.is_none() {
                return Err(EditorError::invalid_state("start_editing", "no shape"));
            }
        }
        if !self.shared.registry.can_claim(self.shared.id) {
            return Err(EditorError::invalid_state(
                "start_editing",
                "another editor is drawing",
            ));
        }
        self.activate();
        self.shared.run(|inner| inner.begin_editing())
    }

    pub fn on_primary_click(&self, p: Point) -> EditorResult<EditOutcome> {
        self.shared.run_active(|inner| inner.primary_click(p))
    }

    /// Finish a line or polygon, or enter Editing when the point lies on
    /// this Idle editor's own shape.
    pub fn on_secondary_activation(&self, p: Point) -> EditorResult<EditOutcome> {
        match self.shared.state()? {
            EditorState::Drawing => self.shared.run_active(|inner| inner.finish_drawing(p)),
            EditorState::Idle => {
                let hit = {
                    let inner = self.shared.inner.borrow();
                    inner.kind.is_editable() && inner.visible && inner.hit_body(p)
                };
                if !hit {
                    return Ok(EditOutcome::Ignored);
                }
                if !self.shared.registry.can_claim(self.shared.id) {
                    debug!("{} not claiming the slot from a drawing editor", self.shared.id);
                    return Ok(EditOutcome::Ignored);
                }
                self.activate();
                self.shared.run(|inner| inner.begin_editing())
            }
            EditorState::Editing => Ok(EditOutcome::Ignored),
        }
    }

    pub fn on_pointer_down(&self, p: Point) -> EditorResult<EditOutcome> {
        self.shared.run_active(|inner| inner.pointer_down(p))
    }

    pub fn on_pointer_move(&self, p: Point) -> EditorResult<EditOutcome> {
        self.on_pointer_move_at(p, Instant::now())
    }

    /// Pointer move with an explicit timestamp for the throttle.
    pub fn on_pointer_move_at(&self, p: Point, at: Instant) -> EditorResult<EditOutcome> {
        self.shared.run_active(|inner| Ok(inner.pointer_move(p, at)))
    }

    pub fn on_pointer_up(&self) -> EditorResult<EditOutcome> {
        self.shared.run_active(|inner| Ok(inner.pointer_up()))
    }

    /// Remove the vertex under `p`, if any.
    pub fn on_context_action(&self, p: Point) -> EditorResult<EditOutcome> {
        self.shared.run_active(|inner| inner.context_action(p))
    }

    pub fn remove_vertex(&self, at: VertexRef) -> EditorResult<EditOutcome> {
        self.shared.run(|inner| inner.remove_vertex(at))
    }

    /// Insert a vertex on `edge` at the configured midpoint ratio.
    pub fn insert_vertex(&self, edge: EdgeRef) -> EditorResult<EditOutcome> {
        self.shared.run(|inner| inner.insert_vertex(edge))
    }

    pub fn undo(&self) -> EditorResult<EditOutcome> {
        self.shared.run(|inner| Ok(inner.undo()))
    }

    pub fn redo(&self) -> EditorResult<EditOutcome> {
        self.shared.run(|inner| Ok(inner.redo()))
    }

    pub fn reset_to_initial(&self) -> EditorResult<EditOutcome> {
        self.shared.run(|inner| Ok(inner.reset_to_initial()))
    }

    /// Make the current geometry the new baseline and leave Editing.
    pub fn commit(&self) -> EditorResult<EditOutcome> {
        let outcome = self.shared.run(|inner| inner.commit())?;
        self.deactivate();
        Ok(outcome)
    }

    /// Abandon an unfinished drawing or discard the current edit session.
    pub fn cancel(&self) -> EditorResult<EditOutcome> {
        let outcome = self.shared.run(|inner| Ok(inner.cancel()))?;
        if outcome == EditOutcome::Cancelled {
            self.deactivate();
        }
        Ok(outcome)
    }

    /// Drop the shape, release the map surface, leave the registry and
    /// forget every listener. Safe to call more than once.
    pub fn destroy(&self) {
        {
            let mut inner = self.shared.inner.borrow_mut();
            if inner.destroyed {
                return;
            }
            inner.destroy();
        }
        self.shared.registry.unregister(self.shared.id);
        self.shared.listeners.borrow_mut().clear();
        debug!("Destroyed editor {}", self.shared.id);
    }

    /// Subscribe to state changes; fires once immediately with the current
    /// state when `fire_on_subscribe` is configured.
    pub fn on_state_change<F>(&self, listener: F) -> ListenerId
    where
        F: FnMut(EditorState) + 'static,
    {
        let fire_now = self.shared.inner.borrow().settings.fire_on_subscribe;
        self.on_state_change_with(listener, fire_now)
    }

    pub fn on_state_change_with<F>(&self, mut listener: F, fire_now: bool) -> ListenerId
    where
        F: FnMut(EditorState) + 'static,
    {
        let id = {
            let mut listeners = self.shared.listeners.borrow_mut();
            listeners.next_id += 1;
            ListenerId(listeners.next_id)
        };
        let (destroyed, state) = {
            let inner = self.shared.inner.borrow();
            (inner.destroyed, inner.state)
        };
        if destroyed {
            return id;
        }
        if fire_now {
            listener(state);
        }
        self.shared
            .listeners
            .borrow_mut()
            .entries
            .push((id, Box::new(listener)));
        id
    }

    /// Returns false when `id` was not subscribed.
    pub fn off_state_change(&self, id: ListenerId) -> bool {
        let mut listeners = self.shared.listeners.borrow_mut();
        let before = listeners.entries.len();
        listeners.entries.retain(|(lid, _)| *lid != id);
        if listeners.entries.len() != before {
            true
        } else if listeners.notifying {
            listeners.removed.push(id);
            true
        } else {
            false
        }
    }

    pub fn listener_count(&self) -> usize {
        self.shared.listeners.borrow().entries.len()
    }

    /// Dispatch a host pointer event.
    pub fn handle_event(&self, event: PointerEvent) -> EditorResult<EditOutcome> {
        match event {
            PointerEvent::PrimaryClick { x, y } => self.on_primary_click(Point::new(x, y)),
            PointerEvent::SecondaryActivation { x, y } => {
                self.on_secondary_activation(Point::new(x, y))
            }
            PointerEvent::PointerDown { x, y } => self.on_pointer_down(Point::new(x, y)),
            PointerEvent::PointerMove { x, y } => self.on_pointer_move(Point::new(x, y)),
            PointerEvent::PointerUp => self.on_pointer_up(),
            PointerEvent::ContextAction { x, y } => self.on_context_action(Point::new(x, y)),
        }
    }
}

impl std::fmt::Debug for ShapeEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.shared.inner.borrow();
        f.debug_struct("ShapeEditor")
            .field("id", &self.shared.id)
            .field("kind", &inner.kind)
            .field("state", &inner.state)
            .field("destroyed", &inner.destroyed)
            .finish()
    }
}
