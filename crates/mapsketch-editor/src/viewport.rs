//! Map surface abstraction and a headless viewport.
//!
//! Editors never talk to a real map widget. They go through [`MapSurface`],
//! which converts between world and screen coordinates and exposes the
//! surface's cursor and interaction affordances (double-click zoom and drag
//! pan). [`MapView`] implements it over a [`Viewport`] for tests, the replay
//! binary and simple hosts.

use std::fmt;

use serde::{Deserialize, Serialize};

use mapsketch_core::constants::{DEFAULT_VIEW_HEIGHT, DEFAULT_VIEW_WIDTH};

use crate::model::{Bounds, Point, ScreenPoint};

const MIN_ZOOM: f64 = 1e-6;
const MAX_ZOOM: f64 = 1e9;

/// Pointer cursor requested by an editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cursor {
    #[default]
    Default,
    Crosshair,
    Move,
    Pointer,
}

/// Host map surface consulted and driven by editors.
pub trait MapSurface {
    /// World to screen pixels.
    fn project(&self, point: Point) -> ScreenPoint;

    /// Screen pixels to world.
    fn unproject(&self, point: ScreenPoint) -> Point;

    fn set_cursor(&mut self, cursor: Cursor);

    /// Enable or disable double-click zoom and drag pan.
    fn set_interactions_enabled(&mut self, enabled: bool);

    fn interactions_enabled(&self) -> bool;

    /// Screen distance between two world points.
    fn screen_distance(&self, a: Point, b: Point) -> f64 {
        self.project(a).distance_to(&self.project(b))
    }
}

/// Linear map between screen pixels (origin top-left, Y down) and world
/// units (Y up).
///
/// `origin` is the world point drawn at the top-left pixel and `scale` is
/// pixels per world unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    origin: Point,
    scale: f64,
    width: f64,
    height: f64,
}

impl Viewport {
    /// One world unit per pixel with the world origin on the bottom-left
    /// pixel.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(0.0, height),
            scale: 1.0,
            width,
            height,
        }
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Change the pixel size, keeping the world point under the bottom-left
    /// pixel in place.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.origin.y += (height - self.height) / self.scale;
        self.width = width;
        self.height = height;
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Out-of-range or non-finite scales are ignored.
    pub fn set_scale(&mut self, scale: f64) {
        if (MIN_ZOOM..=MAX_ZOOM).contains(&scale) {
            self.scale = scale;
        }
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Move the view by a screen offset, like a drag pan.
    pub fn scroll_by(&mut self, dx: f64, dy: f64) {
        self.origin.x -= dx / self.scale;
        self.origin.y += dy / self.scale;
    }

    pub fn to_world(&self, p: ScreenPoint) -> Point {
        Point::new(
            self.origin.x + p.x / self.scale,
            self.origin.y - p.y / self.scale,
        )
    }

    pub fn to_screen(&self, p: Point) -> ScreenPoint {
        ScreenPoint::new(
            (p.x - self.origin.x) * self.scale,
            (self.origin.y - p.y) * self.scale,
        )
    }

    /// Put `center` in the middle of the screen.
    pub fn look_at(&mut self, center: Point) {
        self.origin = Point::new(
            center.x - self.width / (2.0 * self.scale),
            center.y + self.height / (2.0 * self.scale),
        );
    }

    /// Change the scale while `anchor` stays on the same pixel.
    pub fn zoom_about(&mut self, anchor: Point, scale: f64) {
        if !(MIN_ZOOM..=MAX_ZOOM).contains(&scale) {
            return;
        }
        let pinned = self.to_screen(anchor);
        self.scale = scale;
        self.origin = Point::new(anchor.x - pinned.x / scale, anchor.y + pinned.y / scale);
    }

    /// Show all of `bounds` with at least `margin_px` pixels on every side.
    pub fn frame(&mut self, bounds: &Bounds, margin_px: f64) {
        let room_x = (self.width - 2.0 * margin_px).max(1.0);
        let room_y = (self.height - 2.0 * margin_px).max(1.0);
        let fit = [(room_x, bounds.width()), (room_y, bounds.height())]
            .iter()
            .filter(|(_, extent)| *extent > 0.0)
            .map(|(room, extent)| room / extent)
            .fold(f64::INFINITY, f64::min);
        if fit.is_finite() {
            self.scale = fit.clamp(MIN_ZOOM, MAX_ZOOM);
        }
        let (cx, cy) = bounds.center();
        self.look_at(Point::new(cx, cy));
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} px at {:.3} px/unit from ({:.2}, {:.2})",
            self.width, self.height, self.scale, self.origin.x, self.origin.y
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(DEFAULT_VIEW_WIDTH, DEFAULT_VIEW_HEIGHT)
    }
}

/// Headless map surface: a viewport plus cursor and interaction flags.
#[derive(Debug, Clone)]
pub struct MapView {
    pub viewport: Viewport,
    cursor: Cursor,
    interactions_enabled: bool,
}

impl MapView {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            cursor: Cursor::Default,
            interactions_enabled: true,
        }
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }
}

impl Default for MapView {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl MapSurface for MapView {
    fn project(&self, point: Point) -> ScreenPoint {
        self.viewport.to_screen(point)
    }

    fn unproject(&self, point: ScreenPoint) -> Point {
        self.viewport.to_world(point)
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    fn set_interactions_enabled(&mut self, enabled: bool) {
        self.interactions_enabled = enabled;
    }

    fn interactions_enabled(&self) -> bool {
        self.interactions_enabled
    }
}
