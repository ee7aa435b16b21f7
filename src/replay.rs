//! Replay of recorded interaction scripts.
//!
//! A script is a list of steps: start a drawing, feed a pointer event,
//! toggle a shape in the selection, sketch a clip or reshape, merge, commit
//! or cancel. Steps run against a headless [`Session`]; a step that fails is
//! reported and the replay carries on with the next one.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use mapsketch_core::{shared, Shared};
use mapsketch_editor::{Geometry, MapSurface, MapView, PointerEvent, Session, ShapeKind, SketchAction};
use mapsketch_settings::Config;

/// One scripted interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Draw { kind: ShapeKind },
    /// Add a finished shape given as a GeoJSON geometry
    Add { geometry: Value },
    Pointer { event: PointerEvent },
    Select { x: f64, y: f64 },
    Sketch { action: SketchAction },
    Merge,
    Commit,
    Cancel,
}

/// A script file: optional configuration plus the steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub config: Option<Config>,
    pub steps: Vec<Step>,
}

impl Script {
    /// Parse a script; a bare JSON array is taken as the step list.
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let value: Value = serde_json::from_str(text).context("script is not valid JSON")?;
        if value.is_array() {
            let steps = serde_json::from_value(value).context("invalid step list")?;
            return Ok(Self { config: None, steps });
        }
        serde_json::from_value(value).context("invalid script")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("failed to parse script {}", path.display()))
    }
}

/// What happened to one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub outcome: Option<String>,
    pub error: Option<String>,
}

impl StepReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// A headless session driven by script steps.
pub struct Replay {
    session: Session,
    view: Shared<MapView>,
    reports: Vec<StepReport>,
}

impl Replay {
    pub fn new(config: Config) -> Self {
        let view = shared(MapView::default());
        let surface: Shared<dyn MapSurface> = view.clone();
        Self {
            session: Session::new(config, surface),
            view,
            reports: Vec::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn view(&self) -> &Shared<MapView> {
        &self.view
    }

    pub fn reports(&self) -> &[StepReport] {
        &self.reports
    }

    pub fn run(&mut self, steps: &[Step]) -> &[StepReport] {
        for step in steps {
            self.step(step);
        }
        &self.reports
    }

    pub fn step(&mut self, step: &Step) -> &StepReport {
        let index = self.reports.len();
        let report = match self.apply(step) {
            Ok(outcome) => {
                debug!("Step {}: {}", index, outcome);
                StepReport {
                    index,
                    outcome: Some(outcome),
                    error: None,
                }
            }
            Err(e) => {
                warn!("Step {} failed: {}", index, e);
                StepReport {
                    index,
                    outcome: None,
                    error: Some(e.to_string()),
                }
            }
        };
        self.reports.push(report);
        &self.reports[index]
    }

    fn apply(&mut self, step: &Step) -> mapsketch_core::Result<String> {
        let session = &mut self.session;
        match step {
            Step::Draw { kind } => {
                session.start_drawing(*kind)?;
                Ok(format!("drawing {}", kind))
            }
            Step::Add { geometry } => {
                let geometry = Geometry::from_geojson(geometry)?;
                let id = session.add_shape(geometry)?;
                Ok(format!("added shape {}", id))
            }
            Step::Pointer { event } => Ok(format!("{:?}", session.handle_event(*event)?)),
            Step::Select { x, y } => Ok(
                match session.select_at(mapsketch_editor::Point::new(*x, *y)) {
                    Some((id, true)) => format!("selected shape {}", id),
                    Some((id, false)) => format!("deselected shape {}", id),
                    None => "no shape under the pointer".to_string(),
                },
            ),
            Step::Sketch { action } => {
                session.begin_sketch(*action)?;
                Ok(format!("sketching for {:?}", action))
            }
            Step::Merge => {
                let created = session.merge_selected()?;
                Ok(format!("merged into {:?}", created))
            }
            Step::Commit => Ok(format!("{:?}", session.commit()?)),
            Step::Cancel => Ok(format!("{:?}", session.cancel()?)),
        }
    }

    /// The stored shapes as a GeoJSON FeatureCollection.
    pub fn features(&self) -> Value {
        self.session.feature_collection()
    }

    /// Features plus the per-step reports.
    pub fn summary(&self) -> Value {
        json!({
            "features": self.features(),
            "steps": self.reports,
        })
    }
}
