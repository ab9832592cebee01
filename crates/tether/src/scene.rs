//! Static scene documents: a set of named entity rects plus one connector between two of them.
//!
//! This is the headless counterpart of a live host: entities never move, so one frame is enough.

use crate::config::ConnectorConfig;
use crate::connector::{Connector, FrameOutcome, RectSource};
use crate::error::{Error, Result};
use crate::geom::EntityRect;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default)]
    pub entities: FxHashMap<String, EntityRect>,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub obstacles: Vec<String>,
    #[serde(default)]
    pub connector: ConnectorConfig,
}

fn default_width() -> f64 {
    800.0
}

fn default_height() -> f64 {
    600.0
}

impl Scene {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let scene: Scene = serde_json::from_str(text)?;
        scene.validate()?;
        Ok(scene)
    }

    fn validate(&self) -> Result<()> {
        if !(self.width.is_finite() && self.width > 0.0 && self.height.is_finite() && self.height > 0.0)
        {
            return Err(Error::InvalidScene {
                message: format!("viewport must be positive, got {}x{}", self.width, self.height),
            });
        }
        if self.start.is_empty() || self.end.is_empty() {
            return Err(Error::InvalidScene {
                message: "`start` and `end` must name entities".to_string(),
            });
        }
        Ok(())
    }

    fn source(&self, name: &str) -> Rc<dyn RectSource> {
        Rc::new(self.entities.get(name).copied())
    }

    /// Builds a connector wired to this scene's entities.
    ///
    /// A missing endpoint entity is not an error: the connector resolves to an empty composite.
    pub fn connector(&self) -> Result<Connector> {
        let mut connector = Connector::new(self.connector.clone())?;
        connector.set_start(self.source(&self.start));
        connector.set_end(self.source(&self.end));

        let mut obstacles = Vec::with_capacity(self.obstacles.len());
        for name in &self.obstacles {
            match self.entities.get(name) {
                Some(rect) => obstacles.push(Rc::new(*rect) as Rc<dyn RectSource>),
                None => tracing::warn!(obstacle = %name, "unknown obstacle entity, skipping"),
            }
        }
        connector.set_obstacles(obstacles);
        Ok(connector)
    }

    /// Lays out the connector once.
    pub fn layout(&self) -> Result<Connector> {
        let mut connector = self.connector()?;
        let outcome = connector.on_frame();
        tracing::debug!(instance = connector.id(), ?outcome, "scene laid out");
        debug_assert!(matches!(
            outcome,
            FrameOutcome::Updated | FrameOutcome::Unresolved
        ));
        Ok(connector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::DrawableRole;

    const SCENE: &str = r#"{
        "width": 400,
        "height": 200,
        "entities": {
            "a": { "x": 0, "y": 40, "width": 40, "height": 20 },
            "b": { "x": 300, "y": 40, "width": 40, "height": 20 },
            "wall": { "x": 150, "y": 20, "width": 40, "height": 60 }
        },
        "start": "a",
        "end": "b",
        "obstacles": ["wall", "ghost"],
        "connector": { "curveType": "around-obstacle", "instanceId": "demo" }
    }"#;

    #[test]
    fn scene_lays_out_a_connector() {
        let scene = Scene::from_json_str(SCENE).unwrap();
        let connector = scene.layout().unwrap();
        assert_eq!(connector.id(), "demo");
        let committed = connector.committed().unwrap();
        assert_eq!(committed.obstacles.len(), 1);
        assert!(connector.composite().under().find(DrawableRole::Line).is_some());
    }

    #[test]
    fn missing_endpoint_entity_yields_empty_composite() {
        let text = SCENE.replace(r#""end": "b""#, r#""end": "nowhere""#);
        let scene = Scene::from_json_str(&text).unwrap();
        let connector = scene.layout().unwrap();
        assert!(connector.composite().is_empty());
    }

    #[test]
    fn non_positive_viewport_is_rejected() {
        let text = SCENE.replace(r#""width": 400"#, r#""width": 0"#);
        let err = Scene::from_json_str(&text).unwrap_err();
        assert!(matches!(err, Error::InvalidScene { .. }));
    }
}
