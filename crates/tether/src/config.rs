use crate::anchor::{DEFAULT_PADDING, DockPosition};
use crate::compose::{AnimationDirection, DashOverlay, LineStyle};
use crate::curve::{CurveSpec, CurveType, Direction};
use crate::error::{Error, Result};
use crate::head::{HeadShape, HeadSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Full configuration surface of one connector instance (camelCase JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectorConfig {
    pub curve_type: CurveType,
    pub intensity: f64,
    pub direction: Direction,
    pub start_dock: DockPosition,
    pub end_dock: DockPosition,
    pub start_head: HeadSpec,
    pub end_head: HeadSpec,
    pub line: LineStyle,
    pub animation: Option<DashAnimation>,
    /// Accessible name exposed on the `under` layer.
    pub label: Option<String>,
    pub padding: f64,
    /// Fixed instance id; a random one is generated when absent.
    pub instance_id: Option<String>,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            curve_type: CurveType::Smooth,
            intensity: 0.4,
            direction: Direction::Auto,
            start_dock: DockPosition::Right,
            end_dock: DockPosition::Left,
            start_head: HeadSpec {
                shape: HeadShape::None,
                ..HeadSpec::default()
            },
            end_head: HeadSpec::default(),
            line: LineStyle::default(),
            animation: None,
            label: None,
            padding: DEFAULT_PADDING,
            instance_id: None,
        }
    }
}

impl ConnectorConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn curve_spec(&self) -> CurveSpec {
        CurveSpec::new(self.curve_type, self.intensity, self.direction)
    }

    pub fn dash_overlay(&self) -> Result<Option<DashOverlay>> {
        self.animation.as_ref().map(DashAnimation::resolve).transpose()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashAnimation {
    pub pattern: [f64; 2],
    pub duration: String,
    pub delay: String,
    pub direction: AnimationDirection,
}

impl Default for DashAnimation {
    fn default() -> Self {
        Self {
            pattern: [6.0, 4.0],
            duration: "1s".to_string(),
            delay: "0s".to_string(),
            direction: AnimationDirection::Normal,
        }
    }
}

impl DashAnimation {
    pub fn resolve(&self) -> Result<DashOverlay> {
        Ok(DashOverlay {
            pattern: [self.pattern[0].max(0.0), self.pattern[1].max(0.0)],
            duration_ms: parse_duration_ms(&self.duration)?,
            delay_ms: parse_duration_ms(&self.delay)?,
            direction: self.direction,
        })
    }
}

/// Parses CSS-like time values: `"1.5s"`, `"300ms"`, or a bare number of seconds.
pub fn parse_duration_ms(raw: &str) -> Result<f64> {
    let s = raw.trim();
    let invalid = || Error::InvalidTiming {
        value: raw.to_string(),
    };
    if s.is_empty() {
        return Ok(0.0);
    }

    let (num, scale) = if let Some(ms) = s.strip_suffix("ms") {
        (ms, 1.0)
    } else if let Some(sec) = s.strip_suffix('s') {
        (sec, 1000.0)
    } else {
        (s, 1000.0)
    };
    let v = num.trim().parse::<f64>().map_err(|_| invalid())?;
    if !v.is_finite() || v < 0.0 {
        return Err(invalid());
    }
    Ok(v * scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::head::HeadLayer;
    use serde_json::json;

    #[test]
    fn camel_case_json_fills_defaults() {
        let cfg = ConnectorConfig::from_value(json!({
            "curveType": "wave",
            "intensity": 5.0,
            "startDock": "top-left",
            "endHead": { "shape": "filled-circle", "layer": "over", "size": 14 },
            "label": "depends on"
        }))
        .unwrap();
        assert_eq!(cfg.curve_type, CurveType::Wave);
        assert_eq!(cfg.curve_spec().intensity(), 2.0);
        assert_eq!(cfg.start_dock, DockPosition::TopLeft);
        assert_eq!(cfg.end_dock, DockPosition::Left);
        assert_eq!(cfg.end_head.shape, HeadShape::FilledCircle);
        assert_eq!(cfg.end_head.layer, HeadLayer::Over);
        assert_eq!(cfg.end_head.opacity, 1.0);
        assert_eq!(cfg.padding, DEFAULT_PADDING);
    }

    #[test]
    fn unknown_dock_is_a_config_error() {
        let err = ConnectorConfig::from_json_str(r#"{"endDock":"middle"}"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
        assert!(err.to_string().contains("unknown dock position"));
    }

    #[test]
    fn reserved_curve_type_is_not_an_error() {
        let cfg = ConnectorConfig::from_json_str(r#"{"curveType":"orthogonal"}"#).unwrap();
        assert_eq!(cfg.curve_type, CurveType::Smooth);
    }

    #[test]
    fn durations_parse() {
        assert_eq!(parse_duration_ms("1.5s").unwrap(), 1500.0);
        assert_eq!(parse_duration_ms(" 300ms ").unwrap(), 300.0);
        assert_eq!(parse_duration_ms("2").unwrap(), 2000.0);
        assert_eq!(parse_duration_ms("").unwrap(), 0.0);
        assert!(parse_duration_ms("fast").is_err());
        assert!(parse_duration_ms("-1s").is_err());
    }

    #[test]
    fn animation_resolves_to_overlay() {
        let cfg = ConnectorConfig {
            animation: Some(DashAnimation {
                duration: "750ms".to_string(),
                delay: "0.25s".to_string(),
                direction: AnimationDirection::AlternateReverse,
                ..DashAnimation::default()
            }),
            ..ConnectorConfig::default()
        };
        let dash = cfg.dash_overlay().unwrap().unwrap();
        assert_eq!(dash.duration_ms, 750.0);
        assert_eq!(dash.delay_ms, 250.0);
        assert_eq!(dash.direction, AnimationDirection::AlternateReverse);
    }
}
