//! Two-layer compositing.
//!
//! A connector always produces exactly two layers. `under` holds the line and any heads assigned
//! to it; `over` holds the remaining heads plus short overlay strokes that keep the line visible
//! on top of "under-tier" content near those heads. The relative order `under < over` is part of
//! the output, not something the rendering surface has to infer from nesting.

use crate::geom::{Point, unit};
use crate::head::{HeadLayer, HeadShape, HeadSpec, build_head};
use crate::path::{PathDescription, Segment};
use serde::{Deserialize, Serialize};

pub const DEFAULT_STROKE: &str = "#64748b";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Under,
    Over,
}

impl LayerKind {
    pub fn rank(self) -> u8 {
        match self {
            Self::Under => 0,
            Self::Over => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Under => "under",
            Self::Over => "over",
        }
    }
}

impl From<HeadLayer> for LayerKind {
    fn from(value: HeadLayer) -> Self {
        match value {
            HeadLayer::Under => Self::Under,
            HeadLayer::Over => Self::Over,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum End {
    Start,
    End,
}

impl End {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "end", rename_all = "camelCase")]
pub enum DrawableRole {
    Halo,
    Line,
    DashOverlay,
    Head(End),
    Overlay(End),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HaloSpec {
    pub width_scale: f64,
    pub opacity: f64,
    pub blur: f64,
}

impl Default for HaloSpec {
    fn default() -> Self {
        Self {
            width_scale: 3.0,
            opacity: 0.25,
            blur: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineStyle {
    pub stroke_color: String,
    pub stroke_width: f64,
    pub opacity: f64,
    /// Opaque preset id (e.g. `neon`), forwarded to every drawable as a class.
    pub style_id: Option<String>,
    pub halo: Option<HaloSpec>,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            stroke_color: DEFAULT_STROKE.to_string(),
            stroke_width: 2.0,
            opacity: 1.0,
            style_id: None,
            halo: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationDirection {
    #[default]
    Normal,
    Reverse,
    Alternate,
    AlternateReverse,
}

impl AnimationDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Reverse => "reverse",
            Self::Alternate => "alternate",
            Self::AlternateReverse => "alternate-reverse",
        }
    }
}

/// Marching-ants dash overlay with a time-driven `stroke-dashoffset`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashOverlay {
    pub pattern: [f64; 2],
    pub duration_ms: f64,
    pub delay_ms: f64,
    pub direction: AnimationDirection,
}

impl DashOverlay {
    fn period(&self) -> f64 {
        self.pattern[0] + self.pattern[1]
    }

    /// Offset range for one forward cycle: normal runs the dash towards the end of the path.
    pub fn offset_range(&self) -> (f64, f64) {
        match self.direction {
            AnimationDirection::Normal | AnimationDirection::Alternate => (self.period(), 0.0),
            AnimationDirection::Reverse | AnimationDirection::AlternateReverse => {
                (0.0, self.period())
            }
        }
    }

    pub fn offset_at(&self, elapsed_ms: f64) -> f64 {
        let (from, to) = self.offset_range();
        if self.duration_ms.is_nan() || self.duration_ms <= 0.0 || elapsed_ms <= self.delay_ms {
            return from;
        }
        let t = (elapsed_ms - self.delay_ms) / self.duration_ms;
        let cycle = t.floor();
        let mut frac = t - cycle;
        let odd = (cycle as i64) % 2 == 1;
        if matches!(
            self.direction,
            AnimationDirection::Alternate | AnimationDirection::AlternateReverse
        ) && odd
        {
            frac = 1.0 - frac;
        }
        from + (to - from) * frac
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Drawable {
    pub id: String,
    pub role: DrawableRole,
    pub segments: Vec<Segment>,
    pub stroke: String,
    pub stroke_width: f64,
    pub fill: Option<String>,
    pub opacity: f64,
    pub class: Option<String>,
    pub filter: Option<String>,
    pub dash: Option<DashOverlay>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Accessibility {
    pub role: Option<&'static str>,
    pub label: Option<String>,
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub kind: LayerKind,
    pub accessibility: Accessibility,
    pub items: Vec<Drawable>,
}

impl Layer {
    fn new(kind: LayerKind, label: Option<&str>) -> Self {
        let accessibility = match kind {
            LayerKind::Under => Accessibility {
                role: Some("img"),
                label: label.map(str::to_string),
                hidden: false,
            },
            LayerKind::Over => Accessibility {
                role: None,
                label: None,
                hidden: true,
            },
        };
        Self {
            kind,
            accessibility,
            items: Vec::new(),
        }
    }

    pub fn rank(&self) -> u8 {
        self.kind.rank()
    }

    pub fn find(&self, role: DrawableRole) -> Option<&Drawable> {
        self.items.iter().find(|d| d.role == role)
    }
}

/// Shared resources referenced by drawables, scoped under the instance id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Resource {
    BlurFilter { id: String, std_deviation: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Composite {
    pub instance_id: String,
    pub resources: Vec<Resource>,
    under: Layer,
    over: Layer,
}

impl Composite {
    /// Both layers with nothing to draw; used when an endpoint is unresolved.
    pub fn empty(instance_id: &str, label: Option<&str>) -> Self {
        Self {
            instance_id: instance_id.to_string(),
            resources: Vec::new(),
            under: Layer::new(LayerKind::Under, label),
            over: Layer::new(LayerKind::Over, label),
        }
    }

    pub fn under(&self) -> &Layer {
        &self.under
    }

    pub fn over(&self) -> &Layer {
        &self.over
    }

    /// Layers in paint order.
    pub fn layers(&self) -> [&Layer; 2] {
        [&self.under, &self.over]
    }

    pub fn is_empty(&self) -> bool {
        self.under.items.is_empty() && self.over.items.is_empty()
    }
}

pub struct CompositeInput<'a> {
    pub instance_id: &'a str,
    pub path: &'a PathDescription,
    pub start: Point,
    pub end: Point,
    pub start_head: &'a HeadSpec,
    pub end_head: &'a HeadSpec,
    pub line: &'a LineStyle,
    pub dash: Option<&'a DashOverlay>,
    pub label: Option<&'a str>,
}

pub fn overlay_length(stroke_width: f64) -> f64 {
    (2.0 * stroke_width + 6.0).max(12.0)
}

pub fn compose(input: &CompositeInput<'_>) -> Composite {
    let id = input.instance_id;
    let line = input.line;
    let class = line.style_id.clone();
    let mut out = Composite::empty(id, input.label);

    if let Some(halo) = &line.halo {
        let filter_id = format!("{id}-halo-blur");
        out.resources.push(Resource::BlurFilter {
            id: filter_id.clone(),
            std_deviation: halo.blur,
        });
        out.under.items.push(Drawable {
            id: format!("{id}-halo"),
            role: DrawableRole::Halo,
            segments: input.path.segments.clone(),
            stroke: line.stroke_color.clone(),
            stroke_width: line.stroke_width * halo.width_scale,
            fill: None,
            opacity: halo.opacity,
            class: class.clone(),
            filter: Some(filter_id),
            dash: None,
        });
    }

    out.under.items.push(Drawable {
        id: format!("{id}-line"),
        role: DrawableRole::Line,
        segments: input.path.segments.clone(),
        stroke: line.stroke_color.clone(),
        stroke_width: line.stroke_width,
        fill: None,
        opacity: line.opacity,
        class: class.clone(),
        filter: None,
        dash: None,
    });

    if let Some(dash) = input.dash {
        out.under.items.push(Drawable {
            id: format!("{id}-dash"),
            role: DrawableRole::DashOverlay,
            segments: input.path.segments.clone(),
            stroke: line.stroke_color.clone(),
            stroke_width: line.stroke_width,
            fill: None,
            opacity: line.opacity,
            class: class.clone(),
            filter: None,
            dash: Some(dash.clone()),
        });
    }

    let ends = [
        (
            End::Start,
            input.start,
            input.path.start_angle(input.start),
            input.start_head,
        ),
        (
            End::End,
            input.end,
            input.path.end_angle(input.end),
            input.end_head,
        ),
    ];

    for (end, anchor, angle, spec) in ends {
        if spec.shape == HeadShape::None {
            continue;
        }
        let glyph = build_head(
            anchor,
            angle,
            spec.size,
            spec.shape,
            spec.rotation_degrees,
            spec.filled,
        );
        let stroke = spec
            .stroke_color
            .clone()
            .unwrap_or_else(|| line.stroke_color.clone());
        let fill = if glyph.filled {
            Some(spec.fill_color.clone().unwrap_or_else(|| stroke.clone()))
        } else {
            None
        };
        let stroke_width = spec.stroke_width.unwrap_or(line.stroke_width);
        let head = Drawable {
            id: format!("{id}-head-{}", end.as_str()),
            role: DrawableRole::Head(end),
            segments: glyph.segments,
            stroke,
            stroke_width,
            fill,
            opacity: spec.opacity,
            class: class.clone(),
            filter: None,
            dash: None,
        };

        match spec.layer {
            HeadLayer::Under => out.under.items.push(head),
            HeadLayer::Over => {
                out.over.items.push(head);
                let len = overlay_length(line.stroke_width);
                let from = anchor - unit(angle) * len;
                out.over.items.push(Drawable {
                    id: format!("{id}-overlay-{}", end.as_str()),
                    role: DrawableRole::Overlay(end),
                    segments: vec![Segment::move_to(from), Segment::line_to(anchor)],
                    stroke: line.stroke_color.clone(),
                    stroke_width: line.stroke_width,
                    fill: None,
                    opacity: line.opacity,
                    class: class.clone(),
                    filter: None,
                    dash: None,
                });
            }
        }
    }

    out
}
