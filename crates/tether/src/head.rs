//! Arrowhead glyph geometry.
//!
//! Every shape is laid out in a local frame whose forward axis points along `total_angle`
//! (towards the tip) and whose side axis is perpendicular to it. The tip always sits on the
//! anchor point.

use crate::error::{Error, Result};
use crate::geom::{Point, Vector, unit};
use crate::path::Segment;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_6, PI};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HeadShape {
    None,
    Triangle,
    #[default]
    Arrow,
    FilledTriangle,
    FilledSquare,
    FilledDiamond,
    FilledCircle,
    HollowTriangle,
    HollowSquare,
    HollowDiamond,
    HollowCircle,
    Circle,
    Diamond,
    Star,
    Heart,
    Cross,
    Plus,
    Chevron,
    DoubleChevron,
    Line,
    Dot,
    Dash,
}

impl HeadShape {
    pub const ALL: [HeadShape; 22] = [
        Self::None,
        Self::Triangle,
        Self::Arrow,
        Self::FilledTriangle,
        Self::FilledSquare,
        Self::FilledDiamond,
        Self::FilledCircle,
        Self::HollowTriangle,
        Self::HollowSquare,
        Self::HollowDiamond,
        Self::HollowCircle,
        Self::Circle,
        Self::Diamond,
        Self::Star,
        Self::Heart,
        Self::Cross,
        Self::Plus,
        Self::Chevron,
        Self::DoubleChevron,
        Self::Line,
        Self::Dot,
        Self::Dash,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Triangle => "triangle",
            Self::Arrow => "arrow",
            Self::FilledTriangle => "filled-triangle",
            Self::FilledSquare => "filled-square",
            Self::FilledDiamond => "filled-diamond",
            Self::FilledCircle => "filled-circle",
            Self::HollowTriangle => "hollow-triangle",
            Self::HollowSquare => "hollow-square",
            Self::HollowDiamond => "hollow-diamond",
            Self::HollowCircle => "hollow-circle",
            Self::Circle => "circle",
            Self::Diamond => "diamond",
            Self::Star => "star",
            Self::Heart => "heart",
            Self::Cross => "cross",
            Self::Plus => "plus",
            Self::Chevron => "chevron",
            Self::DoubleChevron => "double-chevron",
            Self::Line => "line",
            Self::Dot => "dot",
            Self::Dash => "dash",
        }
    }

    fn always_filled(self) -> bool {
        matches!(
            self,
            Self::FilledTriangle
                | Self::FilledSquare
                | Self::FilledDiamond
                | Self::FilledCircle
                | Self::Dot
        )
    }

    /// Closed single-contour outlines that take a fill when one is forced.
    fn fillable_outline(self) -> bool {
        matches!(self, Self::Circle | Self::Diamond | Self::Star | Self::Heart)
    }

    /// Open wing shapes that close into a polygon when a fill is forced.
    fn triangle_like(self) -> bool {
        matches!(self, Self::Triangle | Self::Arrow | Self::Chevron)
    }
}

impl FromStr for HeadShape {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|h| h.as_str() == key)
            .ok_or(Error::UnknownHeadShape { name: key })
    }
}

impl Serialize for HeadShape {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for HeadShape {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadLayer {
    #[default]
    Under,
    Over,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeadSpec {
    pub shape: HeadShape,
    pub size: f64,
    pub rotation_degrees: f64,
    pub filled: bool,
    pub stroke_color: Option<String>,
    pub fill_color: Option<String>,
    pub stroke_width: Option<f64>,
    pub opacity: f64,
    pub layer: HeadLayer,
}

impl Default for HeadSpec {
    fn default() -> Self {
        Self {
            shape: HeadShape::Arrow,
            size: 10.0,
            rotation_degrees: 0.0,
            filled: false,
            stroke_color: None,
            fill_color: None,
            stroke_width: None,
            opacity: 1.0,
            layer: HeadLayer::Under,
        }
    }
}

impl HeadSpec {
    pub fn none() -> Self {
        Self {
            shape: HeadShape::None,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub segments: Vec<Segment>,
    pub filled: bool,
}

impl Glyph {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

pub fn build_head(
    point: Point,
    tangent_angle: f64,
    size: f64,
    shape: HeadShape,
    rotation_degrees: f64,
    force_filled: bool,
) -> Glyph {
    let angle = tangent_angle + rotation_degrees * PI / 180.0;
    let f = Frame {
        tip: point,
        angle,
        fwd: unit(angle),
        side: unit(angle + FRAC_PI_2),
    };
    let size = size.max(0.0);
    let half = size / 2.0;

    let mut out = Vec::new();
    match shape {
        HeadShape::None => {}
        HeadShape::Triangle | HeadShape::Arrow | HeadShape::Chevron => {
            let spread = if shape == HeadShape::Chevron {
                FRAC_PI_4
            } else {
                FRAC_PI_6
            };
            let (w1, w2) = (f.wing(spread, size), f.wing(-spread, size));
            if force_filled {
                polygon(&mut out, &[f.tip, w1, w2]);
            } else {
                polyline(&mut out, &[w1, f.tip, w2]);
            }
        }
        HeadShape::FilledTriangle => {
            polygon(&mut out, &f.triangle(size));
        }
        HeadShape::HollowTriangle => {
            let outer = f.triangle(size);
            polygon(&mut out, &outer);
            polygon(&mut out, &shrink(&outer, 0.5));
        }
        HeadShape::FilledSquare => {
            polygon(&mut out, &f.square(size));
        }
        HeadShape::HollowSquare => {
            let outer = f.square(size);
            polygon(&mut out, &outer);
            polygon(&mut out, &shrink(&outer, 0.5));
        }
        HeadShape::FilledDiamond | HeadShape::Diamond => {
            polygon(&mut out, &f.diamond(size));
        }
        HeadShape::HollowDiamond => {
            let outer = f.diamond(size);
            polygon(&mut out, &outer);
            polygon(&mut out, &shrink(&outer, 0.5));
        }
        HeadShape::FilledCircle | HeadShape::Circle => {
            circle(&mut out, f.at(-half, 0.0), f.fwd, half);
        }
        HeadShape::HollowCircle => {
            let center = f.at(-half, 0.0);
            circle(&mut out, center, f.fwd, half);
            circle(&mut out, center, f.fwd, half / 2.0);
        }
        HeadShape::Dot => {
            let r = size / 4.0;
            circle(&mut out, f.at(-r, 0.0), f.fwd, r);
        }
        HeadShape::Star => {
            let center = f.at(-half, 0.0);
            let points: Vec<Point> = (0..10)
                .map(|k| {
                    let r = if k % 2 == 0 { half } else { half * 0.4 };
                    center + unit(angle + k as f64 * PI / 5.0) * r
                })
                .collect();
            polygon(&mut out, &points);
        }
        HeadShape::Heart => heart(&mut out, &f, half),
        HeadShape::Cross => {
            let center = f.at(-half, 0.0);
            for a in [angle + FRAC_PI_4, angle - FRAC_PI_4] {
                let v = unit(a) * half;
                polyline(&mut out, &[center + v, center - v]);
            }
        }
        HeadShape::Plus => {
            let center = f.at(-half, 0.0);
            polyline(&mut out, &[center + f.fwd * half, center - f.fwd * half]);
            polyline(&mut out, &[center + f.side * half, center - f.side * half]);
        }
        HeadShape::DoubleChevron => {
            for back in [0.0, half] {
                let tip = f.at(-back, 0.0);
                polyline(
                    &mut out,
                    &[
                        tip - unit(angle + FRAC_PI_4) * size,
                        tip,
                        tip - unit(angle - FRAC_PI_4) * size,
                    ],
                );
            }
        }
        HeadShape::Line => {
            polyline(&mut out, &[f.at(0.0, half), f.at(0.0, -half)]);
        }
        HeadShape::Dash => {
            let back = -half / 2.0;
            polyline(&mut out, &[f.at(back, half / 2.0), f.at(back, -half / 2.0)]);
        }
    }

    let filled = shape.always_filled()
        || (force_filled && (shape.triangle_like() || shape.fillable_outline()));
    Glyph {
        segments: out,
        filled,
    }
}

struct Frame {
    tip: Point,
    angle: f64,
    fwd: Vector,
    side: Vector,
}

impl Frame {
    /// Point `forward` along the tangent and `side` across it, relative to the tip.
    fn at(&self, forward: f64, side: f64) -> Point {
        self.tip + self.fwd * forward + self.side * side
    }

    /// Wing end swept back from the tip by `spread` radians.
    fn wing(&self, spread: f64, len: f64) -> Point {
        self.tip - unit(self.angle + spread) * len
    }

    fn triangle(&self, size: f64) -> [Point; 3] {
        [
            self.tip,
            self.wing(FRAC_PI_6, size),
            self.wing(-FRAC_PI_6, size),
        ]
    }

    fn square(&self, size: f64) -> [Point; 4] {
        let h = size / 2.0;
        [
            self.at(0.0, -h),
            self.at(0.0, h),
            self.at(-size, h),
            self.at(-size, -h),
        ]
    }

    fn diamond(&self, size: f64) -> [Point; 4] {
        let w = size * 0.35;
        [
            self.tip,
            self.at(-size / 2.0, w),
            self.at(-size, 0.0),
            self.at(-size / 2.0, -w),
        ]
    }
}

fn polyline(out: &mut Vec<Segment>, points: &[Point]) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    out.push(Segment::move_to(*first));
    out.extend(rest.iter().map(|p| Segment::line_to(*p)));
}

fn polygon(out: &mut Vec<Segment>, points: &[Point]) {
    polyline(out, points);
    out.push(Segment::Close);
}

/// Two half-circle arcs through the points on the tangent axis.
fn circle(out: &mut Vec<Segment>, center: Point, fwd: Vector, r: f64) {
    let front = center + fwd * r;
    let back = center - fwd * r;
    out.push(Segment::move_to(front));
    out.push(Segment::arc_to(r, r, true, false, back));
    out.push(Segment::arc_to(r, r, true, false, front));
    out.push(Segment::Close);
}

fn shrink(points: &[Point], k: f64) -> Vec<Point> {
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    let centroid = crate::geom::point(sx / n, sy / n);
    points
        .iter()
        .map(|p| centroid + (*p - centroid) * k)
        .collect()
}

fn heart(out: &mut Vec<Segment>, f: &Frame, s: f64) {
    // Unit heart with its point at local (0, 1); y runs along the tangent.
    let center = f.at(-s, 0.0);
    let map = |hx: f64, hy: f64| center + f.fwd * (hy * s) + f.side * (hx * s);
    out.push(Segment::move_to(f.tip));
    for [c1, c2, p] in [
        [(-0.2, 0.8), (-1.0, 0.3), (-1.0, -0.3)],
        [(-1.0, -0.8), (-0.3, -1.0), (0.0, -0.5)],
        [(0.3, -1.0), (1.0, -0.8), (1.0, -0.3)],
        [(1.0, 0.3), (0.2, 0.8), (0.0, 1.0)],
    ] {
        out.push(Segment::cubic_to(
            map(c1.0, c1.1),
            map(c2.0, c2.1),
            map(p.0, p.1),
        ));
    }
    out.push(Segment::Close);
}
