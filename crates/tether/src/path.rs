//! Minimal vector-path model shared by the curve generator, the arrowhead generator and the
//! compositor.
//!
//! Every command uses absolute coordinates. The SVG serializer follows the `d3-path` convention
//! of rounding to three fractional digits.

use crate::geom::{Point, point};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "cmd", rename_all = "camelCase")]
pub enum Segment {
    MoveTo {
        x: f64,
        y: f64,
    },
    LineTo {
        x: f64,
        y: f64,
    },
    CubicTo {
        c1x: f64,
        c1y: f64,
        c2x: f64,
        c2y: f64,
        x: f64,
        y: f64,
    },
    QuadTo {
        cx: f64,
        cy: f64,
        x: f64,
        y: f64,
    },
    ArcTo {
        rx: f64,
        ry: f64,
        rotation: f64,
        large_arc: bool,
        sweep: bool,
        x: f64,
        y: f64,
    },
    Close,
}

impl Segment {
    pub fn move_to(p: Point) -> Self {
        Self::MoveTo { x: p.x, y: p.y }
    }

    pub fn line_to(p: Point) -> Self {
        Self::LineTo { x: p.x, y: p.y }
    }

    pub fn cubic_to(c1: Point, c2: Point, p: Point) -> Self {
        Self::CubicTo {
            c1x: c1.x,
            c1y: c1.y,
            c2x: c2.x,
            c2y: c2.y,
            x: p.x,
            y: p.y,
        }
    }

    pub fn quad_to(c: Point, p: Point) -> Self {
        Self::QuadTo {
            cx: c.x,
            cy: c.y,
            x: p.x,
            y: p.y,
        }
    }

    pub fn arc_to(rx: f64, ry: f64, large_arc: bool, sweep: bool, p: Point) -> Self {
        Self::ArcTo {
            rx,
            ry,
            rotation: 0.0,
            large_arc,
            sweep,
            x: p.x,
            y: p.y,
        }
    }

    /// The pen position after this segment, if it moves the pen.
    pub fn end_point(&self) -> Option<Point> {
        match *self {
            Self::MoveTo { x, y }
            | Self::LineTo { x, y }
            | Self::CubicTo { x, y, .. }
            | Self::QuadTo { x, y, .. }
            | Self::ArcTo { x, y, .. } => Some(point(x, y)),
            Self::Close => None,
        }
    }
}

/// Synthetic points used only to derive the tangent angles at the two path ends.
///
/// Cubic styles store their first and last true bezier control; sampled styles store the same
/// intermediate point twice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlAnchor {
    pub near_start: Point,
    pub near_end: Point,
}

impl ControlAnchor {
    pub fn single(p: Point) -> Self {
        Self {
            near_start: p,
            near_end: p,
        }
    }

    pub fn pair(near_start: Point, near_end: Point) -> Self {
        Self {
            near_start,
            near_end,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathDescription {
    pub segments: Vec<Segment>,
    pub control: ControlAnchor,
}

impl PathDescription {
    pub fn first_point(&self) -> Option<Point> {
        self.segments.first().and_then(Segment::end_point)
    }

    pub fn last_point(&self) -> Option<Point> {
        self.segments.iter().rev().find_map(Segment::end_point)
    }

    /// Tangent angle at the start, pointing away from the path (towards the start entity).
    pub fn start_angle(&self, start: Point) -> f64 {
        let v = self.control.near_start - start;
        v.y.atan2(v.x) + std::f64::consts::PI
    }

    /// Tangent angle at the end, pointing along the direction of travel.
    pub fn end_angle(&self, end: Point) -> f64 {
        let v = end - self.control.near_end;
        v.y.atan2(v.x)
    }

    pub fn to_svg_d(&self) -> String {
        segments_to_svg_d(&self.segments)
    }
}

pub fn segments_to_svg_d(segments: &[Segment]) -> String {
    let mut out = String::with_capacity(segments.len().saturating_mul(32));
    for seg in segments {
        if !out.is_empty() {
            out.push(' ');
        }
        write_segment(&mut out, seg);
    }
    out
}

fn write_segment(out: &mut String, seg: &Segment) {
    match *seg {
        Segment::MoveTo { x, y } => emit(out, 'M', &[x, y]),
        Segment::LineTo { x, y } => emit(out, 'L', &[x, y]),
        Segment::CubicTo {
            c1x,
            c1y,
            c2x,
            c2y,
            x,
            y,
        } => emit(out, 'C', &[c1x, c1y, c2x, c2y, x, y]),
        Segment::QuadTo { cx, cy, x, y } => emit(out, 'Q', &[cx, cy, x, y]),
        Segment::ArcTo {
            rx,
            ry,
            rotation,
            large_arc,
            sweep,
            x,
            y,
        } => {
            out.push('A');
            out.push(' ');
            fmt_path_into(out, rx);
            out.push(' ');
            fmt_path_into(out, ry);
            out.push(' ');
            fmt_path_into(out, rotation);
            out.push(' ');
            out.push(if large_arc { '1' } else { '0' });
            out.push(' ');
            out.push(if sweep { '1' } else { '0' });
            out.push(' ');
            fmt_path_into(out, x);
            out.push(' ');
            fmt_path_into(out, y);
        }
        Segment::Close => out.push('Z'),
    }
}

fn emit(out: &mut String, cmd: char, values: &[f64]) {
    out.push(cmd);
    for v in values {
        out.push(' ');
        fmt_path_into(out, *v);
    }
}

pub fn fmt_path(v: f64) -> String {
    let mut out = String::new();
    fmt_path_into(&mut out, v);
    out
}

pub fn fmt_path_into(out: &mut String, v: f64) {
    // `Math.round(x * 1000) / 1000` semantics: ties half-up, including for negatives.
    if !v.is_finite() || v.abs() < 0.0005 {
        out.push('0');
        return;
    }

    let k = (v * 1000.0 + 0.5).floor() as i64;
    if k == 0 {
        out.push('0');
        return;
    }

    if k.is_negative() {
        out.push('-');
    }
    let abs = k.unsigned_abs();
    let int_part = abs / 1000;
    let frac = abs % 1000;

    use std::fmt::Write as _;
    let _ = write!(out, "{int_part}");
    if frac == 0 {
        return;
    }

    let digits = [
        b'0' + (frac / 100) as u8,
        b'0' + ((frac / 10) % 10) as u8,
        b'0' + (frac % 10) as u8,
    ];
    let mut end = 3usize;
    while end > 0 && digits[end - 1] == b'0' {
        end -= 1;
    }
    out.push('.');
    for &b in &digits[..end] {
        out.push(b as char);
    }
}
