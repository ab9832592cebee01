//! Curve path generation for the eight connector styles.
//!
//! Every style is a closed-form function of the two anchors and a bow `offset`; none of them
//! iterate. The first and last emitted points are always the anchors themselves, never a value
//! recomputed through interpolation.

use crate::geom::{EntityRect, Point, Vector, vector};
use crate::path::{ControlAnchor, PathDescription, Segment};
use crate::router;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::f64::consts::PI;

pub const MAX_OFFSET: f64 = 150.0;
pub const MIN_INTENSITY: f64 = 0.1;
pub const MAX_INTENSITY: f64 = 2.0;

const WAVE_SEGMENTS: usize = 8;
const ZIGZAG_SEGMENTS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CurveType {
    #[default]
    Smooth,
    Dramatic,
    SCurve,
    Wave,
    Elegant,
    Zigzag,
    AroundObstacle,
    ShortestPath,
}

impl CurveType {
    pub const ALL: [CurveType; 8] = [
        Self::Smooth,
        Self::Dramatic,
        Self::SCurve,
        Self::Wave,
        Self::Elegant,
        Self::Zigzag,
        Self::AroundObstacle,
        Self::ShortestPath,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Smooth => "smooth",
            Self::Dramatic => "dramatic",
            Self::SCurve => "s-curve",
            Self::Wave => "wave",
            Self::Elegant => "elegant",
            Self::Zigzag => "zigzag",
            Self::AroundObstacle => "around-obstacle",
            Self::ShortestPath => "shortest-path",
        }
    }

    /// Parses a style name. Unknown and reserved identifiers fall back to `smooth`.
    pub fn parse_lenient(name: &str) -> Self {
        let key = name.trim().to_ascii_lowercase();
        match Self::ALL.into_iter().find(|t| t.as_str() == key) {
            Some(t) => t,
            None => {
                tracing::warn!(curve_type = %key, "unrecognized curve type, using smooth");
                Self::Smooth
            }
        }
    }

    pub fn is_routing_aware(self) -> bool {
        matches!(self, Self::AroundObstacle | Self::ShortestPath)
    }
}

impl Serialize for CurveType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CurveType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse_lenient(&raw))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Auto,
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Resolves `auto` against the chord: a mostly-horizontal chord bows vertically and vice
    /// versa. A zero delta on the bow axis counts as positive (`down` / `right`).
    pub fn resolve(self, dx: f64, dy: f64) -> Direction {
        match self {
            Self::Auto if dx.abs() > dy.abs() => {
                if dy >= 0.0 {
                    Self::Down
                } else {
                    Self::Up
                }
            }
            Self::Auto => {
                if dx >= 0.0 {
                    Self::Right
                } else {
                    Self::Left
                }
            }
            other => other,
        }
    }

    /// Unit vector of the bow axis. `auto` must be resolved first; it maps to zero.
    pub fn axis(self) -> Vector {
        match self {
            Self::Up => vector(0.0, -1.0),
            Self::Down => vector(0.0, 1.0),
            Self::Left => vector(-1.0, 0.0),
            Self::Right => vector(1.0, 0.0),
            Self::Auto => vector(0.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveSpec {
    pub curve_type: CurveType,
    intensity: f64,
    pub direction: Direction,
}

impl Default for CurveSpec {
    fn default() -> Self {
        Self::new(CurveType::Smooth, 0.4, Direction::Auto)
    }
}

impl CurveSpec {
    pub fn new(curve_type: CurveType, intensity: f64, direction: Direction) -> Self {
        Self {
            curve_type,
            intensity: clamp_intensity(intensity),
            direction,
        }
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }
}

pub fn clamp_intensity(v: f64) -> f64 {
    if v.is_nan() {
        return MIN_INTENSITY;
    }
    v.clamp(MIN_INTENSITY, MAX_INTENSITY)
}

/// Bow magnitude: `min(distance × intensity, 150)`.
pub fn bow_offset(start: Point, end: Point, intensity: f64) -> f64 {
    let distance = (end - start).length();
    (distance * intensity).min(MAX_OFFSET)
}

pub fn generate(
    start: Point,
    end: Point,
    spec: &CurveSpec,
    obstacles: &[EntityRect],
) -> PathDescription {
    let d = end - start;
    let axis = spec.direction.resolve(d.x, d.y).axis();
    let offset = bow_offset(start, end, spec.intensity);
    let bow = Bow {
        start,
        end,
        axis,
        offset,
    };

    if spec.curve_type.is_routing_aware() {
        return bow.routed(spec.curve_type, obstacles);
    }
    match spec.curve_type {
        CurveType::Dramatic => bow.dramatic(),
        CurveType::SCurve => bow.s_curve(),
        CurveType::Wave => bow.wave(),
        CurveType::Elegant => bow.elegant(),
        CurveType::Zigzag => bow.zigzag(),
        CurveType::Smooth | CurveType::AroundObstacle | CurveType::ShortestPath => bow.smooth(),
    }
}

struct Bow {
    start: Point,
    end: Point,
    axis: Vector,
    offset: f64,
}

impl Bow {
    /// Chord point at `t`, displaced by `k × offset` along the bow axis.
    fn at(&self, t: f64, k: f64) -> Point {
        self.start.lerp(self.end, t) + self.axis * (k * self.offset)
    }

    fn cubic(&self, c1: Point, c2: Point) -> PathDescription {
        PathDescription {
            segments: vec![
                Segment::move_to(self.start),
                Segment::cubic_to(c1, c2, self.end),
            ],
            control: ControlAnchor::pair(c1, c2),
        }
    }

    /// Waypoint path for the routing-aware styles; `smooth` when nothing is in the way.
    fn routed(&self, curve_type: CurveType, obstacles: &[EntityRect]) -> PathDescription {
        if obstacles.is_empty() {
            return self.smooth();
        }
        let route = router::route(self.start, self.end, obstacles);
        if route.waypoints.is_empty() {
            return self.smooth();
        }
        let mut points = Vec::with_capacity(route.waypoints.len() + 2);
        points.push(self.start);
        points.extend(route.waypoints.iter().copied());
        points.push(self.end);
        let segments = if curve_type == CurveType::AroundObstacle {
            cardinal_segments(&points, 0.0)
        } else {
            linear_segments(&points)
        };
        PathDescription {
            segments,
            control: route.control,
        }
    }

    fn smooth(&self) -> PathDescription {
        self.cubic(self.at(0.3, 0.5), self.at(0.7, 0.5))
    }

    fn dramatic(&self) -> PathDescription {
        self.cubic(self.at(0.1, 1.5), self.at(0.9, 1.5))
    }

    fn s_curve(&self) -> PathDescription {
        self.cubic(self.at(0.25, 1.0), self.at(0.75, -1.0))
    }

    fn wave(&self) -> PathDescription {
        let n = WAVE_SEGMENTS as f64;
        let sample = |t: f64| self.at(t, (t * 4.0 * PI).sin() * 0.3);

        let mut segments = Vec::with_capacity(WAVE_SEGMENTS + 1);
        segments.push(Segment::move_to(self.start));
        for i in 0..WAVE_SEGMENTS {
            let mid = (i as f64 + 0.5) / n;
            let to = if i + 1 == WAVE_SEGMENTS {
                self.end
            } else {
                self.start.lerp(self.end, (i + 1) as f64 / n)
            };
            segments.push(Segment::quad_to(sample(mid), to));
        }

        PathDescription {
            segments,
            control: ControlAnchor::single(sample(7.0 / n)),
        }
    }

    fn elegant(&self) -> PathDescription {
        let chord = self.end - self.start;
        let mid = self.at(0.5, 0.8);
        let c1 = self.start + chord * 0.15 + self.axis * (0.8 * self.offset);
        let c2 = mid - chord * 0.2;
        // Reflection of `c2` through `mid` keeps the join smooth.
        let c3 = mid + (mid - c2);
        let c4 = self.end - chord * 0.15 + self.axis * (0.4 * self.offset);

        PathDescription {
            segments: vec![
                Segment::move_to(self.start),
                Segment::cubic_to(c1, c2, mid),
                Segment::cubic_to(c3, c4, self.end),
            ],
            control: ControlAnchor::pair(c1, c4),
        }
    }

    fn zigzag(&self) -> PathDescription {
        let n = ZIGZAG_SEGMENTS as f64;
        let vertex = |i: usize| {
            let sign = if i % 2 == 1 { 1.0 } else { -1.0 };
            self.at(i as f64 / n, sign * 0.4)
        };

        let mut segments = Vec::with_capacity(ZIGZAG_SEGMENTS + 1);
        segments.push(Segment::move_to(self.start));
        for i in 1..ZIGZAG_SEGMENTS {
            segments.push(Segment::line_to(vertex(i)));
        }
        segments.push(Segment::line_to(self.end));

        PathDescription {
            segments,
            control: ControlAnchor::single(vertex(ZIGZAG_SEGMENTS - 1)),
        }
    }
}

fn linear_segments(points: &[Point]) -> Vec<Segment> {
    let mut out = Vec::with_capacity(points.len());
    let Some(first) = points.first() else {
        return out;
    };
    out.push(Segment::move_to(*first));
    out.extend(points.iter().skip(1).map(|p| Segment::line_to(*p)));
    out
}

/// Cardinal spline through `points` (d3 `curveCardinal` control placement, endpoints clamped).
fn cardinal_segments(points: &[Point], tension: f64) -> Vec<Segment> {
    let mut out = Vec::with_capacity(points.len());
    let Some(first) = points.first() else {
        return out;
    };
    out.push(Segment::move_to(*first));
    if points.len() == 2 {
        out.push(Segment::line_to(points[1]));
        return out;
    }

    let k = (1.0 - tension) / 6.0;
    let last = points.len() - 1;
    for i in 0..last {
        let p0 = points[i.saturating_sub(1)];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points[(i + 2).min(last)];
        let c1 = p1 + (p2 - p0) * k;
        let c2 = p2 - (p3 - p1) * k;
        out.push(Segment::cubic_to(c1, c2, p2));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::point;

    #[test]
    fn smooth_scenario_places_controls_at_thirty_and_seventy_percent() {
        let spec = CurveSpec::new(CurveType::Smooth, 0.4, Direction::Auto);
        let path = generate(point(0.0, 0.0), point(100.0, 0.0), &spec, &[]);
        assert_eq!(
            path.segments[1],
            Segment::cubic_to(point(30.0, 20.0), point(70.0, 20.0), point(100.0, 0.0))
        );
    }

    #[test]
    fn auto_direction_follows_dominant_delta() {
        assert_eq!(Direction::Auto.resolve(100.0, 0.0), Direction::Down);
        assert_eq!(Direction::Auto.resolve(100.0, -3.0), Direction::Up);
        assert_eq!(Direction::Auto.resolve(3.0, 100.0), Direction::Right);
        assert_eq!(Direction::Auto.resolve(-3.0, 100.0), Direction::Left);
        assert_eq!(Direction::Auto.resolve(0.0, 0.0), Direction::Right);
        assert_eq!(Direction::Up.resolve(100.0, 0.0), Direction::Up);
    }

    #[test]
    fn offset_is_capped() {
        assert_eq!(bow_offset(point(0.0, 0.0), point(1000.0, 0.0), 2.0), MAX_OFFSET);
        assert_eq!(bow_offset(point(0.0, 0.0), point(30.0, 40.0), 0.5), 25.0);
    }

    #[test]
    fn intensity_is_clamped() {
        assert_eq!(CurveSpec::new(CurveType::Wave, 9.0, Direction::Up).intensity(), 2.0);
        assert_eq!(CurveSpec::new(CurveType::Wave, 0.0, Direction::Up).intensity(), 0.1);
        assert_eq!(clamp_intensity(f64::NAN), MIN_INTENSITY);
    }

    #[test]
    fn reserved_names_fall_back_to_smooth() {
        assert_eq!(CurveType::parse_lenient("spiral"), CurveType::Smooth);
        assert_eq!(CurveType::parse_lenient("S-Curve"), CurveType::SCurve);
        let t: CurveType = serde_json::from_str("\"bezier-auto\"").unwrap();
        assert_eq!(t, CurveType::Smooth);
    }

    #[test]
    fn s_curve_controls_sit_on_opposite_sides() {
        let spec = CurveSpec::new(CurveType::SCurve, 0.5, Direction::Down);
        let path = generate(point(0.0, 0.0), point(100.0, 0.0), &spec, &[]);
        assert_eq!(path.control.near_start, point(25.0, 50.0));
        assert_eq!(path.control.near_end, point(75.0, -50.0));
    }

    #[test]
    fn wave_has_eight_quadratics() {
        let spec = CurveSpec::new(CurveType::Wave, 1.0, Direction::Down);
        let path = generate(point(0.0, 0.0), point(80.0, 0.0), &spec, &[]);
        let quads = path
            .segments
            .iter()
            .filter(|s| matches!(s, Segment::QuadTo { .. }))
            .count();
        assert_eq!(quads, 8);
        // sin(3.5π) = -1: the 7th sample dips by 0.3 × offset.
        let anchor = path.control.near_end;
        assert!((anchor.x - 70.0).abs() < 1e-9);
        assert!((anchor.y + 24.0).abs() < 1e-9);
    }

    #[test]
    fn zigzag_control_is_fifth_vertex() {
        let spec = CurveSpec::new(CurveType::Zigzag, 0.5, Direction::Right);
        let path = generate(point(0.0, 0.0), point(0.0, 60.0), &spec, &[]);
        assert_eq!(path.segments.len(), 7);
        assert_eq!(path.control.near_end, point(12.0, 50.0));
    }

    #[test]
    fn elegant_join_is_smooth() {
        let spec = CurveSpec::new(CurveType::Elegant, 0.3, Direction::Auto);
        let path = generate(point(10.0, 10.0), point(210.0, 60.0), &spec, &[]);
        let (Segment::CubicTo { c2x, c2y, x, y, .. }, Segment::CubicTo { c1x, c1y, .. }) =
            (path.segments[1], path.segments[2])
        else {
            panic!("expected two cubics");
        };
        assert!((x - (c2x + c1x) / 2.0).abs() < 1e-9);
        assert!((y - (c2y + c1y) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn only_routing_styles_consult_obstacles() {
        let obstacles = [EntityRect::new(40.0, -10.0, 20.0, 20.0)];
        for curve_type in CurveType::ALL {
            let spec = CurveSpec::new(curve_type, 0.4, Direction::Auto);
            let with = generate(point(0.0, 0.0), point(100.0, 0.0), &spec, &obstacles);
            let without = generate(point(0.0, 0.0), point(100.0, 0.0), &spec, &[]);
            assert_eq!(with != without, curve_type.is_routing_aware(), "{}", curve_type.as_str());
        }
    }
}
