use tether::anchor::{self, DEFAULT_PADDING};
use tether::curve::{self, CurveSpec, CurveType, Direction, MAX_OFFSET};
use tether::geom::{EntityRect, Point, point};
use tether::head::{HeadShape, build_head};
use tether::path::Segment;
use tether::{ConnectorConfig, DockPosition, DrawableRole, HeadLayer, LayerKind, render_connector};

fn all_points(segments: &[Segment]) -> Vec<Point> {
    let mut out = Vec::new();
    for s in segments {
        match *s {
            Segment::MoveTo { x, y } | Segment::LineTo { x, y } => out.push(point(x, y)),
            Segment::CubicTo {
                c1x,
                c1y,
                c2x,
                c2y,
                x,
                y,
            } => {
                out.push(point(c1x, c1y));
                out.push(point(c2x, c2y));
                out.push(point(x, y));
            }
            Segment::QuadTo { cx, cy, x, y } => {
                out.push(point(cx, cy));
                out.push(point(x, y));
            }
            Segment::ArcTo { x, y, .. } => out.push(point(x, y)),
            Segment::Close => {}
        }
    }
    out
}

#[test]
fn every_dock_matches_the_dock_table_at_default_padding() {
    let r = EntityRect::new(10.0, 10.0, 20.0, 10.0);
    let expected = [
        (DockPosition::Top, point(20.0, 5.0)),
        (DockPosition::Bottom, point(20.0, 25.0)),
        (DockPosition::Left, point(5.0, 15.0)),
        (DockPosition::Right, point(35.0, 15.0)),
        (DockPosition::Center, point(20.0, 15.0)),
        (DockPosition::TopLeft, point(10.0, 10.0)),
        (DockPosition::TopRight, point(30.0, 10.0)),
        (DockPosition::BottomLeft, point(10.0, 20.0)),
        (DockPosition::BottomRight, point(30.0, 20.0)),
        (DockPosition::TopCenter, point(20.0, 10.0)),
        (DockPosition::BottomCenter, point(20.0, 20.0)),
        (DockPosition::LeftCenter, point(10.0, 15.0)),
        (DockPosition::RightCenter, point(30.0, 15.0)),
        (DockPosition::North, point(20.0, 5.0)),
        (DockPosition::South, point(20.0, 25.0)),
        (DockPosition::West, point(5.0, 15.0)),
        (DockPosition::East, point(35.0, 15.0)),
    ];
    assert_eq!(expected.len(), DockPosition::ALL.len());
    for dock in DockPosition::ALL {
        let (_, want) = expected
            .iter()
            .find(|(d, _)| *d == dock)
            .expect("dock listed");
        assert_eq!(
            anchor::resolve(Some(&r), dock, DEFAULT_PADDING),
            *want,
            "{}",
            dock.as_str()
        );
    }
}

#[test]
fn top_dock_scenario() {
    let r = EntityRect::new(10.0, 10.0, 20.0, 10.0);
    assert_eq!(
        anchor::resolve(Some(&r), "top".parse().unwrap(), 5.0),
        point(20.0, 5.0)
    );
}

#[test]
fn every_style_starts_and_ends_exactly_on_the_anchors() {
    let start = point(12.345, 67.891);
    let end = point(411.1, 203.7);
    let obstacles = [EntityRect::new(150.0, 100.0, 60.0, 60.0)];
    for curve_type in CurveType::ALL {
        for direction in [Direction::Auto, Direction::Up, Direction::Left] {
            let spec = CurveSpec::new(curve_type, 0.7, direction);
            let path = curve::generate(start, end, &spec, &obstacles);
            assert_eq!(path.first_point(), Some(start), "{}", curve_type.as_str());
            assert_eq!(path.last_point(), Some(end), "{}", curve_type.as_str());
        }
    }
}

#[test]
fn bow_never_exceeds_the_offset_cap() {
    let start = point(0.0, 0.0);
    let end = point(5000.0, 0.0);
    assert_eq!(curve::bow_offset(start, end, 2.0), MAX_OFFSET);
    for curve_type in CurveType::ALL {
        let spec = CurveSpec::new(curve_type, 2.0, Direction::Auto);
        let path = curve::generate(start, end, &spec, &[]);
        for p in all_points(&path.segments) {
            assert!(p.y.abs() <= 1.5 * MAX_OFFSET + 1e-9, "{}", curve_type.as_str());
        }
    }
}

#[test]
fn routing_styles_without_obstacles_match_smooth() {
    let start = point(0.0, 0.0);
    let end = point(120.0, 80.0);
    let smooth = curve::generate(start, end, &CurveSpec::default(), &[]);
    for curve_type in [CurveType::AroundObstacle, CurveType::ShortestPath] {
        let spec = CurveSpec::new(curve_type, 0.4, Direction::Auto);
        assert_eq!(curve::generate(start, end, &spec, &[]), smooth);

        let far = [EntityRect::new(500.0, 500.0, 10.0, 10.0)];
        assert_eq!(curve::generate(start, end, &spec, &far), smooth);
    }
}

#[test]
fn smooth_scenario_svg() {
    let path = curve::generate(point(0.0, 0.0), point(100.0, 0.0), &CurveSpec::default(), &[]);
    assert_eq!(path.to_svg_d(), "M 0 0 C 30 20 70 20 100 0");
}

#[test]
fn obstacle_scenario_detours_through_one_waypoint() {
    let obstacles = [EntityRect::new(40.0, 40.0, 20.0, 20.0)];
    let start = point(0.0, 50.0);
    let end = point(100.0, 50.0);

    let shortest = CurveSpec::new(CurveType::ShortestPath, 0.4, Direction::Auto);
    let path = curve::generate(start, end, &shortest, &obstacles);
    assert_eq!(path.to_svg_d(), "M 0 50 L 105 95 L 100 50");

    let around = CurveSpec::new(CurveType::AroundObstacle, 0.4, Direction::Auto);
    let path = curve::generate(start, end, &around, &obstacles);
    assert_eq!(path.segments.len(), 3);
    assert_eq!(path.segments[1].end_point(), Some(point(105.0, 95.0)));
    assert_eq!(path.last_point(), Some(end));
}

#[test]
fn filled_triangle_scenario() {
    let glyph = build_head(point(50.0, 50.0), 0.0, 20.0, HeadShape::FilledTriangle, 0.0, false);
    let d = tether::path::segments_to_svg_d(&glyph.segments);
    assert_eq!(d, "M 50 50 L 32.679 40 L 32.679 60 Z");
}

#[test]
fn render_connector_orders_layers_and_scopes_ids() {
    let mut config = ConnectorConfig {
        instance_id: Some("flow".to_string()),
        label: Some("a to b".to_string()),
        ..ConnectorConfig::default()
    };
    config.end_head.layer = HeadLayer::Over;
    config.start_head.shape = HeadShape::Dot;

    let composite = render_connector(
        EntityRect::new(0.0, 0.0, 40.0, 40.0),
        EntityRect::new(200.0, 0.0, 40.0, 40.0),
        &[],
        &config,
    )
    .unwrap();

    let [under, over] = composite.layers();
    assert_eq!(under.kind, LayerKind::Under);
    assert_eq!(over.kind, LayerKind::Over);
    assert!(under.rank() < over.rank());
    assert_eq!(under.accessibility.label.as_deref(), Some("a to b"));
    assert!(over.accessibility.hidden);

    assert!(under.find(DrawableRole::Line).is_some());
    assert!(under.find(DrawableRole::Head(tether::compose::End::Start)).is_some());
    assert!(over.find(DrawableRole::Head(tether::compose::End::End)).is_some());
    assert!(over.find(DrawableRole::Overlay(tether::compose::End::End)).is_some());
    assert!(over.find(DrawableRole::Overlay(tether::compose::End::Start)).is_none());
    for item in under.items.iter().chain(&over.items) {
        assert!(item.id.starts_with("flow-"), "{}", item.id);
    }
}

#[test]
fn two_connectors_never_share_resource_ids() {
    let mut config = ConnectorConfig::default();
    config.line.halo = Some(Default::default());
    let a = EntityRect::new(0.0, 0.0, 10.0, 10.0);
    let b = EntityRect::new(100.0, 0.0, 10.0, 10.0);
    let one = render_connector(a, b, &[], &config).unwrap();
    let two = render_connector(a, b, &[], &config).unwrap();
    assert_eq!(one.resources.len(), 1);
    assert_ne!(one.resources, two.resources);
}
