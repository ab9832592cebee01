//! SVG serialization of a [`Composite`].
//!
//! Two entry points: one standalone `<svg>` per layer (for surfaces that stack the layers
//! themselves) and a single flattened document that paints both layers in rank order.

use crate::compose::{
    AnimationDirection, Composite, DashOverlay, Drawable, Layer, LayerKind, Resource,
};
use crate::path::segments_to_svg_d;
use std::fmt::Write as _;

#[derive(Debug, Clone)]
pub struct SvgOptions {
    pub width: f64,
    pub height: f64,
    pub background: Option<String>,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            background: None,
        }
    }
}

/// Standalone SVG for one layer.
pub fn render_layer_svg(composite: &Composite, kind: LayerKind, options: &SvgOptions) -> String {
    let layer = match kind {
        LayerKind::Under => composite.under(),
        LayerKind::Over => composite.over(),
    };
    let mut out = String::with_capacity(1024);
    let _ = write!(
        &mut out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" id="{id}-{kind}" class="tether-layer tether-{kind}" width="{w}" height="{h}" viewBox="0 0 {w} {h}" data-rank="{rank}" style="position:absolute;left:0;top:0;overflow:visible;pointer-events:none""#,
        id = escape_xml(&composite.instance_id),
        kind = kind.as_str(),
        w = fmt(options.width),
        h = fmt(options.height),
        rank = layer.rank(),
    );
    write_accessibility(&mut out, layer);
    out.push('>');
    write_title(&mut out, layer);
    if kind == LayerKind::Under {
        write_defs(&mut out, &composite.resources);
    }
    for item in &layer.items {
        write_drawable(&mut out, item);
    }
    out.push_str("</svg>");
    out
}

/// Single SVG document with both layers, `under` painted first.
pub fn render_svg(composite: &Composite, options: &SvgOptions) -> String {
    let mut out = String::with_capacity(2048);
    let _ = write!(
        &mut out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" id="{id}" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        id = escape_xml(&composite.instance_id),
        w = fmt(options.width),
        h = fmt(options.height),
    );
    if let Some(bg) = options.background.as_deref() {
        let _ = write!(
            &mut out,
            r#"<rect width="100%" height="100%" fill="{}"/>"#,
            escape_xml(bg)
        );
    }
    write_defs(&mut out, &composite.resources);
    for layer in composite.layers() {
        let _ = write!(
            &mut out,
            r#"<g class="tether-{kind}" data-rank="{rank}""#,
            kind = layer.kind.as_str(),
            rank = layer.rank(),
        );
        write_accessibility(&mut out, layer);
        out.push('>');
        write_title(&mut out, layer);
        for item in &layer.items {
            write_drawable(&mut out, item);
        }
        out.push_str("</g>");
    }
    out.push_str("</svg>");
    out
}

fn write_accessibility(out: &mut String, layer: &Layer) {
    let a = &layer.accessibility;
    if let Some(role) = a.role {
        let _ = write!(out, r#" role="{role}""#);
    }
    if let Some(label) = a.label.as_deref() {
        let _ = write!(out, r#" aria-label="{}""#, escape_xml(label));
    }
    if a.hidden {
        out.push_str(r#" aria-hidden="true" focusable="false""#);
    }
}

fn write_title(out: &mut String, layer: &Layer) {
    if let Some(label) = layer.accessibility.label.as_deref() {
        let _ = write!(out, "<title>{}</title>", escape_xml(label));
    }
}

fn write_defs(out: &mut String, resources: &[Resource]) {
    if resources.is_empty() {
        return;
    }
    out.push_str("<defs>");
    for r in resources {
        match r {
            Resource::BlurFilter { id, std_deviation } => {
                let _ = write!(
                    out,
                    r#"<filter id="{}" x="-50%" y="-50%" width="200%" height="200%"><feGaussianBlur stdDeviation="{}"/></filter>"#,
                    escape_xml(id),
                    fmt(*std_deviation)
                );
            }
        }
    }
    out.push_str("</defs>");
}

fn write_drawable(out: &mut String, d: &Drawable) {
    let _ = write!(
        out,
        r#"<path id="{}" d="{}" stroke="{}" stroke-width="{}" fill="{}" stroke-linecap="round" stroke-linejoin="round""#,
        escape_xml(&d.id),
        segments_to_svg_d(&d.segments),
        escape_xml(&d.stroke),
        fmt(d.stroke_width),
        escape_xml(d.fill.as_deref().unwrap_or("none")),
    );
    if d.opacity < 1.0 {
        let _ = write!(out, r#" opacity="{}""#, fmt(d.opacity));
    }
    if let Some(class) = d.class.as_deref() {
        let _ = write!(out, r#" class="{}""#, escape_xml(class));
    }
    if let Some(filter) = d.filter.as_deref() {
        let _ = write!(out, r#" filter="url(#{})""#, escape_xml(filter));
    }
    match &d.dash {
        None => out.push_str("/>"),
        Some(dash) => {
            let (from, _) = dash.offset_range();
            let _ = write!(
                out,
                r#" stroke-dasharray="{} {}" stroke-dashoffset="{}">"#,
                fmt(dash.pattern[0]),
                fmt(dash.pattern[1]),
                fmt(from)
            );
            write_dash_animation(out, dash);
            out.push_str("</path>");
        }
    }
}

fn write_dash_animation(out: &mut String, dash: &DashOverlay) {
    if dash.duration_ms <= 0.0 {
        return;
    }
    let (from, to) = dash.offset_range();
    let (values, dur) = match dash.direction {
        AnimationDirection::Normal | AnimationDirection::Reverse => {
            (format!("{};{}", fmt(from), fmt(to)), dash.duration_ms)
        }
        AnimationDirection::Alternate | AnimationDirection::AlternateReverse => (
            format!("{};{};{}", fmt(from), fmt(to), fmt(from)),
            dash.duration_ms * 2.0,
        ),
    };
    let _ = write!(
        out,
        r#"<animate attributeName="stroke-dashoffset" values="{values}" dur="{}ms" begin="{}ms" repeatCount="indefinite"/>"#,
        fmt(dur),
        fmt(dash.delay_ms)
    );
}

/// Attribute number formatting: integral values print without a fraction, `-0` and float
/// noise collapse.
fn fmt(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let mut v = if v.abs() < 1e-9 { 0.0 } else { v };
    let nearest = v.round();
    if (v - nearest).abs() < 1e-6 {
        v = nearest;
    }
    if v == 0.0 {
        v = 0.0;
    }
    format!("{v}")
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{CompositeInput, HaloSpec, LineStyle, compose};
    use crate::curve::{CurveSpec, generate};
    use crate::geom::point;
    use crate::head::{HeadLayer, HeadSpec};

    fn composite(label: Option<&str>, dash: Option<&DashOverlay>) -> Composite {
        let path = generate(point(0.0, 0.0), point(100.0, 0.0), &CurveSpec::default(), &[]);
        let end = HeadSpec {
            layer: HeadLayer::Over,
            ..HeadSpec::default()
        };
        let line = LineStyle {
            halo: Some(HaloSpec::default()),
            ..LineStyle::default()
        };
        compose(&CompositeInput {
            instance_id: "demo",
            path: &path,
            start: point(0.0, 0.0),
            end: point(100.0, 0.0),
            start_head: &HeadSpec::none(),
            end_head: &end,
            line: &line,
            dash,
            label,
        })
    }

    #[test]
    fn layer_svgs_carry_rank_and_accessibility() {
        let c = composite(Some("A <to> B"), None);
        let under = render_layer_svg(&c, LayerKind::Under, &SvgOptions::default());
        let over = render_layer_svg(&c, LayerKind::Over, &SvgOptions::default());
        assert!(under.contains(r#"id="demo-under""#));
        assert!(under.contains(r#"data-rank="0""#));
        assert!(under.contains(r#"role="img" aria-label="A &lt;to&gt; B""#));
        assert!(under.contains(r#"<filter id="demo-halo-blur""#));
        assert!(under.contains(r#"filter="url(#demo-halo-blur)""#));
        assert!(over.contains(r#"data-rank="1""#));
        assert!(over.contains(r#"aria-hidden="true""#));
        assert!(!over.contains("role="));
    }

    #[test]
    fn flat_svg_paints_under_before_over() {
        let c = composite(None, None);
        let svg = render_svg(&c, &SvgOptions::default());
        let under = svg.find(r#"class="tether-under""#).unwrap();
        let over = svg.find(r#"class="tether-over""#).unwrap();
        assert!(under < over);
        assert!(svg.contains(r#"d="M 0 0 C 30 20 70 20 100 0""#));
    }

    #[test]
    fn dash_overlay_emits_smil_animation() {
        let dash = DashOverlay {
            pattern: [6.0, 4.0],
            duration_ms: 800.0,
            delay_ms: 100.0,
            direction: AnimationDirection::Alternate,
        };
        let c = composite(None, Some(&dash));
        let svg = render_svg(&c, &SvgOptions::default());
        assert!(svg.contains(r#"stroke-dasharray="6 4" stroke-dashoffset="10""#));
        assert!(svg.contains(r#"values="10;0;10" dur="1600ms" begin="100ms""#));
    }

    #[test]
    fn fmt_matches_expected() {
        assert_eq!(fmt(f64::NAN), "0");
        assert_eq!(fmt(-0.0), "0");
        assert_eq!(fmt(2.0), "2");
        assert_eq!(fmt(0.25), "0.25");
        assert_eq!(fmt(3.0000000001), "3");
    }
}
