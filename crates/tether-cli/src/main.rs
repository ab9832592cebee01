use serde::Serialize;
use std::io::Read;
use std::str::FromStr;
use tether::{Composite, LayerKind, Scene, SvgOptions, render_layer_svg, render_svg};

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Tether(tether::Error),
    Json(serde_json::Error),
    Raster(&'static str),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Tether(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Raster(msg) => write!(f, "{msg}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<tether::Error> for CliError {
    fn from(value: tether::Error) -> Self {
        Self::Tether(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Render,
    Layout,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum RenderFormat {
    #[default]
    Svg,
    Png,
}

impl FromStr for RenderFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum LayerSelection {
    #[default]
    Flat,
    Only(LayerKind),
}

impl FromStr for LayerSelection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" | "both" => Ok(Self::Flat),
            "under" => Ok(Self::Only(LayerKind::Under)),
            "over" => Ok(Self::Only(LayerKind::Over)),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    render_format: RenderFormat,
    render_scale: f32,
    layer: LayerSelection,
    background: Option<String>,
    width: Option<f64>,
    height: Option<f64>,
    instance_id: Option<String>,
    out: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnchorsOut {
    start: [f64; 2],
    end: [f64; 2],
    obstacles: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LayoutOut<'a> {
    width: f64,
    height: f64,
    anchors: Option<AnchorsOut>,
    composite: &'a Composite,
}

fn usage() -> &'static str {
    "tether-cli\n\
\n\
USAGE:\n\
  tether-cli layout [--pretty] [--id <instance-id>] [<path>|-]\n\
  tether-cli [render] [--format svg|png] [--layer flat|under|over] [--scale <n>] [--background <css-color>] [--width <w>] [--height <h>] [--id <instance-id>] [--out <path>] [<path>|-]\n\
\n\
NOTES:\n\
  - Input is a JSON scene: entity rects, `start`/`end` entity names, obstacle names and a connector config.\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - layout prints the resolved anchors and both composite layers as JSON.\n\
  - render prints SVG to stdout by default; use --out to write a file.\n\
  - PNG output defaults to writing next to the input file (or ./out.png for stdin).\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        command: Command::Render,
        render_scale: 1.0,
        ..Default::default()
    };

    let mut it = argv.iter().skip(1).peekable();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "render" => args.command = Command::Render,
            "layout" => args.command = Command::Layout,
            "--pretty" => args.pretty = true,
            "--format" => {
                let Some(fmt) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.render_format = fmt
                    .parse::<RenderFormat>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--layer" => {
                let Some(layer) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.layer = layer
                    .parse::<LayerSelection>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--scale" => {
                let Some(scale) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.render_scale = scale.parse::<f32>().map_err(|_| CliError::Usage(usage()))?;
                if !(args.render_scale.is_finite() && args.render_scale > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--background" => {
                let Some(bg) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                if !bg.trim().is_empty() {
                    args.background = Some(bg.trim().to_string());
                }
            }
            "--width" => {
                let Some(w) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.width = Some(parse_dimension(w)?);
            }
            "--height" => {
                let Some(h) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.height = Some(parse_dimension(h)?);
            }
            "--id" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.instance_id = Some(id.clone());
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn parse_dimension(raw: &str) -> Result<f64, CliError> {
    let v = raw.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(CliError::Usage(usage()))
    }
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    Ok(())
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn default_raster_out_path(input: Option<&str>, ext: &str) -> std::path::PathBuf {
    match input {
        Some(path) if path != "-" => std::path::PathBuf::from(path).with_extension(ext),
        _ => std::path::PathBuf::from(format!("out.{ext}")),
    }
}

fn parse_tiny_skia_color(text: &str) -> Option<tiny_skia::Color> {
    let s = text.trim().to_ascii_lowercase();
    match s.as_str() {
        "transparent" => return Some(tiny_skia::Color::from_rgba8(0, 0, 0, 0)),
        "white" => return Some(tiny_skia::Color::from_rgba8(255, 255, 255, 255)),
        "black" => return Some(tiny_skia::Color::from_rgba8(0, 0, 0, 255)),
        _ => {}
    }

    let hex = s.strip_prefix('#')?;
    fn hex2(b: &[u8]) -> Option<u8> {
        let hi = (*b.first()? as char).to_digit(16)? as u8;
        let lo = (*b.get(1)? as char).to_digit(16)? as u8;
        Some((hi << 4) | lo)
    }
    fn hex1(c: u8) -> Option<u8> {
        let v = (c as char).to_digit(16)? as u8;
        Some((v << 4) | v)
    }

    let bytes = hex.as_bytes();
    match bytes.len() {
        3 => Some(tiny_skia::Color::from_rgba8(
            hex1(bytes[0])?,
            hex1(bytes[1])?,
            hex1(bytes[2])?,
            255,
        )),
        4 => Some(tiny_skia::Color::from_rgba8(
            hex1(bytes[0])?,
            hex1(bytes[1])?,
            hex1(bytes[2])?,
            hex1(bytes[3])?,
        )),
        6 => Some(tiny_skia::Color::from_rgba8(
            hex2(&bytes[0..2])?,
            hex2(&bytes[2..4])?,
            hex2(&bytes[4..6])?,
            255,
        )),
        8 => Some(tiny_skia::Color::from_rgba8(
            hex2(&bytes[0..2])?,
            hex2(&bytes[2..4])?,
            hex2(&bytes[4..6])?,
            hex2(&bytes[6..8])?,
        )),
        _ => None,
    }
}

fn render_svg_to_png(
    svg: &str,
    width: f64,
    height: f64,
    scale: f32,
    background: Option<&str>,
) -> Result<Vec<u8>, CliError> {
    let opt = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg, &opt)
        .map_err(|_| CliError::Raster("failed to parse SVG for PNG rendering"))?;

    let width_px = ((width as f32) * scale).ceil().max(1.0) as u32;
    let height_px = ((height as f32) * scale).ceil().max(1.0) as u32;
    let mut pixmap = tiny_skia::Pixmap::new(width_px, height_px)
        .ok_or(CliError::Raster("failed to allocate pixmap for PNG rendering"))?;

    if let Some(color) = background.and_then(parse_tiny_skia_color) {
        pixmap.fill(color);
    }
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    pixmap
        .encode_png()
        .map_err(|_| CliError::Raster("failed to encode PNG"))
}

fn load_scene(args: &Args) -> Result<Scene, CliError> {
    let text = read_input(args.input.as_deref())?;
    let mut scene = Scene::from_json_str(&text)?;
    if let Some(w) = args.width {
        scene.width = w;
    }
    if let Some(h) = args.height {
        scene.height = h;
    }
    if let Some(id) = args.instance_id.as_deref() {
        scene.connector.instance_id = Some(id.to_string());
    }
    Ok(scene)
}

fn run(args: Args) -> Result<(), CliError> {
    let scene = load_scene(&args)?;
    let connector = scene.layout()?;

    match args.command {
        Command::Layout => {
            let anchors = connector.committed().map(|s| AnchorsOut {
                start: [s.start.x, s.start.y],
                end: [s.end.x, s.end.y],
                obstacles: s.obstacles.len(),
            });
            let out = LayoutOut {
                width: scene.width,
                height: scene.height,
                anchors,
                composite: connector.composite(),
            };
            write_json(&out, args.pretty)?;
            if args.pretty {
                println!();
            }
            Ok(())
        }
        Command::Render => {
            let png = args.render_format == RenderFormat::Png;
            let options = SvgOptions {
                width: scene.width,
                height: scene.height,
                // PNG output fills the pixmap directly instead.
                background: if png { None } else { args.background.clone() },
            };
            let svg = match args.layer {
                LayerSelection::Flat => render_svg(connector.composite(), &options),
                LayerSelection::Only(kind) => {
                    render_layer_svg(connector.composite(), kind, &options)
                }
            };

            if !png {
                return write_text(&svg, args.out.as_deref());
            }
            let bytes = render_svg_to_png(
                &svg,
                scene.width,
                scene.height,
                args.render_scale,
                args.background.as_deref(),
            )?;
            let path = match args.out.as_deref() {
                Some(p) => std::path::PathBuf::from(p),
                None => default_raster_out_path(args.input.as_deref(), "png"),
            };
            std::fs::write(path, bytes)?;
            Ok(())
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_colors_parse_in_every_hex_form() {
        let rgba = |c: tiny_skia::Color| c.to_color_u8();
        let expect = |r, g, b, a| tiny_skia::Color::from_rgba8(r, g, b, a).to_color_u8();
        assert_eq!(rgba(parse_tiny_skia_color("#fff").unwrap()), expect(255, 255, 255, 255));
        assert_eq!(rgba(parse_tiny_skia_color("#fff8").unwrap()), expect(255, 255, 255, 0x88));
        assert_eq!(rgba(parse_tiny_skia_color("#2563eb").unwrap()), expect(0x25, 0x63, 0xeb, 255));
        assert_eq!(rgba(parse_tiny_skia_color("#00000080").unwrap()), expect(0, 0, 0, 0x80));
        assert_eq!(rgba(parse_tiny_skia_color(" White ").unwrap()), expect(255, 255, 255, 255));
        assert!(parse_tiny_skia_color("#12345").is_none());
        assert!(parse_tiny_skia_color("teal").is_none());
    }
}
