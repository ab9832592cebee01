#![forbid(unsafe_code)]

//! `tether` is a headless geometry engine for curved connectors between two rectangular
//! entities.
//!
//! Pipeline, per recomputation:
//! - resolve both anchors from entity rects and dock positions ([`anchor`])
//! - generate a path in one of eight curve styles, routing around obstacles when asked
//!   ([`curve`], [`router`])
//! - build arrowhead glyphs at both ends ([`head`])
//! - split everything into an `under` and an `over` layer ([`compose`])
//!
//! Live hosts drive recomputation through a [`Connector`], which coalesces triggers into at most
//! one run per animation frame and suppresses sub-pixel jitter ([`schedule`]). Static documents
//! go through [`Scene`].

pub mod anchor;
pub mod compose;
pub mod config;
pub mod connector;
pub mod curve;
pub mod error;
pub mod geom;
pub mod head;
pub mod path;
pub mod router;
pub mod scene;
pub mod schedule;
pub mod svg;

pub use anchor::DockPosition;
pub use compose::{Composite, Drawable, DrawableRole, Layer, LayerKind};
pub use config::{ConnectorConfig, DashAnimation};
pub use connector::{Connector, FrameOutcome, RectSource};
pub use curve::{CurveSpec, CurveType, Direction};
pub use error::{Error, Result};
pub use geom::{EntityRect, Point};
pub use head::{HeadLayer, HeadShape, HeadSpec};
pub use path::{PathDescription, Segment};
pub use scene::Scene;
pub use schedule::{Scheduler, Trigger, TriggerHandle};
pub use svg::{SvgOptions, render_layer_svg, render_svg};

use std::rc::Rc;

/// One-shot layout: resolves, routes and composes a connector between two fixed rects.
pub fn render_connector(
    start: EntityRect,
    end: EntityRect,
    obstacles: &[EntityRect],
    config: &ConnectorConfig,
) -> Result<Composite> {
    let mut connector = Connector::new(config.clone())?;
    connector.set_start(Rc::new(start));
    connector.set_end(Rc::new(end));
    connector.set_obstacles(
        obstacles
            .iter()
            .map(|r| Rc::new(*r) as Rc<dyn RectSource>)
            .collect(),
    );
    connector.on_frame();
    Ok(connector.composite().clone())
}
