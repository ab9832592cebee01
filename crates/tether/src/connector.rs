//! A single connector instance: configuration, tracked entities, scheduler and the last
//! committed drawable state.

use crate::anchor;
use crate::compose::{Composite, CompositeInput, DashOverlay, compose};
use crate::config::ConnectorConfig;
use crate::curve;
use crate::error::Result;
use crate::geom::EntityRect;
use crate::path::PathDescription;
use crate::schedule::{Committed, Scheduler, Snapshot, Trigger, TriggerHandle};
use std::cell::Cell;
use std::rc::Rc;

/// The one capability the engine needs from the layout provider.
///
/// `None` means the entity is currently absent (unmounted, hidden, not yet laid out).
pub trait RectSource {
    fn rect(&self) -> Option<EntityRect>;
}

impl RectSource for EntityRect {
    fn rect(&self) -> Option<EntityRect> {
        Some(*self)
    }
}

impl RectSource for Option<EntityRect> {
    fn rect(&self) -> Option<EntityRect> {
        *self
    }
}

impl RectSource for Cell<Option<EntityRect>> {
    fn rect(&self) -> Option<EntityRect> {
        self.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Nothing pending, a recompute already in flight, or the connector was torn down.
    Idle,
    /// An endpoint could not be resolved; the composite was cleared.
    Unresolved,
    /// Recomputed geometry was within tolerance of the committed snapshot and discarded.
    Suppressed,
    Updated,
}

/// Conservative id token: ASCII alphanumerics plus `-`/`_`, starting with a letter.
pub fn sanitize_instance_id(raw: &str) -> String {
    let raw = raw.trim();
    let mut out = String::with_capacity(raw.len() + 2);
    for ch in raw.chars() {
        let ok = ch.is_ascii_alphanumeric() || ch == '-' || ch == '_';
        out.push(if ok { ch } else { '-' });
    }
    while out.contains("--") {
        out = out.replace("--", "-");
    }
    let out = out.trim_matches('-');
    if out.is_empty() {
        return "t-untitled".to_string();
    }
    if out.starts_with(|c: char| c.is_ascii_alphabetic()) {
        out.to_string()
    } else {
        format!("t-{out}")
    }
}

fn generate_instance_id() -> String {
    format!("tether-{}", uuid::Uuid::new_v4().simple())
}

pub struct Connector {
    id: String,
    config: ConnectorConfig,
    dash: Option<DashOverlay>,
    start: Option<Rc<dyn RectSource>>,
    end: Option<Rc<dyn RectSource>>,
    obstacles: Vec<Rc<dyn RectSource>>,
    scheduler: Scheduler,
    committed: Committed,
    composite: Composite,
}

impl std::fmt::Debug for Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("obstacles", &self.obstacles.len())
            .field("committed", &self.committed)
            .finish_non_exhaustive()
    }
}

impl Connector {
    pub fn new(config: ConnectorConfig) -> Result<Self> {
        let id = match config.instance_id.as_deref() {
            Some(raw) => sanitize_instance_id(raw),
            None => generate_instance_id(),
        };
        let dash = config.dash_overlay()?;
        let composite = Composite::empty(&id, config.label.as_deref());
        let scheduler = Scheduler::new();
        scheduler.notify(Trigger::PropsChanged);
        tracing::debug!(instance = %id, curve = config.curve_type.as_str(), "connector created");
        Ok(Self {
            id,
            config,
            dash,
            start: None,
            end: None,
            obstacles: Vec::new(),
            scheduler,
            committed: Committed::default(),
            composite,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ConnectorConfig) -> Result<()> {
        self.dash = config.dash_overlay()?;
        self.config = config;
        self.scheduler.notify(Trigger::PropsChanged);
        Ok(())
    }

    pub fn set_start(&mut self, source: Rc<dyn RectSource>) {
        self.start = Some(source);
        self.scheduler.notify(Trigger::PropsChanged);
    }

    pub fn set_end(&mut self, source: Rc<dyn RectSource>) {
        self.end = Some(source);
        self.scheduler.notify(Trigger::PropsChanged);
    }

    pub fn set_obstacles(&mut self, sources: Vec<Rc<dyn RectSource>>) {
        self.obstacles = sources;
        self.scheduler.notify(Trigger::PropsChanged);
    }

    /// Subscribes an observation source (resize/mutation/viewport listener) to this connector.
    pub fn subscribe(&self, trigger: Trigger) -> TriggerHandle {
        self.scheduler.subscribe(trigger)
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn composite(&self) -> &Composite {
        &self.composite
    }

    pub fn committed(&self) -> Option<&Snapshot> {
        self.committed.get()
    }

    /// Unsubscribes every observation source; no recomputation fires afterwards.
    pub fn teardown(&mut self) {
        self.scheduler.teardown();
    }

    /// Reads the current anchors and obstacle rects. `None` when an endpoint is missing.
    pub fn measure(&self) -> Option<Snapshot> {
        let padding = self.config.padding;
        let start_rect = self.start.as_ref()?.rect()?;
        let end_rect = self.end.as_ref()?.rect()?;
        let obstacles = self.obstacles.iter().filter_map(|o| o.rect()).collect();
        Some(Snapshot {
            start: anchor::resolve(Some(&start_rect), self.config.start_dock, padding),
            end: anchor::resolve(Some(&end_rect), self.config.end_dock, padding),
            obstacles,
        })
    }

    pub fn path_for(&self, snapshot: &Snapshot) -> PathDescription {
        curve::generate(
            snapshot.start,
            snapshot.end,
            &self.config.curve_spec(),
            &snapshot.obstacles,
        )
    }

    /// Runs the full pipeline for `snapshot` without touching committed state.
    pub fn build(&self, snapshot: &Snapshot) -> Composite {
        let path = self.path_for(snapshot);
        compose(&CompositeInput {
            instance_id: &self.id,
            path: &path,
            start: snapshot.start,
            end: snapshot.end,
            start_head: &self.config.start_head,
            end_head: &self.config.end_head,
            line: &self.config.line,
            dash: self.dash.as_ref(),
            label: self.config.label.as_deref(),
        })
    }

    /// Drives one animation frame.
    pub fn on_frame(&mut self) -> FrameOutcome {
        let Some(ticket) = self.scheduler.begin_frame() else {
            return FrameOutcome::Idle;
        };

        let Some(snapshot) = self.measure() else {
            tracing::debug!(instance = %self.id, "endpoint unresolved, clearing connector");
            self.committed.clear();
            self.composite = Composite::empty(&self.id, self.config.label.as_deref());
            return FrameOutcome::Unresolved;
        };

        let composite = self.build(&snapshot);
        let changed = if ticket.forced() {
            self.committed.replace(snapshot);
            true
        } else {
            self.committed.commit(snapshot)
        };
        if !changed {
            tracing::trace!(instance = %self.id, "geometry within tolerance, discarding recompute");
            return FrameOutcome::Suppressed;
        }

        self.composite = composite;
        FrameOutcome::Updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_instance_id_produces_safe_tokens() {
        assert_eq!(sanitize_instance_id("  my connector #1 "), "my-connector-1");
        assert_eq!(sanitize_instance_id("42"), "t-42");
        assert_eq!(sanitize_instance_id("***"), "t-untitled");
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = Connector::new(ConnectorConfig::default()).unwrap();
        let b = Connector::new(ConnectorConfig::default()).unwrap();
        assert_ne!(a.id(), b.id());
        assert!(a.id().starts_with("tether-"));
    }

    #[test]
    fn missing_endpoint_renders_nothing() {
        let mut c = Connector::new(ConnectorConfig::default()).unwrap();
        c.set_start(Rc::new(EntityRect::new(0.0, 0.0, 10.0, 10.0)));
        assert_eq!(c.on_frame(), FrameOutcome::Unresolved);
        assert!(c.composite().is_empty());
        assert!(c.committed().is_none());
    }
}
