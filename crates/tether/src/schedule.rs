//! Frame-coalesced recomputation scheduling.
//!
//! Triggers only raise a `pending` flag; the host drives [`Scheduler::begin_frame`] once per
//! animation frame, so any burst of triggers between two frames yields at most one pipeline run.
//! Everything here is single-threaded (`Rc` + `Cell`).

use crate::geom::{EntityRect, Point};
use rustc_hash::FxHashMap;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Coordinate deltas below this are treated as "no change".
pub const TOLERANCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    EntityResize,
    SubtreeMutation,
    ViewportResize,
    ViewportScroll,
    PropsChanged,
}

impl Trigger {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EntityResize => "entity-resize",
            Self::SubtreeMutation => "subtree-mutation",
            Self::ViewportResize => "viewport-resize",
            Self::ViewportScroll => "viewport-scroll",
            Self::PropsChanged => "props-changed",
        }
    }

    /// Prop changes can alter style without moving any anchor, so they bypass tolerance
    /// suppression for the next frame.
    fn forces_commit(self) -> bool {
        matches!(self, Self::PropsChanged)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

#[derive(Debug, Default)]
struct Shared {
    pending: Cell<bool>,
    forced: Cell<bool>,
    in_flight: Cell<bool>,
    torn_down: Cell<bool>,
    next_id: Cell<u64>,
    subscriptions: RefCell<FxHashMap<SubscriptionId, Trigger>>,
}

impl Shared {
    /// Returns `true` when the trigger was accepted.
    fn raise(&self, trigger: Trigger) -> bool {
        if self.torn_down.get() {
            return false;
        }
        if self.in_flight.get() {
            tracing::trace!(trigger = trigger.as_str(), "ignoring trigger during recompute");
            return false;
        }
        self.pending.set(true);
        if trigger.forces_commit() {
            self.forced.set(true);
        }
        true
    }
}

/// Handle given to an observation source. It stays valid until the subscription is dropped or
/// the owning scheduler is torn down; after that `fire` is a no-op.
#[derive(Debug, Clone)]
pub struct TriggerHandle {
    shared: Weak<Shared>,
    id: SubscriptionId,
    trigger: Trigger,
}

impl TriggerHandle {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    pub fn is_active(&self) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|s| s.subscriptions.borrow().contains_key(&self.id))
    }

    pub fn fire(&self) -> bool {
        let Some(shared) = self.shared.upgrade() else {
            return false;
        };
        if !shared.subscriptions.borrow().contains_key(&self.id) {
            return false;
        }
        shared.raise(self.trigger)
    }
}

/// Proof that a recomputation is in flight. Dropping it releases the guard.
#[derive(Debug)]
pub struct FrameTicket {
    shared: Rc<Shared>,
    forced: bool,
}

impl FrameTicket {
    pub fn forced(&self) -> bool {
        self.forced
    }
}

impl Drop for FrameTicket {
    fn drop(&mut self) {
        self.shared.in_flight.set(false);
    }
}

#[derive(Debug, Default)]
pub struct Scheduler {
    shared: Rc<Shared>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observation source for `trigger`.
    pub fn subscribe(&self, trigger: Trigger) -> TriggerHandle {
        let id = SubscriptionId(self.shared.next_id.get());
        self.shared.next_id.set(id.0 + 1);
        if !self.shared.torn_down.get() {
            self.shared.subscriptions.borrow_mut().insert(id, trigger);
        }
        TriggerHandle {
            shared: Rc::downgrade(&self.shared),
            id,
            trigger,
        }
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.subscriptions.borrow_mut().remove(&id).is_some()
    }

    pub fn subscription_count(&self) -> usize {
        self.shared.subscriptions.borrow().len()
    }

    /// Direct trigger from the owner (e.g. a coordinate or prop change).
    pub fn notify(&self, trigger: Trigger) -> bool {
        self.shared.raise(trigger)
    }

    pub fn is_pending(&self) -> bool {
        self.shared.pending.get()
    }

    pub fn is_in_flight(&self) -> bool {
        self.shared.in_flight.get()
    }

    pub fn is_torn_down(&self) -> bool {
        self.shared.torn_down.get()
    }

    /// Claims the pending recomputation for this frame, if any.
    pub fn begin_frame(&self) -> Option<FrameTicket> {
        let s = &self.shared;
        if s.torn_down.get() || s.in_flight.get() || !s.pending.get() {
            return None;
        }
        s.pending.set(false);
        s.in_flight.set(true);
        Some(FrameTicket {
            shared: Rc::clone(s),
            forced: s.forced.replace(false),
        })
    }

    /// Drops every subscription. No trigger is accepted afterwards.
    pub fn teardown(&self) {
        let s = &self.shared;
        s.torn_down.set(true);
        s.pending.set(false);
        s.forced.set(false);
        let dropped = {
            let mut subs = s.subscriptions.borrow_mut();
            let n = subs.len();
            subs.clear();
            n
        };
        tracing::debug!(subscriptions = dropped, "scheduler torn down");
    }
}

/// Geometry inputs of the last committed recomputation.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub start: Point,
    pub end: Point,
    pub obstacles: Vec<EntityRect>,
}

impl Snapshot {
    pub fn within_tolerance(&self, other: &Snapshot) -> bool {
        let close = |a: Point, b: Point| (a.x - b.x).abs() < TOLERANCE && (a.y - b.y).abs() < TOLERANCE;
        close(self.start, other.start)
            && close(self.end, other.end)
            && self.obstacles.len() == other.obstacles.len()
            && self
                .obstacles
                .iter()
                .zip(&other.obstacles)
                .all(|(a, b)| a.max_delta(b) < TOLERANCE)
    }
}

#[derive(Debug, Default)]
pub struct Committed {
    snapshot: Option<Snapshot>,
}

impl Committed {
    pub fn get(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Stores `next` unless it is within tolerance of the current snapshot. Returns whether the
    /// snapshot was replaced.
    pub fn commit(&mut self, next: Snapshot) -> bool {
        if let Some(prev) = &self.snapshot {
            if prev.within_tolerance(&next) {
                return false;
            }
        }
        self.snapshot = Some(next);
        true
    }

    /// Stores `next` unconditionally.
    pub fn replace(&mut self, next: Snapshot) {
        self.snapshot = Some(next);
    }

    pub fn clear(&mut self) {
        self.snapshot = None;
    }
}
