//! Observers of resolved events.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::aura::Aura;
use crate::events::ResolvedEvent;

/// Notified after an event survived every spell and was applied.
///
/// Listeners may call back into the aura. Events resolved during a callback are
/// queued and delivered to every listener, this one included, after the
/// current event has reached all of them.
pub trait EventListener {
    /// Handle a resolved event.
    fn on_event(&mut self, aura: &mut Aura, event: &ResolvedEvent);
}

impl<L: EventListener + ?Sized> EventListener for Box<L> {
    fn on_event(&mut self, aura: &mut Aura, event: &ResolvedEvent) {
        (**self).on_event(aura, event);
    }
}

/// Shared listeners let the caller keep a handle to inspect them.
impl<L: EventListener> EventListener for Rc<RefCell<L>> {
    fn on_event(&mut self, aura: &mut Aura, event: &ResolvedEvent) {
        match self.try_borrow_mut() {
            Ok(mut listener) => listener.on_event(aura, event),
            Err(_) => trace!(event = event.label(), "Shared listener busy, event skipped"),
        }
    }
}

/// Default number of events kept by an [`EventLog`].
pub const DEFAULT_LOG_CAPACITY: usize = 256;

/// Bounded history of resolved events, oldest first.
#[derive(Debug, Clone)]
pub struct EventLog {
    events: VecDeque<ResolvedEvent>,
    capacity: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl EventLog {
    /// Create a log keeping at most `capacity` events (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity.min(DEFAULT_LOG_CAPACITY)),
            capacity,
        }
    }

    /// Maximum number of events kept.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of events kept.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Recorded events, oldest first.
    pub fn events(&self) -> impl Iterator<Item = &ResolvedEvent> {
        self.events.iter()
    }

    /// Most recent event.
    #[must_use]
    pub fn last(&self) -> Option<&ResolvedEvent> {
        self.events.back()
    }

    /// Forget every recorded event.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Append an event, dropping the oldest one when full.
    pub fn record(&mut self, event: ResolvedEvent) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        debug!(event = event.label(), "Event recorded");
        self.events.push_back(event);
    }
}

impl EventListener for EventLog {
    fn on_event(&mut self, _aura: &mut Aura, event: &ResolvedEvent) {
        self.record(event.clone());
    }
}
