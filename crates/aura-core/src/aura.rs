//! The aura: a bounded magic pool plus the spells acting on it.
//!
//! Every state change goes through [`Aura::process_event`]:
//!
//! 1. The event is offered to every active spell in registration order. A spell
//!    can rewrite it or cancel it; a canceled event stops there.
//! 2. A surviving event is applied (magic change, registration, unregistration).
//! 3. Listeners are notified in registration order.
//!
//! Spells and listeners may call back into the aura from their hooks. A spell
//! whose hook is running does not see the events it causes. Events resolved
//! while listeners are being notified are queued and delivered afterwards, so
//! every listener sees every resolved event once, in resolution order.

use std::collections::VecDeque;
use std::fmt;

use aura_common::{ListenerId, SpellId};
use tracing::{debug, trace};

use crate::events::{AuraEvent, EventOutcome, ResolvedEvent};
use crate::listener::EventListener;
use crate::registry::{CheckIn, Spells, Taken};
use crate::spell::{Spell, SpellInfo};
use crate::values::{MinMaxValue, ValueWithModifiers};

/// Default base cast delay in seconds.
pub const DEFAULT_CAST_DELAY: f64 = 1.0;

struct ListenerSlot {
    id: ListenerId,
    listener: Option<Box<dyn EventListener>>,
    removed: bool,
}

enum Applied {
    Event(ResolvedEvent),
    Cast(Box<dyn Spell>),
    Nothing,
}

/// Status-effect state of one entity.
pub struct Aura {
    magic: MinMaxValue,
    cast_delay: ValueWithModifiers,
    spells: Spells,
    listeners: Vec<ListenerSlot>,
    pending_evictions: Vec<SpellId>,
    notifications: VecDeque<ResolvedEvent>,
    notifying: bool,
}

impl fmt::Debug for Aura {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aura")
            .field("magic", &self.magic)
            .field("cast_delay", &self.cast_delay)
            .field("spells", &self.spells)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Aura {
    /// Create an aura with magic bounded by `[min_magic, max_magic]`, starting full.
    #[must_use]
    pub fn new(min_magic: f64, max_magic: f64) -> Self {
        Self {
            magic: MinMaxValue::new(max_magic, min_magic, max_magic),
            cast_delay: ValueWithModifiers::new(DEFAULT_CAST_DELAY),
            spells: Spells::new(),
            listeners: Vec::new(),
            pending_evictions: Vec::new(),
            notifications: VecDeque::new(),
            notifying: false,
        }
    }

    /// Set the base cast delay.
    #[must_use]
    pub fn with_cast_delay(mut self, cast_delay: f64) -> Self {
        self.cast_delay.set_base(cast_delay);
        self
    }

    /// Set the starting magic, clamped into range.
    #[must_use]
    pub fn with_magic(mut self, magic: f64) -> Self {
        self.magic.set_value(magic);
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The magic pool.
    #[must_use]
    pub const fn magic(&self) -> &MinMaxValue {
        &self.magic
    }

    /// Mutable magic pool. Direct writes bypass spells and listeners.
    pub fn magic_mut(&mut self) -> &mut MinMaxValue {
        &mut self.magic
    }

    /// Cast delay with its modifiers.
    #[must_use]
    pub const fn cast_delay(&self) -> &ValueWithModifiers {
        &self.cast_delay
    }

    /// Mutable cast delay.
    pub fn cast_delay_mut(&mut self) -> &mut ValueWithModifiers {
        &mut self.cast_delay
    }

    /// Registered spells.
    #[must_use]
    pub const fn spells(&self) -> &Spells {
        &self.spells
    }

    /// Registered spells, for typed mutation of idle spells.
    pub fn spells_mut(&mut self) -> &mut Spells {
        &mut self.spells
    }

    // ========================================================================
    // Spells
    // ========================================================================

    /// Attach a spell. Returns its handle, or `None` if a spell canceled the addition.
    pub fn add_spell<S: Spell>(&mut self, spell: S) -> Option<SpellId> {
        self.add_boxed_spell(Box::new(spell))
    }

    /// Attach a boxed spell.
    pub fn add_boxed_spell(&mut self, spell: Box<dyn Spell>) -> Option<SpellId> {
        match self.process_event(AuraEvent::add_spell(spell)) {
            EventOutcome::Resolved(ResolvedEvent::SpellAdded { id, .. }) => Some(id),
            _ => None,
        }
    }

    /// Detach a spell. Returns false if it is absent or the removal was canceled.
    pub fn remove_spell(&mut self, id: SpellId) -> bool {
        self.process_event(AuraEvent::remove_spell(id)).is_resolved()
    }

    /// Change the level of a registered spell and carry the change into the
    /// passive effects it installed. Returns false if the spell is absent,
    /// retiring or running one of its own hooks.
    pub fn set_spell_level(&mut self, id: SpellId, level: u32) -> bool {
        let Some(mut spell) = self.spells.check_out(id) else {
            return false;
        };
        spell.set_level(level);
        spell.refresh(self);
        debug!(%id, spell = spell.name(), level = spell.level(), "Spell level changed");
        self.check_in(id, spell);
        true
    }

    /// Cast a spell from this aura. Spells may re-level it on the way out.
    /// Returns the spell if the cast went through, `None` if it was canceled.
    pub fn cast_spell<S: Spell>(&mut self, spell: S) -> Option<Box<dyn Spell>> {
        self.cast_boxed_spell(Box::new(spell))
    }

    /// Cast a boxed spell.
    pub fn cast_boxed_spell(&mut self, spell: Box<dyn Spell>) -> Option<Box<dyn Spell>> {
        self.dispatch(AuraEvent::cast(spell)).1
    }

    // ========================================================================
    // Listeners
    // ========================================================================

    /// Register a listener, notified after listeners registered earlier.
    pub fn add_listener<L: EventListener + 'static>(&mut self, listener: L) -> ListenerId {
        let id = ListenerId::new();
        self.listeners.push(ListenerSlot {
            id,
            listener: Some(Box::new(listener)),
            removed: false,
        });
        debug!(%id, "Listener added");
        id
    }

    /// Unregister a listener and hand it back. A listener removed from inside
    /// its own callback is dropped when the callback returns, and `None` is returned.
    pub fn remove_listener(&mut self, id: ListenerId) -> Option<Box<dyn EventListener>> {
        let index = self
            .listeners
            .iter()
            .position(|slot| slot.id == id && !slot.removed)?;
        debug!(%id, "Listener removed");
        if self.listeners[index].listener.is_some() {
            self.listeners.remove(index).listener
        } else {
            self.listeners[index].removed = true;
            None
        }
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.iter().filter(|slot| !slot.removed).count()
    }

    // ========================================================================
    // Pipeline
    // ========================================================================

    /// Route an event through the active spells, apply it if it survives, then
    /// notify listeners.
    pub fn process_event(&mut self, event: AuraEvent) -> EventOutcome {
        self.dispatch(event).0
    }

    /// Advance time.
    ///
    /// Order: magic cap modifiers, cast delay modifiers, every active spell's
    /// `update`, then eviction of the spells that finished.
    pub fn update(&mut self, dt: f64) {
        let dt = dt.max(0.0);
        self.magic.update(dt);
        self.cast_delay.update(dt);

        for id in self.spells.active_ids() {
            let Some(mut spell) = self.spells.check_out(id) else {
                continue;
            };
            if spell.update(self, dt) {
                self.spells.set_retiring(id);
            }
            self.check_in(id, spell);
        }

        for id in self.spells.retiring_ids() {
            self.evict(id);
        }
        self.flush_evictions();
    }

    fn dispatch(&mut self, mut event: AuraEvent) -> (EventOutcome, Option<Box<dyn Spell>>) {
        trace!(event = event.label(), "Processing aura event");

        if !self.propagate(&mut event) {
            self.flush_evictions();
            return (EventOutcome::Canceled, None);
        }

        let (resolved, cast) = match self.apply(event) {
            Applied::Event(resolved) => (resolved, None),
            Applied::Cast(spell) => (
                ResolvedEvent::Cast {
                    spell: SpellInfo::of(spell.as_ref()),
                },
                Some(spell),
            ),
            Applied::Nothing => {
                self.flush_evictions();
                return (EventOutcome::Ignored, None);
            }
        };

        self.notify(resolved.clone());
        self.flush_evictions();
        (EventOutcome::Resolved(resolved), cast)
    }

    /// Returns false if a spell canceled the event.
    fn propagate(&mut self, event: &mut AuraEvent) -> bool {
        for id in self.spells.active_ids() {
            let Some(mut spell) = self.spells.check_out(id) else {
                continue;
            };
            let flow = spell.modify_event(self, event);
            let name = spell.name();
            self.check_in(id, spell);
            if flow.is_canceled() {
                trace!(spell = name, event = event.label(), "Event canceled");
                return false;
            }
        }
        true
    }

    fn apply(&mut self, event: AuraEvent) -> Applied {
        match event {
            AuraEvent::Damage { amount } => {
                let value = self.magic.value();
                self.magic.set_value(value - amount);
                Applied::Event(ResolvedEvent::Damage { amount })
            }
            AuraEvent::Heal { amount } => {
                let value = self.magic.value();
                self.magic.set_value(value + amount);
                Applied::Event(ResolvedEvent::Heal { amount })
            }
            AuraEvent::Cast { spell } => Applied::Cast(spell),
            AuraEvent::AddSpell { mut spell } => {
                let id = self.spells.insert_checked_out(spell.as_ref());
                debug!(%id, spell = spell.name(), level = spell.level(), "Spell added");
                spell.start(self);
                let info = SpellInfo::of(spell.as_ref());
                self.check_in(id, spell);
                Applied::Event(ResolvedEvent::SpellAdded { id, info })
            }
            AuraEvent::RemoveSpell { id } => {
                let Some(info) = self.spells.info(id) else {
                    return Applied::Nothing;
                };
                match self.spells.take(id) {
                    Some(Taken::Spell(mut spell)) => spell.stop(self),
                    Some(Taken::Deferred) => {}
                    None => return Applied::Nothing,
                }
                debug!(%id, spell = info.name(), "Spell removed");
                Applied::Event(ResolvedEvent::SpellRemoved { id, info })
            }
            AuraEvent::Acceleration(acceleration) => {
                Applied::Event(ResolvedEvent::Acceleration(acceleration))
            }
        }
    }

    /// Deliver `event` to every listener. A nested call only queues it; the
    /// outermost call drains the queue.
    fn notify(&mut self, event: ResolvedEvent) {
        self.notifications.push_back(event);
        if self.notifying {
            trace!(queued = self.notifications.len(), "Listeners busy, event queued");
            return;
        }
        self.notifying = true;
        while let Some(event) = self.notifications.pop_front() {
            self.notify_listeners(&event);
        }
        self.notifying = false;
    }

    fn notify_listeners(&mut self, event: &ResolvedEvent) {
        let ids: Vec<ListenerId> = self
            .listeners
            .iter()
            .filter(|slot| slot.listener.is_some() && !slot.removed)
            .map(|slot| slot.id)
            .collect();

        for id in ids {
            let Some(mut listener) = self
                .listeners
                .iter_mut()
                .find(|slot| slot.id == id && !slot.removed)
                .and_then(|slot| slot.listener.take())
            else {
                continue;
            };
            listener.on_event(self, event);
            if let Some(index) = self.listeners.iter().position(|slot| slot.id == id) {
                if self.listeners[index].removed {
                    self.listeners.remove(index);
                } else {
                    self.listeners[index].listener = Some(listener);
                }
            }
        }
    }

    /// Put a spell back after one of its hooks ran.
    fn check_in(&mut self, id: SpellId, spell: Box<dyn Spell>) {
        let spent = spell.is_spent();
        match self.spells.check_in(id, spell) {
            CheckIn::Stored => {
                if spent && self.spells.set_retiring(id) {
                    debug!(%id, "Spell spent");
                    self.pending_evictions.push(id);
                }
            }
            CheckIn::Released(mut spell) => {
                debug!(%id, spell = spell.name(), "Stopping spell removed during its own hook");
                spell.stop(self);
            }
        }
    }

    fn evict(&mut self, id: SpellId) {
        if self.process_event(AuraEvent::remove_spell(id)).is_canceled() {
            debug!(%id, "Eviction canceled, retrying on next update");
        }
    }

    fn flush_evictions(&mut self) {
        while !self.pending_evictions.is_empty() {
            for id in std::mem::take(&mut self.pending_evictions) {
                self.evict(id);
            }
        }
    }
}
