//! Registry of the spells attached to an aura.
//!
//! Spells live in an append-ordered arena keyed by [`SpellId`]. While a spell's
//! own hook runs it is checked out of its slot; the slot keeps its position
//! and a snapshot of its identity so queries still see it, and removing it
//! only marks the slot until the hook returns.

use aura_common::SpellId;

use crate::spell::{Spell, SpellInfo, SpellKind};
use crate::tags::{Tag, TagSet};

#[derive(Debug)]
enum SlotState {
    Idle(Box<dyn Spell>),
    Busy { released: bool },
}

#[derive(Debug)]
struct Slot {
    id: SpellId,
    info: SpellInfo,
    state: SlotState,
    retiring: bool,
}

impl Slot {
    fn is_live(&self) -> bool {
        !matches!(self.state, SlotState::Busy { released: true })
    }

    fn info(&self) -> SpellInfo {
        match &self.state {
            SlotState::Idle(spell) => SpellInfo::of(spell.as_ref()),
            SlotState::Busy { .. } => self.info,
        }
    }
}

/// Result of unregistering a spell.
#[derive(Debug)]
pub(crate) enum Taken {
    /// The spell was idle and is handed back for `stop`
    Spell(Box<dyn Spell>),
    /// The spell is running a hook; it is handed back when checked in
    Deferred,
}

/// Result of returning a checked-out spell.
#[derive(Debug)]
pub(crate) enum CheckIn {
    /// Back in its slot
    Stored,
    /// Removed while checked out; the caller runs `stop`
    Released(Box<dyn Spell>),
}

/// The spells attached to an aura, in registration order.
///
/// Queries return fresh vectors of handles, never live views.
#[derive(Debug, Default)]
pub struct Spells {
    slots: Vec<Slot>,
}

impl Spells {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered spells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live().count()
    }

    /// Whether no spell is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a spell is registered.
    #[must_use]
    pub fn contains(&self, id: SpellId) -> bool {
        self.live().any(|slot| slot.id == id)
    }

    /// Handles of every registered spell.
    #[must_use]
    pub fn ids(&self) -> Vec<SpellId> {
        self.live().map(|slot| slot.id).collect()
    }

    /// Identity snapshot of a registered spell.
    #[must_use]
    pub fn info(&self, id: SpellId) -> Option<SpellInfo> {
        self.live().find(|slot| slot.id == id).map(Slot::info)
    }

    /// Spells whose display name matches.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Vec<SpellId> {
        self.filter(|info| info.name() == name)
    }

    /// Spells carrying every listed tag.
    #[must_use]
    pub fn get_by_tag(&self, tags: &[Tag]) -> Vec<SpellId> {
        let wanted = TagSet::of(tags);
        self.filter(|info| info.tags.contains_all(wanted))
    }

    /// Spells of one variant.
    #[must_use]
    pub fn get_by_kind(&self, kind: SpellKind) -> Vec<SpellId> {
        self.filter(|info| info.kind == kind)
    }

    /// Borrow a spell. `None` if absent or currently running one of its own hooks.
    #[must_use]
    pub fn get(&self, id: SpellId) -> Option<&(dyn Spell + 'static)> {
        match &self.slot(id)?.state {
            SlotState::Idle(spell) => Some(spell.as_ref()),
            SlotState::Busy { .. } => None,
        }
    }

    /// Mutably borrow a spell. `None` if absent or currently running one of its own hooks.
    pub fn get_mut(&mut self, id: SpellId) -> Option<&mut (dyn Spell + 'static)> {
        match &mut self.slot_mut(id)?.state {
            SlotState::Idle(spell) => Some(spell.as_mut()),
            SlotState::Busy { .. } => None,
        }
    }

    /// Borrow a spell as its concrete type.
    #[must_use]
    pub fn get_as<T: Spell>(&self, id: SpellId) -> Option<&T> {
        self.get(id)?.downcast_ref::<T>()
    }

    /// Mutably borrow a spell as its concrete type.
    ///
    /// Level changes made here do not reach modifiers the spell already
    /// installed; use [`Aura::set_spell_level`](crate::aura::Aura::set_spell_level) for those.
    pub fn get_as_mut<T: Spell>(&mut self, id: SpellId) -> Option<&mut T> {
        self.get_mut(id)?.downcast_mut::<T>()
    }

    fn live(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter().filter(|slot| slot.is_live())
    }

    fn filter(&self, predicate: impl Fn(&SpellInfo) -> bool) -> Vec<SpellId> {
        self.live()
            .filter(|slot| predicate(&slot.info()))
            .map(|slot| slot.id)
            .collect()
    }

    fn slot(&self, id: SpellId) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.id == id)
    }

    fn slot_mut(&mut self, id: SpellId) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|slot| slot.id == id)
    }

    // ------------------------------------------------------------------------
    // Pipeline internals
    // ------------------------------------------------------------------------

    /// Append a new slot holding `spell`, already checked out so `start` can run.
    pub(crate) fn insert_checked_out(&mut self, spell: &dyn Spell) -> SpellId {
        let id = SpellId::new();
        self.slots.push(Slot {
            id,
            info: SpellInfo::of(spell),
            state: SlotState::Busy { released: false },
            retiring: false,
        });
        id
    }

    /// Spells that may intercept events or be updated right now, in order.
    pub(crate) fn active_ids(&self) -> Vec<SpellId> {
        self.slots
            .iter()
            .filter(|slot| !slot.retiring && matches!(slot.state, SlotState::Idle(_)))
            .map(|slot| slot.id)
            .collect()
    }

    /// Spells whose `update` already reported completion and still await eviction.
    pub(crate) fn retiring_ids(&self) -> Vec<SpellId> {
        self.live()
            .filter(|slot| slot.retiring)
            .map(|slot| slot.id)
            .collect()
    }

    /// Take an idle, non-retiring spell out of its slot.
    pub(crate) fn check_out(&mut self, id: SpellId) -> Option<Box<dyn Spell>> {
        let slot = self.slot_mut(id)?;
        if slot.retiring || !matches!(slot.state, SlotState::Idle(_)) {
            return None;
        }
        match std::mem::replace(&mut slot.state, SlotState::Busy { released: false }) {
            SlotState::Idle(spell) => {
                slot.info = SpellInfo::of(spell.as_ref());
                Some(spell)
            }
            SlotState::Busy { .. } => None,
        }
    }

    /// Return a checked-out spell.
    pub(crate) fn check_in(&mut self, id: SpellId, spell: Box<dyn Spell>) -> CheckIn {
        let Some(index) = self.slots.iter().position(|slot| slot.id == id) else {
            return CheckIn::Released(spell);
        };
        if matches!(self.slots[index].state, SlotState::Busy { released: true }) {
            self.slots.remove(index);
            return CheckIn::Released(spell);
        }
        let slot = &mut self.slots[index];
        slot.info = SpellInfo::of(spell.as_ref());
        slot.state = SlotState::Idle(spell);
        CheckIn::Stored
    }

    /// Unregister a spell.
    pub(crate) fn take(&mut self, id: SpellId) -> Option<Taken> {
        let index = self
            .slots
            .iter()
            .position(|slot| slot.id == id && slot.is_live())?;
        if let SlotState::Busy { released } = &mut self.slots[index].state {
            *released = true;
            return Some(Taken::Deferred);
        }
        match self.slots.remove(index).state {
            SlotState::Idle(spell) => Some(Taken::Spell(spell)),
            SlotState::Busy { .. } => None,
        }
    }

    /// Flag a spell as finished. Returns true if it was not flagged already.
    pub(crate) fn set_retiring(&mut self, id: SpellId) -> bool {
        match self.slot_mut(id) {
            Some(slot) if !slot.retiring => {
                slot.retiring = true;
                true
            }
            _ => false,
        }
    }

    /// Whether a spell already reported completion.
    #[must_use]
    pub fn is_retiring(&self, id: SpellId) -> bool {
        self.slot(id).is_some_and(|slot| slot.retiring)
    }
}
