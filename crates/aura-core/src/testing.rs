//! Test doubles shared by the unit tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::aura::Aura;
use crate::caster::{CastType, Caster};
use crate::events::{AuraEvent, EventFlow, ResolvedEvent};
use crate::listener::EventListener;
use crate::spell::{Spell, SpellCore, SpellKind};
use crate::tags::TagSet;

/// Install a fmt subscriber honoring `RUST_LOG`. Safe to call from every test.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Listener keeping every resolved event.
#[derive(Debug, Default)]
pub(crate) struct Recorder {
    events: Vec<ResolvedEvent>,
}

impl Recorder {
    pub(crate) fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::default()))
    }

    pub(crate) fn events(&self) -> &[ResolvedEvent] {
        &self.events
    }

    pub(crate) fn labels(&self) -> Vec<&'static str> {
        self.events.iter().map(ResolvedEvent::label).collect()
    }

    pub(crate) fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventListener for Recorder {
    fn on_event(&mut self, _aura: &mut Aura, event: &ResolvedEvent) {
        self.events.push(event.clone());
    }
}

/// Cancels damage and heals, never expires.
#[derive(Debug)]
pub(crate) struct CancelingSpell {
    core: SpellCore,
}

impl CancelingSpell {
    pub(crate) fn damage_and_heal() -> Self {
        Self {
            core: SpellCore::new(TagSet::default()),
        }
    }
}

impl Spell for CancelingSpell {
    fn kind(&self) -> SpellKind {
        SpellKind::Custom("Canceling")
    }

    fn core(&self) -> &SpellCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SpellCore {
        &mut self.core
    }

    fn update(&mut self, _aura: &mut Aura, _dt: f64) -> bool {
        false
    }

    fn modify_event(&mut self, _aura: &mut Aura, event: &mut AuraEvent) -> EventFlow {
        EventFlow::cancel_if(matches!(event, AuraEvent::Damage { .. } | AuraEvent::Heal { .. }))
    }
}

/// Records the events it sees and optionally cancels one kind of them.
#[derive(Debug)]
pub(crate) struct ScriptedSpell {
    core: SpellCore,
    seen: Rc<RefCell<Vec<&'static str>>>,
    cancels: Option<&'static str>,
    magic: Option<Rc<RefCell<Vec<f64>>>>,
}

impl ScriptedSpell {
    pub(crate) fn new(seen: Rc<RefCell<Vec<&'static str>>>) -> Self {
        Self {
            core: SpellCore::new(TagSet::default()),
            seen,
            cancels: None,
            magic: None,
        }
    }

    pub(crate) fn shared_log() -> Rc<RefCell<Vec<&'static str>>> {
        Rc::default()
    }

    pub(crate) fn shared_magic() -> Rc<RefCell<Vec<f64>>> {
        Rc::default()
    }

    /// Cancel every event with this label.
    pub(crate) fn canceling(mut self, label: &'static str) -> Self {
        self.cancels = Some(label);
        self
    }

    /// Record the aura's magic on every update.
    pub(crate) fn observing_magic(mut self, magic: Rc<RefCell<Vec<f64>>>) -> Self {
        self.magic = Some(magic);
        self
    }
}

impl Spell for ScriptedSpell {
    fn kind(&self) -> SpellKind {
        SpellKind::Custom("Scripted")
    }

    fn core(&self) -> &SpellCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SpellCore {
        &mut self.core
    }

    fn update(&mut self, aura: &mut Aura, _dt: f64) -> bool {
        if let Some(magic) = &self.magic {
            magic.borrow_mut().push(aura.magic().value());
        }
        false
    }

    fn modify_event(&mut self, _aura: &mut Aura, event: &mut AuraEvent) -> EventFlow {
        self.seen.borrow_mut().push(event.label());
        EventFlow::cancel_if(self.cancels == Some(event.label()))
    }
}

/// Removes itself on its first update and counts how often it was stopped.
#[derive(Debug)]
pub(crate) struct RemovingSpell {
    core: SpellCore,
    stops: Rc<Cell<u32>>,
}

impl RemovingSpell {
    pub(crate) fn new(stops: Rc<Cell<u32>>) -> Self {
        Self {
            core: SpellCore::new(TagSet::default()),
            stops,
        }
    }

    pub(crate) fn shared_counter() -> Rc<Cell<u32>> {
        Rc::default()
    }
}

impl Spell for RemovingSpell {
    fn kind(&self) -> SpellKind {
        SpellKind::Custom("Removing")
    }

    fn core(&self) -> &SpellCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SpellCore {
        &mut self.core
    }

    fn update(&mut self, aura: &mut Aura, _dt: f64) -> bool {
        for id in aura.spells().get_by_kind(self.kind()) {
            aura.remove_spell(id);
        }
        false
    }

    fn stop(&mut self, _aura: &mut Aura) {
        self.stops.set(self.stops.get() + 1);
    }
}

/// Caster remembering what it was asked to deliver.
#[derive(Debug, Default)]
pub(crate) struct TrackingCaster {
    casts: RefCell<Vec<(SpellKind, CastType)>>,
}

impl TrackingCaster {
    pub(crate) fn shared() -> Rc<Self> {
        Rc::default()
    }

    pub(crate) fn casts(&self) -> Vec<(SpellKind, CastType)> {
        self.casts.borrow().clone()
    }
}

impl Caster for TrackingCaster {
    fn cast_spell(&self, spell: Box<dyn Spell>, cast_type: CastType) {
        self.casts.borrow_mut().push((spell.kind(), cast_type));
    }
}
