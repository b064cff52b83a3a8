//! Spells acting on casting: cast delay, cast blocking and cast strength.

use super::unit;
use crate::aura::Aura;
use crate::events::{AuraEvent, EventFlow};
use crate::spell::{Spell, SpellCore, SpellKind};
use crate::tags::{Tag, TagSet};
use crate::values::{Duration, ValueModifier};

// ============================================================================
// Cast delay modifiers
// ============================================================================

/// Copy a spell's modifier onto the registered one with the same ID.
fn sync_cast_delay(aura: &mut Aura, modifier: &ValueModifier) {
    let modifiers = aura.cast_delay_mut().modifiers_mut();
    modifiers.set_multiplier(modifier.id(), modifier.multiplier());
    modifiers.set_length(modifier.id(), modifier.duration().length());
}

/// Shortens the cast delay while active.
///
/// Level scaling: cast delay reduction, clamped to 100%.
#[derive(Debug, Clone)]
pub struct HasteSpell {
    core: SpellCore,
    base_reduction: f64,
    reduction: f64,
    duration: Duration,
    modifier: ValueModifier,
}

impl HasteSpell {
    /// Create a level 1 haste reducing the cast delay by `cast_delay_reduction` (clamped into `[0, 1]`).
    #[must_use]
    pub fn new(duration: f64, cast_delay_reduction: f64) -> Self {
        let reduction = unit(cast_delay_reduction);
        Self {
            core: SpellCore::new(TagSet::of(&[Tag::Buff, Tag::Air])),
            base_reduction: reduction,
            reduction,
            duration: Duration::new(duration),
            modifier: ValueModifier::new(1.0 - reduction, duration),
        }
    }

    /// Cast delay reduction at the current level.
    #[must_use]
    pub const fn cast_delay_reduction(&self) -> f64 {
        self.reduction
    }

    /// The modifier installed on the cast delay.
    #[must_use]
    pub const fn modifier(&self) -> &ValueModifier {
        &self.modifier
    }
}

impl Spell for HasteSpell {
    spell_identity!(SpellKind::Haste);

    fn on_level_changed(&mut self, level: u32) {
        self.reduction = unit(self.core.scaler().scale_value(self.base_reduction, level));
        self.modifier.set_multiplier(1.0 - self.reduction);
    }

    fn start(&mut self, aura: &mut Aura) {
        aura.cast_delay_mut().modifiers_mut().add(self.modifier.clone());
    }

    fn refresh(&mut self, aura: &mut Aura) {
        sync_cast_delay(aura, &self.modifier);
    }

    fn update(&mut self, _aura: &mut Aura, dt: f64) -> bool {
        self.duration.update(dt)
    }

    fn stop(&mut self, aura: &mut Aura) {
        aura.cast_delay_mut().modifiers_mut().remove(self.modifier.id());
    }
}

/// Lengthens the cast delay while active.
///
/// Level scaling: cast delay multiplier.
#[derive(Debug, Clone)]
pub struct FreezeSpell {
    core: SpellCore,
    base_multiplier: f64,
    multiplier: f64,
    duration: Duration,
    modifier: ValueModifier,
}

impl FreezeSpell {
    /// Create a level 1 freeze. Multipliers below 1 are raised to 1.
    #[must_use]
    pub fn new(duration: f64, cast_delay_multiplier: f64) -> Self {
        let multiplier = cast_delay_multiplier.max(1.0);
        Self {
            core: SpellCore::new(TagSet::of(&[Tag::Debuff, Tag::Ice])),
            base_multiplier: multiplier,
            multiplier,
            duration: Duration::new(duration),
            modifier: ValueModifier::new(multiplier, duration),
        }
    }

    /// Cast delay multiplier at the current level.
    #[must_use]
    pub const fn cast_delay_multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Remaining time.
    #[must_use]
    pub const fn duration(&self) -> &Duration {
        &self.duration
    }
}

impl Spell for FreezeSpell {
    spell_identity!(SpellKind::Freeze);

    fn on_level_changed(&mut self, level: u32) {
        self.multiplier = self.core.scaler().scale_value(self.base_multiplier, level);
        self.modifier.set_multiplier(self.multiplier);
    }

    fn start(&mut self, aura: &mut Aura) {
        aura.cast_delay_mut().modifiers_mut().add(self.modifier.clone());
    }

    fn refresh(&mut self, aura: &mut Aura) {
        sync_cast_delay(aura, &self.modifier);
    }

    fn update(&mut self, _aura: &mut Aura, dt: f64) -> bool {
        self.duration.update(dt)
    }

    fn stop(&mut self, aura: &mut Aura) {
        aura.cast_delay_mut().modifiers_mut().remove(self.modifier.id());
    }
}

// ============================================================================
// Pause / Unpause
// ============================================================================

/// Blocks every cast and multiplies the cast delay by its own duration.
///
/// A pause can only be cast from an aura that is not paused itself; once
/// attached it cancels every cast, including further pauses.
///
/// Level scaling: duration.
#[derive(Debug, Clone)]
pub struct PauseSpell {
    core: SpellCore,
    base_duration: f64,
    duration: Duration,
    modifier: ValueModifier,
}

impl PauseSpell {
    /// Create a level 1 pause.
    #[must_use]
    pub fn new(duration: f64) -> Self {
        Self {
            core: SpellCore::new(TagSet::of(&[Tag::Debuff, Tag::Time])),
            base_duration: duration,
            duration: Duration::new(duration),
            modifier: ValueModifier::new(duration, duration),
        }
    }

    /// Remaining pause.
    #[must_use]
    pub const fn duration(&self) -> &Duration {
        &self.duration
    }
}

impl Spell for PauseSpell {
    spell_identity!(SpellKind::Pause);

    fn on_level_changed(&mut self, level: u32) {
        let length = self.core.scaler().scale_value(self.base_duration, level);
        self.duration.set_length(length);
        self.modifier.duration_mut().set_length(length);
    }

    fn start(&mut self, aura: &mut Aura) {
        aura.cast_delay_mut().modifiers_mut().add(self.modifier.clone());
    }

    fn refresh(&mut self, aura: &mut Aura) {
        sync_cast_delay(aura, &self.modifier);
    }

    fn update(&mut self, _aura: &mut Aura, dt: f64) -> bool {
        self.duration.update(dt)
    }

    fn stop(&mut self, aura: &mut Aura) {
        aura.cast_delay_mut().modifiers_mut().remove(self.modifier.id());
    }

    fn modify_event(&mut self, _aura: &mut Aura, event: &mut AuraEvent) -> EventFlow {
        EventFlow::cancel_if(matches!(event, AuraEvent::Cast { .. }))
    }
}

/// Removes every pause on the next update.
#[derive(Debug, Clone)]
pub struct UnpauseSpell {
    core: SpellCore,
}

impl UnpauseSpell {
    /// Create an unpause.
    #[must_use]
    pub fn new() -> Self {
        Self {
            core: SpellCore::new(TagSet::of(&[Tag::Buff, Tag::Time])),
        }
    }
}

impl Default for UnpauseSpell {
    fn default() -> Self {
        Self::new()
    }
}

impl Spell for UnpauseSpell {
    spell_identity!(SpellKind::Unpause);

    fn update(&mut self, aura: &mut Aura, _dt: f64) -> bool {
        for id in aura.spells().get_by_kind(SpellKind::Pause) {
            aura.remove_spell(id);
        }
        true
    }
}

// ============================================================================
// Weaken
// ============================================================================

/// Lowers the level of every spell cast from the aura.
///
/// Level scaling: level reduction, as a percentage.
#[derive(Debug, Clone)]
pub struct WeakenSpell {
    core: SpellCore,
    base_reduction: f64,
    reduction: f64,
    duration: Duration,
}

impl WeakenSpell {
    /// Create a level 1 weaken. The reduction is clamped into `[0, 1]`.
    #[must_use]
    pub fn new(reduction: f64, duration: f64) -> Self {
        let reduction = unit(reduction);
        Self {
            core: SpellCore::new(TagSet::of(&[Tag::Debuff])),
            base_reduction: reduction,
            reduction,
            duration: Duration::new(duration),
        }
    }

    /// Fraction of levels removed from cast spells.
    #[must_use]
    pub const fn reduction(&self) -> f64 {
        self.reduction
    }
}

impl Spell for WeakenSpell {
    spell_identity!(SpellKind::Weaken);

    fn on_level_changed(&mut self, level: u32) {
        self.reduction = self
            .core
            .scaler()
            .scale_percentage(self.base_reduction, level);
    }

    fn update(&mut self, _aura: &mut Aura, dt: f64) -> bool {
        self.duration.update(dt)
    }

    fn modify_event(&mut self, _aura: &mut Aura, event: &mut AuraEvent) -> EventFlow {
        if let AuraEvent::Cast { spell } = event {
            let weakened = (f64::from(spell.level()) * (1.0 - self.reduction)).floor();
            spell.set_level(weakened as u32);
        }
        EventFlow::Continue
    }
}
