//! Healing and heal-modifying spells.

use super::unit;
use crate::aura::Aura;
use crate::events::{AuraEvent, EventFlow};
use crate::spell::{Spell, SpellCore, SpellKind};
use crate::tags::{Tag, TagSet};
use crate::values::Duration;

/// Passive regeneration that never expires.
///
/// Level scaling: amount per second.
#[derive(Debug, Clone)]
pub struct AmbientMagicRegenSpell {
    core: SpellCore,
    base_amount_per_second: f64,
    amount_per_second: f64,
}

impl AmbientMagicRegenSpell {
    /// Create a level 1 regeneration.
    #[must_use]
    pub fn new(amount_per_second: f64) -> Self {
        Self {
            core: SpellCore::new(TagSet::of(&[Tag::Buff])),
            base_amount_per_second: amount_per_second,
            amount_per_second,
        }
    }

    /// Magic restored per second at the current level.
    #[must_use]
    pub const fn amount_per_second(&self) -> f64 {
        self.amount_per_second
    }
}

impl Spell for AmbientMagicRegenSpell {
    spell_identity!(SpellKind::AmbientMagicRegen);

    fn on_level_changed(&mut self, level: u32) {
        self.amount_per_second = self
            .core
            .scaler()
            .scale_value(self.base_amount_per_second, level);
    }

    fn update(&mut self, aura: &mut Aura, dt: f64) -> bool {
        aura.process_event(AuraEvent::heal(self.amount_per_second * dt));
        false
    }
}

/// A single heal on the next update.
#[derive(Debug, Clone)]
pub struct HealSpell {
    core: SpellCore,
    base_healing: f64,
    healing: f64,
}

impl HealSpell {
    /// Create a level 1 heal.
    #[must_use]
    pub fn new(healing: f64) -> Self {
        Self {
            core: SpellCore::new(TagSet::of(&[Tag::Buff, Tag::Light])),
            base_healing: healing,
            healing,
        }
    }

    /// Healing at the current level.
    #[must_use]
    pub const fn healing(&self) -> f64 {
        self.healing
    }
}

impl Spell for HealSpell {
    spell_identity!(SpellKind::Heal);

    fn on_level_changed(&mut self, level: u32) {
        self.healing = self.core.scaler().scale_value(self.base_healing, level);
    }

    fn update(&mut self, aura: &mut Aura, _dt: f64) -> bool {
        aura.process_event(AuraEvent::heal(self.healing));
        true
    }
}

/// Restores magic directly over a duration, bypassing heal modifiers.
///
/// Level scaling: regeneration rate.
#[derive(Debug, Clone)]
pub struct RegenSpell {
    core: SpellCore,
    base_rate: f64,
    rate: f64,
    duration: Duration,
}

impl RegenSpell {
    /// Create a level 1 regeneration of `rate` magic per second.
    #[must_use]
    pub fn new(rate: f64, duration: f64) -> Self {
        Self {
            core: SpellCore::new(TagSet::of(&[Tag::Buff, Tag::Water])),
            base_rate: rate,
            rate,
            duration: Duration::new(duration),
        }
    }

    /// Magic per second at the current level.
    #[must_use]
    pub const fn rate(&self) -> f64 {
        self.rate
    }

    /// Remaining time.
    #[must_use]
    pub const fn duration(&self) -> &Duration {
        &self.duration
    }
}

impl Spell for RegenSpell {
    spell_identity!(SpellKind::Regen);

    fn on_level_changed(&mut self, level: u32) {
        self.rate = self.core.scaler().scale_value(self.base_rate, level);
    }

    fn update(&mut self, aura: &mut Aura, dt: f64) -> bool {
        let amount = self.rate * dt.min(self.duration.remaining());
        let magic = aura.magic().value();
        aura.magic_mut().set_value(magic + amount);
        self.duration.update(dt)
    }
}

/// Amplifies incoming heals.
///
/// Level scaling: healing multiplier.
#[derive(Debug, Clone)]
pub struct ChargeSpell {
    core: SpellCore,
    base_multiplier: f64,
    multiplier: f64,
    duration: Duration,
}

impl ChargeSpell {
    /// Create a level 1 charge.
    #[must_use]
    pub fn new(healing_multiplier: f64, duration: f64) -> Self {
        Self {
            core: SpellCore::new(TagSet::of(&[Tag::Buff, Tag::Lightning])),
            base_multiplier: healing_multiplier,
            multiplier: healing_multiplier,
            duration: Duration::new(duration),
        }
    }

    /// Healing multiplier at the current level.
    #[must_use]
    pub const fn healing_multiplier(&self) -> f64 {
        self.multiplier
    }
}

impl Spell for ChargeSpell {
    spell_identity!(SpellKind::Charge);

    fn on_level_changed(&mut self, level: u32) {
        self.multiplier = self.core.scaler().scale_value(self.base_multiplier, level);
    }

    fn update(&mut self, _aura: &mut Aura, dt: f64) -> bool {
        self.duration.update(dt)
    }

    fn modify_event(&mut self, _aura: &mut Aura, event: &mut AuraEvent) -> EventFlow {
        if let AuraEvent::Heal { amount } = event {
            *amount *= self.multiplier;
        }
        EventFlow::Continue
    }
}

/// Weakens incoming heals.
///
/// Level scaling: heal reduction, clamped to 100%.
#[derive(Debug, Clone)]
pub struct ShockSpell {
    core: SpellCore,
    base_reduction: f64,
    reduction: f64,
    duration: Duration,
}

impl ShockSpell {
    /// Create a level 1 shock. The reduction is clamped into `[0, 1]`.
    #[must_use]
    pub fn new(heal_reduction: f64, duration: f64) -> Self {
        let reduction = unit(heal_reduction);
        Self {
            core: SpellCore::new(TagSet::of(&[Tag::Debuff, Tag::Lightning])),
            base_reduction: reduction,
            reduction,
            duration: Duration::new(duration),
        }
    }

    /// Fraction of each heal removed at the current level.
    #[must_use]
    pub const fn heal_reduction(&self) -> f64 {
        self.reduction
    }
}

impl Spell for ShockSpell {
    spell_identity!(SpellKind::Shock);

    fn on_level_changed(&mut self, level: u32) {
        self.reduction = unit(self.core.scaler().scale_value(self.base_reduction, level));
    }

    fn update(&mut self, _aura: &mut Aura, dt: f64) -> bool {
        self.duration.update(dt)
    }

    fn modify_event(&mut self, _aura: &mut Aura, event: &mut AuraEvent) -> EventFlow {
        if let AuraEvent::Heal { amount } = event {
            *amount *= 1.0 - self.reduction;
        }
        EventFlow::Continue
    }
}
