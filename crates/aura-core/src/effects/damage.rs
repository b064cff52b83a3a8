//! Damaging spells.

use crate::aura::Aura;
use crate::events::{AuraEvent, EventFlow};
use crate::spell::{Spell, SpellCore, SpellKind};
use crate::tags::{Tag, TagSet};
use crate::values::Duration;

// ============================================================================
// Ignite
// ============================================================================

/// Burns magic at a fixed rate for a duration.
///
/// Level scaling: damage per second.
#[derive(Debug, Clone)]
pub struct IgniteSpell {
    core: SpellCore,
    base_damage_per_second: f64,
    damage_per_second: f64,
    duration: Duration,
}

impl IgniteSpell {
    const TAGS: TagSet = TagSet::of(&[Tag::Debuff, Tag::Fire]);

    /// Create a level 1 ignite.
    #[must_use]
    pub fn new(damage_per_second: f64, duration: f64) -> Self {
        Self {
            core: SpellCore::new(Self::TAGS),
            base_damage_per_second: damage_per_second,
            damage_per_second,
            duration: Duration::new(duration),
        }
    }

    /// Damage per second at the current level.
    #[must_use]
    pub const fn damage_per_second(&self) -> f64 {
        self.damage_per_second
    }

    /// Remaining burn time.
    #[must_use]
    pub const fn duration(&self) -> &Duration {
        &self.duration
    }
}

impl Spell for IgniteSpell {
    spell_identity!(SpellKind::Ignite);

    fn on_level_changed(&mut self, level: u32) {
        self.damage_per_second = self
            .core
            .scaler()
            .scale_value(self.base_damage_per_second, level);
    }

    fn update(&mut self, aura: &mut Aura, dt: f64) -> bool {
        let damage = self.damage_per_second * dt.min(self.duration.remaining());
        aura.process_event(AuraEvent::damage(damage));
        self.duration.update(dt)
    }
}

// ============================================================================
// Slice / Rock
// ============================================================================

/// A single air hit on the next update.
///
/// Level scaling: damage.
#[derive(Debug, Clone)]
pub struct SliceSpell {
    core: SpellCore,
    base_damage: f64,
    damage: f64,
}

impl SliceSpell {
    /// Create a level 1 slice.
    #[must_use]
    pub fn new(damage: f64) -> Self {
        Self {
            core: SpellCore::new(TagSet::of(&[Tag::Debuff, Tag::Air])),
            base_damage: damage,
            damage,
        }
    }

    /// Damage at the current level.
    #[must_use]
    pub const fn damage(&self) -> f64 {
        self.damage
    }
}

impl Spell for SliceSpell {
    spell_identity!(SpellKind::Slice);

    fn on_level_changed(&mut self, level: u32) {
        self.damage = self.core.scaler().scale_value(self.base_damage, level);
    }

    fn update(&mut self, aura: &mut Aura, _dt: f64) -> bool {
        aura.process_event(AuraEvent::damage(self.damage));
        true
    }
}

/// A single earth hit on the next update.
///
/// Level scaling: damage.
#[derive(Debug, Clone)]
pub struct RockSpell {
    core: SpellCore,
    base_damage: f64,
    damage: f64,
}

impl RockSpell {
    /// Create a level 1 rock.
    #[must_use]
    pub fn new(damage: f64) -> Self {
        Self {
            core: SpellCore::new(TagSet::of(&[Tag::Debuff, Tag::Earth])),
            base_damage: damage,
            damage,
        }
    }

    /// Damage at the current level.
    #[must_use]
    pub const fn damage(&self) -> f64 {
        self.damage
    }
}

impl Spell for RockSpell {
    spell_identity!(SpellKind::Rock);

    fn on_level_changed(&mut self, level: u32) {
        self.damage = self.core.scaler().scale_value(self.base_damage, level);
    }

    fn update(&mut self, aura: &mut Aura, _dt: f64) -> bool {
        aura.process_event(AuraEvent::damage(self.damage));
        true
    }
}

// ============================================================================
// Weight
// ============================================================================

/// Damages the owner over time while it keeps moving.
///
/// Movement is sampled from acceleration events: the owner counts as moving
/// while the last reported magnitude exceeds the threshold.
#[derive(Debug, Clone)]
pub struct WeightSpell {
    core: SpellCore,
    acceleration_threshold: f64,
    damage_per_second: f64,
    duration: Duration,
    moving: bool,
}

impl WeightSpell {
    /// Create a weight spell.
    #[must_use]
    pub fn new(acceleration_threshold: f64, damage_per_second: f64, duration: f64) -> Self {
        Self {
            core: SpellCore::new(TagSet::of(&[Tag::Debuff, Tag::Gravity])),
            acceleration_threshold,
            damage_per_second,
            duration: Duration::new(duration),
            moving: false,
        }
    }

    /// Whether the last acceleration reading was above the threshold.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        self.moving
    }

    /// Remaining time.
    #[must_use]
    pub const fn duration(&self) -> &Duration {
        &self.duration
    }
}

impl Spell for WeightSpell {
    spell_identity!(SpellKind::Weight);

    fn update(&mut self, aura: &mut Aura, dt: f64) -> bool {
        if self.moving {
            let damage = self.damage_per_second * dt.min(self.duration.remaining());
            aura.process_event(AuraEvent::damage(damage));
        }
        self.duration.update(dt)
    }

    fn modify_event(&mut self, _aura: &mut Aura, event: &mut AuraEvent) -> EventFlow {
        if let AuraEvent::Acceleration(acceleration) = event {
            self.moving = acceleration.magnitude() > self.acceleration_threshold;
        }
        EventFlow::Continue
    }
}
