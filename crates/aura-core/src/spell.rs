//! The spell interface.
//!
//! A spell is a status effect attached to an [`Aura`]. Every variant embeds a
//! [`SpellCore`] (tags, level and the scaling law it was built with) and
//! implements the hooks it needs:
//!
//! - `start` / `stop` install and remove reversible passive effects
//! - `update` advances the spell and reports when it should be evicted
//! - `modify_event` inspects, rewrites or cancels events while the spell is active
//! - `on_level_changed` re-derives level-dependent fields

use std::any::Any;
use std::fmt;

use crate::aura::Aura;
use crate::events::{AuraEvent, EventFlow};
use crate::scaling::SpellLevelScaler;
use crate::tags::TagSet;

// ============================================================================
// Kinds
// ============================================================================

/// Concrete variant of a spell, used for by-variant queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpellKind {
    /// Passive magic regeneration
    AmbientMagicRegen,
    /// Damage over time
    Ignite,
    /// Single air hit
    Slice,
    /// Single earth hit
    Rock,
    /// Single heal
    Heal,
    /// Direct magic regeneration over time
    Regen,
    /// Heal amplifier
    Charge,
    /// Heal reducer
    Shock,
    /// Cast-delay reduction
    Haste,
    /// Cast-delay increase
    Freeze,
    /// Blocks casting
    Pause,
    /// Removes pauses
    Unpause,
    /// Cleanses water and ice debuffs
    Warmth,
    /// Blocks incoming debuffs
    Absorb,
    /// Strips shields, amplifies damage
    Vulnerable,
    /// Damage reduction
    EarthShield,
    /// Damage reduction with a freeze burst
    IceShield,
    /// Lowers the level of cast spells
    Weaken,
    /// Presentation timer
    Flash,
    /// Presentation timer
    Shadow,
    /// Damages while moving
    Weight,
    /// A spell defined outside this crate
    Custom(&'static str),
}

impl SpellKind {
    /// Display name, e.g. `"Ignite"`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AmbientMagicRegen => "AmbientMagicRegen",
            Self::Ignite => "Ignite",
            Self::Slice => "Slice",
            Self::Rock => "Rock",
            Self::Heal => "Heal",
            Self::Regen => "Regen",
            Self::Charge => "Charge",
            Self::Shock => "Shock",
            Self::Haste => "Haste",
            Self::Freeze => "Freeze",
            Self::Pause => "Pause",
            Self::Unpause => "Unpause",
            Self::Warmth => "Warmth",
            Self::Absorb => "Absorb",
            Self::Vulnerable => "Vulnerable",
            Self::EarthShield => "EarthShield",
            Self::IceShield => "IceShield",
            Self::Weaken => "Weaken",
            Self::Flash => "Flash",
            Self::Shadow => "Shadow",
            Self::Weight => "Weight",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for SpellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Shared state
// ============================================================================

/// State every spell carries.
#[derive(Debug, Clone, PartialEq)]
pub struct SpellCore {
    tags: TagSet,
    level: u32,
    scaler: SpellLevelScaler,
}

impl SpellCore {
    /// Level 1 core with the default scaler.
    #[must_use]
    pub fn new(tags: TagSet) -> Self {
        Self {
            tags,
            level: 1,
            scaler: SpellLevelScaler::default(),
        }
    }

    /// Tags of the spell.
    #[must_use]
    pub const fn tags(&self) -> TagSet {
        self.tags
    }

    /// Current level, at least 1.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Scaling law used to derive level-dependent fields.
    #[must_use]
    pub const fn scaler(&self) -> &SpellLevelScaler {
        &self.scaler
    }
}

/// Snapshot of a spell's identity, safe to hand to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpellInfo {
    /// Concrete variant
    pub kind: SpellKind,
    /// Tags at snapshot time
    pub tags: TagSet,
    /// Level at snapshot time
    pub level: u32,
}

impl SpellInfo {
    /// Snapshot a spell.
    #[must_use]
    pub fn of(spell: &dyn Spell) -> Self {
        Self {
            kind: spell.kind(),
            tags: spell.tags(),
            level: spell.level(),
        }
    }

    /// Display name of the variant.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.kind.name()
    }
}

// ============================================================================
// Spell trait
// ============================================================================

/// Upcast helper so `dyn Spell` can be downcast to its concrete type.
pub trait AsAny: Any {
    /// `self` as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
    /// `self` as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A status effect attached to an aura.
pub trait Spell: AsAny + fmt::Debug {
    /// Concrete variant.
    fn kind(&self) -> SpellKind;

    /// Shared state.
    fn core(&self) -> &SpellCore;

    /// Mutable shared state.
    fn core_mut(&mut self) -> &mut SpellCore;

    /// Display name, derived from the variant.
    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Tags of the spell.
    fn tags(&self) -> TagSet {
        self.core().tags
    }

    /// Current level.
    fn level(&self) -> u32 {
        self.core().level
    }

    /// Change the level (clamped to at least 1) and re-derive level-dependent fields.
    fn set_level(&mut self, level: u32) {
        let level = level.max(1);
        self.core_mut().level = level;
        self.on_level_changed(level);
    }

    /// Replace the scaling law and re-derive level-dependent fields.
    fn set_scaler(&mut self, scaler: SpellLevelScaler) {
        self.core_mut().scaler = scaler;
        let level = self.level();
        self.on_level_changed(level);
    }

    /// Re-derive level-dependent fields from their base values.
    fn on_level_changed(&mut self, _level: u32) {}

    /// Install passive effects. Called once, right after registration.
    fn start(&mut self, _aura: &mut Aura) {}

    /// Push level-dependent values into the passive effects installed by
    /// `start`. Called by [`Aura::set_spell_level`] after the level changed.
    fn refresh(&mut self, _aura: &mut Aura) {}

    /// Advance by `dt` seconds. Returns true on the tick the spell should be evicted.
    fn update(&mut self, aura: &mut Aura, dt: f64) -> bool;

    /// Remove passive effects. Called once, right after unregistration.
    fn stop(&mut self, _aura: &mut Aura) {}

    /// Inspect or rewrite an event before it is applied.
    fn modify_event(&mut self, _aura: &mut Aura, _event: &mut AuraEvent) -> EventFlow {
        EventFlow::Continue
    }

    /// Whether the spell has used itself up while handling events. A spent spell is
    /// evicted before the event that exhausted it finishes processing.
    fn is_spent(&self) -> bool {
        false
    }
}

impl dyn Spell {
    /// Check the concrete type.
    #[must_use]
    pub fn is<T: Spell>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Borrow as the concrete type.
    #[must_use]
    pub fn downcast_ref<T: Spell>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Mutably borrow as the concrete type.
    pub fn downcast_mut<T: Spell>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

/// Builder helpers available on every concrete spell.
pub trait SpellExt: Spell + Sized {
    /// Set the level, re-deriving level-dependent fields.
    #[must_use]
    fn at_level(mut self, level: u32) -> Self {
        self.set_level(level);
        self
    }

    /// Use a specific scaling law.
    #[must_use]
    fn scaled_by(mut self, scaler: SpellLevelScaler) -> Self {
        self.set_scaler(scaler);
        self
    }

    /// Box as a trait object.
    #[must_use]
    fn boxed(self) -> Box<dyn Spell> {
        Box::new(self)
    }
}

impl<T: Spell> SpellExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{IgniteSpell, SliceSpell};
    use crate::tags::Tag;

    #[test]
    fn test_name_derived_from_kind() {
        let spell = IgniteSpell::new(10.0, 5.0);
        assert_eq!(spell.name(), "Ignite");
        assert_eq!(SpellKind::Custom("Meteor").to_string(), "Meteor");
    }

    #[test]
    fn test_level_clamped_to_one() {
        let mut spell = SliceSpell::new(10.0);
        spell.set_level(0);
        assert_eq!(spell.level(), 1);
        assert_eq!(spell.damage(), 10.0);
    }

    #[test]
    fn test_level_rederives_fields() {
        let spell = SliceSpell::new(100.0).at_level(3);
        assert_eq!(spell.damage(), 150.0);

        let spell = spell.scaled_by(SpellLevelScaler::new(0.5, 0.0));
        assert_eq!(spell.level(), 3);
        assert_eq!(spell.damage(), 200.0);
    }

    #[test]
    fn test_downcast() {
        let spell = IgniteSpell::new(10.0, 5.0).boxed();
        assert!(spell.is::<IgniteSpell>());
        assert!(spell.downcast_ref::<SliceSpell>().is_none());
        assert_eq!(spell.downcast_ref::<IgniteSpell>().map(IgniteSpell::damage_per_second), Some(10.0));
    }

    #[test]
    fn test_info_snapshot() {
        let spell = IgniteSpell::new(10.0, 5.0).at_level(2);
        let info = SpellInfo::of(&spell);
        assert_eq!(info.kind, SpellKind::Ignite);
        assert_eq!(info.level, 2);
        assert!(info.tags.contains_all(TagSet::of(&[Tag::Debuff, Tag::Fire])));
    }
}
