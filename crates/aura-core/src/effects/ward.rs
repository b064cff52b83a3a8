//! Protective spells and their counters.

use std::rc::Rc;

use tracing::debug;

use super::{unit, FreezeSpell};
use crate::aura::Aura;
use crate::caster::{CastType, Caster};
use crate::events::{AuraEvent, EventFlow};
use crate::scaling::SpellLevelScaler;
use crate::spell::{Spell, SpellCore, SpellKind};
use crate::tags::{Tag, TagSet};
use crate::values::{Counter, Duration};

// ============================================================================
// Barrier
// ============================================================================

/// Damage reduction for a limited number of hits or a limited time,
/// whichever runs out first.
#[derive(Debug, Clone)]
pub struct Barrier {
    base_reduction: f64,
    reduction: f64,
    hits: Counter,
    duration: Duration,
}

impl Barrier {
    /// Create a barrier. The reduction is clamped into `[0, 1]`.
    #[must_use]
    pub fn new(reduction: f64, max_hits: u32, duration: f64) -> Self {
        let reduction = unit(reduction);
        Self {
            base_reduction: reduction,
            reduction,
            hits: Counter::new(max_hits),
            duration: Duration::new(duration),
        }
    }

    /// Fraction of damage removed.
    #[must_use]
    pub const fn reduction(&self) -> f64 {
        self.reduction
    }

    /// Hits absorbed so far.
    #[must_use]
    pub const fn hits(&self) -> &Counter {
        &self.hits
    }

    /// Remaining time.
    #[must_use]
    pub const fn duration(&self) -> &Duration {
        &self.duration
    }

    /// Out of hits or out of time.
    #[must_use]
    pub fn is_down(&self) -> bool {
        self.duration.is_expired() || self.hits.is_max()
    }

    fn rescale(&mut self, scaler: &SpellLevelScaler, level: u32) {
        self.reduction = scaler.scale_percentage(self.base_reduction, level);
    }

    /// Reduce a damage event. Returns true if the event was a hit on this barrier.
    fn mitigate(&mut self, event: &mut AuraEvent) -> bool {
        if self.is_down() {
            return false;
        }
        let AuraEvent::Damage { amount } = event else {
            return false;
        };
        *amount *= 1.0 - self.reduction;
        self.hits.increment();
        true
    }

    fn update(&mut self, dt: f64) -> bool {
        self.duration.update(dt) || self.hits.is_max()
    }
}

// ============================================================================
// Shields
// ============================================================================

/// Reduces incoming damage.
///
/// Level scaling: reduction, as a percentage.
#[derive(Debug, Clone)]
pub struct EarthShieldSpell {
    core: SpellCore,
    barrier: Barrier,
}

impl EarthShieldSpell {
    /// Create a level 1 earth shield.
    #[must_use]
    pub fn new(reduction: f64, max_hits: u32, duration: f64) -> Self {
        Self {
            core: SpellCore::new(TagSet::of(&[Tag::Buff, Tag::Shield, Tag::Earth])),
            barrier: Barrier::new(reduction, max_hits, duration),
        }
    }

    /// Hit and time budget.
    #[must_use]
    pub const fn barrier(&self) -> &Barrier {
        &self.barrier
    }
}

impl Spell for EarthShieldSpell {
    spell_identity!(SpellKind::EarthShield);

    fn on_level_changed(&mut self, level: u32) {
        let scaler = *self.core.scaler();
        self.barrier.rescale(&scaler, level);
    }

    fn update(&mut self, _aura: &mut Aura, dt: f64) -> bool {
        self.barrier.update(dt)
    }

    fn modify_event(&mut self, _aura: &mut Aura, event: &mut AuraEvent) -> EventFlow {
        self.barrier.mitigate(event);
        EventFlow::Continue
    }

    fn is_spent(&self) -> bool {
        self.barrier.is_down()
    }
}

/// Reduces incoming damage. When its last hit lands it casts a freeze around
/// the owner, once.
///
/// Level scaling: reduction, as a percentage.
#[derive(Debug, Clone)]
pub struct IceShieldSpell {
    core: SpellCore,
    barrier: Barrier,
    freeze: Option<FreezeSpell>,
    caster: Rc<dyn Caster>,
}

impl IceShieldSpell {
    /// Create a level 1 ice shield.
    #[must_use]
    pub fn new(
        reduction: f64,
        max_hits: u32,
        duration: f64,
        freeze: FreezeSpell,
        caster: Rc<dyn Caster>,
    ) -> Self {
        Self {
            core: SpellCore::new(TagSet::of(&[Tag::Buff, Tag::Shield, Tag::Ice])),
            barrier: Barrier::new(reduction, max_hits, duration),
            freeze: Some(freeze),
            caster,
        }
    }

    /// Hit and time budget.
    #[must_use]
    pub const fn barrier(&self) -> &Barrier {
        &self.barrier
    }

    /// Whether the freeze was already cast.
    #[must_use]
    pub const fn has_cast_freeze(&self) -> bool {
        self.freeze.is_none()
    }

    /// Cast the freeze once the hits are used up.
    fn shatter_if_exhausted(&mut self) {
        if !self.barrier.hits().is_max() {
            return;
        }
        if let Some(freeze) = self.freeze.take() {
            debug!(level = freeze.level(), "Ice shield shattered, casting freeze");
            self.caster.cast_spell(Box::new(freeze), CastType::AreaOfEffect);
        }
    }
}

impl Spell for IceShieldSpell {
    spell_identity!(SpellKind::IceShield);

    fn on_level_changed(&mut self, level: u32) {
        let scaler = *self.core.scaler();
        self.barrier.rescale(&scaler, level);
    }

    fn start(&mut self, _aura: &mut Aura) {
        self.shatter_if_exhausted();
    }

    fn update(&mut self, _aura: &mut Aura, dt: f64) -> bool {
        self.shatter_if_exhausted();
        self.barrier.update(dt)
    }

    fn modify_event(&mut self, _aura: &mut Aura, event: &mut AuraEvent) -> EventFlow {
        if self.barrier.mitigate(event) {
            self.shatter_if_exhausted();
        }
        EventFlow::Continue
    }

    fn is_spent(&self) -> bool {
        self.barrier.is_down()
    }
}

// ============================================================================
// Vulnerable
// ============================================================================

/// Strips shields from the owner. As long as it has never stripped one it
/// amplifies incoming damage.
///
/// Level scaling: damage multiplier.
#[derive(Debug, Clone)]
pub struct VulnerableSpell {
    core: SpellCore,
    base_multiplier: f64,
    multiplier: f64,
    duration: Duration,
    shields_removed: bool,
}

impl VulnerableSpell {
    /// Create a level 1 vulnerability. Multipliers below 1 are raised to 1.
    #[must_use]
    pub fn new(damage_multiplier: f64, duration: f64) -> Self {
        let multiplier = damage_multiplier.max(1.0);
        Self {
            core: SpellCore::new(TagSet::of(&[Tag::Debuff, Tag::Dark])),
            base_multiplier: multiplier,
            multiplier,
            duration: Duration::new(duration),
            shields_removed: false,
        }
    }

    /// Damage multiplier at the current level.
    #[must_use]
    pub const fn damage_multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Whether a shield was ever removed.
    #[must_use]
    pub const fn shields_removed(&self) -> bool {
        self.shields_removed
    }
}

impl Spell for VulnerableSpell {
    spell_identity!(SpellKind::Vulnerable);

    fn on_level_changed(&mut self, level: u32) {
        self.multiplier = self.core.scaler().scale_value(self.base_multiplier, level);
    }

    fn update(&mut self, aura: &mut Aura, dt: f64) -> bool {
        let shields = aura.spells().get_by_tag(&[Tag::Shield]);
        if !shields.is_empty() {
            self.shields_removed = true;
        }
        for id in shields {
            aura.remove_spell(id);
        }
        self.duration.update(dt)
    }

    fn modify_event(&mut self, _aura: &mut Aura, event: &mut AuraEvent) -> EventFlow {
        if !self.shields_removed {
            if let AuraEvent::Damage { amount } = event {
                *amount *= self.multiplier;
            }
        }
        EventFlow::Continue
    }
}

// ============================================================================
// Warmth / Absorb
// ============================================================================

/// Cleanses water and ice debuffs on the next update.
#[derive(Debug, Clone)]
pub struct WarmthSpell {
    core: SpellCore,
}

impl WarmthSpell {
    /// Create a warmth.
    #[must_use]
    pub fn new() -> Self {
        Self {
            core: SpellCore::new(TagSet::of(&[Tag::Buff])),
        }
    }
}

impl Default for WarmthSpell {
    fn default() -> Self {
        Self::new()
    }
}

impl Spell for WarmthSpell {
    spell_identity!(SpellKind::Warmth);

    fn update(&mut self, aura: &mut Aura, _dt: f64) -> bool {
        let mut targets = aura.spells().get_by_tag(&[Tag::Water, Tag::Debuff]);
        targets.extend(aura.spells().get_by_tag(&[Tag::Ice, Tag::Debuff]));
        for id in targets {
            aura.remove_spell(id);
        }
        true
    }
}

/// Blocks incoming debuffs for a duration.
///
/// Level scaling: number of debuffs blocked, `scale_value(1, level)` rounded half to even.
#[derive(Debug, Clone)]
pub struct AbsorbSpell {
    core: SpellCore,
    duration: Duration,
    remaining: u32,
}

impl AbsorbSpell {
    /// Create a level 1 absorb, blocking one debuff.
    #[must_use]
    pub fn new(duration: f64) -> Self {
        Self {
            core: SpellCore::new(TagSet::of(&[Tag::Buff, Tag::Gravity])),
            duration: Duration::new(duration),
            remaining: 1,
        }
    }

    /// Debuffs it can still block.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }
}

impl Spell for AbsorbSpell {
    spell_identity!(SpellKind::Absorb);

    fn on_level_changed(&mut self, level: u32) {
        self.remaining = self.core.scaler().scale_value(1.0, level).round_ties_even() as u32;
    }

    fn update(&mut self, _aura: &mut Aura, dt: f64) -> bool {
        self.remaining == 0 || self.duration.update(dt)
    }

    fn modify_event(&mut self, _aura: &mut Aura, event: &mut AuraEvent) -> EventFlow {
        let AuraEvent::AddSpell { spell } = event else {
            return EventFlow::Continue;
        };
        if self.remaining == 0 || !spell.tags().contains(Tag::Debuff) {
            return EventFlow::Continue;
        }
        self.remaining -= 1;
        EventFlow::Cancel
    }

    fn is_spent(&self) -> bool {
        self.remaining == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{FlashSpell, IgniteSpell, RegenSpell, SliceSpell};
    use crate::spell::SpellExt;
    use crate::testing::TrackingCaster;

    #[test]
    fn test_earth_shield_reduces_damage_for_max_hits() {
        let mut aura = Aura::new(0.0, 100.0);
        aura.add_spell(EarthShieldSpell::new(0.5, 2, 10.0));

        aura.process_event(AuraEvent::damage(10.0));
        aura.process_event(AuraEvent::damage(10.0));
        assert_eq!(aura.magic().value(), 90.0);
        assert!(aura.spells().is_empty());

        aura.process_event(AuraEvent::damage(10.0));
        assert_eq!(aura.magic().value(), 80.0);
    }

    #[test]
    fn test_earth_shield_expires_with_duration() {
        let mut aura = Aura::new(0.0, 100.0);
        aura.add_spell(EarthShieldSpell::new(0.5, 5, 2.0));
        aura.update(2.0);
        assert!(aura.spells().is_empty());

        aura.process_event(AuraEvent::damage(10.0));
        assert_eq!(aura.magic().value(), 90.0);
    }

    #[test]
    fn test_earth_shield_reduction_clamps_and_scales() {
        assert_eq!(EarthShieldSpell::new(1.5, 1, 1.0).barrier().reduction(), 1.0);
        let shield = EarthShieldSpell::new(0.5, 1, 1.0).at_level(3);
        assert!((shield.barrier().reduction() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_earth_shield_with_damage_over_time() {
        let mut aura = Aura::new(0.0, 100.0);
        aura.add_spell(EarthShieldSpell::new(0.5, 2, 10.0));
        aura.add_spell(IgniteSpell::new(10.0, 10.0));

        aura.update(1.0);
        aura.update(1.0);
        assert_eq!(aura.magic().value(), 90.0);
        assert_eq!(aura.spells().len(), 1);

        aura.update(1.0);
        assert_eq!(aura.magic().value(), 80.0);
    }

    #[test]
    fn test_ice_shield_casts_freeze_once() {
        let caster = TrackingCaster::shared();
        let mut aura = Aura::new(0.0, 100.0);
        aura.add_spell(IceShieldSpell::new(
            0.5,
            2,
            10.0,
            FreezeSpell::new(3.0, 2.0),
            caster.clone(),
        ));

        aura.process_event(AuraEvent::damage(10.0));
        assert!(caster.casts().is_empty());

        aura.process_event(AuraEvent::damage(10.0));
        assert_eq!(caster.casts(), vec![(SpellKind::Freeze, CastType::AreaOfEffect)]);
        assert!(aura.spells().is_empty());

        aura.process_event(AuraEvent::damage(10.0));
        assert_eq!(caster.casts().len(), 1);
        assert_eq!(aura.magic().value(), 80.0);
    }

    #[test]
    fn test_ice_shield_without_hits_freezes_on_arrival() {
        let caster = TrackingCaster::shared();
        let mut aura = Aura::new(0.0, 100.0);
        aura.add_spell(IceShieldSpell::new(
            0.5,
            0,
            10.0,
            FreezeSpell::new(3.0, 2.0),
            caster.clone(),
        ));
        assert!(aura.spells().is_empty());
        assert_eq!(caster.casts(), vec![(SpellKind::Freeze, CastType::AreaOfEffect)]);

        aura.process_event(AuraEvent::damage(10.0));
        assert_eq!(caster.casts().len(), 1);
        assert_eq!(aura.magic().value(), 90.0);
    }

    #[test]
    fn test_ice_shield_expiry_does_not_freeze() {
        let caster = TrackingCaster::shared();
        let mut aura = Aura::new(0.0, 100.0);
        aura.add_spell(IceShieldSpell::new(
            0.5,
            2,
            1.0,
            FreezeSpell::new(3.0, 2.0),
            caster.clone(),
        ));
        aura.update(1.0);
        assert!(aura.spells().is_empty());
        assert!(caster.casts().is_empty());
    }

    #[test]
    fn test_vulnerable_amplifies_damage_without_shields() {
        let mut aura = Aura::new(0.0, 100.0);
        aura.add_spell(VulnerableSpell::new(2.0, 5.0));
        aura.process_event(AuraEvent::damage(10.0));
        assert_eq!(aura.magic().value(), 80.0);
        assert_eq!(VulnerableSpell::new(0.5, 1.0).damage_multiplier(), 1.0);
    }

    #[test]
    fn test_vulnerable_strips_shields_and_stops_amplifying() {
        let mut aura = Aura::new(0.0, 100.0);
        aura.add_spell(EarthShieldSpell::new(0.5, 5, 10.0));
        let id = aura.add_spell(VulnerableSpell::new(2.0, 5.0));

        aura.update(0.5);
        assert!(aura.spells().get_by_tag(&[Tag::Shield]).is_empty());
        let stripped = id
            .and_then(|id| aura.spells().get_as::<VulnerableSpell>(id))
            .map(VulnerableSpell::shields_removed);
        assert_eq!(stripped, Some(true));

        aura.process_event(AuraEvent::damage(10.0));
        assert_eq!(aura.magic().value(), 90.0);
    }

    #[test]
    fn test_warmth_cleanses_water_and_ice_debuffs() {
        let mut aura = Aura::new(0.0, 100.0);
        aura.add_spell(FreezeSpell::new(10.0, 2.0));
        aura.add_spell(RegenSpell::new(1.0, 10.0));
        aura.add_spell(FlashSpell::new(10.0));
        aura.add_spell(WarmthSpell::new());

        aura.update(0.1);
        let kinds: Vec<_> = aura
            .spells()
            .ids()
            .into_iter()
            .filter_map(|id| aura.spells().info(id))
            .map(|info| info.kind)
            .collect();
        assert_eq!(kinds, vec![SpellKind::Regen, SpellKind::Flash]);
        assert_eq!(aura.cast_delay().value(), 1.0);
    }

    #[test]
    fn test_absorb_blocks_debuffs() {
        let mut aura = Aura::new(0.0, 100.0);
        aura.add_spell(AbsorbSpell::new(10.0));

        assert!(aura.add_spell(RegenSpell::new(1.0, 1.0)).is_some());
        assert!(aura.add_spell(SliceSpell::new(10.0)).is_none());
        assert!(aura.spells().get_by_kind(SpellKind::Absorb).is_empty());
        assert!(aura.add_spell(SliceSpell::new(10.0)).is_some());
    }

    #[test]
    fn test_absorb_count_scales_with_level() {
        assert_eq!(AbsorbSpell::new(1.0).at_level(3).remaining(), 2);
        assert_eq!(AbsorbSpell::new(1.0).at_level(10).remaining(), 3);
        // halves round to even
        assert_eq!(AbsorbSpell::new(1.0).at_level(7).remaining(), 2);
        assert_eq!(AbsorbSpell::new(1.0).at_level(11).remaining(), 4);

        let mut aura = Aura::new(0.0, 100.0);
        aura.add_spell(AbsorbSpell::new(10.0).at_level(3));
        assert!(aura.add_spell(SliceSpell::new(1.0)).is_none());
        assert!(aura.add_spell(IgniteSpell::new(1.0, 1.0)).is_none());
        assert!(aura.add_spell(SliceSpell::new(1.0)).is_some());
    }

    #[test]
    fn test_absorb_expires() {
        let mut aura = Aura::new(0.0, 100.0);
        aura.add_spell(AbsorbSpell::new(1.0));
        aura.update(1.0);
        assert!(aura.spells().is_empty());
    }
}
