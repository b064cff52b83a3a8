//! Presentation-only spells. They carry no behavior beyond their timer;
//! renderers watch for them through listeners or registry queries.

use crate::aura::Aura;
use crate::spell::{Spell, SpellCore, SpellKind};
use crate::tags::{Tag, TagSet};
use crate::values::Duration;

/// Blinding light on the owner's view.
///
/// Level scaling: duration.
#[derive(Debug, Clone)]
pub struct FlashSpell {
    core: SpellCore,
    base_duration: f64,
    duration: Duration,
}

impl FlashSpell {
    /// Create a level 1 flash.
    #[must_use]
    pub fn new(duration: f64) -> Self {
        Self {
            core: SpellCore::new(TagSet::of(&[Tag::Debuff, Tag::Light])),
            base_duration: duration,
            duration: Duration::new(duration),
        }
    }

    /// Remaining time.
    #[must_use]
    pub const fn duration(&self) -> &Duration {
        &self.duration
    }
}

impl Spell for FlashSpell {
    spell_identity!(SpellKind::Flash);

    fn on_level_changed(&mut self, level: u32) {
        let length = self.core.scaler().scale_value(self.base_duration, level);
        self.duration.set_length(length);
    }

    fn update(&mut self, _aura: &mut Aura, dt: f64) -> bool {
        self.duration.update(dt)
    }
}

/// Darkness over the owner's view.
///
/// Level scaling: duration.
#[derive(Debug, Clone)]
pub struct ShadowSpell {
    core: SpellCore,
    base_duration: f64,
    duration: Duration,
}

impl ShadowSpell {
    /// Create a level 1 shadow.
    #[must_use]
    pub fn new(duration: f64) -> Self {
        Self {
            core: SpellCore::new(TagSet::of(&[Tag::Debuff, Tag::Dark])),
            base_duration: duration,
            duration: Duration::new(duration),
        }
    }

    /// Remaining time.
    #[must_use]
    pub const fn duration(&self) -> &Duration {
        &self.duration
    }
}

impl Spell for ShadowSpell {
    spell_identity!(SpellKind::Shadow);

    fn on_level_changed(&mut self, level: u32) {
        let length = self.core.scaler().scale_value(self.base_duration, level);
        self.duration.set_length(length);
    }

    fn update(&mut self, _aura: &mut Aura, dt: f64) -> bool {
        self.duration.update(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spell::SpellExt;

    #[test]
    fn test_flash_lasts_its_duration() {
        let mut aura = Aura::new(0.0, 100.0);
        aura.add_spell(FlashSpell::new(2.0));
        aura.update(1.5);
        assert_eq!(aura.spells().get_by_name("Flash").len(), 1);
        aura.update(0.5);
        assert!(aura.spells().is_empty());
    }

    #[test]
    fn test_shadow_duration_scales_with_level() {
        let shadow = ShadowSpell::new(4.0).at_level(5);
        assert_eq!(shadow.duration().length(), 8.0);

        let mut aura = Aura::new(0.0, 100.0);
        aura.add_spell(shadow);
        aura.update(6.0);
        assert_eq!(aura.spells().get_by_tag(&[Tag::Dark]).len(), 1);
        aura.update(2.0);
        assert!(aura.spells().is_empty());
    }
}
