//! The spell library.
//!
//! - `damage`: damage over time and single hits
//! - `restore`: healing, regeneration and heal modifiers
//! - `tempo`: cast-delay and casting control
//! - `ward`: shields, cleanses and debuff protection
//! - `visual`: presentation-only timers

/// Implements the identity items of [`Spell`](crate::spell::Spell) for a struct
/// with a `core: SpellCore` field.
macro_rules! spell_identity {
    ($kind:expr) => {
        fn kind(&self) -> $crate::spell::SpellKind {
            $kind
        }

        fn core(&self) -> &$crate::spell::SpellCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut $crate::spell::SpellCore {
            &mut self.core
        }
    };
}

mod damage;
mod restore;
mod tempo;
mod visual;
mod ward;

pub use damage::{IgniteSpell, RockSpell, SliceSpell, WeightSpell};
pub use restore::{AmbientMagicRegenSpell, ChargeSpell, HealSpell, RegenSpell, ShockSpell};
pub use tempo::{FreezeSpell, HasteSpell, PauseSpell, UnpauseSpell, WeakenSpell};
pub use visual::{FlashSpell, ShadowSpell};
pub use ward::{AbsorbSpell, Barrier, EarthShieldSpell, IceShieldSpell, VulnerableSpell, WarmthSpell};

/// Clamp a fraction into `[0, 1]`.
fn unit(fraction: f64) -> f64 {
    fraction.clamp(0.0, 1.0)
}
