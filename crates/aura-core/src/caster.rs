//! Boundary to whatever delivers spells to other auras.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::spell::Spell;

/// Shape of a cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CastType {
    /// Straight line from the caster
    Line,
    /// Cone in front of the caster
    Cone,
    /// Everything around the caster
    #[serde(rename = "aoe")]
    AreaOfEffect,
}

impl fmt::Display for CastType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Line => "line",
            Self::Cone => "cone",
            Self::AreaOfEffect => "aoe",
        })
    }
}

/// Delivers spells to targets. Targeting is entirely up to the implementor.
///
/// Spells hold casters behind `Rc`, so implementors that record state use
/// interior mutability.
pub trait Caster: fmt::Debug {
    /// Deliver a spell.
    fn cast_spell(&self, spell: Box<dyn Spell>, cast_type: CastType);
}
