//! # Aura Core
//!
//! Status-effect simulation for a single entity.
//!
//! This crate provides:
//! - Bounded values with expiring multiplicative modifiers
//! - Level scaling laws for spell tuning values
//! - The spell trait and the built-in spell library
//! - The aura: a magic pool, a cast delay and the event pipeline routing
//!   damage, heals, casts and spell changes through active spells
//! - Event listeners and spell combinations
//! - TOML configuration for auras and named spell definitions

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod aura;
pub mod caster;
pub mod combination;
pub mod config;
pub mod effects;
pub mod events;
pub mod listener;
pub mod registry;
pub mod scaling;
pub mod spell;
pub mod tags;
pub mod values;

#[cfg(test)]
pub(crate) mod testing;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::aura::*;
    pub use crate::caster::*;
    pub use crate::combination::*;
    pub use crate::config::*;
    pub use crate::effects::*;
    pub use crate::events::*;
    pub use crate::listener::*;
    pub use crate::registry::*;
    pub use crate::scaling::*;
    pub use crate::spell::*;
    pub use crate::tags::*;
    pub use crate::values::*;
    pub use aura_common::prelude::*;
}

pub use prelude::*;
