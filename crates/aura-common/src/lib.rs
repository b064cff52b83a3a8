//! # Aura Common
//!
//! Common types shared by the aura status-effect engine.
//!
//! This crate provides:
//! - Handle types (SpellId, ModifierId, ListenerId, CombinationId)
//! - Error types for the configuration boundary
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
}

pub use prelude::*;
