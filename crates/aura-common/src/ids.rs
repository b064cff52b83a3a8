//! ID types for spells, modifiers and listeners.
//!
//! Every handle is allocated from its own process-wide counter, so two live
//! objects never share an ID even when they belong to different auras.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Declares a `u64` handle newtype backed by its own atomic counter.
macro_rules! handle_id {
    ($(#[$meta:meta])* $name:ident, $counter:ident, $prefix:literal) => {
        static $counter: AtomicU64 = AtomicU64::new(1);

        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(u64);

        impl $name {
            /// Allocates a new unique ID.
            #[must_use]
            pub fn new() -> Self {
                Self($counter.fetch_add(1, Ordering::Relaxed))
            }

            /// Creates an ID from a raw value (for deserialization).
            #[must_use]
            pub const fn from_raw(value: u64) -> Self {
                Self(value)
            }

            /// Returns the raw ID value.
            #[must_use]
            pub const fn raw(self) -> u64 {
                self.0
            }

            /// Null/invalid ID.
            pub const NULL: Self = Self(0);

            /// Checks if this is a valid (non-null) ID.
            #[must_use]
            pub const fn is_valid(self) -> bool {
                self.0 != 0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

handle_id!(
    /// Stable handle of a spell registered on an aura.
    SpellId,
    SPELL_COUNTER,
    "spell"
);

handle_id!(
    /// Identity of a value modifier. Clones of a modifier share the ID, which is
    /// how a collection recognizes "the same" modifier on add and remove.
    ModifierId,
    MODIFIER_COUNTER,
    "modifier"
);

handle_id!(
    /// Handle of an event listener registered on an aura.
    ListenerId,
    LISTENER_COUNTER,
    "listener"
);

handle_id!(
    /// Handle of a rule registered in a combination set.
    CombinationId,
    COMBINATION_COUNTER,
    "combination"
);

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ids_are_unique() {
        let a = SpellId::new();
        let b = SpellId::new();
        assert_ne!(a, b);
        assert!(a.is_valid());
        assert!(!SpellId::NULL.is_valid());
    }

    #[test]
    fn test_raw_round_trip() {
        let id = ModifierId::from_raw(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(id.to_string(), "modifier#42");
    }

    proptest! {
        #[test]
        fn prop_raw_round_trips(raw in any::<u64>()) {
            let id = SpellId::from_raw(raw);
            prop_assert_eq!(id.raw(), raw);
            prop_assert_eq!(id.is_valid(), raw != 0);
            prop_assert_eq!(ListenerId::from_raw(raw).to_string(), format!("listener#{raw}"));
        }

        #[test]
        fn prop_allocated_ids_are_distinct(count in 1usize..200) {
            let ids: std::collections::HashSet<_> = (0..count).map(|_| ModifierId::new()).collect();
            prop_assert_eq!(ids.len(), count);
            prop_assert!(ids.iter().all(|id| id.is_valid()));
        }
    }
}
