//! Events routed through an aura's spells.

use aura_common::SpellId;

use crate::spell::{Spell, SpellInfo};

/// Standard gravity in m/s².
pub const GRAVITY: f64 = 9.81;

/// An incoming event, before spells have had a chance to modify it.
#[derive(Debug)]
pub enum AuraEvent {
    /// Magic lost
    Damage {
        /// Amount subtracted from magic
        amount: f64,
    },
    /// Magic restored
    Heal {
        /// Amount added to magic
        amount: f64,
    },
    /// A spell is being cast by the owner of the aura
    Cast {
        /// Spell leaving the aura
        spell: Box<dyn Spell>,
    },
    /// A spell is being attached to the aura
    AddSpell {
        /// Spell to register
        spell: Box<dyn Spell>,
    },
    /// A registered spell is being detached
    RemoveSpell {
        /// Handle of the spell to remove
        id: SpellId,
    },
    /// The owner moved
    Acceleration(Acceleration),
}

impl AuraEvent {
    /// Damage event. Negative amounts clamp to zero.
    #[must_use]
    pub fn damage(amount: f64) -> Self {
        Self::Damage {
            amount: amount.max(0.0),
        }
    }

    /// Heal event. Negative amounts clamp to zero.
    #[must_use]
    pub fn heal(amount: f64) -> Self {
        Self::Heal {
            amount: amount.max(0.0),
        }
    }

    /// Cast event.
    #[must_use]
    pub fn cast(spell: Box<dyn Spell>) -> Self {
        Self::Cast { spell }
    }

    /// Add-spell event.
    #[must_use]
    pub fn add_spell(spell: Box<dyn Spell>) -> Self {
        Self::AddSpell { spell }
    }

    /// Remove-spell event.
    #[must_use]
    pub const fn remove_spell(id: SpellId) -> Self {
        Self::RemoveSpell { id }
    }

    /// Short name used in logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Damage { .. } => "damage",
            Self::Heal { .. } => "heal",
            Self::Cast { .. } => "cast",
            Self::AddSpell { .. } => "add_spell",
            Self::RemoveSpell { .. } => "remove_spell",
            Self::Acceleration(_) => "acceleration",
        }
    }
}

/// Acceleration of the aura's owner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Acceleration {
    /// X axis in m/s²
    pub x: f64,
    /// Y axis in m/s²
    pub y: f64,
    /// Z axis in m/s²
    pub z: f64,
    magnitude: f64,
}

impl Acceleration {
    /// Reading from a sensor that includes gravity, which is subtracted from the magnitude.
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self::with_gravity(x, y, z, true)
    }

    /// Reading with explicit control over gravity removal. The magnitude never goes below zero.
    #[must_use]
    pub fn with_gravity(x: f64, y: f64, z: f64, remove_gravity: bool) -> Self {
        let mut magnitude = (x * x + y * y + z * z).sqrt();
        if remove_gravity {
            magnitude = (magnitude - GRAVITY).max(0.0);
        }
        Self { x, y, z, magnitude }
    }

    /// Length of the acceleration vector, gravity removed if requested.
    #[must_use]
    pub const fn magnitude(&self) -> f64 {
        self.magnitude
    }
}

/// What a spell wants to happen after it has seen an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventFlow {
    /// Hand the event on to the next spell
    #[default]
    Continue,
    /// Drop the event; later spells never see it
    Cancel,
}

impl EventFlow {
    /// `Cancel` if the condition holds.
    #[must_use]
    pub const fn cancel_if(condition: bool) -> Self {
        if condition {
            Self::Cancel
        } else {
            Self::Continue
        }
    }

    /// Whether the event was canceled.
    #[must_use]
    pub const fn is_canceled(self) -> bool {
        matches!(self, Self::Cancel)
    }
}

/// An event that survived every spell and was applied to the aura.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedEvent {
    /// Magic was reduced
    Damage {
        /// Final amount after spell modifications
        amount: f64,
    },
    /// Magic was restored
    Heal {
        /// Final amount after spell modifications
        amount: f64,
    },
    /// A spell was cast
    Cast {
        /// The cast spell as it left the aura
        spell: SpellInfo,
    },
    /// A spell was registered and started
    SpellAdded {
        /// Registry handle
        id: SpellId,
        /// Spell snapshot
        info: SpellInfo,
    },
    /// A spell was unregistered
    SpellRemoved {
        /// Former registry handle
        id: SpellId,
        /// Spell snapshot
        info: SpellInfo,
    },
    /// The owner moved
    Acceleration(Acceleration),
}

impl ResolvedEvent {
    /// Short name used in logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Damage { .. } => "damage",
            Self::Heal { .. } => "heal",
            Self::Cast { .. } => "cast",
            Self::SpellAdded { .. } => "spell_added",
            Self::SpellRemoved { .. } => "spell_removed",
            Self::Acceleration(_) => "acceleration",
        }
    }
}

/// Result of [`Aura::process_event`](crate::Aura::process_event).
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// Applied to the aura and delivered to listeners
    Resolved(ResolvedEvent),
    /// A spell canceled the event
    Canceled,
    /// Nothing to apply, e.g. removing a spell that is not registered
    Ignored,
}

impl EventOutcome {
    /// Whether the event was applied.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// Whether a spell canceled the event.
    #[must_use]
    pub const fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }

    /// The applied event, if any.
    #[must_use]
    pub fn resolved(self) -> Option<ResolvedEvent> {
        match self {
            Self::Resolved(event) => Some(event),
            Self::Canceled | Self::Ignored => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_amounts_clamp() {
        assert!(matches!(AuraEvent::damage(-5.0), AuraEvent::Damage { amount } if amount == 0.0));
        assert!(matches!(AuraEvent::heal(-0.1), AuraEvent::Heal { amount } if amount == 0.0));
        assert!(matches!(AuraEvent::heal(3.0), AuraEvent::Heal { amount } if amount == 3.0));
    }

    #[test]
    fn test_acceleration_gravity() {
        let resting = Acceleration::new(0.0, 0.0, GRAVITY);
        assert_eq!(resting.magnitude(), 0.0);

        let below = Acceleration::new(1.0, 0.0, 0.0);
        assert_eq!(below.magnitude(), 0.0);

        let raw = Acceleration::with_gravity(3.0, 4.0, 0.0, false);
        assert_eq!(raw.magnitude(), 5.0);

        let moving = Acceleration::new(0.0, 0.0, 15.0);
        assert!((moving.magnitude() - 5.19).abs() < 1e-9);
    }

    #[test]
    fn test_event_flow() {
        assert!(EventFlow::cancel_if(true).is_canceled());
        assert!(!EventFlow::cancel_if(false).is_canceled());
        assert_eq!(EventFlow::default(), EventFlow::Continue);
    }

    #[test]
    fn test_outcome_accessors() {
        let outcome = EventOutcome::Resolved(ResolvedEvent::Heal { amount: 2.0 });
        assert!(outcome.is_resolved());
        assert_eq!(outcome.resolved(), Some(ResolvedEvent::Heal { amount: 2.0 }));
        assert!(EventOutcome::Canceled.is_canceled());
        assert_eq!(EventOutcome::Ignored.resolved(), None);
    }
}
