//! Spell combinations.
//!
//! A combination is a rule that looks for a qualifying set of spells on an
//! aura and rewrites it. [`SpellCombinations`] is a listener that runs every
//! registered rule whenever a spell is added.
//!
//! Rules remove and add spells through the normal pipeline. The events a rule
//! causes are delivered after the triggering event has reached every listener,
//! including the `SpellCombinations` that ran the rule, so a rule must leave
//! the aura in a state where it would not fire again on its own result.

use aura_common::CombinationId;
use tracing::debug;

use crate::aura::Aura;
use crate::effects::IgniteSpell;
use crate::events::ResolvedEvent;
use crate::listener::EventListener;
use crate::spell::SpellKind;
use crate::values::ValueModifier;

/// A rule rewriting a set of spells.
pub trait SpellCombination {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Look for the combination and apply it. Returns true if it fired.
    fn check(&mut self, aura: &mut Aura) -> bool;
}

/// Registered combination rules, checked in registration order.
#[derive(Default)]
pub struct SpellCombinations {
    rules: Vec<(CombinationId, Box<dyn SpellCombination>)>,
}

impl std::fmt::Debug for SpellCombinations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|(id, rule)| (id, rule.name())))
            .finish()
    }
}

impl SpellCombinations {
    /// Create an empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule.
    pub fn add<C: SpellCombination + 'static>(&mut self, combination: C) -> CombinationId {
        let id = CombinationId::new();
        self.rules.push((id, Box::new(combination)));
        id
    }

    /// Register a rule, builder style.
    #[must_use]
    pub fn with<C: SpellCombination + 'static>(mut self, combination: C) -> Self {
        self.add(combination);
        self
    }

    /// Unregister a rule. Absent IDs are a no-op.
    pub fn remove(&mut self, id: CombinationId) -> Option<Box<dyn SpellCombination>> {
        let index = self.rules.iter().position(|(rule_id, _)| *rule_id == id)?;
        Some(self.rules.remove(index).1)
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rule is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate rules in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (CombinationId, &dyn SpellCombination)> {
        self.rules.iter().map(|(id, rule)| (*id, rule.as_ref()))
    }

    /// Run every rule once. Returns how many fired.
    pub fn check_all(&mut self, aura: &mut Aura) -> usize {
        let mut fired = 0;
        for (id, rule) in &mut self.rules {
            if rule.check(aura) {
                debug!(%id, combination = rule.name(), "Spell combination fired");
                fired += 1;
            }
        }
        fired
    }
}

impl EventListener for SpellCombinations {
    fn on_event(&mut self, aura: &mut Aura, event: &ResolvedEvent) {
        if matches!(event, ResolvedEvent::SpellAdded { .. }) {
            self.check_all(aura);
        }
    }
}

// ============================================================================
// Combust
// ============================================================================

/// Merges two or more ignites into one burning for the sum of their damage
/// over the longest of their durations.
#[derive(Debug, Clone, Copy, Default)]
pub struct CombustCombination;

impl CombustCombination {
    /// Minimum number of ignites to merge.
    pub const THRESHOLD: usize = 2;

    /// Create the rule.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SpellCombination for CombustCombination {
    fn name(&self) -> &'static str {
        "Combust"
    }

    fn check(&mut self, aura: &mut Aura) -> bool {
        let ignites = aura.spells().get_by_kind(SpellKind::Ignite);
        if ignites.len() < Self::THRESHOLD {
            return false;
        }

        let mut damage_per_second = 0.0;
        let mut duration: f64 = 0.0;
        let mut merged = 0;
        for id in ignites {
            let Some((dps, length)) = aura
                .spells()
                .get_as::<IgniteSpell>(id)
                .map(|ignite| (ignite.damage_per_second(), ignite.duration().length()))
            else {
                continue;
            };
            if aura.remove_spell(id) {
                damage_per_second += dps;
                duration = duration.max(length);
                merged += 1;
            }
        }
        if merged == 0 {
            return false;
        }

        debug!(merged, damage_per_second, duration, "Ignites merged");
        aura.add_spell(IgniteSpell::new(damage_per_second, duration));
        true
    }
}

// ============================================================================
// Invigorate
// ============================================================================

/// Raises max magic while three or more regens are active. The boost outlives
/// the regens by its own duration and is refreshed every time the rule fires.
#[derive(Debug, Clone)]
pub struct InvigorateCombination {
    modifier: ValueModifier,
}

impl InvigorateCombination {
    /// Minimum number of regens.
    pub const THRESHOLD: usize = 3;

    /// Create the rule.
    #[must_use]
    pub fn new(max_magic_multiplier: f64, duration: f64) -> Self {
        Self {
            modifier: ValueModifier::new(max_magic_multiplier, duration),
        }
    }

    /// The modifier installed on max magic.
    #[must_use]
    pub const fn modifier(&self) -> &ValueModifier {
        &self.modifier
    }
}

impl SpellCombination for InvigorateCombination {
    fn name(&self) -> &'static str {
        "Invigorate"
    }

    /// Returns true only when the boost is newly installed; a refresh returns false.
    fn check(&mut self, aura: &mut Aura) -> bool {
        let regens = aura.spells().get_by_kind(SpellKind::Regen);
        if regens.len() < Self::THRESHOLD {
            return false;
        }
        let mut cap = aura.magic_mut().cap_mut();
        let modifiers = cap.modifiers_mut();
        modifiers.reset(self.modifier.id());
        modifiers.add(self.modifier.clone())
    }
}
