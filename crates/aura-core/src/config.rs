//! Designer-facing configuration.
//!
//! This module provides:
//! - [`AuraConfig`]: magic bounds, starting magic and cast delay of an aura
//! - [`ScalerConfig`]: the level scaling coefficients
//! - [`Grimoire`]: named spell definitions conjured into live spells
//!
//! Everything loads from TOML. Parsing and validation are the only fallible
//! steps in the crate; a conjured spell or built aura never fails afterwards.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use aura_common::{ConfigError, GrimoireError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::aura::{Aura, DEFAULT_CAST_DELAY};
use crate::caster::Caster;
use crate::effects::{
    AbsorbSpell, AmbientMagicRegenSpell, ChargeSpell, EarthShieldSpell, FlashSpell, FreezeSpell,
    HasteSpell, HealSpell, IceShieldSpell, IgniteSpell, PauseSpell, RegenSpell, RockSpell,
    ShadowSpell, ShockSpell, SliceSpell, UnpauseSpell, VulnerableSpell, WarmthSpell, WeakenSpell,
    WeightSpell,
};
use crate::scaling::{SpellLevelScaler, DEFAULT_PERCENTAGE_COEFFICIENT, DEFAULT_VALUE_COEFFICIENT};
use crate::spell::{Spell, SpellExt};

// ============================================================================
// Scaler
// ============================================================================

/// Level scaling coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalerConfig {
    /// Growth of scaled values per level above 1
    pub value_coefficient: f64,
    /// Growth of scaled percentages per level above 1
    pub percentage_coefficient: f64,
}

impl Default for ScalerConfig {
    fn default() -> Self {
        Self {
            value_coefficient: DEFAULT_VALUE_COEFFICIENT,
            percentage_coefficient: DEFAULT_PERCENTAGE_COEFFICIENT,
        }
    }
}

impl From<ScalerConfig> for SpellLevelScaler {
    fn from(config: ScalerConfig) -> Self {
        Self::new(config.value_coefficient, config.percentage_coefficient)
    }
}

impl From<SpellLevelScaler> for ScalerConfig {
    fn from(scaler: SpellLevelScaler) -> Self {
        Self {
            value_coefficient: scaler.value_coefficient(),
            percentage_coefficient: scaler.percentage_coefficient(),
        }
    }
}

// ============================================================================
// Aura
// ============================================================================

/// Settings for a new [`Aura`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuraConfig {
    /// Lower magic bound
    pub min_magic: f64,
    /// Base upper magic bound
    pub max_magic: f64,
    /// Starting magic; full when absent
    pub starting_magic: Option<f64>,
    /// Base cast delay in seconds
    pub cast_delay: f64,
    /// Level scaling for spells conjured alongside this aura
    pub scaler: ScalerConfig,
}

impl Default for AuraConfig {
    fn default() -> Self {
        Self {
            min_magic: 0.0,
            max_magic: 100.0,
            starting_magic: None,
            cast_delay: DEFAULT_CAST_DELAY,
            scaler: ScalerConfig::default(),
        }
    }
}

impl AuraConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the settings describe a usable aura.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_magic.is_finite() || !self.max_magic.is_finite() {
            return Err(ConfigError::Invalid("magic bounds must be finite".into()));
        }
        if self.min_magic > self.max_magic {
            return Err(ConfigError::Invalid(format!(
                "min_magic {} is above max_magic {}",
                self.min_magic, self.max_magic
            )));
        }
        if self.cast_delay.is_nan() || self.cast_delay < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "cast_delay {} must be non-negative",
                self.cast_delay
            )));
        }
        if let Some(start) = self.starting_magic {
            if start < self.min_magic || start > self.max_magic {
                warn!(
                    starting_magic = start,
                    min_magic = self.min_magic,
                    max_magic = self.max_magic,
                    "Starting magic out of range, clamping"
                );
            }
        }
        Ok(())
    }

    /// Scaling law described by the config.
    #[must_use]
    pub fn scaler(&self) -> SpellLevelScaler {
        self.scaler.into()
    }

    /// Build the aura. Out-of-range starting magic is clamped.
    #[must_use]
    pub fn build(&self) -> Aura {
        let aura = Aura::new(self.min_magic, self.max_magic).with_cast_delay(self.cast_delay);
        match self.starting_magic {
            Some(magic) => aura.with_magic(magic),
            None => aura,
        }
    }
}

// ============================================================================
// Spell definitions
// ============================================================================

fn default_level() -> u32 {
    1
}

/// Tuning values of one spell of the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum SpellDefinition {
    AmbientMagicRegen { amount_per_second: f64 },
    Ignite { damage_per_second: f64, duration: f64 },
    Slice { damage: f64 },
    Rock { damage: f64 },
    Heal { healing: f64 },
    Regen { rate: f64, duration: f64 },
    Charge { healing_multiplier: f64, duration: f64 },
    Shock { heal_reduction: f64, duration: f64 },
    Haste { duration: f64, cast_delay_reduction: f64 },
    Freeze { duration: f64, cast_delay_multiplier: f64 },
    Pause { duration: f64 },
    Unpause,
    Warmth,
    Absorb { duration: f64 },
    Vulnerable { damage_multiplier: f64, duration: f64 },
    EarthShield { reduction: f64, hits: u32, duration: f64 },
    IceShield {
        reduction: f64,
        hits: u32,
        duration: f64,
        freeze_duration: f64,
        freeze_multiplier: f64,
    },
    Weaken { reduction: f64, duration: f64 },
    Flash { duration: f64 },
    Shadow { duration: f64 },
    Weight { acceleration_threshold: f64, damage_per_second: f64, duration: f64 },
}

impl SpellDefinition {
    /// Whether conjuring needs a [`Caster`].
    #[must_use]
    pub const fn needs_caster(&self) -> bool {
        matches!(self, Self::IceShield { .. })
    }

    /// Build the level 1 spell with the default scaler.
    fn instantiate(&self, caster: Option<&Rc<dyn Caster>>) -> Option<Box<dyn Spell>> {
        let spell = match *self {
            Self::AmbientMagicRegen { amount_per_second } => {
                AmbientMagicRegenSpell::new(amount_per_second).boxed()
            }
            Self::Ignite { damage_per_second, duration } => {
                IgniteSpell::new(damage_per_second, duration).boxed()
            }
            Self::Slice { damage } => SliceSpell::new(damage).boxed(),
            Self::Rock { damage } => RockSpell::new(damage).boxed(),
            Self::Heal { healing } => HealSpell::new(healing).boxed(),
            Self::Regen { rate, duration } => RegenSpell::new(rate, duration).boxed(),
            Self::Charge { healing_multiplier, duration } => {
                ChargeSpell::new(healing_multiplier, duration).boxed()
            }
            Self::Shock { heal_reduction, duration } => {
                ShockSpell::new(heal_reduction, duration).boxed()
            }
            Self::Haste { duration, cast_delay_reduction } => {
                HasteSpell::new(duration, cast_delay_reduction).boxed()
            }
            Self::Freeze { duration, cast_delay_multiplier } => {
                FreezeSpell::new(duration, cast_delay_multiplier).boxed()
            }
            Self::Pause { duration } => PauseSpell::new(duration).boxed(),
            Self::Unpause => UnpauseSpell::new().boxed(),
            Self::Warmth => WarmthSpell::new().boxed(),
            Self::Absorb { duration } => AbsorbSpell::new(duration).boxed(),
            Self::Vulnerable { damage_multiplier, duration } => {
                VulnerableSpell::new(damage_multiplier, duration).boxed()
            }
            Self::EarthShield { reduction, hits, duration } => {
                EarthShieldSpell::new(reduction, hits, duration).boxed()
            }
            Self::IceShield {
                reduction,
                hits,
                duration,
                freeze_duration,
                freeze_multiplier,
            } => IceShieldSpell::new(
                reduction,
                hits,
                duration,
                FreezeSpell::new(freeze_duration, freeze_multiplier),
                Rc::clone(caster?),
            )
            .boxed(),
            Self::Weaken { reduction, duration } => WeakenSpell::new(reduction, duration).boxed(),
            Self::Flash { duration } => FlashSpell::new(duration).boxed(),
            Self::Shadow { duration } => ShadowSpell::new(duration).boxed(),
            Self::Weight {
                acceleration_threshold,
                damage_per_second,
                duration,
            } => WeightSpell::new(acceleration_threshold, damage_per_second, duration).boxed(),
        };
        Some(spell)
    }
}

/// A named entry of a grimoire: a definition plus the level it is conjured at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellEntry {
    /// What to build
    #[serde(flatten)]
    pub definition: SpellDefinition,
    /// Level of conjured spells
    #[serde(default = "default_level")]
    pub level: u32,
}

impl SpellEntry {
    /// Level 1 entry.
    #[must_use]
    pub const fn new(definition: SpellDefinition) -> Self {
        Self { definition, level: 1 }
    }

    /// Conjure at a specific level.
    #[must_use]
    pub const fn at_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }
}

impl From<SpellDefinition> for SpellEntry {
    fn from(definition: SpellDefinition) -> Self {
        Self::new(definition)
    }
}

// ============================================================================
// Grimoire
// ============================================================================

#[derive(Deserialize)]
struct GrimoireFile {
    #[serde(default)]
    scaler: ScalerConfig,
    #[serde(default)]
    spells: HashMap<String, SpellEntry>,
}

/// Named spell definitions and the scaling law every conjured spell uses.
#[derive(Default)]
pub struct Grimoire {
    definitions: AHashMap<String, SpellEntry>,
    scaler: SpellLevelScaler,
    caster: Option<Rc<dyn Caster>>,
}

impl fmt::Debug for Grimoire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grimoire")
            .field("definitions", &self.definitions.len())
            .field("scaler", &self.scaler)
            .field("caster", &self.caster.is_some())
            .finish()
    }
}

impl Grimoire {
    /// Empty grimoire using `scaler`.
    #[must_use]
    pub fn new(scaler: SpellLevelScaler) -> Self {
        Self {
            definitions: AHashMap::new(),
            scaler,
            caster: None,
        }
    }

    /// Load definitions from TOML.
    ///
    /// ```toml
    /// [scaler]
    /// value_coefficient = 0.25
    ///
    /// [spells.fireball]
    /// kind = "ignite"
    /// damage_per_second = 10.0
    /// duration = 5.0
    /// level = 2
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, GrimoireError> {
        let file: GrimoireFile = toml::from_str(source)?;
        let mut grimoire = Self::new(file.scaler.into());
        for (name, entry) in file.spells {
            if entry.level == 0 {
                warn!(spell = %name, "Spell level 0 raised to 1");
            }
            grimoire.definitions.insert(name, entry);
        }
        info!(spells = grimoire.len(), "Loaded grimoire");
        Ok(grimoire)
    }

    /// Attach the caster handed to spells that cast on their own.
    #[must_use]
    pub fn with_caster(mut self, caster: Rc<dyn Caster>) -> Self {
        self.caster = Some(caster);
        self
    }

    /// Register a definition under a new name.
    pub fn define(
        &mut self,
        name: impl Into<String>,
        entry: impl Into<SpellEntry>,
    ) -> Result<(), GrimoireError> {
        let name = name.into();
        if self.definitions.contains_key(&name) {
            return Err(GrimoireError::DuplicateSpell(name));
        }
        debug!(spell = %name, "Spell defined");
        self.definitions.insert(name, entry.into());
        Ok(())
    }

    /// Definition registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SpellEntry> {
        self.definitions.get(name)
    }

    /// Whether `name` is defined.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Defined names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether nothing is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Scaling law given to conjured spells.
    #[must_use]
    pub const fn scaler(&self) -> &SpellLevelScaler {
        &self.scaler
    }

    /// Build a fresh spell from the definition registered under `name`.
    pub fn conjure(&self, name: &str) -> Result<Box<dyn Spell>, GrimoireError> {
        let entry = self
            .definitions
            .get(name)
            .ok_or_else(|| GrimoireError::UnknownSpell(name.to_string()))?;
        let mut spell = entry
            .definition
            .instantiate(self.caster.as_ref())
            .ok_or_else(|| GrimoireError::MissingCaster(name.to_string()))?;
        spell.set_scaler(self.scaler);
        spell.set_level(entry.level);
        Ok(spell)
    }
}
