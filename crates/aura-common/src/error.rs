//! Error types for the aura engine.
//!
//! The simulation itself never fails: removing something that is absent is a
//! no-op and out-of-range numbers are clamped. Errors only exist where designer
//! data enters the engine.

use thiserror::Error;

/// Top-level error type for aura operations.
#[derive(Debug, Error)]
pub enum AuraError {
    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Spell definition errors
    #[error("Grimoire error: {0}")]
    Grimoire(#[from] GrimoireError),
}

/// Errors raised while loading aura or scaler configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values parsed but are inconsistent
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Errors raised while defining or conjuring spells by name.
#[derive(Debug, Error)]
pub enum GrimoireError {
    /// No definition registered under the name
    #[error("Unknown spell: {0}")]
    UnknownSpell(String),

    /// Definition needs a caster but the grimoire has none
    #[error("Spell {0} requires a caster")]
    MissingCaster(String),

    /// A definition with the same name already exists
    #[error("Duplicate spell definition: {0}")]
    DuplicateSpell(String),

    /// Failed to parse TOML
    #[error("Failed to parse grimoire TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type alias for aura operations.
pub type AuraResult<T> = Result<T, AuraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let err: AuraError = GrimoireError::UnknownSpell("Meteor".into()).into();
        assert_eq!(err.to_string(), "Grimoire error: Unknown spell: Meteor");

        let err: AuraError = ConfigError::Invalid("min above max".into()).into();
        assert!(err.to_string().contains("min above max"));
    }
}
