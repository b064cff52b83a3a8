//! Level scaling laws shared by every spell.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::ScalerConfig;

/// Default growth of scaled values per level above 1.
pub const DEFAULT_VALUE_COEFFICIENT: f64 = 0.25;

/// Default growth of scaled percentages per level above 1.
pub const DEFAULT_PERCENTAGE_COEFFICIENT: f64 = 0.05;

/// Maps `(base, level)` to a scaled value or percentage.
///
/// A plain value owned by whoever constructs spells. Level 1 is always the
/// identity for both laws.
///
/// Deserialization goes through [`ScalerConfig`], so missing coefficients take
/// their defaults and negative ones are clamped like in [`SpellLevelScaler::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "ScalerConfig", into = "ScalerConfig")]
pub struct SpellLevelScaler {
    value_coefficient: f64,
    percentage_coefficient: f64,
}

impl Default for SpellLevelScaler {
    fn default() -> Self {
        Self {
            value_coefficient: DEFAULT_VALUE_COEFFICIENT,
            percentage_coefficient: DEFAULT_PERCENTAGE_COEFFICIENT,
        }
    }
}

impl SpellLevelScaler {
    /// Create a scaler. Negative coefficients clamp to zero.
    #[must_use]
    pub fn new(value_coefficient: f64, percentage_coefficient: f64) -> Self {
        if value_coefficient < 0.0 || percentage_coefficient < 0.0 {
            warn!(
                value_coefficient,
                percentage_coefficient, "Negative scaling coefficient clamped to zero"
            );
        }
        Self {
            value_coefficient: value_coefficient.max(0.0),
            percentage_coefficient: percentage_coefficient.max(0.0),
        }
    }

    /// Set the value coefficient, keeping the default percentage coefficient.
    #[must_use]
    pub fn with_value_coefficient(self, coefficient: f64) -> Self {
        Self::new(coefficient, self.percentage_coefficient)
    }

    /// Set the percentage coefficient, keeping the value coefficient.
    #[must_use]
    pub fn with_percentage_coefficient(self, coefficient: f64) -> Self {
        Self::new(self.value_coefficient, coefficient)
    }

    /// Growth per level for values.
    #[must_use]
    pub const fn value_coefficient(&self) -> f64 {
        self.value_coefficient
    }

    /// Growth per level for percentages.
    #[must_use]
    pub const fn percentage_coefficient(&self) -> f64 {
        self.percentage_coefficient
    }

    /// `base * (1 + value_coefficient * (level - 1))`
    #[must_use]
    pub fn scale_value(&self, base: f64, level: u32) -> f64 {
        base * (1.0 + self.value_coefficient * steps(level))
    }

    /// `clamp(base + percentage_coefficient * (level - 1), 0, 1)`
    #[must_use]
    pub fn scale_percentage(&self, base: f64, level: u32) -> f64 {
        (base + self.percentage_coefficient * steps(level)).clamp(0.0, 1.0)
    }
}

fn steps(level: u32) -> f64 {
    f64::from(level.max(1) - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_deserialize_clamps_negative_coefficients() {
        let scaler: SpellLevelScaler =
            toml::from_str("value_coefficient = -1.0\npercentage_coefficient = -0.5").unwrap();
        assert_eq!(scaler.value_coefficient(), 0.0);
        assert_eq!(scaler.percentage_coefficient(), 0.0);
        assert_eq!(scaler.scale_value(100.0, 3), 100.0);

        let scaler: SpellLevelScaler = toml::from_str("value_coefficient = 0.5").unwrap();
        assert_eq!(scaler.percentage_coefficient(), DEFAULT_PERCENTAGE_COEFFICIENT);
        assert_eq!(scaler.scale_value(100.0, 3), 200.0);

        let text = toml::to_string(&scaler).unwrap();
        assert_eq!(toml::from_str::<SpellLevelScaler>(&text).unwrap(), scaler);
    }

    #[test]
    fn test_scale_value() {
        let scaler = SpellLevelScaler::default().with_value_coefficient(0.25);
        assert_eq!(scaler.scale_value(100.0, 1), 100.0);
        assert_eq!(scaler.scale_value(100.0, 2), 125.0);
        assert_eq!(scaler.scale_value(100.0, 3), 150.0);
        assert_eq!(scaler.scale_value(100.0, 10), 325.0);
    }

    #[test]
    fn test_scale_percentage_clamps() {
        let scaler = SpellLevelScaler::default().with_percentage_coefficient(0.05);
        assert!(approx(scaler.scale_percentage(0.5, 2), 0.55));
        assert_eq!(scaler.scale_percentage(0.98, 2), 1.0);
        assert_eq!(scaler.scale_percentage(0.9, 21), 1.0);
        assert_eq!(scaler.scale_percentage(-0.5, 1), 0.0);
    }

    #[test]
    fn test_negative_coefficients_clamp() {
        let scaler = SpellLevelScaler::new(-1.0, -0.5);
        assert_eq!(scaler.value_coefficient(), 0.0);
        assert_eq!(scaler.percentage_coefficient(), 0.0);
        assert_eq!(scaler.scale_value(40.0, 7), 40.0);
    }

    #[test]
    fn test_level_zero_treated_as_one() {
        let scaler = SpellLevelScaler::default();
        assert_eq!(scaler.scale_value(10.0, 0), 10.0);
    }

    proptest! {
        #[test]
        fn prop_level_one_is_identity(base in -1000.0f64..1000.0, pct in 0.0f64..1.0, v in 0.0f64..5.0, p in 0.0f64..1.0) {
            let scaler = SpellLevelScaler::new(v, p);
            prop_assert_eq!(scaler.scale_value(base, 1), base);
            prop_assert_eq!(scaler.scale_percentage(pct, 1), pct);
        }

        #[test]
        fn prop_percentage_stays_in_unit_range(base in -2.0f64..2.0, level in 1u32..200) {
            let pct = SpellLevelScaler::default().scale_percentage(base, level);
            prop_assert!((0.0..=1.0).contains(&pct));
        }
    }
}
