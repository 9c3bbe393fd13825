use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};

/// Global calculation multipliers. Stored as a single row; when that row is
/// absent every consumer falls back to [`CalcSettings::default`], so a fresh
/// database behaves identically to one that was never configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CalcSettings {
    pub partial_shift_multiplier: BigDecimal, // NUMERIC(4,2)
    pub vacation_multiplier: BigDecimal,      // NUMERIC(4,2)
    pub sick_multiplier: BigDecimal,          // NUMERIC(4,2)
}

impl Default for CalcSettings {
    fn default() -> Self {
        Self {
            partial_shift_multiplier: BigDecimal::from(5) / BigDecimal::from(10),
            vacation_multiplier: BigDecimal::from(1),
            sick_multiplier: BigDecimal::from(1),
        }
    }
}

impl CalcSettings {
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("partialShiftMultiplier", &self.partial_shift_multiplier),
            ("vacationMultiplier", &self.vacation_multiplier),
            ("sickMultiplier", &self.sick_multiplier),
        ] {
            if value < &BigDecimal::zero() {
                return Err(format!("{} must not be negative", field));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    #[test]
    fn defaults_match_documented_values() {
        let settings = CalcSettings::default();
        assert_eq!(
            settings.partial_shift_multiplier,
            BigDecimal::from_str("0.5").unwrap()
        );
        assert_eq!(settings.vacation_multiplier, BigDecimal::from(1));
        assert_eq!(settings.sick_multiplier, BigDecimal::from(1));
    }

    #[test]
    fn negative_multiplier_fails_validation() {
        let mut settings = CalcSettings::default();
        settings.sick_multiplier = BigDecimal::from(-1);
        assert!(settings.validate().is_err());
    }
}
