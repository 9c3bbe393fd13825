use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: Uuid,
    pub name: String,
    pub created_at: NaiveDateTime,
}

/// An employee as stored, joined with department/position names for display.
///
/// Compensation is either a fixed monthly salary plus bonus
/// (`is_fixed_salary`) or per-shift day/night rates. The unused pair of
/// fields stays at zero.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,
    pub full_name: String,
    pub department_id: Uuid,
    pub department_name: String,
    pub position_id: Uuid,
    pub position_name: String,
    pub day_shift_rate: BigDecimal,   // NUMERIC(10,2)
    pub night_shift_rate: BigDecimal, // NUMERIC(10,2)
    pub is_fixed_salary: bool,
    pub fixed_salary: BigDecimal, // NUMERIC(10,2)
    pub bonus: BigDecimal,        // NUMERIC(10,2)
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInput {
    pub full_name: String,
    pub department_id: Uuid,
    pub position_id: Uuid,
    #[serde(default)]
    pub day_shift_rate: BigDecimal,
    #[serde(default)]
    pub night_shift_rate: BigDecimal,
    #[serde(default)]
    pub is_fixed_salary: bool,
    #[serde(default)]
    pub fixed_salary: BigDecimal,
    #[serde(default)]
    pub bonus: BigDecimal,
}

impl EmployeeInput {
    /// Rates and salary amounts must be non-negative; the name must be
    /// non-blank. Returns the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.full_name.trim().is_empty() {
            return Err("Full name must not be empty".to_string());
        }
        for (field, value) in [
            ("dayShiftRate", &self.day_shift_rate),
            ("nightShiftRate", &self.night_shift_rate),
            ("fixedSalary", &self.fixed_salary),
            ("bonus", &self.bonus),
        ] {
            if value < &BigDecimal::zero() {
                return Err(format!("{} must not be negative", field));
            }
        }
        Ok(())
    }
}
