use std::collections::BTreeMap;

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of a scheduled day. Only `Day` and `Night` count as worked shifts
/// for base pay; the remaining kinds feed display and the multiplier
/// extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftKind {
    Day,
    Night,
    Weekend,
    Vacation,
    Sick,
    Partial,
}

impl ShiftKind {
    pub fn is_worked(&self) -> bool {
        matches!(self, ShiftKind::Day | ShiftKind::Night)
    }
}

impl std::fmt::Display for ShiftKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShiftKind::Day => write!(f, "day"),
            ShiftKind::Night => write!(f, "night"),
            ShiftKind::Weekend => write!(f, "weekend"),
            ShiftKind::Vacation => write!(f, "vacation"),
            ShiftKind::Sick => write!(f, "sick"),
            ShiftKind::Partial => write!(f, "partial"),
        }
    }
}

impl std::str::FromStr for ShiftKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" => Ok(ShiftKind::Day),
            "night" => Ok(ShiftKind::Night),
            "weekend" => Ok(ShiftKind::Weekend),
            "vacation" => Ok(ShiftKind::Vacation),
            "sick" => Ok(ShiftKind::Sick),
            "partial" => Ok(ShiftKind::Partial),
            _ => Err(format!("Invalid shift kind: {}", s)),
        }
    }
}

/// One cell of a batch timesheet update. `kind: None` clears the cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftEntry {
    pub employee_id: Uuid,
    pub day: u32,
    pub kind: Option<ShiftKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftBatchInput {
    pub month: Option<String>,
    pub entries: Vec<ShiftEntry>,
}

/// Assign one kind to every employee of a department over an inclusive
/// day range; expands to the same per-cell upserts as [`ShiftBatchInput`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeApplyInput {
    pub month: Option<String>,
    pub department_id: Uuid,
    pub start_day: u32,
    pub end_day: u32,
    pub kind: ShiftKind,
}

/// One employee's row in the monthly timesheet grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetRow {
    pub employee_id: Uuid,
    pub full_name: String,
    pub department_name: String,
    pub position_name: String,
    /// day of month -> kind; days without an assignment are absent.
    pub days: BTreeMap<u32, ShiftKind>,
    /// Kind on the last day of the previous month, for grid carry-over.
    pub previous_month_tail: Option<ShiftKind>,
    pub day_count: u32,
    pub night_count: u32,
    pub shift_pay: BigDecimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleTemplate {
    pub id: Uuid,
    pub name: String,
    /// Repeating pattern of cells; `None` marks a rest day.
    pub sequence: Vec<Option<ShiftKind>>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateInput {
    pub name: String,
    pub sequence: Vec<Option<ShiftKind>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn kind_roundtrips_through_display_and_parse() {
        for kind in [
            ShiftKind::Day,
            ShiftKind::Night,
            ShiftKind::Weekend,
            ShiftKind::Vacation,
            ShiftKind::Sick,
            ShiftKind::Partial,
        ] {
            assert_eq!(kind.to_string().parse::<ShiftKind>(), Ok(kind));
        }
    }

    #[test]
    fn parse_rejects_unknown_kind() {
        assert!("overtime".parse::<ShiftKind>().is_err());
    }

    #[test]
    fn only_day_and_night_are_worked() {
        assert!(ShiftKind::Day.is_worked());
        assert!(ShiftKind::Night.is_worked());
        assert!(!ShiftKind::Vacation.is_worked());
        assert!(!ShiftKind::Partial.is_worked());
    }
}
