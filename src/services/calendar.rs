use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Last day of the first half of a month; advance reports only look at
/// days 1..=ADVANCE_CUTOFF_DAY.
pub const ADVANCE_CUTOFF_DAY: u32 = 15;

/// Parse a `YYYY-MM` month selector into the first day of that month.
///
/// Anything missing or unparsable falls back to the current month; callers
/// never see an error from month selection.
pub fn parse_month(raw: Option<&str>) -> NaiveDate {
    raw.and_then(parse_year_month)
        .unwrap_or_else(current_month_start)
}

fn parse_year_month(s: &str) -> Option<NaiveDate> {
    let (year, month) = s.trim().split_once('-')?;
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

pub fn current_month_start() -> NaiveDate {
    let today = Utc::now().date_naive();
    NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today)
}

pub fn format_month(month_start: NaiveDate) -> String {
    format!("{:04}-{:02}", month_start.year(), month_start.month())
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next_month
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(0)
}

/// Count of Monday..Friday days in the month. Holidays are not modelled;
/// this is a plain business-day count.
pub fn get_working_days(year: i32, month: u32) -> u32 {
    (1..=days_in_month(year, month))
        .filter_map(|day| NaiveDate::from_ymd_opt(year, month, day))
        .filter(|date| date.weekday().num_days_from_monday() < 5)
        .count() as u32
}

pub fn month_end(month_start: NaiveDate) -> NaiveDate {
    let last_day = days_in_month(month_start.year(), month_start.month());
    NaiveDate::from_ymd_opt(month_start.year(), month_start.month(), last_day)
        .unwrap_or(month_start)
}

pub fn previous_month_last_day(month_start: NaiveDate) -> NaiveDate {
    month_start.pred_opt().unwrap_or(month_start)
}

/// Header cell for one day of the timesheet grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayLabel {
    pub day: u32,
    pub weekday: String,
    pub is_weekend: bool,
}

pub fn month_day_labels(month_start: NaiveDate) -> Vec<DayLabel> {
    let (year, month) = (month_start.year(), month_start.month());
    (1..=days_in_month(year, month))
        .filter_map(|day| NaiveDate::from_ymd_opt(year, month, day))
        .map(|date| DayLabel {
            day: date.day(),
            weekday: date.weekday().to_string(),
            is_weekend: date.weekday().num_days_from_monday() >= 5,
        })
        .collect()
}
