use std::collections::{BTreeMap, HashSet};

use actix_web::{web, HttpResponse, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{
    Employee, RangeApplyInput, ScheduleTemplate, ShiftBatchInput, ShiftEntry, ShiftKind,
    TimesheetRow,
};
use crate::database::repositories::{EmployeeRepository, ScheduleRepository, TemplateRepository};
use crate::handlers::shared::{ApiResponse, BatchOutcome};
use crate::services::calendar::{self, DayLabel};
use crate::services::payroll::{calculate_shift_salary, count_shifts};

#[derive(Debug, Deserialize)]
pub struct TimesheetQuery {
    pub month: Option<String>,
    pub department_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetView {
    pub month: String,
    pub working_days: u32,
    pub days: Vec<DayLabel>,
    pub rows: Vec<TimesheetRow>,
    pub templates: Vec<ScheduleTemplate>,
}

/// Monthly grid: one row per employee, one column per day, plus the
/// templates the client can prefill cells from.
pub async fn get_timesheet(
    employee_repo: web::Data<EmployeeRepository>,
    schedule_repo: web::Data<ScheduleRepository>,
    template_repo: web::Data<TemplateRepository>,
    query: web::Query<TimesheetQuery>,
) -> Result<HttpResponse> {
    let month_start = calendar::parse_month(query.month.as_deref());

    let fetched = futures_util::try_join!(
        employee_repo.get_employees(query.department_id),
        schedule_repo.get_month_shifts(month_start),
        schedule_repo.get_previous_month_tails(month_start),
        template_repo.get_templates(),
    );
    match fetched {
        Ok((employees, mut shifts, tails, templates)) => {
            let rows = employees
                .into_iter()
                .map(|employee| {
                    let days = shifts.remove(&employee.id).unwrap_or_default();
                    let tail = tails.get(&employee.id).copied();
                    timesheet_row(employee, days, tail)
                })
                .collect();

            let view = TimesheetView {
                month: calendar::format_month(month_start),
                working_days: calendar::get_working_days(month_start.year(), month_start.month()),
                days: calendar::month_day_labels(month_start),
                rows,
                templates,
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success(view)))
        }
        Err(err) => {
            log::error!("Error loading timesheet: {}", err);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to load timesheet")))
        }
    }
}

// The grid shows month-to-date pay without pro-ration: full salary plus
// bonus for fixed employees, counts times rates for the rest.
fn timesheet_row(
    employee: Employee,
    days: BTreeMap<u32, ShiftKind>,
    previous_month_tail: Option<ShiftKind>,
) -> TimesheetRow {
    let (day_count, night_count) = count_shifts(&days, None);
    let shift_pay = calculate_shift_salary(&employee, day_count, night_count, None);
    TimesheetRow {
        employee_id: employee.id,
        full_name: employee.full_name,
        department_name: employee.department_name,
        position_name: employee.position_name,
        previous_month_tail,
        days,
        day_count,
        night_count,
        shift_pay,
    }
}

/// Batch upsert of timesheet cells.
///
/// The whole batch is validated before anything is written: an unknown
/// employee, an out-of-range day or a bad kind rejects the request with
/// nothing applied. The writes themselves are independent upserts, so a
/// storage failure partway through keeps the entries already applied; the
/// response says how many.
pub async fn update_shifts(
    employee_repo: web::Data<EmployeeRepository>,
    schedule_repo: web::Data<ScheduleRepository>,
    input: web::Json<ShiftBatchInput>,
) -> Result<HttpResponse> {
    let input = input.into_inner();
    let month_start = calendar::parse_month(input.month.as_deref());

    let ops = match resolve_entries(month_start, &input.entries) {
        Ok(ops) => ops,
        Err(message) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error(message)));
        }
    };
    if let Some(response) =
        reject_unknown_employees(&employee_repo, input.entries.iter().map(|e| e.employee_id))
            .await
    {
        return Ok(response);
    }

    Ok(run_batch(&schedule_repo, ops).await)
}

/// Assign one kind to a whole department over an inclusive day range.
/// Expands to per-(employee, day) cells and reuses the batch path.
pub async fn apply_range(
    employee_repo: web::Data<EmployeeRepository>,
    schedule_repo: web::Data<ScheduleRepository>,
    input: web::Json<RangeApplyInput>,
) -> Result<HttpResponse> {
    let input = input.into_inner();
    let month_start = calendar::parse_month(input.month.as_deref());
    let month_days = calendar::days_in_month(month_start.year(), month_start.month());

    if input.start_day == 0 || input.start_day > input.end_day || input.end_day > month_days {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error(format!(
            "Day range {}..{} is invalid for {}",
            input.start_day,
            input.end_day,
            calendar::format_month(month_start)
        ))));
    }

    let department_known = match employee_repo.department_exists(input.department_id).await {
        Ok(known) => known,
        Err(err) => {
            log::error!("Error checking department: {}", err);
            return Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to apply shift range")));
        }
    };
    if !department_known {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error(format!(
            "Unknown department: {}",
            input.department_id
        ))));
    }

    let employee_ids = match employee_repo
        .employee_ids_in_department(input.department_id)
        .await
    {
        Ok(ids) => ids,
        Err(err) => {
            log::error!("Error listing department employees: {}", err);
            return Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to apply shift range")));
        }
    };

    let entries: Vec<ShiftEntry> = employee_ids
        .iter()
        .flat_map(|&employee_id| {
            (input.start_day..=input.end_day).map(move |day| ShiftEntry {
                employee_id,
                day,
                kind: Some(input.kind),
            })
        })
        .collect();
    let ops = match resolve_entries(month_start, &entries) {
        Ok(ops) => ops,
        Err(message) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error(message)));
        }
    };

    Ok(run_batch(&schedule_repo, ops).await)
}

type ResolvedOp = (Uuid, NaiveDate, Option<ShiftKind>);

fn resolve_entries(
    month_start: NaiveDate,
    entries: &[ShiftEntry],
) -> std::result::Result<Vec<ResolvedOp>, String> {
    entries
        .iter()
        .map(|entry| {
            NaiveDate::from_ymd_opt(month_start.year(), month_start.month(), entry.day)
                .map(|date| (entry.employee_id, date, entry.kind))
                .ok_or_else(|| {
                    format!(
                        "Day {} is out of range for {}",
                        entry.day,
                        calendar::format_month(month_start)
                    )
                })
        })
        .collect()
}

/// `Some(response)` when the batch references an employee that does not
/// exist (or the check itself failed); `None` means all ids are known.
async fn reject_unknown_employees(
    employee_repo: &EmployeeRepository,
    ids: impl Iterator<Item = Uuid>,
) -> Option<HttpResponse> {
    let mut ids: Vec<Uuid> = ids.collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return None;
    }

    match employee_repo.existing_employee_ids(ids.clone()).await {
        Ok(found) => {
            let found: HashSet<Uuid> = found.into_iter().collect();
            ids.iter().find(|id| !found.contains(id)).map(|missing| {
                HttpResponse::BadRequest()
                    .json(ApiResponse::error(format!("Unknown employee: {}", missing)))
            })
        }
        Err(err) => {
            log::error!("Error validating employee ids: {}", err);
            Some(
                HttpResponse::InternalServerError()
                    .json(ApiResponse::error("Failed to validate batch")),
            )
        }
    }
}

async fn run_batch(schedule_repo: &ScheduleRepository, ops: Vec<ResolvedOp>) -> HttpResponse {
    let total = ops.len();
    let mut applied = 0usize;
    for (employee_id, date, kind) in ops {
        let result = match kind {
            Some(kind) => schedule_repo.upsert_shift(employee_id, date, kind).await,
            None => schedule_repo.clear_shift(employee_id, date).await,
        };
        if let Err(err) = result {
            log::error!(
                "Shift batch stopped after {} of {} entries: {}",
                applied,
                total,
                err
            );
            return HttpResponse::InternalServerError().json(ApiResponse::error_with_data(
                BatchOutcome { applied, total },
                "Batch stopped by a storage failure; entries already applied were kept",
            ));
        }
        applied += 1;
    }
    HttpResponse::Ok().json(ApiResponse::success(BatchOutcome { applied, total }))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::{BigDecimal, Zero};
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;

    fn dec(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).unwrap()
    }

    fn base_employee() -> Employee {
        let now = Utc::now().naive_utc();
        Employee {
            id: Uuid::new_v4(),
            full_name: "Test Person".to_string(),
            department_id: Uuid::new_v4(),
            department_name: "Ops".to_string(),
            position_id: Uuid::new_v4(),
            position_name: "Operator".to_string(),
            day_shift_rate: BigDecimal::zero(),
            night_shift_rate: BigDecimal::zero(),
            is_fixed_salary: false,
            fixed_salary: BigDecimal::zero(),
            bonus: BigDecimal::zero(),
            created_at: now,
            updated_at: now,
        }
    }

    fn days(entries: &[(u32, ShiftKind)]) -> BTreeMap<u32, ShiftKind> {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_row_pays_rate_employee_per_counted_shift() {
        let mut employee = base_employee();
        employee.day_shift_rate = dec("2500.00");
        employee.night_shift_rate = dec("3000.00");

        let row = timesheet_row(
            employee,
            days(&[
                (1, ShiftKind::Day),
                (2, ShiftKind::Day),
                (3, ShiftKind::Night),
                (4, ShiftKind::Vacation),
                (5, ShiftKind::Weekend),
            ]),
            None,
        );

        assert_eq!(row.day_count, 2);
        assert_eq!(row.night_count, 1);
        assert_eq!(row.shift_pay, dec("8000.00"));
        assert_eq!(row.previous_month_tail, None);
        assert_eq!(row.days.len(), 5);
    }

    #[test]
    fn test_row_pays_fixed_employee_full_salary_plus_bonus() {
        let mut employee = base_employee();
        employee.is_fixed_salary = true;
        employee.fixed_salary = dec("23000.00");
        employee.bonus = dec("1500.00");

        let row = timesheet_row(
            employee,
            days(&[(1, ShiftKind::Day)]),
            Some(ShiftKind::Night),
        );

        // Never pro-rated on the grid, whatever the attendance says.
        assert_eq!(row.shift_pay, dec("24500.00"));
        assert_eq!(row.day_count, 1);
        assert_eq!(row.previous_month_tail, Some(ShiftKind::Night));
    }

    #[test]
    fn test_row_without_shifts_pays_nothing_for_rate_employee() {
        let mut employee = base_employee();
        employee.day_shift_rate = dec("2500.00");

        let row = timesheet_row(employee, BTreeMap::new(), None);

        assert_eq!(row.day_count, 0);
        assert_eq!(row.night_count, 0);
        assert!(row.shift_pay.is_zero());
    }
}
