//! Report assembly: per-employee pay lines grouped by department with
//! running subtotals. Accumulation stays exact; consumers round once at
//! emission via [`PayrollReport::rounded`].

use std::collections::{BTreeMap, HashMap};

use bigdecimal::{BigDecimal, Zero};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{CalcSettings, Employee, Service, ShiftKind};
use crate::services::calendar::{self, ADVANCE_CUTOFF_DAY};
use crate::services::payroll::{
    calculate_service_sum, count_kind, count_shifts, fixed_salary_base, rate_shift_pay,
    round_half_up, weighted_attendance, DayRange,
};

/// Report cut-off: first-half advance or full-month final payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Advance,
    Final,
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportKind::Advance => write!(f, "advance"),
            ReportKind::Final => write!(f, "final"),
        }
    }
}

impl std::str::FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "advance" => Ok(ReportKind::Advance),
            "final" => Ok(ReportKind::Final),
            _ => Err(format!("Invalid report kind: {}", s)),
        }
    }
}

// A request that names no kind gets the month-end payout.
impl Default for ReportKind {
    fn default() -> Self {
        ReportKind::Final
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollLine {
    pub employee_id: Uuid,
    pub full_name: String,
    pub department_name: String,
    pub day_count: u32,
    pub night_count: u32,
    pub shift_pay: BigDecimal,
    pub service_pay: BigDecimal,
    pub total: BigDecimal,
}

impl PayrollLine {
    fn rounded(&self, decimals: i64) -> PayrollLine {
        PayrollLine {
            shift_pay: round_half_up(&self.shift_pay, decimals),
            service_pay: round_half_up(&self.service_pay, decimals),
            total: round_half_up(&self.total, decimals),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentSubtotal {
    pub department_name: String,
    pub day_count: u32,
    pub night_count: u32,
    pub shift_pay: BigDecimal,
    pub service_pay: BigDecimal,
    pub total: BigDecimal,
}

impl DepartmentSubtotal {
    fn seeded(line: &PayrollLine) -> DepartmentSubtotal {
        DepartmentSubtotal {
            department_name: line.department_name.clone(),
            day_count: line.day_count,
            night_count: line.night_count,
            shift_pay: line.shift_pay.clone(),
            service_pay: line.service_pay.clone(),
            total: line.total.clone(),
        }
    }

    fn absorb(&mut self, line: &PayrollLine) {
        self.day_count += line.day_count;
        self.night_count += line.night_count;
        self.shift_pay += &line.shift_pay;
        self.service_pay += &line.service_pay;
        self.total += &line.total;
    }

    fn rounded(&self, decimals: i64) -> DepartmentSubtotal {
        DepartmentSubtotal {
            shift_pay: round_half_up(&self.shift_pay, decimals),
            service_pay: round_half_up(&self.service_pay, decimals),
            total: round_half_up(&self.total, decimals),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTotals {
    pub day_count: u32,
    pub night_count: u32,
    pub shift_pay: BigDecimal,
    pub service_pay: BigDecimal,
    pub total: BigDecimal,
}

impl ReportTotals {
    fn empty() -> ReportTotals {
        ReportTotals {
            day_count: 0,
            night_count: 0,
            shift_pay: BigDecimal::zero(),
            service_pay: BigDecimal::zero(),
            total: BigDecimal::zero(),
        }
    }

    fn absorb(&mut self, line: &PayrollLine) {
        self.day_count += line.day_count;
        self.night_count += line.night_count;
        self.shift_pay += &line.shift_pay;
        self.service_pay += &line.service_pay;
        self.total += &line.total;
    }

    fn rounded(&self, decimals: i64) -> ReportTotals {
        ReportTotals {
            shift_pay: round_half_up(&self.shift_pay, decimals),
            service_pay: round_half_up(&self.service_pay, decimals),
            total: round_half_up(&self.total, decimals),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollReport {
    pub month: String,
    pub kind: ReportKind,
    pub working_days: u32,
    pub lines: Vec<PayrollLine>,
    pub subtotals: Vec<DepartmentSubtotal>,
    pub totals: ReportTotals,
}

impl PayrollReport {
    /// Money fields rounded half-up to `decimals` places; counts untouched.
    pub fn rounded(&self, decimals: i64) -> PayrollReport {
        PayrollReport {
            month: self.month.clone(),
            kind: self.kind,
            working_days: self.working_days,
            lines: self.lines.iter().map(|l| l.rounded(decimals)).collect(),
            subtotals: self.subtotals.iter().map(|s| s.rounded(decimals)).collect(),
            totals: self.totals.rounded(decimals),
        }
    }
}

/// Rows come out ordered by (department name, full name) in plain byte
/// order; a subtotal flushes at every department change and at the end.
#[allow(clippy::too_many_arguments)]
pub fn build_report(
    employees: &[Employee],
    month: NaiveDate,
    kind: ReportKind,
    department_filter: Option<Uuid>,
    shifts_by_employee: &HashMap<Uuid, BTreeMap<u32, ShiftKind>>,
    services: &[Service],
    quantities_by_employee: &HashMap<Uuid, HashMap<Uuid, i32>>,
    settings: &CalcSettings,
) -> PayrollReport {
    let working_days = calendar::get_working_days(month.year(), month.month());

    let mut roster: Vec<&Employee> = employees
        .iter()
        .filter(|emp| department_filter.is_none_or(|dept| emp.department_id == dept))
        .collect();
    roster.sort_by(|a, b| {
        a.department_name
            .cmp(&b.department_name)
            .then_with(|| a.full_name.cmp(&b.full_name))
    });

    let salary_services: Vec<Service> = services
        .iter()
        .filter(|s| s.for_salary_based)
        .cloned()
        .collect();
    let rate_services: Vec<Service> = services
        .iter()
        .filter(|s| !s.for_salary_based)
        .cloned()
        .collect();

    let empty_days = BTreeMap::new();
    let no_quantities = HashMap::new();

    let mut lines = Vec::with_capacity(roster.len());
    let mut subtotals = Vec::new();
    let mut totals = ReportTotals::empty();
    let mut current: Option<DepartmentSubtotal> = None;

    for employee in roster {
        let days = shifts_by_employee.get(&employee.id).unwrap_or(&empty_days);
        let quantities = quantities_by_employee
            .get(&employee.id)
            .unwrap_or(&no_quantities);
        let partition = if employee.is_fixed_salary {
            &salary_services
        } else {
            &rate_services
        };
        let line = employee_line(
            employee,
            days,
            partition,
            quantities,
            kind,
            working_days,
            settings,
        );

        current = Some(match current.take() {
            Some(mut acc) if acc.department_name == line.department_name => {
                acc.absorb(&line);
                acc
            }
            Some(done) => {
                subtotals.push(done);
                DepartmentSubtotal::seeded(&line)
            }
            None => DepartmentSubtotal::seeded(&line),
        });
        totals.absorb(&line);
        lines.push(line);
    }
    if let Some(done) = current {
        subtotals.push(done);
    }

    PayrollReport {
        month: calendar::format_month(month),
        kind,
        working_days,
        lines,
        subtotals,
        totals,
    }
}

fn employee_line(
    employee: &Employee,
    days: &BTreeMap<u32, ShiftKind>,
    services: &[Service],
    quantities: &HashMap<Uuid, i32>,
    kind: ReportKind,
    working_days: u32,
    settings: &CalcSettings,
) -> PayrollLine {
    let first_half: Option<DayRange> = Some((1, ADVANCE_CUTOFF_DAY));
    let range = match kind {
        ReportKind::Advance => first_half,
        ReportKind::Final => None,
    };
    let (day_count, night_count) = count_shifts(days, range);

    let shift_pay = match kind {
        // Pure attendance-based partial payment: no bonus, no services.
        ReportKind::Advance => shift_pay_for_range(employee, days, first_half, working_days, settings),
        // Full month net of what the advance already covered.
        ReportKind::Final => {
            let full = shift_pay_for_range(employee, days, None, working_days, settings)
                + final_bonus(employee);
            let advance =
                shift_pay_for_range(employee, days, first_half, working_days, settings);
            full - advance
        }
    };
    let service_pay = match kind {
        ReportKind::Advance => BigDecimal::zero(),
        ReportKind::Final => calculate_service_sum(services, quantities),
    };
    let total = &shift_pay + &service_pay;

    PayrollLine {
        employee_id: employee.id,
        full_name: employee.full_name.clone(),
        department_name: employee.department_name.clone(),
        day_count,
        night_count,
        shift_pay,
        service_pay,
        total,
    }
}

/// Bonus-free shift pay for the given day range.
fn shift_pay_for_range(
    employee: &Employee,
    days: &BTreeMap<u32, ShiftKind>,
    range: Option<DayRange>,
    working_days: u32,
    settings: &CalcSettings,
) -> BigDecimal {
    if employee.is_fixed_salary {
        let worked = weighted_attendance(days, range, settings);
        fixed_salary_base(employee, &worked, working_days)
    } else {
        let (day_count, night_count) = count_shifts(days, range);
        let partial_count = count_kind(days, range, ShiftKind::Partial);
        rate_shift_pay(employee, day_count, night_count, partial_count, settings)
    }
}

fn final_bonus(employee: &Employee) -> BigDecimal {
    if employee.is_fixed_salary {
        employee.bonus.clone()
    } else {
        BigDecimal::zero()
    }
}
