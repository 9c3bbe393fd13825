//! Pure pay arithmetic over already-fetched ledger data. Money stays in
//! [`BigDecimal`] at full precision; rounding happens once, at presentation.

use std::collections::{BTreeMap, HashMap};

use bigdecimal::{BigDecimal, RoundingMode, Zero};
use uuid::Uuid;

use crate::database::models::{CalcSettings, Employee, Service, ShiftKind};

pub type DayRange = (u32, u32);

fn in_range(day: u32, range: Option<DayRange>) -> bool {
    match range {
        Some((start, end)) => day >= start && day <= end,
        None => true,
    }
}

pub fn count_shifts(
    days: &BTreeMap<u32, ShiftKind>,
    range: Option<DayRange>,
) -> (u32, u32) {
    let mut day_count = 0;
    let mut night_count = 0;
    for (&day, kind) in days {
        if !in_range(day, range) {
            continue;
        }
        match kind {
            ShiftKind::Day => day_count += 1,
            ShiftKind::Night => night_count += 1,
            _ => {}
        }
    }
    (day_count, night_count)
}

pub fn count_kind(
    days: &BTreeMap<u32, ShiftKind>,
    range: Option<DayRange>,
    kind: ShiftKind,
) -> u32 {
    days.iter()
        .filter(|&(&day, &k)| in_range(day, range) && k == kind)
        .count() as u32
}

/// Pro-ration numerator: worked shifts weigh 1, leave kinds their multipliers.
pub fn weighted_attendance(
    days: &BTreeMap<u32, ShiftKind>,
    range: Option<DayRange>,
    settings: &CalcSettings,
) -> BigDecimal {
    let mut total = BigDecimal::zero();
    for (&day, kind) in days {
        if !in_range(day, range) {
            continue;
        }
        match kind {
            ShiftKind::Day | ShiftKind::Night => total += BigDecimal::from(1),
            ShiftKind::Partial => total += &settings.partial_shift_multiplier,
            ShiftKind::Vacation => total += &settings.vacation_multiplier,
            ShiftKind::Sick => total += &settings.sick_multiplier,
            ShiftKind::Weekend => {}
        }
    }
    total
}

#[derive(Debug, Clone)]
pub struct Proration {
    pub worked_days: BigDecimal,
    pub working_days_total: u32,
}

/// Linear pro-ration of a fixed salary over the month's working days.
/// A zero denominator degrades to zero pay instead of failing the report.
pub fn fixed_salary_base(
    employee: &Employee,
    worked_days: &BigDecimal,
    working_days_total: u32,
) -> BigDecimal {
    if working_days_total == 0 {
        return BigDecimal::zero();
    }
    &employee.fixed_salary * worked_days / BigDecimal::from(working_days_total)
}

/// Fixed-salary employees get the salary (pro-rated when asked) plus the
/// bonus added once; rate-based employees get counts times rates, no bonus.
pub fn calculate_shift_salary(
    employee: &Employee,
    day_count: u32,
    night_count: u32,
    proration: Option<&Proration>,
) -> BigDecimal {
    if employee.is_fixed_salary {
        let base = match proration {
            Some(p) => fixed_salary_base(employee, &p.worked_days, p.working_days_total),
            None => employee.fixed_salary.clone(),
        };
        base + &employee.bonus
    } else {
        rate_pay(employee, day_count, night_count)
    }
}

fn rate_pay(employee: &Employee, day_count: u32, night_count: u32) -> BigDecimal {
    BigDecimal::from(day_count) * &employee.day_shift_rate
        + BigDecimal::from(night_count) * &employee.night_shift_rate
}

pub fn rate_shift_pay(
    employee: &Employee,
    day_count: u32,
    night_count: u32,
    partial_count: u32,
    settings: &CalcSettings,
) -> BigDecimal {
    rate_pay(employee, day_count, night_count)
        + BigDecimal::from(partial_count)
            * &employee.day_shift_rate
            * &settings.partial_shift_multiplier
}

/// Callers pre-filter services to the employee's compensation-mode partition.
pub fn calculate_service_sum(
    services: &[Service],
    quantities_by_service_id: &HashMap<Uuid, i32>,
) -> BigDecimal {
    let mut total = BigDecimal::zero();
    for service in services {
        if let Some(&quantity) = quantities_by_service_id.get(&service.id) {
            total += BigDecimal::from(quantity) * &service.price;
        }
    }
    total
}

/// Ties round away from zero. Scale 0 on screen, scale 2 in exports.
pub fn round_half_up(value: &BigDecimal, decimals: i64) -> BigDecimal {
    value.with_scale_round(decimals, RoundingMode::HalfUp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
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

    fn rate_employee(day_rate: &str, night_rate: &str) -> Employee {
        let mut emp = base_employee();
        emp.day_shift_rate = dec(day_rate);
        emp.night_shift_rate = dec(night_rate);
        emp
    }

    fn fixed_employee(salary: &str, bonus: &str) -> Employee {
        let mut emp = base_employee();
        emp.is_fixed_salary = true;
        emp.fixed_salary = dec(salary);
        emp.bonus = dec(bonus);
        emp
    }

    fn days(entries: &[(u32, ShiftKind)]) -> BTreeMap<u32, ShiftKind> {
        entries.iter().copied().collect()
    }

    #[test]
    fn count_shifts_on_empty_map_is_zero() {
        assert_eq!(count_shifts(&BTreeMap::new(), None), (0, 0));
        assert_eq!(count_shifts(&BTreeMap::new(), Some((1, 15))), (0, 0));
    }

    #[test]
    fn count_shifts_ignores_non_worked_kinds() {
        let map = days(&[
            (1, ShiftKind::Day),
            (2, ShiftKind::Night),
            (3, ShiftKind::Vacation),
            (4, ShiftKind::Sick),
            (5, ShiftKind::Weekend),
            (6, ShiftKind::Partial),
            (7, ShiftKind::Day),
        ]);
        assert_eq!(count_shifts(&map, None), (2, 1));
    }

    #[test]
    fn count_shifts_respects_inclusive_day_range() {
        let map = days(&[
            (1, ShiftKind::Day),
            (15, ShiftKind::Night),
            (16, ShiftKind::Day),
            (31, ShiftKind::Night),
            (10, ShiftKind::Vacation),
        ]);
        assert_eq!(count_shifts(&map, Some((1, 15))), (1, 1));
        assert_eq!(count_shifts(&map, Some((16, 31))), (1, 1));
        assert_eq!(count_shifts(&map, None), (2, 2));
    }

    #[test]
    fn count_kind_tallies_one_kind_only() {
        let map = days(&[
            (1, ShiftKind::Partial),
            (2, ShiftKind::Partial),
            (3, ShiftKind::Day),
            (20, ShiftKind::Partial),
        ]);
        assert_eq!(count_kind(&map, None, ShiftKind::Partial), 3);
        assert_eq!(count_kind(&map, Some((1, 15)), ShiftKind::Partial), 2);
    }

    #[test]
    fn rate_salary_is_exact_linear_combination() {
        let emp = rate_employee("100", "150");
        for (d, n) in [(0u32, 0u32), (1, 0), (0, 1), (10, 4), (23, 23)] {
            let expected = BigDecimal::from(d) * dec("100") + BigDecimal::from(n) * dec("150");
            assert_eq!(calculate_shift_salary(&emp, d, n, None), expected);
        }
    }

    #[test]
    fn rate_salary_keeps_cent_precision() {
        let emp = rate_employee("100.33", "150.77");
        assert_eq!(calculate_shift_salary(&emp, 3, 2, None), dec("602.53"));
    }

    #[test]
    fn fixed_salary_without_proration_is_salary_plus_bonus() {
        let emp = fixed_employee("20000", "1500");
        assert_eq!(calculate_shift_salary(&emp, 7, 3, None), dec("21500"));
    }

    #[test]
    fn fixed_salary_prorates_over_working_days() {
        let emp = fixed_employee("1000", "0");
        let proration = Proration {
            worked_days: BigDecimal::from(10),
            working_days_total: 23,
        };
        let result = calculate_shift_salary(&emp, 10, 0, Some(&proration));
        assert_eq!(round_half_up(&result, 2), dec("434.78"));
        // Full precision is retained until rounding.
        assert_eq!(result, dec("1000") * BigDecimal::from(10) / BigDecimal::from(23));
    }

    #[test]
    fn bonus_is_added_once_and_never_prorated() {
        let emp = fixed_employee("1000", "200");
        let proration = Proration {
            worked_days: BigDecimal::from(10),
            working_days_total: 23,
        };
        let with_bonus = calculate_shift_salary(&emp, 10, 0, Some(&proration));
        let without_bonus = fixed_salary_base(&emp, &BigDecimal::from(10), 23);
        assert_eq!(with_bonus - without_bonus, dec("200"));
    }

    #[test]
    fn zero_working_days_degrades_to_zero_base() {
        let emp = fixed_employee("1000", "200");
        let proration = Proration {
            worked_days: BigDecimal::from(10),
            working_days_total: 0,
        };
        assert_eq!(calculate_shift_salary(&emp, 10, 0, Some(&proration)), dec("200"));
        assert_eq!(fixed_salary_base(&emp, &BigDecimal::from(10), 0), BigDecimal::zero());
    }

    #[test]
    fn weighted_attendance_uses_default_multipliers() {
        let settings = CalcSettings::default();
        let map = days(&[
            (1, ShiftKind::Day),
            (2, ShiftKind::Night),
            (3, ShiftKind::Partial),
            (4, ShiftKind::Vacation),
            (5, ShiftKind::Sick),
            (6, ShiftKind::Weekend),
        ]);
        // 1 + 1 + 0.5 + 1 + 1 + 0
        assert_eq!(weighted_attendance(&map, None, &settings), dec("4.5"));
    }

    #[test]
    fn weighted_attendance_respects_custom_multipliers_and_range() {
        let settings = CalcSettings {
            partial_shift_multiplier: dec("0.25"),
            vacation_multiplier: dec("0"),
            sick_multiplier: dec("0.8"),
        };
        let map = days(&[
            (1, ShiftKind::Partial),
            (2, ShiftKind::Vacation),
            (3, ShiftKind::Sick),
            (20, ShiftKind::Day),
        ]);
        assert_eq!(weighted_attendance(&map, Some((1, 15)), &settings), dec("1.05"));
    }

    #[test]
    fn partial_shift_pays_scaled_day_rate() {
        let emp = rate_employee("200", "300");
        let settings = CalcSettings::default();
        let pay = rate_shift_pay(&emp, 2, 1, 3, &settings);
        // 2*200 + 1*300 + 3*200*0.5
        assert_eq!(pay, dec("1000"));
    }

    #[test]
    fn service_sum_is_zero_on_empty_inputs() {
        let quantities = HashMap::new();
        assert_eq!(calculate_service_sum(&[], &quantities), BigDecimal::zero());
    }

    fn service(name: &str, price: &str, for_salary_based: bool) -> Service {
        Service {
            id: Uuid::new_v4(),
            name: name.to_string(),
            price: dec(price),
            for_salary_based,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn service_sum_skips_services_without_quantities() {
        let billed = service("Install", "250.50", false);
        let unbilled = service("Repair", "99.99", false);
        let mut quantities = HashMap::new();
        quantities.insert(billed.id, 4);
        let total = calculate_service_sum(&[billed, unbilled], &quantities);
        assert_eq!(total, dec("1002.00"));
    }

    #[test]
    fn service_sum_is_order_independent() {
        let a = service("A", "10.10", false);
        let b = service("B", "20.20", false);
        let c = service("C", "0.70", false);
        let mut quantities = HashMap::new();
        quantities.insert(a.id, 1);
        quantities.insert(b.id, 2);
        quantities.insert(c.id, 30);
        let forward = calculate_service_sum(
            &[a.clone(), b.clone(), c.clone()],
            &quantities,
        );
        let backward = calculate_service_sum(&[c, b, a], &quantities);
        assert_eq!(forward, backward);
        assert_eq!(forward, dec("71.50"));
    }

    #[test]
    fn rounding_is_half_up_with_ties_away_from_zero() {
        assert_eq!(round_half_up(&dec("0.5"), 0), dec("1"));
        assert_eq!(round_half_up(&dec("1.5"), 0), dec("2"));
        assert_eq!(round_half_up(&dec("2.5"), 0), dec("3"));
        assert_eq!(round_half_up(&dec("-0.5"), 0), dec("-1"));
        assert_eq!(round_half_up(&dec("2.4999"), 0), dec("2"));
        assert_eq!(round_half_up(&dec("434.7826"), 2), dec("434.78"));
        assert_eq!(round_half_up(&dec("434.785"), 2), dec("434.79"));
    }
}
