use actix_web::{web, HttpResponse};

use crate::database::repositories::{
    EmployeeRepository, ScheduleRepository, ServiceRepository, SettingsRepository,
};
use crate::error::AppError;
use crate::handlers::reports::{assemble_report, ReportQuery};
use crate::services::report::PayrollReport;

const CSV_HEADER: [&str; 7] = [
    "Department",
    "Employee",
    "Day shifts",
    "Night shifts",
    "Shift pay",
    "Service pay",
    "Total",
];

/// Same report as `GET /reports/payroll`, rendered as a CSV attachment with
/// money at two decimals.
pub async fn export_payroll_csv(
    employee_repo: web::Data<EmployeeRepository>,
    schedule_repo: web::Data<ScheduleRepository>,
    service_repo: web::Data<ServiceRepository>,
    settings_repo: web::Data<SettingsRepository>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, AppError> {
    let report = assemble_report(
        &employee_repo,
        &schedule_repo,
        &service_repo,
        &settings_repo,
        &query,
    )
    .await?
    .rounded(2);

    let body = render_csv(&report)?;
    let filename = format!(
        "payroll_{}_{}.csv",
        report.kind,
        report.month.replace('-', "_")
    );
    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(body))
}

/// Employee rows grouped by department, each group closed by its subtotal
/// row, then the grand total. Lines and subtotals arrive in matching
/// department order from the report builder.
fn render_csv(report: &PayrollReport) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    let mut lines = report.lines.iter().peekable();
    for subtotal in &report.subtotals {
        while let Some(line) = lines.peek() {
            if line.department_name != subtotal.department_name {
                break;
            }
            writer.write_record([
                line.department_name.clone(),
                line.full_name.clone(),
                line.day_count.to_string(),
                line.night_count.to_string(),
                line.shift_pay.to_string(),
                line.service_pay.to_string(),
                line.total.to_string(),
            ])?;
            lines.next();
        }
        writer.write_record([
            subtotal.department_name.clone(),
            "Subtotal".to_string(),
            subtotal.day_count.to_string(),
            subtotal.night_count.to_string(),
            subtotal.shift_pay.to_string(),
            subtotal.service_pay.to_string(),
            subtotal.total.to_string(),
        ])?;
    }
    writer.write_record([
        String::new(),
        "Total".to_string(),
        report.totals.day_count.to_string(),
        report.totals.night_count.to_string(),
        report.totals.shift_pay.to_string(),
        report.totals.service_pay.to_string(),
        report.totals.total.to_string(),
    ])?;

    let bytes = writer.into_inner()?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    use super::*;
    use crate::services::report::{
        DepartmentSubtotal, PayrollLine, ReportKind, ReportTotals,
    };

    fn money(text: &str) -> BigDecimal {
        text.parse().unwrap()
    }

    #[test]
    fn test_render_csv_interleaves_subtotals() {
        let report = PayrollReport {
            month: "2024-01".to_string(),
            kind: ReportKind::Final,
            working_days: 23,
            lines: vec![
                PayrollLine {
                    employee_id: Uuid::new_v4(),
                    full_name: "Amy".to_string(),
                    department_name: "Ops".to_string(),
                    day_count: 10,
                    night_count: 0,
                    shift_pay: money("417.39"),
                    service_pay: money("0.00"),
                    total: money("417.39"),
                },
                PayrollLine {
                    employee_id: Uuid::new_v4(),
                    full_name: "Bob".to_string(),
                    department_name: "Support".to_string(),
                    day_count: 5,
                    night_count: 5,
                    shift_pay: money("500.00"),
                    service_pay: money("30.00"),
                    total: money("530.00"),
                },
            ],
            subtotals: vec![
                DepartmentSubtotal {
                    department_name: "Ops".to_string(),
                    day_count: 10,
                    night_count: 0,
                    shift_pay: money("417.39"),
                    service_pay: money("0.00"),
                    total: money("417.39"),
                },
                DepartmentSubtotal {
                    department_name: "Support".to_string(),
                    day_count: 5,
                    night_count: 5,
                    shift_pay: money("500.00"),
                    service_pay: money("30.00"),
                    total: money("530.00"),
                },
            ],
            totals: ReportTotals {
                day_count: 15,
                night_count: 5,
                shift_pay: money("917.39"),
                service_pay: money("30.00"),
                total: money("947.39"),
            },
        };

        let rendered = render_csv(&report).unwrap();
        let expected = "\
Department,Employee,Day shifts,Night shifts,Shift pay,Service pay,Total\n\
Ops,Amy,10,0,417.39,0.00,417.39\n\
Ops,Subtotal,10,0,417.39,0.00,417.39\n\
Support,Bob,5,5,500.00,30.00,530.00\n\
Support,Subtotal,5,5,500.00,30.00,530.00\n\
,Total,15,5,917.39,30.00,947.39\n";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_export_filename_shape() {
        let filename = format!("payroll_{}_{}.csv", ReportKind::Advance, "2024-01".replace('-', "_"));
        assert_eq!(filename, "payroll_advance_2024_01.csv");
    }
}
