use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::AnalyticsSummary;
use crate::database::repositories::{
    AnalyticsRepository, EmployeeRepository, ScheduleRepository, ServiceRepository,
    SettingsRepository,
};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::calendar;
use crate::services::report::{build_report, PayrollReport, ReportKind};

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub month: Option<String>,
    pub kind: Option<String>,
    pub department_id: Option<Uuid>,
}

/// Assembles a payroll report from this month's shifts, service records and
/// calculation settings, then rounds every amount to whole currency units
/// for on-screen use.
pub async fn get_payroll_report(
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
    .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(report.rounded(0))))
}

/// Shared by the JSON report and the CSV export: parse the query, fetch the
/// month's inputs concurrently and run the calculator. Amounts come back
/// unrounded; the caller picks the scale.
pub async fn assemble_report(
    employee_repo: &EmployeeRepository,
    schedule_repo: &ScheduleRepository,
    service_repo: &ServiceRepository,
    settings_repo: &SettingsRepository,
    query: &ReportQuery,
) -> Result<PayrollReport, AppError> {
    let month_start = calendar::parse_month(query.month.as_deref());
    let kind = query
        .kind
        .as_deref()
        .map(str::parse::<ReportKind>)
        .transpose()
        .map_err(AppError::BadRequest)?
        .unwrap_or_default();

    let (employees, shifts, services, quantities, settings) = futures_util::try_join!(
        employee_repo.get_employees(None),
        schedule_repo.get_month_shifts(month_start),
        service_repo.get_services(None),
        service_repo.get_month_quantities(month_start),
        settings_repo.get_settings(),
    )?;

    Ok(build_report(
        &employees,
        month_start,
        kind,
        query.department_id,
        &shifts,
        &services,
        &quantities,
        &settings,
    ))
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub month: Option<String>,
}

/// Month-level pivots: shift-kind counts and service-quantity sums, both
/// grouped by department.
pub async fn get_analytics(
    analytics_repo: web::Data<AnalyticsRepository>,
    query: web::Query<AnalyticsQuery>,
) -> Result<HttpResponse, AppError> {
    let month_start = calendar::parse_month(query.month.as_deref());

    let (shifts, services) = futures_util::try_join!(
        analytics_repo.department_shift_breakdown(month_start),
        analytics_repo.department_service_breakdown(month_start),
    )?;

    let summary = AnalyticsSummary {
        month: calendar::format_month(month_start),
        shifts,
        services,
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(summary)))
}
