use std::collections::HashSet;

use actix_web::{web, HttpResponse, Result};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{ServiceRecordBatchInput, ServicesGrid, ServicesGridRow};
use crate::database::repositories::{EmployeeRepository, ServiceRepository};
use crate::handlers::shared::{ApiResponse, BatchOutcome};
use crate::services::calendar;

#[derive(Debug, Deserialize)]
pub struct ServicesQuery {
    pub month: Option<String>,
    pub salary_based: Option<bool>,
}

/// Per-month service quantities: the service catalog (optionally narrowed to
/// one side of the salary-based partition) plus one row per employee with
/// whatever quantities are on record. Which columns apply to which row is
/// the client's concern; salary-based employees only accrue salary-based
/// services and vice versa.
pub async fn get_services_grid(
    employee_repo: web::Data<EmployeeRepository>,
    service_repo: web::Data<ServiceRepository>,
    query: web::Query<ServicesQuery>,
) -> Result<HttpResponse> {
    let month_start = calendar::parse_month(query.month.as_deref());

    let fetched = futures_util::try_join!(
        employee_repo.get_employees(None),
        service_repo.get_services(query.salary_based),
        service_repo.get_month_quantities(month_start),
    );
    match fetched {
        Ok((employees, services, mut quantities)) => {
            let rows = employees
                .into_iter()
                .map(|employee| ServicesGridRow {
                    employee_id: employee.id,
                    full_name: employee.full_name,
                    department_name: employee.department_name,
                    quantities: quantities.remove(&employee.id).unwrap_or_default(),
                })
                .collect();

            let grid = ServicesGrid {
                month: calendar::format_month(month_start),
                services,
                rows,
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success(grid)))
        }
        Err(err) => {
            log::error!("Error loading services grid: {}", err);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to load services grid")))
        }
    }
}

/// Batch upsert of monthly service quantities. Validated as a whole before
/// the first write: unknown employee, unknown service or negative quantity
/// rejects the batch untouched. Quantity 0 deletes the record.
pub async fn update_service_records(
    employee_repo: web::Data<EmployeeRepository>,
    service_repo: web::Data<ServiceRepository>,
    input: web::Json<ServiceRecordBatchInput>,
) -> Result<HttpResponse> {
    let input = input.into_inner();
    let month_start = calendar::parse_month(input.month.as_deref());

    if input.entries.is_empty() {
        return Ok(HttpResponse::Ok()
            .json(ApiResponse::success(BatchOutcome { applied: 0, total: 0 })));
    }
    if let Some(entry) = input.entries.iter().find(|entry| entry.quantity < 0) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error(format!(
            "Negative quantity {} for service {}",
            entry.quantity, entry.service_id
        ))));
    }

    let employee_ids = dedup_ids(input.entries.iter().map(|e| e.employee_id));
    let service_ids = dedup_ids(input.entries.iter().map(|e| e.service_id));

    let checked = futures_util::try_join!(
        employee_repo.existing_employee_ids(employee_ids.clone()),
        service_repo.existing_service_ids(service_ids.clone()),
    );
    let (known_employees, known_services) = match checked {
        Ok((employees, services)) => (
            employees.into_iter().collect::<HashSet<Uuid>>(),
            services.into_iter().collect::<HashSet<Uuid>>(),
        ),
        Err(err) => {
            log::error!("Error validating service records: {}", err);
            return Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to validate batch")));
        }
    };
    if let Some(missing) = employee_ids.iter().find(|id| !known_employees.contains(id)) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error(format!("Unknown employee: {}", missing))));
    }
    if let Some(missing) = service_ids.iter().find(|id| !known_services.contains(id)) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error(format!("Unknown service: {}", missing))));
    }

    let total = input.entries.len();
    let mut applied = 0usize;
    for entry in &input.entries {
        let result = if entry.quantity == 0 {
            service_repo
                .delete_record(entry.employee_id, entry.service_id, month_start)
                .await
        } else {
            service_repo
                .upsert_record(entry.employee_id, entry.service_id, month_start, entry.quantity)
                .await
        };
        if let Err(err) = result {
            log::error!(
                "Service record batch stopped after {} of {} entries: {}",
                applied,
                total,
                err
            );
            return Ok(HttpResponse::InternalServerError().json(ApiResponse::error_with_data(
                BatchOutcome { applied, total },
                "Batch stopped by a storage failure; entries already applied were kept",
            )));
        }
        applied += 1;
    }
    Ok(HttpResponse::Ok().json(ApiResponse::success(BatchOutcome { applied, total })))
}

fn dedup_ids(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = ids.collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}
