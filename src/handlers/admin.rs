use actix_web::{web, HttpResponse, Result};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{CalcSettings, EmployeeInput, ServiceInput, TemplateInput};
use crate::database::repositories::{
    EmployeeRepository, ServiceRepository, SettingsRepository, TemplateRepository,
};
use crate::handlers::shared::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct EmployeeListQuery {
    pub department_id: Option<Uuid>,
}

pub async fn get_employees(
    employee_repo: web::Data<EmployeeRepository>,
    query: web::Query<EmployeeListQuery>,
) -> Result<HttpResponse> {
    match employee_repo.get_employees(query.department_id).await {
        Ok(employees) => Ok(HttpResponse::Ok().json(ApiResponse::success(employees))),
        Err(err) => {
            log::error!("Error fetching employees: {}", err);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to fetch employees")))
        }
    }
}

pub async fn create_employee(
    employee_repo: web::Data<EmployeeRepository>,
    input: web::Json<EmployeeInput>,
) -> Result<HttpResponse> {
    let input = input.into_inner();
    if let Some(response) = reject_invalid_employee(&employee_repo, &input).await {
        return Ok(response);
    }

    match employee_repo.create_employee(input).await {
        Ok(employee) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success_message(employee, "Employee created")))
        }
        Err(err) => {
            log::error!("Error creating employee: {}", err);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to create employee")))
        }
    }
}

pub async fn update_employee(
    employee_repo: web::Data<EmployeeRepository>,
    path: web::Path<Uuid>,
    input: web::Json<EmployeeInput>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let input = input.into_inner();
    if let Some(response) = reject_invalid_employee(&employee_repo, &input).await {
        return Ok(response);
    }

    match employee_repo.update_employee(id, input).await {
        Ok(Some(employee)) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success_message(employee, "Employee updated")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error("Employee not found"))),
        Err(err) => {
            log::error!("Error updating employee {}: {}", id, err);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to update employee")))
        }
    }
}

pub async fn delete_employee(
    employee_repo: web::Data<EmployeeRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    match employee_repo.delete_employee(id).await {
        Ok(true) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success_message((), "Employee deleted")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error("Employee not found"))),
        Err(err) => {
            log::error!("Error deleting employee {}: {}", id, err);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to delete employee")))
        }
    }
}

/// Field validation plus referential checks shared by create and update;
/// `Some(response)` is the 400/500 to return as-is.
async fn reject_invalid_employee(
    employee_repo: &EmployeeRepository,
    input: &EmployeeInput,
) -> Option<HttpResponse> {
    if let Err(message) = input.validate() {
        return Some(HttpResponse::BadRequest().json(ApiResponse::error(message)));
    }

    let checked = futures_util::try_join!(
        employee_repo.department_exists(input.department_id),
        employee_repo.position_exists(input.position_id),
    );
    match checked {
        Ok((true, true)) => None,
        Ok((false, _)) => Some(HttpResponse::BadRequest().json(ApiResponse::error(format!(
            "Unknown department: {}",
            input.department_id
        )))),
        Ok((true, false)) => Some(HttpResponse::BadRequest().json(ApiResponse::error(format!(
            "Unknown position: {}",
            input.position_id
        )))),
        Err(err) => {
            log::error!("Error validating employee input: {}", err);
            Some(
                HttpResponse::InternalServerError()
                    .json(ApiResponse::error("Failed to validate employee")),
            )
        }
    }
}

pub async fn get_departments(employee_repo: web::Data<EmployeeRepository>) -> Result<HttpResponse> {
    match employee_repo.get_departments().await {
        Ok(departments) => Ok(HttpResponse::Ok().json(ApiResponse::success(departments))),
        Err(err) => {
            log::error!("Error fetching departments: {}", err);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to fetch departments")))
        }
    }
}

pub async fn get_positions(employee_repo: web::Data<EmployeeRepository>) -> Result<HttpResponse> {
    match employee_repo.get_positions().await {
        Ok(positions) => Ok(HttpResponse::Ok().json(ApiResponse::success(positions))),
        Err(err) => {
            log::error!("Error fetching positions: {}", err);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to fetch positions")))
        }
    }
}

pub async fn create_service(
    service_repo: web::Data<ServiceRepository>,
    input: web::Json<ServiceInput>,
) -> Result<HttpResponse> {
    let input = input.into_inner();
    if let Err(message) = input.validate() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error(message)));
    }

    match service_repo.create_service(input).await {
        Ok(service) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success_message(service, "Service created")))
        }
        Err(err) => {
            log::error!("Error creating service: {}", err);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to create service")))
        }
    }
}

pub async fn update_service(
    service_repo: web::Data<ServiceRepository>,
    path: web::Path<Uuid>,
    input: web::Json<ServiceInput>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let input = input.into_inner();
    if let Err(message) = input.validate() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error(message)));
    }

    match service_repo.update_service(id, input).await {
        Ok(Some(service)) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success_message(service, "Service updated")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error("Service not found"))),
        Err(err) => {
            log::error!("Error updating service {}: {}", id, err);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to update service")))
        }
    }
}

pub async fn get_templates(template_repo: web::Data<TemplateRepository>) -> Result<HttpResponse> {
    match template_repo.get_templates().await {
        Ok(templates) => Ok(HttpResponse::Ok().json(ApiResponse::success(templates))),
        Err(err) => {
            log::error!("Error fetching templates: {}", err);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to fetch templates")))
        }
    }
}

pub async fn create_template(
    template_repo: web::Data<TemplateRepository>,
    input: web::Json<TemplateInput>,
) -> Result<HttpResponse> {
    let input = input.into_inner();
    if input.name.trim().is_empty() {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error("Template name must not be empty")));
    }
    if input.sequence.is_empty() {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error("Template sequence must not be empty")));
    }

    match template_repo.create_template(input).await {
        Ok(template) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success_message(template, "Template created")))
        }
        Err(err) => {
            log::error!("Error creating template: {}", err);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to create template")))
        }
    }
}

pub async fn get_settings(settings_repo: web::Data<SettingsRepository>) -> Result<HttpResponse> {
    match settings_repo.get_settings().await {
        Ok(settings) => Ok(HttpResponse::Ok().json(ApiResponse::success(settings))),
        Err(err) => {
            log::error!("Error fetching settings: {}", err);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to fetch settings")))
        }
    }
}

pub async fn update_settings(
    settings_repo: web::Data<SettingsRepository>,
    input: web::Json<CalcSettings>,
) -> Result<HttpResponse> {
    let input = input.into_inner();
    if let Err(message) = input.validate() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error(message)));
    }

    match settings_repo.update_settings(&input).await {
        Ok(settings) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success_message(settings, "Settings updated")))
        }
        Err(err) => {
            log::error!("Error updating settings: {}", err);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::error("Failed to update settings")))
        }
    }
}
