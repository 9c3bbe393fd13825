use actix_web::web;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use paysheet::database::repositories::{
    AnalyticsRepository, EmployeeRepository, ScheduleRepository, ServiceRepository,
    SettingsRepository, TemplateRepository,
};
use paysheet::handlers::{admin, export, reports, services, timesheet};

/// Pool that never opens a connection. The tests in this directory exercise
/// the request-validation paths that reject bad input before any query
/// runs, so no live database is needed.
pub fn lazy_pool() -> PgPool {
    PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy("postgres://paysheet@127.0.0.1:5432/paysheet_test")
        .expect("valid database url")
}

/// Registers repositories and the `/api/v1` routes the way `main.rs` does,
/// so `App::new().configure(common::configure)` is the production routing.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let pool = lazy_pool();

    cfg.app_data(web::Data::new(EmployeeRepository::new(pool.clone())))
        .app_data(web::Data::new(ScheduleRepository::new(pool.clone())))
        .app_data(web::Data::new(ServiceRepository::new(pool.clone())))
        .app_data(web::Data::new(SettingsRepository::new(pool.clone())))
        .app_data(web::Data::new(TemplateRepository::new(pool.clone())))
        .app_data(web::Data::new(AnalyticsRepository::new(pool)))
        .service(
            web::scope("/api/v1")
                .service(
                    web::scope("/timesheet")
                        .route("", web::get().to(timesheet::get_timesheet))
                        .route("/shifts", web::post().to(timesheet::update_shifts))
                        .route("/apply-range", web::post().to(timesheet::apply_range)),
                )
                .service(
                    web::scope("/services")
                        .route("", web::get().to(services::get_services_grid))
                        .route("", web::post().to(admin::create_service))
                        .route("/records", web::post().to(services::update_service_records))
                        .route("/{id}", web::put().to(admin::update_service)),
                )
                .service(
                    web::scope("/reports")
                        .route("/payroll", web::get().to(reports::get_payroll_report))
                        .route("/payroll/export", web::get().to(export::export_payroll_csv)),
                )
                .route("/analytics", web::get().to(reports::get_analytics))
                .service(
                    web::scope("/settings")
                        .route("", web::get().to(admin::get_settings))
                        .route("", web::put().to(admin::update_settings)),
                )
                .service(
                    web::scope("/employees")
                        .route("", web::get().to(admin::get_employees))
                        .route("", web::post().to(admin::create_employee))
                        .route("/{id}", web::put().to(admin::update_employee))
                        .route("/{id}", web::delete().to(admin::delete_employee)),
                )
                .route("/departments", web::get().to(admin::get_departments))
                .route("/positions", web::get().to(admin::get_positions))
                .service(
                    web::scope("/templates")
                        .route("", web::get().to(admin::get_templates))
                        .route("", web::post().to(admin::create_template)),
                ),
        );
}

/// Asserts the envelope says `success: false` with a message containing
/// `needle`, and returns the message for further checks.
pub fn assert_error_message(body: &serde_json::Value, needle: &str) -> String {
    assert_eq!(
        body["success"],
        serde_json::Value::Bool(false),
        "expected an error envelope, got: {}",
        body
    );
    let message = body["message"]
        .as_str()
        .unwrap_or_else(|| panic!("error envelope without message: {}", body))
        .to_string();
    assert!(
        message.contains(needle),
        "expected message containing {:?}, got {:?}",
        needle,
        message
    );
    message
}
