use actix_cors::Cors;
use actix_web::{get, middleware::Logger, web, App, HttpResponse, HttpServer, Responder};
use anyhow::Result;

use paysheet::database::{
    init_database,
    repositories::{
        AnalyticsRepository, EmployeeRepository, ScheduleRepository, ServiceRepository,
        SettingsRepository, TemplateRepository,
    },
};
use paysheet::handlers::{admin, export, reports, services, timesheet};
use paysheet::Config;

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("Paysheet API v1.0")
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

#[actix_web::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init();

    println!("🚀 Starting Paysheet API server...");

    // Load configuration
    let config = Config::from_env()?;
    println!(
        "📋 Configuration loaded (environment: {})",
        config.environment
    );

    // Initialize database
    let pool = init_database(&config.database_url).await?;
    println!("✅ Database initialized");

    // Initialize repositories
    let employee_repository = EmployeeRepository::new(pool.clone());
    let schedule_repository = ScheduleRepository::new(pool.clone());
    let service_repository = ServiceRepository::new(pool.clone());
    let settings_repository = SettingsRepository::new(pool.clone());
    let template_repository = TemplateRepository::new(pool.clone());
    let analytics_repository = AnalyticsRepository::new(pool.clone());

    let employee_repo_data = web::Data::new(employee_repository);
    let schedule_repo_data = web::Data::new(schedule_repository);
    let service_repo_data = web::Data::new(service_repository);
    let settings_repo_data = web::Data::new(settings_repository);
    let template_repo_data = web::Data::new(template_repository);
    let analytics_repo_data = web::Data::new(analytics_repository);
    let config_data = web::Data::new(config.clone());

    let server_address = config.server_address();
    println!("🌐 Server starting on http://{}", server_address);

    // Start HTTP server
    HttpServer::new(move || {
        let cors = if config_data.is_development() {
            Cors::permissive()
        } else {
            Cors::default()
                .allowed_origin(&config_data.cors_origin)
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .allowed_headers(vec![
                    "Authorization",
                    "Content-Type",
                    "Accept",
                    "X-Requested-With",
                ])
                .max_age(3600)
        };

        App::new()
            .app_data(employee_repo_data.clone())
            .app_data(schedule_repo_data.clone())
            .app_data(service_repo_data.clone())
            .app_data(settings_repo_data.clone())
            .app_data(template_repo_data.clone())
            .app_data(analytics_repo_data.clone())
            .app_data(config_data.clone())
            .wrap(cors)
            .wrap(Logger::new(
                r#"%a "%r" %s %b "%{Referer}i" "%{User-Agent}i" %T"#,
            ))
            .service(hello)
            .service(health)
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
                            .route(
                                "/records",
                                web::post().to(services::update_service_records),
                            )
                            .route("/{id}", web::put().to(admin::update_service)),
                    )
                    .service(
                        web::scope("/reports")
                            .route("/payroll", web::get().to(reports::get_payroll_report))
                            .route(
                                "/payroll/export",
                                web::get().to(export::export_payroll_csv),
                            ),
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
            )
    })
    .bind(&server_address)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
