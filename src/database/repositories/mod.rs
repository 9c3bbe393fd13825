pub mod analytics;
pub mod employee;
pub mod schedule;
pub mod service;
pub mod settings;
pub mod template;

// Re-export all repositories for easy importing
pub use analytics::AnalyticsRepository;
pub use employee::EmployeeRepository;
pub use schedule::ScheduleRepository;
pub use service::ServiceRepository;
pub use settings::SettingsRepository;
pub use template::TemplateRepository;
