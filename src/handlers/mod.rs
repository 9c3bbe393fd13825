pub mod admin;
pub mod export;
pub mod reports;
pub mod services;
pub mod shared;
pub mod timesheet;
