pub mod employee;
pub mod schedule;
pub mod service;
pub mod settings;
pub mod stats;

// Re-export all models for easy importing
pub use employee::*;
pub use schedule::*;
pub use service::*;
pub use settings::*;
pub use stats::*;
