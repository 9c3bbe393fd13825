pub mod calendar;
pub mod payroll;
pub mod report;

pub use report::{DepartmentSubtotal, PayrollLine, PayrollReport, ReportKind, ReportTotals};
