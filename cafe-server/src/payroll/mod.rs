//! Monthly payroll

pub mod calculator;
pub mod service;

pub use calculator::{DEFAULT_WORK_DAYS, PayrollBreakdown, PayrollInput, calculate};
pub use service::{PayrollRun, generate, pay};
