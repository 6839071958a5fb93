//! Payroll Model

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum PayrollStatus {
    Draft,
    Paid,
}

/// Monthly payroll record for one employee
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Payroll {
    pub id: i64,
    pub employee_id: i64,
    /// `YYYY-MM`
    pub period: String,
    pub basic_salary: f64,
    pub overtime_hours: f64,
    pub overtime_pay: f64,
    pub late_days: i64,
    pub absent_days: i64,
    pub late_deduction: f64,
    pub absence_deduction: f64,
    pub gross: f64,
    pub deductions: f64,
    /// May be negative when deductions exceed gross
    pub net: f64,
    pub status: PayrollStatus,
    pub paid_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollGenerate {
    pub period: String,
}
