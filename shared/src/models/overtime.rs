//! Overtime Request Model

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum OvertimeStatus {
    Pending,
    Approved,
    Rejected,
}

/// Overtime request entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OvertimeRequest {
    pub id: i64,
    pub employee_id: i64,
    pub work_date: String,
    pub hours: f64,
    pub reason: String,
    pub status: OvertimeStatus,
    pub reviewed_by: Option<i64>,
    pub reviewed_at: Option<i64>,
    pub review_note: Option<String>,
    pub created_at: i64,
}

/// Employee submits an overtime request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OvertimeCreate {
    pub work_date: String,
    pub hours: f64,
    pub reason: String,
}

/// Owner approves or rejects
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OvertimeReview {
    pub note: Option<String>,
}
