//! Attendance Model

use serde::{Deserialize, Serialize};

/// One attendance row per employee per business date
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Attendance {
    pub id: i64,
    pub employee_id: i64,
    /// Business date `YYYY-MM-DD`
    pub work_date: String,
    pub clock_in_at: i64,
    pub clock_in_lat: f64,
    pub clock_in_lng: f64,
    pub clock_in_distance_m: f64,
    pub clock_out_at: Option<i64>,
    pub clock_out_lat: Option<f64>,
    pub clock_out_lng: Option<f64>,
    pub clock_out_distance_m: Option<f64>,
    pub scheduled_minutes: i64,
    pub worked_minutes: Option<i64>,
    pub overtime_minutes: Option<i64>,
    pub is_late: bool,
    pub late_minutes: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Attendance row joined with the employee's display name (owner views)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AttendanceWithEmployee {
    #[serde(flatten)]
    #[cfg_attr(feature = "db", sqlx(flatten))]
    pub attendance: Attendance,
    pub employee_name: String,
}

/// GPS fix sent with clock-in / clock-out
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClockRequest {
    pub latitude: f64,
    pub longitude: f64,
}
