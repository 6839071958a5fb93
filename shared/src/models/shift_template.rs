//! Shift Template Model

use serde::{Deserialize, Serialize};

/// Shift template entity
///
/// `start_time`/`end_time` are `HH:MM`. A shift whose end is not after its
/// start runs past midnight.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ShiftTemplate {
    pub id: i64,
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    /// ISO weekdays, comma separated ("1,2,3,4,5" = Monday..Friday)
    pub work_days: String,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ShiftTemplate {
    /// Parsed ISO weekday numbers (1 = Monday .. 7 = Sunday)
    pub fn work_day_numbers(&self) -> Vec<u32> {
        parse_work_days(&self.work_days)
    }
}

/// Parse a "1,2,3" weekday list, ignoring anything outside 1..=7
pub fn parse_work_days(raw: &str) -> Vec<u32> {
    let mut days: Vec<u32> = raw
        .split(',')
        .filter_map(|d| d.trim().parse::<u32>().ok())
        .filter(|d| (1..=7).contains(d))
        .collect();
    days.sort_unstable();
    days.dedup();
    days
}

/// Create shift template payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftTemplateCreate {
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    pub work_days: Option<String>,
}

/// Update shift template payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShiftTemplateUpdate {
    pub name: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub work_days: Option<String>,
    pub is_active: Option<bool>,
}
