//! Employee Model

use serde::{Deserialize, Serialize};

/// Employee role
///
/// `kasir` is the cashier role: it can verify payments and drive the
/// kitchen flow but cannot manage the business.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum EmployeeRole {
    Owner,
    Kasir,
    Staff,
}

impl EmployeeRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Kasir => "kasir",
            Self::Staff => "staff",
        }
    }
}

impl std::str::FromStr for EmployeeRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Self::Owner),
            "kasir" => Ok(Self::Kasir),
            "staff" => Ok(Self::Staff),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Employee entity
///
/// The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Employee {
    pub id: i64,
    pub username: String,
    #[serde(skip)]
    pub password_hash: String,
    pub full_name: String,
    pub role: EmployeeRole,
    pub phone: Option<String>,
    /// Monthly basic salary
    pub basic_salary: f64,
    /// Pay per overtime hour
    pub overtime_rate: f64,
    pub shift_template_id: Option<i64>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create employee payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeCreate {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub role: EmployeeRole,
    pub phone: Option<String>,
    #[serde(default)]
    pub basic_salary: f64,
    #[serde(default)]
    pub overtime_rate: f64,
    pub shift_template_id: Option<i64>,
}

/// Update employee payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeUpdate {
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<EmployeeRole>,
    pub phone: Option<String>,
    pub basic_salary: Option<f64>,
    pub overtime_rate: Option<f64>,
    pub shift_template_id: Option<i64>,
    pub is_active: Option<bool>,
}
