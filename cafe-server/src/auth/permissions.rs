//! Permission definitions
//!
//! Roles are fixed: the owner holds `all`, the cashier (`kasir`) gets the
//! counter permissions, staff only use the employee portal (attendance,
//! overtime) which needs no permission beyond being logged in.

use shared::models::EmployeeRole;

pub const ALL: &str = "all";

pub const ORDERS_MANAGE: &str = "orders:manage";
pub const TABLES_READ: &str = "tables:read";
pub const TABLES_MANAGE: &str = "tables:manage";
pub const MENU_READ: &str = "menu:read";
pub const MENU_MANAGE: &str = "menu:manage";
pub const CASH_RECONCILE: &str = "cash:reconcile";
pub const PROMOS_MANAGE: &str = "promos:manage";
pub const EMPLOYEES_MANAGE: &str = "employees:manage";
pub const ATTENDANCE_MANAGE: &str = "attendance:manage";
pub const PAYROLL_MANAGE: &str = "payroll:manage";
pub const SETTINGS_MANAGE: &str = "settings:manage";
pub const REPORTS_VIEW: &str = "reports:view";
pub const PRICING_SUGGEST: &str = "pricing:suggest";

/// Every grantable permission (excluding `all`)
pub const ALL_PERMISSIONS: &[&str] = &[
    ORDERS_MANAGE,
    TABLES_READ,
    TABLES_MANAGE,
    MENU_READ,
    MENU_MANAGE,
    CASH_RECONCILE,
    PROMOS_MANAGE,
    EMPLOYEES_MANAGE,
    ATTENDANCE_MANAGE,
    PAYROLL_MANAGE,
    SETTINGS_MANAGE,
    REPORTS_VIEW,
    PRICING_SUGGEST,
];

pub const DEFAULT_OWNER_PERMISSIONS: &[&str] = &[ALL];

pub const DEFAULT_KASIR_PERMISSIONS: &[&str] =
    &[ORDERS_MANAGE, TABLES_READ, MENU_READ, CASH_RECONCILE];

pub const DEFAULT_STAFF_PERMISSIONS: &[&str] = &[];

/// Permissions carried in the token for a role
pub fn get_default_permissions(role: EmployeeRole) -> Vec<String> {
    let perms = match role {
        EmployeeRole::Owner => DEFAULT_OWNER_PERMISSIONS,
        EmployeeRole::Kasir => DEFAULT_KASIR_PERMISSIONS,
        EmployeeRole::Staff => DEFAULT_STAFF_PERMISSIONS,
    };
    perms.iter().map(|s| s.to_string()).collect()
}
