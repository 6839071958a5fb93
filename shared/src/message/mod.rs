//! Realtime change notifications
//!
//! Every mutation on the server publishes a [`SyncPayload`] on the in-process
//! event bus. Staff screens and the customer order tracker receive these over
//! Server-Sent Events and refetch (or patch) the affected resource.

use serde::{Deserialize, Serialize};

/// Resource names used in [`SyncPayload::resource`]
pub mod resource {
    pub const ORDER: &str = "order";
    pub const TABLE: &str = "table";
    pub const MENU_ITEM: &str = "menu_item";
    pub const PROMO: &str = "promo";
    pub const EMPLOYEE: &str = "employee";
    pub const SHIFT_TEMPLATE: &str = "shift_template";
    pub const ATTENDANCE: &str = "attendance";
    pub const OVERTIME: &str = "overtime";
    pub const PAYROLL: &str = "payroll";
    pub const SETTINGS: &str = "settings";
}

/// Change actions used in [`SyncPayload::action`]
pub mod action {
    pub const CREATED: &str = "created";
    pub const UPDATED: &str = "updated";
    pub const DELETED: &str = "deleted";
}

/// A single change notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncPayload {
    /// Resource type (e.g. "order", "table", "menu_item")
    pub resource: String,
    /// Per-resource version; clients refetch everything when they notice a gap
    pub version: u64,
    /// "created", "updated" or "deleted"
    pub action: String,
    /// Id of the changed entity
    pub id: String,
    /// Entity snapshot (absent for deletes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl SyncPayload {
    /// SSE event name: `<resource>.<action>`
    pub fn event_name(&self) -> String {
        format!("{}.{}", self.resource, self.action)
    }
}
