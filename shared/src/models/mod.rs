//! Data models
//!
//! Shared between cafe-server and the web clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` snowflakes, timestamps are Unix millis.

pub mod attendance;
pub mod dining_table;
pub mod employee;
pub mod menu_item;
pub mod order;
pub mod overtime;
pub mod payment;
pub mod payroll;
pub mod promo;
pub mod shift_template;
pub mod system_settings;

// Re-exports
pub use attendance::*;
pub use dining_table::*;
pub use employee::*;
pub use menu_item::*;
pub use order::*;
pub use overtime::*;
pub use payment::*;
pub use payroll::*;
pub use promo::*;
pub use shift_template::*;
pub use system_settings::*;
