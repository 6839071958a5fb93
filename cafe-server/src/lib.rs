//! Cafe Server - QR table ordering, payments and workforce backend
//!
//! # Module layout
//!
//! ```text
//! cafe-server/src/
//! ├── core/         # config, state, server, startup errors
//! ├── auth/         # JWT, argon2 passwords, permissions, middleware
//! ├── db/           # SQLite pool, migrations, repositories
//! ├── orders/       # order lifecycle state machine, checkout
//! ├── attendance/   # geofence and work-time arithmetic
//! ├── payroll/      # monthly payroll calculator
//! ├── pricing/      # money helpers, promo discounts, price suggestion
//! ├── cash.rs       # cash drawer reconciliation
//! ├── events/       # in-process change feed (SSE)
//! ├── services/     # payment proof storage
//! ├── api/          # HTTP routers and handlers
//! ├── routes/       # router assembly and tower layers
//! ├── middleware/   # request logging
//! └── utils/        # logging, time, validation, error helpers
//! ```

pub mod api;
pub mod attendance;
pub mod auth;
pub mod cash;
pub mod core;
pub mod db;
pub mod events;
pub mod middleware;
pub mod orders;
pub mod payroll;
pub mod pricing;
pub mod routes;
pub mod services;
pub mod utils;

pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

pub use utils::logger::init_logger_with_file;

// Security logging macro - supports tracing format specifiers
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Load `.env`, then initialise logging from the environment
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_json = std::env::var("LOG_JSON")
        .ok()
        .and_then(|v| v.parse::<bool>().ok());
    let log_dir = std::env::var("LOG_DIR").ok();
    if let Some(dir) = &log_dir {
        std::fs::create_dir_all(dir)?;
    }

    init_logger_with_file(log_level.as_deref(), log_json, log_dir.as_deref());
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   ______       ____
  / ____/___ _ / __/__
 / /   / __ `// /_/ _ \
/ /___/ /_/ // __/  __/
\____/\__,_//_/  \___/   server
    "#
    );
}
