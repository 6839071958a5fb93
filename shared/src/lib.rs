//! Shared types for the cafe platform
//!
//! Domain models, the unified error system, realtime payloads and small
//! utilities used by cafe-server and its tests.

pub mod error;
pub mod message;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use message::SyncPayload;
