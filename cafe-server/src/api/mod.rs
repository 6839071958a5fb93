//! HTTP API
//!
//! Each submodule exposes `router()` and keeps its handlers in `handler.rs`.
//!
//! - [`health`] - liveness and database check
//! - [`auth`] - login, current user
//! - [`public`] - customer QR ordering (no token)
//! - [`events`] - staff change feed (SSE)
//! - [`orders`] - cashier / kitchen order operations
//! - [`attendance`] / [`overtime`] - employee portal, owner review
//! - [`payroll`] / [`pricing`] / [`cash`] - owner tools
//! - [`employees`], [`shift_templates`], [`tables`], [`menu`], [`promos`],
//!   [`settings`], [`stats`] - management

pub mod attendance;
pub mod auth;
pub mod cash;
pub mod employees;
pub mod events;
pub mod health;
pub mod menu;
pub mod orders;
pub mod overtime;
pub mod payroll;
pub mod pricing;
pub mod promos;
pub mod public;
pub mod settings;
pub mod shift_templates;
pub mod stats;
pub mod tables;

pub use crate::utils::{ApiResponse, AppResult};
