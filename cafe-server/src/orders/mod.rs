//! Orders: pricing a cart, the lifecycle state machine and the service that
//! persists both

pub mod checkout;
pub mod lifecycle;
pub mod service;

pub use checkout::{MAX_LINE_QUANTITY, quote};
pub use lifecycle::{LifecycleError, OrderCommand, TableEffect, Transition, apply};
