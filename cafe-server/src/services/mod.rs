//! Services
//!
//! - [`ProofStorage`] - payment proof images on disk

pub mod proof_storage;

pub use proof_storage::ProofStorage;
