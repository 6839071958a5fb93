//! Payment Transaction Model

use serde::{Deserialize, Serialize};

use super::order::PaymentMethod;

/// Review state of a single payment attempt
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum TransactionStatus {
    Pending,
    Verified,
    Rejected,
}

/// One payment attempt against an order
///
/// QRIS/transfer attempts carry a proof image; cash attempts record the
/// amount handed over and the change returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PaymentTransaction {
    pub id: i64,
    pub order_id: i64,
    pub method: PaymentMethod,
    pub amount: f64,
    pub status: TransactionStatus,
    /// Path relative to the upload directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_path: Option<String>,
    pub amount_received: Option<f64>,
    pub change_amount: Option<f64>,
    pub verified_by: Option<i64>,
    pub verified_at: Option<i64>,
    pub rejection_reason: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}
