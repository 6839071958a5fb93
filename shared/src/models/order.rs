//! Order Model
//!
//! Customer orders placed from a table QR code, their line items and the
//! checkout/quote payloads used by the customer app.

use serde::{Deserialize, Serialize};

use super::payment::PaymentTransaction;

/// Kitchen/service status of an order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Served,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Served => "served",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// The next step of the kitchen flow, if any
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Confirmed),
            Self::Confirmed => Some(Self::Preparing),
            Self::Preparing => Some(Self::Ready),
            Self::Ready => Some(Self::Served),
            Self::Served => Some(Self::Completed),
            Self::Completed | Self::Cancelled => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment progress of an order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum PaymentStatus {
    Unpaid,
    AwaitingVerification,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::AwaitingVerification => "awaiting_verification",
            Self::Paid => "paid",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment methods accepted at the counter
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum PaymentMethod {
    Cash,
    Qris,
    Transfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Qris => "qris",
            Self::Transfer => "transfer",
        }
    }

    /// QRIS and bank transfer are verified against an uploaded proof image
    pub fn requires_proof(&self) -> bool {
        matches!(self, Self::Qris | Self::Transfer)
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    /// Human readable number, e.g. `ORD-20250101-0007`
    pub order_number: String,
    pub table_id: i64,
    pub customer_name: String,
    pub notes: Option<String>,
    pub status: OrderStatus,
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: PaymentStatus,
    pub subtotal: f64,
    pub discount: f64,
    pub tax: f64,
    pub service_charge: f64,
    pub total: f64,
    pub promo_id: Option<i64>,
    pub promo_code: Option<String>,
    pub created_at: i64,
    pub confirmed_at: Option<i64>,
    pub paid_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub cancelled_at: Option<i64>,
    pub cancel_reason: Option<String>,
    pub updated_at: i64,
}

/// Order line item (name and price are snapshotted at checkout)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub menu_item_id: i64,
    pub name: String,
    pub unit_price: f64,
    pub quantity: i64,
    pub line_total: f64,
    pub notes: Option<String>,
}

/// Order with its items and most recent payment transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub table_number: Option<String>,
    pub latest_payment: Option<PaymentTransaction>,
}

/// One cart line submitted by the customer app
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub menu_item_id: i64,
    pub quantity: i64,
    pub notes: Option<String>,
}

/// Quote request (cart preview, nothing is persisted)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub items: Vec<CartLine>,
    pub promo_code: Option<String>,
}

/// Priced cart line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuoteLine {
    pub menu_item_id: i64,
    pub name: String,
    pub unit_price: f64,
    pub quantity: i64,
    pub line_total: f64,
    pub notes: Option<String>,
}

/// Priced cart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderQuote {
    pub lines: Vec<QuoteLine>,
    pub subtotal: f64,
    pub discount: f64,
    pub tax: f64,
    pub service_charge: f64,
    pub total: f64,
    pub promo_code: Option<String>,
}

/// Checkout payload from the customer app
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub qr_code: String,
    pub customer_name: String,
    pub notes: Option<String>,
    pub items: Vec<CartLine>,
    pub promo_code: Option<String>,
}

/// Customer selects (or changes) how they will pay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectPaymentMethodRequest {
    pub method: PaymentMethod,
}

/// Cashier verification payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyPaymentRequest {
    pub amount_received: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RejectPaymentRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CancelOrderRequest {
    pub reason: Option<String>,
}
