//! Promo Model

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum DiscountType {
    /// `discount_value` is a percentage (10 = 10%)
    Percentage,
    /// `discount_value` is an absolute amount
    Fixed,
}

/// Promo code entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Promo {
    pub id: i64,
    /// Always stored upper-cased
    pub code: String,
    pub name: String,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    pub min_order: f64,
    /// Cap for percentage discounts
    pub max_discount: Option<f64>,
    pub starts_at: Option<i64>,
    pub ends_at: Option<i64>,
    pub usage_limit: Option<i64>,
    pub used_count: i64,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create promo payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoCreate {
    pub code: String,
    pub name: String,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    #[serde(default)]
    pub min_order: f64,
    pub max_discount: Option<f64>,
    pub starts_at: Option<i64>,
    pub ends_at: Option<i64>,
    pub usage_limit: Option<i64>,
    pub is_active: Option<bool>,
}

/// Update promo payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromoUpdate {
    pub name: Option<String>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<f64>,
    pub min_order: Option<f64>,
    pub max_discount: Option<f64>,
    pub starts_at: Option<i64>,
    pub ends_at: Option<i64>,
    pub usage_limit: Option<i64>,
    pub is_active: Option<bool>,
}
