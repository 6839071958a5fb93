//! Promo discount rules

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{DiscountType, Promo};
use thiserror::Error;

use super::money::{percent_of, round_money, to_decimal};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PromoError {
    #[error("Promo '{0}' is not active")]
    Inactive(String),

    #[error("Promo '{0}' has not started yet")]
    NotStarted(String),

    #[error("Promo '{0}' has expired")]
    Expired(String),

    #[error("Promo '{0}' has reached its usage limit")]
    UsageLimitReached(String),

    #[error("Promo '{code}' needs a minimum order of {min_order}")]
    MinOrderNotMet { code: String, min_order: f64 },
}

impl From<PromoError> for AppError {
    fn from(err: PromoError) -> Self {
        let message = err.to_string();
        let app = AppError::with_message(ErrorCode::PromoNotApplicable, message);
        match err {
            PromoError::MinOrderNotMet { min_order, .. } => app.with_detail("min_order", min_order),
            _ => app,
        }
    }
}

/// Discount granted by `promo` on `subtotal` at time `now`
///
/// Percentage discounts are capped by `max_discount`; every discount is
/// capped at the subtotal. Rounded to whole rupiah.
pub fn promo_discount(promo: &Promo, subtotal: Decimal, now: i64) -> Result<Decimal, PromoError> {
    let code = || promo.code.clone();
    if !promo.is_active {
        return Err(PromoError::Inactive(code()));
    }
    if promo.starts_at.is_some_and(|s| now < s) {
        return Err(PromoError::NotStarted(code()));
    }
    if promo.ends_at.is_some_and(|e| now > e) {
        return Err(PromoError::Expired(code()));
    }
    if promo.usage_limit.is_some_and(|limit| promo.used_count >= limit) {
        return Err(PromoError::UsageLimitReached(code()));
    }
    if subtotal < to_decimal(promo.min_order) {
        return Err(PromoError::MinOrderNotMet {
            code: code(),
            min_order: promo.min_order,
        });
    }

    let mut discount = match promo.discount_type {
        DiscountType::Percentage => {
            let d = percent_of(subtotal, promo.discount_value);
            match promo.max_discount {
                Some(cap) => d.min(to_decimal(cap)),
                None => d,
            }
        }
        DiscountType::Fixed => to_decimal(promo.discount_value),
    };
    discount = discount.max(Decimal::ZERO).min(subtotal);
    Ok(round_money(discount))
}
