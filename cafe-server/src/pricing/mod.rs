//! Pricing: money math, promo discounts, menu price suggestion

pub mod money;
pub mod promo;
pub mod suggestion;

pub use promo::{PromoError, promo_discount};
pub use suggestion::{PriceSuggestion, PriceSuggestionRequest, suggest_price};
