//! Menu price suggestion
//!
//! ```text
//! weighted  = 1.0·ingredient + 0.6·labor + 0.4·overhead
//! raw       = weighted · category multiplier
//! suggested = clamp(round_to_500(raw), competitor_min·0.9, competitor_max·1.1)
//! ```
//!
//! The competitor ranges are a fixed table of typical Indonesian cafe prices,
//! not live market data.

use serde::{Deserialize, Serialize};
use shared::error::AppError;
use shared::models::MenuCategory;

const INGREDIENT_WEIGHT: f64 = 1.0;
const LABOR_WEIGHT: f64 = 0.6;
const OVERHEAD_WEIGHT: f64 = 0.4;

const ROUNDING_STEP: f64 = 500.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSuggestionRequest {
    pub category: MenuCategory,
    pub ingredient_cost: f64,
    pub labor_cost: f64,
    pub overhead_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSuggestion {
    pub category: MenuCategory,
    pub weighted_cost: f64,
    pub multiplier: f64,
    pub raw_price: f64,
    pub suggested_price: f64,
    pub competitor_min: f64,
    pub competitor_max: f64,
    /// Lowest price the suggestion may take (`competitor_min · 0.9`)
    pub floor: f64,
    /// Highest price the suggestion may take (`competitor_max · 1.1`)
    pub ceiling: f64,
    /// (suggested − total cost) / suggested · 100
    pub margin_percent: f64,
}

pub fn category_multiplier(category: MenuCategory) -> f64 {
    match category {
        MenuCategory::Coffee => 3.0,
        MenuCategory::NonCoffee => 2.6,
        MenuCategory::Food => 2.2,
        MenuCategory::Snack => 2.4,
        MenuCategory::Dessert => 2.5,
    }
}

/// Simulated competitor price range (IDR)
pub fn competitor_range(category: MenuCategory) -> (f64, f64) {
    match category {
        MenuCategory::Coffee => (18_000.0, 45_000.0),
        MenuCategory::NonCoffee => (15_000.0, 40_000.0),
        MenuCategory::Food => (25_000.0, 65_000.0),
        MenuCategory::Snack => (12_000.0, 35_000.0),
        MenuCategory::Dessert => (18_000.0, 45_000.0),
    }
}

/// Nearest multiple of 500, halves rounding up
pub fn round_to_500(value: f64) -> f64 {
    (value / ROUNDING_STEP).round() * ROUNDING_STEP
}

fn validate_cost(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(AppError::validation(format!("{field} must be a positive amount"))
            .with_detail("field", field));
    }
    Ok(())
}

pub fn suggest_price(req: &PriceSuggestionRequest) -> Result<PriceSuggestion, AppError> {
    validate_cost(req.ingredient_cost, "ingredient_cost")?;
    validate_cost(req.labor_cost, "labor_cost")?;
    validate_cost(req.overhead_cost, "overhead_cost")?;

    let weighted_cost = INGREDIENT_WEIGHT * req.ingredient_cost
        + LABOR_WEIGHT * req.labor_cost
        + OVERHEAD_WEIGHT * req.overhead_cost;
    let multiplier = category_multiplier(req.category);
    let raw_price = weighted_cost * multiplier;

    let (competitor_min, competitor_max) = competitor_range(req.category);
    let floor = competitor_min * 0.9;
    let ceiling = competitor_max * 1.1;
    let suggested_price = round_to_500(raw_price).clamp(floor, ceiling);

    let total_cost = req.ingredient_cost + req.labor_cost + req.overhead_cost;
    let margin_percent = ((suggested_price - total_cost) / suggested_price * 100.0 * 10.0).round() / 10.0;

    Ok(PriceSuggestion {
        category: req.category,
        weighted_cost,
        multiplier,
        raw_price,
        suggested_price,
        competitor_min,
        competitor_max,
        floor,
        ceiling,
        margin_percent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(category: MenuCategory, i: f64, l: f64, o: f64) -> PriceSuggestionRequest {
        PriceSuggestionRequest {
            category,
            ingredient_cost: i,
            labor_cost: l,
            overhead_cost: o,
        }
    }

    #[test]
    fn test_coffee_example() {
        // weighted = 6000 + 0.6·2000 + 0.4·1500 = 7800; raw = 23400 → 23500
        let s = suggest_price(&req(MenuCategory::Coffee, 6_000.0, 2_000.0, 1_500.0)).unwrap();
        assert_eq!(s.weighted_cost, 7_800.0);
        assert_eq!(s.raw_price, 23_400.0);
        assert_eq!(s.suggested_price, 23_500.0);
        assert_eq!(s.margin_percent, 59.6);
    }

    #[test]
    fn test_round_to_500() {
        assert_eq!(round_to_500(23_249.0), 23_000.0);
        assert_eq!(round_to_500(23_250.0), 23_500.0);
        assert_eq!(round_to_500(23_751.0), 24_000.0);
    }

    #[test]
    fn test_clamped_to_competitor_band() {
        let cheap = suggest_price(&req(MenuCategory::Snack, 100.0, 10.0, 10.0)).unwrap();
        assert_eq!(cheap.suggested_price, 12_000.0 * 0.9);

        let pricey = suggest_price(&req(MenuCategory::Food, 90_000.0, 5_000.0, 5_000.0)).unwrap();
        assert_eq!(pricey.suggested_price, 65_000.0 * 1.1);
    }

    #[test]
    fn test_always_within_band_for_positive_costs() {
        let costs = [0.01, 1.0, 250.0, 3_333.3, 9_999.0, 20_000.0, 1e7, 1e12];
        for category in MenuCategory::ALL {
            let (min, max) = competitor_range(category);
            for i in costs {
                for l in costs {
                    for o in [0.5, 4_000.0, 1e9] {
                        let s = suggest_price(&req(category, i, l, o)).unwrap();
                        assert!(
                            s.suggested_price >= min * 0.9 && s.suggested_price <= max * 1.1,
                            "{category:?} {i} {l} {o} -> {}",
                            s.suggested_price
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_rejects_bad_costs() {
        assert!(suggest_price(&req(MenuCategory::Coffee, 0.0, 1.0, 1.0)).is_err());
        assert!(suggest_price(&req(MenuCategory::Coffee, 1.0, -1.0, 1.0)).is_err());
        assert!(suggest_price(&req(MenuCategory::Coffee, 1.0, 1.0, f64::INFINITY)).is_err());
    }
}
