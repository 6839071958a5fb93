//! Menu Item Model

use serde::{Deserialize, Serialize};

/// Menu category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum MenuCategory {
    Coffee,
    NonCoffee,
    Food,
    Snack,
    Dessert,
}

impl MenuCategory {
    pub const ALL: [MenuCategory; 5] = [
        Self::Coffee,
        Self::NonCoffee,
        Self::Food,
        Self::Snack,
        Self::Dessert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Coffee => "coffee",
            Self::NonCoffee => "non_coffee",
            Self::Food => "food",
            Self::Snack => "snack",
            Self::Dessert => "dessert",
        }
    }
}

/// Menu item entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub category: MenuCategory,
    pub description: Option<String>,
    pub price: f64,
    /// Unit cost, used for margin reporting
    pub cost: f64,
    /// `None` = stock is not tracked
    pub stock: Option<i64>,
    pub low_stock_threshold: i64,
    pub is_available: bool,
    pub image_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl MenuItem {
    pub fn is_low_stock(&self) -> bool {
        matches!(self.stock, Some(s) if s <= self.low_stock_threshold)
    }
}

/// Create menu item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemCreate {
    pub name: String,
    pub category: MenuCategory,
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub cost: f64,
    pub stock: Option<i64>,
    pub low_stock_threshold: Option<i64>,
    pub is_available: Option<bool>,
    pub image_url: Option<String>,
}

/// Update menu item payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuItemUpdate {
    pub name: Option<String>,
    pub category: Option<MenuCategory>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub cost: Option<f64>,
    pub stock: Option<i64>,
    pub low_stock_threshold: Option<i64>,
    pub is_available: Option<bool>,
    pub image_url: Option<String>,
}

/// Inventory adjustment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAdjust {
    /// Positive to restock, negative for waste/correction
    pub delta: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serde() {
        let json = serde_json::to_string(&MenuCategory::NonCoffee).unwrap();
        assert_eq!(json, "\"non_coffee\"");
        assert_eq!(MenuCategory::NonCoffee.as_str(), "non_coffee");
    }
}
