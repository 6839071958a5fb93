//! Cart pricing
//!
//! [`quote`] is pure so the public preview and checkout share one
//! calculation. Totals:
//!
//! ```text
//! subtotal = Σ unit_price · quantity
//! taxable  = subtotal − discount
//! tax      = taxable · tax%
//! service  = taxable · service%
//! total    = taxable + tax + service
//! ```

use std::collections::HashMap;

use rust_decimal::Decimal;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{CartLine, MenuItem, OrderQuote, Promo, QuoteLine, SystemSettings};

use crate::pricing::money::{percent_of, round_money, to_decimal, to_f64};
use crate::pricing::promo_discount;
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};

pub const MAX_LINE_QUANTITY: i64 = 99;
pub const MAX_CART_LINES: usize = 50;

/// Total quantity per menu item across all cart lines
pub fn quantities_by_item(lines: &[CartLine]) -> HashMap<i64, i64> {
    let mut totals = HashMap::new();
    for line in lines {
        *totals.entry(line.menu_item_id).or_insert(0) += line.quantity;
    }
    totals
}

fn validate_lines(lines: &[CartLine]) -> AppResult<()> {
    if lines.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }
    if lines.len() > MAX_CART_LINES {
        return Err(AppError::validation(format!(
            "A cart holds at most {MAX_CART_LINES} lines"
        )));
    }
    for line in lines {
        if !(1..=MAX_LINE_QUANTITY).contains(&line.quantity) {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                format!("Quantity must be between 1 and {MAX_LINE_QUANTITY}"),
            )
            .with_detail("menu_item_id", line.menu_item_id)
            .with_detail("quantity", line.quantity));
        }
        validate_optional_text(&line.notes, "notes", MAX_NOTE_LEN)?;
    }
    Ok(())
}

/// Price `lines` against the current menu, promo and settings
///
/// `menu` must contain every item the cart references; missing ones are
/// reported as not found. Tracked stock is checked against the summed
/// quantity of all lines for the same item.
pub fn quote(
    lines: &[CartLine],
    menu: &[MenuItem],
    promo: Option<&Promo>,
    settings: &SystemSettings,
    now: i64,
) -> AppResult<OrderQuote> {
    validate_lines(lines)?;

    let by_id: HashMap<i64, &MenuItem> = menu.iter().map(|m| (m.id, m)).collect();

    for (item_id, wanted) in quantities_by_item(lines) {
        let item = by_id.get(&item_id).ok_or_else(|| {
            AppError::with_message(ErrorCode::MenuItemNotFound, format!("Menu item {item_id} not found"))
                .with_detail("menu_item_id", item_id)
        })?;
        if !item.is_available {
            return Err(AppError::with_message(
                ErrorCode::MenuItemUnavailable,
                format!("{} is not available", item.name),
            )
            .with_detail("menu_item_id", item_id));
        }
        if let Some(stock) = item.stock.filter(|s| *s < wanted) {
            return Err(AppError::with_message(
                ErrorCode::MenuItemOutOfStock,
                format!("Only {stock} {} left", item.name),
            )
            .with_detail("menu_item_id", item_id)
            .with_detail("available", stock)
            .with_detail("requested", wanted));
        }
    }

    let mut subtotal = Decimal::ZERO;
    let mut priced = Vec::with_capacity(lines.len());
    for line in lines {
        // presence checked above
        let Some(item) = by_id.get(&line.menu_item_id) else {
            continue;
        };
        let line_total = round_money(to_decimal(item.price) * Decimal::from(line.quantity));
        subtotal += line_total;
        priced.push(QuoteLine {
            menu_item_id: item.id,
            name: item.name.clone(),
            unit_price: item.price,
            quantity: line.quantity,
            line_total: to_f64(line_total),
            notes: line.notes.clone(),
        });
    }

    let discount = match promo {
        Some(p) => promo_discount(p, subtotal, now)?,
        None => Decimal::ZERO,
    };
    let taxable = subtotal - discount;
    let tax = round_money(percent_of(taxable, settings.tax_percent));
    let service_charge = round_money(percent_of(taxable, settings.service_charge_percent));
    let total = taxable + tax + service_charge;

    Ok(OrderQuote {
        lines: priced,
        subtotal: to_f64(subtotal),
        discount: to_f64(discount),
        tax: to_f64(tax),
        service_charge: to_f64(service_charge),
        total: to_f64(total),
        promo_code: promo.map(|p| p.code.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{DiscountType, MenuCategory};

    fn item(id: i64, price: f64, stock: Option<i64>) -> MenuItem {
        MenuItem {
            id,
            name: format!("Item {id}"),
            category: MenuCategory::Coffee,
            description: None,
            price,
            cost: 0.0,
            stock,
            low_stock_threshold: 5,
            is_available: true,
            image_url: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn settings(tax: f64, service: f64) -> SystemSettings {
        SystemSettings {
            cafe_name: "Kopi Senja".into(),
            cafe_latitude: None,
            cafe_longitude: None,
            geofence_radius_m: 100.0,
            late_grace_minutes: 10,
            tax_percent: tax,
            service_charge_percent: service,
            late_penalty: 0.0,
            absence_penalty: 0.0,
            overtime_requires_approval: true,
            qris_merchant_name: None,
            bank_account: None,
            updated_at: 0,
        }
    }

    fn line(id: i64, quantity: i64) -> CartLine {
        CartLine {
            menu_item_id: id,
            quantity,
            notes: None,
        }
    }

    fn promo(discount_type: DiscountType, value: f64) -> Promo {
        Promo {
            id: 9,
            code: "HEMAT".into(),
            name: "Hemat".into(),
            discount_type,
            discount_value: value,
            min_order: 0.0,
            max_discount: None,
            starts_at: None,
            ends_at: None,
            usage_limit: None,
            used_count: 0,
            is_active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_totals_without_promo() {
        let menu = [item(1, 18_000.0, None), item(2, 9_500.0, Some(10))];
        let q = quote(&[line(1, 2), line(2, 1)], &menu, None, &settings(10.0, 0.0), 0).unwrap();
        assert_eq!(q.subtotal, 45_500.0);
        assert_eq!(q.discount, 0.0);
        assert_eq!(q.tax, 4_550.0);
        assert_eq!(q.total, 50_050.0);
        assert_eq!(q.lines.len(), 2);
        assert_eq!(q.lines[0].line_total, 36_000.0);
    }

    #[test]
    fn test_tax_and_service_apply_after_discount() {
        let menu = [item(1, 50_000.0, None)];
        let p = promo(DiscountType::Percentage, 10.0);
        let q = quote(&[line(1, 1)], &menu, Some(&p), &settings(11.0, 5.0), 0).unwrap();
        assert_eq!(q.discount, 5_000.0);
        // taxable 45 000
        assert_eq!(q.tax, 4_950.0);
        assert_eq!(q.service_charge, 2_250.0);
        assert_eq!(q.total, 52_200.0);
        assert_eq!(q.promo_code.as_deref(), Some("HEMAT"));
    }

    #[test]
    fn test_fixed_discount_never_exceeds_subtotal() {
        let menu = [item(1, 8_000.0, None)];
        let p = promo(DiscountType::Fixed, 20_000.0);
        let q = quote(&[line(1, 1)], &menu, Some(&p), &settings(10.0, 0.0), 0).unwrap();
        assert_eq!(q.discount, 8_000.0);
        assert_eq!(q.total, 0.0);
    }

    #[test]
    fn test_rejects_bad_quantities_and_empty_cart() {
        let menu = [item(1, 8_000.0, None)];
        let s = settings(10.0, 0.0);
        assert_eq!(
            quote(&[], &menu, None, &s, 0).unwrap_err().code,
            ErrorCode::OrderEmpty
        );
        assert_eq!(
            quote(&[line(1, 0)], &menu, None, &s, 0).unwrap_err().code,
            ErrorCode::ValueOutOfRange
        );
        assert_eq!(
            quote(&[line(1, 100)], &menu, None, &s, 0).unwrap_err().code,
            ErrorCode::ValueOutOfRange
        );
    }

    #[test]
    fn test_stock_is_checked_across_lines() {
        let menu = [item(1, 8_000.0, Some(3))];
        let s = settings(10.0, 0.0);
        assert!(quote(&[line(1, 3)], &menu, None, &s, 0).is_ok());
        let err = quote(&[line(1, 2), line(1, 2)], &menu, None, &s, 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::MenuItemOutOfStock);
        assert_eq!(err.http_status(), http::StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_unknown_and_unavailable_items() {
        let mut off = item(2, 5_000.0, None);
        off.is_available = false;
        let menu = [item(1, 8_000.0, None), off];
        let s = settings(10.0, 0.0);
        assert_eq!(
            quote(&[line(7, 1)], &menu, None, &s, 0).unwrap_err().code,
            ErrorCode::MenuItemNotFound
        );
        assert_eq!(
            quote(&[line(2, 1)], &menu, None, &s, 0).unwrap_err().code,
            ErrorCode::MenuItemUnavailable
        );
    }
}
