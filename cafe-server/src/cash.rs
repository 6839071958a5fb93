//! Cash drawer reconciliation
//!
//! ```text
//! expected = opening_cash + Σ verified cash payments of the business date
//! variance = counted_cash − expected
//! ```
//!
//! A variance under one rupiah either way counts as balanced.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::db::repository::payment as payment_repo;
use crate::pricing::money::{to_decimal, to_f64};
use crate::utils::validation::validate_money;
use crate::utils::{AppResult, time};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashReconcileRequest {
    /// `YYYY-MM-DD`, business timezone
    pub date: String,
    pub opening_cash: f64,
    pub counted_cash: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashStatus {
    Balanced,
    Over,
    Short,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashReconciliation {
    pub date: String,
    pub opening_cash: f64,
    pub cash_sales: f64,
    pub cash_transactions: i64,
    pub expected_cash: f64,
    pub counted_cash: f64,
    pub variance: f64,
    pub status: CashStatus,
}

pub fn classify(variance: Decimal) -> CashStatus {
    if variance.abs() < Decimal::ONE {
        CashStatus::Balanced
    } else if variance > Decimal::ZERO {
        CashStatus::Over
    } else {
        CashStatus::Short
    }
}

pub fn reconcile(
    date: &str,
    opening_cash: f64,
    cash_sales: f64,
    cash_transactions: i64,
    counted_cash: f64,
) -> CashReconciliation {
    let expected = to_decimal(opening_cash) + to_decimal(cash_sales);
    let variance = to_decimal(counted_cash) - expected;
    CashReconciliation {
        date: date.to_string(),
        opening_cash,
        cash_sales,
        cash_transactions,
        expected_cash: to_f64(expected),
        counted_cash,
        variance: to_f64(variance),
        status: classify(variance),
    }
}

/// Reconcile the drawer for one business date
pub async fn reconcile_day(
    pool: &SqlitePool,
    tz: chrono_tz::Tz,
    req: &CashReconcileRequest,
) -> AppResult<CashReconciliation> {
    validate_money(req.opening_cash, "opening_cash")?;
    validate_money(req.counted_cash, "counted_cash")?;
    let date = time::parse_date(&req.date)?;

    let (cash_sales, count) = payment_repo::sum_verified_cash(
        pool,
        time::day_start_millis(date, tz),
        time::day_end_millis(date, tz),
    )
    .await?;

    let result = reconcile(&req.date, req.opening_cash, cash_sales, count, req.counted_cash);
    tracing::info!(
        date = %result.date,
        expected = result.expected_cash,
        counted = result.counted_cash,
        variance = result.variance,
        status = ?result.status,
        "Cash reconciled"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_within_one_rupiah() {
        let r = reconcile("2024-05-01", 200_000.0, 455_000.0, 12, 655_000.4);
        assert_eq!(r.expected_cash, 655_000.0);
        assert_eq!(r.status, CashStatus::Balanced);
    }

    #[test]
    fn test_over_and_short() {
        let over = reconcile("2024-05-01", 200_000.0, 100_000.0, 3, 305_000.0);
        assert_eq!(over.variance, 5_000.0);
        assert_eq!(over.status, CashStatus::Over);

        let short = reconcile("2024-05-01", 200_000.0, 100_000.0, 3, 298_500.0);
        assert_eq!(short.variance, -1_500.0);
        assert_eq!(short.status, CashStatus::Short);
    }

    #[test]
    fn test_classify_boundary() {
        assert_eq!(classify(Decimal::new(99, 2)), CashStatus::Balanced);
        assert_eq!(classify(Decimal::ONE), CashStatus::Over);
        assert_eq!(classify(-Decimal::ONE), CashStatus::Short);
    }
}
