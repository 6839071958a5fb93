//! Dashboard statistics (chart data)
//!
//! Only paid, non-cancelled orders count, bucketed by `paid_at`.

use super::RepoResult;
use serde::Serialize;
use shared::models::PaymentMethod;
use sqlx::SqlitePool;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DailySales {
    /// Business date `YYYY-MM-DD`
    pub date: String,
    pub revenue: f64,
    pub orders: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TopItem {
    pub menu_item_id: i64,
    pub name: String,
    pub quantity: i64,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MethodBreakdown {
    pub method: PaymentMethod,
    pub orders: i64,
    pub revenue: f64,
}

/// Revenue and order count per business day in `[from, to)`
///
/// `utc_offset_secs` shifts `paid_at` into the business timezone before
/// taking the date.
pub async fn daily_sales(
    pool: &SqlitePool,
    from: i64,
    to: i64,
    utc_offset_secs: i32,
) -> RepoResult<Vec<DailySales>> {
    let modifier = format!("{utc_offset_secs:+} seconds");
    let rows = sqlx::query_as::<_, DailySales>(
        "SELECT date(paid_at / 1000, 'unixepoch', ?1) AS date, COALESCE(SUM(total), 0.0) AS revenue, COUNT(*) AS orders FROM orders WHERE payment_status = 'paid' AND status != 'cancelled' AND paid_at >= ?2 AND paid_at < ?3 GROUP BY date ORDER BY date",
    )
    .bind(modifier)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn top_items(pool: &SqlitePool, from: i64, to: i64, limit: i64) -> RepoResult<Vec<TopItem>> {
    let rows = sqlx::query_as::<_, TopItem>(
        "SELECT oi.menu_item_id AS menu_item_id, MAX(oi.name) AS name, SUM(oi.quantity) AS quantity, COALESCE(SUM(oi.line_total), 0.0) AS revenue FROM order_items oi JOIN orders o ON o.id = oi.order_id WHERE o.payment_status = 'paid' AND o.status != 'cancelled' AND o.paid_at >= ?1 AND o.paid_at < ?2 GROUP BY oi.menu_item_id ORDER BY quantity DESC, revenue DESC LIMIT ?3",
    )
    .bind(from)
    .bind(to)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn payment_methods(pool: &SqlitePool, from: i64, to: i64) -> RepoResult<Vec<MethodBreakdown>> {
    let rows = sqlx::query_as::<_, MethodBreakdown>(
        "SELECT payment_method AS method, COUNT(*) AS orders, COALESCE(SUM(total), 0.0) AS revenue FROM orders WHERE payment_status = 'paid' AND status != 'cancelled' AND payment_method IS NOT NULL AND paid_at >= ?1 AND paid_at < ?2 GROUP BY payment_method ORDER BY revenue DESC",
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
