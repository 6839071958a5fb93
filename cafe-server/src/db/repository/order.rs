//! Order Repository
//!
//! Status and payment fields are only written through [`apply_transition`],
//! a compare-and-set on the values the lifecycle decision was based on.

use super::{RepoError, RepoResult};
use crate::orders::lifecycle::Transition;
use shared::models::{Order, OrderItem, OrderStatus, PaymentStatus};
use sqlx::{Sqlite, SqliteConnection, SqlitePool};

const SELECT: &str = "SELECT id, order_number, table_id, customer_name, notes, status, payment_method, payment_status, subtotal, discount, tax, service_charge, total, promo_id, promo_code, created_at, confirmed_at, paid_at, completed_at, cancelled_at, cancel_reason, updated_at FROM orders";

const SELECT_ITEMS: &str = "SELECT id, order_id, menu_item_id, name, unit_price, quantity, line_total, notes FROM order_items";

/// Staff order list filter
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    /// Inclusive lower bound on `created_at`
    pub from: Option<i64>,
    /// Exclusive upper bound on `created_at`
    pub to: Option<i64>,
    pub limit: i64,
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<Order>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let order = sqlx::query_as::<_, Order>(&format!("{SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(order)
}

pub async fn find_items<'e, E>(executor: E, order_id: i64) -> RepoResult<Vec<OrderItem>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let items = sqlx::query_as::<_, OrderItem>(&format!("{SELECT_ITEMS} WHERE order_id = ? ORDER BY id"))
        .bind(order_id)
        .fetch_all(executor)
        .await?;
    Ok(items)
}

pub async fn list(pool: &SqlitePool, filter: &OrderFilter) -> RepoResult<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
        "{SELECT} WHERE (?1 IS NULL OR status = ?1) AND (?2 IS NULL OR payment_status = ?2) AND (?3 IS NULL OR created_at >= ?3) AND (?4 IS NULL OR created_at < ?4) ORDER BY created_at DESC LIMIT ?5"
    ))
    .bind(filter.status)
    .bind(filter.payment_status)
    .bind(filter.from)
    .bind(filter.to)
    .bind(filter.limit)
    .fetch_all(pool)
    .await?;
    Ok(orders)
}

/// Next `ORD-YYYYMMDD-NNNN` for the business day `[day_start, day_end)`
pub async fn next_order_number(
    conn: &mut SqliteConnection,
    date_compact: &str,
    day_start: i64,
    day_end: i64,
) -> RepoResult<String> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE created_at >= ? AND created_at < ?")
            .bind(day_start)
            .bind(day_end)
            .fetch_one(conn)
            .await?;
    Ok(format!("ORD-{date_compact}-{:04}", count + 1))
}

pub async fn insert(conn: &mut SqliteConnection, order: &Order) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO orders (id, order_number, table_id, customer_name, notes, status, payment_method, payment_status, subtotal, discount, tax, service_charge, total, promo_id, promo_code, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?16)",
    )
    .bind(order.id)
    .bind(&order.order_number)
    .bind(order.table_id)
    .bind(&order.customer_name)
    .bind(&order.notes)
    .bind(order.status)
    .bind(order.payment_method)
    .bind(order.payment_status)
    .bind(order.subtotal)
    .bind(order.discount)
    .bind(order.tax)
    .bind(order.service_charge)
    .bind(order.total)
    .bind(order.promo_id)
    .bind(&order.promo_code)
    .bind(order.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn insert_item(conn: &mut SqliteConnection, item: &OrderItem) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO order_items (id, order_id, menu_item_id, name, unit_price, quantity, line_total, notes) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )
    .bind(item.id)
    .bind(item.order_id)
    .bind(item.menu_item_id)
    .bind(&item.name)
    .bind(item.unit_price)
    .bind(item.quantity)
    .bind(item.line_total)
    .bind(&item.notes)
    .execute(conn)
    .await?;
    Ok(())
}

/// Write a lifecycle transition if the order is still in the state it was
/// decided on
///
/// Returns [`RepoError::Conflict`] when another request changed the order
/// first.
pub async fn apply_transition(
    conn: &mut SqliteConnection,
    order: &Order,
    transition: &Transition,
    now: i64,
) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE orders SET status = ?1, payment_status = ?2, payment_method = ?3, confirmed_at = ?4, paid_at = ?5, completed_at = ?6, cancelled_at = ?7, cancel_reason = ?8, updated_at = ?9 WHERE id = ?10 AND status = ?11 AND payment_status = ?12",
    )
    .bind(transition.status)
    .bind(transition.payment_status)
    .bind(transition.payment_method)
    .bind(transition.confirmed_at)
    .bind(transition.paid_at)
    .bind(transition.completed_at)
    .bind(transition.cancelled_at)
    .bind(&transition.cancel_reason)
    .bind(now)
    .bind(order.id)
    .bind(order.status)
    .bind(order.payment_status)
    .execute(conn)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::Conflict(format!(
            "Order {} was changed by another request",
            order.id
        )));
    }
    Ok(())
}
