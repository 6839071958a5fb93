//! Menu Item Repository

use super::{RepoError, RepoResult};
use shared::models::{MenuItem, MenuItemCreate, MenuItemUpdate};
use sqlx::{SqliteConnection, SqlitePool};

const SELECT: &str = "SELECT id, name, category, description, price, cost, stock, low_stock_threshold, is_available, image_url, created_at, updated_at FROM menu_items";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<MenuItem>> {
    let items = sqlx::query_as::<_, MenuItem>(&format!("{SELECT} ORDER BY category, name"))
        .fetch_all(pool)
        .await?;
    Ok(items)
}

/// Items a customer can order: available and not sold out
pub async fn find_orderable(pool: &SqlitePool) -> RepoResult<Vec<MenuItem>> {
    let items = sqlx::query_as::<_, MenuItem>(&format!(
        "{SELECT} WHERE is_available = 1 AND (stock IS NULL OR stock > 0) ORDER BY category, name"
    ))
    .fetch_all(pool)
    .await?;
    Ok(items)
}

pub async fn find_low_stock(pool: &SqlitePool) -> RepoResult<Vec<MenuItem>> {
    let items = sqlx::query_as::<_, MenuItem>(&format!(
        "{SELECT} WHERE stock IS NOT NULL AND stock <= low_stock_threshold ORDER BY stock, name"
    ))
    .fetch_all(pool)
    .await?;
    Ok(items)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<MenuItem>> {
    let item = sqlx::query_as::<_, MenuItem>(&format!("{SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(item)
}

/// Load several items at once (missing ids are simply absent from the result)
pub async fn find_by_ids(conn: &mut SqliteConnection, ids: &[i64]) -> RepoResult<Vec<MenuItem>> {
    if ids.is_empty() {
        return Ok(vec![]);
    }
    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!("{SELECT} WHERE id IN ({placeholders})");
    let mut query = sqlx::query_as::<_, MenuItem>(&sql);
    for id in ids {
        query = query.bind(id);
    }
    Ok(query.fetch_all(conn).await?)
}

pub async fn create(pool: &SqlitePool, data: &MenuItemCreate) -> RepoResult<MenuItem> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO menu_items (id, name, category, description, price, cost, stock, low_stock_threshold, is_available, image_url, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(data.category)
    .bind(&data.description)
    .bind(data.price)
    .bind(data.cost)
    .bind(data.stock)
    .bind(data.low_stock_threshold.unwrap_or(5))
    .bind(data.is_available.unwrap_or(true))
    .bind(&data.image_url)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create menu item".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: &MenuItemUpdate) -> RepoResult<MenuItem> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE menu_items SET name = COALESCE(?1, name), category = COALESCE(?2, category), description = COALESCE(?3, description), price = COALESCE(?4, price), cost = COALESCE(?5, cost), stock = COALESCE(?6, stock), low_stock_threshold = COALESCE(?7, low_stock_threshold), is_available = COALESCE(?8, is_available), image_url = COALESCE(?9, image_url), updated_at = ?10 WHERE id = ?11",
    )
    .bind(&data.name)
    .bind(data.category)
    .bind(&data.description)
    .bind(data.price)
    .bind(data.cost)
    .bind(data.stock)
    .bind(data.low_stock_threshold)
    .bind(data.is_available)
    .bind(&data.image_url)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Menu item {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Menu item {id} not found")))
}

/// Delete an item; items that appear on past orders are only made unavailable
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let referenced: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM order_items WHERE menu_item_id = ?")
            .bind(id)
            .fetch_one(pool)
            .await?;

    let rows = if referenced > 0 {
        let now = shared::util::now_millis();
        sqlx::query("UPDATE menu_items SET is_available = 0, updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(id)
            .execute(pool)
            .await?
    } else {
        sqlx::query("DELETE FROM menu_items WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?
    };
    Ok(rows.rows_affected() > 0)
}

/// Inventory adjustment; an untracked item starts tracking from 0
pub async fn adjust_stock(pool: &SqlitePool, id: i64, delta: i64) -> RepoResult<MenuItem> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE menu_items SET stock = COALESCE(stock, 0) + ?1, updated_at = ?2 WHERE id = ?3 AND COALESCE(stock, 0) + ?1 >= 0",
    )
    .bind(delta)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        let item = find_by_id(pool, id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Menu item {id} not found")))?;
        return Err(RepoError::Validation(format!(
            "Stock cannot go below 0 (current {}, delta {delta})",
            item.stock.unwrap_or(0)
        )));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Menu item {id} not found")))
}

/// Take `quantity` from a tracked item; returns false when not enough is left
///
/// Untracked items always succeed.
pub async fn take_stock(conn: &mut SqliteConnection, id: i64, quantity: i64) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE menu_items SET stock = CASE WHEN stock IS NULL THEN NULL ELSE stock - ?1 END, updated_at = ?2 WHERE id = ?3 AND (stock IS NULL OR stock >= ?1)",
    )
    .bind(quantity)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Give stock back (cancelled order)
pub async fn restore_stock(conn: &mut SqliteConnection, id: i64, quantity: i64) -> RepoResult<()> {
    sqlx::query(
        "UPDATE menu_items SET stock = stock + ?1, updated_at = ?2 WHERE id = ?3 AND stock IS NOT NULL",
    )
    .bind(quantity)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(conn)
    .await?;
    Ok(())
}
