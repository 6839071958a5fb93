//! Promo Repository

use super::{RepoError, RepoResult};
use shared::models::{Promo, PromoCreate, PromoUpdate};
use sqlx::{SqliteConnection, SqlitePool};

const SELECT: &str = "SELECT id, code, name, discount_type, discount_value, min_order, max_discount, starts_at, ends_at, usage_limit, used_count, is_active, created_at, updated_at FROM promos";

/// Promo codes are matched case-insensitively and stored upper-cased
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Promo>> {
    let promos = sqlx::query_as::<_, Promo>(&format!("{SELECT} ORDER BY created_at DESC"))
        .fetch_all(pool)
        .await?;
    Ok(promos)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Promo>> {
    let promo = sqlx::query_as::<_, Promo>(&format!("{SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(promo)
}

pub async fn find_by_code(conn: &mut SqliteConnection, code: &str) -> RepoResult<Option<Promo>> {
    let promo = sqlx::query_as::<_, Promo>(&format!("{SELECT} WHERE code = ? LIMIT 1"))
        .bind(normalize_code(code))
        .fetch_optional(conn)
        .await?;
    Ok(promo)
}

pub async fn create(pool: &SqlitePool, data: &PromoCreate) -> RepoResult<Promo> {
    let code = normalize_code(&data.code);
    let mut conn = pool.acquire().await?;
    if find_by_code(&mut *conn, &code).await?.is_some() {
        return Err(RepoError::Duplicate(format!("Promo code '{code}' already exists")));
    }
    drop(conn);

    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO promos (id, code, name, discount_type, discount_value, min_order, max_discount, starts_at, ends_at, usage_limit, used_count, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 0, ?11, ?12, ?12)",
    )
    .bind(id)
    .bind(&code)
    .bind(&data.name)
    .bind(data.discount_type)
    .bind(data.discount_value)
    .bind(data.min_order)
    .bind(data.max_discount)
    .bind(data.starts_at)
    .bind(data.ends_at)
    .bind(data.usage_limit)
    .bind(data.is_active.unwrap_or(true))
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create promo".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: &PromoUpdate) -> RepoResult<Promo> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE promos SET name = COALESCE(?1, name), discount_type = COALESCE(?2, discount_type), discount_value = COALESCE(?3, discount_value), min_order = COALESCE(?4, min_order), max_discount = COALESCE(?5, max_discount), starts_at = COALESCE(?6, starts_at), ends_at = COALESCE(?7, ends_at), usage_limit = COALESCE(?8, usage_limit), is_active = COALESCE(?9, is_active), updated_at = ?10 WHERE id = ?11",
    )
    .bind(&data.name)
    .bind(data.discount_type)
    .bind(data.discount_value)
    .bind(data.min_order)
    .bind(data.max_discount)
    .bind(data.starts_at)
    .bind(data.ends_at)
    .bind(data.usage_limit)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Promo {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Promo {id} not found")))
}

/// Delete a promo; promos already used on orders are deactivated instead
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let used: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE promo_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    let rows = if used > 0 {
        sqlx::query("UPDATE promos SET is_active = 0, updated_at = ? WHERE id = ?")
            .bind(shared::util::now_millis())
            .bind(id)
            .execute(pool)
            .await?
    } else {
        sqlx::query("DELETE FROM promos WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?
    };
    Ok(rows.rows_affected() > 0)
}

/// Count one redemption; false when the usage limit was reached meanwhile
pub async fn redeem(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE promos SET used_count = used_count + 1, updated_at = ?1 WHERE id = ?2 AND (usage_limit IS NULL OR used_count < usage_limit)",
    )
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Undo a redemption (cancelled order)
pub async fn release(conn: &mut SqliteConnection, id: i64) -> RepoResult<()> {
    sqlx::query(
        "UPDATE promos SET used_count = MAX(used_count - 1, 0), updated_at = ?1 WHERE id = ?2",
    )
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(conn)
    .await?;
    Ok(())
}
