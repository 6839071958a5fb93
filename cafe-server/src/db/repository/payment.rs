//! Payment Transaction Repository

use super::RepoResult;
use shared::models::{PaymentMethod, PaymentTransaction, TransactionStatus};
use sqlx::{Sqlite, SqliteConnection, SqlitePool};

const SELECT: &str = "SELECT id, order_id, method, amount, status, proof_path, amount_received, change_amount, verified_by, verified_at, rejection_reason, created_at, updated_at FROM payment_transactions";

pub async fn find_latest<'e, E>(executor: E, order_id: i64) -> RepoResult<Option<PaymentTransaction>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let tx = sqlx::query_as::<_, PaymentTransaction>(&format!(
        "{SELECT} WHERE order_id = ? ORDER BY created_at DESC, id DESC LIMIT 1"
    ))
    .bind(order_id)
    .fetch_optional(executor)
    .await?;
    Ok(tx)
}

/// Latest transaction that carries an uploaded proof
pub async fn find_latest_with_proof(
    pool: &SqlitePool,
    order_id: i64,
) -> RepoResult<Option<PaymentTransaction>> {
    let tx = sqlx::query_as::<_, PaymentTransaction>(&format!(
        "{SELECT} WHERE order_id = ? AND proof_path IS NOT NULL ORDER BY created_at DESC, id DESC LIMIT 1"
    ))
    .bind(order_id)
    .fetch_optional(pool)
    .await?;
    Ok(tx)
}

pub async fn insert_pending(
    conn: &mut SqliteConnection,
    order_id: i64,
    method: PaymentMethod,
    amount: f64,
    proof_path: &str,
    now: i64,
) -> RepoResult<i64> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO payment_transactions (id, order_id, method, amount, status, proof_path, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
    )
    .bind(id)
    .bind(order_id)
    .bind(method)
    .bind(amount)
    .bind(TransactionStatus::Pending)
    .bind(proof_path)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(id)
}

/// Cash is verified on the spot, so its transaction is born verified
#[allow(clippy::too_many_arguments)]
pub async fn insert_verified_cash(
    conn: &mut SqliteConnection,
    order_id: i64,
    amount: f64,
    amount_received: f64,
    change_amount: f64,
    verified_by: i64,
    now: i64,
) -> RepoResult<i64> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO payment_transactions (id, order_id, method, amount, status, amount_received, change_amount, verified_by, verified_at, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9, ?9)",
    )
    .bind(id)
    .bind(order_id)
    .bind(PaymentMethod::Cash)
    .bind(amount)
    .bind(TransactionStatus::Verified)
    .bind(amount_received)
    .bind(change_amount)
    .bind(verified_by)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(id)
}

/// Mark the pending transaction(s) of an order verified; returns rows changed
pub async fn verify_pending(
    conn: &mut SqliteConnection,
    order_id: i64,
    verified_by: i64,
    now: i64,
) -> RepoResult<u64> {
    let rows = sqlx::query(
        "UPDATE payment_transactions SET status = ?1, verified_by = ?2, verified_at = ?3, updated_at = ?3 WHERE order_id = ?4 AND status = ?5",
    )
    .bind(TransactionStatus::Verified)
    .bind(verified_by)
    .bind(now)
    .bind(order_id)
    .bind(TransactionStatus::Pending)
    .execute(conn)
    .await?;
    Ok(rows.rows_affected())
}

/// Mark pending transaction(s) rejected; returns rows changed
pub async fn reject_pending(
    conn: &mut SqliteConnection,
    order_id: i64,
    reason: &str,
    reviewed_by: Option<i64>,
    now: i64,
) -> RepoResult<u64> {
    let rows = sqlx::query(
        "UPDATE payment_transactions SET status = ?1, rejection_reason = ?2, verified_by = ?3, verified_at = ?4, updated_at = ?4 WHERE order_id = ?5 AND status = ?6",
    )
    .bind(TransactionStatus::Rejected)
    .bind(reason)
    .bind(reviewed_by)
    .bind(now)
    .bind(order_id)
    .bind(TransactionStatus::Pending)
    .execute(conn)
    .await?;
    Ok(rows.rows_affected())
}

/// Σ amount of verified cash transactions with `verified_at` in `[from, to)`
pub async fn sum_verified_cash(pool: &SqlitePool, from: i64, to: i64) -> RepoResult<(f64, i64)> {
    let row: (Option<f64>, i64) = sqlx::query_as(
        "SELECT SUM(amount), COUNT(*) FROM payment_transactions WHERE method = ?1 AND status = ?2 AND verified_at >= ?3 AND verified_at < ?4",
    )
    .bind(PaymentMethod::Cash)
    .bind(TransactionStatus::Verified)
    .bind(from)
    .bind(to)
    .fetch_one(pool)
    .await?;
    Ok((row.0.unwrap_or(0.0), row.1))
}
