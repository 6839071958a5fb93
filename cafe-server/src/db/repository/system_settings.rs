//! System Settings Repository (singleton row id = 1)

use super::{RepoError, RepoResult};
use shared::models::{SystemSettings, SystemSettingsUpdate};
use sqlx::SqlitePool;

const SELECT: &str = "SELECT cafe_name, cafe_latitude, cafe_longitude, geofence_radius_m, late_grace_minutes, tax_percent, service_charge_percent, late_penalty, absence_penalty, overtime_requires_approval, qris_merchant_name, bank_account, updated_at FROM system_settings WHERE id = 1";

pub async fn get(pool: &SqlitePool) -> RepoResult<SystemSettings> {
    sqlx::query_as::<_, SystemSettings>(SELECT)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| RepoError::Database("system_settings row is missing".into()))
}

pub async fn update(pool: &SqlitePool, data: &SystemSettingsUpdate) -> RepoResult<SystemSettings> {
    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE system_settings SET cafe_name = COALESCE(?1, cafe_name), cafe_latitude = COALESCE(?2, cafe_latitude), cafe_longitude = COALESCE(?3, cafe_longitude), geofence_radius_m = COALESCE(?4, geofence_radius_m), late_grace_minutes = COALESCE(?5, late_grace_minutes), tax_percent = COALESCE(?6, tax_percent), service_charge_percent = COALESCE(?7, service_charge_percent), late_penalty = COALESCE(?8, late_penalty), absence_penalty = COALESCE(?9, absence_penalty), overtime_requires_approval = COALESCE(?10, overtime_requires_approval), qris_merchant_name = COALESCE(?11, qris_merchant_name), bank_account = COALESCE(?12, bank_account), updated_at = ?13 WHERE id = 1",
    )
    .bind(&data.cafe_name)
    .bind(data.cafe_latitude)
    .bind(data.cafe_longitude)
    .bind(data.geofence_radius_m)
    .bind(data.late_grace_minutes)
    .bind(data.tax_percent)
    .bind(data.service_charge_percent)
    .bind(data.late_penalty)
    .bind(data.absence_penalty)
    .bind(data.overtime_requires_approval)
    .bind(&data.qris_merchant_name)
    .bind(&data.bank_account)
    .bind(now)
    .execute(pool)
    .await?;
    get(pool).await
}
