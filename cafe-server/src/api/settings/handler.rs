//! Settings Handlers

use axum::{Json, extract::State};
use shared::message::{action, resource};
use shared::models::{SystemSettings, SystemSettingsUpdate};

use crate::attendance::GeoPoint;
use crate::core::ServerState;
use crate::db::repository::system_settings as settings_repo;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_money, validate_optional_text, validate_percent,
    validate_required_text,
};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

/// Largest geofence the owner may configure
const MAX_GEOFENCE_RADIUS_M: f64 = 5_000.0;
const MAX_GRACE_MINUTES: i64 = 240;

fn validate_update(current: &SystemSettings, data: &SystemSettingsUpdate) -> AppResult<()> {
    if let Some(name) = &data.cafe_name {
        validate_required_text(name, "cafe_name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&data.qris_merchant_name, "qris_merchant_name", MAX_NAME_LEN)?;
    validate_optional_text(&data.bank_account, "bank_account", MAX_SHORT_TEXT_LEN)?;

    // latitude and longitude only make sense together
    if data.cafe_latitude.is_some() || data.cafe_longitude.is_some() {
        let lat = data.cafe_latitude.or(current.cafe_latitude);
        let lng = data.cafe_longitude.or(current.cafe_longitude);
        match (lat, lng) {
            (Some(lat), Some(lng)) => GeoPoint::new(lat, lng).validate()?,
            _ => {
                return Err(AppError::validation(
                    "cafe_latitude and cafe_longitude must be set together",
                ));
            }
        }
    }

    if let Some(radius) = data.geofence_radius_m
        && !(radius.is_finite() && radius > 0.0 && radius <= MAX_GEOFENCE_RADIUS_M)
    {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("geofence_radius_m must be in (0, {MAX_GEOFENCE_RADIUS_M}]"),
        )
        .with_detail("field", "geofence_radius_m"));
    }
    if let Some(grace) = data.late_grace_minutes
        && !(0..=MAX_GRACE_MINUTES).contains(&grace)
    {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("late_grace_minutes must be 0-{MAX_GRACE_MINUTES}"),
        )
        .with_detail("field", "late_grace_minutes"));
    }
    if let Some(tax) = data.tax_percent {
        validate_percent(tax, "tax_percent")?;
    }
    if let Some(service) = data.service_charge_percent {
        validate_percent(service, "service_charge_percent")?;
    }
    if let Some(penalty) = data.late_penalty {
        validate_money(penalty, "late_penalty")?;
    }
    if let Some(penalty) = data.absence_penalty {
        validate_money(penalty, "absence_penalty")?;
    }
    Ok(())
}

/// GET /api/settings
pub async fn get(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<SystemSettings>>> {
    let settings = settings_repo::get(&state.pool).await?;
    Ok(ok(settings))
}

/// PUT /api/settings
pub async fn update(
    State(state): State<ServerState>,
    Json(payload): Json<SystemSettingsUpdate>,
) -> AppResult<Json<ApiResponse<SystemSettings>>> {
    let current = settings_repo::get(&state.pool).await?;
    validate_update(&current, &payload)?;

    let settings = settings_repo::update(&state.pool, &payload).await?;
    tracing::info!(
        cafe_name = %settings.cafe_name,
        geofence_radius_m = settings.geofence_radius_m,
        tax_percent = settings.tax_percent,
        "Settings updated"
    );
    state.broadcast_sync(resource::SETTINGS, action::UPDATED, "1", Some(&settings));
    Ok(ok(settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SystemSettings {
        SystemSettings {
            cafe_name: "Cafe".into(),
            cafe_latitude: None,
            cafe_longitude: None,
            geofence_radius_m: 100.0,
            late_grace_minutes: 10,
            tax_percent: 10.0,
            service_charge_percent: 0.0,
            late_penalty: 0.0,
            absence_penalty: 0.0,
            overtime_requires_approval: true,
            qris_merchant_name: None,
            bank_account: None,
            updated_at: 0,
        }
    }

    #[test]
    fn test_location_must_be_complete() {
        let half = SystemSettingsUpdate {
            cafe_latitude: Some(-6.2),
            ..Default::default()
        };
        assert!(validate_update(&settings(), &half).is_err());

        let full = SystemSettingsUpdate {
            cafe_latitude: Some(-6.2),
            cafe_longitude: Some(106.8),
            ..Default::default()
        };
        assert!(validate_update(&settings(), &full).is_ok());

        let bad = SystemSettingsUpdate {
            cafe_latitude: Some(91.0),
            cafe_longitude: Some(106.8),
            ..Default::default()
        };
        assert!(validate_update(&settings(), &bad).is_err());
    }

    #[test]
    fn test_ranges() {
        let radius = SystemSettingsUpdate {
            geofence_radius_m: Some(0.0),
            ..Default::default()
        };
        assert!(validate_update(&settings(), &radius).is_err());

        let tax = SystemSettingsUpdate {
            tax_percent: Some(11.0),
            service_charge_percent: Some(5.0),
            ..Default::default()
        };
        assert!(validate_update(&settings(), &tax).is_ok());
    }
}
