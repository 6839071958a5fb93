//! System Settings Model (singleton row)

use serde::{Deserialize, Serialize};

/// Cafe-wide business settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SystemSettings {
    pub cafe_name: String,
    pub cafe_latitude: Option<f64>,
    pub cafe_longitude: Option<f64>,
    pub geofence_radius_m: f64,
    pub late_grace_minutes: i64,
    pub tax_percent: f64,
    pub service_charge_percent: f64,
    /// Deducted per late day
    pub late_penalty: f64,
    /// Deducted per absent day
    pub absence_penalty: f64,
    pub overtime_requires_approval: bool,
    pub qris_merchant_name: Option<String>,
    pub bank_account: Option<String>,
    pub updated_at: i64,
}

impl SystemSettings {
    /// Configured cafe location as `(lat, lng)`
    pub fn cafe_location(&self) -> Option<(f64, f64)> {
        match (self.cafe_latitude, self.cafe_longitude) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        }
    }
}

/// Partial update payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemSettingsUpdate {
    pub cafe_name: Option<String>,
    pub cafe_latitude: Option<f64>,
    pub cafe_longitude: Option<f64>,
    pub geofence_radius_m: Option<f64>,
    pub late_grace_minutes: Option<i64>,
    pub tax_percent: Option<f64>,
    pub service_charge_percent: Option<f64>,
    pub late_penalty: Option<f64>,
    pub absence_penalty: Option<f64>,
    pub overtime_requires_approval: Option<bool>,
    pub qris_merchant_name: Option<String>,
    pub bank_account: Option<String>,
}

/// What the customer app may see
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicCafeInfo {
    pub cafe_name: String,
    pub tax_percent: f64,
    pub service_charge_percent: f64,
    pub qris_merchant_name: Option<String>,
    pub bank_account: Option<String>,
}

impl From<&SystemSettings> for PublicCafeInfo {
    fn from(s: &SystemSettings) -> Self {
        Self {
            cafe_name: s.cafe_name.clone(),
            tax_percent: s.tax_percent,
            service_charge_percent: s.service_charge_percent,
            qris_merchant_name: s.qris_merchant_name.clone(),
            bank_account: s.bank_account.clone(),
        }
    }
}
