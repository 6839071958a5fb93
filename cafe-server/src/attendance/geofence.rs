//! Geofence check
//!
//! Great-circle (Haversine) distance between the employee's GPS fix and the
//! configured cafe location.

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Mean Earth radius in metres
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite, latitude in [-90, 90], longitude in [-180, 180]
    pub fn validate(&self) -> Result<(), GeofenceError> {
        let ok = self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng);
        if ok {
            Ok(())
        } else {
            Err(GeofenceError::InvalidCoordinates {
                lat: self.lat,
                lng: self.lng,
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeofenceError {
    #[error("Too far from the cafe: {distance_m:.0} m away (max {radius_m:.0} m)")]
    TooFar { distance_m: f64, radius_m: f64 },

    #[error("Invalid coordinates: latitude {lat}, longitude {lng}")]
    InvalidCoordinates { lat: f64, lng: f64 },

    #[error("Cafe location is not configured")]
    NotConfigured,
}

impl From<GeofenceError> for AppError {
    fn from(err: GeofenceError) -> Self {
        let message = err.to_string();
        match err {
            GeofenceError::TooFar {
                distance_m,
                radius_m,
            } => AppError::with_message(ErrorCode::OutsideGeofence, message)
                .with_detail("distance_m", distance_m.round())
                .with_detail("radius_m", radius_m),
            GeofenceError::InvalidCoordinates { .. } => {
                AppError::with_message(ErrorCode::InvalidCoordinates, message)
            }
            GeofenceError::NotConfigured => {
                AppError::with_message(ErrorCode::CafeLocationNotConfigured, message)
            }
        }
    }
}

/// Haversine distance in metres
pub fn haversine_distance_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Accept when `distance <= radius_m`; returns the distance on success
pub fn check_geofence(
    employee: GeoPoint,
    cafe: Option<GeoPoint>,
    radius_m: f64,
) -> Result<f64, GeofenceError> {
    employee.validate()?;
    let cafe = cafe.ok_or(GeofenceError::NotConfigured)?;

    let distance_m = haversine_distance_m(employee, cafe);
    if distance_m <= radius_m {
        Ok(distance_m)
    } else {
        Err(GeofenceError::TooFar {
            distance_m,
            radius_m,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Point `metres` due north of `p`
    fn north_of(p: GeoPoint, metres: f64) -> GeoPoint {
        GeoPoint::new(p.lat + (metres / EARTH_RADIUS_M).to_degrees(), p.lng)
    }

    const CAFE: GeoPoint = GeoPoint {
        lat: -6.2001,
        lng: 106.8167,
    };

    #[test]
    fn test_distance_symmetric() {
        let other = GeoPoint::new(-6.9175, 107.6191);
        let ab = haversine_distance_m(CAFE, other);
        let ba = haversine_distance_m(other, CAFE);
        assert!((ab - ba).abs() < 1e-6);
        // Jakarta to Bandung, roughly 118 km as the crow flies
        assert!((115_000.0..122_000.0).contains(&ab), "got {ab}");
    }

    #[test]
    fn test_distance_zero_for_same_point() {
        assert_eq!(haversine_distance_m(CAFE, CAFE), 0.0);
    }

    #[test]
    fn test_north_offset_matches() {
        let d = haversine_distance_m(CAFE, north_of(CAFE, 150.0));
        assert!((d - 150.0).abs() < 0.01, "got {d}");
    }

    #[test]
    fn test_accept_inside_radius() {
        let distance = check_geofence(north_of(CAFE, 150.0), Some(CAFE), 200.0).unwrap();
        assert!((distance - 150.0).abs() < 0.01);
    }

    #[test]
    fn test_reject_outside_radius_with_message() {
        let err = check_geofence(north_of(CAFE, 250.0), Some(CAFE), 200.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Too far from the cafe: 250 m away (max 200 m)"
        );
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::OutsideGeofence);
        assert_eq!(app.http_status(), http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let p = north_of(CAFE, 100.0);
        let d = haversine_distance_m(p, CAFE);
        assert!(check_geofence(p, Some(CAFE), d).is_ok());
    }

    #[test]
    fn test_invalid_coordinates() {
        assert!(matches!(
            check_geofence(GeoPoint::new(91.0, 0.0), Some(CAFE), 100.0),
            Err(GeofenceError::InvalidCoordinates { .. })
        ));
        assert!(matches!(
            check_geofence(GeoPoint::new(0.0, f64::NAN), Some(CAFE), 100.0),
            Err(GeofenceError::InvalidCoordinates { .. })
        ));
    }

    #[test]
    fn test_not_configured() {
        let err = check_geofence(CAFE, None, 100.0).unwrap_err();
        assert_eq!(err, GeofenceError::NotConfigured);
        assert_eq!(
            AppError::from(err).http_status(),
            http::StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
