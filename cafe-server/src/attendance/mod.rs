//! Attendance: geofence distance, shift work-time and clock-in/out

pub mod geofence;
pub mod service;
pub mod worktime;

pub use geofence::{GeoPoint, GeofenceError, check_geofence, haversine_distance_m};
pub use worktime::{DEFAULT_SCHEDULED_MINUTES, late_minutes, overtime_hours, overtime_minutes, scheduled_minutes};
