//! Physical and mathematical constants shared across the crate.

/// Astronomical Unit in kilometers (IAU 2012)
pub const AU_KM: f64 = 149_597_870.7;

/// WGS84 equatorial Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6378.137;

/// WGS84 flattening
pub const EARTH_FLATTENING: f64 = 1.0 / 298.257_223_563;

/// J2000.0 epoch as a Julian date
pub const J2000: f64 = 2_451_545.0;

/// 2π
pub const TAU: f64 = std::f64::consts::TAU;

/// Degrees to radians
pub const DEG2RAD: f64 = std::f64::consts::PI / 180.0;

/// Radians to degrees
pub const RAD2DEG: f64 = 180.0 / std::f64::consts::PI;

/// Air temperature assumed for refraction when none is supplied, in Celsius
pub const DEFAULT_TEMPERATURE_C: f64 = 10.0;
