//! Earth rotation, site geometry, and atmospheric refraction
//!
//! The frame plumbing shared by the satellite and solar providers:
//! Julian date, Greenwich Mean Sidereal Time, geodetic site coordinates on
//! the WGS84 ellipsoid, rotation of Earth-fixed vectors into the local
//! horizon frame, and atmospheric refraction per the Bennett (1982)
//! formula.

use chrono::{DateTime, Utc};
use nalgebra::Vector3;

use crate::constants::{DEG2RAD, EARTH_FLATTENING, EARTH_RADIUS_KM, J2000, TAU};

/// Convert an instant to a Julian date (UT).
pub fn julian_date(t: DateTime<Utc>) -> f64 {
    2_440_587.5 + t.timestamp_millis() as f64 / 86_400_000.0
}

/// Greenwich Mean Sidereal Time in radians, normalized to [0, 2π).
///
/// Uses the IAU 1982 polynomial with UT1 ≈ UTC, good to well under an
/// arcsecond over the TLE validity window.
pub fn gmst(t: DateTime<Utc>) -> f64 {
    let d = julian_date(t) - J2000;
    let tc = d / 36_525.0;
    let gmst_deg = 280.460_618_37 + 360.985_647_366_29 * d + 0.000_387_933 * tc * tc
        - tc * tc * tc / 38_710_000.0;
    (gmst_deg * DEG2RAD).rem_euclid(TAU)
}

/// Rotate an inertial equatorial vector into the Earth-fixed frame.
///
/// TEME and the equator-of-date frame differ only by polar motion and the
/// equation of the equinoxes, both far below the accuracy of the SGP4
/// model, so a single GMST rotation serves both.
pub fn eci_to_ecef(gmst_rad: f64, v: &Vector3<f64>) -> Vector3<f64> {
    let (s, c) = gmst_rad.sin_cos();
    Vector3::new(c * v.x + s * v.y, -s * v.x + c * v.y, v.z)
}

/// Geocentric ECEF position of a ground site in kilometers.
///
/// Geodetic latitude and longitude in degrees, elevation in meters above
/// the WGS84 ellipsoid.
pub fn site_ecef_km(latitude_deg: f64, longitude_deg: f64, elevation_m: f64) -> Vector3<f64> {
    let lat = latitude_deg * DEG2RAD;
    let lon = longitude_deg * DEG2RAD;
    let e2 = EARTH_FLATTENING * (2.0 - EARTH_FLATTENING);

    let sin_lat = lat.sin();
    let cos_lat = lat.cos();

    // Radius of curvature in the prime vertical
    let n = EARTH_RADIUS_KM / (1.0 - e2 * sin_lat * sin_lat).sqrt();
    let elev_km = elevation_m / 1000.0;

    Vector3::new(
        (n + elev_km) * cos_lat * lon.cos(),
        (n + elev_km) * cos_lat * lon.sin(),
        (n * (1.0 - e2) + elev_km) * sin_lat,
    )
}

/// Project an Earth-fixed direction vector into the local horizon frame.
///
/// Returns `(altitude, azimuth)` in radians. Altitude is positive above
/// the horizon; azimuth is measured clockwise from north (0 = N, π/2 = E)
/// and normalized to [0, 2π).
pub fn ecef_to_horizon(
    latitude_deg: f64,
    longitude_deg: f64,
    direction: &Vector3<f64>,
) -> (f64, f64) {
    let lat = latitude_deg * DEG2RAD;
    let lon = longitude_deg * DEG2RAD;
    let (slat, clat) = lat.sin_cos();
    let (slon, clon) = lon.sin_cos();

    // Rotation from ECEF into (south, east, up) at the site
    let south = slat * clon * direction.x + slat * slon * direction.y - clat * direction.z;
    let east = -slon * direction.x + clon * direction.y;
    let up = clat * clon * direction.x + clat * slon * direction.y + slat * direction.z;

    let alt = up.atan2((south * south + east * east).sqrt());
    let az = east.atan2(-south).rem_euclid(TAU);

    (alt, az)
}

/// Atmospheric refraction for an observed altitude (Bennett 1982).
///
/// Returns the refraction in degrees; zero outside [-1°, 89.9°] where the
/// formula is not meaningful.
pub fn refraction(alt_degrees: f64, temperature_c: f64, pressure_mbar: f64) -> f64 {
    if !(-1.0..=89.9).contains(&alt_degrees) {
        return 0.0;
    }
    let r = 0.016_667 / ((alt_degrees + 7.31 / (alt_degrees + 4.4)) * DEG2RAD).tan();
    r * (0.28 * pressure_mbar / (temperature_c + 273.0))
}

/// Apply refraction to a true (geometric) altitude in degrees.
///
/// Iterates the Bennett correction until the apparent altitude converges.
pub fn refract(alt_degrees: f64, temperature_c: f64, pressure_mbar: f64) -> f64 {
    let mut refracted = alt_degrees;
    for _ in 0..10 {
        let new = alt_degrees + refraction(refracted, temperature_c, pressure_mbar);
        if (new - refracted).abs() < 3.0e-5 {
            return new;
        }
        refracted = new;
    }
    refracted
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;
    use std::f64::consts::PI;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_julian_date_epoch() {
        // The Unix epoch is JD 2440587.5
        let jd = julian_date(utc(1970, 1, 1, 0, 0, 0));
        assert_relative_eq!(jd, 2_440_587.5);
    }

    #[test]
    fn test_julian_date_j2000() {
        let jd = julian_date(utc(2000, 1, 1, 12, 0, 0));
        assert_relative_eq!(jd, J2000, epsilon = 1e-9);
    }

    #[test]
    fn test_gmst_at_j2000() {
        // GMST at 2000-01-01 12:00 UT is 18.697374558 hours
        let theta = gmst(utc(2000, 1, 1, 12, 0, 0));
        let hours = theta * 24.0 / TAU;
        assert_relative_eq!(hours, 18.697_374_558, epsilon = 1e-4);
    }

    #[test]
    fn test_gmst_advances_by_sidereal_day() {
        // After 24h of UT the sidereal angle gains ~3.94 minutes of time
        let t0 = gmst(utc(2024, 3, 1, 0, 0, 0));
        let t1 = gmst(utc(2024, 3, 2, 0, 0, 0));
        let gain_min = (t1 - t0).rem_euclid(TAU) * 24.0 * 60.0 / TAU;
        assert!(
            (gain_min - 3.94).abs() < 0.05,
            "sidereal gain should be ~3.94 min, got {gain_min}"
        );
    }

    #[test]
    fn test_site_ecef_equator_prime_meridian() {
        let site = site_ecef_km(0.0, 0.0, 0.0);
        assert_relative_eq!(site.x, EARTH_RADIUS_KM, epsilon = 1e-9);
        assert_relative_eq!(site.y, 0.0, epsilon = 1e-9);
        assert_relative_eq!(site.z, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_site_ecef_north_pole() {
        let site = site_ecef_km(90.0, 0.0, 0.0);
        let polar_radius = EARTH_RADIUS_KM * (1.0 - EARTH_FLATTENING);
        assert_relative_eq!(site.z, polar_radius, epsilon = 1e-6);
        assert!(site.x.abs() < 1e-9);
    }

    #[test]
    fn test_site_ecef_elevation() {
        let ground = site_ecef_km(0.0, 0.0, 0.0);
        let high = site_ecef_km(0.0, 0.0, 1000.0);
        assert_relative_eq!(high.x - ground.x, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_horizon_up_at_equator() {
        // Straight up at lat 0, lon 0 is ECEF +x
        let (alt, _az) = ecef_to_horizon(0.0, 0.0, &Vector3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(alt, PI / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_horizon_north_at_equator() {
        // North at lat 0, lon 0 is ECEF +z
        let (alt, az) = ecef_to_horizon(0.0, 0.0, &Vector3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(alt, 0.0, epsilon = 1e-9);
        assert_relative_eq!(az, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_horizon_east_at_equator() {
        // East at lat 0, lon 0 is ECEF +y
        let (alt, az) = ecef_to_horizon(0.0, 0.0, &Vector3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(alt, 0.0, epsilon = 1e-9);
        assert_relative_eq!(az, PI / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_eci_ecef_rotation_identity_at_zero() {
        let v = Vector3::new(1.0, 2.0, 3.0);
        let r = eci_to_ecef(0.0, &v);
        assert_relative_eq!((r - v).norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_eci_ecef_preserves_norm() {
        let v = Vector3::new(4000.0, -5000.0, 3000.0);
        let r = eci_to_ecef(1.234, &v);
        assert_relative_eq!(r.norm(), v.norm(), epsilon = 1e-9);
    }

    #[test]
    fn test_refraction_at_horizon() {
        // About 34 arcminutes at the horizon under standard conditions
        let r = refraction(0.0, 10.0, 1010.0);
        assert!(r > 0.4 && r < 0.7, "horizon refraction should be ~0.57°, got {r}");
    }

    #[test]
    fn test_refraction_at_zenith() {
        let r = refraction(90.0, 10.0, 1010.0);
        assert_relative_eq!(r, 0.0);
    }

    #[test]
    fn test_refraction_below_horizon() {
        assert_relative_eq!(refraction(-5.0, 10.0, 1010.0), 0.0);
    }

    #[test]
    fn test_refract_raises_altitude() {
        let apparent = refract(1.0, 10.0, 1010.0);
        assert!(apparent > 1.0 && apparent < 1.5);
    }

    #[test]
    fn test_refract_zero_pressure_is_identity() {
        assert_relative_eq!(refract(5.0, 10.0, 0.0), 5.0);
    }
}
