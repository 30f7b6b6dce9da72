//! Topocentric solar position
//!
//! Right ascension, declination, and distance of the Sun come from the
//! `practical_astronomy_rust` routines; the direction is then rotated by
//! Greenwich sidereal time into the Earth-fixed frame and projected onto
//! the observer's horizon by [`crate::earthlib`].
//!
//! Topocentric parallax is ignored: at one astronomical unit it stays
//! below nine arcseconds, far under the accuracy of the pass model.

use chrono::{DateTime, Datelike, Timelike, Utc};
use nalgebra::Vector3;
use practical_astronomy_rust::sun as pa_sun;

use crate::constants::{DEFAULT_TEMPERATURE_C, DEG2RAD, RAD2DEG};
use crate::earthlib;
use crate::ephemlib::BodyState;
use crate::observerlib::Observer;

/// Geocentric equatorial unit vector toward the Sun and the geocentric
/// distance in kilometers.
pub fn sun_direction_eci(instant: DateTime<Utc>) -> (Vector3<f64>, f64) {
    let (ra_deg, dec_deg, distance_km) = sun_radec(instant);
    let ra = ra_deg * DEG2RAD;
    let dec = dec_deg * DEG2RAD;
    let dir = Vector3::new(dec.cos() * ra.cos(), dec.cos() * ra.sin(), dec.sin());
    (dir, distance_km)
}

/// Topocentric state of the Sun for an observer at an instant.
///
/// Altitude is refracted with the Bennett correction when the observer's
/// pressure is non-zero. `eclipsed` is always false for the Sun.
pub fn sun_state(observer: &Observer, instant: DateTime<Utc>) -> BodyState {
    let (dir_eci, distance_km) = sun_direction_eci(instant);
    let dir_ecef = earthlib::eci_to_ecef(earthlib::gmst(instant), &dir_eci);
    let (mut altitude, azimuth) =
        earthlib::ecef_to_horizon(observer.latitude_deg, observer.longitude_deg, &dir_ecef);

    if observer.refraction_enabled() {
        altitude = earthlib::refract(
            altitude * RAD2DEG,
            DEFAULT_TEMPERATURE_C,
            observer.pressure_hpa,
        ) * DEG2RAD;
    }

    BodyState {
        azimuth,
        altitude,
        range_km: distance_km,
        eclipsed: false,
    }
}

/// Solar right ascension (degrees), declination (degrees), and geocentric
/// distance (kilometers) at an instant.
fn sun_radec(instant: DateTime<Utc>) -> (f64, f64, f64) {
    let year = instant.year() as u32;
    let month = instant.month();
    let day = instant.day() as f64;
    let hour = instant.hour() as f64;
    let minute = instant.minute() as f64;
    let second =
        instant.second() as f64 + instant.timestamp_subsec_micros() as f64 / 1.0e6;

    let (ra_h, ra_m, ra_s, dec_d, dec_m, dec_s) =
        pa_sun::precise_position_of_sun(hour, minute, second, day, month, year, false, 0);
    let (distance_km, _ang_deg, _ang_min, _ang_sec) =
        pa_sun::sun_distance_and_angular_size(hour, minute, second, day, month, year, false, 0);

    (
        hms_to_deg(ra_h, ra_m, ra_s),
        dms_to_deg(dec_d, dec_m, dec_s),
        distance_km,
    )
}

fn hms_to_deg(h: f64, m: f64, s: f64) -> f64 {
    (h + m / 60.0 + s / 3600.0) * 15.0
}

fn dms_to_deg(d: f64, m: f64, s: f64) -> f64 {
    let sign = if d < 0.0 { -1.0 } else { 1.0 };
    sign * (d.abs() + m / 60.0 + s / 3600.0)
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

    fn equator_site() -> Observer {
        Observer::new(0.0, 0.0, 0.0, 0.0, 0.0).unwrap()
    }

    #[test]
    fn test_sun_distance_near_one_au() {
        for (y, mo, d) in [(2020, 1, 3), (2020, 4, 10), (2020, 7, 4), (2020, 10, 20)] {
            let (_, distance_km) = sun_direction_eci(utc(y, mo, d, 12, 0, 0));
            assert!(
                (1.45e8..1.55e8).contains(&distance_km),
                "sun distance out of range on {y}-{mo}-{d}: {distance_km} km"
            );
        }
    }

    #[test]
    fn test_sun_direction_is_unit() {
        let (dir, _) = sun_direction_eci(utc(2020, 5, 5, 17, 0, 0));
        assert_relative_eq!(dir.norm(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_declination_within_tropics() {
        for month in 1..=12 {
            let (dir, _) = sun_direction_eci(utc(2021, month, 15, 0, 0, 0));
            let dec_deg = dir.z.asin() * RAD2DEG;
            assert!(
                dec_deg.abs() < 23.6,
                "declination out of tropic bounds in month {month}: {dec_deg}"
            );
        }
    }

    #[test]
    fn test_june_declination_is_northern() {
        let (dir, _) = sun_direction_eci(utc(2021, 6, 21, 12, 0, 0));
        let dec_deg = dir.z.asin() * RAD2DEG;
        assert!(dec_deg > 23.0, "solstice declination should be ~23.4°, got {dec_deg}");
    }

    #[test]
    fn test_equinox_noon_near_zenith_at_equator() {
        // Local solar noon at lon 0 is close to 12:00 UT; near an equinox
        // the Sun stands almost overhead on the equator.
        let state = sun_state(&equator_site(), utc(2020, 3, 20, 12, 0, 0));
        assert!(
            state.altitude > 80.0 * DEG2RAD,
            "equinox noon altitude should be near zenith, got {} deg",
            state.altitude * RAD2DEG
        );
        assert!(!state.eclipsed);
    }

    #[test]
    fn test_morning_sun_is_east() {
        let state = sun_state(&equator_site(), utc(2020, 3, 20, 8, 0, 0));
        assert!(state.altitude > 0.0);
        assert!(
            (PI / 4.0..3.0 * PI / 4.0).contains(&state.azimuth),
            "morning azimuth should be eastward, got {} deg",
            state.azimuth * RAD2DEG
        );
    }

    #[test]
    fn test_midnight_sun_below_horizon_at_equator() {
        let state = sun_state(&equator_site(), utc(2020, 3, 20, 0, 0, 0));
        assert!(state.altitude < 0.0, "midnight sun should be below the horizon");
    }

    #[test]
    fn test_refraction_raises_low_sun() {
        let no_atmosphere = equator_site();
        let atmosphere = Observer::new(0.0, 0.0, 0.0, 1010.0, 0.0).unwrap();
        // Near sunrise the refracted altitude must exceed the geometric one
        let t = utc(2020, 3, 20, 6, 10, 0);
        let geometric = sun_state(&no_atmosphere, t);
        let refracted = sun_state(&atmosphere, t);
        assert!(refracted.altitude > geometric.altitude);
    }
}
