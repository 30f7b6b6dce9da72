//! SGP4-backed ephemeris provider
//!
//! Implements the [`Ephemeris`] trait for a satellite described by a TLE:
//! SGP4 propagation to the TEME frame, a sidereal-time rotation into
//! Earth-fixed coordinates, topocentric projection at the observer's site,
//! a cylindrical Earth-shadow eclipse test, and a scan-and-bisect search
//! for geometric passes above the observer's horizon cutoff.
//!
//! # Example
//!
//! ```ignore
//! use skypass::sgp4lib::{EarthSatellite, Sgp4Ephemeris};
//!
//! let iss = EarthSatellite::from_tle(line1, line2, Some("ISS"))?;
//! let ephemeris = Sgp4Ephemeris::new(iss);
//! let pass = ephemeris.next_pass(&observer, start)?;
//! ```

use chrono::{DateTime, Duration, Utc};
use nalgebra::Vector3;
use sgp4::{Constants, Elements};
use tracing::debug;

use crate::constants::{DEFAULT_TEMPERATURE_C, DEG2RAD, EARTH_RADIUS_KM, RAD2DEG};
use crate::earthlib;
use crate::ephemlib::{BodyState, Ephemeris, EphemerisError, Pass};
use crate::observerlib::Observer;
use crate::sunlib;
use crate::SkypassError;

/// An Earth satellite loaded from a TLE and propagated with SGP4.
pub struct EarthSatellite {
    /// Satellite name, if one was supplied or present in the element set
    pub name: Option<String>,
    /// NORAD catalog ID
    pub norad_id: u64,
    /// TLE epoch
    pub epoch: DateTime<Utc>,
    /// Mean motion in revolutions per day
    pub revs_per_day: f64,
    model: Constants,
    elements: Elements,
}

impl EarthSatellite {
    /// Parse a TLE and initialize the SGP4 propagator.
    ///
    /// # Errors
    ///
    /// Returns [`SkypassError::Configuration`] when the element set cannot
    /// be parsed or the propagator cannot be initialized from it.
    pub fn from_tle(line1: &str, line2: &str, name: Option<&str>) -> Result<Self, SkypassError> {
        let elements = Elements::from_tle(
            name.map(String::from),
            line1.trim().as_bytes(),
            line2.trim().as_bytes(),
        )
        .map_err(|e| SkypassError::Configuration(format!("invalid TLE: {e:?}")))?;

        let model = Constants::from_elements(&elements).map_err(|e| {
            SkypassError::Configuration(format!("SGP4 initialization failed: {e:?}"))
        })?;

        let epoch = DateTime::<Utc>::from_naive_utc_and_offset(elements.datetime, Utc);

        Ok(EarthSatellite {
            name: elements.object_name.clone(),
            norad_id: elements.norad_id,
            epoch,
            revs_per_day: elements.mean_motion,
            model,
            elements,
        })
    }

    /// Geocentric TEME position in kilometers at `instant`.
    pub fn position_teme_km(&self, instant: DateTime<Utc>) -> Result<Vector3<f64>, EphemerisError> {
        let minutes = self
            .elements
            .datetime_to_minutes_since_epoch(&instant.naive_utc())
            .map_err(|e| EphemerisError::Propagation {
                instant,
                reason: format!("{e:?}"),
            })?;
        let prediction = self
            .model
            .propagate(minutes)
            .map_err(|e| EphemerisError::Propagation {
                instant,
                reason: format!("{e:?}"),
            })?;
        Ok(Vector3::new(
            prediction.position[0],
            prediction.position[1],
            prediction.position[2],
        ))
    }
}

impl std::fmt::Debug for EarthSatellite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EarthSatellite")
            .field("name", &self.name)
            .field("norad_id", &self.norad_id)
            .field("epoch", &self.epoch)
            .field("revs_per_day", &self.revs_per_day)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for EarthSatellite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(n) => write!(f, "{} catalog #{} epoch {}", n, self.norad_id, self.epoch),
            None => write!(f, "catalog #{} epoch {}", self.norad_id, self.epoch),
        }
    }
}

/// [`Ephemeris`] implementation combining an [`EarthSatellite`] with the
/// solar position model of [`crate::sunlib`].
#[derive(Debug)]
pub struct Sgp4Ephemeris {
    satellite: EarthSatellite,
    search_horizon: Duration,
    coarse_step: Duration,
}

impl Sgp4Ephemeris {
    /// Wrap a satellite with the default search parameters: a 10-day pass
    /// search horizon scanned at 15-second resolution.
    pub fn new(satellite: EarthSatellite) -> Self {
        Sgp4Ephemeris {
            satellite,
            search_horizon: Duration::days(10),
            coarse_step: Duration::seconds(15),
        }
    }

    /// Bound how far into the future `next_pass` will scan before giving up.
    pub fn with_search_horizon(mut self, horizon: Duration) -> Self {
        self.search_horizon = horizon;
        self
    }

    /// The tracked satellite.
    pub fn satellite(&self) -> &EarthSatellite {
        &self.satellite
    }

    /// Refracted topocentric altitude of the satellite, in radians.
    fn altitude(&self, observer: &Observer, instant: DateTime<Utc>) -> Result<f64, EphemerisError> {
        Ok(self.satellite_at(observer, instant)?.altitude)
    }

    /// Bisect a horizon crossing bracketed by `lo` (before) and `hi`
    /// (after) down to sub-second width. `rising` selects which side of
    /// the bracket is above the cutoff.
    fn refine_crossing(
        &self,
        observer: &Observer,
        horizon_rad: f64,
        rising: bool,
        mut lo: DateTime<Utc>,
        mut hi: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, EphemerisError> {
        while hi - lo > Duration::milliseconds(500) {
            let mid = lo + (hi - lo) / 2;
            let above = self.altitude(observer, mid)? >= horizon_rad;
            if above == rising {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        Ok(hi)
    }

    /// Instant of maximum altitude between `rise` and `set`, located by a
    /// one-second scan of the bracket.
    fn culmination(
        &self,
        observer: &Observer,
        rise: DateTime<Utc>,
        set: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, EphemerisError> {
        let mut best_t = rise;
        let mut best_alt = f64::NEG_INFINITY;
        let mut t = rise;
        while t <= set {
            let alt = self.altitude(observer, t)?;
            if alt > best_alt {
                best_alt = alt;
                best_t = t;
            }
            t += Duration::seconds(1);
        }
        Ok(best_t)
    }
}

impl Ephemeris for Sgp4Ephemeris {
    fn satellite_at(
        &self,
        observer: &Observer,
        instant: DateTime<Utc>,
    ) -> Result<BodyState, EphemerisError> {
        let teme = self.satellite.position_teme_km(instant)?;
        let sat_ecef = earthlib::eci_to_ecef(earthlib::gmst(instant), &teme);
        let site = earthlib::site_ecef_km(
            observer.latitude_deg,
            observer.longitude_deg,
            observer.elevation_m,
        );
        let topocentric = sat_ecef - site;

        let (mut altitude, azimuth) = earthlib::ecef_to_horizon(
            observer.latitude_deg,
            observer.longitude_deg,
            &topocentric,
        );
        if observer.refraction_enabled() {
            altitude = earthlib::refract(
                altitude * RAD2DEG,
                DEFAULT_TEMPERATURE_C,
                observer.pressure_hpa,
            ) * DEG2RAD;
        }

        let (sun_dir, _) = sunlib::sun_direction_eci(instant);
        Ok(BodyState {
            azimuth,
            altitude,
            range_km: topocentric.norm(),
            eclipsed: in_earth_shadow(&teme, &sun_dir),
        })
    }

    fn sun_at(
        &self,
        observer: &Observer,
        instant: DateTime<Utc>,
    ) -> Result<BodyState, EphemerisError> {
        Ok(sunlib::sun_state(observer, instant))
    }

    fn next_pass(
        &self,
        observer: &Observer,
        from: DateTime<Utc>,
    ) -> Result<Pass, EphemerisError> {
        let horizon_rad = observer.horizon_deg * DEG2RAD;
        let deadline = from + self.search_horizon;
        let no_pass = |at: DateTime<Utc>| EphemerisError::NoPass {
            after: from,
            reason: format!(
                "no pass above {}° within {} hours (scan ended at {at})",
                observer.horizon_deg,
                self.search_horizon.num_hours()
            ),
        };

        // Skip any pass already in progress so that rise_time > from
        let mut t = from;
        let mut alt = self.altitude(observer, t)?;
        while alt >= horizon_rad {
            t += self.coarse_step;
            if t >= deadline {
                return Err(no_pass(t));
            }
            alt = self.altitude(observer, t)?;
        }

        // Coarse scan for the upward crossing
        let rise = loop {
            let next_t = t + self.coarse_step;
            if next_t > deadline {
                return Err(no_pass(next_t));
            }
            let next_alt = self.altitude(observer, next_t)?;
            if next_alt >= horizon_rad {
                break self.refine_crossing(observer, horizon_rad, true, t, next_t)?;
            }
            t = next_t;
        };

        // Continue scanning for the downward crossing
        let mut above_t = rise;
        let set = loop {
            let next_t = above_t + self.coarse_step;
            let next_alt = self.altitude(observer, next_t)?;
            if next_alt < horizon_rad {
                break self.refine_crossing(observer, horizon_rad, false, above_t, next_t)?;
            }
            above_t = next_t;
        };

        let culmination_time = self.culmination(observer, rise, set)?;
        debug!(
            rise = %rise,
            set = %set,
            duration_s = (set - rise).num_seconds(),
            "found geometric pass"
        );

        Ok(Pass {
            rise_time: rise,
            culmination_time,
            set_time: set,
        })
    }
}

/// Cylindrical Earth-shadow test.
///
/// The satellite is eclipsed when it sits on the anti-sun side of Earth
/// and its distance from the shadow axis is under one Earth radius.
pub(crate) fn in_earth_shadow(sat_eci_km: &Vector3<f64>, sun_direction: &Vector3<f64>) -> bool {
    let along = sat_eci_km.dot(sun_direction);
    if along >= 0.0 {
        return false;
    }
    let off_axis = (sat_eci_km - along * sun_direction).norm();
    off_axis < EARTH_RADIUS_KM
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::f64::consts::PI;

    // ISS element set with epoch 2020-05-03
    const ISS_LINE1: &str = "1 25544U 98067A   20124.51596176  .00016717  00000-0  10270-3 0  9040";
    const ISS_LINE2: &str = "2 25544  51.6426 209.5696 0001578 232.9055 127.1951 15.49338516 25086";

    fn iss() -> EarthSatellite {
        EarthSatellite::from_tle(ISS_LINE1, ISS_LINE2, Some("ISS")).unwrap()
    }

    fn paris() -> Observer {
        Observer::new(48.8638, 2.4485, 97.0, 0.0, 0.0).unwrap()
    }

    fn near_epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 5, 4, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_from_tle() {
        let sat = iss();
        assert_eq!(sat.norad_id, 25544);
        assert!((15.0..16.0).contains(&sat.revs_per_day));
        assert_eq!(sat.epoch.date_naive(), chrono::NaiveDate::from_ymd_opt(2020, 5, 3).unwrap());
    }

    #[test]
    fn test_from_tle_rejects_garbage() {
        let err = EarthSatellite::from_tle("not a tle", "still not", None).unwrap_err();
        assert!(matches!(err, SkypassError::Configuration(_)));
    }

    #[test]
    fn test_teme_radius_is_leo() {
        let r = iss().position_teme_km(near_epoch()).unwrap().norm();
        assert!(
            (6650.0..6850.0).contains(&r),
            "ISS geocentric radius should be ~6780 km, got {r}"
        );
    }

    #[test]
    fn test_satellite_state_ranges() {
        let eph = Sgp4Ephemeris::new(iss());
        let state = eph.satellite_at(&paris(), near_epoch()).unwrap();
        assert!((-PI / 2.0..=PI / 2.0).contains(&state.altitude));
        assert!((0.0..2.0 * PI).contains(&state.azimuth));
        assert!(state.range_km > 300.0);
    }

    #[test]
    fn test_satellite_state_determinism() {
        let eph = Sgp4Ephemeris::new(iss());
        let a = eph.satellite_at(&paris(), near_epoch()).unwrap();
        let b = eph.satellite_at(&paris(), near_epoch()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_shadow_anti_sun_satellite() {
        let sun = Vector3::new(1.0, 0.0, 0.0);
        assert!(in_earth_shadow(&Vector3::new(-6800.0, 0.0, 0.0), &sun));
    }

    #[test]
    fn test_shadow_sun_side_satellite() {
        let sun = Vector3::new(1.0, 0.0, 0.0);
        assert!(!in_earth_shadow(&Vector3::new(6800.0, 0.0, 0.0), &sun));
    }

    #[test]
    fn test_shadow_off_axis_satellite() {
        let sun = Vector3::new(1.0, 0.0, 0.0);
        // Behind Earth but well off the shadow axis
        assert!(!in_earth_shadow(&Vector3::new(-6800.0, 8000.0, 0.0), &sun));
    }

    #[test]
    fn test_next_pass_is_ordered_and_future() {
        let eph = Sgp4Ephemeris::new(iss());
        let from = near_epoch();
        let pass = eph.next_pass(&paris(), from).unwrap();
        assert!(pass.rise_time > from);
        assert!(pass.is_ordered());
        // An ISS pass lasts a few minutes, not hours
        assert!(pass.duration() <= chrono::Duration::minutes(30));
    }

    #[test]
    fn test_next_pass_culmination_is_highest_sample() {
        let eph = Sgp4Ephemeris::new(iss());
        let pass = eph.next_pass(&paris(), near_epoch()).unwrap();
        let peak = eph.altitude(&paris(), pass.culmination_time).unwrap();
        let at_rise = eph.altitude(&paris(), pass.rise_time).unwrap();
        assert!(peak >= at_rise);
        assert!(peak >= paris().horizon_deg * DEG2RAD);
    }

    #[test]
    fn test_next_pass_advances() {
        let eph = Sgp4Ephemeris::new(iss());
        let first = eph.next_pass(&paris(), near_epoch()).unwrap();
        let second = eph.next_pass(&paris(), first.set_time).unwrap();
        assert!(second.rise_time > first.set_time);
    }

    #[test]
    fn test_next_pass_exhausts_search_horizon() {
        let eph = Sgp4Ephemeris::new(iss()).with_search_horizon(Duration::minutes(1));
        // Ask for a pass above an impossible cutoff
        let high_horizon = Observer::new(48.8638, 2.4485, 97.0, 0.0, 89.0).unwrap();
        let err = eph.next_pass(&high_horizon, near_epoch()).unwrap_err();
        assert!(matches!(err, EphemerisError::NoPass { .. }));
    }
}
