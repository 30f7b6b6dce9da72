//! Observational events and fixed-step sampling
//!
//! An [`Event`] combines the satellite's and the Sun's topocentric states
//! at one instant with the apparent magnitude of the satellite. The
//! sampler walks a half-open interval at a fixed step, querying the
//! ephemeris provider fresh at every instant; nothing is cached between
//! calls.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::ephemlib::{Ephemeris, EphemerisError};
use crate::magnitudelib;
use crate::observerlib::Observer;

/// One sampled instant of a pass.
///
/// Field names are the wire names of the output document. Angles are in
/// radians, the range in kilometers. A magnitude-domain degeneracy is
/// carried as NaN, which serializes as `null` and which every threshold
/// comparison treats as "not visible".
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Event {
    /// Instant of the sample, UTC
    pub hour: DateTime<Utc>,
    /// Satellite altitude above the horizon, radians
    pub altitude: f64,
    /// Satellite azimuth, radians clockwise from north
    pub azimuth: f64,
    /// Apparent visual magnitude (lower is brighter)
    pub magnitude: f64,
    /// Slant range from the observer, kilometers
    pub distance_from_earth: f64,
    /// Whether the satellite sits in Earth's shadow
    pub eclipsed: bool,
    /// Sun altitude above the horizon, radians
    pub sun_altitude: f64,
}

/// Build the event for a single instant.
///
/// A degenerate phase angle is absorbed into a NaN magnitude; a
/// propagation failure is surfaced to the caller.
pub fn event_at<E: Ephemeris>(
    ephemeris: &E,
    observer: &Observer,
    instant: DateTime<Utc>,
) -> Result<Event, EphemerisError> {
    let sun = ephemeris.sun_at(observer, instant)?;
    let sat = ephemeris.satellite_at(observer, instant)?;

    let magnitude = match magnitudelib::satellite_magnitude(&sun, &sat) {
        Ok(mag) => mag,
        Err(e) => {
            debug!(%instant, error = %e, "magnitude undefined, treating instant as not visible");
            f64::NAN
        }
    };

    Ok(Event {
        hour: instant,
        altitude: sat.altitude,
        azimuth: sat.azimuth,
        magnitude,
        distance_from_earth: sat.range_km,
        eclipsed: sat.eclipsed,
        sun_altitude: sun.altitude,
    })
}

/// Sample the half-open interval `[start, end)` every `step_seconds`.
///
/// The sequence is ordered by increasing timestamp. An instant whose
/// propagation fails is dropped from the series, and the visibility
/// classifier downstream then treats it as not visible, so a single bad
/// sample never aborts a whole pass.
pub fn sample_events<E: Ephemeris>(
    ephemeris: &E,
    observer: &Observer,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    step_seconds: u32,
) -> Vec<Event> {
    let step = Duration::seconds(i64::from(step_seconds.max(1)));
    let mut events = Vec::new();
    let mut current = start;
    while current < end {
        match event_at(ephemeris, observer, current) {
            Ok(event) => events.push(event),
            Err(e) => warn!(instant = %current, error = %e, "dropping unsampleable instant"),
        }
        current += step;
    }
    events
}
