//! Ephemeris provider interface
//!
//! The search loop, sampler, and classifier consume topocentric geometry
//! through the [`Ephemeris`] trait and never see how it is produced.
//! [`crate::sgp4lib`] provides the standard TLE-driven implementation;
//! tests substitute scripted mocks.
//!
//! Every method takes the instant explicitly; there is no shared
//! "current observation time" anywhere, so providers stay pure functions
//! of (observer, instant) and calls may be reordered or repeated freely.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::observerlib::Observer;

/// Error type for ephemeris providers.
#[derive(Debug, Error)]
pub enum EphemerisError {
    /// The provider could not compute a body state at the requested instant,
    /// e.g. the instant falls outside the model's validity range.
    #[error("Propagation failed at {instant}: {reason}")]
    Propagation {
        instant: DateTime<Utc>,
        reason: String,
    },

    /// The provider could not determine any further pass.
    #[error("No pass found after {after}: {reason}")]
    NoPass { after: DateTime<Utc>, reason: String },
}

/// Topocentric snapshot of one body at one instant.
///
/// Produced fresh for every queried instant and never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    /// Azimuth in radians, clockwise from north
    pub azimuth: f64,
    /// Altitude above the horizon in radians
    pub altitude: f64,
    /// Distance in kilometers. For a satellite this is the slant range from
    /// the observer; for the Sun the geocentric distance is used, the
    /// topocentric parallax at 1 AU being below nine arcseconds.
    pub range_km: f64,
    /// Whether the body sits inside Earth's shadow. Always false for the Sun.
    pub eclipsed: bool,
}

/// One geometric pass of a satellite above the observer's horizon.
///
/// Invariant: `rise_time <= culmination_time <= set_time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pass {
    /// Upward crossing of the horizon cutoff
    pub rise_time: DateTime<Utc>,
    /// Instant of maximum altitude reported by the provider
    pub culmination_time: DateTime<Utc>,
    /// Downward crossing of the horizon cutoff
    pub set_time: DateTime<Utc>,
}

impl Pass {
    /// Duration from rise to set.
    pub fn duration(&self) -> chrono::Duration {
        self.set_time - self.rise_time
    }

    /// Whether the three characteristic instants are correctly ordered.
    pub fn is_ordered(&self) -> bool {
        self.rise_time <= self.culmination_time && self.culmination_time <= self.set_time
    }
}

/// A provider of topocentric geometry for one tracked satellite.
///
/// Implementations carry the tracked body's identity (a parsed TLE, a
/// catalog handle) and answer point queries plus pass enumeration. All
/// methods are expected to be deterministic for a given (observer,
/// instant) pair.
pub trait Ephemeris {
    /// Topocentric state of the tracked satellite at `instant`.
    fn satellite_at(
        &self,
        observer: &Observer,
        instant: DateTime<Utc>,
    ) -> Result<BodyState, EphemerisError>;

    /// Topocentric state of the Sun at `instant`.
    fn sun_at(
        &self,
        observer: &Observer,
        instant: DateTime<Utc>,
    ) -> Result<BodyState, EphemerisError>;

    /// The next geometric pass whose `rise_time` lies strictly after `from`.
    ///
    /// # Errors
    ///
    /// [`EphemerisError::NoPass`] when no pass can be determined within the
    /// provider's search horizon.
    fn next_pass(&self, observer: &Observer, from: DateTime<Utc>)
        -> Result<Pass, EphemerisError>;
}
