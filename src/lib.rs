//! Skypass: naked-eye satellite pass prediction
//!
//! Given a ground observer and a starting instant, skypass searches forward
//! in time for the next satellite pass that is actually *visible*: the
//! satellite must be out of Earth's shadow and bright enough for the naked
//! eye at some instant of the pass. The accepted pass is rendered as an
//! ordered series of observational events (altitude, azimuth, apparent
//! magnitude, range, eclipse state, solar altitude).
//!
//! The crate is organised around the [`ephemlib::Ephemeris`] trait: the
//! search loop, sampler, and classifier consume any provider of topocentric
//! body states and geometric passes. [`sgp4lib`] ships the standard
//! provider, driven by a TLE and the SGP4 propagator, with the Sun supplied
//! by [`sunlib`].
//!
//! # Example
//!
//! ```ignore
//! use skypass::observerlib::Observer;
//! use skypass::passlib::{find_visible_pass, pass_report, SearchConfig};
//! use skypass::sgp4lib::{EarthSatellite, Sgp4Ephemeris};
//!
//! let observer = Observer::new(48.8638, 2.4485, 97.0, 0.0, 0.0)?;
//! let iss = EarthSatellite::from_tle(LINE1, LINE2, Some("ISS"))?;
//! let ephemeris = Sgp4Ephemeris::new(iss);
//!
//! let found = find_visible_pass(&ephemeris, &observer, start, &SearchConfig::default())?;
//! let report = pass_report(&ephemeris, &observer, &found.pass, 60)?;
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! ```

pub mod constants;
pub mod earthlib;
pub mod ephemlib;
pub mod eventlib;
pub mod magnitudelib;
pub mod observerlib;
pub mod passlib;
pub mod sgp4lib;
pub mod sunlib;

use chrono::{DateTime, Utc};
use thiserror::Error;

pub use ephemlib::{BodyState, Ephemeris, EphemerisError, Pass};
pub use eventlib::Event;
pub use observerlib::Observer;
pub use passlib::{
    find_visible_pass, is_pass_visible, pass_report, PassReport, SearchConfig, VisiblePass,
};

/// Crate-level error type.
///
/// Provider-level failures keep their own [`EphemerisError`] identity so a
/// caller can tell "the search gave up" apart from "the provider could not
/// produce geometry at all".
#[derive(Debug, Error)]
pub enum SkypassError {
    /// Invalid observer parameters; no computation was attempted.
    #[error("Invalid observer configuration: {0}")]
    Configuration(String),

    /// The ephemeris provider failed (propagation error or no further pass).
    #[error(transparent)]
    Ephemeris(#[from] EphemerisError),

    /// The search budget ran out without finding a visible pass.
    #[error("No visible pass found: {rejected} candidate passes rejected, search ended at {cursor}")]
    NoVisiblePass {
        /// Number of geometric passes examined and rejected.
        rejected: u32,
        /// Where the search cursor stood when the budget ran out.
        cursor: DateTime<Utc>,
    },
}
