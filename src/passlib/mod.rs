//! Visible-pass search and the pass report
//!
//! The search loop is a two-state machine. While SEARCHING it asks the
//! ephemeris provider for the next geometric pass after the cursor,
//! samples the candidate densely, and classifies it; an invisible
//! candidate advances the cursor to the candidate's set time, which
//! guarantees forward progress. A visible candidate moves the machine to
//! FOUND. The loop carries an explicit pass budget and fails with a named
//! error when it runs out, so a site with no useful passes degrades into a
//! diagnosable failure instead of an unbounded scan.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::ephemlib::{Ephemeris, Pass};
use crate::eventlib::{self, Event};
use crate::observerlib::Observer;
use crate::SkypassError;

/// Magnitude a sample must beat to count as naked-eye visible.
pub const VISIBLE_MAGNITUDE_LIMIT: f64 = -0.5;

/// Step of the dense classification sample, in seconds.
///
/// Classification is decided purely by sampled instants, so this
/// resolution is correctness-relevant and stays fixed at one second no
/// matter how coarse the requested output series is.
pub const CLASSIFICATION_STEP_S: u32 = 1;

/// Default step of the output event series, in seconds.
pub const DEFAULT_REPORT_STEP_S: u32 = 60;

/// Tunables of the visible-pass search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Visibility threshold; a sample must be brighter (lower) than this
    pub magnitude_limit: f64,
    /// How many geometric candidates to examine before giving up
    pub max_passes: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            magnitude_limit: VISIBLE_MAGNITUDE_LIMIT,
            max_passes: 60,
        }
    }
}

/// Whether a sampled pass contains at least one naked-eye-visible instant:
/// a sample that is both out of Earth's shadow and brighter than
/// `magnitude_limit`.
///
/// No interpolation happens between samples. A NaN magnitude never
/// satisfies the comparison, so degenerate instants count as not visible.
pub fn is_pass_visible(events: &[Event], magnitude_limit: f64) -> bool {
    events
        .iter()
        .any(|event| !event.eclipsed && event.magnitude < magnitude_limit)
}

/// A pass accepted by the search, with its dense classification sample.
#[derive(Debug, Clone)]
pub struct VisiblePass {
    /// The accepted geometric pass as reported by the provider
    pub pass: Pass,
    /// The one-second sample the pass was classified on
    pub dense_events: Vec<Event>,
    /// Number of candidate passes rejected before this one
    pub rejected: u32,
}

impl VisiblePass {
    /// The highest-altitude sample of the dense series.
    ///
    /// The provider's culmination instant and this resampled maximum are
    /// both exposed on purpose; which one is the authoritative "maximum"
    /// main event is a consumer-level policy decision.
    pub fn peak_event(&self) -> Option<&Event> {
        self.dense_events.iter().max_by(|a, b| {
            a.altitude
                .partial_cmp(&b.altitude)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }
}

/// Search forward from `start` for the first naked-eye-visible pass.
///
/// # Errors
///
/// - [`SkypassError::NoVisiblePass`] when `config.max_passes` candidates
///   were all rejected.
/// - [`SkypassError::Ephemeris`] when the provider fails: a propagation
///   error, or no further geometric pass at all (which is a different
///   condition than "kept searching and gave up").
pub fn find_visible_pass<E: Ephemeris>(
    ephemeris: &E,
    observer: &Observer,
    start: DateTime<Utc>,
    config: &SearchConfig,
) -> Result<VisiblePass, SkypassError> {
    let mut cursor = start;

    for rejected in 0..config.max_passes {
        let pass = ephemeris.next_pass(observer, cursor)?;
        let dense_events = eventlib::sample_events(
            ephemeris,
            observer,
            pass.rise_time,
            pass.set_time,
            CLASSIFICATION_STEP_S,
        );

        if is_pass_visible(&dense_events, config.magnitude_limit) {
            info!(rise = %pass.rise_time, rejected, "visible pass found");
            return Ok(VisiblePass {
                pass,
                dense_events,
                rejected,
            });
        }

        debug!(
            rise = %pass.rise_time,
            set = %pass.set_time,
            "candidate pass not visible, advancing cursor"
        );
        cursor = pass.set_time;
    }

    Err(SkypassError::NoVisiblePass {
        rejected: config.max_passes,
        cursor,
    })
}

/// The three characteristic events of the accepted pass.
///
/// `maximum` is sampled at the culmination instant the provider reported;
/// see [`VisiblePass::peak_event`] for the resampled alternative.
#[derive(Debug, Clone, Serialize)]
pub struct MainEvents {
    pub rise: Event,
    pub maximum: Event,
    pub set: Event,
}

/// The output document of a prediction run, shaped for the external
/// formatter.
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    /// Observer longitude in degrees
    pub longitude: f64,
    /// Observer latitude in degrees
    pub latitude: f64,
    /// Observer elevation in meters
    pub elevation: f64,
    /// Observer pressure in hPa
    pub pressure: f64,
    /// Rise, maximum, and set events of the pass
    pub main_events: MainEvents,
    /// Step-sampled series across the pass
    pub events: Vec<Event>,
}

/// Render an accepted pass into the output document, sampling the series
/// at `step_seconds`.
///
/// # Errors
///
/// A propagation failure at one of the three main-event instants is fatal
/// here; unlike a dropped series sample, the document cannot be built
/// without them.
pub fn pass_report<E: Ephemeris>(
    ephemeris: &E,
    observer: &Observer,
    pass: &Pass,
    step_seconds: u32,
) -> Result<PassReport, SkypassError> {
    let events = eventlib::sample_events(
        ephemeris,
        observer,
        pass.rise_time,
        pass.set_time,
        step_seconds,
    );

    let main_events = MainEvents {
        rise: eventlib::event_at(ephemeris, observer, pass.rise_time)?,
        maximum: eventlib::event_at(ephemeris, observer, pass.culmination_time)?,
        set: eventlib::event_at(ephemeris, observer, pass.set_time)?,
    };

    Ok(PassReport {
        longitude: observer.longitude_deg,
        latitude: observer.latitude_deg,
        elevation: observer.elevation_m,
        pressure: observer.pressure_hpa,
        main_events,
        events,
    })
}
