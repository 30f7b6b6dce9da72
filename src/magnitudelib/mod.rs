//! Apparent visual magnitude of a sunlit satellite
//!
//! Solves the observer–sun–satellite triangle with the spherical law of
//! cosines: the angular separation of the two bodies on the observer's sky
//! fixes the triangle's apex angle, the plane law of cosines yields the
//! sun–satellite side and the phase angle at the satellite, and a standard
//! diffuse-sphere phase function turns range and phase angle into a
//! magnitude.
//!
//! # Example
//!
//! ```ignore
//! use skypass::magnitudelib::satellite_magnitude;
//!
//! let sun = ephemeris.sun_at(&observer, t)?;
//! let sat = ephemeris.satellite_at(&observer, t)?;
//! let mag = satellite_magnitude(&sun, &sat)?;
//! ```

use thiserror::Error;

use crate::constants::EARTH_RADIUS_KM;
use crate::ephemlib::BodyState;

/// Intrinsic magnitude of the modeled satellite at the reference geometry
const INTRINSIC_MAGNITUDE: f64 = -1.3;

/// Error type for magnitude calculations.
#[derive(Debug, Error)]
pub enum MagnitudeError {
    /// The phase function argument `sin(A) + (π − A)·cos(A)` is not
    /// positive, which happens at physically degenerate phase angles.
    /// Callers treat the instant as not visible rather than aborting.
    #[error("Degenerate phase angle {phase_angle} rad: phase function argument {argument} is not positive")]
    DegeneratePhase { phase_angle: f64, argument: f64 },
}

/// Apparent visual magnitude of the satellite given the sun's and the
/// satellite's topocentric states at the same instant.
///
/// Deterministic pure function of its inputs; lower values are brighter.
///
/// # Errors
///
/// [`MagnitudeError::DegeneratePhase`] when the phase function is outside
/// the domain of the logarithm.
pub fn satellite_magnitude(sun: &BodyState, sat: &BodyState) -> Result<f64, MagnitudeError> {
    // Observer→sun distance: geocentric solar distance less Earth's radius
    let a = sun.range_km - EARTH_RADIUS_KM;
    let b = sat.range_km;

    // Apex angle at the observer between the two apparent directions
    let angle_c = separation(sat.azimuth, sat.altitude, sun.azimuth, sun.altitude);

    // Third side (sun→satellite) and phase angle at the satellite
    let c = (a * a + b * b - 2.0 * a * b * angle_c.cos()).sqrt();
    let phase_angle = ((b * b + c * c - a * a) / (2.0 * b * c)).clamp(-1.0, 1.0).acos();

    magnitude_from_phase(b, phase_angle)
}

/// Magnitude of a diffuse sphere of the reference intrinsic brightness at
/// `range_km` from the observer, seen at `phase_angle` radians.
///
/// This is the inner formula of [`satellite_magnitude`], exposed so the
/// reference geometry can be pinned directly in tests.
pub fn magnitude_from_phase(range_km: f64, phase_angle: f64) -> Result<f64, MagnitudeError> {
    let argument =
        phase_angle.sin() + (std::f64::consts::PI - phase_angle) * phase_angle.cos();
    if argument <= 0.0 {
        return Err(MagnitudeError::DegeneratePhase {
            phase_angle,
            argument,
        });
    }
    Ok(INTRINSIC_MAGNITUDE - 15.0 + 5.0 * range_km.log10() - 2.5 * argument.log10())
}

/// Great-circle separation between two sky directions given as
/// (azimuth, altitude) pairs in radians.
pub fn separation(az1: f64, alt1: f64, az2: f64, alt2: f64) -> f64 {
    let cos_sep =
        alt1.sin() * alt2.sin() + alt1.cos() * alt2.cos() * (az1 - az2).cos();
    cos_sep.clamp(-1.0, 1.0).acos()
}
