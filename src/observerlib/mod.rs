//! Ground observer configuration
//!
//! An [`Observer`] describes the site a pass prediction is made for. It is
//! validated once at construction and then shared read-only by every
//! provider call; nothing in the crate ever mutates it.

use crate::SkypassError;

/// An observing site on the ground.
#[derive(Debug, Clone)]
pub struct Observer {
    /// Geodetic latitude in degrees, positive north
    pub latitude_deg: f64,
    /// Geodetic longitude in degrees, positive east
    pub longitude_deg: f64,
    /// Elevation above the WGS84 ellipsoid in meters
    pub elevation_m: f64,
    /// Atmospheric pressure in hPa; 0 disables refraction correction
    pub pressure_hpa: f64,
    /// Minimum altitude in degrees at which a body counts as risen
    pub horizon_deg: f64,
}

impl Observer {
    /// Validate and build an observer.
    ///
    /// # Errors
    ///
    /// Returns [`SkypassError::Configuration`] when any parameter is out of
    /// range or not finite. No computation is attempted on an invalid site.
    pub fn new(
        latitude_deg: f64,
        longitude_deg: f64,
        elevation_m: f64,
        pressure_hpa: f64,
        horizon_deg: f64,
    ) -> Result<Self, SkypassError> {
        if !latitude_deg.is_finite() || !(-90.0..=90.0).contains(&latitude_deg) {
            return Err(SkypassError::Configuration(format!(
                "latitude must be within [-90, 90] degrees, got {latitude_deg}"
            )));
        }
        if !longitude_deg.is_finite() || !(-180.0..=180.0).contains(&longitude_deg) {
            return Err(SkypassError::Configuration(format!(
                "longitude must be within [-180, 180] degrees, got {longitude_deg}"
            )));
        }
        if !elevation_m.is_finite() {
            return Err(SkypassError::Configuration(format!(
                "elevation must be finite, got {elevation_m}"
            )));
        }
        if !pressure_hpa.is_finite() || pressure_hpa < 0.0 {
            return Err(SkypassError::Configuration(format!(
                "pressure must be zero or positive, got {pressure_hpa}"
            )));
        }
        if !horizon_deg.is_finite() || !(-90.0..=90.0).contains(&horizon_deg) {
            return Err(SkypassError::Configuration(format!(
                "horizon cutoff must be within [-90, 90] degrees, got {horizon_deg}"
            )));
        }

        Ok(Observer {
            latitude_deg,
            longitude_deg,
            elevation_m,
            pressure_hpa,
            horizon_deg,
        })
    }

    /// Whether refraction correction is enabled for this site.
    pub fn refraction_enabled(&self) -> bool {
        self.pressure_hpa > 0.0
    }
}

impl std::fmt::Display for Observer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ns = if self.latitude_deg >= 0.0 { "N" } else { "S" };
        let ew = if self.longitude_deg >= 0.0 { "E" } else { "W" };
        write!(
            f,
            "{:.4}° {}, {:.4}° {}, {:.1} m",
            self.latitude_deg.abs(),
            ns,
            self.longitude_deg.abs(),
            ew,
            self.elevation_m
        )
    }
}
