//! GPS position parsing for LeafSpy log rows.
//!
//! LeafSpy writes latitude and longitude either as signed decimal degrees
//! (`44.95094`) or as degrees followed by decimal minutes (`44 57.0564`),
//! optionally tagged with a hemisphere letter (`N44 57.0564`, `93 05.8394W`).
//! Elevation is a plain decimal number in meters.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use thiserror::Error;

/// Coordinate pattern: optional hemisphere prefix, optional sign, degrees,
/// optional decimal minutes, optional hemisphere suffix
static COORDINATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?<prefix>[NSEW])?\s*(?<sign>[+-])?(?<deg>\d+(?:\.\d+)?)(?:\s+(?<min>\d+(?:\.\d+)?))?\s*(?<suffix>[NSEW])?$",
    )
    .expect("Invalid regex pattern")
});

/// Error produced when the three position columns cannot be interpreted
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocationError {
    #[error("invalid {axis} {value:?}")]
    InvalidCoordinate { axis: &'static str, value: String },

    #[error("{axis} {value} is out of range")]
    OutOfRange { axis: &'static str, value: f64 },

    #[error("invalid elevation {0:?}")]
    InvalidElevation(String),
}

/// Vehicle position at the time of a sample
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Location {
    /// Decimal degrees, positive north
    pub latitude: f64,
    /// Decimal degrees, positive east
    pub longitude: f64,
    /// Meters above sea level
    pub elevation: f64,
}

#[derive(Clone, Copy)]
enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    fn name(self) -> &'static str {
        match self {
            Axis::Latitude => "latitude",
            Axis::Longitude => "longitude",
        }
    }

    fn limit(self) -> f64 {
        match self {
            Axis::Latitude => 90.0,
            Axis::Longitude => 180.0,
        }
    }

    /// Returns the sign implied by a hemisphere letter, or None if the
    /// letter belongs to the other axis
    fn hemisphere_sign(self, letter: &str) -> Option<f64> {
        match (self, letter) {
            (Axis::Latitude, "N") | (Axis::Longitude, "E") => Some(1.0),
            (Axis::Latitude, "S") | (Axis::Longitude, "W") => Some(-1.0),
            _ => None,
        }
    }
}

/// Parse the latitude, longitude and elevation columns of a row
pub fn parse_location(lat: &str, long: &str, elv: &str) -> Result<Location, LocationError> {
    let latitude = parse_coordinate(lat, Axis::Latitude)?;
    let longitude = parse_coordinate(long, Axis::Longitude)?;
    let elevation = elv
        .trim()
        .parse::<f64>()
        .map_err(|_| LocationError::InvalidElevation(elv.to_string()))?;

    Ok(Location {
        latitude,
        longitude,
        elevation,
    })
}

fn parse_coordinate(raw: &str, axis: Axis) -> Result<f64, LocationError> {
    let invalid = || LocationError::InvalidCoordinate {
        axis: axis.name(),
        value: raw.to_string(),
    };

    let caps = COORDINATE_REGEX.captures(raw.trim()).ok_or_else(invalid)?;

    // At most one way of expressing direction
    let hemisphere = match (caps.name("prefix"), caps.name("suffix")) {
        (Some(_), Some(_)) => return Err(invalid()),
        (Some(h), None) | (None, Some(h)) => Some(h.as_str()),
        (None, None) => None,
    };
    let sign = match (hemisphere, caps.name("sign").map(|m| m.as_str())) {
        (Some(_), Some(_)) => return Err(invalid()),
        (Some(h), None) => axis.hemisphere_sign(h).ok_or_else(invalid)?,
        (None, Some("-")) => -1.0,
        (None, _) => 1.0,
    };

    let degrees_str = &caps["deg"];
    let degrees: f64 = degrees_str.parse().map_err(|_| invalid())?;

    let magnitude = match caps.name("min") {
        Some(min) => {
            // Fractional degrees cannot be combined with minutes
            if degrees_str.contains('.') {
                return Err(invalid());
            }
            let minutes: f64 = min.as_str().parse().map_err(|_| invalid())?;
            if minutes >= 60.0 {
                return Err(invalid());
            }
            degrees + minutes / 60.0
        }
        None => degrees,
    };

    if magnitude > axis.limit() {
        return Err(LocationError::OutOfRange {
            axis: axis.name(),
            value: sign * magnitude,
        });
    }

    Ok(sign * magnitude)
}
