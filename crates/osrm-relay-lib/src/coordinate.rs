//! Coordinates and coordinate sequences as the engine expects them in the
//! query path (`lon,lat;lon,lat;...`).

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

/// A `lon,lat` pair carried as its formatted text.
///
/// Text supplied by callers is kept as given (trimmed) once validated, so the
/// engine sees exactly what was requested. Coordinates built from numbers use
/// six decimal places.
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinate {
    text: String,
    lon: f64,
    lat: f64,
}

impl Coordinate {
    /// Build a coordinate from numeric components, formatted with 6 decimals.
    pub fn from_lon_lat(lon: f64, lat: f64) -> Self {
        Self {
            text: format!("{:.6},{:.6}", lon, lat),
            lon,
            lat,
        }
    }

    /// Build a coordinate from an engine `location` array (`[lon, lat]`).
    ///
    /// Returns `None` when fewer than two components are present.
    pub fn from_location(location: &[f64]) -> Option<Self> {
        match location {
            [lon, lat, ..] => Some(Self::from_lon_lat(*lon, *lat)),
            _ => None,
        }
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl FromStr for Coordinate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        let invalid = |reason: &str| Error::InvalidCoordinate {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = text.split(',');
        let (lon_text, lat_text) = match (parts.next(), parts.next(), parts.next()) {
            (Some(lon), Some(lat), None) => (lon.trim(), lat.trim()),
            _ => return Err(invalid("expected 'lon,lat'")),
        };

        let lon: f64 = lon_text
            .parse()
            .map_err(|_| invalid("longitude is not a number"))?;
        let lat: f64 = lat_text
            .parse()
            .map_err(|_| invalid("latitude is not a number"))?;

        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(invalid("longitude must be within [-180, 180]"));
        }
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(invalid("latitude must be within [-90, 90]"));
        }

        Ok(Self {
            text: format!("{},{}", lon_text, lat_text),
            lon,
            lat,
        })
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for Coordinate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

/// Ordered, non-empty list of coordinates joined by `;` in the query path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinateSequence(Vec<Coordinate>);

impl CoordinateSequence {
    /// Wrap a list of coordinates. Returns `None` for an empty list.
    pub fn new(points: Vec<Coordinate>) -> Option<Self> {
        if points.is_empty() {
            None
        } else {
            Some(Self(points))
        }
    }

    /// A sequence holding one coordinate, as used for `nearest`.
    pub fn single(point: Coordinate) -> Self {
        Self(vec![point])
    }

    /// Build `[start, via..., end]`; always at least two points.
    pub fn route(start: &Coordinate, via: &[Coordinate], end: &Coordinate) -> Self {
        let mut points = Vec::with_capacity(via.len() + 2);
        points.push(start.clone());
        points.extend(via.iter().cloned());
        points.push(end.clone());
        Self(points)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.0
    }

    pub fn first(&self) -> &Coordinate {
        &self.0[0]
    }

    pub fn last(&self) -> &Coordinate {
        &self.0[self.0.len() - 1]
    }

    /// Points strictly between the first and the last.
    pub fn interior(&self) -> &[Coordinate] {
        if self.0.len() <= 2 {
            &[]
        } else {
            &self.0[1..self.0.len() - 1]
        }
    }
}

impl FromStr for CoordinateSequence {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let points = s
            .split(';')
            .filter(|part| !part.trim().is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Coordinate>>>()?;

        Self::new(points).ok_or_else(|| Error::InvalidCoordinate {
            input: s.to_string(),
            reason: "no coordinates given".to_string(),
        })
    }
}

impl fmt::Display for CoordinateSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, point) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(";")?;
            }
            f.write_str(point.as_str())?;
        }
        Ok(())
    }
}
