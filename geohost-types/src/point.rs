use serde::{Deserialize, Serialize};
use std::fmt;

/// Spatial reference identifier tagging the coordinate system of a value.
///
/// # Examples
///
/// ```
/// use geohost_types::point::Srid;
///
/// assert_eq!(Srid::default(), Srid::WGS84);
/// assert_eq!(Srid::WEB_MERCATOR.code(), 3857);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Srid(pub i32);

impl Srid {
    /// Geographic WGS84 (EPSG:4326).
    pub const WGS84: Srid = Srid(4326);
    /// Spherical Web Mercator (EPSG:3857).
    pub const WEB_MERCATOR: Srid = Srid(3857);

    pub const fn code(self) -> i32 {
        self.0
    }

    /// Replaces the unset identifier `0` with WGS84.
    pub fn or_default(self) -> Srid {
        if self.0 == 0 { Srid::WGS84 } else { self }
    }
}

impl Default for Srid {
    fn default() -> Self {
        Srid::WGS84
    }
}

impl fmt::Display for Srid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}

/// A latitude/longitude pair tagged with its spatial reference.
///
/// When converted to `geo` or GeoJSON the latitude is the first (x)
/// coordinate and the longitude the second (y), which is the order the
/// map widget consuming this data expects.
///
/// # Examples
///
/// ```
/// use geohost_types::point::GeographicPoint;
///
/// let moscow = GeographicPoint::new(55.7558, 37.6173);
/// assert_eq!(moscow.to_geo().x(), 55.7558);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeographicPoint {
    #[serde(default)]
    pub srid: Srid,
    pub latitude: f64,
    pub longitude: f64,
}

impl GeographicPoint {
    /// Create a WGS84 point.
    #[inline]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            srid: Srid::WGS84,
            latitude,
            longitude,
        }
    }

    #[inline]
    pub fn with_srid(srid: Srid, latitude: f64, longitude: f64) -> Self {
        Self {
            srid,
            latitude,
            longitude,
        }
    }

    #[inline]
    pub fn to_geo(&self) -> geo::Point<f64> {
        geo::Point::new(self.latitude, self.longitude)
    }

    #[inline]
    pub fn from_geo(point: &geo::Point<f64>, srid: Srid) -> Self {
        Self::with_srid(srid, point.x(), point.y())
    }

    pub(crate) fn coord(&self) -> geo::Coord<f64> {
        geo::coord! { x: self.latitude, y: self.longitude }
    }

    pub(crate) fn from_coord(coord: &geo::Coord<f64>, srid: Srid) -> Self {
        Self::with_srid(srid, coord.x, coord.y)
    }
}
