use crate::point::{GeographicPoint, Srid};
use geo::LineString;
use serde::{Deserialize, Serialize};

/// A polygon with an exterior ring and optional holes.
///
/// Rings are stored as written; conversion to `geo` closes them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeographicPolygon {
    #[serde(default)]
    pub srid: Srid,
    pub points: Vec<GeographicPoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub holes: Vec<Vec<GeographicPoint>>,
}

impl GeographicPolygon {
    /// Create a WGS84 polygon from its exterior ring.
    pub fn new(points: Vec<GeographicPoint>) -> Self {
        Self {
            srid: Srid::WGS84,
            points,
            holes: Vec::new(),
        }
    }

    pub fn with_srid(mut self, srid: Srid) -> Self {
        self.srid = srid;
        self
    }

    pub fn exterior(&self) -> &[GeographicPoint] {
        &self.points
    }

    pub fn to_geo(&self) -> geo::Polygon<f64> {
        let ring = |points: &[GeographicPoint]| -> LineString<f64> {
            points.iter().map(GeographicPoint::coord).collect()
        };
        geo::Polygon::new(ring(&self.points), self.holes.iter().map(|h| ring(h)).collect())
    }

    pub fn from_geo(polygon: &geo::Polygon<f64>, srid: Srid) -> Self {
        let ring = |line: &LineString<f64>| -> Vec<GeographicPoint> {
            line.coords()
                .map(|c| GeographicPoint::from_coord(c, srid))
                .collect()
        };
        Self {
            srid,
            points: ring(polygon.exterior()),
            holes: polygon.interiors().iter().map(ring).collect(),
        }
    }
}

/// Several polygons sharing one spatial reference.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeographicMultiPolygon {
    #[serde(default)]
    pub srid: Srid,
    pub polygons: Vec<GeographicPolygon>,
}

impl GeographicMultiPolygon {
    pub fn new(polygons: Vec<GeographicPolygon>) -> Self {
        Self {
            srid: Srid::WGS84,
            polygons,
        }
    }

    pub fn to_geo(&self) -> geo::MultiPolygon<f64> {
        geo::MultiPolygon(self.polygons.iter().map(GeographicPolygon::to_geo).collect())
    }

    pub fn from_geo(multi: &geo::MultiPolygon<f64>, srid: Srid) -> Self {
        Self {
            srid,
            polygons: multi
                .0
                .iter()
                .map(|p| GeographicPolygon::from_geo(p, srid))
                .collect(),
        }
    }
}
