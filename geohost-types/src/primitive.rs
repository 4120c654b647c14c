//! The tagged union over every supported geometry primitive.

use crate::point::{GeographicPoint, Srid};
use crate::polygon::{GeographicMultiPolygon, GeographicPolygon};
use serde::{Deserialize, Serialize};

/// Errors raised while converting foreign geometry values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("unsupported geometry type: {0}")]
    UnsupportedGeometryType(String),

    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(String),
}

/// An ordered, possibly nested group of primitives.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeographicCollection {
    #[serde(default)]
    pub srid: Srid,
    pub figures: Vec<Primitive>,
}

impl GeographicCollection {
    pub fn new(figures: Vec<Primitive>) -> Self {
        Self {
            srid: Srid::WGS84,
            figures,
        }
    }
}

/// Point, polygon, multi-polygon or collection.
///
/// # Examples
///
/// ```
/// use geohost_types::point::{GeographicPoint, Srid};
/// use geohost_types::primitive::Primitive;
///
/// let primitive = Primitive::from(GeographicPoint::new(1.0, 2.0));
/// let restored = Primitive::from_geo(&primitive.to_geo(), Srid::WGS84).unwrap();
/// assert_eq!(primitive, restored);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Primitive {
    Point(GeographicPoint),
    Polygon(GeographicPolygon),
    MultiPolygon(GeographicMultiPolygon),
    Collection(GeographicCollection),
}

impl Primitive {
    pub fn srid(&self) -> Srid {
        match self {
            Primitive::Point(p) => p.srid,
            Primitive::Polygon(p) => p.srid,
            Primitive::MultiPolygon(p) => p.srid,
            Primitive::Collection(c) => c.srid,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Primitive::Point(_) => "Point",
            Primitive::Polygon(_) => "Polygon",
            Primitive::MultiPolygon(_) => "MultiPolygon",
            Primitive::Collection(_) => "GeometryCollection",
        }
    }

    pub fn to_geo(&self) -> geo::Geometry<f64> {
        match self {
            Primitive::Point(p) => geo::Geometry::Point(p.to_geo()),
            Primitive::Polygon(p) => geo::Geometry::Polygon(p.to_geo()),
            Primitive::MultiPolygon(p) => geo::Geometry::MultiPolygon(p.to_geo()),
            Primitive::Collection(c) => geo::Geometry::GeometryCollection(geo::GeometryCollection(
                c.figures.iter().map(Primitive::to_geo).collect(),
            )),
        }
    }

    /// Convert a `geo` geometry, tagging every nested value with `srid`.
    ///
    /// Lines, multi-points, multi-lines, rects and triangles are rejected.
    pub fn from_geo(geometry: &geo::Geometry<f64>, srid: Srid) -> Result<Self, GeometryError> {
        use geo::Geometry as G;
        match geometry {
            G::Point(p) => Ok(Primitive::Point(GeographicPoint::from_geo(p, srid))),
            G::Polygon(p) => Ok(Primitive::Polygon(GeographicPolygon::from_geo(p, srid))),
            G::MultiPolygon(m) => Ok(Primitive::MultiPolygon(GeographicMultiPolygon::from_geo(
                m, srid,
            ))),
            G::GeometryCollection(gc) => {
                let figures = gc
                    .0
                    .iter()
                    .map(|g| Primitive::from_geo(g, srid))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Primitive::Collection(GeographicCollection { srid, figures }))
            }
            other => Err(GeometryError::UnsupportedGeometryType(
                geo_type_name(other).to_string(),
            )),
        }
    }
}

fn geo_type_name(geometry: &geo::Geometry<f64>) -> &'static str {
    use geo::Geometry as G;
    match geometry {
        G::Point(_) => "Point",
        G::Line(_) => "Line",
        G::LineString(_) => "LineString",
        G::Polygon(_) => "Polygon",
        G::MultiPoint(_) => "MultiPoint",
        G::MultiLineString(_) => "MultiLineString",
        G::MultiPolygon(_) => "MultiPolygon",
        G::GeometryCollection(_) => "GeometryCollection",
        G::Rect(_) => "Rect",
        G::Triangle(_) => "Triangle",
    }
}

impl From<GeographicPoint> for Primitive {
    fn from(value: GeographicPoint) -> Self {
        Primitive::Point(value)
    }
}

impl From<GeographicPolygon> for Primitive {
    fn from(value: GeographicPolygon) -> Self {
        Primitive::Polygon(value)
    }
}

impl From<GeographicMultiPolygon> for Primitive {
    fn from(value: GeographicMultiPolygon) -> Self {
        Primitive::MultiPolygon(value)
    }
}

impl From<GeographicCollection> for Primitive {
    fn from(value: GeographicCollection) -> Self {
        Primitive::Collection(value)
    }
}

#[cfg(feature = "geojson")]
mod geojson_conversion {
    use super::*;
    use geojson::{Geometry, Value};

    fn position(point: &GeographicPoint) -> Vec<f64> {
        vec![point.latitude, point.longitude]
    }

    fn rings(polygon: &GeographicPolygon) -> Vec<Vec<Vec<f64>>> {
        std::iter::once(&polygon.points)
            .chain(polygon.holes.iter())
            .map(|ring| ring.iter().map(position).collect())
            .collect()
    }

    fn point_at(coords: &[f64], srid: Srid) -> Result<GeographicPoint, GeometryError> {
        match coords {
            [lat, lon, ..] => Ok(GeographicPoint::with_srid(srid, *lat, *lon)),
            _ => Err(GeometryError::InvalidCoordinates(format!(
                "position needs 2 values, got {}",
                coords.len()
            ))),
        }
    }

    fn polygon_at(rings: &[Vec<Vec<f64>>], srid: Srid) -> Result<GeographicPolygon, GeometryError> {
        let mut parsed = rings
            .iter()
            .map(|ring| {
                ring.iter()
                    .map(|c| point_at(c, srid))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<Vec<_>>, _>>()?;
        if parsed.is_empty() {
            return Err(GeometryError::InvalidCoordinates(
                "polygon must have at least one ring".to_string(),
            ));
        }
        let points = parsed.remove(0);
        Ok(GeographicPolygon {
            srid,
            points,
            holes: parsed,
        })
    }

    impl Primitive {
        /// Render as a GeoJSON geometry with `[latitude, longitude]` positions.
        pub fn to_geojson(&self) -> Geometry {
            let value = match self {
                Primitive::Point(p) => Value::Point(position(p)),
                Primitive::Polygon(p) => Value::Polygon(rings(p)),
                Primitive::MultiPolygon(m) => {
                    Value::MultiPolygon(m.polygons.iter().map(rings).collect())
                }
                Primitive::Collection(c) => {
                    Value::GeometryCollection(c.figures.iter().map(Primitive::to_geojson).collect())
                }
            };
            Geometry::new(value)
        }

        pub fn from_geojson(geometry: &Geometry, srid: Srid) -> Result<Self, GeometryError> {
            match &geometry.value {
                Value::Point(coords) => Ok(Primitive::Point(point_at(coords, srid)?)),
                Value::Polygon(rings) => Ok(Primitive::Polygon(polygon_at(rings, srid)?)),
                Value::MultiPolygon(polygons) => {
                    let polygons = polygons
                        .iter()
                        .map(|p| polygon_at(p, srid))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(Primitive::MultiPolygon(GeographicMultiPolygon {
                        srid,
                        polygons,
                    }))
                }
                Value::GeometryCollection(geometries) => {
                    let figures = geometries
                        .iter()
                        .map(|g| Primitive::from_geojson(g, srid))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(Primitive::Collection(GeographicCollection { srid, figures }))
                }
                Value::LineString(_) => Err(GeometryError::UnsupportedGeometryType(
                    "LineString".to_string(),
                )),
                Value::MultiPoint(_) => Err(GeometryError::UnsupportedGeometryType(
                    "MultiPoint".to_string(),
                )),
                Value::MultiLineString(_) => Err(GeometryError::UnsupportedGeometryType(
                    "MultiLineString".to_string(),
                )),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::line_string;

    fn sample_collection() -> GeographicCollection {
        let polygon = GeographicPolygon::new(vec![
            GeographicPoint::new(1.0, 1.0),
            GeographicPoint::new(2.0, 2.0),
            GeographicPoint::new(3.0, 3.0),
            GeographicPoint::new(1.0, 1.0),
        ]);
        GeographicCollection::new(vec![
            Primitive::Polygon(polygon),
            Primitive::Point(GeographicPoint::new(1.0, 1.0)),
        ])
    }

    #[test]
    fn test_collection_roundtrip_through_geo() {
        let collection = Primitive::Collection(sample_collection());
        let restored = Primitive::from_geo(&collection.to_geo(), Srid::WGS84).unwrap();
        assert_eq!(collection, restored);
    }

    #[test]
    fn test_nested_collection() {
        let nested = GeographicCollection::new(vec![Primitive::Collection(sample_collection())]);
        let geometry = Primitive::Collection(nested).to_geo();
        match Primitive::from_geo(&geometry, Srid::WGS84).unwrap() {
            Primitive::Collection(outer) => match &outer.figures[0] {
                Primitive::Collection(inner) => assert_eq!(inner.figures.len(), 2),
                other => panic!("expected nested collection, got {}", other.type_name()),
            },
            other => panic!("expected collection, got {}", other.type_name()),
        }
    }

    #[test]
    fn test_unsupported_geometry_rejected() {
        let line = geo::Geometry::LineString(geo::line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)]);
        let err = Primitive::from_geo(&line, Srid::WGS84).unwrap_err();
        assert_eq!(
            err,
            GeometryError::UnsupportedGeometryType("LineString".to_string())
        );
    }

    #[test]
    fn test_collection_with_unsupported_member_fails() {
        let gc = geo::Geometry::GeometryCollection(geo::GeometryCollection(vec![
            geo::Geometry::Point(geo::Point::new(1.0, 1.0)),
            geo::Geometry::Rect(geo::Rect::new(
                geo::coord! { x: 0.0, y: 0.0 },
                geo::coord! { x: 1.0, y: 1.0 },
            )),
        ]));
        assert!(Primitive::from_geo(&gc, Srid::WGS84).is_err());
    }

    #[cfg(feature = "geojson")]
    #[test]
    fn test_geojson_point_order() {
        let point = Primitive::Point(GeographicPoint::new(55.75, 37.61));
        let json = point.to_geojson();
        match &json.value {
            geojson::Value::Point(coords) => assert_eq!(coords, &vec![55.75, 37.61]),
            _ => panic!("expected point"),
        }
        let restored = Primitive::from_geojson(&json, Srid::WGS84).unwrap();
        assert_eq!(restored, point);
    }

    #[cfg(feature = "geojson")]
    #[test]
    fn test_geojson_line_string_rejected() {
        let geometry = geojson::Geometry::new(geojson::Value::LineString(vec![
            vec![0.0, 0.0],
            vec![1.0, 1.0],
        ]));
        assert!(matches!(
            Primitive::from_geojson(&geometry, Srid::WGS84),
            Err(GeometryError::UnsupportedGeometryType(_))
        ));
    }
}
