//! # geohost-types
//!
//! Geometry primitives for the geohost tile index.
//!
//! - **Points**: [`GeographicPoint`](point::GeographicPoint) tagged with an [`Srid`](point::Srid)
//! - **Polygons**: [`GeographicPolygon`](polygon::GeographicPolygon),
//!   [`GeographicMultiPolygon`](polygon::GeographicMultiPolygon)
//! - **Collections**: [`GeographicCollection`](primitive::GeographicCollection), which nests
//!   any [`Primitive`](primitive::Primitive)
//!
//! Every type converts to and from `geo` geometries. With the `geojson`
//! feature, primitives also convert to and from `geojson::Geometry`.
//!
//! ## Examples
//!
//! ```rust
//! use geohost_types::point::GeographicPoint;
//! use geohost_types::primitive::Primitive;
//!
//! let point = GeographicPoint::new(55.7558, 37.6173);
//! let geometry = Primitive::from(point).to_geo();
//! assert!(matches!(geometry, geo::Geometry::Point(_)));
//! ```

pub mod point;
pub mod polygon;
pub mod primitive;

pub use point::{GeographicPoint, Srid};
pub use polygon::{GeographicMultiPolygon, GeographicPolygon};
pub use primitive::{GeographicCollection, GeometryError, Primitive};
