//! Quadkey tile indexing and viewport clustering for geographic points.
//!
//! Points are projected with an ellipsoidal Mercator, dropped into the tile
//! grid at `max_zoom` and stored under the numeric value of their quadkey.
//! A viewport query becomes a set of tile ids plus two shift amounts; shifting
//! a stored key right by them yields its tile and its cluster bucket.
//!
//! ```rust
//! use geohost::prelude::*;
//!
//! let system = GeographicSystem::new(Config::default())?;
//! let key = system.coordinates_to_quad_key(55.7558, 37.6173);
//!
//! let request = parse_map_request("", "154,80,154,80", "8", "cb", "", "2")?;
//! let query = system.cluster_query(&request)?;
//! assert!(query.contains(key.to_u64()));
//! assert_eq!(query.tile_shift, 30);
//! # Ok::<(), geohost::GeoError>(())
//! ```

pub mod config;
pub mod error;
pub mod feature_collection;
pub mod geo_system;
pub mod projection;
pub mod quadkey;
pub mod quadkey_system;
pub mod request;
pub mod source;
pub mod tile;
pub mod tile_system;

#[cfg(feature = "wkb")]
pub mod wkb;

pub use config::{Config, Srid};
pub use error::{GeoError, Result};
pub use feature_collection::FeatureCollection;
pub use geo_system::GeographicSystem;
pub use projection::{EllipsoidalMercator, Projection};
pub use quadkey::QuadKey;
pub use quadkey_system::QuadKeySystem;
pub use request::{BBox, MapRequest, TileBBox, parse_map_request};
pub use source::{Cluster, ClusterPlacement, DataSource, GeoObject, MemorySource};
pub use tile::{ClusterQuery, Tile};
pub use tile_system::TileSystem;

pub use geohost_types::{
    GeographicCollection, GeographicMultiPolygon, GeographicPoint, GeographicPolygon,
    GeometryError, Primitive,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {
    pub use crate::{Config, GeoError, GeographicSystem, Result, Srid};

    pub use crate::{BBox, MapRequest, TileBBox, parse_map_request};

    pub use crate::{ClusterQuery, QuadKey, Tile};

    pub use crate::{DataSource, FeatureCollection, GeoObject, MemorySource};

    pub use crate::{GeographicPoint, Primitive};
}
