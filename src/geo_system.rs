//! The geographic system: projection, tiling and quadkeys behind one value.

use crate::config::Config;
use crate::error::{GeoError, Result};
use crate::feature_collection::FeatureCollection;
use crate::projection::{EllipsoidalMercator, Projection};
use crate::quadkey::QuadKey;
use crate::quadkey_system::QuadKeySystem;
use crate::request::{BBox, MapRequest, TileBBox};
use crate::tile::{ClusterQuery, Tile};
use crate::tile_system::TileSystem;
use geohost_types::{GeographicPoint, GeographicPolygon, Primitive};
use geojson::JsonObject;
use serde_json::json;
use std::collections::BTreeMap;

const VIEWPORT_FILL: &str = "rgba(27, 27, 125, 0.3)";
const TILE_FILL: &str = "rgba(27, 125, 27, 0.2)";

/// Converts between coordinates, tiles and quadkeys for one [`Config`].
///
/// Immutable after construction and safe to share between threads.
///
/// # Example
///
/// ```rust
/// use geohost::{Config, GeographicSystem};
///
/// let system = GeographicSystem::new(Config::default()).unwrap();
/// let key = system.coordinates_to_quad_key(55.7558, 37.6173);
/// assert_eq!(key.len(), 24);
/// ```
#[derive(Debug)]
pub struct GeographicSystem {
    config: Config,
    projection: Box<dyn Projection>,
    tile_system: TileSystem,
    quad_key_system: QuadKeySystem,
}

impl GeographicSystem {
    pub fn new(config: Config) -> Result<Self> {
        config.validate().map_err(GeoError::InvalidConfig)?;
        let projection = EllipsoidalMercator::for_srid(config.projection, config.tile_size);
        log::debug!(
            "Creating geographic system: projection={} eccentricity={} tile_size={} zoom={}..={}",
            config.projection,
            projection.eccentricity(),
            config.tile_size,
            config.min_zoom,
            config.max_zoom
        );
        Ok(Self::with_projection(config, Box::new(projection)))
    }

    /// Use a custom projection. The config is trusted as given.
    pub fn with_projection(config: Config, projection: Box<dyn Projection>) -> Self {
        Self {
            tile_system: TileSystem::new(config.tile_size),
            quad_key_system: QuadKeySystem::new(config.min_zoom, config.max_zoom),
            projection,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn projection(&self) -> &dyn Projection {
        self.projection.as_ref()
    }

    pub fn tile_system(&self) -> &TileSystem {
        &self.tile_system
    }

    pub fn quad_key_system(&self) -> &QuadKeySystem {
        &self.quad_key_system
    }

    /// Key of the `max_zoom` tile holding the coordinate.
    ///
    /// Coordinates projecting outside the grid are clamped to its edge.
    pub fn coordinates_to_quad_key(&self, lat: f64, lon: f64) -> QuadKey {
        let zoom = self.config.max_zoom;
        let (x, y) = self.projection.to_global_pixels(lat, lon, zoom);
        let (tx, ty) = self.tile_system.global_pixels_to_tile_xy(x, y);
        let (cx, cy) = clamp_to_grid(tx, ty, zoom);
        if (cx, cy) != (tx, ty) {
            log::warn!(
                "Coordinate ({lat}, {lon}) is outside the tile grid, clamped to tile ({cx}, {cy})"
            );
        }
        self.quad_key_system.tile_xy_to_quad_key(cx, cy, zoom)
    }

    /// Tile rectangle covering a geographic box at `zoom`.
    pub fn bbox_to_tile_bbox(&self, bbox: &BBox, zoom: u8) -> TileBBox {
        let (x1, y1) = self.projection.to_global_pixels(bbox.x_min, bbox.y_min, zoom);
        let (x2, y2) = self.projection.to_global_pixels(bbox.x_max, bbox.y_max, zoom);
        let (tx1, ty1) = self.tile_system.global_pixels_to_tile_xy(x1, y1);
        let (tx2, ty2) = self.tile_system.global_pixels_to_tile_xy(x2, y2);
        let (tx1, ty1) = clamp_to_grid(tx1, ty1, zoom);
        let (tx2, ty2) = clamp_to_grid(tx2, ty2, zoom);
        TileBBox::new(tx1.min(tx2), ty1.min(ty2), tx1.max(tx2), ty1.max(ty2))
    }

    /// Tile box of the request, derived from its geographic box when absent.
    ///
    /// An explicit tile box is cut down to the `2^zoom` grid; tiles outside it
    /// would alias keys of tiles inside.
    pub fn request_tile_bbox(&self, request: &MapRequest) -> Option<TileBBox> {
        let zoom = request.zoom;
        let Some(tile_bbox) = request.tile_bbox else {
            return request.bbox.map(|b| self.bbox_to_tile_bbox(&b, zoom));
        };
        let (x_max, y_max) = clamp_to_grid(tile_bbox.x_max, tile_bbox.y_max, zoom);
        let trimmed = TileBBox::new(tile_bbox.x_min, tile_bbox.y_min, x_max, y_max);
        if trimmed != tile_bbox {
            log::warn!(
                "Tile box {:?} exceeds the zoom {} grid, trimmed to {:?}",
                tile_bbox,
                zoom,
                trimmed
            );
        }
        Some(trimmed)
    }

    /// Rejects request zooms outside the configured `min_zoom..=max_zoom`.
    ///
    /// Tile keys at other zooms do not line up with stored point keys.
    pub fn check_zoom(&self, zoom: u8) -> Result<()> {
        let (min, max) = (self.config.min_zoom, self.config.max_zoom);
        if (min..=max).contains(&zoom) {
            Ok(())
        } else {
            Err(GeoError::InvalidInput(format!(
                "zoom {zoom} is outside the configured range {min}..={max}"
            )))
        }
    }

    /// Every tile of the viewport keyed by its id.
    pub fn viewport_to_tiles(&self, request: &MapRequest) -> Result<BTreeMap<u64, Tile>> {
        self.check_zoom(request.zoom)?;
        let mut tiles = BTreeMap::new();
        let Some(tile_bbox) = self.request_tile_bbox(request) else {
            log::warn!("Map request at zoom {} carries no bounding box", request.zoom);
            return Ok(tiles);
        };
        for (x, y) in tile_bbox.tiles() {
            let key = self.quad_key_system.tile_xy_to_quad_key(x, y, request.zoom);
            log::trace!("Viewport tile x={x} y={y} zoom={} key={key}", request.zoom);
            let tile = Tile::new(x, y, request.zoom, key);
            tiles.insert(tile.id, tile);
        }
        Ok(tiles)
    }

    /// Tiles and shift amounts a storage backend needs to cluster the viewport.
    pub fn cluster_query(&self, request: &MapRequest) -> Result<ClusterQuery> {
        let zoom = request.zoom;
        let tiles = self.viewport_to_tiles(request)?;
        let cluster_zoom = zoom
            .saturating_add(request.cluster_level)
            .min(self.config.max_zoom);
        Ok(ClusterQuery {
            tiles,
            tile_shift: self.quad_key_system.bit_delta(zoom),
            cluster_shift: self.quad_key_system.bit_delta(cluster_zoom),
            zoom,
            cluster_zoom,
        })
    }

    /// Key range and cluster mask for the bounding-box clustering strategy.
    ///
    /// Returns `(min, max, mask)`: the range start of the lowest tile key, the
    /// range end of the highest one and the mask of the lowest key. `None` for
    /// an empty viewport.
    pub fn bounds_and_cluster_mask(
        &self,
        request: &MapRequest,
    ) -> Result<Option<(QuadKey, QuadKey, QuadKey)>> {
        let tiles = self.viewport_to_tiles(request)?;
        let (Some(first), Some(last)) = (tiles.values().next(), tiles.values().next_back()) else {
            return Ok(None);
        };
        let (min, _) = self.quad_key_system.quad_key_range(&first.quad_key);
        let (_, max) = self.quad_key_system.quad_key_range(&last.quad_key);
        let mask = self
            .quad_key_system
            .create_mask(&first.quad_key, request.zoom, request.cluster_level);
        Ok(Some((min, max, mask)))
    }

    /// Center of the tile whose key has numeric value `tile_id` at `zoom`.
    ///
    /// The zoom is needed because the numeric value drops leading `'0'` digits.
    /// Pass the zoom the id was cut at: [`ClusterQuery::zoom`] for a key of
    /// [`ClusterQuery::tiles`], [`ClusterQuery::cluster_zoom`] for a
    /// [`ClusterQuery::bucket_of`] value.
    pub fn tile_id_to_center_point(&self, tile_id: u64, zoom: u8) -> Result<GeographicPoint> {
        let len = self.quad_key_system.key_len(zoom);
        let key = QuadKey::from_u64(tile_id, len);
        if key.len() != len {
            return Err(GeoError::InvalidInput(format!(
                "tile id {tile_id} needs {} digits, zoom {zoom} keys have {len}",
                key.len()
            )));
        }
        let (tx, ty) = self.quad_key_system.quad_key_to_tile_xy(&key);
        Ok(self.tile_xy_to_center_point(tx, ty, zoom))
    }

    pub fn tile_xy_to_center_point(&self, tx: u32, ty: u32, zoom: u8) -> GeographicPoint {
        let (x, y) = self.tile_system.tile_xy_to_global_pixels_center(tx, ty);
        let (lat, lon) = self.projection.from_global_pixels(x, y, zoom);
        GeographicPoint::new(lat, lon)
    }

    /// Top-left corner of the tile.
    pub fn tile_xy_to_point(&self, tx: u32, ty: u32, zoom: u8) -> GeographicPoint {
        let (x, y) = self.tile_system.tile_xy_to_global_pixels(tx, ty);
        let (lat, lon) = self.projection.from_global_pixels(x, y, zoom);
        GeographicPoint::new(lat, lon)
    }

    /// Closed outline of the tile.
    pub fn tile_xy_to_polygon(&self, tx: u32, ty: u32, zoom: u8) -> GeographicPolygon {
        let (tx1, ty1) = (tx.saturating_add(1), ty.saturating_add(1));
        GeographicPolygon::new(vec![
            self.tile_xy_to_point(tx, ty, zoom),
            self.tile_xy_to_point(tx, ty1, zoom),
            self.tile_xy_to_point(tx1, ty1, zoom),
            self.tile_xy_to_point(tx1, ty, zoom),
            self.tile_xy_to_point(tx, ty, zoom),
        ])
    }

    /// Adds the request's geographic box, if any.
    pub fn draw_bbox(&self, request: &MapRequest, fc: &mut FeatureCollection) {
        if let Some(bbox) = request.bbox {
            let polygon = Primitive::Polygon(bbox.as_polygon());
            fc.add("lat-lon-polygon", &polygon, Some(fill_options(VIEWPORT_FILL)));
        }
    }

    /// Adds the outline of every viewport tile with its key and key range.
    pub fn draw_tiles(&self, request: &MapRequest, fc: &mut FeatureCollection) -> Result<()> {
        self.check_zoom(request.zoom)?;
        let Some(tile_bbox) = self.request_tile_bbox(request) else {
            return Ok(());
        };
        for (x, y) in tile_bbox.tiles() {
            let id = format!("tx:{x} ty:{y}");
            let key = self.quad_key_system.tile_xy_to_quad_key(x, y, request.zoom);
            let (min, max) = self.quad_key_system.quad_key_range(&key);

            let mut properties = fill_options(TILE_FILL);
            properties.insert("hintContent".to_string(), json!(id));
            properties.insert("quadKey".to_string(), json!(key.to_string()));
            properties.insert("leftQuadKey".to_string(), json!(min.to_string()));
            properties.insert("rightQuadKey".to_string(), json!(max.to_string()));

            let polygon = Primitive::Polygon(self.tile_xy_to_polygon(x, y, request.zoom));
            fc.add(&id, &polygon, Some(properties));
        }
        Ok(())
    }

    /// Debug overlay: the viewport box and its tiles. Does nothing unless `request.debug`.
    pub fn draw_viewport_overlay(
        &self,
        request: &MapRequest,
        fc: &mut FeatureCollection,
    ) -> Result<()> {
        if !request.debug {
            return Ok(());
        }
        self.draw_bbox(request, fc);
        self.draw_tiles(request, fc)
    }
}

fn clamp_to_grid(tx: u32, ty: u32, zoom: u8) -> (u32, u32) {
    let last = 1u64
        .checked_shl(u32::from(zoom))
        .map_or(u64::MAX, |n| n - 1)
        .min(u64::from(u32::MAX)) as u32;
    (tx.min(last), ty.min(last))
}

fn fill_options(color: &str) -> JsonObject {
    let mut properties = JsonObject::new();
    properties.insert("options".to_string(), json!({ "fillColor": color }));
    properties
}
