//! Viewport descriptors and their query-string parsing.
//!
//! Boxes arrive as `"xmin,ymin,xmax,ymax"`. For the geographic box `x` is
//! latitude and `y` is longitude, the order the map widget sends.

use crate::config::MAX_SUPPORTED_ZOOM;
use crate::error::{GeoError, Result};
use geohost_types::{GeographicPoint, GeographicPolygon};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Deepest cluster level a request may ask for.
pub const MAX_CLUSTER_LEVEL: u8 = 4;

/// Geographic bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl BBox {
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Closed ring around the box.
    pub fn as_polygon(&self) -> GeographicPolygon {
        GeographicPolygon::new(vec![
            GeographicPoint::new(self.x_min, self.y_min),
            GeographicPoint::new(self.x_min, self.y_max),
            GeographicPoint::new(self.x_max, self.y_max),
            GeographicPoint::new(self.x_max, self.y_min),
            GeographicPoint::new(self.x_min, self.y_min),
        ])
    }
}

/// Inclusive rectangle of tile indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileBBox {
    pub x_min: u32,
    pub y_min: u32,
    pub x_max: u32,
    pub y_max: u32,
}

impl TileBBox {
    pub fn new(x_min: u32, y_min: u32, x_max: u32, y_max: u32) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Tile coordinates, x outer and y inner. Empty when a minimum exceeds its maximum.
    pub fn tiles(&self) -> impl Iterator<Item = (u32, u32)> + use<> {
        let (y_min, y_max) = (self.y_min, self.y_max);
        (self.x_min..=self.x_max).flat_map(move |x| (y_min..=y_max).map(move |y| (x, y)))
    }

    /// Calls `f` for every tile in [`tiles`](Self::tiles) order, stopping at the first error.
    pub fn try_for_each_tile<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(u32, u32) -> Result<()>,
    {
        self.tiles().try_for_each(|(x, y)| f(x, y))
    }

    pub fn tiles_number(&self) -> u64 {
        let width = u64::from(self.x_max).saturating_sub(u64::from(self.x_min)) + 1;
        let height = u64::from(self.y_max).saturating_sub(u64::from(self.y_min)) + 1;
        if self.x_min > self.x_max || self.y_min > self.y_max {
            0
        } else {
            width * height
        }
    }
}

/// A parsed viewport query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapRequest {
    pub bbox: Option<BBox>,
    pub tile_bbox: Option<TileBBox>,
    pub zoom: u8,
    pub callback_id: String,
    pub debug: bool,
    pub cluster_level: u8,
}

impl MapRequest {
    pub fn new(zoom: u8) -> Self {
        Self {
            bbox: None,
            tile_bbox: None,
            zoom,
            callback_id: String::new(),
            debug: false,
            cluster_level: 0,
        }
    }

    pub fn with_bbox(mut self, bbox: BBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    pub fn with_tile_bbox(mut self, tile_bbox: TileBBox) -> Self {
        self.tile_bbox = Some(tile_bbox);
        self
    }

    pub fn with_callback(mut self, callback_id: impl Into<String>) -> Self {
        self.callback_id = callback_id.into();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_cluster_level(mut self, cluster_level: u8) -> Self {
        self.cluster_level = cluster_level;
        self
    }

    /// Cache tag `"{txmin}-{txmax}-{tymin}-{tymax}"`; `None` without a tile box.
    pub fn etag(&self) -> Option<String> {
        self.tile_bbox
            .map(|t| format!("{}-{}-{}-{}", t.x_min, t.x_max, t.y_min, t.y_max))
    }
}

/// Parse the raw query parameters of a map view request.
///
/// Empty `coords`, `tiles`, `callback`, `debug` and `cluster_level` mean
/// "absent". `zoom` is required.
///
/// ```rust
/// use geohost::request::parse_map_request;
///
/// let request = parse_map_request("1.1,2,3,4", "", "1", "cb", "", "").unwrap();
/// let bbox = request.bbox.unwrap();
/// assert_eq!((bbox.x_min, bbox.y_max), (1.1, 4.0));
/// assert_eq!(request.zoom, 1);
/// assert!(parse_map_request("1c,2,3,4", "", "1", "", "", "").is_err());
/// ```
pub fn parse_map_request(
    coords: &str,
    tiles: &str,
    zoom: &str,
    callback: &str,
    debug: &str,
    cluster_level: &str,
) -> Result<MapRequest> {
    let bbox = if coords.trim().is_empty() {
        None
    } else {
        let [x_min, y_min, x_max, y_max] = parse_list::<f64>("bbox", coords)?;
        Some(BBox::new(x_min, y_min, x_max, y_max))
    };

    let zoom = zoom
        .trim()
        .parse::<u8>()
        .map_err(|e| GeoError::parse("zoom", format!("{zoom:?}: {e}")))?;
    if zoom > MAX_SUPPORTED_ZOOM {
        return Err(GeoError::parse(
            "zoom",
            format!("{zoom} exceeds the maximum of {MAX_SUPPORTED_ZOOM}"),
        ));
    }

    let tile_bbox = if tiles.trim().is_empty() {
        None
    } else {
        let [x_min, y_min, x_max, y_max] = parse_list::<u32>("tiles", tiles)?;
        let last = (1u32 << zoom) - 1;
        if let Some(outside) = [x_min, y_min, x_max, y_max].into_iter().find(|&t| t > last) {
            return Err(GeoError::parse(
                "tiles",
                format!("tile {outside} is outside the zoom {zoom} grid 0..={last}"),
            ));
        }
        Some(TileBBox::new(x_min, y_min, x_max, y_max))
    };

    let debug = match debug.trim() {
        "" => false,
        value => parse_bool(value)
            .ok_or_else(|| GeoError::parse("debug", format!("{value:?} is not a boolean")))?,
    };

    let cluster_level = match cluster_level.trim() {
        "" => 0,
        value => {
            let level = value
                .parse::<u8>()
                .map_err(|e| GeoError::parse("clusterLevel", format!("{value:?}: {e}")))?;
            if level > MAX_CLUSTER_LEVEL {
                return Err(GeoError::parse(
                    "clusterLevel",
                    format!("{level} exceeds the maximum of {MAX_CLUSTER_LEVEL}"),
                ));
            }
            level
        }
    };

    Ok(MapRequest {
        bbox,
        tile_bbox,
        zoom,
        callback_id: callback.to_string(),
        debug,
        cluster_level,
    })
}

fn parse_list<T>(field: &'static str, value: &str) -> Result<[T; 4]>
where
    T: FromStr + Copy + Default,
    T::Err: std::fmt::Display,
{
    let mut out = [T::default(); 4];
    let mut count = 0;
    for (index, part) in value.split(',').enumerate() {
        if index >= out.len() {
            count = index + 1;
            continue;
        }
        out[index] = part
            .trim()
            .parse()
            .map_err(|e| GeoError::parse(field, format!("element {index} ({part:?}): {e}")))?;
        count = index + 1;
    }
    if count != out.len() {
        return Err(GeoError::parse(
            field,
            format!("expected 4 comma separated values, got {count}"),
        ));
    }
    Ok(out)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "t" | "true" => Some(true),
        "0" | "f" | "false" => Some(false),
        _ => None,
    }
}
