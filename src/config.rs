//! Configuration for the geographic system.
//!
//! A [`Config`] is built once, validated, and handed to
//! [`GeographicSystem::new`](crate::GeographicSystem::new). Nothing reads it
//! from global state.
use serde::de::Error;
use serde::{Deserialize, Serialize};

pub use geohost_types::Srid;

/// Longest zoom supported: keys derived at this zoom still fit in 64 bits.
pub const MAX_SUPPORTED_ZOOM: u8 = 30;

/// Tile grid and projection settings.
///
/// # Example
///
/// ```rust
/// use geohost::{Config, Srid};
///
/// let config = Config::default();
/// assert_eq!(config.tile_size, 256);
/// assert_eq!(config.max_zoom, 23);
///
/// let json = r#"{ "max_zoom": 18, "projection": 3857 }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.projection, Srid::WEB_MERCATOR);
/// assert_eq!(config.min_zoom, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Edge length of a tile in pixels
    #[serde(default = "Config::default_tile_size")]
    pub tile_size: u32,

    #[serde(default = "Config::default_min_zoom")]
    pub min_zoom: u8,

    /// Resolution at which points are indexed
    #[serde(default = "Config::default_max_zoom")]
    pub max_zoom: u8,

    /// `EPSG:3857` selects the spherical projection, anything else the WGS84 ellipsoid
    #[serde(default)]
    pub projection: Srid,
}

impl Config {
    const fn default_tile_size() -> u32 {
        256
    }

    const fn default_min_zoom() -> u8 {
        0
    }

    const fn default_max_zoom() -> u8 {
        23
    }

    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn with_zoom_range(mut self, min_zoom: u8, max_zoom: u8) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    pub fn with_projection(mut self, projection: Srid) -> Self {
        self.projection = projection;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.tile_size == 0 {
            return Err("Tile size must be greater than zero".to_string());
        }
        if self.min_zoom > self.max_zoom {
            return Err(format!(
                "min_zoom ({}) must not exceed max_zoom ({})",
                self.min_zoom, self.max_zoom
            ));
        }
        if self.max_zoom > MAX_SUPPORTED_ZOOM {
            return Err(format!(
                "max_zoom ({}) must be <= {}",
                self.max_zoom, MAX_SUPPORTED_ZOOM
            ));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(serde_json::Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tile_size: Self::default_tile_size(),
            min_zoom: Self::default_min_zoom(),
            max_zoom: Self::default_max_zoom(),
            projection: Srid::WGS84,
        }
    }
}
