//! Error types for the tile index.

use geohost_types::GeometryError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    /// A viewport query field could not be parsed.
    #[error("{field} parse error: {message}")]
    Parse { field: &'static str, message: String },

    #[error("invalid quad key {key:?}: digit {digit:?} at position {position}")]
    InvalidKeyDigit {
        key: String,
        position: usize,
        digit: char,
    },

    #[error("quad key of length {len} exceeds the maximum of {max} digits")]
    KeyTooLong { len: usize, max: usize },

    #[error("unsupported geometry type: {0}")]
    UnsupportedGeometryType(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl GeoError {
    pub(crate) fn parse(field: &'static str, message: impl Into<String>) -> Self {
        GeoError::Parse {
            field,
            message: message.into(),
        }
    }
}

impl From<GeometryError> for GeoError {
    fn from(err: GeometryError) -> Self {
        match err {
            GeometryError::UnsupportedGeometryType(kind) => GeoError::UnsupportedGeometryType(kind),
            GeometryError::InvalidCoordinates(msg) => GeoError::InvalidInput(msg),
        }
    }
}

impl From<serde_json::Error> for GeoError {
    fn from(err: serde_json::Error) -> Self {
        GeoError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GeoError>;
