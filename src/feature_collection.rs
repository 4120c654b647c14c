//! Result assembly: an ordered list of GeoJSON features.

use crate::error::{GeoError, Result};
use geohost_types::{Primitive, Srid};
use geojson::feature::Id;
use geojson::{Feature, JsonObject};
use std::fmt::Display;

/// Features in insertion order, serialized as a GeoJSON `FeatureCollection`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: impl Display, primitive: &Primitive, properties: Option<JsonObject>) {
        self.features.push(Feature {
            bbox: None,
            geometry: Some(primitive.to_geojson()),
            id: Some(Id::String(id.to_string())),
            properties,
            foreign_members: None,
        });
    }

    /// Adds a `geo` geometry. Unsupported geometry types reject this value only;
    /// the collection is left unchanged.
    pub fn add_geometry(
        &mut self,
        id: impl Display,
        geometry: &geo::Geometry<f64>,
        properties: Option<JsonObject>,
    ) -> Result<()> {
        let primitive = Primitive::from_geo(geometry, Srid::WGS84)?;
        self.add(id, &primitive, properties);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn into_geojson(self) -> geojson::FeatureCollection {
        geojson::FeatureCollection {
            bbox: None,
            features: self.features,
            foreign_members: None,
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        let collection = geojson::FeatureCollection {
            bbox: None,
            features: self.features.clone(),
            foreign_members: None,
        };
        serde_json::to_vec(&collection).map_err(GeoError::from)
    }

    /// `callback(` + the JSON document + `)`.
    pub fn to_jsonp(&self, callback: &str) -> Result<Vec<u8>> {
        let json = self.to_json()?;
        let mut out = Vec::with_capacity(callback.len() + json.len() + 2);
        out.extend_from_slice(callback.as_bytes());
        out.push(b'(');
        out.extend_from_slice(&json);
        out.push(b')');
        Ok(out)
    }
}

impl Extend<Feature> for FeatureCollection {
    fn extend<I: IntoIterator<Item = Feature>>(&mut self, iter: I) {
        self.features.extend(iter);
    }
}
