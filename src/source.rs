//! Storage seam and an in-memory backend.
//!
//! A [`DataSource`] stores points under their `max_zoom` quadkey and answers
//! map view requests with one marker per cluster bucket. [`MemorySource`]
//! does the grouping in process with the shifts from
//! [`GeographicSystem::cluster_query`]; a database backend would run the same
//! grouping as an aggregate query.

use crate::error::{GeoError, Result};
use crate::feature_collection::FeatureCollection;
use crate::geo_system::GeographicSystem;
use crate::request::MapRequest;
use crate::tile::ClusterQuery;
use geohost_types::{GeographicPoint, Primitive};
use geojson::JsonObject;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Backend answering map view requests.
pub trait DataSource: Send + Sync {
    /// Append the markers visible in `request` to `fc`.
    fn load_map_view(&self, request: &MapRequest, fc: &mut FeatureCollection) -> Result<()>;

    /// Index and store an object, returning it with its id and quad key filled in.
    fn store(&self, object: GeoObject) -> Result<GeoObject>;
}

/// A stored point with free-form properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoObject {
    /// `0` asks the source to assign the next free id.
    #[serde(default)]
    pub id: i64,
    /// Numeric value of the point's `max_zoom` quadkey; set by [`DataSource::store`].
    #[serde(default)]
    pub quad_key: u64,
    pub point: GeographicPoint,
    #[serde(default)]
    pub properties: JsonObject,
}

impl GeoObject {
    pub fn new(id: i64, point: GeographicPoint) -> Self {
        Self {
            id,
            quad_key: 0,
            point,
            properties: JsonObject::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// The `name` property rendered as text.
    pub fn name(&self) -> Option<String> {
        match self.properties.get("name")? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

/// Objects sharing one cluster bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// Stored key shifted right by the cluster shift.
    pub bucket: u64,
    pub min_id: i64,
    pub count: usize,
    /// Mean latitude and longitude of the members.
    pub centroid: GeographicPoint,
    /// Member with the smallest id.
    pub representative: GeoObject,
    pub members: Vec<GeoObject>,
}

/// Where a marker for more than one object is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClusterPlacement {
    #[default]
    Centroid,
    /// Center of the bucket's tile at the cluster zoom.
    TileCenter,
}

/// Builds the feature properties of a cluster marker.
pub type PropertiesMapper = Box<dyn Fn(&Cluster) -> JsonObject + Send + Sync>;

/// Properties the map widget renders: a hint, an icon caption and a balloon
/// listing member names.
pub fn default_properties(cluster: &Cluster) -> JsonObject {
    let (icon, balloon) = if cluster.count > 1 {
        let balloon: String = cluster
            .members
            .iter()
            .map(|m| format!("{}<br>\n", m.name().unwrap_or_default()))
            .collect();
        (cluster.count.to_string(), balloon)
    } else {
        (cluster.representative.name().unwrap_or_default(), String::new())
    };

    let mut properties = JsonObject::new();
    properties.insert("hintContent".to_string(), json!(cluster.bucket));
    properties.insert("iconContent".to_string(), json!(icon));
    properties.insert("balloonContent".to_string(), json!(balloon));
    properties.insert(
        "options".to_string(),
        json!({
            "preset": "islands#blackStretchyIcon",
            "fillColor": "rgba(27, 125, 27, 0.2)",
        }),
    );
    properties
}

/// In-process [`DataSource`] backed by an ordered map.
pub struct MemorySource {
    system: Arc<GeographicSystem>,
    objects: RwLock<BTreeMap<i64, GeoObject>>,
    mapper: PropertiesMapper,
    placement: ClusterPlacement,
}

impl MemorySource {
    pub fn new(system: Arc<GeographicSystem>) -> Self {
        Self {
            system,
            objects: RwLock::new(BTreeMap::new()),
            mapper: Box::new(default_properties),
            placement: ClusterPlacement::default(),
        }
    }

    pub fn with_mapper<F>(mut self, mapper: F) -> Self
    where
        F: Fn(&Cluster) -> JsonObject + Send + Sync + 'static,
    {
        self.mapper = Box::new(mapper);
        self
    }

    pub fn with_placement(mut self, placement: ClusterPlacement) -> Self {
        self.placement = placement;
        self
    }

    pub fn system(&self) -> &GeographicSystem {
        &self.system
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    pub fn get(&self, id: i64) -> Option<GeoObject> {
        self.objects.read().get(&id).cloned()
    }

    pub fn remove(&self, id: i64) -> Option<GeoObject> {
        self.objects.write().remove(&id)
    }

    /// Stored objects grouped by cluster bucket, ordered by bucket.
    pub fn clusters(&self, query: &ClusterQuery) -> Vec<Cluster> {
        if query.is_empty() {
            return Vec::new();
        }

        let objects = self.objects.read();
        let mut buckets: BTreeMap<u64, Vec<&GeoObject>> = BTreeMap::new();
        for object in objects.values() {
            if query.contains(object.quad_key) {
                buckets
                    .entry(query.bucket_of(object.quad_key))
                    .or_default()
                    .push(object);
            }
        }

        buckets
            .into_iter()
            .filter_map(|(bucket, members)| {
                let representative = (*members.first()?).clone();
                let count = members.len();
                let n = count as f64;
                let lat = members.iter().map(|m| m.point.latitude).sum::<f64>() / n;
                let lon = members.iter().map(|m| m.point.longitude).sum::<f64>() / n;
                Some(Cluster {
                    bucket,
                    min_id: representative.id,
                    count,
                    centroid: GeographicPoint::new(lat, lon),
                    representative,
                    members: members.into_iter().cloned().collect(),
                })
            })
            .collect()
    }

    fn marker_point(&self, cluster: &Cluster, cluster_zoom: u8) -> Result<GeographicPoint> {
        if cluster.count == 1 {
            return Ok(cluster.representative.point);
        }
        match self.placement {
            ClusterPlacement::Centroid => Ok(cluster.centroid),
            ClusterPlacement::TileCenter => self
                .system
                .tile_id_to_center_point(cluster.bucket, cluster_zoom),
        }
    }
}

impl DataSource for MemorySource {
    fn load_map_view(&self, request: &MapRequest, fc: &mut FeatureCollection) -> Result<()> {
        self.system.draw_viewport_overlay(request, fc)?;

        let query = self.system.cluster_query(request)?;
        let cluster_zoom = query.cluster_zoom;
        let clusters = self.clusters(&query);
        log::debug!(
            "Map view at zoom {} (cluster zoom {}): {} clusters",
            request.zoom,
            cluster_zoom,
            clusters.len()
        );

        for cluster in &clusters {
            let point = self.marker_point(cluster, cluster_zoom)?;
            let properties = (self.mapper)(cluster);
            fc.add(cluster.bucket, &Primitive::Point(point), Some(properties));
        }
        Ok(())
    }

    fn store(&self, mut object: GeoObject) -> Result<GeoObject> {
        let GeographicPoint {
            latitude, longitude, ..
        } = object.point;
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(GeoError::InvalidInput(format!(
                "object {} has non-finite coordinates ({latitude}, {longitude})",
                object.id
            )));
        }

        let key = self.system.coordinates_to_quad_key(latitude, longitude);
        self.system.quad_key_system().check_len(&key)?;
        self.system.quad_key_system().for_each_zoom(&key, |x, y, zoom| {
            log::trace!("Object {} covers tile x={x} y={y} zoom={zoom}", object.id);
            Ok(())
        })?;
        object.quad_key = key.to_u64();

        let mut objects = self.objects.write();
        if object.id == 0 {
            object.id = match objects.last_key_value() {
                None => 1,
                Some((&last, _)) => last.checked_add(1).ok_or_else(|| {
                    GeoError::InvalidInput(format!("no id left after {last}"))
                })?,
            };
        }
        objects.insert(object.id, object.clone());
        Ok(object)
    }
}

impl fmt::Debug for MemorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySource")
            .field("objects", &self.objects.read().len())
            .field("placement", &self.placement)
            .finish_non_exhaustive()
    }
}
