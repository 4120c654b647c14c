//! Tile descriptors and the parameters of a clustered viewport query.

use crate::quadkey::QuadKey;
use serde::Serialize;
use std::collections::BTreeMap;

/// A tile of the grid together with its key.
///
/// `id` is the numeric value of `quad_key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tile {
    pub id: u64,
    pub x: u32,
    pub y: u32,
    pub zoom: u8,
    #[serde(serialize_with = "serialize_key")]
    pub quad_key: QuadKey,
}

impl Tile {
    pub fn new(x: u32, y: u32, zoom: u8, quad_key: QuadKey) -> Self {
        Self {
            id: quad_key.to_u64(),
            x,
            y,
            zoom,
            quad_key,
        }
    }
}

fn serialize_key<S: serde::Serializer>(key: &QuadKey, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(key)
}

/// Everything a storage backend needs to answer a clustered viewport query.
///
/// A stored point key `k` (indexed at `max_zoom`) belongs to the viewport when
/// `k >> tile_shift` is one of the tile ids, and to the cluster bucket
/// `k >> cluster_shift`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterQuery {
    pub tiles: BTreeMap<u64, Tile>,
    pub tile_shift: u32,
    pub cluster_shift: u32,
    pub zoom: u8,
    pub cluster_zoom: u8,
}

impl ClusterQuery {
    pub fn contains(&self, key: u64) -> bool {
        self.tiles.contains_key(&shift(key, self.tile_shift))
    }

    pub fn tile_of(&self, key: u64) -> Option<&Tile> {
        self.tiles.get(&shift(key, self.tile_shift))
    }

    pub fn bucket_of(&self, key: u64) -> u64 {
        shift(key, self.cluster_shift)
    }

    pub fn tile_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.tiles.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

fn shift(key: u64, bits: u32) -> u64 {
    key.checked_shr(bits).unwrap_or(0)
}
