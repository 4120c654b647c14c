//! Tile ↔ quadkey encoding, descendant ranges and clustering shifts.
//!
//! A tile at zoom `z` encodes bits `z` down to `min_zoom` of its x/y
//! coordinates, so its key has `z - min_zoom + 1` digits. With the default
//! `min_zoom = 0` the leading digit of every in-grid key is `'0'` and a point
//! indexed at `max_zoom` carries `max_zoom + 1` digits.

use crate::error::{GeoError, Result};
use crate::quadkey::QuadKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuadKeySystem {
    min_zoom: u8,
    max_zoom: u8,
}

impl QuadKeySystem {
    pub fn new(min_zoom: u8, max_zoom: u8) -> Self {
        Self { min_zoom, max_zoom }
    }

    pub fn min_zoom(&self) -> u8 {
        self.min_zoom
    }

    pub fn max_zoom(&self) -> u8 {
        self.max_zoom
    }

    /// Number of digits of a key produced at `zoom`.
    pub fn key_len(&self, zoom: u8) -> usize {
        (usize::from(zoom) + 1).saturating_sub(usize::from(self.min_zoom))
    }

    /// Zoom level a key of this length was produced at.
    pub fn zoom_of(&self, key: &QuadKey) -> u8 {
        (key.len() + usize::from(self.min_zoom)).saturating_sub(1) as u8
    }

    pub fn tile_xy_to_quad_key(&self, tx: u32, ty: u32, zoom: u8) -> QuadKey {
        let mut key = QuadKey::new();
        if zoom < self.min_zoom {
            return key;
        }
        let (tx, ty) = (u64::from(tx), u64::from(ty));
        for i in (self.min_zoom..=zoom).rev() {
            let mask = 1u64.checked_shl(u32::from(i)).unwrap_or(0);
            let mut digit = 0u8;
            if tx & mask != 0 {
                digit += 1;
            }
            if ty & mask != 0 {
                digit += 2;
            }
            key.push(digit);
        }
        key
    }

    /// Inverse of [`tile_xy_to_quad_key`](Self::tile_xy_to_quad_key).
    ///
    /// Exact when `min_zoom == 0`; otherwise the bits below `min_zoom` are zero.
    pub fn quad_key_to_tile_xy(&self, key: &QuadKey) -> (u32, u32) {
        let zoom = self.zoom_of(key);
        let (mut tx, mut ty) = (0u64, 0u64);
        for (k, digit) in key.digits().iter().enumerate() {
            let shift = u32::from(zoom).saturating_sub(k as u32);
            let mask = 1u64.checked_shl(shift).unwrap_or(0);
            match digit {
                1 => tx |= mask,
                2 => ty |= mask,
                3 => {
                    tx |= mask;
                    ty |= mask;
                }
                _ => {}
            }
        }
        (tx as u32, ty as u32)
    }

    /// Decode tile coordinates straight from a textual key.
    pub fn parse_tile_xy(&self, key: &str) -> Result<(u32, u32)> {
        let key: QuadKey = key.parse()?;
        Ok(self.quad_key_to_tile_xy(&key))
    }

    /// Smallest and largest descendant keys of `key`.
    ///
    /// Pads with `max_zoom - len + 1` digits. Under `min_zoom = 0` that gives
    /// keys as long as a point key at `max_zoom`, so the bounds compare
    /// directly against stored point keys.
    pub fn quad_key_range(&self, key: &QuadKey) -> (QuadKey, QuadKey) {
        let pad = (usize::from(self.max_zoom) + 1).saturating_sub(key.len());
        (key.padded(0, pad), key.padded(3, pad))
    }

    /// True when the point key lies inside the tile's descendant range.
    pub fn contains(&self, point: &QuadKey, tile: &QuadKey) -> bool {
        let (min, max) = self.quad_key_range(tile);
        (min.to_u64()..=max.to_u64()).contains(&point.to_u64())
    }

    /// Right shift turning a `max_zoom` point key into its ancestor at `zoom`.
    pub fn bit_delta(&self, zoom: u8) -> u32 {
        let zoom = zoom.min(self.max_zoom);
        2 * u32::from(self.max_zoom - zoom)
    }

    /// Mask for the bounding-box clustering strategy.
    ///
    /// Appends `max(cluster_level, 1)` `'3'` digits and then
    /// `max_zoom - (zoom + cluster_level) + 1` `'0'` digits.
    pub fn create_mask(&self, key: &QuadKey, zoom: u8, cluster_level: u8) -> QuadKey {
        let cluster_level = cluster_level.max(1);
        let diff = u32::from(self.max_zoom)
            .saturating_sub(u32::from(zoom) + u32::from(cluster_level));
        key.padded(3, usize::from(cluster_level))
            .padded(0, diff as usize + 1)
    }

    /// Lazily yields the key and each of its ancestors, longest first, down to one digit.
    pub fn ancestors<'a>(&self, key: &'a QuadKey) -> impl Iterator<Item = QuadKey> + 'a {
        (1..=key.len()).rev().map(move |len| key.prefix(len))
    }

    /// Visits the tile of the key and every ancestor tile as `(x, y, zoom)`.
    ///
    /// Stops at the first error the callback returns.
    pub fn for_each_zoom<F>(&self, key: &QuadKey, mut f: F) -> Result<()>
    where
        F: FnMut(u32, u32, u8) -> Result<()>,
    {
        for ancestor in self.ancestors(key) {
            let (x, y) = self.quad_key_to_tile_xy(&ancestor);
            f(x, y, self.zoom_of(&ancestor))?;
        }
        Ok(())
    }

    /// Reject keys longer than a point key at `max_zoom`.
    pub fn check_len(&self, key: &QuadKey) -> Result<()> {
        let max = self.key_len(self.max_zoom);
        if key.len() > max {
            return Err(GeoError::KeyTooLong {
                len: key.len(),
                max,
            });
        }
        Ok(())
    }
}

impl Default for QuadKeySystem {
    fn default() -> Self {
        Self::new(0, 23)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qks() -> QuadKeySystem {
        QuadKeySystem::default()
    }

    #[test]
    fn test_regression_pin() {
        let key = qks().tile_xy_to_quad_key(618, 320, 10);
        assert_eq!(key.to_string(), "01203101010");
        assert_eq!(key.len(), 11);
    }

    #[test]
    fn test_bit_delta() {
        assert_eq!(qks().bit_delta(10), 26);
        assert_eq!(qks().bit_delta(23), 0);
        assert_eq!(qks().bit_delta(40), 0);
        assert_eq!(qks().bit_delta(0), 46);
    }

    #[test]
    fn test_tile_round_trip() {
        let qks = qks();
        for zoom in 0..=12u8 {
            let n = 1u32 << zoom;
            for (tx, ty) in [(0, 0), (n - 1, 0), (0, n - 1), (n - 1, n - 1), (n / 2, n / 3)] {
                let key = qks.tile_xy_to_quad_key(tx, ty, zoom);
                assert_eq!(key.len(), usize::from(zoom) + 1);
                assert_eq!(qks.zoom_of(&key), zoom);
                assert_eq!(qks.quad_key_to_tile_xy(&key), (tx, ty), "zoom {zoom}");
            }
        }
    }

    #[test]
    fn test_key_length_with_min_zoom() {
        let qks = QuadKeySystem::new(3, 23);
        assert_eq!(qks.tile_xy_to_quad_key(5, 9, 10).len(), 8);
        assert_eq!(qks.key_len(10), 8);
        assert!(qks.tile_xy_to_quad_key(0, 0, 2).is_empty());
    }

    #[test]
    fn test_parse_tile_xy() {
        assert_eq!(qks().parse_tile_xy("01203101010").unwrap(), (618, 320));
        assert!(matches!(
            qks().parse_tile_xy("0120x"),
            Err(GeoError::InvalidKeyDigit { position: 4, digit: 'x', .. })
        ));
    }

    #[test]
    fn test_range_bounds() {
        let qks = qks();
        let key = qks.tile_xy_to_quad_key(618, 320, 10);
        let (min, max) = qks.quad_key_range(&key);
        assert_eq!(min.len(), 24);
        assert_eq!(max.len(), 24);
        assert_eq!(min.to_string(), format!("01203101010{}", "0".repeat(13)));
        assert_eq!(max.to_string(), format!("01203101010{}", "3".repeat(13)));

        let scaled = key.to_u64() << (2 * (24 - key.len()));
        assert!(min.to_u64() <= scaled && scaled <= max.to_u64());
    }

    #[test]
    fn test_range_matches_bit_shift() {
        let qks = qks();
        let key = qks.tile_xy_to_quad_key(618, 320, 10);
        let (min, max) = qks.quad_key_range(&key);
        let shift = qks.bit_delta(10);
        assert_eq!(min.to_u64() >> shift, key.to_u64());
        assert_eq!(max.to_u64() >> shift, key.to_u64());
        assert_eq!((max.to_u64() + 1) >> shift, key.to_u64() + 1);
    }

    #[test]
    fn test_contains() {
        let qks = qks();
        let tile = qks.tile_xy_to_quad_key(618, 320, 10);
        let inside = qks.tile_xy_to_quad_key(618 << 13, (320 << 13) + 77, 23);
        let outside = qks.tile_xy_to_quad_key(619 << 13, 320 << 13, 23);
        assert!(qks.contains(&inside, &tile));
        assert!(!qks.contains(&outside, &tile));
    }

    #[test]
    fn test_create_mask() {
        let qks = qks();
        let key = qks.tile_xy_to_quad_key(618, 320, 10);
        let mask = qks.create_mask(&key, 10, 2);
        assert_eq!(mask.to_string(), format!("0120310101033{}", "0".repeat(12)));

        let zero_level = qks.create_mask(&key, 10, 0);
        assert_eq!(zero_level.to_string(), format!("012031010103{}", "0".repeat(13)));

        let deep = qks.create_mask(&key, 22, 4);
        assert_eq!(deep.to_string(), "0120310101033330");
    }

    #[test]
    fn test_ancestors_and_for_each_zoom() {
        let qks = qks();
        let key = qks.tile_xy_to_quad_key(618, 320, 10);
        let ancestors: Vec<String> = qks.ancestors(&key).map(|k| k.to_string()).collect();
        assert_eq!(ancestors.len(), 11);
        assert_eq!(ancestors[0], "01203101010");
        assert_eq!(ancestors[10], "0");

        let mut visited = Vec::new();
        qks.for_each_zoom(&key, |x, y, z| {
            visited.push((x, y, z));
            Ok(())
        })
        .unwrap();
        assert_eq!(visited.first(), Some(&(618, 320, 10)));
        assert_eq!(visited[1], (309, 160, 9));
        assert_eq!(visited.last(), Some(&(0, 0, 0)));
    }

    #[test]
    fn test_for_each_zoom_stops_on_error() {
        let qks = qks();
        let key = qks.tile_xy_to_quad_key(618, 320, 10);
        let mut calls = 0;
        let result = qks.for_each_zoom(&key, |_, _, z| {
            calls += 1;
            if z == 8 {
                Err(GeoError::InvalidInput("stop".to_string()))
            } else {
                Ok(())
            }
        });
        assert!(result.is_err());
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_check_len() {
        let qks = qks();
        assert!(qks.check_len(&"0".repeat(24).parse().unwrap()).is_ok());
        assert!(qks.check_len(&"0".repeat(25).parse().unwrap()).is_err());
    }
}
