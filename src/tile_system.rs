//! Global pixel ↔ tile index conversion.

/// Splits the global pixel plane into square tiles of `tile_size` pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSystem {
    tile_size: u32,
}

impl TileSystem {
    pub fn new(tile_size: u32) -> Self {
        Self { tile_size }
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Tile containing the pixel. Pixels left of or above the plane land in tile 0.
    pub fn global_pixels_to_tile_xy(&self, x: f64, y: f64) -> (u32, u32) {
        let size = f64::from(self.tile_size);
        ((x / size).floor() as u32, (y / size).floor() as u32)
    }

    /// Top-left corner of the tile.
    pub fn tile_xy_to_global_pixels(&self, tx: u32, ty: u32) -> (f64, f64) {
        let size = u64::from(self.tile_size);
        ((u64::from(tx) * size) as f64, (u64::from(ty) * size) as f64)
    }

    pub fn tile_xy_to_global_pixels_center(&self, tx: u32, ty: u32) -> (f64, f64) {
        let size = u64::from(self.tile_size);
        let half = size / 2;
        (
            (u64::from(tx) * size + half) as f64,
            (u64::from(ty) * size + half) as f64,
        )
    }
}

impl Default for TileSystem {
    fn default() -> Self {
        Self::new(256)
    }
}
