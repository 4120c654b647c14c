//! WKB and PostGIS EWKB encoding of geometry primitives.
//!
//! Coordinates keep the `(latitude, longitude)` as `(x, y)` order of
//! [`Primitive::to_geo`].

use crate::error::{GeoError, Result};
use geohost_types::{Primitive, Srid};
use geozero::wkb::{Ewkb, Wkb};
use geozero::{CoordDimensions, ToGeo, ToWkb};

const EWKB_SRID_FLAG: u32 = 0x2000_0000;

/// Encode as plain OGC WKB (XY, little endian). The SRID is dropped.
pub fn to_wkb(primitive: &Primitive) -> Result<Vec<u8>> {
    primitive
        .to_geo()
        .to_wkb(CoordDimensions::xy())
        .map_err(|e| GeoError::Serialization(format!("WKB encode: {e}")))
}

/// Encode as EWKB carrying the primitive's SRID.
pub fn to_ewkb(primitive: &Primitive) -> Result<Vec<u8>> {
    primitive
        .to_geo()
        .to_ewkb(CoordDimensions::xy(), Some(primitive.srid().code()))
        .map_err(|e| GeoError::Serialization(format!("EWKB encode: {e}")))
}

/// Decode plain WKB, tagging the result with `srid`.
pub fn from_wkb(bytes: &[u8], srid: Srid) -> Result<Primitive> {
    let geometry = Wkb(bytes.to_vec())
        .to_geo()
        .map_err(|e| GeoError::Serialization(format!("WKB decode: {e}")))?;
    Ok(Primitive::from_geo(&geometry, srid)?)
}

/// Decode EWKB. Without an embedded SRID the result is WGS84.
pub fn from_ewkb(bytes: &[u8]) -> Result<Primitive> {
    let srid = ewkb_srid(bytes).unwrap_or_default().or_default();
    let geometry = Ewkb(bytes.to_vec())
        .to_geo()
        .map_err(|e| GeoError::Serialization(format!("EWKB decode: {e}")))?;
    Ok(Primitive::from_geo(&geometry, srid)?)
}

/// SRID from an EWKB header, if the header carries one.
pub fn ewkb_srid(bytes: &[u8]) -> Option<Srid> {
    let (&order, rest) = bytes.split_first()?;
    let read = |b: &[u8]| -> Option<u32> {
        let raw: [u8; 4] = b.get(..4)?.try_into().ok()?;
        Some(match order {
            0 => u32::from_be_bytes(raw),
            1 => u32::from_le_bytes(raw),
            _ => return None,
        })
    };
    let kind = read(rest)?;
    if kind & EWKB_SRID_FLAG == 0 {
        return None;
    }
    let srid = read(rest.get(4..)?)?;
    Some(Srid(srid as i32))
}
