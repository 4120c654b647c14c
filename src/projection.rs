//! Geographic ↔ global pixel projection.
//!
//! The forward transform is the ellipsoidal Mercator used by Yandex map
//! tiles. The inverse goes through the conformal latitude and a four-term
//! series; its output is rounded to 7 decimal digits, which bounds the
//! round-trip error instead of leaking series noise into results.

use crate::config::Srid;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

/// Eccentricity of the WGS84 ellipsoid.
pub const E: f64 = 0.0818191908426;
pub const MAJOR_EARTH_RADIUS: f64 = 6378137.0;

pub const MAX_LAT: f64 = 90.0;
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LON: f64 = 180.0;
pub const MIN_LON: f64 = -180.0;

/// Keeps `tan(π/4 + β/2)` finite at the poles.
pub const POLE_EPSILON: f64 = 1e-10;

/// Decimal digits kept by [`Projection::from_global_pixels`].
pub const INVERSE_PRECISION: i32 = 7;

/// Converts between latitude/longitude and the global pixel plane of a zoom level.
pub trait Projection: Send + Sync + std::fmt::Debug {
    /// Returns `(x, y)` global pixels.
    fn to_global_pixels(&self, lat: f64, lon: f64, zoom: u8) -> (f64, f64);

    /// Returns `(lat, lon)` in degrees.
    fn from_global_pixels(&self, x: f64, y: f64, zoom: u8) -> (f64, f64);
}

/// Mercator on an ellipsoid with eccentricity `E`; `E = 0` is spherical Web Mercator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipsoidalMercator {
    eccentricity: f64,
    tile_size: f64,
    d2: f64,
    d4: f64,
    d6: f64,
    d8: f64,
}

impl EllipsoidalMercator {
    pub fn with_eccentricity(eccentricity: f64, tile_size: u32) -> Self {
        let e2 = eccentricity * eccentricity;
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        let e8 = e4 * e4;
        Self {
            eccentricity,
            tile_size: f64::from(tile_size),
            d2: e2 / 2.0 + 5.0 * e4 / 24.0 + e6 / 12.0 + 13.0 * e8 / 360.0,
            d4: 7.0 * e4 / 48.0 + 29.0 * e6 / 240.0 + 811.0 * e8 / 11520.0,
            d6: 7.0 * e6 / 120.0 + 81.0 * e8 / 1120.0,
            d8: 4279.0 * e8 / 161280.0,
        }
    }

    pub fn wgs84(tile_size: u32) -> Self {
        Self::with_eccentricity(E, tile_size)
    }

    pub fn spherical(tile_size: u32) -> Self {
        Self::with_eccentricity(0.0, tile_size)
    }

    /// Web Mercator gets the sphere, every other reference the WGS84 ellipsoid.
    pub fn for_srid(srid: Srid, tile_size: u32) -> Self {
        if srid == Srid::WEB_MERCATOR {
            Self::spherical(tile_size)
        } else {
            Self::wgs84(tile_size)
        }
    }

    pub fn eccentricity(&self) -> f64 {
        self.eccentricity
    }

    /// Half the width of the pixel plane at `zoom`.
    fn rho(&self, zoom: u8) -> f64 {
        self.tile_size * 2f64.powi(i32::from(zoom)) / 2.0
    }

    /// Projected meters north of the equator for global pixel `y`.
    fn northing(&self, y: f64, zoom: u8) -> f64 {
        let half_equator = PI * MAJOR_EARTH_RADIUS;
        half_equator * (1.0 - y / self.rho(zoom))
    }

    /// Unrounded inverse that solves for latitude by fixed-point iteration.
    ///
    /// Used to cross-check the series inverse.
    pub fn from_global_pixels_iterative(&self, x: f64, y: f64, zoom: u8) -> (f64, f64) {
        let lon = 180.0 * x / self.rho(zoom) - 180.0;
        let ts = (-self.northing(y, zoom) / MAJOR_EARTH_RADIUS).exp();
        let mut phi = FRAC_PI_2 - 2.0 * ts.atan();
        for _ in 0..32 {
            let con = self.eccentricity * phi.sin();
            let next = FRAC_PI_2
                - 2.0 * (ts * ((1.0 - con) / (1.0 + con)).powf(self.eccentricity / 2.0)).atan();
            let delta = next - phi;
            phi = next;
            if delta.abs() < 1e-12 {
                break;
            }
        }
        (phi.to_degrees(), lon)
    }
}

impl Default for EllipsoidalMercator {
    fn default() -> Self {
        Self::wgs84(256)
    }
}

impl Projection for EllipsoidalMercator {
    fn to_global_pixels(&self, lat: f64, lon: f64, zoom: u8) -> (f64, f64) {
        let rho = self.rho(zoom);
        let x = rho * (1.0 + lon / 180.0);

        let lat = lat.clamp(MIN_LAT + POLE_EPSILON, MAX_LAT - POLE_EPSILON);
        let beta = lat.to_radians();
        let e_sin_beta = self.eccentricity * beta.sin();
        let fi = (1.0 - e_sin_beta) / (1.0 + e_sin_beta);
        let theta = (FRAC_PI_4 + beta / 2.0).tan() * fi.powf(self.eccentricity / 2.0);
        let y = rho * (1.0 - theta.ln() / PI);
        (x, y)
    }

    fn from_global_pixels(&self, x: f64, y: f64, zoom: u8) -> (f64, f64) {
        let lon = 180.0 * x / self.rho(zoom) - 180.0;

        let ts = (-self.northing(y, zoom) / MAJOR_EARTH_RADIUS).exp();
        let chi = FRAC_PI_2 - 2.0 * ts.atan();
        let phi = chi
            + self.d2 * (2.0 * chi).sin()
            + self.d4 * (4.0 * chi).sin()
            + self.d6 * (6.0 * chi).sin()
            + self.d8 * (8.0 * chi).sin();
        (
            round_to_digit(phi.to_degrees(), INVERSE_PRECISION),
            round_to_digit(lon, INVERSE_PRECISION),
        )
    }
}

/// Rounds half to even at `digits` places after the point.
pub fn round_to_digit(value: f64, digits: i32) -> f64 {
    let m = 10f64.powi(digits);
    (value * m).round_ties_even() / m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_digit() {
        assert_eq!(round_to_digit(1.23456789, 7), 1.2345679);
        assert_eq!(round_to_digit(2.5, 0), 2.0);
        assert_eq!(round_to_digit(3.5, 0), 4.0);
        assert_eq!(round_to_digit(44.99999999997, 7), 45.0);
    }

    #[test]
    fn test_origin_is_plane_center() {
        let projection = EllipsoidalMercator::default();
        for zoom in [0u8, 1, 10, 23] {
            let (x, y) = projection.to_global_pixels(0.0, 0.0, zoom);
            let half = 128.0 * 2f64.powi(i32::from(zoom));
            assert!((x - half).abs() < 1e-6, "zoom {zoom}: x={x}");
            assert!((y - half).abs() < 1e-6, "zoom {zoom}: y={y}");
        }
    }

    #[test]
    fn test_longitude_is_linear() {
        let projection = EllipsoidalMercator::default();
        let (x_west, _) = projection.to_global_pixels(0.0, -180.0, 2);
        let (x_east, _) = projection.to_global_pixels(0.0, 180.0, 2);
        assert_eq!(x_west, 0.0);
        assert_eq!(x_east, 1024.0);
    }

    #[test]
    fn test_pole_is_finite() {
        let projection = EllipsoidalMercator::default();
        let (_, north) = projection.to_global_pixels(90.0, 0.0, 5);
        let (_, south) = projection.to_global_pixels(-90.0, 0.0, 5);
        assert!(north.is_finite());
        assert!(south.is_finite());
        assert!(north < 0.0);
        assert!(south > 256.0 * 32.0);
    }

    #[test]
    fn test_ellipsoid_differs_from_sphere() {
        let ellipsoid = EllipsoidalMercator::wgs84(256);
        let sphere = EllipsoidalMercator::spherical(256);
        let (_, y_e) = ellipsoid.to_global_pixels(55.0, 37.0, 10);
        let (_, y_s) = sphere.to_global_pixels(55.0, 37.0, 10);
        assert!((y_e - y_s).abs() > 1.0);
    }

    #[test]
    fn test_round_trip_ellipsoid() {
        let projection = EllipsoidalMercator::wgs84(256);
        for lat in (-80..=80).step_by(5) {
            for lon in (-180..=180).step_by(15) {
                for zoom in [0u8, 3, 10, 17, 23] {
                    let (lat, lon) = (f64::from(lat), f64::from(lon));
                    let (x, y) = projection.to_global_pixels(lat, lon, zoom);
                    let (nlat, nlon) = projection.from_global_pixels(x, y, zoom);
                    assert!((nlat - lat).abs() < 1e-6, "lat {lat} zoom {zoom}: {nlat}");
                    assert!((nlon - lon).abs() < 1e-6, "lon {lon} zoom {zoom}: {nlon}");
                }
            }
        }
    }

    #[test]
    fn test_round_trip_sphere() {
        let projection = EllipsoidalMercator::for_srid(Srid::WEB_MERCATOR, 256);
        assert_eq!(projection.eccentricity(), 0.0);
        let (x, y) = projection.to_global_pixels(48.8566, 2.3522, 12);
        let (lat, lon) = projection.from_global_pixels(x, y, 12);
        assert!((lat - 48.8566).abs() < 1e-6);
        assert!((lon - 2.3522).abs() < 1e-6);
    }

    #[test]
    fn test_series_matches_iterative_inverse() {
        let projection = EllipsoidalMercator::wgs84(256);
        for lat in [-75.0, -33.3, 0.0, 12.5, 55.7558, 84.0] {
            let (x, y) = projection.to_global_pixels(lat, 10.0, 15);
            let (series, _) = projection.from_global_pixels(x, y, 15);
            let (iterative, _) = projection.from_global_pixels_iterative(x, y, 15);
            assert!((series - iterative).abs() < 1e-6, "{series} vs {iterative}");
        }
    }
}
