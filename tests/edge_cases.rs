use geohost::projection::{EllipsoidalMercator, POLE_EPSILON, Projection};
use geohost::{Config, GeoError, GeographicSystem, MapRequest, QuadKey, QuadKeySystem, TileBBox};

#[test]
fn test_projection_round_trip_all_zooms() {
    let projection = EllipsoidalMercator::wgs84(256);
    let lats = [-85.0, -60.5, -1e-7, 0.0, 33.3333333, 84.9];
    let lons = [-180.0, -97.25, 0.0, 0.1234567, 179.9999999];
    for zoom in 0..=23u8 {
        for lat in lats {
            for lon in lons {
                let (x, y) = projection.to_global_pixels(lat, lon, zoom);
                let (nlat, nlon) = projection.from_global_pixels(x, y, zoom);
                assert!((nlat - lat).abs() <= 1e-7, "lat {lat} zoom {zoom}: {nlat}");
                assert!((nlon - lon).abs() <= 1e-7, "lon {lon} zoom {zoom}: {nlon}");
            }
        }
    }
}

#[test]
fn test_poles_stay_finite() {
    let projection = EllipsoidalMercator::default();
    for lat in [90.0, -90.0, 90.0 - POLE_EPSILON, 1e6, -1e6] {
        let (x, y) = projection.to_global_pixels(lat, 0.0, 12);
        assert!(x.is_finite() && y.is_finite(), "lat {lat}");
    }
}

#[test]
fn test_tile_round_trip_at_grid_edges() {
    let qks = QuadKeySystem::default();
    for zoom in [0u8, 1, 15, 23] {
        let last = (1u32 << zoom) - 1;
        for (tx, ty) in [(0, 0), (last, 0), (0, last), (last, last)] {
            let key = qks.tile_xy_to_quad_key(tx, ty, zoom);
            assert_eq!(key.len(), usize::from(zoom) + 1);
            assert_eq!(qks.quad_key_to_tile_xy(&key), (tx, ty));
        }
    }
}

#[test]
fn test_range_monotonicity() {
    let qks = QuadKeySystem::default();
    for zoom in [0u8, 5, 10, 22, 23] {
        let key = qks.tile_xy_to_quad_key(3 % (1 << zoom), 1 % (1 << zoom), zoom);
        let (min, max) = qks.quad_key_range(&key);
        let scaled = key.to_u64() << (2 * (24 - key.len()));
        assert!(min.to_u64() <= scaled, "zoom {zoom}");
        assert!(scaled <= max.to_u64(), "zoom {zoom}");
        assert!(min <= max);
    }
}

#[test]
fn test_containment_across_zooms() {
    let system = GeographicSystem::new(Config::default()).unwrap();
    let points = [(-33.8688, 151.2093), (40.7128, -74.0060), (0.0, 0.0), (84.0, -179.0)];
    for (lat, lon) in points {
        let point_key = system.coordinates_to_quad_key(lat, lon);
        for zoom in 0..=23u8 {
            let (x, y) = system.projection().to_global_pixels(lat, lon, zoom);
            let (tx, ty) = system.tile_system().global_pixels_to_tile_xy(x, y);
            let tile_key = system.quad_key_system().tile_xy_to_quad_key(tx, ty, zoom);
            assert!(
                system.quad_key_system().contains(&point_key, &tile_key),
                "({lat}, {lon}) zoom {zoom}"
            );
        }
    }
}

#[test]
fn test_foreign_key_digits_are_rejected() {
    let qks = QuadKeySystem::default();
    for bad in ["0124", "01a", " 012", "０1"] {
        assert!(
            matches!(qks.parse_tile_xy(bad), Err(GeoError::InvalidKeyDigit { .. })),
            "{bad:?}"
        );
    }
    assert!(matches!(
        "0".repeat(40).parse::<QuadKey>(),
        Err(GeoError::KeyTooLong { .. })
    ));
}

#[test]
fn test_empty_and_inverted_viewports() {
    let system = GeographicSystem::new(Config::default()).unwrap();
    let inverted = MapRequest::new(4).with_tile_bbox(TileBBox::new(5, 5, 4, 4));
    assert!(system.viewport_to_tiles(&inverted).unwrap().is_empty());
    assert!(system.bounds_and_cluster_mask(&inverted).unwrap().is_none());
    assert!(system.cluster_query(&MapRequest::new(4)).unwrap().is_empty());
}

#[test]
fn test_zoom_zero_viewport() {
    let system = GeographicSystem::new(Config::default()).unwrap();
    let request = MapRequest::new(0).with_tile_bbox(TileBBox::new(0, 0, 0, 0));
    let query = system.cluster_query(&request).unwrap();
    assert_eq!(query.tile_shift, 46);
    let any = system.coordinates_to_quad_key(-45.0, 120.0);
    assert!(query.contains(any.to_u64()));
}

#[test]
fn test_min_zoom_shortens_keys() {
    let config = Config::default().with_zoom_range(2, 20);
    let system = GeographicSystem::new(config).unwrap();
    assert_eq!(system.coordinates_to_quad_key(10.0, 10.0).len(), 19);
    let key = system.quad_key_system().tile_xy_to_quad_key(12, 8, 4);
    assert_eq!(key.len(), 3);
    assert_eq!(system.quad_key_system().quad_key_to_tile_xy(&key), (12, 8));
}
