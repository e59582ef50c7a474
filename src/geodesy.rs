//! Great-circle distance on a spherical Earth.

/// Mean Earth radius used for every distance in the crate.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance in meters between two points given in degrees.
///
/// Spherical approximation, no ellipsoidal correction. Range checking is the
/// caller's job (see [`crate::model::Point::new`]).
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_points_are_zero() {
        for &(lat, lon) in &[(0.0, 0.0), (37.7749, -122.4194), (-89.9, 179.9), (90.0, -180.0)] {
            assert_eq!(haversine_distance(lat, lon, lat, lon), 0.0);
        }
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            ((37.7749, -122.4194), (34.0522, -118.2437)),
            ((35.6762, 139.6503), (-33.8688, 151.2093)),
            ((0.0, 179.5), (0.0, -179.5)),
        ];
        for ((a_lat, a_lon), (b_lat, b_lon)) in pairs {
            assert_eq!(
                haversine_distance(a_lat, a_lon, b_lat, b_lon),
                haversine_distance(b_lat, b_lon, a_lat, a_lon)
            );
        }
    }

    #[test]
    fn test_san_francisco_to_los_angeles() {
        let d = haversine_distance(37.7749, -122.4194, 34.0522, -118.2437);
        assert!((550_000.0..=560_000.0).contains(&d), "got {d}");
    }

    #[test]
    fn test_one_degree_on_equator() {
        let d = haversine_distance(0.0, 0.0, 0.0, 1.0);
        let expected = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;
        assert!((d - expected).abs() < 1e-6);
    }

    #[test]
    fn test_antimeridian_is_short_way_round() {
        let d = haversine_distance(0.0, 179.5, 0.0, -179.5);
        assert!(d < 112_000.0, "got {d}");
    }
}
