//! Great-circle distance helper, grounded in
//! `original_source/meteostat/utils/geo.py::get_distance` (mirrored here in
//! Rust using the `geo` crate's haversine implementation).

use geo::{HaversineDistance, Point as GeoPoint};

/// Great-circle distance in meters between two (lat, lon) pairs.
pub fn get_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let a = GeoPoint::new(lon1, lat1);
    let b = GeoPoint::new(lon2, lat2);
    a.haversine_distance(&b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_point_is_zero() {
        assert_eq!(get_distance(50.0, 8.0, 50.0, 8.0), 0.0);
    }

    #[test]
    fn frankfurt_to_berlin() {
        let d = get_distance(50.1109, 8.6821, 52.5200, 13.4050);
        assert!((420_000.0..=430_000.0).contains(&d), "{d}");
    }

    #[test]
    fn one_degree_at_equator() {
        let d = get_distance(0.0, 0.0, 1.0, 0.0);
        assert!((110_000.0..=112_000.0).contains(&d), "{d}");
    }

    #[test]
    fn cross_meridian() {
        let d = get_distance(0.0, -170.0, 0.0, 170.0);
        assert!((2_200_000.0..=2_250_000.0).contains(&d), "{d}");
    }

    #[test]
    fn symmetry() {
        let d1 = get_distance(50.0, 8.0, 52.0, 9.0);
        let d2 = get_distance(52.0, 9.0, 50.0, 8.0);
        assert_eq!(d1, d2);
    }

    #[test]
    fn small_distance() {
        let d = get_distance(0.0, 0.0, 0.01, 0.0);
        assert!((1000.0..=1200.0).contains(&d), "{d}");
    }
}
