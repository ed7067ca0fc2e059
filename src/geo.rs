//! Great-circle distance between coordinate pairs.

use crate::models::Coordinates;

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points, in kilometers.
#[inline]
pub fn haversine_distance(from: Coordinates, to: Coordinates) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Rounds a distance to one decimal place, the precision shown to clients.
#[inline]
pub fn round_to_tenth(km: f64) -> f64 {
    (km * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(lat: f64, lng: f64) -> Coordinates {
        Coordinates { lat, lng }
    }

    #[test]
    fn test_zero_distance_for_identical_points() {
        let frankfurt = coords(50.1109, 8.6821);
        assert_eq!(haversine_distance(frankfurt, frankfurt), 0.0);
    }

    #[test]
    fn test_frankfurt_to_berlin() {
        let frankfurt = coords(50.1109, 8.6821);
        let berlin = coords(52.5200, 13.4050);
        let distance = haversine_distance(frankfurt, berlin);
        // Great-circle distance is roughly 424 km
        assert!((distance - 424.0).abs() < 5.0, "got {distance}");
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = coords(50.1109, 8.6821);
        let b = coords(48.1351, 11.5820);
        let ab = haversine_distance(a, b);
        let ba = haversine_distance(b, a);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn test_round_to_tenth() {
        assert_eq!(round_to_tenth(1.26), 1.3);
        assert_eq!(round_to_tenth(1.24), 1.2);
        assert_eq!(round_to_tenth(0.0), 0.0);
        assert_eq!(round_to_tenth(49.95), 50.0);
    }
}
