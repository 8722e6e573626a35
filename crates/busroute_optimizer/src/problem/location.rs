use geo::Point;
use serde::{Deserialize, Serialize};

/// Mean earth radius used for great-circle distances.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A geographic coordinate. The point stores `(lon, lat)` as `x, y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    point: Point,
}

impl Location {
    pub fn from_lat_lon(lat: f64, lon: f64) -> Self {
        Self {
            point: Point::new(lon, lat),
        }
    }

    pub fn lon(&self) -> f64 {
        self.point.x()
    }

    pub fn lat(&self) -> f64 {
        self.point.y()
    }

    pub fn is_valid(&self) -> bool {
        self.lat().is_finite()
            && self.lon().is_finite()
            && (-90.0..=90.0).contains(&self.lat())
            && (-180.0..=180.0).contains(&self.lon())
    }

    /// Great-circle distance in meters using the haversine formula.
    pub fn haversine_distance(&self, to: &Location) -> f64 {
        let lat1 = self.lat().to_radians();
        let lat2 = to.lat().to_radians();
        let delta_lat = lat2 - lat1;
        let delta_lon = to.lon().to_radians() - self.lon().to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);

        EARTH_RADIUS_METERS * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

impl From<(f64, f64)> for Location {
    fn from((lat, lon): (f64, f64)) -> Self {
        Location::from_lat_lon(lat, lon)
    }
}

impl From<&Location> for Point<f64> {
    fn from(location: &Location) -> Self {
        location.point
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_same_point() {
        let location = Location::from_lat_lon(12.9716, 77.5946);
        assert_eq!(location.haversine_distance(&location), 0.0);
    }

    #[test]
    fn test_haversine_one_degree_of_latitude() {
        let a = Location::from_lat_lon(0.0, 0.0);
        let b = Location::from_lat_lon(1.0, 0.0);

        // R * pi / 180
        let expected = EARTH_RADIUS_METERS * std::f64::consts::PI / 180.0;
        assert!((a.haversine_distance(&b) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_haversine_known_distance() {
        // Paris -> London, roughly 343.5 km
        let paris = Location::from_lat_lon(48.8566, 2.3522);
        let london = Location::from_lat_lon(51.5074, -0.1278);

        let distance = paris.haversine_distance(&london);
        assert!((distance - 343_556.0).abs() < 1_000.0, "{distance}");
    }

    #[test]
    fn test_is_valid() {
        assert!(Location::from_lat_lon(45.0, 170.0).is_valid());
        assert!(!Location::from_lat_lon(91.0, 0.0).is_valid());
        assert!(!Location::from_lat_lon(0.0, -180.5).is_valid());
        assert!(!Location::from_lat_lon(f64::NAN, 0.0).is_valid());
    }
}
