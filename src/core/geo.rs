//! Geofence check: great-circle distance between a claimed position and a
//! registered work site. Pure and deterministic.

use crate::model::location::Location;
use serde::Serialize;
use utoipa::ToSchema;

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct GeoCheck {
    #[schema(example = true)]
    pub within_radius: bool,
    #[schema(example = 52.3)]
    pub distance_meters: f64,
}

/// Haversine great-circle distance in meters.
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Floating error can push `a` a hair outside [0, 1] for equal or
    // antipodal points; clamp before the square roots.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Compare a claimed position against a site's geofence.
pub fn validate(claimed_lat: f64, claimed_lon: f64, site: &Location) -> GeoCheck {
    let distance_meters =
        distance_meters(claimed_lat, claimed_lon, site.latitude, site.longitude);
    GeoCheck {
        within_radius: distance_meters <= site.radius_meters,
        distance_meters,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(lat: f64, lon: f64, radius: f64) -> Location {
        Location {
            id: 1,
            name: "site".into(),
            latitude: lat,
            longitude: lon,
            radius_meters: radius,
            active: true,
        }
    }

    #[test]
    fn same_point_is_zero_distance() {
        for (lat, lon) in [(0.0, 0.0), (23.8103, 90.4125), (-89.9, 179.9)] {
            assert_eq!(distance_meters(lat, lon, lat, lon), 0.0);
        }
    }

    #[test]
    fn antipodal_points_do_not_blow_up() {
        let d = distance_meters(0.0, 0.0, 0.0, 180.0);
        let half_circumference = std::f64::consts::PI * 6_371_000.0;
        assert!((d - half_circumference).abs() < 1.0);
        assert!(d.is_finite());
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let d = distance_meters(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111_195.0).abs() < 100.0, "got {d}");
    }

    #[test]
    fn within_radius_matches_distance_comparison() {
        let s = site(23.8103, 90.4125, 200.0);
        // ~50 m north of the site center
        let near = validate(23.81075, 90.4125, &s);
        assert!(near.within_radius);
        assert!(near.distance_meters < 200.0);

        // ~500 m north
        let far = validate(23.8148, 90.4125, &s);
        assert!(!far.within_radius);
        assert!(far.distance_meters > 200.0);
    }

    #[test]
    fn boundary_is_inclusive() {
        let s = site(0.0, 0.0, 1_000_000.0);
        let check = validate(0.0, 0.0, &s);
        assert!(check.within_radius);
        assert_eq!(check.distance_meters, 0.0);
    }
}
