//! Great-circle distance between GPS coordinates.
//!
//! Check-in admission compares the distance between a session's anchor and a
//! student's submitted position against the session radius, so this has to be
//! deterministic and stable for near-identical and near-antipodal points.

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance in meters between two coordinates given in degrees.
///
/// The intermediate term is clamped to `[0, 1]` so floating-point overshoot
/// near antipodal or identical points can never take `sqrt` out of domain.
pub fn haversine_distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    const HANOI_LAT: f64 = 21.0285;
    const HANOI_LON: f64 = 105.8542;

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(haversine_distance_m(HANOI_LAT, HANOI_LON, HANOI_LAT, HANOI_LON), 0.0);
        assert_eq!(haversine_distance_m(0.0, 0.0, 0.0, 0.0), 0.0);
        assert_eq!(haversine_distance_m(-90.0, 0.0, -90.0, 0.0), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            ((21.0285, 105.8542), (21.0385, 105.8542)),
            ((0.0, 0.0), (10.0, 20.0)),
            ((-33.8688, 151.2093), (51.5074, -0.1278)),
        ];
        for ((lat1, lon1), (lat2, lon2)) in pairs {
            let ab = haversine_distance_m(lat1, lon1, lat2, lon2);
            let ba = haversine_distance_m(lat2, lon2, lat1, lon1);
            assert!((ab - ba).abs() < 1e-6, "asymmetric: {ab} vs {ba}");
        }
    }

    #[test]
    fn one_hundredth_degree_north_is_about_1112_m() {
        let d = haversine_distance_m(HANOI_LAT, HANOI_LON, HANOI_LAT + 0.01, HANOI_LON);
        assert!((1100.0..1125.0).contains(&d), "expected ~1112m, got {d}");
    }

    #[test]
    fn antipodal_points_stay_in_domain() {
        let d = haversine_distance_m(0.0, 0.0, 0.0, 180.0);
        assert!(d.is_finite());
        // half the Earth's circumference, within a kilometer
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_M).abs() < 1000.0);
    }

    #[test]
    fn nearby_points_do_not_produce_nan() {
        let d = haversine_distance_m(21.0285, 105.8542, 21.0285000001, 105.8542000001);
        assert!(d.is_finite());
        assert!(d < 1.0);
    }
}
