//! Great-circle distance and the distance ordering used by the list view.

use crate::models::PlaceResult;
use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Haversine distance between two WGS84 coordinates, in meters.
pub fn distance_meters(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// A search hit with its transient distance from the user. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedPlace {
    pub place: PlaceResult,
    pub distance: f64,
}

impl RankedPlace {
    /// `None` when the place had no coordinate (distance 0).
    pub fn distance_label(&self) -> Option<String> {
        (self.distance > 0.0).then(|| format_distance(self.distance))
    }
}

/// Sorts places nearest first. A place without a coordinate gets distance 0.
pub fn rank_by_distance(origin: Coordinate, places: &[PlaceResult]) -> Vec<RankedPlace> {
    let mut ranked: Vec<RankedPlace> = places
        .iter()
        .map(|place| RankedPlace {
            distance: place
                .coordinate()
                .map(|to| distance_meters(origin, to))
                .unwrap_or(0.0),
            place: place.clone(),
        })
        .collect();
    ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    ranked
}

/// "420m" below a kilometer, "1.3km" above.
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{}m", meters.round() as u64)
    } else {
        format!("{:.1}km", meters / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Geometry;

    const TAIPEI_101: Coordinate = Coordinate::new(25.0330, 121.5654);
    const TAIPEI_MAIN: Coordinate = Coordinate::new(25.0478, 121.5170);

    fn place_at(id: &str, at: Option<Coordinate>) -> PlaceResult {
        PlaceResult {
            place_id: id.to_string(),
            name: id.to_string(),
            geometry: at.map(|location| Geometry { location }),
            ..Default::default()
        }
    }

    #[test]
    fn distance_to_self_is_zero() {
        for p in [TAIPEI_101, TAIPEI_MAIN, Coordinate::new(-33.86, 151.2), Coordinate::new(0.0, 0.0)] {
            assert_eq!(distance_meters(p, p), 0.0);
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            (TAIPEI_101, TAIPEI_MAIN),
            (Coordinate::new(51.5, -0.12), Coordinate::new(40.71, -74.0)),
            (Coordinate::new(-89.9, 10.0), Coordinate::new(89.9, -170.0)),
        ];
        for (a, b) in pairs {
            assert!((distance_meters(a, b) - distance_meters(b, a)).abs() < 1e-6);
        }
    }

    #[test]
    fn known_distance_is_close() {
        // Taipei 101 to Taipei Main Station is about 5.1 km.
        let d = distance_meters(TAIPEI_101, TAIPEI_MAIN);
        assert!((5000.0..5300.0).contains(&d), "got {d}");
    }

    #[test]
    fn ranking_sorts_nearest_first_and_zeroes_missing_coordinates() {
        let far = place_at("far", Some(TAIPEI_MAIN));
        let near = place_at("near", Some(Coordinate::new(25.0340, 121.5654)));
        let unknown = place_at("unknown", None);
        let ranked = rank_by_distance(TAIPEI_101, &[far, near, unknown]);
        let ids: Vec<_> = ranked.iter().map(|r| r.place.place_id.as_str()).collect();
        assert_eq!(ids, ["unknown", "near", "far"]);
        assert_eq!(ranked[0].distance, 0.0);
        assert_eq!(ranked[0].distance_label(), None);
    }

    #[test]
    fn ranking_is_unchanged_when_measuring_from_the_target() {
        let places = vec![
            place_at("a", Some(TAIPEI_MAIN)),
            place_at("b", Some(Coordinate::new(25.0400, 121.5600))),
            place_at("c", Some(Coordinate::new(25.0331, 121.5660))),
        ];
        let forward = rank_by_distance(TAIPEI_101, &places);

        let mut reversed: Vec<(f64, &str)> = places
            .iter()
            .map(|p| (distance_meters(p.coordinate().unwrap(), TAIPEI_101), p.place_id.as_str()))
            .collect();
        reversed.sort_by(|a, b| a.0.total_cmp(&b.0));

        let forward_ids: Vec<_> = forward.iter().map(|r| r.place.place_id.as_str()).collect();
        let reversed_ids: Vec<_> = reversed.iter().map(|(_, id)| *id).collect();
        assert_eq!(forward_ids, reversed_ids);
    }

    #[test]
    fn formats_meters_and_kilometers() {
        assert_eq!(format_distance(200.4), "200m");
        assert_eq!(format_distance(999.4), "999m");
        assert_eq!(format_distance(1000.0), "1.0km");
        assert_eq!(format_distance(2345.0), "2.3km");
    }
}
