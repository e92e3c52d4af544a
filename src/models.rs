use crate::geo::Coordinate;
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Label stored when a location is set without a human readable address.
pub const DEFAULT_ADDRESS: &str = "Pinned location";

/// The single search origin. Persisted verbatim as the `user_location` preference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLocation {
    pub lat: f64,
    pub lng: f64,
    pub address: String,
}

impl UserLocation {
    pub fn new(lat: f64, lng: f64, address: Option<&str>) -> Self {
        Self {
            lat,
            lng,
            address: address
                .filter(|a| !a.trim().is_empty())
                .unwrap_or(DEFAULT_ADDRESS)
                .to_string(),
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub location: Coordinate,
}

/// One entry of a Places Nearby Search response. Treated as read-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceResult {
    pub place_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub vicinity: Option<String>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub user_ratings_total: Option<u32>,
    #[serde(default)]
    pub price_level: Option<u8>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
    #[serde(default)]
    pub business_status: Option<String>,
}

impl PlaceResult {
    pub fn coordinate(&self) -> Option<Coordinate> {
        self.geometry.map(|g| g.location)
    }
}

/// Opening hours as returned by both the search and the details endpoints.
///
/// Nearby Search usually only carries the legacy `open_now` flag; the
/// details payload carries the weekly `periods` needed to compute the
/// status for an arbitrary instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpeningHours {
    #[serde(default)]
    pub open_now: Option<bool>,
    #[serde(default)]
    pub periods: Option<Vec<Period>>,
    #[serde(default)]
    pub weekday_text: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    pub open: DayTime,
    #[serde(default)]
    pub close: Option<DayTime>,
}

/// `day` is 0 for Sunday, `time` is local "HHMM".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayTime {
    pub day: u8,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub relative_time_description: Option<String>,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub photo_reference: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub html_attributions: Vec<String>,
}

/// Extended record fetched on demand for a single place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub photos: Vec<Photo>,
    #[serde(default)]
    pub formatted_phone_number: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
    /// Offset from UTC in minutes.
    #[serde(default)]
    pub utc_offset: Option<i32>,
}

/// A prediction from address autocomplete. Carries no coordinate; it has to
/// be resolved through the details endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressSuggestion {
    pub place_id: String,
    pub description: String,
}

/// Reverse geocoding hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub formatted_address: String,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

/// Link that opens the place in Google Maps.
pub fn maps_url(place: &PlaceResult) -> Option<String> {
    if place.name.is_empty() {
        return None;
    }
    let mut params = vec![("api", "1"), ("query", place.name.as_str())];
    if !place.place_id.is_empty() {
        params.push(("query_place_id", place.place_id.as_str()));
    }
    Url::parse_with_params("https://www.google.com/maps/search/", &params)
        .ok()
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nearby_search_entry() {
        let raw = r#"{
            "place_id": "abc",
            "name": "Ramen Nagi",
            "vicinity": "Xinyi Rd",
            "geometry": { "location": { "lat": 25.03, "lng": 121.56 } },
            "rating": 4.5,
            "user_ratings_total": 1200,
            "price_level": 2,
            "opening_hours": { "open_now": true }
        }"#;
        let place: PlaceResult = serde_json::from_str(raw).unwrap();
        assert_eq!(place.coordinate(), Some(Coordinate::new(25.03, 121.56)));
        assert_eq!(place.opening_hours.unwrap().open_now, Some(true));
        assert_eq!(place.price_level, Some(2));
    }

    #[test]
    fn missing_address_uses_default_label() {
        let loc = UserLocation::new(1.0, 2.0, None);
        assert_eq!(loc.address, DEFAULT_ADDRESS);
        let loc = UserLocation::new(1.0, 2.0, Some("  "));
        assert_eq!(loc.address, DEFAULT_ADDRESS);
    }

    #[test]
    fn maps_url_carries_name_and_place_id() {
        let place = PlaceResult {
            place_id: "xyz".into(),
            name: "拉麵 店".into(),
            ..Default::default()
        };
        let url = maps_url(&place).unwrap();
        assert!(url.starts_with("https://www.google.com/maps/search/?api=1&query="));
        assert!(url.ends_with("&query_place_id=xyz"));
        assert!(!url.contains(' '));
    }
}
