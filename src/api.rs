use crate::geo::Coordinate;
use crate::models::{AddressSuggestion, GeocodeResult, PlaceDetails, PlaceResult};
use crate::search::NearbyRequest;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const BASE_URL: &str = "https://maps.googleapis.com/maps/api";

#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service answered {status}{}", suffix(.message))]
    Status {
        status: String,
        message: Option<String>,
    },
    #[error("service returned no result")]
    Empty,
}

fn suffix(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

/// Fields that can be requested from the details endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailField {
    Reviews,
    Photos,
    FormattedPhoneNumber,
    Website,
    OpeningHours,
    UtcOffset,
    Geometry,
    FormattedAddress,
    Name,
}

impl DetailField {
    pub fn as_str(self) -> &'static str {
        match self {
            DetailField::Reviews => "reviews",
            DetailField::Photos => "photos",
            DetailField::FormattedPhoneNumber => "formatted_phone_number",
            DetailField::Website => "website",
            DetailField::OpeningHours => "opening_hours",
            DetailField::UtcOffset => "utc_offset",
            DetailField::Geometry => "geometry",
            DetailField::FormattedAddress => "formatted_address",
            DetailField::Name => "name",
        }
    }
}

/// Everything the app needs from the hosted maps service.
///
/// The production implementation is [`GoogleMapsClient`]; tests substitute
/// an in-memory fake.
#[async_trait]
pub trait PlacesClient: Send + Sync {
    async fn nearby_search(&self, request: &NearbyRequest) -> Result<Vec<PlaceResult>, PlacesError>;

    async fn get_details(&self, place_id: &str, fields: &[DetailField]) -> Result<PlaceDetails, PlacesError>;

    /// Reverse geocoding: best address for a coordinate.
    async fn geocode(&self, at: Coordinate) -> Result<GeocodeResult, PlacesError>;

    async fn autocomplete(&self, input: &str) -> Result<Vec<AddressSuggestion>, PlacesError>;
}

#[derive(Deserialize)]
struct ListEnvelope<T> {
    status: String,
    #[serde(default = "Vec::new", alias = "predictions")]
    results: Vec<T>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct ItemEnvelope<T> {
    status: String,
    result: Option<T>,
    #[serde(default)]
    error_message: Option<String>,
}

fn check_status(status: &str, message: Option<String>) -> Result<(), PlacesError> {
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        _ => Err(PlacesError::Status {
            status: status.to_string(),
            message,
        }),
    }
}

/// Google Maps Platform web-service client.
pub struct GoogleMapsClient {
    client: Client,
    api_key: String,
    language: String,
}

impl GoogleMapsClient {
    pub fn new(api_key: String, language: String, timeout: Duration) -> Result<Self, PlacesError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            language,
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, PlacesError> {
        debug!("GET {}/{}", BASE_URL, path);
        let res = self
            .client
            .get(format!("{BASE_URL}/{path}"))
            .query(query)
            .query(&[("key", self.api_key.as_str()), ("language", self.language.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json::<T>()
            .await?;
        Ok(res)
    }

    async fn fetch_list<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<T>, PlacesError> {
        let env: ListEnvelope<T> = self.fetch(path, query).await?;
        check_status(&env.status, env.error_message)?;
        Ok(env.results)
    }
}

#[async_trait]
impl PlacesClient for GoogleMapsClient {
    async fn nearby_search(&self, request: &NearbyRequest) -> Result<Vec<PlaceResult>, PlacesError> {
        self.fetch_list(
            "place/nearbysearch/json",
            &[
                ("location", format!("{},{}", request.center.lat, request.center.lng)),
                ("radius", request.radius_meters.to_string()),
                ("keyword", request.keyword.clone()),
                ("type", request.kind.to_string()),
            ],
        )
        .await
    }

    async fn get_details(&self, place_id: &str, fields: &[DetailField]) -> Result<PlaceDetails, PlacesError> {
        let fields = fields.iter().map(|f| f.as_str()).collect::<Vec<_>>().join(",");
        let env: ItemEnvelope<PlaceDetails> = self
            .fetch(
                "place/details/json",
                &[("place_id", place_id.to_string()), ("fields", fields)],
            )
            .await?;
        check_status(&env.status, env.error_message)?;
        env.result.ok_or(PlacesError::Empty)
    }

    async fn geocode(&self, at: Coordinate) -> Result<GeocodeResult, PlacesError> {
        let results: Vec<GeocodeResult> = self
            .fetch_list("geocode/json", &[("latlng", format!("{},{}", at.lat, at.lng))])
            .await?;
        results.into_iter().next().ok_or(PlacesError::Empty)
    }

    async fn autocomplete(&self, input: &str) -> Result<Vec<AddressSuggestion>, PlacesError> {
        self.fetch_list("place/autocomplete/json", &[("input", input.to_string())])
            .await
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_results_is_not_an_error() {
        let env: ListEnvelope<PlaceResult> =
            serde_json::from_str(r#"{"status":"ZERO_RESULTS","results":[]}"#).unwrap();
        assert!(check_status(&env.status, env.error_message).is_ok());
        assert!(env.results.is_empty());
    }

    #[test]
    fn denied_request_carries_the_service_message() {
        let env: ListEnvelope<PlaceResult> = serde_json::from_str(
            r#"{"status":"REQUEST_DENIED","error_message":"The provided API key is invalid."}"#,
        )
        .unwrap();
        let err = check_status(&env.status, env.error_message).unwrap_err();
        assert_eq!(
            err.to_string(),
            "service answered REQUEST_DENIED: The provided API key is invalid."
        );
    }

    #[test]
    fn autocomplete_predictions_parse_through_the_list_envelope() {
        let env: ListEnvelope<AddressSuggestion> = serde_json::from_str(
            r#"{"status":"OK","predictions":[{"place_id":"p1","description":"Taipei 101"}]}"#,
        )
        .unwrap();
        assert_eq!(env.results[0].description, "Taipei 101");
    }

    #[test]
    fn detail_fields_join_into_the_query_format() {
        let joined = crate::details::DETAIL_FIELDS
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(",");
        assert_eq!(
            joined,
            "reviews,photos,formatted_phone_number,website,opening_hours,utc_offset"
        );
    }
}
