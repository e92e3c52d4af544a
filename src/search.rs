//! Nearby restaurant search.

use crate::api::PlacesClient;
use crate::geo::Coordinate;
use crate::models::PlaceResult;
use tracing::{info, warn};

pub const PLACE_KIND: &str = "restaurant";

/// Radius choices offered in the header, in meters.
pub const RADIUS_OPTIONS: [u32; 5] = [500, 1000, 1500, 3000, 5000];

#[derive(Debug, Clone, PartialEq)]
pub struct NearbyRequest {
    pub center: Coordinate,
    pub radius_meters: u32,
    pub keyword: String,
    pub kind: &'static str,
}

impl NearbyRequest {
    /// Returns `None` unless the client is ready, a center is known and the
    /// keyword is non-blank. Nothing is sent in that case.
    pub fn prepare(
        client_ready: bool,
        center: Option<Coordinate>,
        radius_meters: u32,
        keyword: Option<&str>,
    ) -> Option<Self> {
        if !client_ready {
            return None;
        }
        let center = center?;
        let keyword = keyword.map(str::trim).filter(|k| !k.is_empty())?;
        Some(Self {
            center,
            radius_meters,
            keyword: keyword.to_string(),
            kind: PLACE_KIND,
        })
    }
}

/// Issues exactly one nearby search.
///
/// Results come back in service order. Any failure collapses to an empty
/// list; callers cannot tell "no matches" from "service failed".
pub async fn nearby(client: &dyn PlacesClient, request: &NearbyRequest) -> Vec<PlaceResult> {
    match client.nearby_search(request).await {
        Ok(places) => {
            info!(
                "Nearby search '{}' within {}m returned {} places",
                request.keyword,
                request.radius_meters,
                places.len()
            );
            places
        }
        Err(e) => {
            warn!("Nearby search '{}' failed: {}", request.keyword, e);
            Vec::new()
        }
    }
}

/// Label shown in the radius picker.
pub fn radius_label(meters: u32) -> String {
    if meters < 1000 {
        format!("{meters}m")
    } else if meters % 1000 == 0 {
        format!("{}km", meters / 1000)
    } else {
        format!("{:.1}km", meters as f64 / 1000.0)
    }
}
