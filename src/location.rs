//! Device location for the "use current location" option.
//!
//! A terminal has no GPS, so the position is approximated through IP
//! geolocation (ip-api). Unlike a hard-coded fallback, a failed lookup
//! leaves the location unset and the user picks one manually.

use crate::geo::Coordinate;
use ipgeolocate::{Locator, Service};
use tracing::{error, info};

/// Address label stored for a geolocated position.
pub const CURRENT_LOCATION_LABEL: &str = "Current location";

/// Resolves the approximate position of `lookup_ip` (empty for the caller's
/// own public address).
///
/// Returns `None` on any network, service or parse failure.
pub async fn locate(lookup_ip: &str) -> Option<Coordinate> {
    match Locator::get(lookup_ip, Service::IpApi).await {
        Ok(loc) => {
            let coordinate = parse_coordinate(&loc.latitude, &loc.longitude);
            match coordinate {
                Some(c) => info!("Geolocation successful - ({}, {})", c.lat, c.lng),
                None => error!(
                    "Geolocation returned unusable coordinates ({}, {})",
                    loc.latitude, loc.longitude
                ),
            }
            coordinate
        }
        Err(e) => {
            error!("Error using geolocation service: {}", e);
            None
        }
    }
}

fn parse_coordinate(lat: &str, lng: &str) -> Option<Coordinate> {
    let lat = lat.trim().parse::<f64>().ok()?;
    let lng = lng.trim().parse::<f64>().ok()?;
    ((-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng)).then(|| Coordinate::new(lat, lng))
}
