//! Turns queued [`Command`]s into spawned tasks whose results come back as
//! [`Event`]s.

use crate::api::{DetailField, PlacesClient};
use crate::app::{App, Command};
use crate::details::DETAIL_FIELDS;
use crate::events::Event;
use crate::location;
use crate::search;
use crate::selector;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

/// Fields needed to turn an autocomplete suggestion into a location.
const ADDRESS_FIELDS: [DetailField; 3] = [DetailField::Geometry, DetailField::FormattedAddress, DetailField::Name];

/// Drains the app's pending commands and starts each one.
///
/// Every network call is a one-shot task: it is neither retried nor
/// cancelled, and its completion is posted to `tx`.
pub fn dispatch(app: &mut App, client: Option<&Arc<dyn PlacesClient>>, tx: &UnboundedSender<Event>) {
    for command in app.take_commands() {
        match command {
            Command::StartDraw { run } => {
                let handle = selector::start(run, app.config.draw_schedule(), tx.clone(), StdRng::from_entropy());
                app.attach_run(handle);
            }
            Command::Geolocate => {
                let tx = tx.clone();
                let lookup_ip = app.config.location.lookup_ip.clone();
                tokio::spawn(async move {
                    let found = location::locate(&lookup_ip).await;
                    let _ = tx.send(Event::Located(found));
                });
            }
            other => match client {
                Some(client) => spawn_maps_call(other, Arc::clone(client), tx.clone()),
                None => warn!("Dropping {:?}: no maps client configured", other),
            },
        }
    }
}

fn spawn_maps_call(command: Command, client: Arc<dyn PlacesClient>, tx: UnboundedSender<Event>) {
    tokio::spawn(async move {
        let event = match command {
            Command::Search { seq, request } => Event::PlacesFound {
                seq,
                places: search::nearby(client.as_ref(), &request).await,
            },
            Command::FetchDetails(fetch) => Event::DetailsLoaded {
                result: client.get_details(&fetch.place_id, &DETAIL_FIELDS).await,
                place_id: fetch.place_id,
            },
            Command::ReverseGeocode(at) => {
                let address = match client.geocode(at).await {
                    Ok(hit) => Some(hit.formatted_address),
                    Err(e) => {
                        warn!("Reverse geocoding ({}, {}) failed: {}", at.lat, at.lng, e);
                        None
                    }
                };
                Event::Geocoded { at, address }
            }
            Command::Autocomplete(input) => {
                let suggestions = client.autocomplete(&input).await.unwrap_or_else(|e| {
                    warn!("Autocomplete for '{}' failed: {}", input, e);
                    Vec::new()
                });
                Event::Suggestions { input, suggestions }
            }
            Command::ResolveSuggestion(suggestion) => {
                let resolved = match client.get_details(&suggestion.place_id, &ADDRESS_FIELDS).await {
                    Ok(details) => details.geometry.map(|g| {
                        let address = details
                            .formatted_address
                            .or(details.name)
                            .unwrap_or_else(|| suggestion.description.clone());
                        (g.location, address)
                    }),
                    Err(e) => {
                        warn!("Could not resolve '{}': {}", suggestion.description, e);
                        None
                    }
                };
                Event::SuggestionResolved(resolved)
            }
            Command::StartDraw { .. } | Command::Geolocate => return,
        };
        let _ = tx.send(event);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakePlaces;
    use crate::config::Config;
    use crate::geo::Coordinate;
    use crate::models::{AddressSuggestion, Geometry, PlaceDetails};
    use crate::store::LocationStore;
    use tokio::sync::mpsc;

    fn fake_client(fake: FakePlaces) -> (Arc<FakePlaces>, Arc<dyn PlacesClient>) {
        let fake = Arc::new(fake);
        let client: Arc<dyn PlacesClient> = fake.clone();
        (fake, client)
    }

    #[tokio::test(start_paused = true)]
    async fn full_draw_searches_once_with_the_final_pick() {
        let (fake, client) = fake_client(FakePlaces::with_places(Vec::new()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut app = App::new(Config::default(), LocationStore::in_memory().unwrap(), true);
        app.set_location(Coordinate::new(25.0330, 121.5654), Some("Taipei 101"));
        app.close_modal();

        app.run_draw();
        dispatch(&mut app, Some(&client), &tx);

        let mut shown = Vec::new();
        let mut committed = None;
        while committed.is_none() {
            let event = rx.recv().await.unwrap();
            if let Event::FoodDraw { option, committed: done, .. } = &event {
                shown.push(option.query);
                if *done {
                    committed = Some(option.query);
                }
            }
            app.on_event(event);
            dispatch(&mut app, Some(&client), &tx);
        }

        match rx.recv().await.unwrap() {
            Event::PlacesFound { places, .. } => assert!(places.is_empty()),
            other => panic!("unexpected event {other:?}"),
        }

        assert_eq!(shown.len(), 11);
        let calls = fake.nearby_calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(Some(calls[0].keyword.as_str()), committed);
    }

    #[tokio::test]
    async fn suggestion_resolves_through_details() {
        let fake = FakePlaces::default();
        fake.details.lock().unwrap().insert(
            "t101".into(),
            PlaceDetails {
                formatted_address: Some("No. 7, Section 5, Xinyi Rd".into()),
                geometry: Some(Geometry { location: Coordinate::new(25.0336, 121.5648) }),
                ..Default::default()
            },
        );
        let (_fake, client) = fake_client(fake);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut app = App::new(Config::default(), LocationStore::in_memory().unwrap(), true);

        spawn_maps_call(
            Command::ResolveSuggestion(AddressSuggestion {
                place_id: "t101".into(),
                description: "Taipei 101".into(),
            }),
            client,
            tx,
        );
        app.on_event(rx.recv().await.unwrap());

        let loc = app.location().unwrap();
        assert_eq!(loc.address, "No. 7, Section 5, Xinyi Rd");
        assert_eq!((loc.lat, loc.lng), (25.0336, 121.5648));
    }

    #[tokio::test]
    async fn failed_reverse_geocode_still_sets_the_point() {
        let (_fake, client) = fake_client(FakePlaces::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut app = App::new(Config::default(), LocationStore::in_memory().unwrap(), true);

        spawn_maps_call(Command::ReverseGeocode(Coordinate::new(1.0, 2.0)), client, tx);
        app.on_event(rx.recv().await.unwrap());
        assert_eq!(app.location().unwrap().address, crate::models::DEFAULT_ADDRESS);
    }
}
