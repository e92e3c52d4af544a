use async_trait::async_trait;
use eat_roulette::api::{DetailField, PlacesClient, PlacesError};
use eat_roulette::app::{App, Command};
use eat_roulette::catalog::find_by_query;
use eat_roulette::config::Config;
use eat_roulette::events::Event;
use eat_roulette::geo::{Coordinate, EARTH_RADIUS_M};
use eat_roulette::models::{AddressSuggestion, GeocodeResult, Geometry, PlaceDetails, PlaceResult};
use eat_roulette::search::{self, NearbyRequest};
use eat_roulette::store::{LocationStore, LOCATION_KEY};
use std::sync::Mutex;

const ORIGIN: Coordinate = Coordinate::new(25.0330, 121.5654);

/// Records nearby searches and answers them with a canned list.
struct RecordingPlaces {
    answer: Vec<PlaceResult>,
    calls: Mutex<Vec<NearbyRequest>>,
}

#[async_trait]
impl PlacesClient for RecordingPlaces {
    async fn nearby_search(&self, request: &NearbyRequest) -> Result<Vec<PlaceResult>, PlacesError> {
        self.calls.lock().unwrap().push(request.clone());
        Ok(self.answer.clone())
    }

    async fn get_details(&self, _place_id: &str, _fields: &[DetailField]) -> Result<PlaceDetails, PlacesError> {
        Err(PlacesError::Empty)
    }

    async fn geocode(&self, _at: Coordinate) -> Result<GeocodeResult, PlacesError> {
        Err(PlacesError::Empty)
    }

    async fn autocomplete(&self, _input: &str) -> Result<Vec<AddressSuggestion>, PlacesError> {
        Ok(Vec::new())
    }
}

/// A place due north of the origin, `meters` away.
fn north_of_origin(id: &str, meters: f64) -> PlaceResult {
    PlaceResult {
        place_id: id.to_string(),
        name: id.to_string(),
        geometry: Some(Geometry {
            location: Coordinate::new(ORIGIN.lat + (meters / EARTH_RADIUS_M).to_degrees(), ORIGIN.lng),
        }),
        ..Default::default()
    }
}

#[tokio::test]
async fn ramen_search_lists_places_nearest_first() {
    let client = RecordingPlaces {
        answer: vec![north_of_origin("far", 800.0), north_of_origin("near", 200.0)],
        calls: Mutex::new(Vec::new()),
    };

    let mut app = App::new(Config::default(), LocationStore::in_memory().unwrap(), true);
    app.set_location(ORIGIN, Some("Taipei 101"));
    app.close_modal();
    app.set_radius(1000);
    assert!(app.take_commands().is_empty(), "no keyword yet, nothing should fire");

    app.run_draw();
    let run = match app.take_commands().as_slice() {
        [Command::StartDraw { run }] => *run,
        other => panic!("expected a draw, got {other:?}"),
    };
    app.on_event(Event::FoodDraw {
        run,
        option: find_by_query("拉麵").unwrap(),
        committed: true,
    });

    let commands = app.take_commands();
    let [Command::Search { seq, request }] = commands.as_slice() else {
        panic!("expected exactly one search, got {commands:?}");
    };
    let places = search::nearby(&client, request).await;
    app.on_event(Event::PlacesFound { seq: *seq, places });

    let calls = client.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].center, ORIGIN);
    assert_eq!(calls[0].radius_meters, 1000);
    assert_eq!(calls[0].keyword, "拉麵");
    assert_eq!(calls[0].kind, "restaurant");

    let labels: Vec<_> = app
        .ranked
        .iter()
        .map(|r| (r.place.place_id.as_str(), r.distance_label()))
        .collect();
    assert_eq!(
        labels,
        [("near", Some("200m".to_string())), ("far", Some("800m".to_string()))]
    );
}

#[test]
fn malformed_stored_location_prompts_for_a_new_one() {
    let path = std::env::temp_dir().join(format!("eat-roulette-{}.db", std::process::id()));
    let _ = std::fs::remove_file(&path);
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute(
            "CREATE TABLE prefs (key TEXT PRIMARY KEY, value TEXT NOT NULL, expires_at INTEGER NOT NULL)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO prefs VALUES (?, ?, ?)",
            rusqlite::params![LOCATION_KEY, "{\"lat\": oops", i64::MAX],
        )
        .unwrap();
    }

    let store = LocationStore::open(&path).unwrap();
    let app = App::new(Config::default(), store, true);
    assert!(app.location().is_none());
    assert!(app.modal.is_some());

    let _ = std::fs::remove_file(&path);
}

#[test]
fn stored_location_is_restored_without_prompting() {
    let path = std::env::temp_dir().join(format!("eat-roulette-ok-{}.db", std::process::id()));
    let _ = std::fs::remove_file(&path);
    {
        let mut store = LocationStore::open(&path).unwrap();
        store.set(ORIGIN.lat, ORIGIN.lng, Some("Taipei 101")).unwrap();
    }

    let app = App::new(Config::default(), LocationStore::open(&path).unwrap(), true);
    assert_eq!(app.location().map(|l| l.address.as_str()), Some("Taipei 101"));
    assert!(app.modal.is_none());

    let _ = std::fs::remove_file(&path);
}
