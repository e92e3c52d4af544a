//! Event types and the main event loop driver.
//!
//! This module defines the [`Event`] enum (keyboard input, ticks, food draws
//! and the completions of every asynchronous maps call) and the
//! [`EventHandler`], which runs a background task that polls crossterm for
//! key events and emits periodic [`Event::Tick`]s. Tasks spawned by the
//! runtime post their results through [`EventHandler::tx`], so every state
//! change happens on the main loop.

use crate::api::PlacesError;
use crate::catalog::FoodOption;
use crate::geo::Coordinate;
use crate::models::{AddressSuggestion, PlaceDetails, PlaceResult};
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::error;

/// Events processed by the application event loop.
#[derive(Debug)]
pub enum Event {
    /// Periodic tick used for UI refresh.
    Tick,
    /// User key press from the terminal.
    Input(KeyEvent),
    /// One step of a food draw. Only `committed` draws change the keyword.
    FoodDraw {
        run: u64,
        option: &'static FoodOption,
        committed: bool,
    },
    /// Nearby search finished; empty on failure.
    PlacesFound {
        /// Sequence number of the search that produced these places.
        seq: u64,
        places: Vec<PlaceResult>,
    },
    DetailsLoaded {
        place_id: String,
        result: Result<PlaceDetails, PlacesError>,
    },
    /// Device geolocation finished; `None` on failure.
    Located(Option<Coordinate>),
    /// Reverse geocoding of a picked map point; `None` when no address was found.
    Geocoded {
        at: Coordinate,
        address: Option<String>,
    },
    Suggestions {
        input: String,
        suggestions: Vec<AddressSuggestion>,
    },
    /// An autocomplete suggestion resolved to a coordinate and address.
    SuggestionResolved(Option<(Coordinate, String)>),
}

/// Multiplexes terminal input and ticks into a single event stream.
///
/// Holds an unbounded channel: the sender ([`tx`](EventHandler::tx)) can be
/// cloned and handed to spawned tasks, while the receiver is consumed by
/// [`next`](EventHandler::next) in the main loop.
pub struct EventHandler {
    /// Sender for posting events from spawned tasks.
    pub tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Creates a new event handler and spawns the input/tick task.
    ///
    /// The spawned task polls crossterm with a timeout of `tick_rate_ms`;
    /// key presses become [`Event::Input`] and each elapsed interval becomes
    /// [`Event::Tick`]. The task stops when the receiver is gone or the
    /// terminal can no longer be read.
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();

        tokio::spawn(async move {
            let tick_rate = Duration::from_millis(tick_rate_ms);
            let mut last_tick = Instant::now();
            loop {
                let timeout = tick_rate
                    .checked_sub(last_tick.elapsed())
                    .unwrap_or(Duration::from_secs(0));
                match event::poll(timeout) {
                    Ok(true) => match event::read() {
                        Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                            if event_tx.send(Event::Input(key)).is_err() {
                                break;
                            }
                        }
                        Ok(_) => {}
                        Err(e) => {
                            error!("Terminal read failed: {}", e);
                            break;
                        }
                    },
                    Ok(false) => {}
                    Err(e) => {
                        error!("Terminal poll failed: {}", e);
                        break;
                    }
                }
                if last_tick.elapsed() >= tick_rate {
                    if event_tx.send(Event::Tick).is_err() {
                        break;
                    }
                    last_tick = Instant::now();
                }
            }
        });

        Self { tx, rx }
    }

    /// Receives the next event from the channel.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}
