use crate::catalog::FoodOption;
use crate::config::Config;
use crate::details::{DetailFetch, DetailLoader};
use crate::events::Event;
use crate::geo::{rank_by_distance, Coordinate, RankedPlace};
use crate::location::CURRENT_LOCATION_LABEL;
use crate::models::{AddressSuggestion, PlaceResult, UserLocation};
use crate::search::{NearbyRequest, RADIUS_OPTIONS};
use crate::selector::SelectorRun;
use crate::store::LocationStore;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{info, warn};

/// Degrees the map cursor moves per key press (roughly 100 m).
pub const CURSOR_STEP: f64 = 0.001;

/// Work the app wants done outside the main loop. Drained by
/// [`crate::runtime::dispatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Search { seq: u64, request: NearbyRequest },
    FetchDetails(DetailFetch),
    Geolocate,
    ReverseGeocode(Coordinate),
    Autocomplete(String),
    ResolveSuggestion(AddressSuggestion),
    StartDraw { run: u64 },
}

#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub enum ViewMode {
    #[default]
    List,
    Map,
}

#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub enum ModalFocus {
    #[default]
    CurrentLocation,
    Address,
    Map,
}

impl ModalFocus {
    fn next(self) -> Self {
        match self {
            ModalFocus::CurrentLocation => ModalFocus::Address,
            ModalFocus::Address => ModalFocus::Map,
            ModalFocus::Map => ModalFocus::CurrentLocation,
        }
    }
}

/// State of the location picker.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationModal {
    pub focus: ModalFocus,
    pub input: String,
    pub suggestions: Vec<AddressSuggestion>,
    pub suggestion_index: usize,
    pub cursor: Coordinate,
    pub busy: bool,
}

impl LocationModal {
    fn new(cursor: Coordinate) -> Self {
        Self {
            focus: ModalFocus::default(),
            input: String::new(),
            suggestions: Vec::new(),
            suggestion_index: 0,
            cursor,
            busy: false,
        }
    }
}

pub struct App {
    pub config: Config,
    store: LocationStore,
    pub client_ready: bool,
    pub view_mode: ViewMode,
    pub radius: u32,

    // Food draw
    pub display_food: Option<&'static FoodOption>,
    pub selected_food: Option<&'static FoodOption>,
    active_run: Option<u64>,
    draw: Option<SelectorRun>,
    next_run_id: u64,

    // Search results
    pub places: Vec<PlaceResult>,
    pub ranked: Vec<RankedPlace>,
    pub is_searching: bool,
    search_seq: u64,
    pub details: DetailLoader,
    pub selected_index: usize,

    pub modal: Option<LocationModal>,
    pub status_message: Option<String>,
    pub tick_count: usize,
    pub should_quit: bool,
    commands: Vec<Command>,
}

impl App {
    /// Builds the app around an already restored store. The location picker
    /// opens immediately when nothing usable was stored.
    pub fn new(config: Config, store: LocationStore, client_ready: bool) -> Self {
        let radius = if RADIUS_OPTIONS.contains(&config.search.radius_meters) {
            config.search.radius_meters
        } else {
            warn!(
                "Radius {}m is not one of the offered choices; using {}m",
                config.search.radius_meters, RADIUS_OPTIONS[0]
            );
            RADIUS_OPTIONS[0]
        };

        let mut app = Self {
            details: DetailLoader::new(config.search.language.clone()),
            config,
            store,
            client_ready,
            view_mode: ViewMode::List,
            radius,
            display_food: None,
            selected_food: None,
            active_run: None,
            draw: None,
            next_run_id: 0,
            places: Vec::new(),
            ranked: Vec::new(),
            is_searching: false,
            search_seq: 0,
            selected_index: 0,
            modal: None,
            status_message: None,
            tick_count: 0,
            should_quit: false,
            commands: Vec::new(),
        };

        if app.location().is_none() {
            app.open_modal();
            if app.config.location.auto_locate {
                app.request_geolocation();
            }
        }
        app
    }

    pub fn location(&self) -> Option<&UserLocation> {
        self.store.get()
    }

    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    pub fn is_drawing(&self) -> bool {
        self.active_run.is_some()
    }

    pub fn fallback_center(&self) -> Coordinate {
        Coordinate::new(self.config.location.fallback_lat, self.config.location.fallback_lng)
    }

    pub fn on_tick(&mut self) {
        self.tick_count += 1;
    }

    /// Overwrites the active location and re-runs the search if one is possible.
    pub fn set_location(&mut self, at: Coordinate, address: Option<&str>) {
        if let Err(e) = self.store.set(at.lat, at.lng, address) {
            warn!("Could not persist location: {}", e);
        }
        if let Some(modal) = self.modal.as_mut() {
            modal.cursor = at;
            modal.busy = false;
        }
        self.rerank();
        self.request_search();
    }

    pub fn set_radius(&mut self, meters: u32) {
        if self.radius == meters {
            return;
        }
        self.radius = meters;
        info!("Search radius set to {}m", meters);
        self.request_search();
    }

    fn cycle_radius(&mut self, forward: bool) {
        let idx = RADIUS_OPTIONS.iter().position(|r| *r == self.radius).unwrap_or(0);
        let len = RADIUS_OPTIONS.len();
        let next = if forward { (idx + 1) % len } else { (idx + len - 1) % len };
        self.set_radius(RADIUS_OPTIONS[next]);
    }

    /// Starts a food draw, or asks for a location first.
    pub fn run_draw(&mut self) {
        if self.location().is_none() {
            self.open_modal();
            return;
        }
        if self.is_drawing() {
            return;
        }
        self.next_run_id += 1;
        self.active_run = Some(self.next_run_id);
        self.commands.push(Command::StartDraw { run: self.next_run_id });
    }

    /// Hands the app the task driving the current draw so dropping the app
    /// (or starting over) stops it.
    pub fn attach_run(&mut self, run: SelectorRun) {
        if self.active_run == Some(run.id()) {
            self.draw = Some(run);
        }
    }

    pub fn cancel_draw(&mut self) {
        if let Some(run) = self.draw.take() {
            run.cancel();
        }
        self.active_run = None;
    }

    fn request_search(&mut self) {
        let center = self.location().map(UserLocation::coordinate);
        let keyword = self.selected_food.map(|f| f.query);
        if let Some(request) = NearbyRequest::prepare(self.client_ready, center, self.radius, keyword) {
            self.search_seq += 1;
            self.is_searching = true;
            self.commands.push(Command::Search {
                seq: self.search_seq,
                request,
            });
        }
    }

    fn request_geolocation(&mut self) {
        if let Some(modal) = self.modal.as_mut() {
            modal.busy = true;
        }
        self.commands.push(Command::Geolocate);
    }

    /// Re-sorts for the current location. The cursor follows the place it
    /// was on, not the row number.
    fn rerank(&mut self) {
        let selected = self.ranked.get(self.selected_index).map(|r| r.place.place_id.clone());
        self.ranked = match self.location() {
            Some(loc) => rank_by_distance(loc.coordinate(), &self.places),
            None => self
                .places
                .iter()
                .cloned()
                .map(|place| RankedPlace { place, distance: 0.0 })
                .collect(),
        };
        self.selected_index = selected
            .and_then(|id| self.ranked.iter().position(|r| r.place.place_id == id))
            .unwrap_or(0);
    }

    pub fn open_modal(&mut self) {
        if self.modal.is_none() {
            let cursor = self
                .location()
                .map(UserLocation::coordinate)
                .unwrap_or_else(|| self.fallback_center());
            self.modal = Some(LocationModal::new(cursor));
        }
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
    }

    /// Expands or collapses the selected row, fetching details when needed.
    pub fn toggle_selected(&mut self) {
        let Some(place_id) = self.ranked.get(self.selected_index).map(|r| r.place.place_id.clone()) else {
            return;
        };
        if let Some(fetch) = self.details.toggle(&place_id) {
            if self.client_ready {
                self.commands.push(Command::FetchDetails(fetch));
            } else {
                self.details.complete(&place_id, Err(crate::api::PlacesError::Empty));
            }
        }
    }

    pub fn on_event(&mut self, event: Event) {
        match event {
            Event::Tick => self.on_tick(),
            Event::Input(key) => self.handle_key(key),
            Event::FoodDraw { run, option, committed } => {
                if self.active_run != Some(run) {
                    return;
                }
                self.display_food = Some(option);
                if committed {
                    info!("Selected '{}'", option.query);
                    self.selected_food = Some(option);
                    self.active_run = None;
                    self.draw = None;
                    self.request_search();
                }
            }
            Event::PlacesFound { seq, places } => {
                if seq != self.search_seq {
                    return;
                }
                self.is_searching = false;
                self.places = places;
                self.ranked.clear();
                self.selected_index = 0;
                self.details.collapse();
                self.rerank();
            }
            Event::DetailsLoaded { place_id, result } => self.details.complete(&place_id, result),
            Event::Located(Some(at)) => self.set_location(at, Some(CURRENT_LOCATION_LABEL)),
            Event::Located(None) => {
                if let Some(modal) = self.modal.as_mut() {
                    modal.busy = false;
                }
                self.status_message = Some("Could not determine your location".to_string());
            }
            Event::Geocoded { at, address } => self.set_location(at, address.as_deref()),
            Event::Suggestions { input, suggestions } => {
                if let Some(modal) = self.modal.as_mut() {
                    modal.busy = false;
                    // Replies for text the user has since edited are stale.
                    if modal.input.trim() == input {
                        modal.suggestions = suggestions;
                        modal.suggestion_index = 0;
                    }
                }
            }
            Event::SuggestionResolved(Some((at, address))) => self.set_location(at, Some(&address)),
            Event::SuggestionResolved(None) => {
                if let Some(modal) = self.modal.as_mut() {
                    modal.busy = false;
                }
                self.status_message = Some("Could not resolve that address".to_string());
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit();
            return;
        }
        if self.modal.is_some() {
            self.handle_modal_key(key);
            return;
        }

        self.status_message = None;
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit(),
            KeyCode::Char('r') | KeyCode::Char(' ') => self.run_draw(),
            KeyCode::Char('l') => self.open_modal(),
            KeyCode::Char('m') | KeyCode::Tab => {
                self.view_mode = match self.view_mode {
                    ViewMode::List => ViewMode::Map,
                    ViewMode::Map => ViewMode::List,
                }
            }
            KeyCode::Char('+') | KeyCode::Char(']') => self.cycle_radius(true),
            KeyCode::Char('-') | KeyCode::Char('[') => self.cycle_radius(false),
            KeyCode::Enter => self.toggle_selected(),
            KeyCode::Down | KeyCode::Char('j') => {
                if !self.ranked.is_empty() {
                    self.selected_index = (self.selected_index + 1) % self.ranked.len();
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if !self.ranked.is_empty() {
                    self.selected_index = self
                        .selected_index
                        .checked_sub(1)
                        .unwrap_or(self.ranked.len() - 1);
                }
            }
            _ => {}
        }
    }

    fn handle_modal_key(&mut self, key: KeyEvent) {
        let has_location = self.location().is_some();
        let Some(modal) = self.modal.as_mut() else {
            return;
        };

        match (modal.focus, key.code) {
            (_, KeyCode::Esc) => self.close_modal(),
            (_, KeyCode::Tab) => modal.focus = modal.focus.next(),
            (ModalFocus::CurrentLocation, KeyCode::Enter) => self.request_geolocation(),
            (ModalFocus::Address, KeyCode::Char(c)) => {
                modal.input.push(c);
                modal.suggestions.clear();
            }
            (ModalFocus::Address, KeyCode::Backspace) => {
                modal.input.pop();
                modal.suggestions.clear();
            }
            (ModalFocus::Address, KeyCode::Down) => {
                if !modal.suggestions.is_empty() {
                    modal.suggestion_index = (modal.suggestion_index + 1) % modal.suggestions.len();
                }
            }
            (ModalFocus::Address, KeyCode::Up) => {
                if !modal.suggestions.is_empty() {
                    let len = modal.suggestions.len();
                    modal.suggestion_index = (modal.suggestion_index + len - 1) % len;
                }
            }
            (ModalFocus::Address, KeyCode::Enter) => {
                if let Some(choice) = modal.suggestions.get(modal.suggestion_index).cloned() {
                    modal.busy = true;
                    self.commands.push(Command::ResolveSuggestion(choice));
                } else if !modal.input.trim().is_empty() && self.client_ready {
                    modal.busy = true;
                    self.commands.push(Command::Autocomplete(modal.input.trim().to_string()));
                }
            }
            (ModalFocus::Map, KeyCode::Up | KeyCode::Char('k')) => modal.cursor.lat += CURSOR_STEP,
            (ModalFocus::Map, KeyCode::Down | KeyCode::Char('j')) => modal.cursor.lat -= CURSOR_STEP,
            (ModalFocus::Map, KeyCode::Left | KeyCode::Char('h')) => modal.cursor.lng -= CURSOR_STEP,
            (ModalFocus::Map, KeyCode::Right | KeyCode::Char('l')) => modal.cursor.lng += CURSOR_STEP,
            (ModalFocus::Map, KeyCode::Enter) => {
                let at = modal.cursor;
                if self.client_ready {
                    modal.busy = true;
                    self.commands.push(Command::ReverseGeocode(at));
                } else {
                    self.set_location(at, None);
                }
            }
            (ModalFocus::CurrentLocation | ModalFocus::Map, KeyCode::Char('c')) if has_location => {
                self.close_modal()
            }
            _ => {}
        }
    }

    pub fn quit(&mut self) {
        self.cancel_draw();
        self.should_quit = true;
    }
}
