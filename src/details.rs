//! Expand/collapse state and the session cache for place details.
//!
//! Details are fetched lazily the first time a row is expanded. A
//! successful fetch is cached for the rest of the session and never
//! refetched; a failed fetch leaves no cache entry, so the next expand
//! tries again.

use crate::api::{DetailField, PlacesError};
use crate::models::{PlaceDetails, Review};
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

pub const DETAIL_FIELDS: [DetailField; 6] = [
    DetailField::Reviews,
    DetailField::Photos,
    DetailField::FormattedPhoneNumber,
    DetailField::Website,
    DetailField::OpeningHours,
    DetailField::UtcOffset,
];

/// A fetch the caller has to issue on the loader's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailFetch {
    pub place_id: String,
}

/// What the list view should draw under a row.
#[derive(Debug, PartialEq)]
pub enum DetailView<'a> {
    Collapsed,
    Loading,
    Loaded(&'a PlaceDetails),
    Failed,
}

pub struct DetailLoader {
    local_language: String,
    expanded: Option<String>,
    // Unbounded: entries live for the session.
    cache: HashMap<String, PlaceDetails>,
    in_flight: HashSet<String>,
    failed: HashSet<String>,
}

impl DetailLoader {
    pub fn new(local_language: impl Into<String>) -> Self {
        Self {
            local_language: local_language.into(),
            expanded: None,
            cache: HashMap::new(),
            in_flight: HashSet::new(),
            failed: HashSet::new(),
        }
    }

    /// Collapses `place_id` if it is expanded, otherwise expands it (and
    /// collapses whatever else was open). Returns a fetch only when nothing
    /// is cached or already on its way for that place.
    pub fn toggle(&mut self, place_id: &str) -> Option<DetailFetch> {
        if self.expanded.as_deref() == Some(place_id) {
            self.expanded = None;
            return None;
        }

        self.expanded = Some(place_id.to_string());
        if self.cache.contains_key(place_id) || self.in_flight.contains(place_id) {
            return None;
        }

        self.failed.remove(place_id);
        self.in_flight.insert(place_id.to_string());
        Some(DetailFetch {
            place_id: place_id.to_string(),
        })
    }

    pub fn complete(&mut self, place_id: &str, result: Result<PlaceDetails, PlacesError>) {
        self.in_flight.remove(place_id);
        match result {
            Ok(mut details) => {
                details.reviews = local_first(details.reviews, &self.local_language);
                info!("Loaded details for {}", place_id);
                self.failed.remove(place_id);
                self.cache.insert(place_id.to_string(), details);
            }
            Err(e) => {
                warn!("Could not load details for {}: {}", place_id, e);
                self.failed.insert(place_id.to_string());
            }
        }
    }

    pub fn view(&self, place_id: &str) -> DetailView<'_> {
        if self.expanded.as_deref() != Some(place_id) {
            return DetailView::Collapsed;
        }
        if let Some(details) = self.cache.get(place_id) {
            DetailView::Loaded(details)
        } else if self.failed.contains(place_id) {
            DetailView::Failed
        } else {
            DetailView::Loading
        }
    }

    /// Cached details regardless of panel state.
    pub fn cached(&self, place_id: &str) -> Option<&PlaceDetails> {
        self.cache.get(place_id)
    }

    pub fn expanded(&self) -> Option<&str> {
        self.expanded.as_deref()
    }

    pub fn collapse(&mut self) {
        self.expanded = None;
    }
}

fn is_local(language: Option<&str>, local: &str) -> bool {
    let Some(lang) = language else {
        return false;
    };
    let primary = local.split('-').next().unwrap_or(local);
    lang.eq_ignore_ascii_case(local) || lang.eq_ignore_ascii_case(primary)
}

/// Stable partition: local-language reviews first, each group keeps its order.
pub fn local_first(reviews: Vec<Review>, local: &str) -> Vec<Review> {
    let (mut front, back): (Vec<_>, Vec<_>) = reviews
        .into_iter()
        .partition(|r| is_local(r.language.as_deref(), local));
    front.extend(back);
    front
}
