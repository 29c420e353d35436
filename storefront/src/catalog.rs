//! The event catalog.
//!
//! A fixed, in-memory table of events built once at startup and shared as
//! `Arc<Catalog>`. Nothing mutates it afterwards; every query borrows from it
//! and preserves insertion order.

use crate::types::{Event, EventId};
use std::collections::HashSet;
use thiserror::Error;

/// Events shipped with the storefront
const SEED_EVENTS: &str = include_str!("../data/events.json");

/// Label the filter UI uses for "no restriction"
pub const ALL: &str = "All";

/// Facet options offered by the filter UI
///
/// These lists are curated rather than derived from the catalog, so they can
/// name values no event currently has.
pub mod facets {
    /// Category options
    pub const CATEGORIES: &[&str] = &[
        super::ALL,
        "Music",
        "Technology",
        "Food & Drinks",
        "Arts & Culture",
        "Sports",
        "Business",
        "Entertainment",
        "Health & Wellness",
    ];

    /// City options
    pub const CITIES: &[&str] = &[super::ALL, "Kigali", "Bujumbura"];

    /// Tag options
    pub const TAGS: &[&str] = &[
        super::ALL,
        "Festival",
        "Outdoor",
        "Family",
        "Charity",
        "Live Music",
        "Networking",
        "Exhibition",
        "Workshop",
        "Performance",
        "Cultural",
        "Food",
    ];

    /// Duration options
    pub const DURATIONS: &[&str] = &[
        super::ALL,
        "1 day",
        "2 days",
        "3 days",
        "1 week",
        "2 weeks",
        "1 month",
    ];
}

/// Catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No event has this id
    #[error("event {0} not found")]
    NotFound(EventId),

    /// Two events share an id
    #[error("duplicate event id {0}")]
    DuplicateId(EventId),

    /// An event record is inconsistent
    #[error("invalid event {id}: {reason}")]
    InvalidEvent {
        /// Offending event
        id: EventId,
        /// What is wrong with it
        reason: String,
    },

    /// The seed data could not be parsed
    #[error("malformed catalog data: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Immutable table of events
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    events: Vec<Event>,
}

impl Catalog {
    /// Builds a catalog, rejecting duplicate ids and inconsistent records
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateId`] or [`CatalogError::InvalidEvent`].
    pub fn new(events: Vec<Event>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(events.len());
        for event in &events {
            if !seen.insert(&event.id) {
                return Err(CatalogError::DuplicateId(event.id.clone()));
            }
            if event.title.trim().is_empty() {
                return Err(CatalogError::InvalidEvent {
                    id: event.id.clone(),
                    reason: "title is empty".to_string(),
                });
            }
            if event.end_date < event.start_date {
                return Err(CatalogError::InvalidEvent {
                    id: event.id.clone(),
                    reason: format!(
                        "ends on {} before it starts on {}",
                        event.end_date, event.start_date
                    ),
                });
            }
        }

        tracing::debug!(events = events.len(), "Catalog loaded");
        Ok(Self { events })
    }

    /// Parses a JSON array of events
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Malformed`] for invalid JSON, or any error of
    /// [`Catalog::new`].
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Self::new(serde_json::from_str(json)?)
    }

    /// The built-in Kigali events
    ///
    /// # Errors
    ///
    /// Fails only if the bundled data is corrupt.
    pub fn seeded() -> Result<Self, CatalogError> {
        Self::from_json(SEED_EVENTS)
    }

    /// All events in insertion order
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of events
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the catalog has no events
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Looks up an event by id
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] for unknown ids.
    pub fn get(&self, id: &EventId) -> Result<&Event, CatalogError> {
        self.find(id)
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }

    /// Looks up an event by id
    #[must_use]
    pub fn find(&self, id: &EventId) -> Option<&Event> {
        self.events.iter().find(|event| &event.id == id)
    }

    /// Events in `category`; [`ALL`] returns every event
    #[must_use]
    pub fn by_category(&self, category: &str) -> Vec<&Event> {
        self.matching(category, |event| event.category == category)
    }

    /// Events in `city`; [`ALL`] returns every event
    #[must_use]
    pub fn by_city(&self, city: &str) -> Vec<&Event> {
        self.matching(city, |event| event.location.city == city)
    }

    /// Events tagged `tag`; [`ALL`] returns every event
    #[must_use]
    pub fn by_tag(&self, tag: &str) -> Vec<&Event> {
        self.matching(tag, |event| event.has_tag(tag))
    }

    /// Events with duration label `duration`; [`ALL`] returns every event
    #[must_use]
    pub fn by_duration(&self, duration: &str) -> Vec<&Event> {
        self.matching(duration, |event| event.duration == duration)
    }

    /// Featured events
    #[must_use]
    pub fn featured(&self) -> Vec<&Event> {
        self.events.iter().filter(|event| event.featured).collect()
    }

    /// The first `limit` featured events
    #[must_use]
    pub fn featured_limited(&self, limit: usize) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|event| event.featured)
            .take(limit)
            .collect()
    }

    fn matching<F>(&self, label: &str, predicate: F) -> Vec<&Event>
    where
        F: Fn(&Event) -> bool,
    {
        if label == ALL {
            return self.events.iter().collect();
        }
        self.events.iter().filter(|event| predicate(event)).collect()
    }
}
