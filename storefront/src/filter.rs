//! Filter engine.
//!
//! [`apply`] narrows the catalog to the events matching a [`FilterSpec`].
//! Every criterion that is set must hold (criteria are intersected), and the
//! result keeps catalog order. Unset criteria are no-ops, so a spec with
//! nothing set returns the whole catalog.

use crate::catalog::{ALL, Catalog};
use crate::types::{Event, Money};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Inclusive price bounds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    min: Money,
    max: Money,
}

impl PriceRange {
    /// Upper bound of the default range
    pub const DEFAULT_MAX: u64 = 200_000;

    /// Upper bound used when the slider is collapsed to `[0, 0]`
    pub const SLIDER_CEILING: u64 = 1_000_000;

    /// Creates a range, swapping reversed bounds
    #[must_use]
    pub fn new(min: Money, max: Money) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Range from raw slider positions
    ///
    /// A slider dragged down to `[0, 0]` means "any price" rather than
    /// "free events only".
    #[must_use]
    pub fn from_slider(low: u64, high: u64) -> Self {
        if low == 0 && high == 0 {
            return Self::new(Money::ZERO, Money::rwf(Self::SLIDER_CEILING));
        }
        Self::new(Money::rwf(low), Money::rwf(high))
    }

    /// Lower bound
    #[must_use]
    pub const fn min(&self) -> Money {
        self.min
    }

    /// Upper bound
    #[must_use]
    pub const fn max(&self) -> Money {
        self.max
    }

    /// Whether `price` lies within the bounds
    #[must_use]
    pub fn contains(&self, price: Money) -> bool {
        self.min <= price && price <= self.max
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self::new(Money::ZERO, Money::rwf(Self::DEFAULT_MAX))
    }
}

/// User-chosen narrowing criteria
///
/// `Default` matches the initial browse view: nothing selected and a price
/// range of `[0, 200000]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Exact category label
    pub category: Option<String>,
    /// Exact city
    pub city: Option<String>,
    /// Exact duration label
    pub duration: Option<String>,
    /// An event matches if it has ANY of these tags; empty means no tag filter
    pub tags: BTreeSet<String>,
    /// Inclusive price bounds
    pub price_range: Option<PriceRange>,
    /// Carried for the UI but never used for matching
    pub date: Option<NaiveDate>,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            price_range: Some(PriceRange::default()),
            ..Self::unfiltered()
        }
    }
}

impl FilterSpec {
    /// A spec with every criterion unset
    #[must_use]
    pub const fn unfiltered() -> Self {
        Self {
            category: None,
            city: None,
            duration: None,
            tags: BTreeSet::new(),
            price_range: None,
            date: None,
        }
    }

    /// Whether no criterion is set
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.category.is_none()
            && self.city.is_none()
            && self.duration.is_none()
            && self.tags.is_empty()
            && self.price_range.is_none()
    }

    /// Whether `event` satisfies every set criterion
    #[must_use]
    pub fn matches(&self, event: &Event) -> bool {
        self.category
            .as_deref()
            .is_none_or(|category| event.category == category)
            && self
                .city
                .as_deref()
                .is_none_or(|city| event.location.city == city)
            && (self.tags.is_empty() || self.tags.iter().any(|tag| event.has_tag(tag)))
            && self
                .duration
                .as_deref()
                .is_none_or(|duration| event.duration == duration)
            && self
                .price_range
                .is_none_or(|range| range.contains(event.price))
    }
}

/// Maps a UI option label onto an optional criterion
///
/// `"All"` and blank labels mean "no restriction".
#[must_use]
pub fn selection(label: &str) -> Option<String> {
    let label = label.trim();
    if label.is_empty() || label == ALL {
        None
    } else {
        Some(label.to_string())
    }
}

/// The events of `catalog` matching `spec`, in catalog order
#[must_use]
pub fn apply<'a>(catalog: &'a Catalog, spec: &FilterSpec) -> Vec<&'a Event> {
    catalog
        .events()
        .iter()
        .filter(|event| spec.matches(event))
        .collect()
}
