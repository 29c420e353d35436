//! Browse view reducer.
//!
//! Owns the current [`FilterSpec`] and the ids of the events it selects.
//! Every filter change recomputes the visible list synchronously; the
//! catalog is small and static, so nothing is cached between changes.

use crate::catalog::Catalog;
use crate::filter::{self, FilterSpec, PriceRange};
use crate::types::{Event, EventId};
use checkout_core::{SmallVec, effect::Effect, reducer::Reducer};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================================================
// Actions
// ============================================================================

/// Filter changes coming from the browse view
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrowseAction {
    /// Category dropdown changed (`"All"` clears it)
    SetCategory {
        /// Option label
        label: String,
    },
    /// City dropdown changed (`"All"` clears it)
    SetCity {
        /// Option label
        label: String,
    },
    /// Duration dropdown changed (`"All"` clears it)
    SetDuration {
        /// Option label
        label: String,
    },
    /// A tag was picked (`"All"` clears every tag)
    AddTag {
        /// Option label
        label: String,
    },
    /// A tag chip was dismissed
    RemoveTag {
        /// Tag to drop
        tag: String,
    },
    /// Price slider moved
    SetPriceRange {
        /// Lower slider position
        low: u64,
        /// Upper slider position
        high: u64,
    },
    /// Replace the whole spec at once
    ApplySpec {
        /// New spec
        spec: FilterSpec,
    },
    /// Back to the default spec
    Reset,
}

// ============================================================================
// State
// ============================================================================

/// Browse view state
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseState {
    /// Current criteria
    pub spec: FilterSpec,
    /// Events selected by `spec`, in catalog order
    pub visible: Vec<EventId>,
}

impl BrowseState {
    /// Initial state: the default spec applied to `catalog`
    #[must_use]
    pub fn new(catalog: &Catalog) -> Self {
        Self::with_spec(catalog, FilterSpec::default())
    }

    /// Initial state with `spec` already applied
    #[must_use]
    pub fn with_spec(catalog: &Catalog, spec: FilterSpec) -> Self {
        let visible = visible_ids(catalog, &spec);
        Self { spec, visible }
    }

    /// Resolve the visible ids against `catalog`
    #[must_use]
    pub fn visible_events<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Event> {
        self.visible
            .iter()
            .filter_map(|id| catalog.find(id))
            .collect()
    }
}

fn visible_ids(catalog: &Catalog, spec: &FilterSpec) -> Vec<EventId> {
    filter::apply(catalog, spec)
        .into_iter()
        .map(|event| event.id.clone())
        .collect()
}

// ============================================================================
// Environment
// ============================================================================

/// Dependencies of the browse reducer
#[derive(Clone)]
pub struct BrowseEnvironment {
    /// Catalog being browsed
    pub catalog: Arc<Catalog>,
}

impl BrowseEnvironment {
    /// Creates a new `BrowseEnvironment`
    #[must_use]
    pub const fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for the browse view
#[derive(Clone, Debug, Default)]
pub struct BrowseReducer;

impl BrowseReducer {
    /// Creates a new `BrowseReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn update_spec(spec: &mut FilterSpec, action: BrowseAction) {
        match action {
            BrowseAction::SetCategory { label } => spec.category = filter::selection(&label),
            BrowseAction::SetCity { label } => spec.city = filter::selection(&label),
            BrowseAction::SetDuration { label } => spec.duration = filter::selection(&label),
            BrowseAction::AddTag { label } => match filter::selection(&label) {
                Some(tag) => {
                    spec.tags.insert(tag);
                },
                None => spec.tags.clear(),
            },
            BrowseAction::RemoveTag { tag } => {
                spec.tags.remove(&tag);
            },
            BrowseAction::SetPriceRange { low, high } => {
                spec.price_range = Some(PriceRange::from_slider(low, high));
            },
            BrowseAction::ApplySpec { spec: new_spec } => *spec = new_spec,
            BrowseAction::Reset => *spec = FilterSpec::default(),
        }
    }
}

impl Reducer for BrowseReducer {
    type State = BrowseState;
    type Action = BrowseAction;
    type Environment = BrowseEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        Self::update_spec(&mut state.spec, action);
        state.visible = visible_ids(&env.catalog, &state.spec);

        tracing::debug!(
            visible = state.visible.len(),
            category = ?state.spec.category,
            city = ?state.spec.city,
            duration = ?state.spec.duration,
            tags = state.spec.tags.len(),
            "Filters applied"
        );

        SmallVec::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use checkout_testing::{ReducerTest, assertions};

    fn env() -> BrowseEnvironment {
        BrowseEnvironment::new(Arc::new(Catalog::seeded().unwrap()))
    }

    fn initial() -> BrowseState {
        BrowseState::new(&env().catalog)
    }

    fn ids(state: &BrowseState) -> Vec<&str> {
        state.visible.iter().map(EventId::as_str).collect()
    }

    #[test]
    fn initial_state_shows_the_whole_catalog() {
        let state = initial();
        assert_eq!(state.visible.len(), 8);
        assert_eq!(state.spec, FilterSpec::default());
    }

    #[test]
    fn category_narrows_the_list() {
        ReducerTest::new(BrowseReducer::new())
            .with_env(env())
            .given_state(initial())
            .when_action(BrowseAction::SetCategory {
                label: "Sports".to_string(),
            })
            .then_state(|state| assert_eq!(ids(state), ["evt-005"]))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn all_label_clears_a_criterion() {
        ReducerTest::new(BrowseReducer::new())
            .with_env(env())
            .given_state(initial())
            .given_actions(vec![BrowseAction::SetCategory {
                label: "Sports".to_string(),
            }])
            .when_action(BrowseAction::SetCategory {
                label: "All".to_string(),
            })
            .then_state(|state| {
                assert!(state.spec.category.is_none());
                assert_eq!(state.visible.len(), 8);
            })
            .run();
    }

    #[test]
    fn tags_accumulate_without_duplicates() {
        ReducerTest::new(BrowseReducer::new())
            .with_env(env())
            .given_state(initial())
            .given_actions(vec![
                BrowseAction::AddTag {
                    label: "Festival".to_string(),
                },
                BrowseAction::AddTag {
                    label: "Festival".to_string(),
                },
            ])
            .when_action(BrowseAction::AddTag {
                label: "Charity".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state.spec.tags.len(), 2);
                assert_eq!(ids(state), ["evt-001", "evt-003", "evt-005"]);
            })
            .run();
    }

    #[test]
    fn removing_the_last_tag_restores_the_list() {
        ReducerTest::new(BrowseReducer::new())
            .with_env(env())
            .given_state(initial())
            .given_actions(vec![BrowseAction::AddTag {
                label: "Charity".to_string(),
            }])
            .when_action(BrowseAction::RemoveTag {
                tag: "Charity".to_string(),
            })
            .then_state(|state| assert_eq!(state.visible.len(), 8))
            .run();
    }

    #[test]
    fn all_tag_clears_every_tag() {
        ReducerTest::new(BrowseReducer::new())
            .with_env(env())
            .given_state(initial())
            .given_actions(vec![BrowseAction::AddTag {
                label: "Charity".to_string(),
            }])
            .when_action(BrowseAction::AddTag {
                label: "All".to_string(),
            })
            .then_state(|state| assert!(state.spec.tags.is_empty()))
            .run();
    }

    #[test]
    fn price_slider_filters_by_price() {
        ReducerTest::new(BrowseReducer::new())
            .with_env(env())
            .given_state(initial())
            .when_action(BrowseAction::SetPriceRange {
                low: 100_000,
                high: 150_000,
            })
            .then_state(|state| assert_eq!(ids(state), ["evt-002", "evt-006", "evt-008"]))
            .run();
    }

    #[test]
    fn reset_restores_defaults() {
        ReducerTest::new(BrowseReducer::new())
            .with_env(env())
            .given_state(initial())
            .given_actions(vec![
                BrowseAction::SetCity {
                    label: "Bujumbura".to_string(),
                },
                BrowseAction::SetDuration {
                    label: "1 week".to_string(),
                },
            ])
            .when_action(BrowseAction::Reset)
            .then_state(|state| {
                assert_eq!(state.spec, FilterSpec::default());
                assert_eq!(state.visible.len(), 8);
            })
            .run();
    }

    #[test]
    fn visible_events_resolve_against_the_catalog() {
        let env = env();
        let state = initial();
        let events = state.visible_events(&env.catalog);
        assert_eq!(events[0].title, "Kigali Jazz Festival");
    }
}
