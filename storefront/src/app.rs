//! Storefront facade.
//!
//! Wires the catalog and configuration into ready-to-use stores for the
//! browse and checkout views.

use crate::browse::{BrowseAction, BrowseEnvironment, BrowseReducer, BrowseState};
use crate::catalog::{Catalog, CatalogError};
use crate::checkout::{
    CheckoutAction, CheckoutEnvironment, CheckoutReducer, CheckoutState, RandomOrderNumbers,
};
use crate::config::Config;
use crate::filter::{self, FilterSpec};
use crate::navigation::Presenter;
use crate::types::{Event, EventId};
use checkout_core::environment::SystemClock;
use checkout_runtime::Store;
use std::sync::Arc;

/// Store driving the browse view
pub type BrowseStore = Store<BrowseState, BrowseAction, BrowseEnvironment, BrowseReducer>;

/// Store driving the checkout flow
pub type CheckoutStore = Store<CheckoutState, CheckoutAction, CheckoutEnvironment, CheckoutReducer>;

/// Entry point for the presentation layer
#[derive(Debug, Clone)]
pub struct Storefront {
    catalog: Arc<Catalog>,
    config: Config,
}

impl Storefront {
    /// Storefront over `catalog`
    #[must_use]
    pub fn new(catalog: Catalog, config: Config) -> Self {
        Self {
            catalog: Arc::new(catalog),
            config,
        }
    }

    /// Storefront over the built-in events
    ///
    /// # Errors
    ///
    /// Fails only if the bundled catalog data is corrupt.
    pub fn seeded(config: Config) -> Result<Self, CatalogError> {
        Ok(Self::new(Catalog::seeded()?, config))
    }

    /// Shared catalog
    #[must_use]
    pub const fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Events matching `spec`, in catalog order
    #[must_use]
    pub fn list_events(&self, spec: &FilterSpec) -> Vec<&Event> {
        filter::apply(&self.catalog, spec)
    }

    /// One event
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] for unknown ids.
    pub fn get_event(&self, id: &EventId) -> Result<&Event, CatalogError> {
        self.catalog.get(id)
    }

    /// Featured events for the home page
    #[must_use]
    pub fn featured(&self) -> Vec<&Event> {
        self.catalog
            .featured_limited(self.config.browse.featured_limit)
    }

    /// Filter the browse view starts with
    #[must_use]
    pub fn initial_filter(&self) -> FilterSpec {
        FilterSpec {
            price_range: Some(self.config.price_range()),
            ..FilterSpec::unfiltered()
        }
    }

    /// Store for the browse view
    #[must_use]
    pub fn browse_store(&self) -> BrowseStore {
        Store::with_broadcast_capacity(
            BrowseState::with_spec(&self.catalog, self.initial_filter()),
            BrowseReducer::new(),
            BrowseEnvironment::new(Arc::clone(&self.catalog)),
            self.config.runtime.broadcast_capacity,
        )
    }

    /// Production checkout environment reporting to `presenter`
    #[must_use]
    pub fn checkout_environment(&self, presenter: Arc<dyn Presenter>) -> CheckoutEnvironment {
        CheckoutEnvironment::new(
            Arc::clone(&self.catalog),
            Arc::new(SystemClock),
            Arc::new(RandomOrderNumbers),
            presenter,
        )
        .with_processing_delay(self.config.processing_delay())
    }

    /// Store for the checkout flow reporting to `presenter`
    #[must_use]
    pub fn checkout_store(&self, presenter: Arc<dyn Presenter>) -> CheckoutStore {
        self.checkout_store_with(self.checkout_environment(presenter))
    }

    /// Store for the checkout flow with a custom environment
    #[must_use]
    pub fn checkout_store_with(&self, environment: CheckoutEnvironment) -> CheckoutStore {
        Store::with_broadcast_capacity(
            CheckoutState::new(),
            CheckoutReducer::new(),
            environment,
            self.config.runtime.broadcast_capacity,
        )
    }
}
