//! Event Storefront - event discovery and simulated ticket checkout
//!
//! Browse a fixed catalog of events in Kigali, narrow it with filters, pick
//! an event and a ticket count, fill in a payment form and get a receipt.
//! Payment is simulated; nothing leaves the process.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐    ┌───────────────┐    ┌───────────────────┐
//! │ Catalog  │───▶│ Filter engine │───▶│  BrowseReducer    │──▶ browse view
//! └──────────┘    └───────────────┘    └───────────────────┘
//!       │
//!       │         ┌───────────────────┐   Route / Notification
//!       └────────▶│  CheckoutReducer  │──────────────────────▶ Presenter
//!                 └───────────────────┘
//!                    ▲            │ Effect::Delay
//!                    └────────────┘ CompleteSubmission
//! ```
//!
//! Both reducers run inside a `checkout_runtime::Store`. The checkout
//! reducer talks to the presentation layer only through typed
//! [`navigation::Route`] payloads, which are validated when a view opens.
//!
//! # Usage
//!
//! See [`app::Storefront`] for wiring, and the `demo` binary for a scripted
//! purchase.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod app;
pub mod browse;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod filter;
pub mod navigation;
pub mod types;

pub use app::{BrowseStore, CheckoutStore, Storefront};
pub use browse::{BrowseAction, BrowseReducer, BrowseState};
pub use catalog::{Catalog, CatalogError};
pub use checkout::{CheckoutAction, CheckoutError, CheckoutPhase, CheckoutReducer, CheckoutState};
pub use config::Config;
pub use filter::{FilterSpec, PriceRange};
pub use navigation::{Presenter, Route, Router, UiEvent};
pub use types::*;
