//! Navigation boundary between the core and the presentation layer.
//!
//! Views are addressed by [`Route`]. Routes that need state carry it as a
//! typed payload, and the payload is validated when the route is opened:
//! a payment or receipt route without valid state resolves to
//! [`Route::Browse`] instead.
//!
//! The core reaches the presentation layer only through [`Presenter`], whose
//! calls are fire-and-forget.

use crate::catalog::Catalog;
use crate::types::{CartItem, EventId, Money, Receipt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tokio::sync::mpsc;

/// Why a navigation payload was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum NavigationError {
    /// No cart items were passed
    #[error("cart is empty")]
    EmptyCart,

    /// A cart item has a zero quantity
    #[error("cart item for {event_id} has no tickets")]
    InvalidQuantity {
        /// Offending item
        event_id: EventId,
    },

    /// A cart item names an event missing from the catalog
    #[error("cart item for unknown event {event_id}")]
    UnknownEvent {
        /// Offending item
        event_id: EventId,
    },

    /// The cart asks for more tickets of an event than it has
    #[error("{requested} tickets requested for {event_id}, {available} available")]
    ExceedsAvailability {
        /// Offending item
        event_id: EventId,
        /// Tickets of this event across the cart
        requested: u32,
        /// Tickets the event has
        available: u32,
    },

    /// A cart item's unit price differs from the catalog price
    #[error("unit price {actual} for {event_id} differs from the catalog ({expected})")]
    PriceMismatch {
        /// Offending item
        event_id: EventId,
        /// Catalog price
        expected: Money,
        /// Price on the item
        actual: Money,
    },

    /// The total does not equal the sum of the item totals
    #[error("total {actual} does not match the items ({expected})")]
    TotalMismatch {
        /// Sum of item totals
        expected: Money,
        /// Total that was passed
        actual: Money,
    },
}

/// Navigation state of the payment view
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Items to pay for
    pub items: Vec<CartItem>,
    /// Amount to charge
    pub total_amount: Money,
}

impl PaymentRequest {
    /// Request for `items`, totalled from their prices
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let total_amount = items.iter().map(CartItem::total_price).sum();
        Self {
            items,
            total_amount,
        }
    }

    /// Checks the payload against `catalog` before the payment view accepts it
    ///
    /// Every item must name a catalog event at its catalog price. Each item
    /// needs at least one ticket, and the tickets per event may not exceed
    /// what the event has available.
    ///
    /// # Errors
    ///
    /// Returns the first [`NavigationError`] found.
    pub fn validate(&self, catalog: &Catalog) -> Result<(), NavigationError> {
        if self.items.is_empty() {
            return Err(NavigationError::EmptyCart);
        }
        let mut per_event: BTreeMap<&EventId, u32> = BTreeMap::new();
        for item in &self.items {
            let event_id = item.event_id.clone();
            if item.quantity == 0 {
                return Err(NavigationError::InvalidQuantity { event_id });
            }
            let Some(event) = catalog.find(&item.event_id) else {
                return Err(NavigationError::UnknownEvent { event_id });
            };
            let requested = per_event.entry(&item.event_id).or_default();
            *requested = requested.saturating_add(item.quantity);
            if *requested > event.tickets_available {
                return Err(NavigationError::ExceedsAvailability {
                    event_id,
                    requested: *requested,
                    available: event.tickets_available,
                });
            }
            if item.unit_price != event.price {
                return Err(NavigationError::PriceMismatch {
                    event_id,
                    expected: event.price,
                    actual: item.unit_price,
                });
            }
        }
        let expected: Money = self.items.iter().map(CartItem::total_price).sum();
        if expected != self.total_amount {
            return Err(NavigationError::TotalMismatch {
                expected,
                actual: self.total_amount,
            });
        }
        Ok(())
    }
}

/// Addressable views
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    /// Catalog listing with filters
    Browse,
    /// One event
    EventDetail(EventId),
    /// Payment form for a validated cart
    Payment(PaymentRequest),
    /// Receipt of a completed purchase
    Receipt(Receipt),
    /// Unknown event
    NotFound,
}

impl Route {
    /// URL-style path of the view
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Browse => "/".to_string(),
            Self::EventDetail(id) => format!("/event/{id}"),
            Self::Payment(_) => "/payment".to_string(),
            Self::Receipt(_) => "/receipt".to_string(),
            Self::NotFound => "/not-found".to_string(),
        }
    }
}

/// Resolves navigation requests into routes
pub struct Router;

impl Router {
    /// Event detail view, or the not-found view for unknown ids
    #[must_use]
    pub fn event_detail(catalog: &Catalog, id: &EventId) -> Route {
        if catalog.find(id).is_some() {
            Route::EventDetail(id.clone())
        } else {
            tracing::debug!(event_id = %id, "Unknown event requested");
            Route::NotFound
        }
    }

    /// Payment view, or browse when the request is missing or invalid
    #[must_use]
    pub fn payment(catalog: &Catalog, request: Option<PaymentRequest>) -> Route {
        match request {
            Some(request) => match request.validate(catalog) {
                Ok(()) => Route::Payment(request),
                Err(error) => {
                    tracing::warn!(%error, "Rejected payment navigation, redirecting to browse");
                    Route::Browse
                },
            },
            None => {
                tracing::debug!("Payment opened without a cart, redirecting to browse");
                Route::Browse
            },
        }
    }

    /// Receipt view, or browse when there is no receipt to show
    #[must_use]
    pub fn receipt(receipt: Option<Receipt>) -> Route {
        match receipt {
            Some(receipt) if !receipt.items.is_empty() => Route::Receipt(receipt),
            _ => {
                tracing::debug!("Receipt opened without a purchase, redirecting to browse");
                Route::Browse
            },
        }
    }
}

/// Transient message shown to the user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Headline
    pub title: String,
    /// Optional detail line
    pub description: Option<String>,
}

impl Notification {
    /// Notification with a headline only
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
        }
    }

    /// Adds a detail line
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Calls from the core into the presentation layer
///
/// Implementations must not block; the core never waits on them.
pub trait Presenter: Send + Sync {
    /// Show another view
    fn navigate(&self, route: Route);

    /// Show a transient notification
    fn notify(&self, notification: Notification);
}

/// Presenter that only logs
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingPresenter;

impl Presenter for TracingPresenter {
    fn navigate(&self, route: Route) {
        tracing::info!(path = %route.path(), "Navigate");
    }

    fn notify(&self, notification: Notification) {
        tracing::info!(
            title = %notification.title,
            description = ?notification.description,
            "Notify"
        );
    }
}

/// Presenter calls as values
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiEvent {
    /// [`Presenter::navigate`] was called
    Navigate(Route),
    /// [`Presenter::notify`] was called
    Notify(Notification),
}

/// Presenter that forwards every call over a channel
///
/// Calls made after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelPresenter {
    tx: mpsc::UnboundedSender<UiEvent>,
}

impl ChannelPresenter {
    /// Creates a presenter and the receiving end of its channel
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn forward(&self, event: UiEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("Presentation layer gone, dropping UI event");
        }
    }
}

impl Presenter for ChannelPresenter {
    fn navigate(&self, route: Route) {
        self.forward(UiEvent::Navigate(route));
    }

    fn notify(&self, notification: Notification) {
        self.forward(UiEvent::Notify(notification));
    }
}
