use super::form::PaymentForm;
use crate::navigation::{NavigationError, PaymentRequest};
use crate::types::{CartItem, EventId, Receipt};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Where the user is in the checkout flow
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckoutPhase {
    /// Nothing selected
    #[default]
    Browsing,
    /// Detail view of one event is open
    EventSelected,
    /// Cart item built, waiting for the payment view
    CartBuilt,
    /// Payment form accepting input
    PaymentFormOpen,
    /// Form being checked; never observed between actions
    Validating,
    /// Payment being processed
    Submitting,
    /// Purchase complete
    ReceiptReady,
}

impl fmt::Display for CheckoutPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Browsing => "browsing",
            Self::EventSelected => "event selected",
            Self::CartBuilt => "cart built",
            Self::PaymentFormOpen => "payment form open",
            Self::Validating => "validating",
            Self::Submitting => "submitting",
            Self::ReceiptReady => "receipt ready",
        };
        f.write_str(name)
    }
}

/// Rejected checkout actions
///
/// Recorded on [`CheckoutState::last_error`]; the flow stays where it was.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum CheckoutError {
    /// Unknown event id
    #[error("event {0} not found")]
    NotFound(EventId),

    /// Quantity outside `[1, tickets_available]`
    #[error("{requested} tickets requested, {available} available")]
    OutOfRange {
        /// Requested quantity
        requested: i64,
        /// Tickets left
        available: u32,
    },

    /// Quantity or purchase action without a selected event
    #[error("no event selected")]
    NoEventSelected,

    /// The payment view was handed an invalid cart
    #[error("invalid payment request: {0}")]
    InvalidPaymentRequest(#[from] NavigationError),

    /// Submit outside the payment form
    #[error("cannot submit while {0}")]
    NotSubmittable(CheckoutPhase),
}

/// State of the checkout flow
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutState {
    /// Current phase
    pub phase: CheckoutPhase,
    /// Event whose detail view is open
    pub selected: Option<EventId>,
    /// Tickets to buy for the selected event
    pub quantity: u32,
    /// Items built from the selection
    pub cart: Vec<CartItem>,
    /// Payload accepted by the payment view
    pub payment: Option<PaymentRequest>,
    /// Payment form
    pub form: PaymentForm,
    /// Issued receipt
    pub receipt: Option<Receipt>,
    /// Why the last action was rejected, if it was
    pub last_error: Option<CheckoutError>,
}

impl CheckoutState {
    /// Initial state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the purchase is complete
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == CheckoutPhase::ReceiptReady
    }
}
