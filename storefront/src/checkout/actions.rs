use super::form::PaymentField;
use crate::navigation::PaymentRequest;
use crate::types::{EventId, PaymentMethod};
use serde::{Deserialize, Serialize};

/// Actions of the checkout flow
///
/// Everything except [`CheckoutAction::CompleteSubmission`] comes from the
/// user; that one is fed back by the runtime once processing finishes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckoutAction {
    // ========== Event detail ==========
    /// Open an event's detail view
    SelectEvent {
        /// Event to show
        event_id: EventId,
    },

    /// Set the ticket count
    ///
    /// Signed so that out-of-range input from the view can be rejected here.
    SetQuantity {
        /// Requested count
        quantity: i64,
    },

    /// One more ticket
    IncrementQuantity,

    /// One ticket fewer
    DecrementQuantity,

    /// Put the selected tickets in the cart and head to payment
    ConfirmPurchase,

    // ========== Payment ==========
    /// The payment view was opened with this navigation payload
    OpenPaymentForm {
        /// Cart handed over by the detail view, if any
        request: Option<PaymentRequest>,
    },

    /// Choose how to pay
    SelectPaymentMethod {
        /// New method
        method: PaymentMethod,
    },

    /// A form field was edited
    UpdateField {
        /// Edited field
        field: PaymentField,
        /// Value as typed
        value: String,
    },

    /// Pay
    Submit,

    /// Processing finished
    CompleteSubmission,

    /// Abandon the flow and go back to browsing
    Reset,
}
