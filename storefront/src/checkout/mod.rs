//! Checkout flow.
//!
//! A reducer-driven state machine that walks a purchase through
//!
//! ```text
//! Browsing -> EventSelected -> CartBuilt -> PaymentFormOpen
//!          -> Validating -> Submitting -> ReceiptReady
//! ```
//!
//! Validation failures send the flow back to `PaymentFormOpen` with field
//! errors on the form. Rejected actions leave the state where it was and
//! record a [`CheckoutError`] in `last_error`.
//!
//! Payment processing is simulated: `Submit` returns a delayed
//! `CompleteSubmission`, which the runtime drops if the store is gone by the
//! time it fires.

mod actions;
mod environment;
mod form;
mod reducer;
mod state;

#[cfg(test)]
mod tests;

pub use actions::CheckoutAction;
pub use environment::{
    CheckoutEnvironment, DEFAULT_PROCESSING_DELAY, ORDER_NUMBER_LEN, OrderNumberGenerator,
    RandomOrderNumbers, SequentialOrderNumbers,
};
pub use form::{FieldErrors, PaymentField, PaymentForm, UnknownPaymentField, normalize};
pub use reducer::{CheckoutReducer, build_cart_item};
pub use state::{CheckoutError, CheckoutPhase, CheckoutState};
