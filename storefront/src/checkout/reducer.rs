use super::actions::CheckoutAction;
use super::environment::CheckoutEnvironment;
use super::form::PaymentForm;
use super::state::{CheckoutError, CheckoutPhase, CheckoutState};
use crate::navigation::{Notification, PaymentRequest, Route, Router};
use crate::types::{CartItem, Event, EventId, Receipt};
use checkout_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use std::sync::Arc;

type Effects = SmallVec<[Effect<CheckoutAction>; 4]>;

/// Cart item for `quantity` tickets to `event`
#[must_use]
pub fn build_cart_item(event: &Event, quantity: u32) -> CartItem {
    CartItem {
        event_id: event.id.clone(),
        event_title: event.title.clone(),
        event_date: event.start_date,
        unit_price: event.price,
        quantity,
    }
}

/// Reducer for the checkout flow
#[derive(Clone, Debug, Default)]
pub struct CheckoutReducer;

impl CheckoutReducer {
    /// Creates a new `CheckoutReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn select_event(
        state: &mut CheckoutState,
        event_id: EventId,
        env: &CheckoutEnvironment,
    ) -> Effects {
        let route = Router::event_detail(&env.catalog, &event_id);
        if route == Route::NotFound {
            tracing::debug!(%event_id, "Selected unknown event");
            state.last_error = Some(CheckoutError::NotFound(event_id));
            return smallvec![navigate(env, route)];
        }

        tracing::debug!(%event_id, "Event selected");
        *state = CheckoutState {
            phase: CheckoutPhase::EventSelected,
            selected: Some(event_id),
            quantity: 1,
            ..CheckoutState::default()
        };
        smallvec![navigate(env, route)]
    }

    fn set_quantity(state: &mut CheckoutState, requested: i64, env: &CheckoutEnvironment) {
        let event = match Self::selected_event(state, env) {
            Ok(event) => event,
            Err(error) => {
                state.last_error = Some(error);
                return;
            },
        };

        match u32::try_from(requested) {
            Ok(quantity) if event.accepts_quantity(requested) => state.quantity = quantity,
            _ => {
                tracing::debug!(
                    requested,
                    available = event.tickets_available,
                    kept = state.quantity,
                    "Rejected quantity"
                );
                state.last_error = Some(CheckoutError::OutOfRange {
                    requested,
                    available: event.tickets_available,
                });
            },
        }
    }

    fn confirm_purchase(state: &mut CheckoutState, env: &CheckoutEnvironment) -> Effects {
        let event = match Self::selected_event(state, env) {
            Ok(event) => event,
            Err(error) => {
                state.last_error = Some(error);
                return SmallVec::new();
            },
        };
        if !event.accepts_quantity(i64::from(state.quantity)) {
            state.last_error = Some(CheckoutError::OutOfRange {
                requested: i64::from(state.quantity),
                available: event.tickets_available,
            });
            return SmallVec::new();
        }

        let item = build_cart_item(event, state.quantity);
        let notification = Notification::new("Tickets added to cart").with_description(format!(
            "{} ticket(s) for {}",
            item.quantity, item.event_title
        ));
        let route = Router::payment(
            &env.catalog,
            Some(PaymentRequest::from_items(vec![item.clone()])),
        );

        tracing::info!(
            event_id = %item.event_id,
            quantity = item.quantity,
            total = %item.total_price(),
            "Cart built"
        );
        state.cart = vec![item];
        state.phase = CheckoutPhase::CartBuilt;

        smallvec![Effect::chain(vec![
            notify(env, notification),
            navigate(env, route)
        ])]
    }

    fn open_payment_form(
        state: &mut CheckoutState,
        request: Option<PaymentRequest>,
        env: &CheckoutEnvironment,
    ) -> Effects {
        match Router::payment(&env.catalog, request.clone()) {
            Route::Payment(request) => {
                tracing::debug!(
                    items = request.items.len(),
                    total = %request.total_amount,
                    "Payment form opened"
                );
                state.cart.clone_from(&request.items);
                state.payment = Some(request);
                state.form = PaymentForm::default();
                state.receipt = None;
                state.phase = CheckoutPhase::PaymentFormOpen;
                SmallVec::new()
            },
            route => {
                *state = CheckoutState {
                    last_error: request
                        .and_then(|request| request.validate(&env.catalog).err())
                        .map(CheckoutError::from),
                    ..CheckoutState::default()
                };
                smallvec![navigate(env, route)]
            },
        }
    }

    fn submit(state: &mut CheckoutState, env: &CheckoutEnvironment) -> Effects {
        if state.phase != CheckoutPhase::PaymentFormOpen {
            tracing::warn!(phase = %state.phase, "Submit outside the payment form");
            state.last_error = Some(CheckoutError::NotSubmittable(state.phase));
            return SmallVec::new();
        }

        state.phase = CheckoutPhase::Validating;
        let errors = state.form.validate().len();
        if errors > 0 {
            tracing::debug!(errors, "Payment form invalid");
            state.phase = CheckoutPhase::PaymentFormOpen;
            return SmallVec::new();
        }

        let method = state.form.method();
        tracing::info!(method = %method, "Processing payment");
        state.phase = CheckoutPhase::Submitting;

        smallvec![
            notify(
                env,
                Notification::new(format!("Processing {} payment...", method.label()))
            ),
            Effect::delay(env.processing_delay, CheckoutAction::CompleteSubmission),
        ]
    }

    fn complete_submission(state: &mut CheckoutState, env: &CheckoutEnvironment) -> Effects {
        let Some(request) = state
            .payment
            .as_ref()
            .filter(|_| state.phase == CheckoutPhase::Submitting)
        else {
            tracing::debug!(phase = %state.phase, "Ignoring completion outside submission");
            return SmallVec::new();
        };

        let receipt = Receipt {
            order_number: env.order_numbers.next_order_number(),
            items: request.items.clone(),
            total_amount: request.total_amount,
            payment_method: state.form.describe(),
            purchased_at: env.clock.now(),
        };
        tracing::info!(
            order_number = %receipt.order_number,
            total = %receipt.total_amount,
            "Receipt issued"
        );

        state.receipt = Some(receipt.clone());
        state.phase = CheckoutPhase::ReceiptReady;
        smallvec![navigate(env, Router::receipt(Some(receipt)))]
    }

    fn selected_event<'a>(
        state: &CheckoutState,
        env: &'a CheckoutEnvironment,
    ) -> Result<&'a Event, CheckoutError> {
        if state.phase != CheckoutPhase::EventSelected {
            return Err(CheckoutError::NoEventSelected);
        }
        let id = state.selected.as_ref().ok_or(CheckoutError::NoEventSelected)?;
        env.catalog
            .find(id)
            .ok_or_else(|| CheckoutError::NotFound(id.clone()))
    }
}

impl Reducer for CheckoutReducer {
    type State = CheckoutState;
    type Action = CheckoutAction;
    type Environment = CheckoutEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        state.last_error = None;

        // Processing cannot be cancelled; only its completion is accepted.
        if state.phase == CheckoutPhase::Submitting
            && !matches!(action, CheckoutAction::CompleteSubmission)
        {
            tracing::debug!(?action, "Ignoring action while payment is processing");
            return SmallVec::new();
        }

        match action {
            CheckoutAction::SelectEvent { event_id } => Self::select_event(state, event_id, env),

            CheckoutAction::SetQuantity { quantity } => {
                Self::set_quantity(state, quantity, env);
                SmallVec::new()
            },

            CheckoutAction::IncrementQuantity => {
                let requested = i64::from(state.quantity) + 1;
                Self::set_quantity(state, requested, env);
                SmallVec::new()
            },

            CheckoutAction::DecrementQuantity => {
                let requested = i64::from(state.quantity) - 1;
                Self::set_quantity(state, requested, env);
                SmallVec::new()
            },

            CheckoutAction::ConfirmPurchase => Self::confirm_purchase(state, env),

            CheckoutAction::OpenPaymentForm { request } => {
                Self::open_payment_form(state, request, env)
            },

            CheckoutAction::SelectPaymentMethod { method } => {
                if state.phase == CheckoutPhase::PaymentFormOpen {
                    state.form.select_method(method);
                }
                SmallVec::new()
            },

            CheckoutAction::UpdateField { field, value } => {
                if state.phase == CheckoutPhase::PaymentFormOpen {
                    state.form.update(field, &value);
                }
                SmallVec::new()
            },

            CheckoutAction::Submit => Self::submit(state, env),

            CheckoutAction::CompleteSubmission => Self::complete_submission(state, env),

            CheckoutAction::Reset => {
                *state = CheckoutState::default();
                smallvec![navigate(env, Route::Browse)]
            },
        }
    }
}

fn navigate(env: &CheckoutEnvironment, route: Route) -> Effect<CheckoutAction> {
    let presenter = Arc::clone(&env.presenter);
    Effect::fire_and_forget(move || presenter.navigate(route))
}

fn notify(env: &CheckoutEnvironment, notification: Notification) -> Effect<CheckoutAction> {
    let presenter = Arc::clone(&env.presenter);
    Effect::fire_and_forget(move || presenter.notify(notification))
}
