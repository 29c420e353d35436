#![allow(clippy::unwrap_used)]

use super::*;
use crate::catalog::Catalog;
use crate::navigation::{NavigationError, PaymentRequest, TracingPresenter};
use crate::types::{EventId, Money, PaymentMethod};
use checkout_core::environment::Clock;
use checkout_testing::{ReducerTest, assertions, test_clock};
use std::sync::Arc;

fn env() -> CheckoutEnvironment {
    CheckoutEnvironment::new(
        Arc::new(Catalog::seeded().unwrap()),
        Arc::new(test_clock()),
        Arc::new(SequentialOrderNumbers::new()),
        Arc::new(TracingPresenter),
    )
}

fn jazz() -> EventId {
    EventId::new("evt-001")
}

fn select_jazz() -> Vec<CheckoutAction> {
    vec![CheckoutAction::SelectEvent { event_id: jazz() }]
}

fn request_for(quantity: u32) -> PaymentRequest {
    let catalog = Catalog::seeded().unwrap();
    let event = catalog.get(&jazz()).unwrap();
    PaymentRequest::from_items(vec![build_cart_item(event, quantity)])
}

/// Actions that leave the flow on an empty payment form for `quantity` jazz tickets
fn open_form(quantity: u32) -> Vec<CheckoutAction> {
    vec![
        CheckoutAction::SelectEvent { event_id: jazz() },
        CheckoutAction::SetQuantity {
            quantity: i64::from(quantity),
        },
        CheckoutAction::ConfirmPurchase,
        CheckoutAction::OpenPaymentForm {
            request: Some(request_for(quantity)),
        },
    ]
}

fn field(field: PaymentField, value: &str) -> CheckoutAction {
    CheckoutAction::UpdateField {
        field,
        value: value.to_string(),
    }
}

fn valid_card() -> Vec<CheckoutAction> {
    vec![
        field(PaymentField::CardNumber, "4111111111111111"),
        field(PaymentField::CardHolder, "Aline Uwase"),
        field(PaymentField::ExpiryDate, "1227"),
        field(PaymentField::Cvv, "123"),
    ]
}

fn submitted_card(quantity: u32) -> Vec<CheckoutAction> {
    let mut actions = open_form(quantity);
    actions.extend(valid_card());
    actions.push(CheckoutAction::Submit);
    actions
}

// ========== Event selection ==========

#[test]
fn unknown_event_is_not_found() {
    ReducerTest::new(CheckoutReducer::new())
        .with_env(env())
        .given_state(CheckoutState::new())
        .when_action(CheckoutAction::SelectEvent {
            event_id: EventId::new("evt-404"),
        })
        .then_state(|state| {
            assert_eq!(state.phase, CheckoutPhase::Browsing);
            assert_eq!(
                state.last_error,
                Some(CheckoutError::NotFound(EventId::new("evt-404")))
            );
        })
        .then_effects(|effects| assertions::assert_effects_count(effects, 1))
        .run();
}

#[test]
fn selecting_an_event_starts_at_one_ticket() {
    ReducerTest::new(CheckoutReducer::new())
        .with_env(env())
        .given_state(CheckoutState::new())
        .when_action(CheckoutAction::SelectEvent { event_id: jazz() })
        .then_state(|state| {
            assert_eq!(state.phase, CheckoutPhase::EventSelected);
            assert_eq!(state.selected, Some(jazz()));
            assert_eq!(state.quantity, 1);
            assert!(state.last_error.is_none());
        })
        .run();
}

// ========== Quantity ==========

#[test]
fn quantity_accepts_the_tickets_available_boundary() {
    ReducerTest::new(CheckoutReducer::new())
        .with_env(env())
        .given_state(CheckoutState::new())
        .given_actions(select_jazz())
        .when_action(CheckoutAction::SetQuantity { quantity: 500 })
        .then_state(|state| {
            assert_eq!(state.quantity, 500);
            assert!(state.last_error.is_none());
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn out_of_range_quantities_keep_the_previous_value() {
    for requested in [0, -1, 501, i64::MAX] {
        let mut actions = select_jazz();
        actions.push(CheckoutAction::SetQuantity { quantity: 3 });

        ReducerTest::new(CheckoutReducer::new())
            .with_env(env())
            .given_state(CheckoutState::new())
            .given_actions(actions)
            .when_action(CheckoutAction::SetQuantity {
                quantity: requested,
            })
            .then_state(move |state| {
                assert_eq!(state.quantity, 3);
                assert_eq!(
                    state.last_error,
                    Some(CheckoutError::OutOfRange {
                        requested,
                        available: 500,
                    })
                );
            })
            .run();
    }
}

#[test]
fn decrement_stops_at_one() {
    ReducerTest::new(CheckoutReducer::new())
        .with_env(env())
        .given_state(CheckoutState::new())
        .given_actions(select_jazz())
        .when_action(CheckoutAction::DecrementQuantity)
        .then_state(|state| {
            assert_eq!(state.quantity, 1);
            assert!(matches!(
                state.last_error,
                Some(CheckoutError::OutOfRange { requested: 0, .. })
            ));
        })
        .run();
}

#[test]
fn increment_adds_a_ticket() {
    let mut actions = select_jazz();
    actions.push(CheckoutAction::IncrementQuantity);

    ReducerTest::new(CheckoutReducer::new())
        .with_env(env())
        .given_state(CheckoutState::new())
        .given_actions(actions)
        .when_action(CheckoutAction::IncrementQuantity)
        .then_state(|state| assert_eq!(state.quantity, 3))
        .run();
}

#[test]
fn quantity_needs_a_selected_event() {
    ReducerTest::new(CheckoutReducer::new())
        .with_env(env())
        .given_state(CheckoutState::new())
        .when_action(CheckoutAction::SetQuantity { quantity: 2 })
        .then_state(|state| {
            assert_eq!(state.last_error, Some(CheckoutError::NoEventSelected));
            assert_eq!(state.quantity, 0);
        })
        .run();
}

// ========== Cart ==========

#[test]
fn confirming_builds_the_cart_item() {
    let mut actions = select_jazz();
    actions.push(CheckoutAction::SetQuantity { quantity: 2 });

    ReducerTest::new(CheckoutReducer::new())
        .with_env(env())
        .given_state(CheckoutState::new())
        .given_actions(actions)
        .when_action(CheckoutAction::ConfirmPurchase)
        .then_state(|state| {
            assert_eq!(state.phase, CheckoutPhase::CartBuilt);
            assert_eq!(state.cart.len(), 1);
            assert_eq!(state.cart[0].quantity, 2);
            assert_eq!(state.cart[0].total_price(), Money::rwf(156_000));
        })
        .then_effects(|effects| assertions::assert_effects_count(effects, 1))
        .run();
}

#[test]
fn confirming_without_an_event_is_rejected() {
    ReducerTest::new(CheckoutReducer::new())
        .with_env(env())
        .given_state(CheckoutState::new())
        .when_action(CheckoutAction::ConfirmPurchase)
        .then_state(|state| {
            assert_eq!(state.last_error, Some(CheckoutError::NoEventSelected));
            assert!(state.cart.is_empty());
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

// ========== Payment form entry ==========

#[test]
fn payment_form_without_a_cart_redirects() {
    ReducerTest::new(CheckoutReducer::new())
        .with_env(env())
        .given_state(CheckoutState::new())
        .when_action(CheckoutAction::OpenPaymentForm { request: None })
        .then_state(|state| {
            assert_eq!(state.phase, CheckoutPhase::Browsing);
            assert!(state.payment.is_none());
            assert!(state.last_error.is_none());
        })
        .then_effects(|effects| assertions::assert_effects_count(effects, 1))
        .run();
}

#[test]
fn payment_form_rejects_a_tampered_total() {
    let mut request = request_for(2);
    request.total_amount = Money::rwf(1);

    ReducerTest::new(CheckoutReducer::new())
        .with_env(env())
        .given_state(CheckoutState::new())
        .when_action(CheckoutAction::OpenPaymentForm {
            request: Some(request),
        })
        .then_state(|state| {
            assert_eq!(state.phase, CheckoutPhase::Browsing);
            assert_eq!(
                state.last_error,
                Some(CheckoutError::InvalidPaymentRequest(
                    NavigationError::TotalMismatch {
                        expected: Money::rwf(156_000),
                        actual: Money::rwf(1),
                    }
                ))
            );
        })
        .run();
}

fn assert_payment_rejected(request: PaymentRequest, expected: NavigationError) {
    ReducerTest::new(CheckoutReducer::new())
        .with_env(env())
        .given_state(CheckoutState::new())
        .when_action(CheckoutAction::OpenPaymentForm {
            request: Some(request),
        })
        .then_state(move |state| {
            assert_eq!(state.phase, CheckoutPhase::Browsing);
            assert!(state.payment.is_none());
            assert_eq!(
                state.last_error,
                Some(CheckoutError::InvalidPaymentRequest(expected))
            );
        })
        .then_effects(|effects| assertions::assert_effects_count(effects, 1))
        .run();
}

#[test]
fn payment_form_rejects_more_tickets_than_available() {
    assert_payment_rejected(
        request_for(10_000),
        NavigationError::ExceedsAvailability {
            event_id: jazz(),
            requested: 10_000,
            available: 500,
        },
    );
}

#[test]
fn oversized_cart_never_produces_a_receipt() {
    let mut actions = vec![CheckoutAction::OpenPaymentForm {
        request: Some(request_for(10_000)),
    }];
    actions.extend(valid_card());
    actions.push(CheckoutAction::Submit);

    ReducerTest::new(CheckoutReducer::new())
        .with_env(env())
        .given_state(CheckoutState::new())
        .given_actions(actions)
        .when_action(CheckoutAction::CompleteSubmission)
        .then_state(|state| {
            assert_eq!(state.phase, CheckoutPhase::Browsing);
            assert!(state.receipt.is_none());
            assert!(state.cart.is_empty());
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn payment_form_rejects_an_unknown_event() {
    let mut request = request_for(1);
    request.items[0].event_id = EventId::new("evt-404");
    request.items[0].unit_price = Money::rwf(1);
    let request = PaymentRequest::from_items(request.items);

    assert_payment_rejected(
        request,
        NavigationError::UnknownEvent {
            event_id: EventId::new("evt-404"),
        },
    );
}

#[test]
fn payment_form_rejects_a_changed_unit_price() {
    let mut request = request_for(2);
    request.items[0].unit_price = Money::rwf(1);
    let request = PaymentRequest::from_items(request.items);

    assert_payment_rejected(
        request,
        NavigationError::PriceMismatch {
            event_id: jazz(),
            expected: Money::rwf(78_000),
            actual: Money::rwf(1),
        },
    );
}

#[test]
fn payment_form_opens_on_a_valid_cart() {
    ReducerTest::new(CheckoutReducer::new())
        .with_env(env())
        .given_state(CheckoutState::new())
        .when_action(CheckoutAction::OpenPaymentForm {
            request: Some(request_for(2)),
        })
        .then_state(|state| {
            assert_eq!(state.phase, CheckoutPhase::PaymentFormOpen);
            assert_eq!(state.form.method(), PaymentMethod::Card);
            assert_eq!(
                state.payment.as_ref().map(|p| p.total_amount),
                Some(Money::rwf(156_000))
            );
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

// ========== Form editing and validation ==========

#[test]
fn fields_are_normalized_as_typed() {
    let mut actions = open_form(1);
    actions.push(field(PaymentField::CardNumber, "4111 1111-1111 1111 22"));

    ReducerTest::new(CheckoutReducer::new())
        .with_env(env())
        .given_state(CheckoutState::new())
        .given_actions(actions)
        .when_action(field(PaymentField::ExpiryDate, "12/27"))
        .then_state(|state| {
            assert_eq!(state.form.value(PaymentField::CardNumber), "4111 1111 1111 1111");
            assert_eq!(state.form.value(PaymentField::ExpiryDate), "12/27");
        })
        .run();
}

#[test]
fn invalid_form_returns_to_the_form_with_errors() {
    let mut actions = open_form(1);
    actions.extend(valid_card());
    actions.push(field(PaymentField::Cvv, "12"));

    ReducerTest::new(CheckoutReducer::new())
        .with_env(env())
        .given_state(CheckoutState::new())
        .given_actions(actions)
        .when_action(CheckoutAction::Submit)
        .then_state(|state| {
            assert_eq!(state.phase, CheckoutPhase::PaymentFormOpen);
            assert_eq!(state.form.errors().len(), 1);
            assert_eq!(
                state.form.errors().get(&PaymentField::Cvv).map(String::as_str),
                Some("Valid CVV is required")
            );
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn short_phone_number_fails_validation() {
    let mut actions = open_form(1);
    actions.push(CheckoutAction::SelectPaymentMethod {
        method: PaymentMethod::Mtn,
    });
    actions.push(field(PaymentField::PhoneNumber, "078123"));

    ReducerTest::new(CheckoutReducer::new())
        .with_env(env())
        .given_state(CheckoutState::new())
        .given_actions(actions)
        .when_action(CheckoutAction::Submit)
        .then_state(|state| {
            assert_eq!(state.phase, CheckoutPhase::PaymentFormOpen);
            assert!(state.form.errors().contains_key(&PaymentField::PhoneNumber));
        })
        .run();
}

#[test]
fn switching_method_clears_entered_values_and_errors() {
    let mut actions = open_form(1);
    actions.extend(valid_card());
    actions.push(field(PaymentField::Cvv, ""));
    actions.push(CheckoutAction::Submit);

    ReducerTest::new(CheckoutReducer::new())
        .with_env(env())
        .given_state(CheckoutState::new())
        .given_actions(actions)
        .when_action(CheckoutAction::SelectPaymentMethod {
            method: PaymentMethod::Tigo,
        })
        .then_state(|state| {
            assert_eq!(state.form, PaymentForm::new(PaymentMethod::Tigo));
            assert!(state.form.errors().is_empty());
            assert_eq!(state.form.value(PaymentField::CardNumber), "");
        })
        .run();
}

#[test]
fn form_edits_are_ignored_outside_the_form() {
    ReducerTest::new(CheckoutReducer::new())
        .with_env(env())
        .given_state(CheckoutState::new())
        .when_action(field(PaymentField::CardHolder, "Aline"))
        .then_state(|state| assert_eq!(state.form.value(PaymentField::CardHolder), ""))
        .run();
}

// ========== Submission ==========

#[test]
fn valid_submission_schedules_completion() {
    let mut actions = open_form(2);
    actions.extend(valid_card());

    ReducerTest::new(CheckoutReducer::new())
        .with_env(env().with_processing_delay(std::time::Duration::from_millis(1500)))
        .given_state(CheckoutState::new())
        .given_actions(actions)
        .when_action(CheckoutAction::Submit)
        .then_state(|state| assert_eq!(state.phase, CheckoutPhase::Submitting))
        .then_effects(|effects| {
            assertions::assert_effects_count(effects, 2);
            assertions::assert_has_delay_effect(effects);
            assert_eq!(
                assertions::delayed_action(effects),
                Some(&CheckoutAction::CompleteSubmission)
            );
        })
        .run();
}

#[test]
fn submit_outside_the_form_is_rejected() {
    ReducerTest::new(CheckoutReducer::new())
        .with_env(env())
        .given_state(CheckoutState::new())
        .given_actions(select_jazz())
        .when_action(CheckoutAction::Submit)
        .then_state(|state| {
            assert_eq!(
                state.last_error,
                Some(CheckoutError::NotSubmittable(CheckoutPhase::EventSelected))
            );
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn user_actions_are_ignored_while_processing() {
    ReducerTest::new(CheckoutReducer::new())
        .with_env(env())
        .given_state(CheckoutState::new())
        .given_actions(submitted_card(2))
        .when_action(CheckoutAction::SelectPaymentMethod {
            method: PaymentMethod::Mtn,
        })
        .then_state(|state| {
            assert_eq!(state.phase, CheckoutPhase::Submitting);
            assert_eq!(state.form.method(), PaymentMethod::Card);
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn completion_issues_a_receipt_with_a_masked_card() {
    ReducerTest::new(CheckoutReducer::new())
        .with_env(env())
        .given_state(CheckoutState::new())
        .given_actions(submitted_card(2))
        .when_action(CheckoutAction::CompleteSubmission)
        .then_state(|state| {
            assert!(state.is_complete());
            let receipt = state.receipt.as_ref().unwrap();
            assert_eq!(receipt.order_number.as_str(), "ORD00001");
            assert_eq!(receipt.total_amount, Money::rwf(156_000));
            assert_eq!(receipt.items, state.cart);
            assert_eq!(receipt.payment_method, "Card ending in 1111");
            assert!(!receipt.payment_method.contains("4111"));
            assert_eq!(receipt.purchased_at, test_clock().now());
        })
        .then_effects(|effects| assertions::assert_effects_count(effects, 1))
        .run();
}

#[test]
fn mobile_money_receipt_shows_the_phone_number() {
    let mut actions = open_form(1);
    actions.push(CheckoutAction::SelectPaymentMethod {
        method: PaymentMethod::Mtn,
    });
    actions.push(field(PaymentField::PhoneNumber, "0781234567"));
    actions.push(CheckoutAction::Submit);

    ReducerTest::new(CheckoutReducer::new())
        .with_env(env())
        .given_state(CheckoutState::new())
        .given_actions(actions)
        .when_action(CheckoutAction::CompleteSubmission)
        .then_state(|state| {
            let receipt = state.receipt.as_ref().unwrap();
            assert_eq!(receipt.payment_method, "MTN Mobile Money (0781234567)");
            assert_eq!(receipt.total_amount, Money::rwf(78_000));
        })
        .run();
}

#[test]
fn stray_completion_is_ignored() {
    ReducerTest::new(CheckoutReducer::new())
        .with_env(env())
        .given_state(CheckoutState::new())
        .given_actions(open_form(1))
        .when_action(CheckoutAction::CompleteSubmission)
        .then_state(|state| {
            assert_eq!(state.phase, CheckoutPhase::PaymentFormOpen);
            assert!(state.receipt.is_none());
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn reset_returns_to_browsing() {
    ReducerTest::new(CheckoutReducer::new())
        .with_env(env())
        .given_state(CheckoutState::new())
        .given_actions(open_form(1))
        .when_action(CheckoutAction::Reset)
        .then_state(|state| assert_eq!(*state, CheckoutState::new()))
        .then_effects(|effects| assertions::assert_effects_count(effects, 1))
        .run();
}
