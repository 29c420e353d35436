//! Dependencies of the checkout reducer.

use crate::catalog::Catalog;
use crate::navigation::Presenter;
use crate::types::OrderNumber;
use checkout_core::environment::Clock;
use rand::Rng;
use rand::distributions::Alphanumeric;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Simulated payment processing time
pub const DEFAULT_PROCESSING_DELAY: Duration = Duration::from_millis(1500);

/// Length of generated order numbers
pub const ORDER_NUMBER_LEN: usize = 8;

/// Source of receipt order numbers
pub trait OrderNumberGenerator: Send + Sync {
    /// The next order number
    fn next_order_number(&self) -> OrderNumber;
}

/// Random uppercase alphanumeric order numbers
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomOrderNumbers;

impl OrderNumberGenerator for RandomOrderNumbers {
    fn next_order_number(&self) -> OrderNumber {
        let value: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(ORDER_NUMBER_LEN)
            .map(|byte| char::from(byte).to_ascii_uppercase())
            .collect();
        OrderNumber::new(value)
    }
}

/// Predictable order numbers: `ORD00001`, `ORD00002`, ...
#[derive(Debug, Default)]
pub struct SequentialOrderNumbers {
    issued: AtomicU32,
}

impl SequentialOrderNumbers {
    /// Starts the sequence at `ORD00001`
    #[must_use]
    pub const fn new() -> Self {
        Self {
            issued: AtomicU32::new(0),
        }
    }
}

impl OrderNumberGenerator for SequentialOrderNumbers {
    fn next_order_number(&self) -> OrderNumber {
        let n = self.issued.fetch_add(1, Ordering::Relaxed) + 1;
        OrderNumber::new(format!("ORD{n:05}"))
    }
}

/// Environment for the checkout reducer
#[derive(Clone)]
pub struct CheckoutEnvironment {
    /// Events that can be bought
    pub catalog: Arc<Catalog>,
    /// Timestamps receipts
    pub clock: Arc<dyn Clock>,
    /// Numbers receipts
    pub order_numbers: Arc<dyn OrderNumberGenerator>,
    /// Receives navigation and notifications
    pub presenter: Arc<dyn Presenter>,
    /// Time between submitting and the receipt
    pub processing_delay: Duration,
}

impl CheckoutEnvironment {
    /// Creates a new `CheckoutEnvironment`
    #[must_use]
    pub fn new(
        catalog: Arc<Catalog>,
        clock: Arc<dyn Clock>,
        order_numbers: Arc<dyn OrderNumberGenerator>,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        Self {
            catalog,
            clock,
            order_numbers,
            presenter,
            processing_delay: DEFAULT_PROCESSING_DELAY,
        }
    }

    /// Overrides the simulated processing time
    #[must_use]
    pub fn with_processing_delay(mut self, delay: Duration) -> Self {
        self.processing_delay = delay;
        self
    }
}
