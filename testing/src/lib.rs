//! # Checkout Testing
//!
//! Testing utilities for the storefront's reducers.
//!
//! This crate provides:
//! - Deterministic implementations of environment traits ([`FixedClock`])
//! - A Given-When-Then harness for reducers ([`ReducerTest`])
//! - Assertion helpers for returned effects
//!
//! ## Example
//!
//! ```ignore
//! use checkout_testing::{ReducerTest, test_clock};
//!
//! ReducerTest::new(BrowseReducer::new())
//!     .with_env(browse_environment())
//!     .given_state(BrowseState::default())
//!     .when_action(BrowseAction::Reset)
//!     .then_state(|state| assert!(state.spec.is_unfiltered()))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use checkout_core::environment::Clock;


pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations of environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use checkout_testing::mocks::FixedClock;
    /// use checkout_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-08-01 12:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-08-01T12:00:00Z")
                .map_or_else(|_| DateTime::<Utc>::UNIX_EPOCH, |t| t.with_timezone(&Utc)),
        )
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};
