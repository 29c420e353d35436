//! Domain types for the event storefront.
//!
//! Value objects and records shared by the catalog, the filter engine, the
//! checkout reducer and the navigation boundary.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Identifiers
// ============================================================================

/// Catalog identifier of an event (e.g. `evt-001`)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(String);

impl EventId {
    /// Creates an `EventId` from any string-like value
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Order number printed on a receipt
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Wraps a generated order number
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the order number as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Money
// ============================================================================

/// Amount in whole Rwandan francs
///
/// The storefront only ever deals in integer currency units.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Money(u64);

impl Money {
    /// Zero francs
    pub const ZERO: Self = Self(0);

    /// Francs per US dollar used when the catalog was priced
    pub const RWF_PER_USD: u64 = 1200;

    /// Creates an amount in francs
    #[must_use]
    pub const fn rwf(amount: u64) -> Self {
        Self(amount)
    }

    /// Converts a US dollar price at [`Money::RWF_PER_USD`], saturating at `u64::MAX`
    #[must_use]
    pub const fn from_usd(dollars: u64) -> Self {
        Self(dollars.saturating_mul(Self::RWF_PER_USD))
    }

    /// Amount in francs
    #[must_use]
    pub const fn amount(self) -> u64 {
        self.0
    }

    /// Price of `quantity` units, saturating at `u64::MAX`
    #[must_use]
    pub const fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(quantity as u64))
    }

    /// Sum of two amounts, saturating at `u64::MAX`
    #[must_use]
    pub const fn plus(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Money {
    /// Formats as `RWF 78,000`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        write!(f, "RWF {grouped}")
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::plus)
    }
}

// ============================================================================
// Events
// ============================================================================

/// Latitude / longitude pair
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Degrees north
    pub latitude: f64,
    /// Degrees east
    pub longitude: f64,
}

/// Where an event takes place
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Venue name
    pub name: String,
    /// Street address
    pub address: String,
    /// City, used by the city filter
    pub city: String,
    /// Country
    pub country: String,
    /// Map position
    pub coordinates: Coordinates,
}

/// Who runs an event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organizer {
    /// Organizer name
    pub name: String,
    /// Logo reference
    pub logo: Option<String>,
    /// Short description
    pub description: Option<String>,
}

/// A catalog entry
///
/// Immutable once the catalog is built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier
    pub id: EventId,
    /// Title
    pub title: String,
    /// Long description
    pub description: String,
    /// First day
    pub start_date: NaiveDate,
    /// Last day
    pub end_date: NaiveDate,
    /// Daily start time
    pub time: NaiveTime,
    /// Duration label, matched verbatim by the duration filter (e.g. `3 days`)
    pub duration: String,
    /// Venue
    pub location: Location,
    /// Price of one ticket
    pub price: Money,
    /// Category label
    pub category: String,
    /// Free-form tags
    pub tags: BTreeSet<String>,
    /// Image reference
    pub image: String,
    /// Organizer
    pub organizer: Organizer,
    /// Tickets left; bounds the purchasable quantity
    pub tickets_available: u32,
    /// Shown in the featured section
    pub featured: bool,
}

impl Event {
    /// Whether the event carries `tag`
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Whether `quantity` tickets can be bought
    #[must_use]
    pub const fn accepts_quantity(&self, quantity: i64) -> bool {
        quantity >= 1 && quantity <= self.tickets_available as i64
    }
}

// ============================================================================
// Checkout records
// ============================================================================

/// Intent to buy `quantity` tickets for one event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Event being purchased
    pub event_id: EventId,
    /// Event title, for display on the payment and receipt views
    pub event_title: String,
    /// First day of the event
    pub event_date: NaiveDate,
    /// Price of one ticket
    pub unit_price: Money,
    /// Number of tickets, at least 1
    pub quantity: u32,
}

impl CartItem {
    /// `unit_price × quantity`
    #[must_use]
    pub const fn total_price(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// Closed set of accepted payment methods
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Debit or credit card
    #[default]
    Card,
    /// MTN Mobile Money
    Mtn,
    /// Tigo Cash
    Tigo,
}

impl PaymentMethod {
    /// Every accepted method, in display order
    pub const ALL: [Self; 3] = [Self::Card, Self::Mtn, Self::Tigo];

    /// Human-readable name
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Card => "Card",
            Self::Mtn => "MTN Mobile Money",
            Self::Tigo => "Tigo Cash",
        }
    }

    /// Whether the method is paid with a phone number
    #[must_use]
    pub const fn is_mobile_money(self) -> bool {
        matches!(self, Self::Mtn | Self::Tigo)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unknown payment method name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown payment method: {0}")]
pub struct UnknownPaymentMethod(pub String);

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(Self::Card),
            "mtn" => Ok(Self::Mtn),
            "tigo" => Ok(Self::Tigo),
            other => Err(UnknownPaymentMethod(other.to_string())),
        }
    }
}

/// Terminal record of a completed purchase
///
/// Built once when submission completes and never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Generated order number
    pub order_number: OrderNumber,
    /// Items exactly as handed to the payment view
    pub items: Vec<CartItem>,
    /// Amount charged
    pub total_amount: Money,
    /// Payment method description, e.g. `Card ending in 1111`
    pub payment_method: String,
    /// When the purchase completed
    pub purchased_at: DateTime<Utc>,
}
