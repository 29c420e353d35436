//! Payment form: field normalization, validation and the receipt rendering
//! of the chosen method.

use crate::types::PaymentMethod;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

const CARD_DIGITS: usize = 16;
const EXPIRY_DIGITS: usize = 4;
const CVV_DIGITS: usize = 4;
const MIN_CVV_DIGITS: usize = 3;
const PHONE_DIGITS: usize = 10;

/// Input fields of the payment form
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum PaymentField {
    /// Card number, shown in groups of four
    CardNumber,
    /// Name on the card
    CardHolder,
    /// `MM/YY`
    ExpiryDate,
    /// Card verification value
    Cvv,
    /// Mobile-money phone number
    PhoneNumber,
}

impl PaymentField {
    /// Form name of the field
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CardNumber => "cardNumber",
            Self::CardHolder => "cardHolder",
            Self::ExpiryDate => "expiryDate",
            Self::Cvv => "cvv",
            Self::PhoneNumber => "phoneNumber",
        }
    }
}

impl fmt::Display for PaymentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown form field name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown payment field: {0}")]
pub struct UnknownPaymentField(pub String);

impl FromStr for PaymentField {
    type Err = UnknownPaymentField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cardNumber" => Ok(Self::CardNumber),
            "cardHolder" => Ok(Self::CardHolder),
            "expiryDate" => Ok(Self::ExpiryDate),
            "cvv" => Ok(Self::Cvv),
            "phoneNumber" => Ok(Self::PhoneNumber),
            other => Err(UnknownPaymentField(other.to_string())),
        }
    }
}

/// Field-level validation messages; empty means valid
pub type FieldErrors = BTreeMap<PaymentField, String>;

/// Values entered for the selected payment method
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentForm {
    method: PaymentMethod,
    values: BTreeMap<PaymentField, String>,
    errors: FieldErrors,
}

impl PaymentForm {
    /// Empty form for `method`
    #[must_use]
    pub fn new(method: PaymentMethod) -> Self {
        Self {
            method,
            values: BTreeMap::new(),
            errors: FieldErrors::new(),
        }
    }

    /// Selected method
    #[must_use]
    pub const fn method(&self) -> PaymentMethod {
        self.method
    }

    /// Stored value of `field`, empty if never entered
    #[must_use]
    pub fn value(&self, field: PaymentField) -> &str {
        self.values.get(&field).map_or("", String::as_str)
    }

    /// Current validation messages
    #[must_use]
    pub const fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Switches method, discarding every entered value and error
    pub fn select_method(&mut self, method: PaymentMethod) {
        *self = Self::new(method);
    }

    /// Stores `raw` after normalizing it for the current method
    ///
    /// Clears any error previously reported for the field.
    pub fn update(&mut self, field: PaymentField, raw: &str) {
        let value = normalize(self.method, field, raw);
        self.values.insert(field, value);
        self.errors.remove(&field);
    }

    /// Validates the form, replacing the stored errors with the result
    pub fn validate(&mut self) -> &FieldErrors {
        self.errors = self.check();
        &self.errors
    }

    /// Validation messages for the current values
    #[must_use]
    pub fn check(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        let mut require = |field: PaymentField, ok: bool, message: &str| {
            if !ok {
                errors.insert(field, message.to_string());
            }
        };

        if self.method.is_mobile_money() {
            require(
                PaymentField::PhoneNumber,
                self.value(PaymentField::PhoneNumber).len() >= PHONE_DIGITS,
                "Valid phone number is required",
            );
        } else {
            require(
                PaymentField::CardNumber,
                digits(self.value(PaymentField::CardNumber)).len() >= CARD_DIGITS,
                "Valid card number is required",
            );
            require(
                PaymentField::CardHolder,
                !self.value(PaymentField::CardHolder).is_empty(),
                "Cardholder name is required",
            );
            require(
                PaymentField::ExpiryDate,
                self.value(PaymentField::ExpiryDate).contains('/'),
                "Valid expiry date is required (MM/YY)",
            );
            require(
                PaymentField::Cvv,
                self.value(PaymentField::Cvv).len() >= MIN_CVV_DIGITS,
                "Valid CVV is required",
            );
        }

        errors
    }

    /// Receipt rendering of the method, e.g. `Card ending in 1111`
    ///
    /// Never includes more than the last four card digits.
    #[must_use]
    pub fn describe(&self) -> String {
        match self.method {
            PaymentMethod::Card => {
                let number = digits(self.value(PaymentField::CardNumber));
                let last_four = &number[number.len().saturating_sub(4)..];
                format!("Card ending in {last_four}")
            },
            method => format!(
                "{} ({})",
                method.label(),
                self.value(PaymentField::PhoneNumber)
            ),
        }
    }
}

/// Display form of `raw` for `field` under `method`
///
/// Card fields are only reformatted while paying by card, and the phone
/// number only for mobile money; anything else is kept as typed.
#[must_use]
pub fn normalize(method: PaymentMethod, field: PaymentField, raw: &str) -> String {
    match (field, method.is_mobile_money()) {
        (PaymentField::CardNumber, false) => group_card_number(&truncated_digits(raw, CARD_DIGITS)),
        (PaymentField::ExpiryDate, false) => format_expiry(&truncated_digits(raw, EXPIRY_DIGITS)),
        (PaymentField::Cvv, false) => truncated_digits(raw, CVV_DIGITS),
        (PaymentField::PhoneNumber, true) => truncated_digits(raw, PHONE_DIGITS),
        _ => raw.to_string(),
    }
}

fn digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

fn truncated_digits(value: &str, max: usize) -> String {
    value.chars().filter(char::is_ascii_digit).take(max).collect()
}

fn group_card_number(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 4);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && i % 4 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    grouped
}

fn format_expiry(digits: &str) -> String {
    if digits.len() > 2 {
        format!("{}/{}", &digits[..2], &digits[2..])
    } else {
        digits.to_string()
    }
}
