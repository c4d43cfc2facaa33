//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are whole-unit rupee amounts on the wire (`"price": 6229`), but
//! the upstream API is not strict about it, so deserialization accepts both
//! JSON numbers and numeric strings. Serialization always emits a number.
//!
//! Addition and quantity multiplication saturate at the bounds of
//! [`Decimal`] rather than panicking on overflow.

use std::iter::Sum;
use std::ops::{Add, Mul};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A monetary amount in the store currency.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// A zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of currency units.
    #[must_use]
    pub fn from_units(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// ISO 4217 currency codes the storefront can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    INR,
    USD,
}

impl CurrencyCode {
    /// Display symbol placed before the amount.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::INR => "₹",
            Self::USD => "$",
        }
    }
}

/// Renders prices for display.
///
/// Checkout composition takes one of these rather than a fixed format so
/// the message can follow whatever locale the store is configured for.
pub trait PriceFormatter: Send + Sync {
    /// Format `price` for display.
    fn format(&self, price: Price) -> String;
}

/// en-IN currency formatting: `₹1,23,456`.
///
/// Uses Indian digit grouping (last three digits, then groups of two),
/// rounds half away from zero, and shows `fraction_digits` decimals
/// (zero by default, matching the storefront's price labels).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndianLocaleFormatter {
    currency: CurrencyCode,
    fraction_digits: u32,
}

impl IndianLocaleFormatter {
    /// Formatter for the given currency with an explicit number of decimals.
    #[must_use]
    pub const fn new(currency: CurrencyCode, fraction_digits: u32) -> Self {
        Self {
            currency,
            fraction_digits,
        }
    }
}

impl Default for IndianLocaleFormatter {
    fn default() -> Self {
        Self::new(CurrencyCode::INR, 0)
    }
}

impl PriceFormatter for IndianLocaleFormatter {
    fn format(&self, price: Price) -> String {
        let rounded = price
            .amount()
            .round_dp_with_strategy(self.fraction_digits, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let abs = rounded.abs();
        let integer = abs.trunc().normalize().to_string();

        let mut out = format!("{sign}{}{}", self.currency.symbol(), group_indian(&integer));

        if self.fraction_digits > 0 {
            let scale = Decimal::from(10_i64.pow(self.fraction_digits));
            let fraction = (abs.fract() * scale).trunc().normalize().to_string();
            let width = self.fraction_digits as usize;
            out.push('.');
            out.push_str(&format!("{fraction:0>width$}"));
        }

        out
    }
}

/// Insert en-IN group separators into a string of ASCII digits.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_owned();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (front, pair) = rest.split_at(rest.len() - 2);
        groups.push(pair);
        rest = front;
    }
    if !rest.is_empty() {
        groups.push(rest);
    }
    groups.reverse();

    format!("{},{tail}", groups.join(","))
}
