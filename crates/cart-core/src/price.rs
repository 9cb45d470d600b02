//! Price type for representing monetary values.
//!
//! Uses a cents-based integer representation to avoid floating-point
//! drift when subtotals are summed. On the wire a price is a plain decimal
//! number (`179.9`), which is what the catalog API sends.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul};
use std::str::FromStr;

use crate::error::CoreError;

/// Number of minor units in one major unit.
const MINOR_UNITS: i64 = 100;

/// Currencies the storefront can display prices in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    BRL,
    USD,
    EUR,
}

impl Currency {
    /// Get the currency code (e.g., "BRL").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::BRL => "BRL",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
        }
    }

    /// Get the currency symbol as it prefixes an amount.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::BRL => "R$\u{a0}",
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
        }
    }

    fn decimal_separator(&self) -> char {
        match self {
            Currency::BRL => ',',
            Currency::USD | Currency::EUR => '.',
        }
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "BRL" => Some(Currency::BRL),
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| CoreError::UnknownCurrency(s.to_string()))
    }
}

/// A price in minor units (cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Price {
    cents: i64,
}

impl Price {
    /// Create a price from cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Create a price from a decimal amount, rounding to the nearest cent.
    ///
    /// ```
    /// use cart_core::Price;
    /// assert_eq!(Price::from_decimal(179.9).cents(), 17990);
    /// ```
    pub fn from_decimal(amount: f64) -> Self {
        Self::from_cents((amount * MINOR_UNITS as f64).round() as i64)
    }

    /// Create a price from a decimal amount that is exact to the cent.
    ///
    /// Returns `None` for non-finite values, values out of range, and values
    /// with a fractional cent.
    ///
    /// ```
    /// use cart_core::Price;
    /// assert_eq!(Price::from_exact_decimal(179.9).map(|p| p.cents()), Some(17990));
    /// assert_eq!(Price::from_exact_decimal(19.999), None);
    /// ```
    pub fn from_exact_decimal(amount: f64) -> Option<Self> {
        let scaled = amount * MINOR_UNITS as f64;
        if !scaled.is_finite() {
            return None;
        }
        let rounded = scaled.round();
        // Tolerate the representation error of decimals like 179.9.
        let tolerance = 8.0 * f64::EPSILON * scaled.abs().max(1.0);
        if (scaled - rounded).abs() > tolerance || rounded.abs() >= i64::MAX as f64 {
            return None;
        }
        Some(Self::from_cents(rounded as i64))
    }

    /// A zero price.
    pub const fn zero() -> Self {
        Self::from_cents(0)
    }

    /// Amount in cents.
    pub const fn cents(&self) -> i64 {
        self.cents
    }

    /// Convert to a decimal value.
    pub fn to_decimal(&self) -> f64 {
        self.cents as f64 / MINOR_UNITS as f64
    }

    /// Format for display in the given currency (e.g., "R$ 179,90").
    pub fn display(&self, currency: Currency) -> String {
        let sign = if self.cents < 0 { "-" } else { "" };
        let abs = self.cents.unsigned_abs();
        format!(
            "{sign}{}{}{}{:02}",
            currency.symbol(),
            abs / MINOR_UNITS as u64,
            currency.decimal_separator(),
            abs % MINOR_UNITS as u64
        )
    }
}

impl Add for Price {
    type Output = Price;

    fn add(self, other: Price) -> Price {
        Price::from_cents(self.cents.saturating_add(other.cents))
    }
}

impl Mul<i64> for Price {
    type Output = Price;

    fn mul(self, quantity: i64) -> Price {
        Price::from_cents(self.cents.saturating_mul(quantity))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Price {
        iter.fold(Price::zero(), Add::add)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_decimal())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        Price::from_exact_decimal(amount).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "price {} is not a whole number of cents",
                amount
            ))
        })
    }
}
