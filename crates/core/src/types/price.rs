//! Type-safe price representation using decimal arithmetic.
//!
//! Product cards carry prices as display strings (e.g. `"$19.99"`). [`Price`]
//! parses those strings into a [`Decimal`] amount so totals are computed
//! without floating-point drift, and formats amounts back for display.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input string is empty.
    #[error("price cannot be empty")]
    Empty,
    /// The numeric part is not a decimal number.
    #[error("price is not a number: {0:?}")]
    NotANumber(String),
    /// The amount is negative.
    #[error("price cannot be negative: {0}")]
    Negative(Decimal),
    /// The price is in a currency the caller cannot total.
    #[error("unsupported currency: {0:?}")]
    UnsupportedCurrency(CurrencyCode),
    /// A product or sum of prices exceeds the representable range.
    #[error("price arithmetic overflowed")]
    Overflow,
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Parse a display-formatted price such as `"$19.99"` or `"$1,299.00"`.
    ///
    /// A leading currency symbol is optional; without one the price is
    /// assumed to be USD. Thousands separators are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, the remainder is not a
    /// decimal number, or the amount is negative.
    ///
    /// # Examples
    ///
    /// ```
    /// use shopfront_core::{CurrencyCode, Price};
    ///
    /// let price = Price::parse("$19.99").unwrap();
    /// assert_eq!(price.currency_code, CurrencyCode::USD);
    /// assert_eq!(price.display(), "$19.99");
    ///
    /// assert!(Price::parse("N/A").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PriceError::Empty);
        }

        let (currency_code, rest) = CurrencyCode::strip_symbol(s);
        let digits: String = rest.trim().chars().filter(|c| *c != ',').collect();

        let amount =
            Decimal::from_str(&digits).map_err(|_| PriceError::NotANumber(s.to_owned()))?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }

        Ok(Self::new(amount, currency_code))
    }

    /// Format for display (e.g., `"$19.99"`).
    #[must_use]
    pub fn display(&self) -> String {
        format!(
            "{}{}",
            self.currency_code.symbol(),
            format_amount(self.amount)
        )
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Format an amount with exactly two decimal places (e.g. `"25.50"`).
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded = amount.round_dp(2);
    rounded.rescale(2);
    rounded.to_string()
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    fn strip_symbol(s: &str) -> (Self, &str) {
        for code in [Self::USD, Self::EUR, Self::GBP] {
            if let Some(rest) = s.strip_prefix(code.symbol()) {
                return (code, rest);
            }
        }
        (Self::default(), s)
    }
}
