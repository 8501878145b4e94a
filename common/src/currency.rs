//! Currency codes and the set of currencies the archive reports rates for.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ArchiveError, Result};

/// Currencies the rate table always carries, in response order.
pub const SUPPORTED_CODES: [&str; 8] = ["USD", "EUR", "GBP", "INR", "CAD", "AUD", "JPY", "CNY"];

/// ISO 4217 currency code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Currency(String);

impl Currency {
    /// Create a new currency from code, upper-casing it.
    ///
    /// No validation is performed; use [`Currency::parse`] for untrusted input.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    /// Parse an untrusted code: exactly three ASCII letters, any case.
    pub fn parse(code: &str) -> Result<Self> {
        let trimmed = code.trim();
        if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ArchiveError::InvalidCurrency(code.to_string()));
        }
        Ok(Self::new(trimmed))
    }

    /// Get the currency code.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Allow-listed currencies in response order.
    pub fn supported() -> impl Iterator<Item = Currency> {
        SUPPORTED_CODES.iter().map(|code| Currency::new(*code))
    }

    /// Display symbol used by the donation pages.
    pub fn symbol(&self) -> Option<&'static str> {
        match self.0.as_str() {
            "USD" => Some("$"),
            "INR" => Some("₹"),
            "GBP" => Some("£"),
            "CAD" => Some("CA$"),
            "AUD" => Some("A$"),
            "EUR" => Some("€"),
            "JPY" | "CNY" => Some("¥"),
            _ => None,
        }
    }

    /// The base every rate is expressed against.
    pub fn usd() -> Self {
        Self::new("USD")
    }

    pub fn eur() -> Self {
        Self::new("EUR")
    }

    pub fn gbp() -> Self {
        Self::new("GBP")
    }

    pub fn inr() -> Self {
        Self::new("INR")
    }

    pub fn jpy() -> Self {
        Self::new("JPY")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Currency {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl FromStr for Currency {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_uppercases() {
        assert_eq!(Currency::new("eur").code(), "EUR");
        assert_eq!(Currency::from("inr"), Currency::inr());
    }

    #[test]
    fn test_parse_rejects_malformed_codes() {
        assert_eq!(Currency::parse(" gbp ").unwrap(), Currency::gbp());
        assert!(Currency::parse("EURO").is_err());
        assert!(Currency::parse("E1R").is_err());
        assert!(Currency::parse("").is_err());
    }

    #[test]
    fn test_supported_order() {
        let codes: Vec<String> = Currency::supported().map(|c| c.code().to_string()).collect();
        assert_eq!(codes, SUPPORTED_CODES);
    }

    #[test]
    fn test_symbols() {
        assert_eq!(Currency::inr().symbol(), Some("₹"));
        assert_eq!(Currency::new("CNY").symbol(), Some("¥"));
        assert_eq!(Currency::new("CHF").symbol(), None);
    }

    #[test]
    fn test_serializes_as_bare_code() {
        assert_eq!(serde_json::to_string(&Currency::eur()).unwrap(), "\"EUR\"");
        let parsed: Currency = serde_json::from_str("\"JPY\"").unwrap();
        assert_eq!(parsed, Currency::jpy());
    }
}
