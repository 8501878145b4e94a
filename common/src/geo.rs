//! Country to currency resolution for visitor-facing amounts.

use rust_decimal::Decimal;

use crate::currency::Currency;
use crate::error::{ArchiveError, Result};

/// Country assumed when the visitor's region is unknown.
pub const DEFAULT_COUNTRY: &str = "US";

/// Currency and display details resolved for a visitor's country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoInfo {
    /// ISO 3166-1 alpha-2 country code, upper-cased.
    pub country: String,
    /// Local currency (USD when the country is not mapped).
    pub currency: Currency,
    /// Display symbol for the currency.
    pub symbol: &'static str,
    /// Hand-picked suggestion amounts in the local currency.
    pub suggested: Vec<Decimal>,
}

impl GeoInfo {
    /// Resolve a two-letter country code, case-insensitive.
    ///
    /// Missing or blank codes resolve to the US; well-formed but unmapped
    /// codes keep the country and fall back to USD.
    pub fn for_country(country: Option<&str>) -> Result<Self> {
        let country = match country.map(str::trim) {
            None | Some("") => DEFAULT_COUNTRY.to_string(),
            Some(code) => {
                if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(ArchiveError::InvalidCountry(code.to_string()));
                }
                code.to_uppercase()
            }
        };

        let currency = currency_for_country(&country);
        let symbol = currency.symbol().unwrap_or("$");
        let suggested = suggested_for_currency(&currency)
            .iter()
            .map(|v| Decimal::from(*v))
            .collect();

        Ok(Self {
            country,
            currency,
            symbol,
            suggested,
        })
    }
}

fn currency_for_country(country: &str) -> Currency {
    let code = match country {
        "IN" => "INR",
        "GB" => "GBP",
        "CA" => "CAD",
        "AU" => "AUD",
        "DE" | "FR" | "NL" | "ES" | "IT" => "EUR",
        "JP" => "JPY",
        "CN" => "CNY",
        _ => "USD",
    };
    Currency::new(code)
}

// INR, JPY and CNY lists are scaled to feel meaningful locally.
fn suggested_for_currency(currency: &Currency) -> [u32; 4] {
    match currency.code() {
        "INR" => [100, 500, 1000, 2500],
        "CAD" | "AUD" => [4, 10, 25, 50],
        "JPY" => [300, 1000, 3000, 5000],
        "CNY" => [20, 50, 150, 300],
        _ => [3, 10, 25, 50],
    }
}
