//! Conversion of suggested donation amounts into a visitor's currency.

use rust_decimal::{Decimal, RoundingStrategy};
use skyarchive_common::{Currency, GeoInfo};

use crate::error::{FxError, FxResult};
use crate::snapshot::RateSnapshot;

/// Suggested amounts in the base currency.
pub const BASE_SUGGESTED_USD: [u32; 4] = [3, 10, 25, 50];

/// The base suggestion list as decimals.
pub fn base_suggested_amounts() -> Vec<Decimal> {
    BASE_SUGGESTED_USD.iter().map(|v| Decimal::from(*v)).collect()
}

/// How a converted amount is rounded for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundingRule {
    /// Nearest multiple of 10 (Rupee and Yen).
    NearestTen,
    /// One decimal below 10, whole numbers otherwise.
    Adaptive,
}

impl RoundingRule {
    /// Rule selected by the display symbol.
    pub fn for_symbol(symbol: &str) -> Self {
        match symbol {
            "₹" | "¥" => RoundingRule::NearestTen,
            _ => RoundingRule::Adaptive,
        }
    }

    /// Round one amount. Halves round up.
    pub fn apply(&self, amount: Decimal) -> Decimal {
        let strategy = RoundingStrategy::MidpointAwayFromZero;
        let rounded = match self {
            RoundingRule::NearestTen => {
                (amount / Decimal::TEN).round_dp_with_strategy(0, strategy) * Decimal::TEN
            }
            RoundingRule::Adaptive if amount < Decimal::TEN => amount.round_dp_with_strategy(1, strategy),
            RoundingRule::Adaptive => amount.round_dp_with_strategy(0, strategy),
        };
        rounded.normalize()
    }
}

/// Multiply each amount by `rate` and round per the symbol's rule.
///
/// Rates that are not finite and strictly positive are rejected.
pub fn convert_amounts(amounts: &[Decimal], rate: f64, symbol: &str) -> FxResult<Vec<Decimal>> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(FxError::InvalidRate(rate));
    }
    let rate = Decimal::try_from(rate).map_err(|_| FxError::InvalidRate(rate))?;
    let rule = RoundingRule::for_symbol(symbol);

    Ok(amounts.iter().map(|amount| rule.apply(*amount * rate)).collect())
}

/// Suggested amounts ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestedAmounts {
    pub country: String,
    /// Currency the amounts are expressed in.
    pub currency: Currency,
    pub symbol: String,
    pub amounts: Vec<Decimal>,
    /// Whether a rate was applied.
    pub converted: bool,
    /// Provider of the rate table consulted.
    pub provider: String,
}

/// Base suggestions for a visitor, converted when a usable rate exists.
///
/// USD visitors get the base list as is. When the snapshot has no rate for the
/// visitor's currency the base USD amounts are returned unmodified.
pub fn suggest_for_geo(geo: &GeoInfo, snapshot: &RateSnapshot) -> SuggestedAmounts {
    let base = base_suggested_amounts();
    let usd = |amounts: Vec<Decimal>| SuggestedAmounts {
        country: geo.country.clone(),
        currency: Currency::usd(),
        symbol: Currency::usd().symbol().unwrap_or("$").to_string(),
        amounts,
        converted: false,
        provider: snapshot.provider.clone(),
    };

    if geo.currency == Currency::usd() {
        return usd(base);
    }

    let Some(rate) = snapshot.rate_for(&geo.currency) else {
        tracing::debug!(currency = %geo.currency, "No rate in snapshot, keeping USD amounts");
        return usd(base);
    };

    match convert_amounts(&base, rate, geo.symbol) {
        Ok(amounts) => SuggestedAmounts {
            country: geo.country.clone(),
            currency: geo.currency.clone(),
            symbol: geo.symbol.to_string(),
            amounts,
            converted: true,
            provider: snapshot.provider.clone(),
        },
        Err(e) => {
            tracing::debug!(currency = %geo.currency, error = %e, "Unusable rate, keeping USD amounts");
            usd(base)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderRates;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rupee_rounds_to_nearest_ten() {
        let amounts = convert_amounts(&base_suggested_amounts(), 83.0, "₹").unwrap();
        assert_eq!(amounts, vec![dec!(250), dec!(830), dec!(2080), dec!(4150)]);
    }

    #[test]
    fn test_yen_rounds_to_nearest_ten() {
        let amounts = convert_amounts(&base_suggested_amounts(), 156.0, "¥").unwrap();
        assert_eq!(amounts, vec![dec!(470), dec!(1560), dec!(3900), dec!(7800)]);
    }

    #[test]
    fn test_euro_adaptive_rounding() {
        let amounts = convert_amounts(&base_suggested_amounts(), 0.92, "€").unwrap();
        assert_eq!(amounts, vec![dec!(2.8), dec!(9.2), dec!(23), dec!(46)]);
    }

    #[test]
    fn test_adaptive_boundary_at_ten() {
        let rule = RoundingRule::Adaptive;
        assert_eq!(rule.apply(dec!(9.95)), dec!(10.0));
        assert_eq!(rule.apply(dec!(10.5)), dec!(11));
        assert_eq!(rule.apply(dec!(10.49)), dec!(10));
    }

    #[test]
    fn test_preserves_length_and_order() {
        let amounts = [dec!(50), dec!(3)];
        let converted = convert_amounts(&amounts, 1.34, "CA$").unwrap();
        assert_eq!(converted, vec![dec!(67), dec!(4.0)]);
    }

    #[test]
    fn test_rejects_unusable_rates() {
        let base = base_suggested_amounts();
        assert!(matches!(convert_amounts(&base, 0.0, "€"), Err(FxError::InvalidRate(_))));
        assert!(convert_amounts(&base, -2.0, "€").is_err());
        assert!(convert_amounts(&base, f64::NAN, "€").is_err());
        assert!(convert_amounts(&base, f64::INFINITY, "€").is_err());
    }

    fn snapshot(rates: &[(&str, f64)]) -> RateSnapshot {
        let rates = ProviderRates::new("er-api", Currency::usd(), rates.iter().copied());
        RateSnapshot::from_provider(&rates, 1)
    }

    #[test]
    fn test_suggest_for_india() {
        let geo = GeoInfo::for_country(Some("IN")).unwrap();
        let suggested = suggest_for_geo(&geo, &snapshot(&[("INR", 83.0)]));

        assert!(suggested.converted);
        assert_eq!(suggested.currency, Currency::inr());
        assert_eq!(suggested.symbol, "₹");
        assert_eq!(suggested.amounts, vec![dec!(250), dec!(830), dec!(2080), dec!(4150)]);
        assert_eq!(suggested.provider, "er-api");
    }

    #[test]
    fn test_suggest_for_us_skips_conversion() {
        let geo = GeoInfo::for_country(Some("US")).unwrap();
        let suggested = suggest_for_geo(&geo, &snapshot(&[("EUR", 0.9)]));

        assert!(!suggested.converted);
        assert_eq!(suggested.amounts, base_suggested_amounts());
    }

    #[test]
    fn test_suggest_without_rate_keeps_usd_amounts() {
        let geo = GeoInfo::for_country(Some("GB")).unwrap();
        let suggested = suggest_for_geo(&geo, &snapshot(&[("EUR", 0.9)]));

        assert!(!suggested.converted);
        assert_eq!(suggested.country, "GB");
        assert_eq!(suggested.currency, Currency::usd());
        assert_eq!(suggested.symbol, "$");
        assert_eq!(suggested.amounts, vec![dec!(3), dec!(10), dec!(25), dec!(50)]);
    }
}
