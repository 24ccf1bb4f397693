//! Value objects shared across the transaction domain.

use common::SkuId;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A 3-letter ISO 4217 currency code, stored uppercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency([u8; 3]);

impl Currency {
    /// US dollars, the default currency of the reference deployment.
    pub const USD: Currency = Currency(*b"USD");

    /// Parses and validates a currency code.
    pub fn new(code: &str) -> Result<Self, DomainError> {
        let bytes = code.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_alphabetic) {
            return Err(DomainError::InvalidCurrency {
                raw: code.to_string(),
            });
        }
        let mut buf = [0u8; 3];
        for (dst, src) in buf.iter_mut().zip(bytes) {
            *dst = src.to_ascii_uppercase();
        }
        Ok(Self(buf))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        // Construction guarantees ASCII letters.
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Currency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Currency::new(&value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.as_str().to_string()
    }
}

/// A monetary amount in minor units of a single currency.
///
/// Amounts are never negative; arithmetic across currencies fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    minor_units: i64,
    currency: Currency,
}

impl Money {
    /// Creates a new amount, rejecting negative values.
    pub fn new(minor_units: i64, currency: Currency) -> Result<Self, DomainError> {
        if minor_units < 0 {
            return Err(DomainError::NegativeAmount { minor_units });
        }
        Ok(Self {
            minor_units,
            currency,
        })
    }

    /// Returns the zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self {
            minor_units: 0,
            currency,
        }
    }

    /// Returns the amount in minor units.
    pub fn minor_units(&self) -> i64 {
        self.minor_units
    }

    /// Returns the currency.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.minor_units == 0
    }

    /// Adds another amount of the same currency.
    pub fn add(self, other: Money) -> Result<Money, DomainError> {
        if self.currency != other.currency {
            return Err(DomainError::CurrencyMismatch {
                left: self.currency,
                right: other.currency,
            });
        }
        Ok(Money {
            minor_units: self.minor_units + other.minor_units,
            currency: self.currency,
        })
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{:02} {}",
            self.minor_units / 100,
            self.minor_units.abs() % 100,
            self.currency
        )
    }
}

/// A weight in grams.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weight {
    grams: f64,
}

impl Weight {
    /// Creates a new weight, rejecting negative or non-finite values.
    pub fn new(grams: f64) -> Result<Self, DomainError> {
        if !grams.is_finite() || grams < 0.0 {
            return Err(DomainError::InvalidWeight { grams });
        }
        Ok(Self { grams })
    }

    /// Returns the zero weight.
    pub fn zero() -> Self {
        Self { grams: 0.0 }
    }

    /// Returns the weight in grams.
    pub fn grams(&self) -> f64 {
        self.grams
    }

    /// Returns true if this weight is within `tolerance` grams of `other`.
    pub fn is_within_tolerance(&self, other: Weight, tolerance: f64) -> bool {
        (self.grams - other.grams).abs() <= tolerance
    }

    /// Adds another weight.
    pub fn add(self, other: Weight) -> Weight {
        Weight {
            grams: self.grams + other.grams,
        }
    }
}

impl std::fmt::Display for Weight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}g", self.grams)
    }
}

/// A product detection reconciled against the catalog.
///
/// Carries the catalog's authoritative name and price together with the
/// device-reported confidence. Produced only by resolving a raw
/// detection through the catalog resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedItem {
    /// Catalog identifier of the resolved SKU.
    pub sku_id: SkuId,

    /// The product code the device reported (e.g. "APPLE-001").
    pub code: String,

    /// Human-readable product name from the catalog.
    pub name: String,

    /// Device-reported detection confidence in [0, 1].
    pub confidence: f64,

    /// Authoritative unit price from the catalog.
    pub unit_price: Money,
}

impl DetectedItem {
    /// Creates a new detected item.
    pub fn new(
        sku_id: SkuId,
        code: impl Into<String>,
        name: impl Into<String>,
        confidence: f64,
        unit_price: Money,
    ) -> Self {
        Self {
            sku_id,
            code: code.into(),
            name: name.into(),
            confidence,
            unit_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(minor_units: i64) -> Money {
        Money::new(minor_units, Currency::USD).unwrap()
    }

    #[test]
    fn currency_normalizes_to_uppercase() {
        let c = Currency::new("usd").unwrap();
        assert_eq!(c, Currency::USD);
        assert_eq!(c.as_str(), "USD");
    }

    #[test]
    fn currency_rejects_bad_codes() {
        for raw in ["US", "USDD", "U$D", "", "12A"] {
            assert!(matches!(
                Currency::new(raw),
                Err(DomainError::InvalidCurrency { .. })
            ));
        }
    }

    #[test]
    fn currency_serializes_as_string() {
        let json = serde_json::to_string(&Currency::USD).unwrap();
        assert_eq!(json, "\"USD\"");
        let back: Currency = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Currency::USD);
    }

    #[test]
    fn money_rejects_negative_amounts() {
        assert!(matches!(
            Money::new(-1, Currency::USD),
            Err(DomainError::NegativeAmount { minor_units: -1 })
        ));
    }

    #[test]
    fn money_equality_is_by_value() {
        assert_eq!(usd(250), usd(250));
        assert_ne!(usd(250), usd(251));
        assert_ne!(usd(250), Money::new(250, Currency::new("EUR").unwrap()).unwrap());
    }

    #[test]
    fn money_add_is_commutative_within_a_currency() {
        let a = usd(250);
        let b = usd(230);
        assert_eq!(a.add(b).unwrap(), b.add(a).unwrap());
        assert_eq!(a.add(b).unwrap().minor_units(), 480);
    }

    #[test]
    fn money_add_fails_across_currencies() {
        let eur = Money::new(100, Currency::new("EUR").unwrap()).unwrap();
        let result = usd(100).add(eur);
        assert!(matches!(result, Err(DomainError::CurrencyMismatch { .. })));
    }

    #[test]
    fn money_display() {
        assert_eq!(usd(480).to_string(), "4.80 USD");
        assert_eq!(usd(5).to_string(), "0.05 USD");
    }

    #[test]
    fn weight_rejects_negative_and_non_finite() {
        assert!(Weight::new(-0.1).is_err());
        assert!(Weight::new(f64::NAN).is_err());
        assert!(Weight::new(f64::INFINITY).is_err());
        assert!(Weight::new(0.0).is_ok());
    }

    #[test]
    fn weight_tolerance_is_symmetric() {
        let a = Weight::new(290.0).unwrap();
        let b = Weight::new(295.0).unwrap();
        assert_eq!(
            a.is_within_tolerance(b, 10.0),
            b.is_within_tolerance(a, 10.0)
        );
        assert!(a.is_within_tolerance(b, 5.0));
        assert!(!a.is_within_tolerance(b, 4.9));
    }

    #[test]
    fn weight_add() {
        let total = Weight::new(150.0).unwrap().add(Weight::new(140.0).unwrap());
        assert_eq!(total.grams(), 290.0);
    }

    #[test]
    fn detected_item_serialization_roundtrip() {
        let item = DetectedItem::new(common::SkuId::new(), "APPLE-001", "Apple", 0.95, usd(250));
        let json = serde_json::to_string(&item).unwrap();
        let back: DetectedItem = serde_json::from_str(&json).unwrap();
        assert_eq!(item, back);
    }
}
