//! # Amounts
//!
//! Quantities of a fungible asset in its smallest unit. Token quantities
//! routinely carry 18 decimals, so the backing integer is `u128` and the
//! serialized form is a decimal string (JSON numbers lose precision past
//! 2^53 in most clients). Deserialization also accepts non-negative JSON
//! integers.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// Largest `decimals` value whose scale factor fits in a `u128`.
pub const MAX_DECIMALS: u8 = 38;

/// A non-negative asset quantity in smallest units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u128);

impl Amount {
    /// The zero amount.
    pub const ZERO: Amount = Amount(0);

    /// Wrap a raw quantity of smallest units.
    pub const fn new(units: u128) -> Self {
        Self(units)
    }

    /// The raw quantity in smallest units.
    pub const fn value(&self) -> u128 {
        self.0
    }

    /// Whether this amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition. `None` on overflow.
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Checked subtraction. `None` if `other > self`.
    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }

    /// Parse a human-readable decimal quantity into smallest units.
    ///
    /// `Amount::parse_units("100", 18)` is `100 * 10^18`. Fractional digits
    /// beyond `decimals` are rejected rather than rounded.
    pub fn parse_units(s: &str, decimals: u8) -> Result<Amount, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidAmount {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        if decimals > MAX_DECIMALS {
            return Err(invalid("decimals exceed 38"));
        }
        let trimmed = s.trim();
        let (whole, frac) = match trimmed.split_once('.') {
            Some((w, f)) => (w, f),
            None => (trimmed, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid("empty quantity"));
        }
        if frac.contains('.') {
            return Err(invalid("more than one decimal point"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("only digits and a single decimal point are allowed"));
        }
        if frac.len() > usize::from(decimals) {
            return Err(invalid("more fractional digits than the asset supports"));
        }

        let scale = 10u128.pow(u32::from(decimals));
        let whole_units = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<u128>()
                .map_err(|_| invalid("quantity overflows 128 bits"))?
        };
        let frac_units = if frac.is_empty() {
            0
        } else {
            let pad = 10u128.pow(u32::from(decimals) - frac.len() as u32);
            frac.parse::<u128>()
                .map_err(|_| invalid("quantity overflows 128 bits"))?
                * pad
        };

        whole_units
            .checked_mul(scale)
            .and_then(|w| w.checked_add(frac_units))
            .map(Amount)
            .ok_or_else(|| invalid("quantity overflows 128 bits"))
    }

    /// Render as a human-readable decimal quantity with trailing zeros of
    /// the fractional part removed.
    pub fn format_units(&self, decimals: u8) -> String {
        let digits = self.0.to_string();
        let decimals = usize::from(decimals);
        if decimals == 0 {
            return digits;
        }
        let padded = if digits.len() <= decimals {
            format!("{}{}", "0".repeat(decimals + 1 - digits.len()), digits)
        } else {
            digits
        };
        let (whole, frac) = padded.split_at(padded.len() - decimals);
        let frac = frac.trim_end_matches('0');
        if frac.is_empty() {
            whole.to_string()
        } else {
            format!("{whole}.{frac}")
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Amount::parse_units(s, 0)
    }
}

impl From<u128> for Amount {
    fn from(units: u128) -> Self {
        Self(units)
    }
}

impl From<u64> for Amount {
    fn from(units: u64) -> Self {
        Self(u128::from(units))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative integer or a decimal string of smallest units")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        v.parse::<Amount>().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(Amount::from(v))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Amount, E> {
        Ok(Amount::new(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        u64::try_from(v)
            .map(Amount::from)
            .map_err(|_| E::custom(format!("amount must be non-negative, got {v}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEI: u128 = 1_000_000_000_000_000_000;

    #[test]
    fn parse_units_whole() {
        assert_eq!(Amount::parse_units("100", 18).unwrap().value(), 100 * WEI);
        assert_eq!(Amount::parse_units("20", 18).unwrap().value(), 20 * WEI);
        assert_eq!(Amount::parse_units("7", 0).unwrap().value(), 7);
    }

    #[test]
    fn parse_units_fractional() {
        assert_eq!(Amount::parse_units("1.5", 18).unwrap().value(), 15 * WEI / 10);
        assert_eq!(Amount::parse_units(".25", 2).unwrap().value(), 25);
        assert_eq!(Amount::parse_units("3.", 2).unwrap().value(), 300);
    }

    #[test]
    fn parse_units_rejects_excess_precision() {
        assert!(Amount::parse_units("0.001", 2).is_err());
    }

    #[test]
    fn parse_units_rejects_garbage() {
        assert!(Amount::parse_units("", 18).is_err());
        assert!(Amount::parse_units(".", 18).is_err());
        assert!(Amount::parse_units("-1", 18).is_err());
        assert!(Amount::parse_units("1e18", 18).is_err());
        assert!(Amount::parse_units("1.2.3", 18).is_err());
        assert!(Amount::parse_units("1", 39).is_err());
    }

    #[test]
    fn parse_units_rejects_overflow() {
        let max = u128::MAX.to_string();
        assert!(Amount::parse_units(&max, 0).is_ok());
        assert!(Amount::parse_units(&max, 1).is_err());
    }

    #[test]
    fn format_units_renders_decimals() {
        assert_eq!(Amount::new(100 * WEI).format_units(18), "100");
        assert_eq!(Amount::new(15 * WEI / 10).format_units(18), "1.5");
        assert_eq!(Amount::new(1).format_units(18), "0.000000000000000001");
        assert_eq!(Amount::ZERO.format_units(18), "0");
        assert_eq!(Amount::new(42).format_units(0), "42");
    }

    #[test]
    fn checked_arithmetic() {
        let a = Amount::new(10);
        let b = Amount::new(3);
        assert_eq!(a.checked_sub(b), Some(Amount::new(7)));
        assert_eq!(b.checked_sub(a), None);
        assert_eq!(Amount::new(u128::MAX).checked_add(Amount::new(1)), None);
    }

    #[test]
    fn serializes_as_string() {
        let amount = Amount::new(100 * WEI);
        assert_eq!(
            serde_json::to_string(&amount).unwrap(),
            "\"100000000000000000000\""
        );
    }

    #[test]
    fn deserializes_from_string_or_integer() {
        let from_str: Amount = serde_json::from_str("\"100000000000000000000\"").unwrap();
        assert_eq!(from_str.value(), 100 * WEI);
        let from_int: Amount = serde_json::from_str("250").unwrap();
        assert_eq!(from_int.value(), 250);
        assert!(serde_json::from_str::<Amount>("-5").is_err());
        assert!(serde_json::from_str::<Amount>("\"12abc\"").is_err());
        assert!(serde_json::from_str::<Amount>("1.5").is_err());
    }
}
