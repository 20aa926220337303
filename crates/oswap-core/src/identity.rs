//! # Identity Newtypes
//!
//! Identifiers for the three namespaces the escrow ledger deals in:
//! accounts (depositors, buyers, the ledger itself), assets, and orders.
//!
//! String identifiers ([`AccountId`], [`AssetId`]) validate format at
//! construction and on deserialization. [`OrderId`] is a sequence number
//! assigned by the ledger and is always valid.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Maximum length of a string identifier.
pub const MAX_IDENTIFIER_LEN: usize = 128;

fn validate_identifier(kind: &'static str, raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyIdentifier { kind });
    }
    if trimmed.len() > MAX_IDENTIFIER_LEN {
        return Err(ValidationError::IdentifierTooLong {
            kind,
            len: trimmed.len(),
            max: MAX_IDENTIFIER_LEN,
        });
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | ':' | '@' | '-');
    if !trimmed.chars().all(allowed) {
        return Err(ValidationError::InvalidIdentifier {
            kind,
            value: raw.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

// ---------------------------------------------------------------------------
// String identifiers
// ---------------------------------------------------------------------------

/// Identity of a party that can hold balances: a depositor, a buyer, or the
/// escrow ledger's own custody account.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    /// Create a validated account identifier.
    pub fn new(s: impl AsRef<str>) -> Result<Self, ValidationError> {
        validate_identifier("account", s.as_ref()).map(Self)
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier of a fungible asset (a token symbol or contract address).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetId(String);

impl AssetId {
    /// Create a validated asset identifier.
    pub fn new(s: impl AsRef<str>) -> Result<Self, ValidationError> {
        validate_identifier("asset", s.as_ref()).map(Self)
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! string_id_impls {
    ($ty:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $ty {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = ValidationError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::new(s)
            }
        }

        impl From<$ty> for String {
            fn from(id: $ty) -> String {
                id.0
            }
        }
    };
}

string_id_impls!(AccountId);
string_id_impls!(AssetId);

// ---------------------------------------------------------------------------
// Order identifier
// ---------------------------------------------------------------------------

/// Sequence number of an escrow order.
///
/// Assigned by the ledger starting at zero, incremented once per accepted
/// deposit, never reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct OrderId(u64);

impl OrderId {
    /// The first identifier a fresh ledger assigns.
    pub const FIRST: OrderId = OrderId(0);

    /// Wrap a raw sequence number.
    pub fn new(n: u64) -> Self {
        Self(n)
    }

    /// The raw sequence number.
    pub fn value(&self) -> u64 {
        self.0
    }

    /// The identifier that follows this one, or `None` if the sequence is
    /// exhausted.
    pub fn next(&self) -> Option<OrderId> {
        self.0.checked_add(1).map(OrderId)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrderId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(OrderId)
            .map_err(|_| ValidationError::InvalidOrderId(s.to_string()))
    }
}

impl From<u64> for OrderId {
    fn from(n: u64) -> Self {
        Self(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_id_accepts_address_like_values() {
        assert!(AccountId::new("alice").is_ok());
        assert!(AccountId::new("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").is_ok());
        assert!(AccountId::new("escrow:orderswap").is_ok());
        assert!(AccountId::new("bob@example.org").is_ok());
    }

    #[test]
    fn account_id_trims_whitespace() {
        let id = AccountId::new("  alice ").unwrap();
        assert_eq!(id.as_str(), "alice");
    }

    #[test]
    fn empty_identifier_rejected() {
        assert_eq!(
            AccountId::new("   ").unwrap_err(),
            ValidationError::EmptyIdentifier { kind: "account" }
        );
        assert_eq!(
            AssetId::new("").unwrap_err(),
            ValidationError::EmptyIdentifier { kind: "asset" }
        );
    }

    #[test]
    fn long_identifier_rejected() {
        let long = "a".repeat(MAX_IDENTIFIER_LEN + 1);
        assert!(matches!(
            AssetId::new(&long),
            Err(ValidationError::IdentifierTooLong { .. })
        ));
        assert!(AssetId::new("a".repeat(MAX_IDENTIFIER_LEN)).is_ok());
    }

    #[test]
    fn unsupported_characters_rejected() {
        assert!(AccountId::new("alice bob").is_err());
        assert!(AccountId::new("alice/bob").is_err());
        assert!(AssetId::new("TK\u{0}A").is_err());
    }

    #[test]
    fn string_ids_deserialize_with_validation() {
        let ok: AssetId = serde_json::from_str("\"TKA\"").unwrap();
        assert_eq!(ok.as_str(), "TKA");
        assert!(serde_json::from_str::<AssetId>("\"\"").is_err());
        assert!(serde_json::from_str::<AccountId>("\"a b\"").is_err());
    }

    #[test]
    fn string_ids_serialize_as_plain_strings() {
        let id = AccountId::new("alice").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"alice\"");
    }

    #[test]
    fn order_id_sequence() {
        assert_eq!(OrderId::FIRST.value(), 0);
        assert_eq!(OrderId::FIRST.next(), Some(OrderId::new(1)));
        assert_eq!(OrderId::new(u64::MAX).next(), None);
    }

    #[test]
    fn order_id_parse() {
        assert_eq!("42".parse::<OrderId>().unwrap(), OrderId::new(42));
        assert!("-1".parse::<OrderId>().is_err());
        assert!("abc".parse::<OrderId>().is_err());
    }

    #[test]
    fn order_id_serializes_as_number() {
        assert_eq!(serde_json::to_string(&OrderId::new(7)).unwrap(), "7");
        assert_eq!(serde_json::from_str::<OrderId>("7").unwrap(), OrderId::new(7));
    }
}
