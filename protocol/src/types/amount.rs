//! Integer amounts in the smallest ledger unit.
//!
//! Amounts are `u128` and cross every serialization boundary as decimal
//! strings, so JSON consumers with 53-bit numbers never round them.

/// Value in the smallest indivisible unit of an asset.
pub type Amount = u128;

/// Parses a decimal-string amount. Rejects signs, whitespace and empties.
pub fn parse_amount(s: &str) -> Option<Amount> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Sums amounts, returning `None` on overflow.
pub fn checked_sum<I>(amounts: I) -> Option<Amount>
where
    I: IntoIterator<Item = Amount>,
{
    amounts
        .into_iter()
        .try_fold(0 as Amount, |acc, a| acc.checked_add(a))
}

/// Serde adapter: `Amount` as a decimal string.
///
/// ```ignore
/// #[serde(with = "crate::types::amount::decimal")]
/// amount: Amount,
/// ```
pub mod decimal {
    use super::{parse_amount, Amount};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_amount(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid decimal amount: {s:?}")))
    }
}
