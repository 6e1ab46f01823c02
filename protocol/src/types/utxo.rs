//! Unspent outputs as reported by the ledger query collaborator.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::address::{decode_fixed, prefixed_hex, AddressError};
use super::amount::Amount;
use super::token::TokenId;

// ---------------------------------------------------------------------------
// OutPoint
// ---------------------------------------------------------------------------

/// Reference to a specific output of a prior transaction.
///
/// Opaque to this crate: it is carried from the query result into the
/// draft's input list and never interpreted.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    /// Hash of the transaction that created the output.
    #[serde(with = "tx_hash_hex")]
    pub tx_hash: [u8; 32],
    /// Position of the output within that transaction.
    pub index: u32,
}

impl OutPoint {
    pub fn new(tx_hash: [u8; 32], index: u32) -> Self {
        Self { tx_hash, index }
    }

    /// Canonical bytes: 32-byte hash followed by little-endian index.
    pub fn to_bytes(&self) -> [u8; 36] {
        let mut out = [0u8; 36];
        out[..32].copy_from_slice(&self.tx_hash);
        out[32..].copy_from_slice(&self.index.to_le_bytes());
        out
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", prefixed_hex(&self.tx_hash), self.index)
    }
}

impl fmt::Debug for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OutPoint({self})")
    }
}

mod tx_hash_hex {
    use super::{decode_fixed, prefixed_hex, AddressError};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(hash: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&prefixed_hex(hash))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(deserializer)?;
        decode_fixed::<32>(&s).map_err(|e: AddressError| serde::de::Error::custom(e))
    }
}

// ---------------------------------------------------------------------------
// Utxo
// ---------------------------------------------------------------------------

/// A spendable output owned by the queried address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub outpoint: OutPoint,
    /// Block height at which the output was created.
    pub height: u64,
    #[serde(with = "super::amount::decimal")]
    pub amount: Amount,
    /// `None` is the native asset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<TokenId>,
}

impl Utxo {
    pub fn new(outpoint: OutPoint, height: u64, amount: Amount, token_id: Option<TokenId>) -> Self {
        Self {
            outpoint,
            height,
            amount,
            token_id,
        }
    }

    /// Exact token-identity match, treating `None` as the native asset.
    pub fn matches_token(&self, filter: Option<&TokenId>) -> bool {
        self.token_id.as_ref() == filter
    }
}
