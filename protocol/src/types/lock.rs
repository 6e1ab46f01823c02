//! # Lock Specifications
//!
//! The spending condition attached to an output. Business services pick
//! the variant; the selector and assembler only ever see a finished
//! [`LockSpec`] and never branch on its contents.
//!
//! Composite conditions nest: staking is a height lock around a contract
//! lock, vesting is a time lock around a single-key lock. A state output
//! carries data rather than guarding value, so it cannot sit inside a
//! time or height lock.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::address::{Address, ResourceId};

/// Upper bound on multi-key participants.
pub const MAX_MULTI_KEYS: usize = 16;

/// Errors raised by lock constructors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    #[error("multi-key lock needs at least one key")]
    NoKeys,

    #[error("multi-key lock allows at most {max} keys, got {got}")]
    TooManyKeys { max: usize, got: usize },

    #[error("threshold {threshold} out of range 1..={keys}")]
    InvalidThreshold { threshold: u8, keys: usize },

    #[error("duplicate key {0} in multi-key lock")]
    DuplicateKey(Address),

    #[error("state outputs cannot be wrapped in a {0}")]
    StateNotWrappable(&'static str),
}

/// Spending condition of an output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LockSpec {
    /// Spendable by one key.
    SingleKey { key: Address },

    /// Spendable by any `threshold` of `keys`.
    MultiKey { threshold: u8, keys: Vec<Address> },

    /// `inner` becomes spendable at or after `unlock_at` (unix seconds).
    TimeLock { unlock_at: u64, inner: Box<LockSpec> },

    /// `inner` becomes spendable at or after block `unlock_height`.
    HeightLock {
        unlock_height: u64,
        inner: Box<LockSpec>,
    },

    /// Spending is governed by a deployed contract.
    Contract {
        contract: ResourceId,
        #[serde(with = "hex_bytes")]
        data: Vec<u8>,
    },

    /// Carries application state (e.g. a governance proposal).
    State {
        schema: String,
        #[serde(with = "hex_bytes")]
        data: Vec<u8>,
    },
}

impl LockSpec {
    pub fn single_key(key: Address) -> Self {
        LockSpec::SingleKey { key }
    }

    pub fn multi_key(threshold: u8, keys: Vec<Address>) -> Result<Self, LockError> {
        if keys.is_empty() {
            return Err(LockError::NoKeys);
        }
        if keys.len() > MAX_MULTI_KEYS {
            return Err(LockError::TooManyKeys {
                max: MAX_MULTI_KEYS,
                got: keys.len(),
            });
        }
        if threshold == 0 || threshold as usize > keys.len() {
            return Err(LockError::InvalidThreshold {
                threshold,
                keys: keys.len(),
            });
        }
        for (i, key) in keys.iter().enumerate() {
            if keys[..i].contains(key) {
                return Err(LockError::DuplicateKey(*key));
            }
        }
        Ok(LockSpec::MultiKey { threshold, keys })
    }

    pub fn time_lock(unlock_at: u64, inner: LockSpec) -> Result<Self, LockError> {
        if inner.is_state() {
            return Err(LockError::StateNotWrappable("time lock"));
        }
        Ok(LockSpec::TimeLock {
            unlock_at,
            inner: Box::new(inner),
        })
    }

    pub fn height_lock(unlock_height: u64, inner: LockSpec) -> Result<Self, LockError> {
        if inner.is_state() {
            return Err(LockError::StateNotWrappable("height lock"));
        }
        Ok(LockSpec::HeightLock {
            unlock_height,
            inner: Box::new(inner),
        })
    }

    pub fn contract(contract: ResourceId, data: Vec<u8>) -> Self {
        LockSpec::Contract { contract, data }
    }

    pub fn state(schema: impl Into<String>, data: Vec<u8>) -> Self {
        LockSpec::State {
            schema: schema.into(),
            data,
        }
    }

    pub fn is_state(&self) -> bool {
        matches!(self, LockSpec::State { .. })
    }

    /// Short variant name for logs.
    pub fn variant_name(&self) -> &'static str {
        match self {
            LockSpec::SingleKey { .. } => "single_key",
            LockSpec::MultiKey { .. } => "multi_key",
            LockSpec::TimeLock { .. } => "time_lock",
            LockSpec::HeightLock { .. } => "height_lock",
            LockSpec::Contract { .. } => "contract",
            LockSpec::State { .. } => "state",
        }
    }

    /// Deterministic byte encoding used in draft ids.
    ///
    /// Tag byte per variant, fixed-width little-endian integers,
    /// u32 length prefixes on variable data.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(64);
        self.write_canonical(&mut buf);
        buf
    }

    fn write_canonical(&self, buf: &mut Vec<u8>) {
        match self {
            LockSpec::SingleKey { key } => {
                buf.push(0x01);
                buf.extend_from_slice(key.as_bytes());
            }
            LockSpec::MultiKey { threshold, keys } => {
                buf.push(0x02);
                buf.push(*threshold);
                buf.extend_from_slice(&(keys.len() as u32).to_le_bytes());
                for key in keys {
                    buf.extend_from_slice(key.as_bytes());
                }
            }
            LockSpec::TimeLock { unlock_at, inner } => {
                buf.push(0x03);
                buf.extend_from_slice(&unlock_at.to_le_bytes());
                inner.write_canonical(buf);
            }
            LockSpec::HeightLock {
                unlock_height,
                inner,
            } => {
                buf.push(0x04);
                buf.extend_from_slice(&unlock_height.to_le_bytes());
                inner.write_canonical(buf);
            }
            LockSpec::Contract { contract, data } => {
                buf.push(0x05);
                buf.extend_from_slice(contract.as_bytes());
                buf.extend_from_slice(&(data.len() as u32).to_le_bytes());
                buf.extend_from_slice(data);
            }
            LockSpec::State { schema, data } => {
                buf.push(0x06);
                buf.extend_from_slice(&(schema.len() as u32).to_le_bytes());
                buf.extend_from_slice(schema.as_bytes());
                buf.extend_from_slice(&(data.len() as u32).to_le_bytes());
                buf.extend_from_slice(data);
            }
        }
    }
}

/// Serde adapter: `Vec<u8>` as `0x`-prefixed hex.
pub(crate) mod hex_bytes {
    use crate::types::address::{prefixed_hex, strip_hex_prefix};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&prefixed_hex(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(strip_hex_prefix(&s)).map_err(serde::de::Error::custom)
    }
}
