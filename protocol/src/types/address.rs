//! # Addresses and Resource Identifiers
//!
//! The ledger uses two fixed-width identifiers depending on role:
//!
//! - [`Address`]: 20 bytes, account-style. Owns outputs, signs inputs.
//! - [`ResourceId`]: 32 bytes, a content hash naming a deployed resource
//!   (contract, model, blob).
//!
//! Fields that accept either (the payload's `to`) use [`Recipient`].
//! All three render as `0x`-prefixed lowercase hex and parse with or
//! without the prefix.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::{ACCOUNT_ADDRESS_LENGTH, RESOURCE_ID_LENGTH};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors produced when decoding fixed-width identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// The byte string has the wrong width for its role.
    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// The string is not valid hex.
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

/// Decodes a hex string (optionally `0x`-prefixed) into exactly `N` bytes.
pub(crate) fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], AddressError> {
    let raw = strip_hex_prefix(s);
    let bytes = hex::decode(raw).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| AddressError::InvalidLength {
            expected: N,
            actual: bytes.len(),
        })
}

/// Strips a leading `0x`/`0X` if present.
pub(crate) fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Lowercase hex with the `0x` prefix.
pub fn prefixed_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Generates constructors, hex helpers, `Display`, `FromStr` and hex-string
/// serde for a fixed-width byte newtype. The plain arm adds a full-width
/// `Debug`; the `@core` arm leaves `Debug` to the caller.
macro_rules! fixed_width_id {
    ($name:ident, $len:expr) => {
        $crate::types::address::fixed_width_id!(@core $name, $len);

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }
    };
    (@core $name:ident, $len:expr) => {
        impl $name {
            /// Wraps a raw fixed-width value.
            pub fn from_bytes(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Builds the identifier from a slice, checking its width.
            pub fn from_slice(bytes: &[u8]) -> Result<Self, $crate::types::address::AddressError> {
                let arr: [u8; $len] = bytes.try_into().map_err(|_| {
                    $crate::types::address::AddressError::InvalidLength {
                        expected: $len,
                        actual: bytes.len(),
                    }
                })?;
                Ok(Self(arr))
            }

            /// Returns the raw bytes.
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Returns the `0x`-prefixed lowercase hex form.
            pub fn to_hex(&self) -> String {
                $crate::types::address::prefixed_hex(&self.0)
            }

            /// Parses hex with or without the `0x` prefix.
            pub fn from_hex(s: &str) -> Result<Self, $crate::types::address::AddressError> {
                $crate::types::address::decode_fixed::<$len>(s).map(Self)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::types::address::AddressError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use fixed_width_id;

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 20-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ACCOUNT_ADDRESS_LENGTH]);

fixed_width_id!(Address, ACCOUNT_ADDRESS_LENGTH);

// ---------------------------------------------------------------------------
// ResourceId
// ---------------------------------------------------------------------------

/// A 32-byte content hash identifying a deployed resource or contract.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId([u8; RESOURCE_ID_LENGTH]);

fixed_width_id!(ResourceId, RESOURCE_ID_LENGTH);

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Destination of an operation: an account or a resource.
///
/// The two widths never overlap, so a raw byte string decodes to at most
/// one variant.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recipient {
    Account(Address),
    Resource(ResourceId),
}

impl Recipient {
    /// Raw bytes of whichever identifier this is.
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Recipient::Account(a) => a.as_bytes(),
            Recipient::Resource(r) => r.as_bytes(),
        }
    }

    /// Decodes by width: 20 bytes is an account, 32 a resource.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
        match bytes.len() {
            ACCOUNT_ADDRESS_LENGTH => Address::from_slice(bytes).map(Recipient::Account),
            RESOURCE_ID_LENGTH => ResourceId::from_slice(bytes).map(Recipient::Resource),
            actual => Err(AddressError::InvalidLength {
                expected: ACCOUNT_ADDRESS_LENGTH,
                actual,
            }),
        }
    }

    pub fn to_hex(&self) -> String {
        prefixed_hex(self.as_slice())
    }

    pub fn from_hex(s: &str) -> Result<Self, AddressError> {
        let bytes = hex::decode(strip_hex_prefix(s))
            .map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl From<Address> for Recipient {
    fn from(a: Address) -> Self {
        Recipient::Account(a)
    }
}

impl From<ResourceId> for Recipient {
    fn from(r: ResourceId) -> Self {
        Recipient::Resource(r)
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
