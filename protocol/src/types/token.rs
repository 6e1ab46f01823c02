//! # Token Identity
//!
//! A [`TokenId`] distinguishes a fungible asset class from the ledger's
//! native asset. The native asset has no identifier at all: everywhere in
//! the crate "native" is spelled `Option::<TokenId>::None`, never a sentinel
//! value, so the selector's exact-match filter cannot confuse the two.

use std::fmt;

use super::address::fixed_width_id;
use crate::config::TOKEN_ID_LENGTH;

// ---------------------------------------------------------------------------
// TokenId
// ---------------------------------------------------------------------------

/// A 32-byte token identifier as issued by the ledger.
///
/// On the wire it is a `0x`-prefixed lowercase hex string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId([u8; TOKEN_ID_LENGTH]);

fixed_width_id!(@core TokenId, TOKEN_ID_LENGTH);

// Abbreviated: token ids show up in most log lines.
impl fmt::Debug for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenId({}...)", &self.to_hex()[..14])
    }
}

/// Renders an optional token identity for logs: `native` or the hex id.
pub fn token_label(token: Option<&TokenId>) -> String {
    match token {
        Some(id) => id.to_hex(),
        None => "native".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
