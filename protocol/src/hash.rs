//! # Hashing Utilities
//!
//! Draft ids use double SHA-256, the construction the ledger uses for
//! transaction hashes.

use sha2::{Digest, Sha256};

/// SHA-256 as a fixed-size array.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// `SHA-256(SHA-256(data))`.
///
/// # Example
///
/// ```
/// use cairn_protocol::hash::double_sha256;
///
/// let id = double_sha256(b"draft bytes");
/// assert_eq!(id.len(), 32);
/// ```
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}
