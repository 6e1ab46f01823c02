//! # External Collaborators
//!
//! The builder never talks to the network or holds keys itself. Everything
//! outside the construction core is reached through three traits:
//!
//! - [`LedgerQuery`]: fresh UTXO snapshots for an address.
//! - [`LedgerSubmit`]: serialization, signature hashes, finalization,
//!   broadcast and resource deployment, all performed by the node.
//! - [`Wallet`]: produces signatures over hashes the node computed.
//!
//! Handles are always passed explicitly to the call that uses them. There is
//! no default wallet or ledger stored anywhere in the crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transaction::draft::TransactionDraft;
use crate::types::{Address, ResourceId, TokenId, Utxo};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure reported by a collaborator implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    /// The request never got a protocol-level answer.
    #[error("network: {0}")]
    Network(String),

    /// The node answered with a rejection.
    #[error("ledger {code}: {message}")]
    Ledger { code: u16, message: String },
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Outcome of a broadcast as reported by the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastResult {
    /// Hex transaction hash assigned by the node.
    pub tx_hash: String,
    pub accepted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Read access to the ledger's UTXO set.
#[async_trait]
pub trait LedgerQuery: Send + Sync {
    /// Returns the unspent outputs of `address`.
    ///
    /// `token_id` is a hint; implementations may return outputs of other
    /// assets and the selector filters them anyway.
    async fn query_utxos(
        &self,
        address: &Address,
        token_id: Option<&TokenId>,
    ) -> Result<Vec<Utxo>, CollaboratorError>;
}

/// Node-side transaction handling.
#[async_trait]
pub trait LedgerSubmit: Send + Sync {
    /// Serializes the unsigned draft into the node's wire format.
    async fn build_transaction(
        &self,
        draft: &TransactionDraft,
    ) -> Result<Vec<u8>, CollaboratorError>;

    /// Hash that the owner of input `input_index` must sign.
    async fn compute_signature_hash(
        &self,
        draft: &TransactionDraft,
        input_index: usize,
    ) -> Result<Vec<u8>, CollaboratorError>;

    /// Attaches one signature per input and returns the signed bytes.
    async fn finalize_transaction(
        &self,
        draft: &TransactionDraft,
        signatures: &[Vec<u8>],
    ) -> Result<Vec<u8>, CollaboratorError>;

    async fn broadcast(&self, signed_tx_hex: &str) -> Result<BroadcastResult, CollaboratorError>;

    /// Stores `bytes` on the ledger and returns its content id.
    async fn deploy_resource(
        &self,
        bytes: &[u8],
        mime_type: Option<&str>,
    ) -> Result<ResourceId, CollaboratorError>;
}

/// External signer. Key material stays on the other side of this trait.
#[async_trait]
pub trait Wallet: Send + Sync {
    /// The account whose inputs this wallet can sign.
    fn address(&self) -> Address;

    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CollaboratorError>;
}
