//! The unsigned transaction draft and its metadata.
//!
//! A [`TransactionDraft`] is transient: it is built, handed to the submit
//! collaborator for signature hashes, signed externally, broadcast, and
//! dropped. Nothing here is persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::fee::FeeBearer;
use super::payload::Payload;
use crate::error::DraftError;
use crate::hash::double_sha256;
use crate::types::{Address, Amount, Output, TokenId, Utxo};

// ---------------------------------------------------------------------------
// OperationKind
// ---------------------------------------------------------------------------

/// The business operation a draft implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Transfer,
    BatchTransfer,
    Burn,
    Stake,
    Delegate,
    Escrow,
    Vesting,
    Governance,
    ContractCall,
}

impl OperationKind {
    /// Wire name, also used as the payload's `method` extension.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transfer => "transfer",
            Self::BatchTransfer => "batch_transfer",
            Self::Burn => "burn",
            Self::Stake => "stake",
            Self::Delegate => "delegate",
            Self::Escrow => "escrow",
            Self::Vesting => "vesting",
            Self::Governance => "governance",
            Self::ContractCall => "contract_call",
        }
    }

    /// Kinds whose outputs are built by a business service with its own
    /// lock specification.
    pub fn is_locked(&self) -> bool {
        !matches!(self, Self::Transfer | Self::BatchTransfer | Self::Burn)
    }

    fn tag(&self) -> u8 {
        match self {
            Self::Transfer => 0x01,
            Self::BatchTransfer => 0x02,
            Self::Burn => 0x03,
            Self::Stake => 0x04,
            Self::Delegate => 0x05,
            Self::Escrow => 0x06,
            Self::Vesting => 0x07,
            Self::Governance => 0x08,
            Self::ContractCall => 0x09,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DraftMetadata
// ---------------------------------------------------------------------------

/// Accounting summary of a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftMetadata {
    pub operation: OperationKind,
    pub sender: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<TokenId>,
    #[serde(with = "crate::types::amount::decimal")]
    pub total_input: Amount,
    /// Sum of non-change outputs. Equals the burned amount for burns.
    #[serde(with = "crate::types::amount::decimal")]
    pub total_output: Amount,
    #[serde(with = "crate::types::amount::decimal")]
    pub change: Amount,
    pub fee_bearer: FeeBearer,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// TransactionDraft
// ---------------------------------------------------------------------------

/// A balanced, unsigned transaction proposal.
///
/// Outputs are ordered: destination or locked outputs in request order,
/// then the change output (if any) last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDraft {
    /// Selected UTXOs, in selection order.
    pub inputs: Vec<Utxo>,
    pub outputs: Vec<Output>,
    /// Encoded payload: ASCII base64 of canonical JSON.
    pub payload: Vec<u8>,
    pub metadata: DraftMetadata,
}

impl TransactionDraft {
    /// Deterministic bytes covering inputs, outputs, payload and operation.
    ///
    /// `created_at` is excluded so two builds of the same intent against
    /// the same UTXO snapshot share an id.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(256);
        buf.push(self.metadata.operation.tag());
        buf.extend_from_slice(self.metadata.sender.as_bytes());

        buf.extend_from_slice(&(self.inputs.len() as u32).to_le_bytes());
        for input in &self.inputs {
            buf.extend_from_slice(&input.outpoint.to_bytes());
        }

        buf.extend_from_slice(&(self.outputs.len() as u32).to_le_bytes());
        for output in &self.outputs {
            let bytes = output.canonical_bytes();
            buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
            buf.extend_from_slice(&bytes);
        }

        buf.extend_from_slice(&(self.payload.len() as u32).to_le_bytes());
        buf.extend_from_slice(&self.payload);
        buf
    }

    /// `hex(double_sha256(canonical_bytes))`.
    pub fn id(&self) -> String {
        hex::encode(double_sha256(&self.canonical_bytes()))
    }

    /// The change output, if the draft has one.
    pub fn change_output(&self) -> Option<&Output> {
        if self.metadata.change == 0 {
            return None;
        }
        self.outputs.last()
    }

    /// Outputs excluding change.
    pub fn destination_outputs(&self) -> &[Output] {
        match self.change_output() {
            Some(_) => &self.outputs[..self.outputs.len() - 1],
            None => &self.outputs,
        }
    }

    pub fn input_total(&self) -> Option<Amount> {
        crate::types::amount::checked_sum(self.inputs.iter().map(|u| u.amount))
    }

    pub fn output_total(&self) -> Option<Amount> {
        crate::types::amount::checked_sum(self.outputs.iter().map(|o| o.amount))
    }

    pub fn payload_str(&self) -> &str {
        std::str::from_utf8(&self.payload).unwrap_or_default()
    }

    /// Decodes the attached payload.
    pub fn decode_payload(&self) -> Result<Payload, DraftError> {
        Payload::decode(self.payload_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
