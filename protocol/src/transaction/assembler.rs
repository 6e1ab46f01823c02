//! # Draft Assembly
//!
//! Turns a validated intent plus an input selection into a
//! [`TransactionDraft`]. Each operation kind contributes its own outputs
//! and payload through [`DraftIntent`]; the assembler does the rest the
//! same way for all of them:
//!
//! ```text
//! intent.outputs()            destination / locked outputs, request order
//!        |
//!        v
//! fee policy requirement  ->  compute_change(selected, required)
//!        |
//!        v
//! [outputs..., change?]   +   inputs in selection order
//!        |
//!        v
//! limits check  ->  payload.encode()  ->  TransactionDraft
//! ```
//!
//! Lock specifications arrive finished; the assembler never inspects or
//! rewrites them.

use chrono::Utc;
use serde_json::{json, Value};

use super::change::compute_change;
use super::draft::{DraftMetadata, OperationKind, TransactionDraft};
use super::fee::FeePolicy;
use super::payload::Payload;
use super::selector::Selection;
use super::validation::{ValidBatch, ValidBurn, ValidLocked, ValidTransfer};
use crate::config::{BuilderConfig, METHOD_EXTENSION};
use crate::error::DraftError;
use crate::types::{Address, Amount, Output, TokenId};

// ---------------------------------------------------------------------------
// DraftIntent
// ---------------------------------------------------------------------------

/// A validated operation, ready to be funded and assembled.
pub trait DraftIntent {
    fn kind(&self) -> OperationKind;

    /// The account whose UTXOs fund the draft and who receives change.
    fn sender(&self) -> Address;

    fn token_id(&self) -> Option<TokenId>;

    /// Non-change outputs, in the order they appear in the draft.
    fn outputs(&self) -> Vec<Output>;

    /// Sum of [`DraftIntent::outputs`]: what the outputs consume.
    fn output_total(&self) -> Amount;

    fn payload(&self) -> Payload;
}

fn base_payload(
    kind: OperationKind,
    from: Address,
    amount: Amount,
    token_id: Option<TokenId>,
) -> Payload {
    Payload::new()
        .with_from(from)
        .with_amount(amount)
        .with_token_id(token_id)
        .with_extension(METHOD_EXTENSION, kind.as_str())
}

impl DraftIntent for ValidTransfer {
    fn kind(&self) -> OperationKind {
        OperationKind::Transfer
    }

    fn sender(&self) -> Address {
        self.from
    }

    fn token_id(&self) -> Option<TokenId> {
        self.token_id
    }

    fn outputs(&self) -> Vec<Output> {
        vec![Output::pay_to(self.to, self.amount, self.token_id)]
    }

    fn output_total(&self) -> Amount {
        self.amount
    }

    fn payload(&self) -> Payload {
        base_payload(self.kind(), self.from, self.amount, self.token_id).with_to(self.to)
    }
}

impl DraftIntent for ValidBatch {
    fn kind(&self) -> OperationKind {
        OperationKind::BatchTransfer
    }

    fn sender(&self) -> Address {
        self.from
    }

    fn token_id(&self) -> Option<TokenId> {
        self.token_id
    }

    fn outputs(&self) -> Vec<Output> {
        self.items
            .iter()
            .map(|item| Output::pay_to(item.to, item.amount, self.token_id))
            .collect()
    }

    fn output_total(&self) -> Amount {
        self.total
    }

    /// No reserved `to`: the destinations are listed under `items`.
    fn payload(&self) -> Payload {
        let items: Vec<Value> = self
            .items
            .iter()
            .map(|item| json!({ "to": item.to.to_hex(), "amount": item.amount.to_string() }))
            .collect();
        base_payload(self.kind(), self.from, self.total, self.token_id)
            .with_extension("items", items)
    }
}

impl DraftIntent for ValidBurn {
    fn kind(&self) -> OperationKind {
        OperationKind::Burn
    }

    fn sender(&self) -> Address {
        self.from
    }

    fn token_id(&self) -> Option<TokenId> {
        self.token_id
    }

    /// Burned value leaves the ledger: there is no destination output.
    fn outputs(&self) -> Vec<Output> {
        Vec::new()
    }

    fn output_total(&self) -> Amount {
        self.amount
    }

    fn payload(&self) -> Payload {
        base_payload(self.kind(), self.from, self.amount, self.token_id)
    }
}

impl DraftIntent for ValidLocked {
    fn kind(&self) -> OperationKind {
        self.kind
    }

    fn sender(&self) -> Address {
        self.from
    }

    fn token_id(&self) -> Option<TokenId> {
        self.token_id
    }

    fn outputs(&self) -> Vec<Output> {
        self.outputs.clone()
    }

    fn output_total(&self) -> Amount {
        self.total
    }

    fn payload(&self) -> Payload {
        // Re-applied after the service's extensions so the kind always wins.
        let payload = base_payload(self.kind, self.from, self.total, self.token_id)
            .with_extensions(self.extensions.clone())
            .with_extension(METHOD_EXTENSION, self.kind.as_str());
        match self.to {
            Some(to) => payload.with_to(to),
            None => payload,
        }
    }
}

// ---------------------------------------------------------------------------
// DraftAssembler
// ---------------------------------------------------------------------------

/// Composes drafts under a [`BuilderConfig`] and [`FeePolicy`].
#[derive(Debug, Clone, Copy)]
pub struct DraftAssembler<'a> {
    config: &'a BuilderConfig,
    fee_policy: FeePolicy,
}

impl<'a> DraftAssembler<'a> {
    pub fn new(config: &'a BuilderConfig, fee_policy: FeePolicy) -> Self {
        Self { config, fee_policy }
    }

    /// What the sender's selection must cover for `intent`.
    pub fn requirement(&self, intent: &dyn DraftIntent) -> Result<Amount, DraftError> {
        self.fee_policy
            .sender_requirement(intent.kind(), intent.output_total())
            .ok_or_else(|| DraftError::Internal("sender requirement overflows".into()))
    }

    /// Assembles the draft for `intent` funded by `selection`.
    ///
    /// # Errors
    ///
    /// [`DraftError::Validation`] on `inputs` or `outputs` when the draft
    /// would exceed the configured limits, e.g. a balance spread over more
    /// small UTXOs than one draft may spend;
    /// [`DraftError::Internal`] when the selection does not cover the
    /// requirement;
    /// [`DraftError::FieldConflict`] when the payload cannot be encoded.
    pub fn assemble(
        &self,
        intent: &dyn DraftIntent,
        selection: Selection,
    ) -> Result<TransactionDraft, DraftError> {
        let kind = intent.kind();
        let sender = intent.sender();
        let token_id = intent.token_id();

        let mut outputs = intent.outputs();
        let required = self.requirement(intent)?;
        let change = compute_change(selection.total, required, sender, token_id)?;
        let change_amount = change.as_ref().map_or(0, |c| c.amount);
        outputs.extend(change);

        if selection.len() > self.config.max_inputs {
            return Err(DraftError::validation(
                "inputs",
                format!(
                    "{} inputs exceed the limit of {}",
                    selection.len(),
                    self.config.max_inputs
                ),
            ));
        }
        if outputs.len() > self.config.max_outputs {
            return Err(DraftError::validation(
                "outputs",
                format!(
                    "{} outputs exceed the limit of {}",
                    outputs.len(),
                    self.config.max_outputs
                ),
            ));
        }

        let payload = intent.payload().encode()?;

        Ok(TransactionDraft {
            inputs: selection.utxos,
            outputs,
            payload: payload.into_bytes(),
            metadata: DraftMetadata {
                operation: kind,
                sender,
                token_id,
                total_input: selection.total,
                total_output: intent.output_total(),
                change: change_amount,
                fee_bearer: self.fee_policy.bearer(kind),
                created_at: Utc::now(),
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
