//! # Submission Pipeline
//!
//! Takes an assembled draft through the node and the external signer:
//!
//! ```text
//! build_transaction            unsigned bytes (size logged)
//! compute_signature_hash(i)    one hash per input, in input order
//! wallet.sign(hash)            one signature per input
//! finalize_transaction         signed bytes
//! broadcast(hex)               node verdict
//! ```
//!
//! The core never sees key material: hashes are computed by the node and
//! signed by the [`Wallet`]. Every step runs under the caller's
//! [`CallContext`], so a timeout or cancel abandons the submission before
//! anything is broadcast.

use tracing::{debug, info, warn};

use crate::context::CallContext;
use crate::error::{DraftError, ServiceError};
use crate::ledger::{BroadcastResult, LedgerSubmit, Wallet};
use crate::transaction::draft::TransactionDraft;

/// Status code reported for a broadcast the node answered but refused.
pub const BROADCAST_REJECTED: u16 = 400;

/// Signs and broadcasts `draft`.
///
/// # Errors
///
/// - [`DraftError::Validation`] if the wallet does not own the draft's
///   inputs or the draft has nothing to sign.
/// - [`DraftError::Ledger`] with code [`BROADCAST_REJECTED`] when the node
///   refuses the transaction; this is terminal, not retryable.
/// - Collaborator, timeout and cancel errors from any step.
pub async fn submit_draft(
    submit: &dyn LedgerSubmit,
    wallet: &dyn Wallet,
    draft: &TransactionDraft,
    ctx: &CallContext,
) -> Result<BroadcastResult, ServiceError> {
    let draft_id = draft.id();
    match run(submit, wallet, draft, ctx).await {
        Ok(result) => {
            info!(
                trace_id = %ctx.trace_id,
                %draft_id,
                tx_hash = %result.tx_hash,
                operation = %draft.metadata.operation,
                "transaction broadcast"
            );
            Ok(result)
        }
        Err(e) => {
            warn!(
                trace_id = %ctx.trace_id,
                %draft_id,
                kind = %e.kind(),
                error = %e,
                "submission failed"
            );
            Err(ctx.fail(e))
        }
    }
}

async fn run(
    submit: &dyn LedgerSubmit,
    wallet: &dyn Wallet,
    draft: &TransactionDraft,
    ctx: &CallContext,
) -> Result<BroadcastResult, DraftError> {
    let signer = wallet.address();
    if signer != draft.metadata.sender {
        return Err(DraftError::validation(
            "wallet",
            format!(
                "wallet {signer} cannot sign inputs of {}",
                draft.metadata.sender
            ),
        ));
    }
    if draft.inputs.is_empty() {
        return Err(DraftError::validation("inputs", "draft has nothing to sign"));
    }

    let unsigned = ctx.guard(submit.build_transaction(draft)).await?;
    debug!(trace_id = %ctx.trace_id, size = unsigned.len(), "unsigned transaction built");

    let mut signatures = Vec::with_capacity(draft.inputs.len());
    for index in 0..draft.inputs.len() {
        let hash = ctx
            .guard(submit.compute_signature_hash(draft, index))
            .await?;
        let signature = ctx.guard(wallet.sign(&hash)).await?;
        signatures.push(signature);
    }
    debug!(trace_id = %ctx.trace_id, inputs = signatures.len(), "inputs signed");

    let signed = ctx
        .guard(submit.finalize_transaction(draft, &signatures))
        .await?;
    let result = ctx.guard(submit.broadcast(&hex::encode(signed))).await?;

    if !result.accepted {
        return Err(DraftError::Ledger {
            code: BROADCAST_REJECTED,
            message: result
                .reason
                .unwrap_or_else(|| format!("transaction {} rejected", result.tx_hash)),
        });
    }
    Ok(result)
}
