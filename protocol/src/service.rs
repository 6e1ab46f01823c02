//! # Draft Service
//!
//! Async entry points, one per operation kind. Each call runs the same
//! pipeline:
//!
//! ```text
//! validate  ->  query_utxos (guarded)  ->  select  ->  assemble  ->  draft
//! ```
//!
//! Calls are stateless. The UTXO set is fetched fresh every time and
//! nothing is cached between calls, so two concurrent builds for the same
//! sender may select the same inputs; the ledger rejects the second one at
//! broadcast. Callers that need exclusivity serialize their own builds.
//!
//! Every collaborator handle is a parameter. Errors come back as
//! [`ServiceError`] tagged with the context's trace id, and the same id is
//! attached to every log line the call emits.

use tracing::{debug, info, warn};

use crate::config::BuilderConfig;
use crate::context::CallContext;
use crate::error::{DraftError, ServiceError};
use crate::ledger::{LedgerQuery, LedgerSubmit};
use crate::transaction::assembler::{DraftAssembler, DraftIntent};
use crate::transaction::draft::{OperationKind, TransactionDraft};
use crate::transaction::fee::FeePolicy;
use crate::transaction::request::{
    BatchTransferRequest, BurnRequest, LockedRequest, TransferRequest,
};
use crate::transaction::selector::{available_balance, select_utxos};
use crate::transaction::validation::{
    account_address, token_identity, validate_batch, validate_burn, validate_locked,
    validate_transfer,
};
use crate::types::token::token_label;
use crate::types::{Amount, ResourceId};

/// Builds drafts under one [`BuilderConfig`].
#[derive(Debug, Clone, Default)]
pub struct DraftService {
    config: BuilderConfig,
    fee_policy: FeePolicy,
}

impl DraftService {
    pub fn new(config: BuilderConfig) -> Self {
        Self {
            config,
            fee_policy: FeePolicy::new(),
        }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn fee_policy(&self) -> FeePolicy {
        self.fee_policy
    }

    /// A context bounded by this service's configured call timeout.
    pub fn context(&self) -> CallContext {
        CallContext::from_config(&self.config)
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    pub async fn transfer(
        &self,
        ledger: &dyn LedgerQuery,
        req: &TransferRequest,
        ctx: &CallContext,
    ) -> Result<TransactionDraft, ServiceError> {
        let result = async {
            let intent = validate_transfer(req)?;
            self.build(ledger, &intent, ctx).await
        }
        .await;
        self.finish(OperationKind::Transfer, ctx, result)
    }

    /// All items are funded by a single selection against their sum.
    pub async fn batch_transfer(
        &self,
        ledger: &dyn LedgerQuery,
        req: &BatchTransferRequest,
        ctx: &CallContext,
    ) -> Result<TransactionDraft, ServiceError> {
        let result = async {
            let intent = validate_batch(req, &self.config)?;
            self.build(ledger, &intent, ctx).await
        }
        .await;
        self.finish(OperationKind::BatchTransfer, ctx, result)
    }

    pub async fn burn(
        &self,
        ledger: &dyn LedgerQuery,
        req: &BurnRequest,
        ctx: &CallContext,
    ) -> Result<TransactionDraft, ServiceError> {
        let result = async {
            let intent = validate_burn(req)?;
            self.build(ledger, &intent, ctx).await
        }
        .await;
        self.finish(OperationKind::Burn, ctx, result)
    }

    /// Builds a draft around outputs whose locks a business service chose.
    pub async fn build_locked(
        &self,
        ledger: &dyn LedgerQuery,
        req: &LockedRequest,
        ctx: &CallContext,
    ) -> Result<TransactionDraft, ServiceError> {
        let result = async {
            let intent = validate_locked(req, &self.config)?;
            self.build(ledger, &intent, ctx).await
        }
        .await;
        self.finish(req.kind, ctx, result)
    }

    /// Spendable balance of `address` in one token identity.
    pub async fn query_balance(
        &self,
        ledger: &dyn LedgerQuery,
        address: &[u8],
        token_id: Option<&[u8]>,
        ctx: &CallContext,
    ) -> Result<Amount, ServiceError> {
        let result = async {
            let address = account_address("address", address)?;
            let token_id = token_identity("token_id", token_id)?;
            let utxos = ctx
                .guard(ledger.query_utxos(&address, token_id.as_ref()))
                .await?;
            available_balance(&utxos, token_id.as_ref())
        }
        .await;

        match result {
            Ok(balance) => {
                debug!(trace_id = %ctx.trace_id, %balance, "balance queried");
                Ok(balance)
            }
            Err(e) => {
                warn!(trace_id = %ctx.trace_id, kind = %e.kind(), error = %e, "balance query failed");
                Err(ctx.fail(e))
            }
        }
    }

    /// Stores a resource (contract code, document, ...) on the ledger.
    pub async fn deploy_resource(
        &self,
        submit: &dyn LedgerSubmit,
        bytes: &[u8],
        mime_type: Option<&str>,
        ctx: &CallContext,
    ) -> Result<ResourceId, ServiceError> {
        let result = async {
            if bytes.is_empty() {
                return Err(DraftError::validation("bytes", "resource must not be empty"));
            }
            if mime_type.is_some_and(|m| m.trim().is_empty()) {
                return Err(DraftError::validation("mime_type", "must not be blank"));
            }
            ctx.guard(submit.deploy_resource(bytes, mime_type)).await
        }
        .await;

        match result {
            Ok(id) => {
                info!(
                    trace_id = %ctx.trace_id,
                    resource = %id,
                    size = bytes.len(),
                    mime_type = mime_type.unwrap_or("-"),
                    "resource deployed"
                );
                Ok(id)
            }
            Err(e) => {
                warn!(trace_id = %ctx.trace_id, kind = %e.kind(), error = %e, "resource deployment failed");
                Err(ctx.fail(e))
            }
        }
    }

    // -----------------------------------------------------------------------
    // Pipeline
    // -----------------------------------------------------------------------

    async fn build<I>(
        &self,
        ledger: &dyn LedgerQuery,
        intent: &I,
        ctx: &CallContext,
    ) -> Result<TransactionDraft, DraftError>
    where
        I: DraftIntent + Sync,
    {
        let assembler = DraftAssembler::new(&self.config, self.fee_policy);
        let required = assembler.requirement(intent)?;
        let sender = intent.sender();
        let token_id = intent.token_id();

        debug!(
            trace_id = %ctx.trace_id,
            operation = %intent.kind(),
            %sender,
            token = %token_label(token_id.as_ref()),
            %required,
            "querying utxos"
        );
        let candidates = ctx
            .guard(ledger.query_utxos(&sender, token_id.as_ref()))
            .await?;

        let selection = select_utxos(&candidates, required, token_id.as_ref())?;
        let draft = assembler.assemble(intent, selection)?;

        // A cancel that lands after the last await still wins.
        ctx.check()?;
        Ok(draft)
    }

    fn finish(
        &self,
        operation: OperationKind,
        ctx: &CallContext,
        result: Result<TransactionDraft, DraftError>,
    ) -> Result<TransactionDraft, ServiceError> {
        match result {
            Ok(draft) => {
                info!(
                    trace_id = %ctx.trace_id,
                    %operation,
                    draft_id = %draft.id(),
                    inputs = draft.inputs.len(),
                    outputs = draft.outputs.len(),
                    total_input = %draft.metadata.total_input,
                    change = %draft.metadata.change,
                    "draft assembled"
                );
                Ok(draft)
            }
            Err(e) => {
                warn!(
                    trace_id = %ctx.trace_id,
                    %operation,
                    kind = %e.kind(),
                    error = %e,
                    "draft build failed"
                );
                Err(ctx.fail(e))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
