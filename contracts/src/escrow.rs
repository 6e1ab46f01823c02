//! # Escrow
//!
//! Holds funds under a 2-of-3 multi-key lock over payer, payee and
//! arbiter. Payer and payee release together; either of them plus the
//! arbiter settles a dispute.
//!
//! The output is owned by the payee, whose claim it represents.

use tracing::debug;

use cairn_protocol::transaction::{LockedRequest, OperationKind};
use cairn_protocol::types::{Address, Amount, LockSpec, Output, TokenId};
use cairn_protocol::{CallContext, DraftService, LedgerQuery, ServiceError, TransactionDraft};

use crate::error::ServiceSetupError;

/// Signatures needed to spend an escrow output.
pub const ESCROW_THRESHOLD: u8 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscrowParams {
    pub payer: Address,
    pub payee: Address,
    pub arbiter: Address,
    pub amount: Amount,
    pub token_id: Option<TokenId>,
    /// Free-form reference (order id, invoice number) carried in the payload.
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EscrowService {
    drafts: DraftService,
}

impl EscrowService {
    pub fn new(drafts: DraftService) -> Self {
        Self { drafts }
    }

    /// Fails with [`ServiceSetupError::Lock`] when two parties share a key.
    pub fn request(&self, params: &EscrowParams) -> Result<LockedRequest, ServiceSetupError> {
        let lock = LockSpec::multi_key(
            ESCROW_THRESHOLD,
            vec![params.payer, params.payee, params.arbiter],
        )?;
        let output = Output::new(params.payee, params.amount, params.token_id, lock);

        debug!(payer = %params.payer, payee = %params.payee, "escrow prepared");

        let mut req = LockedRequest::new(
            OperationKind::Escrow,
            params.payer.as_bytes().to_vec(),
            vec![output],
        )
        .with_token_id(params.token_id)
        .with_to(params.payee)
        .with_extension("arbiter", params.arbiter.to_hex())
        .with_extension("threshold", ESCROW_THRESHOLD);
        if let Some(reference) = &params.reference {
            req = req.with_extension("reference", reference.as_str());
        }
        Ok(req)
    }

    pub async fn open(
        &self,
        ledger: &dyn LedgerQuery,
        params: &EscrowParams,
        ctx: &CallContext,
    ) -> Result<TransactionDraft, ServiceError> {
        crate::build_prepared(&self.drafts, ledger, self.request(params), ctx).await
    }
}
