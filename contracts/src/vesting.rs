//! # Vesting
//!
//! Splits a grant into tranches, each its own output spendable by the
//! beneficiary from the tranche's unlock time:
//!
//! ```text
//! TimeLock { unlock_at, inner: SingleKey { key: beneficiary } }
//! ```
//!
//! Tranches must be listed in strictly increasing unlock order; outputs
//! appear in the draft in that order.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use cairn_protocol::transaction::{LockedRequest, OperationKind};
use cairn_protocol::types::{Address, Amount, LockSpec, Output, TokenId};
use cairn_protocol::{CallContext, DraftService, LedgerQuery, ServiceError, TransactionDraft};

use crate::error::ServiceSetupError;

/// One slice of a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tranche {
    /// Unix seconds.
    pub unlock_at: u64,
    #[serde(with = "cairn_protocol::types::amount::decimal")]
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VestingParams {
    pub grantor: Address,
    pub beneficiary: Address,
    pub tranches: Vec<Tranche>,
    pub token_id: Option<TokenId>,
}

#[derive(Debug, Clone, Default)]
pub struct VestingService {
    drafts: DraftService,
}

impl VestingService {
    pub fn new(drafts: DraftService) -> Self {
        Self { drafts }
    }

    pub fn request(&self, params: &VestingParams) -> Result<LockedRequest, ServiceSetupError> {
        if params.tranches.is_empty() {
            return Err(ServiceSetupError::invalid("tranches", "must not be empty"));
        }
        for (i, pair) in params.tranches.windows(2).enumerate() {
            if pair[1].unlock_at <= pair[0].unlock_at {
                return Err(ServiceSetupError::invalid(
                    format!("tranches[{}].unlock_at", i + 1),
                    "must be later than the previous tranche",
                ));
            }
        }

        let outputs = params
            .tranches
            .iter()
            .map(|t| -> Result<Output, ServiceSetupError> {
                let key = LockSpec::single_key(params.beneficiary);
                let lock = LockSpec::time_lock(t.unlock_at, key)?;
                Ok(Output::new(params.beneficiary, t.amount, params.token_id, lock))
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            beneficiary = %params.beneficiary,
            tranches = outputs.len(),
            "vesting schedule prepared"
        );

        Ok(LockedRequest::new(
            OperationKind::Vesting,
            params.grantor.as_bytes().to_vec(),
            outputs,
        )
        .with_token_id(params.token_id)
        .with_to(params.beneficiary)
        .with_extension("schedule", json!(params.tranches)))
    }

    pub async fn grant(
        &self,
        ledger: &dyn LedgerQuery,
        params: &VestingParams,
        ctx: &CallContext,
    ) -> Result<TransactionDraft, ServiceError> {
        crate::build_prepared(&self.drafts, ledger, self.request(params), ctx).await
    }
}
