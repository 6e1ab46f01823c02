//! # Delegation
//!
//! Delegates voting or validation weight without handing over the funds.
//! Same shape as a stake, but the contract data names the delegatee and a
//! one-byte tag tells the staking contract which rules apply:
//!
//! ```text
//! HeightLock { unlock_height,
//!     inner: Contract { contract, data: 0x02 || delegatee } }
//! ```

use tracing::debug;

use cairn_protocol::transaction::{LockedRequest, OperationKind};
use cairn_protocol::types::{Address, Amount, LockSpec, Output, ResourceId, TokenId};
use cairn_protocol::{CallContext, DraftService, LedgerQuery, ServiceError, TransactionDraft};

use crate::error::ServiceSetupError;

/// Tag prefixed to delegation contract data.
pub const DELEGATION_TAG: u8 = 0x02;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegateParams {
    pub delegator: Address,
    pub delegatee: Address,
    pub staking_contract: ResourceId,
    pub amount: Amount,
    pub unlock_height: u64,
    pub token_id: Option<TokenId>,
}

#[derive(Debug, Clone, Default)]
pub struct DelegationService {
    drafts: DraftService,
}

impl DelegationService {
    pub fn new(drafts: DraftService) -> Self {
        Self { drafts }
    }

    pub fn request(&self, params: &DelegateParams) -> Result<LockedRequest, ServiceSetupError> {
        if params.delegatee == params.delegator {
            return Err(ServiceSetupError::invalid("delegatee", "cannot delegate to self"));
        }
        if params.unlock_height == 0 {
            return Err(ServiceSetupError::invalid("unlock_height", "must be positive"));
        }

        let mut data = Vec::with_capacity(1 + 20);
        data.push(DELEGATION_TAG);
        data.extend_from_slice(params.delegatee.as_bytes());

        let lock = LockSpec::height_lock(
            params.unlock_height,
            LockSpec::contract(params.staking_contract, data),
        )?;
        let output = Output::new(params.delegator, params.amount, params.token_id, lock);

        debug!(
            delegator = %params.delegator,
            delegatee = %params.delegatee,
            "delegation prepared"
        );

        Ok(LockedRequest::new(
            OperationKind::Delegate,
            params.delegator.as_bytes().to_vec(),
            vec![output],
        )
        .with_token_id(params.token_id)
        .with_to(params.staking_contract)
        .with_extension("delegatee", params.delegatee.to_hex())
        .with_extension("unlock_height", params.unlock_height))
    }

    pub async fn delegate(
        &self,
        ledger: &dyn LedgerQuery,
        params: &DelegateParams,
        ctx: &CallContext,
    ) -> Result<TransactionDraft, ServiceError> {
        crate::build_prepared(&self.drafts, ledger, self.request(params), ctx).await
    }
}
