//! # Staking
//!
//! Locks stake under the staking contract until a release height:
//!
//! ```text
//! HeightLock { unlock_height,
//!     inner: Contract { contract: staking_contract, data: validator } }
//! ```
//!
//! The output stays owned by the staker; the contract decides slashing and
//! the height lock bounds the unbonding period.

use tracing::debug;

use cairn_protocol::transaction::{LockedRequest, OperationKind};
use cairn_protocol::types::{Address, Amount, LockSpec, Output, ResourceId, TokenId};
use cairn_protocol::{CallContext, DraftService, LedgerQuery, ServiceError, TransactionDraft};

use crate::error::ServiceSetupError;

/// Parameters of a stake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakeParams {
    pub staker: Address,
    /// Validator the stake backs.
    pub validator: Address,
    pub staking_contract: ResourceId,
    pub amount: Amount,
    /// First block height at which the stake can be withdrawn.
    pub unlock_height: u64,
    pub token_id: Option<TokenId>,
}

#[derive(Debug, Clone, Default)]
pub struct StakingService {
    drafts: DraftService,
}

impl StakingService {
    pub fn new(drafts: DraftService) -> Self {
        Self { drafts }
    }

    /// The locked request for `params`, without touching the ledger.
    pub fn request(&self, params: &StakeParams) -> Result<LockedRequest, ServiceSetupError> {
        if params.unlock_height == 0 {
            return Err(ServiceSetupError::invalid("unlock_height", "must be positive"));
        }
        if params.validator == params.staker {
            return Err(ServiceSetupError::invalid("validator", "cannot stake to self"));
        }

        let lock = LockSpec::height_lock(
            params.unlock_height,
            LockSpec::contract(params.staking_contract, params.validator.as_bytes().to_vec()),
        )?;
        let output = Output::new(params.staker, params.amount, params.token_id, lock);

        debug!(
            staker = %params.staker,
            validator = %params.validator,
            unlock_height = params.unlock_height,
            "stake prepared"
        );

        Ok(LockedRequest::new(
            OperationKind::Stake,
            params.staker.as_bytes().to_vec(),
            vec![output],
        )
        .with_token_id(params.token_id)
        .with_to(params.staking_contract)
        .with_extension("validator", params.validator.to_hex())
        .with_extension("unlock_height", params.unlock_height))
    }

    pub async fn stake(
        &self,
        ledger: &dyn LedgerQuery,
        params: &StakeParams,
        ctx: &CallContext,
    ) -> Result<TransactionDraft, ServiceError> {
        crate::build_prepared(&self.drafts, ledger, self.request(params), ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> StakeParams {
        StakeParams {
            staker: Address::from_bytes([1; 20]),
            validator: Address::from_bytes([2; 20]),
            staking_contract: ResourceId::from_bytes([0x5C; 32]),
            amount: 10_000,
            unlock_height: 120_000,
            token_id: None,
        }
    }

    #[test]
    fn stake_is_height_locked_contract_lock() {
        let p = params();
        let req = StakingService::default().request(&p).unwrap();

        assert_eq!(req.kind, OperationKind::Stake);
        assert_eq!(req.outputs.len(), 1);
        let output = &req.outputs[0];
        assert_eq!(output.owner, p.staker);
        assert_eq!(output.amount, 10_000);
        match &output.lock {
            LockSpec::HeightLock {
                unlock_height,
                inner,
            } => {
                assert_eq!(*unlock_height, 120_000);
                assert_eq!(
                    **inner,
                    LockSpec::contract(p.staking_contract, p.validator.as_bytes().to_vec())
                );
            }
            other => panic!("unexpected lock {other:?}"),
        }
        assert_eq!(req.to, Some(p.staking_contract.into()));
    }

    #[test]
    fn rejects_zero_height_and_self_stake() {
        let service = StakingService::default();

        let mut p = params();
        p.unlock_height = 0;
        assert!(matches!(
            service.request(&p),
            Err(ServiceSetupError::InvalidParameter { field, .. }) if field == "unlock_height"
        ));

        let mut p = params();
        p.validator = p.staker;
        assert!(service.request(&p).is_err());
    }

    #[test]
    fn token_stake_carries_token_identity() {
        let mut p = params();
        p.token_id = Some(TokenId::from_bytes([7; 32]));
        let req = StakingService::default().request(&p).unwrap();
        assert_eq!(req.token_id, Some(vec![7; 32]));
        assert_eq!(req.outputs[0].token_id, p.token_id);
    }
}
