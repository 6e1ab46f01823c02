//! # Cairn Business Services
//!
//! Operations whose outputs carry a non-trivial spending condition. Each
//! service chooses the [`LockSpec`](cairn_protocol::types::LockSpec) for
//! its operation, builds a
//! [`LockedRequest`](cairn_protocol::transaction::LockedRequest), and hands
//! it to [`DraftService::build_locked`], which funds it, adds change and
//! attaches the payload:
//!
//! - **Staking**: height lock around the staking contract's lock.
//! - **Delegation**: same shape, with the delegatee in the contract data.
//! - **Escrow**: 2-of-3 multi-key lock over payer, payee and arbiter.
//! - **Vesting**: one time-locked single-key output per tranche.
//! - **Governance**: state outputs for proposals and votes.
//! - **Contract calls**: a deposit locked to the invoked contract.
//!
//! ## Design Principles
//!
//! 1. Lock choice lives here; fund selection and balancing never do.
//! 2. Parameters are checked before the ledger is queried.
//! 3. Every collaborator handle is passed per call, like the core.

pub mod contract_call;
pub mod delegation;
pub mod error;
pub mod escrow;
pub mod governance;
pub mod staking;
pub mod vesting;

pub use contract_call::{ContractCallParams, ContractCallService};
pub use delegation::{DelegateParams, DelegationService};
pub use error::ServiceSetupError;
pub use escrow::{EscrowParams, EscrowService};
pub use governance::{GovernanceService, ProposalParams, VoteChoice, VoteParams};
pub use staking::{StakeParams, StakingService};
pub use vesting::{Tranche, VestingParams, VestingService};

use cairn_protocol::transaction::LockedRequest;
use cairn_protocol::{CallContext, DraftService, LedgerQuery, ServiceError, TransactionDraft};

/// Builds a prepared request, or reports its setup failure under the
/// context's trace id without touching the ledger.
pub(crate) async fn build_prepared(
    drafts: &DraftService,
    ledger: &dyn LedgerQuery,
    prepared: Result<LockedRequest, ServiceSetupError>,
    ctx: &CallContext,
) -> Result<TransactionDraft, ServiceError> {
    match prepared {
        Ok(req) => drafts.build_locked(ledger, &req, ctx).await,
        Err(e) => {
            tracing::warn!(trace_id = %ctx.trace_id, error = %e, "business parameters rejected");
            Err(ctx.fail(e.into()))
        }
    }
}
