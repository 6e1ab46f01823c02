//! # Governance
//!
//! Proposals and votes are state outputs: the output carries a small JSON
//! document under a versioned schema, and its value is the deposit (for a
//! proposal) or the voting weight (for a vote) the author locks behind it.
//!
//! ```text
//! State { schema: "cairn.governance.proposal/1", data: {title, ...} }
//! State { schema: "cairn.governance.vote/1",     data: {proposal, choice} }
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use cairn_protocol::transaction::{LockedRequest, OperationKind};
use cairn_protocol::types::{Address, Amount, LockSpec, Output, ResourceId, TokenId};
use cairn_protocol::{CallContext, DraftService, LedgerQuery, ServiceError, TransactionDraft};

use crate::error::ServiceSetupError;

pub const PROPOSAL_SCHEMA: &str = "cairn.governance.proposal/1";
pub const VOTE_SCHEMA: &str = "cairn.governance.vote/1";

/// Longest accepted proposal title, in characters.
pub const MAX_TITLE_LEN: usize = 120;

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalParams {
    pub proposer: Address,
    pub governance_contract: ResourceId,
    pub title: String,
    pub description: String,
    /// Unix seconds.
    pub voting_ends_at: u64,
    pub deposit: Amount,
    pub token_id: Option<TokenId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteChoice {
    Yes,
    No,
    Abstain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteParams {
    pub voter: Address,
    pub governance_contract: ResourceId,
    /// Draft id of the proposal transaction: 64 hex characters.
    pub proposal: String,
    pub choice: VoteChoice,
    pub weight: Amount,
    pub token_id: Option<TokenId>,
}

#[derive(Serialize)]
struct ProposalState<'a> {
    proposer: String,
    title: &'a str,
    description: &'a str,
    voting_ends_at: u64,
}

#[derive(Serialize)]
struct VoteState<'a> {
    proposal: &'a str,
    choice: VoteChoice,
}

fn state_bytes<T: Serialize>(field: &str, state: &T) -> Result<Vec<u8>, ServiceSetupError> {
    serde_json::to_vec(state).map_err(|e| ServiceSetupError::invalid(field, e.to_string()))
}

// ---------------------------------------------------------------------------
// GovernanceService
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct GovernanceService {
    drafts: DraftService,
}

impl GovernanceService {
    pub fn new(drafts: DraftService) -> Self {
        Self { drafts }
    }

    pub fn proposal_request(
        &self,
        params: &ProposalParams,
    ) -> Result<LockedRequest, ServiceSetupError> {
        let title = params.title.trim();
        if title.is_empty() {
            return Err(ServiceSetupError::invalid("title", "must not be empty"));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(ServiceSetupError::invalid(
                "title",
                format!("longer than {MAX_TITLE_LEN} characters"),
            ));
        }
        if params.voting_ends_at == 0 {
            return Err(ServiceSetupError::invalid("voting_ends_at", "must be set"));
        }

        let data = state_bytes(
            "proposal",
            &ProposalState {
                proposer: params.proposer.to_hex(),
                title,
                description: &params.description,
                voting_ends_at: params.voting_ends_at,
            },
        )?;
        let output = Output::new(
            params.proposer,
            params.deposit,
            params.token_id,
            LockSpec::state(PROPOSAL_SCHEMA, data),
        );

        debug!(proposer = %params.proposer, title, "proposal prepared");

        Ok(LockedRequest::new(
            OperationKind::Governance,
            params.proposer.as_bytes().to_vec(),
            vec![output],
        )
        .with_token_id(params.token_id)
        .with_to(params.governance_contract)
        .with_extension("action", "propose")
        .with_extension("schema", PROPOSAL_SCHEMA))
    }

    pub fn vote_request(&self, params: &VoteParams) -> Result<LockedRequest, ServiceSetupError> {
        let proposal = params.proposal.strip_prefix("0x").unwrap_or(&params.proposal);
        if proposal.len() != 64 || !proposal.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ServiceSetupError::invalid(
                "proposal",
                "expected a 64-character hex draft id",
            ));
        }
        let proposal = proposal.to_ascii_lowercase();

        let data = state_bytes(
            "vote",
            &VoteState {
                proposal: &proposal,
                choice: params.choice,
            },
        )?;
        let output = Output::new(
            params.voter,
            params.weight,
            params.token_id,
            LockSpec::state(VOTE_SCHEMA, data),
        );

        debug!(voter = %params.voter, %proposal, choice = ?params.choice, "vote prepared");

        Ok(LockedRequest::new(
            OperationKind::Governance,
            params.voter.as_bytes().to_vec(),
            vec![output],
        )
        .with_token_id(params.token_id)
        .with_to(params.governance_contract)
        .with_extension("action", "vote")
        .with_extension("schema", VOTE_SCHEMA)
        .with_extension("proposal", proposal))
    }

    pub async fn propose(
        &self,
        ledger: &dyn LedgerQuery,
        params: &ProposalParams,
        ctx: &CallContext,
    ) -> Result<TransactionDraft, ServiceError> {
        crate::build_prepared(&self.drafts, ledger, self.proposal_request(params), ctx).await
    }

    pub async fn vote(
        &self,
        ledger: &dyn LedgerQuery,
        params: &VoteParams,
        ctx: &CallContext,
    ) -> Result<TransactionDraft, ServiceError> {
        crate::build_prepared(&self.drafts, ledger, self.vote_request(params), ctx).await
    }
}
