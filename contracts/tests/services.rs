//! End-to-end tests for the business services.
//!
//! Every service is driven through its async entry point against a shared
//! in-memory ledger, so these cover selection, change placement and payload
//! attachment on top of the lock shapes each module tests on its own.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use cairn_contracts::{
    ContractCallParams, ContractCallService, DelegateParams, DelegationService, EscrowParams,
    EscrowService, GovernanceService, ProposalParams, StakeParams, StakingService, Tranche,
    VestingParams, VestingService, VoteChoice, VoteParams,
};
use cairn_protocol::logging::{try_init_logging, LogFormat};
use cairn_protocol::transaction::OperationKind;
use cairn_protocol::types::{Address, Amount, LockSpec, OutPoint, ResourceId, TokenId, Utxo};
use cairn_protocol::{
    CallContext, CollaboratorError, DraftService, ErrorKind, LedgerQuery, TransactionDraft,
};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

const ALICE: [u8; 20] = [0xA1; 20];
const BOB: [u8; 20] = [0xB0; 20];
const CAROL: [u8; 20] = [0xC4; 20];
const STAKING: [u8; 32] = [0x5C; 32];
const GOVERNANCE: [u8; 32] = [0x60; 32];

#[derive(Default)]
struct MemoryLedger {
    utxos: RwLock<HashMap<Address, Vec<Utxo>>>,
    queries: AtomicUsize,
}

impl MemoryLedger {
    fn funded(owner: [u8; 20], amounts: &[Amount]) -> Self {
        let ledger = Self::default();
        let owner = Address::from_bytes(owner);
        let set: Vec<Utxo> = amounts
            .iter()
            .enumerate()
            .map(|(i, &amount)| {
                let mut tx_hash = [0u8; 32];
                tx_hash[0] = i as u8;
                tx_hash[1..21].copy_from_slice(owner.as_bytes());
                Utxo::new(OutPoint::new(tx_hash, i as u32), 10, amount, None)
            })
            .collect();
        ledger.utxos.write().insert(owner, set);
        ledger
    }

    fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerQuery for MemoryLedger {
    async fn query_utxos(
        &self,
        address: &Address,
        _token_id: Option<&TokenId>,
    ) -> Result<Vec<Utxo>, CollaboratorError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.utxos.read().get(address).cloned().unwrap_or_default())
    }
}

fn ctx() -> CallContext {
    let _ = try_init_logging("cairn_contracts=debug,cairn_protocol=debug", LogFormat::Pretty);
    CallContext::default()
}

fn assert_balanced(draft: &TransactionDraft, sender: Address) {
    assert_eq!(draft.input_total(), draft.output_total());
    if let Some(change) = draft.change_output() {
        assert_eq!(change.owner, sender);
        assert_eq!(change.lock, LockSpec::single_key(sender));
    }
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stake_funds_height_locked_contract_output() {
    let ledger = MemoryLedger::funded(ALICE, &[600, 700]);
    let params = StakeParams {
        staker: Address::from_bytes(ALICE),
        validator: Address::from_bytes(BOB),
        staking_contract: ResourceId::from_bytes(STAKING),
        amount: 1_000,
        unlock_height: 5_000,
        token_id: None,
    };

    let draft = StakingService::default()
        .stake(&ledger, &params, &ctx())
        .await
        .unwrap();

    assert_eq!(draft.metadata.operation, OperationKind::Stake);
    assert_eq!(draft.inputs.len(), 2);
    assert_eq!(draft.outputs.len(), 2);
    assert_eq!(draft.metadata.change, 300);
    assert!(matches!(
        draft.outputs[0].lock,
        LockSpec::HeightLock { unlock_height: 5_000, .. }
    ));
    assert_balanced(&draft, params.staker);

    let payload = draft.decode_payload().unwrap();
    assert_eq!(payload.extensions()["method"], "stake");
}

#[tokio::test]
async fn delegation_without_change() {
    let ledger = MemoryLedger::funded(ALICE, &[400]);
    let params = DelegateParams {
        delegator: Address::from_bytes(ALICE),
        delegatee: Address::from_bytes(CAROL),
        staking_contract: ResourceId::from_bytes(STAKING),
        amount: 400,
        unlock_height: 90,
        token_id: None,
    };

    let draft = DelegationService::default()
        .delegate(&ledger, &params, &ctx())
        .await
        .unwrap();

    assert_eq!(draft.outputs.len(), 1);
    assert!(draft.change_output().is_none());
    assert_balanced(&draft, params.delegator);
}

#[tokio::test]
async fn escrow_output_precedes_change() {
    let ledger = MemoryLedger::funded(ALICE, &[5_000]);
    let params = EscrowParams {
        payer: Address::from_bytes(ALICE),
        payee: Address::from_bytes(BOB),
        arbiter: Address::from_bytes(CAROL),
        amount: 1_200,
        token_id: None,
        reference: None,
    };

    let draft = EscrowService::default()
        .open(&ledger, &params, &ctx())
        .await
        .unwrap();

    assert!(matches!(
        draft.outputs[0].lock,
        LockSpec::MultiKey { threshold: 2, .. }
    ));
    assert_eq!(draft.change_output().map(|o| o.amount), Some(3_800));
    assert_balanced(&draft, params.payer);
    assert!(!draft.decode_payload().unwrap().extensions().contains_key("reference"));
}

#[tokio::test]
async fn vesting_tranches_keep_schedule_order() {
    let ledger = MemoryLedger::funded(ALICE, &[1_000]);
    let params = VestingParams {
        grantor: Address::from_bytes(ALICE),
        beneficiary: Address::from_bytes(BOB),
        tranches: vec![
            Tranche { unlock_at: 100, amount: 100 },
            Tranche { unlock_at: 200, amount: 200 },
            Tranche { unlock_at: 300, amount: 300 },
        ],
        token_id: None,
    };

    let draft = VestingService::default()
        .grant(&ledger, &params, &ctx())
        .await
        .unwrap();

    let unlocks: Vec<u64> = draft
        .destination_outputs()
        .iter()
        .map(|o| match o.lock {
            LockSpec::TimeLock { unlock_at, .. } => unlock_at,
            ref other => panic!("unexpected lock {other:?}"),
        })
        .collect();
    assert_eq!(unlocks, vec![100, 200, 300]);
    assert_eq!(draft.metadata.total_output, 600);
    assert_eq!(draft.metadata.change, 400);
    assert_balanced(&draft, params.grantor);
}

#[tokio::test]
async fn proposal_then_vote() {
    let ledger = MemoryLedger::funded(ALICE, &[2_000, 50]);
    let service = GovernanceService::new(DraftService::default());

    let proposal = service
        .propose(
            &ledger,
            &ProposalParams {
                proposer: Address::from_bytes(ALICE),
                governance_contract: ResourceId::from_bytes(GOVERNANCE),
                title: "Lower the burn floor".into(),
                description: String::new(),
                voting_ends_at: 1_900_000_000,
                deposit: 1_000,
                token_id: None,
            },
            &ctx(),
        )
        .await
        .unwrap();
    assert_eq!(proposal.metadata.operation, OperationKind::Governance);
    assert_balanced(&proposal, Address::from_bytes(ALICE));

    let vote = service
        .vote(
            &ledger,
            &VoteParams {
                voter: Address::from_bytes(ALICE),
                governance_contract: ResourceId::from_bytes(GOVERNANCE),
                proposal: proposal.id(),
                choice: VoteChoice::Yes,
                weight: 50,
                token_id: None,
            },
            &ctx(),
        )
        .await
        .unwrap();

    let payload = vote.decode_payload().unwrap();
    assert_eq!(payload.extensions()["proposal"], proposal.id());
    assert_eq!(payload.extensions()["action"], "vote");
    assert!(matches!(vote.outputs[0].lock, LockSpec::State { .. }));
}

#[tokio::test]
async fn contract_call_carries_deposit() {
    let ledger = MemoryLedger::funded(ALICE, &[75]);
    let params = ContractCallParams {
        caller: Address::from_bytes(ALICE),
        contract: ResourceId::from_bytes([0xC0; 32]),
        method: "mint".into(),
        args: serde_json::json!({ "to": hex_of(BOB) }),
        deposit: 25,
        token_id: None,
    };

    let draft = ContractCallService::default()
        .call(&ledger, &params, &ctx())
        .await
        .unwrap();

    assert_eq!(draft.metadata.operation, OperationKind::ContractCall);
    assert_eq!(draft.outputs[0].amount, 25);
    assert_eq!(draft.change_output().map(|o| o.amount), Some(50));
    assert_balanced(&draft, params.caller);

    let payload = draft.decode_payload().unwrap();
    assert_eq!(payload.extensions()["method"], "contract_call");
    assert_eq!(payload.extensions()["entrypoint"], "mint");
}

fn hex_of(bytes: [u8; 20]) -> String {
    Address::from_bytes(bytes).to_hex()
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn setup_error_is_validation_and_skips_ledger() {
    let ledger = MemoryLedger::funded(ALICE, &[10_000]);
    let ctx = ctx();
    let params = EscrowParams {
        payer: Address::from_bytes(ALICE),
        payee: Address::from_bytes(BOB),
        arbiter: Address::from_bytes(BOB),
        amount: 100,
        token_id: None,
        reference: None,
    };

    let err = EscrowService::default()
        .open(&ledger, &params, &ctx)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.trace_id, ctx.trace_id);
    assert_eq!(err.detail()["field"], "lock");
    assert_eq!(ledger.query_count(), 0);
}

#[tokio::test]
async fn underfunded_stake_reports_shortfall() {
    let ledger = MemoryLedger::funded(ALICE, &[100, 200]);
    let params = StakeParams {
        staker: Address::from_bytes(ALICE),
        validator: Address::from_bytes(BOB),
        staking_contract: ResourceId::from_bytes(STAKING),
        amount: 1_000,
        unlock_height: 10,
        token_id: None,
    };

    let err = StakingService::default()
        .stake(&ledger, &params, &ctx())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
    assert!(!err.is_retryable());
    assert_eq!(ledger.query_count(), 1);
}
