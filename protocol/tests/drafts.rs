//! Integration tests for draft construction and submission.
//!
//! Each test runs the public service API against an in-memory ledger and
//! wallet. The ledger keeps its UTXO sets and broadcast log behind
//! `parking_lot::RwLock`s so tests can seed and inspect it directly.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::json;
use tokio::sync::watch;

use cairn_protocol::batch::query_balances;
use cairn_protocol::config::{BatchConfig, BuilderConfig};
use cairn_protocol::hash::sha256;
use cairn_protocol::submit::{submit_draft, BROADCAST_REJECTED};
use cairn_protocol::transaction::{
    BatchTransferRequest, BurnRequest, LockedRequest, OperationKind, Payload, TransferItem,
    TransferRequest,
};
use cairn_protocol::types::{
    Address, Amount, LockSpec, OutPoint, Output, ResourceId, TokenId, Utxo,
};
use cairn_protocol::{
    BroadcastResult, CallContext, CollaboratorError, DraftError, DraftService, ErrorKind,
    LedgerQuery, LedgerSubmit, TransactionDraft, Wallet,
};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

const ALICE: [u8; 20] = [0xA1; 20];
const BOB: [u8; 20] = [0xB0; 20];
const TOKEN_X: [u8; 32] = [0x58; 32];
const TOKEN_Y: [u8; 32] = [0x59; 32];

#[derive(Default)]
struct MemoryLedger {
    utxos: RwLock<HashMap<Address, Vec<Utxo>>>,
    broadcasts: RwLock<Vec<String>>,
    hash_requests: RwLock<Vec<usize>>,
    query_delay: Option<Duration>,
    reject_with: Option<String>,
}

impl MemoryLedger {
    fn seed(&self, owner: [u8; 20], amounts: &[Amount], token: Option<[u8; 32]>) {
        let owner = Address::from_bytes(owner);
        let mut utxos = self.utxos.write();
        let set = utxos.entry(owner).or_default();
        for amount in amounts {
            let n = set.len() as u32;
            let mut tx_hash = [0u8; 32];
            tx_hash[..4].copy_from_slice(&n.to_be_bytes());
            tx_hash[4..24].copy_from_slice(owner.as_bytes());
            set.push(Utxo::new(
                OutPoint::new(tx_hash, n),
                100 + n as u64,
                *amount,
                token.map(TokenId::from_bytes),
            ));
        }
    }
}

#[async_trait]
impl LedgerQuery for MemoryLedger {
    async fn query_utxos(
        &self,
        address: &Address,
        _token_id: Option<&TokenId>,
    ) -> Result<Vec<Utxo>, CollaboratorError> {
        if let Some(delay) = self.query_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.utxos.read().get(address).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl LedgerSubmit for MemoryLedger {
    async fn build_transaction(
        &self,
        draft: &TransactionDraft,
    ) -> Result<Vec<u8>, CollaboratorError> {
        Ok(draft.canonical_bytes())
    }

    async fn compute_signature_hash(
        &self,
        draft: &TransactionDraft,
        input_index: usize,
    ) -> Result<Vec<u8>, CollaboratorError> {
        if input_index >= draft.inputs.len() {
            return Err(CollaboratorError::Ledger {
                code: 422,
                message: format!("no input {input_index}"),
            });
        }
        self.hash_requests.write().push(input_index);
        let mut preimage = draft.canonical_bytes();
        preimage.extend_from_slice(&(input_index as u32).to_le_bytes());
        Ok(sha256(&preimage).to_vec())
    }

    async fn finalize_transaction(
        &self,
        draft: &TransactionDraft,
        signatures: &[Vec<u8>],
    ) -> Result<Vec<u8>, CollaboratorError> {
        let mut signed = draft.canonical_bytes();
        for sig in signatures {
            signed.extend_from_slice(sig);
        }
        Ok(signed)
    }

    async fn broadcast(&self, signed_tx_hex: &str) -> Result<BroadcastResult, CollaboratorError> {
        self.broadcasts.write().push(signed_tx_hex.to_string());
        let bytes = hex::decode(signed_tx_hex).map_err(|e| CollaboratorError::Ledger {
            code: 400,
            message: e.to_string(),
        })?;
        Ok(BroadcastResult {
            tx_hash: hex::encode(sha256(&bytes)),
            accepted: self.reject_with.is_none(),
            reason: self.reject_with.clone(),
        })
    }

    async fn deploy_resource(
        &self,
        bytes: &[u8],
        _mime_type: Option<&str>,
    ) -> Result<ResourceId, CollaboratorError> {
        Ok(ResourceId::from_bytes(sha256(bytes)))
    }
}

struct MemoryWallet {
    address: Address,
    signed: RwLock<Vec<Vec<u8>>>,
}

impl MemoryWallet {
    fn new(owner: [u8; 20]) -> Self {
        Self {
            address: Address::from_bytes(owner),
            signed: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Wallet for MemoryWallet {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CollaboratorError> {
        self.signed.write().push(message.to_vec());
        let mut sig = b"sig:".to_vec();
        sig.extend_from_slice(message);
        Ok(sig)
    }
}

fn assert_balanced(draft: &TransactionDraft) {
    let inputs = draft.input_total().expect("input total");
    let outputs = draft.output_total().expect("output total");
    match draft.metadata.operation {
        // Burned value leaves through no output.
        OperationKind::Burn => assert_eq!(inputs, outputs + draft.metadata.total_output),
        _ => assert_eq!(inputs, outputs),
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn native_transfer_spends_in_ledger_order() {
    let ledger = MemoryLedger::default();
    ledger.seed(ALICE, &[500, 700], None);
    let service = DraftService::default();

    let draft = service
        .transfer(&ledger, &TransferRequest::new(ALICE, BOB, 1000), &service.context())
        .await
        .expect("transfer draft");

    assert_eq!(draft.inputs.len(), 2);
    assert_eq!(draft.inputs[0].amount, 500);
    assert_eq!(draft.inputs[1].amount, 700);
    assert_eq!(draft.outputs.len(), 2);
    assert_eq!(draft.outputs[0].owner, Address::from_bytes(BOB));
    assert_eq!(draft.outputs[0].amount, 1000);
    let change = draft.change_output().expect("change");
    assert_eq!(change.amount, 200);
    assert_eq!(change.owner, Address::from_bytes(ALICE));
    assert_eq!(change.lock, LockSpec::single_key(Address::from_bytes(ALICE)));
    assert_balanced(&draft);
}

#[tokio::test]
async fn token_batch_funds_all_items_from_one_selection() {
    let ledger = MemoryLedger::default();
    ledger.seed(ALICE, &[5_000], None);
    ledger.seed(ALICE, &[250, 750], Some(TOKEN_X));
    ledger.seed(ALICE, &[9_000], Some(TOKEN_Y));
    let service = DraftService::default();

    let req = BatchTransferRequest {
        from: ALICE.to_vec(),
        items: vec![
            TransferItem::new([1; 20], 100),
            TransferItem::new([2; 20], 200),
            TransferItem::new([3; 20], 300),
        ],
        token_id: Some(TOKEN_X.to_vec()),
    };
    let draft = service
        .batch_transfer(&ledger, &req, &service.context())
        .await
        .expect("batch draft");

    let x = Some(TokenId::from_bytes(TOKEN_X));
    assert_eq!(draft.inputs.len(), 2);
    assert!(draft.inputs.iter().all(|u| u.token_id == x));
    let amounts: Vec<Amount> = draft.outputs.iter().map(|o| o.amount).collect();
    assert_eq!(amounts, vec![100, 200, 300, 400]);
    assert!(draft.outputs.iter().all(|o| o.token_id == x));
    assert_eq!(draft.destination_outputs().len(), 3);
    assert_balanced(&draft);

    let payload = draft.decode_payload().expect("payload");
    assert_eq!(payload.amount(), Some(600));
    assert_eq!(payload.token_id(), x.as_ref());
    let items = payload.extension("items").and_then(|v| v.as_array());
    assert_eq!(items.map(Vec::len), Some(3));
}

#[tokio::test]
async fn exact_burn_leaves_no_outputs() {
    let ledger = MemoryLedger::default();
    ledger.seed(ALICE, &[500], Some(TOKEN_Y));
    let service = DraftService::default();

    let req = BurnRequest {
        from: ALICE.to_vec(),
        amount: 500,
        token_id: Some(TOKEN_Y.to_vec()),
    };
    let draft = service
        .burn(&ledger, &req, &service.context())
        .await
        .expect("burn draft");

    assert_eq!(draft.inputs.len(), 1);
    assert!(draft.outputs.is_empty());
    assert_eq!(draft.metadata.change, 0);
    assert_balanced(&draft);
}

#[tokio::test]
async fn burn_change_is_not_reduced_by_a_fee() {
    let ledger = MemoryLedger::default();
    ledger.seed(ALICE, &[800], None);
    let service = DraftService::default();

    let req = BurnRequest {
        from: ALICE.to_vec(),
        amount: 500,
        token_id: None,
    };
    let draft = service.burn(&ledger, &req, &service.context()).await.unwrap();
    assert_eq!(draft.change_output().map(|o| o.amount), Some(300));
    assert!(draft.decode_payload().unwrap().extension("fee").is_none());
}

#[test]
fn zero_sender_payload_is_prefixed_hex() {
    let encoded = Payload::new()
        .with_from(Address::from_bytes([0; 20]))
        .encode()
        .unwrap();
    let decoded = Payload::decode(&encoded).unwrap();
    assert_eq!(decoded.from(), Some(&Address::from_bytes([0; 20])));
    assert_eq!(
        decoded.to_json().unwrap(),
        json!({ "from": format!("0x{}", "0".repeat(40)) })
    );
}

#[tokio::test]
async fn token_filter_ignores_other_assets() {
    let ledger = MemoryLedger::default();
    ledger.seed(ALICE, &[10_000], None);
    ledger.seed(ALICE, &[40], Some(TOKEN_X));
    let service = DraftService::default();

    let req = TransferRequest::new(ALICE, BOB, 100).with_token(TOKEN_X);
    let err = service
        .transfer(&ledger, &req, &service.context())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
    assert_eq!(
        err.error,
        DraftError::InsufficientBalance {
            required: 100,
            found: 40
        }
    );
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn identical_builds_share_an_id() {
    let ledger = MemoryLedger::default();
    ledger.seed(ALICE, &[300, 300], None);
    let service = DraftService::default();
    let req = TransferRequest::new(ALICE, BOB, 450);

    let a = service.transfer(&ledger, &req, &service.context()).await.unwrap();
    let b = service.transfer(&ledger, &req, &service.context()).await.unwrap();
    assert_eq!(a.id(), b.id());
}

#[tokio::test]
async fn locked_outputs_precede_change() {
    let ledger = MemoryLedger::default();
    ledger.seed(ALICE, &[1_000], None);
    let service = DraftService::default();
    let alice = Address::from_bytes(ALICE);

    let tranche = |at: u64, amount: Amount| {
        Output::new(
            alice,
            amount,
            None,
            LockSpec::time_lock(at, LockSpec::single_key(alice)).unwrap(),
        )
    };
    let req = LockedRequest::new(
        OperationKind::Vesting,
        ALICE,
        vec![tranche(1_000, 100), tranche(2_000, 100)],
    )
    .with_extension("schedule", "linear");

    let draft = service
        .build_locked(&ledger, &req, &service.context())
        .await
        .unwrap();
    assert_eq!(draft.outputs.len(), 3);
    assert!(matches!(draft.outputs[0].lock, LockSpec::TimeLock { unlock_at: 1_000, .. }));
    assert!(matches!(draft.outputs[1].lock, LockSpec::TimeLock { unlock_at: 2_000, .. }));
    assert_eq!(draft.outputs[2].amount, 800);
    assert_eq!(draft.metadata.operation, OperationKind::Vesting);
    assert_balanced(&draft);
}

#[tokio::test]
async fn errors_report_kind_and_trace_id() {
    let ledger = MemoryLedger::default();
    let service = DraftService::default();
    let ctx = service.context();

    let req = BatchTransferRequest {
        from: ALICE.to_vec(),
        items: vec![TransferItem::new([1; 20], 5), TransferItem::new([2; 33], 5)],
        token_id: None,
    };
    let err = service.batch_transfer(&ledger, &req, &ctx).await.unwrap_err();
    let report = err.to_report();

    assert_eq!(report.kind, ErrorKind::Validation);
    assert_eq!(report.trace_id, ctx.trace_id);
    assert_eq!(report.detail["field"], "items[1].to");
    assert!(!report.retryable);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["kind"], "validation");
}

// ---------------------------------------------------------------------------
// Timeout & cancellation
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn slow_ledger_times_out_without_a_draft() {
    let ledger = MemoryLedger {
        query_delay: Some(Duration::from_secs(60)),
        ..MemoryLedger::default()
    };
    ledger.seed(ALICE, &[1_000], None);
    let service = DraftService::new(BuilderConfig {
        call_timeout_ms: 250,
        ..BuilderConfig::default()
    });

    let err = service
        .transfer(&ledger, &TransferRequest::new(ALICE, BOB, 10), &service.context())
        .await
        .unwrap_err();
    assert_eq!(err.error, DraftError::Timeout { after_ms: 250 });
    assert!(err.is_retryable());
}

#[tokio::test(start_paused = true)]
async fn cancel_abandons_an_in_flight_build() {
    let ledger = MemoryLedger {
        query_delay: Some(Duration::from_secs(5)),
        ..MemoryLedger::default()
    };
    ledger.seed(ALICE, &[1_000], None);
    let service = DraftService::default();
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let ctx = service.context().with_cancel(cancel_rx);

    let req = TransferRequest::new(ALICE, BOB, 10);
    let build = service.transfer(&ledger, &req, &ctx);
    let cancel = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel_tx.send(true).unwrap();
    };
    let (result, ()) = tokio::join!(build, cancel);

    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn pre_cancelled_context_never_queries() {
    let ledger = MemoryLedger::default();
    ledger.seed(ALICE, &[1_000], None);
    let service = DraftService::default();
    let (cancel_tx, cancel_rx) = watch::channel(false);
    cancel_tx.send(true).unwrap();

    let err = service
        .transfer(
            &ledger,
            &TransferRequest::new(ALICE, BOB, 10),
            &service.context().with_cancel(cancel_rx),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submission_signs_each_input_once() {
    let ledger = MemoryLedger::default();
    ledger.seed(ALICE, &[100, 100, 100], None);
    let service = DraftService::default();
    let wallet = MemoryWallet::new(ALICE);
    let ctx = service.context();

    let draft = service
        .transfer(&ledger, &TransferRequest::new(ALICE, BOB, 250), &ctx)
        .await
        .unwrap();
    let result = submit_draft(&ledger, &wallet, &draft, &ctx).await.unwrap();

    assert!(result.accepted);
    assert_eq!(*ledger.hash_requests.read(), vec![0, 1, 2]);
    assert_eq!(wallet.signed.read().len(), 3);
    assert_eq!(ledger.broadcasts.read().len(), 1);
    assert_eq!(result.tx_hash.len(), 64);
}

#[tokio::test]
async fn rejected_broadcast_is_terminal_ledger_error() {
    let ledger = MemoryLedger {
        reject_with: Some("double spend".into()),
        ..MemoryLedger::default()
    };
    ledger.seed(ALICE, &[100], None);
    let service = DraftService::default();
    let wallet = MemoryWallet::new(ALICE);
    let ctx = service.context();

    let draft = service
        .transfer(&ledger, &TransferRequest::new(ALICE, BOB, 100), &ctx)
        .await
        .unwrap();
    let err = submit_draft(&ledger, &wallet, &draft, &ctx).await.unwrap_err();

    assert_eq!(
        err.error,
        DraftError::Ledger {
            code: BROADCAST_REJECTED,
            message: "double spend".into()
        }
    );
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn foreign_wallet_cannot_submit() {
    let ledger = MemoryLedger::default();
    ledger.seed(ALICE, &[100], None);
    let service = DraftService::default();
    let ctx = service.context();

    let draft = service
        .transfer(&ledger, &TransferRequest::new(ALICE, BOB, 100), &ctx)
        .await
        .unwrap();
    let err = submit_draft(&ledger, &MemoryWallet::new(BOB), &draft, &ctx)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(ledger.broadcasts.read().is_empty());
}

// ---------------------------------------------------------------------------
// Reads & resources
// ---------------------------------------------------------------------------

#[tokio::test]
async fn balances_fan_out_in_order() {
    let ledger = MemoryLedger::default();
    let owners: Vec<[u8; 20]> = (1..=12u8).map(|n| [n; 20]).collect();
    for (i, owner) in owners.iter().enumerate() {
        ledger.seed(*owner, &[i as Amount + 1, 10], None);
    }

    let mut progress = Vec::new();
    let results = query_balances(
        &ledger,
        owners.iter().map(|o| Address::from_bytes(*o)).collect(),
        None,
        BatchConfig {
            batch_size: 5,
            workers: 2,
        },
        &CallContext::default(),
        |done, total| progress.push((done, total)),
    )
    .await;

    let balances: Vec<Amount> = results.into_iter().map(|(_, r)| r.unwrap()).collect();
    assert_eq!(balances, (1..=12).map(|n| n + 10).collect::<Vec<Amount>>());
    assert_eq!(progress, vec![(5, 12), (10, 12), (12, 12)]);
}

#[tokio::test]
async fn deploy_resource_rejects_empty_bytes() {
    let ledger = MemoryLedger::default();
    let service = DraftService::default();
    let ctx = service.context();

    let err = service
        .deploy_resource(&ledger, &[], None, &ctx)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let id = service
        .deploy_resource(&ledger, b"(module)", Some("application/wasm"), &ctx)
        .await
        .unwrap();
    assert_eq!(id, ResourceId::from_bytes(sha256(b"(module)")));
}
