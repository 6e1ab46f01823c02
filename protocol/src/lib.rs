// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Cairn Protocol — Draft Construction Core
//!
//! Cairn turns business intents (transfer, batched transfer, burn, and the
//! lock-bearing operations built in `cairn-contracts`) into balanced,
//! unsigned UTXO transaction drafts. It never holds a private key: the node
//! computes signature hashes, an external wallet signs them.
//!
//! ## Architecture
//!
//! - **types** — Fixed-width identifiers, amounts, UTXOs, outputs, locks.
//! - **transaction** — Validation, selection, fees, change, payload, assembly.
//! - **service** — Async build pipeline over the ledger collaborator.
//! - **submit** — Signature hashes, external signing, finalize, broadcast.
//! - **batch** — Bounded-concurrency read fan-out (balances).
//! - **ledger** — Collaborator traits: ledger query/submit and wallet.
//! - **context** — Per-call trace id, timeout and cancellation.
//! - **error** — Error taxonomy callers branch on.
//! - **config** — Protocol constants and builder limits.
//! - **logging** — Stock `tracing` subscriber setup.
//!
//! ## Ground Rules
//!
//! 1. Every call is stateless: UTXOs are queried fresh, nothing is cached.
//! 2. Selection is sequential in ledger order.
//! 3. The receiver bears the network fee. Sender change is never reduced.
//! 4. No collaborator is implicit. Handles are parameters, always.

pub mod batch;
pub mod config;
pub mod context;
pub mod error;
pub mod hash;
pub mod ledger;
pub mod logging;
pub mod service;
pub mod submit;
pub mod transaction;
pub mod types;

pub use context::CallContext;
pub use error::{DraftError, ErrorKind, ErrorReport, ServiceError};
pub use ledger::{BroadcastResult, CollaboratorError, LedgerQuery, LedgerSubmit, Wallet};
pub use service::DraftService;
pub use transaction::{OperationKind, TransactionDraft};
