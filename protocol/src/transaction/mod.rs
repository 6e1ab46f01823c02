//! # Transaction Module
//!
//! Pure draft construction: everything between a caller's request and an
//! unsigned [`TransactionDraft`], with no I/O.
//!
//! ## Architecture
//!
//! ```text
//! request.rs    — Raw request shapes (bytes in, nothing checked)
//! validation.rs — Request -> Valid* with field-named errors
//! selector.rs   — Deterministic sequential UTXO selection
//! fee.rs        — Fee attribution (receiver pays)
//! change.rs     — Change output computation
//! payload.rs    — Canonical base64-of-JSON payload codec
//! assembler.rs  — Per-kind outputs + change + payload -> TransactionDraft
//! draft.rs      — TransactionDraft, DraftMetadata, OperationKind
//! ```
//!
//! ## Build Flow
//!
//! 1. **Validate**: [`validate_transfer`] and friends, before any I/O.
//! 2. **Query**: the caller fetches candidate UTXOs (see [`crate::service`]).
//! 3. **Select**: [`select_utxos`] against [`DraftAssembler::requirement`].
//! 4. **Assemble**: [`DraftAssembler::assemble`] adds change and payload.
//!
//! Sender balance invariant, per token identity:
//! `sum(inputs) == sum(outputs)` once change is included; the fee never
//! touches the sender's side.

pub mod assembler;
pub mod change;
pub mod draft;
pub mod fee;
pub mod payload;
pub mod request;
pub mod selector;
pub mod validation;

pub use assembler::{DraftAssembler, DraftIntent};
pub use change::compute_change;
pub use draft::{DraftMetadata, OperationKind, TransactionDraft};
pub use fee::{FeeBearer, FeePolicy};
pub use payload::Payload;
pub use request::{BatchTransferRequest, BurnRequest, LockedRequest, TransferItem, TransferRequest};
pub use selector::{available_balance, select_utxos, Selection};
pub use validation::{
    validate_batch, validate_burn, validate_locked, validate_transfer, ValidBatch, ValidBurn,
    ValidItem, ValidLocked, ValidTransfer,
};
