//! # Error Taxonomy
//!
//! Every fallible operation in the crate returns a [`DraftError`]. Callers
//! branch on [`DraftError::kind`] rather than matching message text, and ask
//! [`DraftError::is_retryable`] whether a backoff-and-retry makes sense.
//!
//! Service entry points wrap the error in a [`ServiceError`] that carries the
//! call's trace id, so a failure reported to an operator can be correlated
//! with the log lines of the build that produced it.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::ledger::CollaboratorError;
use crate::types::Amount;

// ---------------------------------------------------------------------------
// DraftError
// ---------------------------------------------------------------------------

/// Errors that can occur while building, encoding or submitting a draft.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    /// Malformed request. Raised before any I/O.
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// The filtered UTXO set cannot cover the required amount.
    #[error("insufficient balance: required {required}, found {found}")]
    InsufficientBalance { required: Amount, found: Amount },

    /// An extension key collides with a reserved payload field.
    #[error("payload extension key {key:?} collides with a reserved field")]
    FieldConflict { key: String },

    /// Transport failure talking to a collaborator.
    #[error("network error: {0}")]
    Network(String),

    /// The node rejected the request.
    #[error("ledger error {code}: {message}")]
    Ledger { code: u16, message: String },

    /// A collaborator call exceeded its deadline.
    #[error("collaborator call timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    /// The caller cancelled the build.
    #[error("operation cancelled")]
    Cancelled,

    /// An invariant the builder relies on was violated.
    #[error("internal consistency error: {0}")]
    Internal(String),
}

impl DraftError {
    /// Shorthand for a [`DraftError::Validation`].
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        DraftError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DraftError::Validation { .. } => ErrorKind::Validation,
            DraftError::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            DraftError::FieldConflict { .. } => ErrorKind::FieldConflict,
            DraftError::Network(_) => ErrorKind::Network,
            DraftError::Ledger { .. } => ErrorKind::Ledger,
            DraftError::Timeout { .. } => ErrorKind::Timeout,
            DraftError::Cancelled => ErrorKind::Cancelled,
            DraftError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Transport failures and timeouts are retryable; ledger rejections only
    /// when the node reports a server-side (5xx-class) code.
    pub fn is_retryable(&self) -> bool {
        match self {
            DraftError::Network(_) | DraftError::Timeout { .. } => true,
            DraftError::Ledger { code, .. } => (500..=599).contains(code),
            _ => false,
        }
    }

    /// The variant's fields as structured JSON.
    pub fn detail(&self) -> serde_json::Value {
        use serde_json::json;
        match self {
            DraftError::Validation { field, reason } => json!({ "field": field, "reason": reason }),
            DraftError::InsufficientBalance { required, found } => json!({
                "required": required.to_string(),
                "found": found.to_string(),
                "deficit": required.saturating_sub(*found).to_string(),
            }),
            DraftError::FieldConflict { key } => json!({ "key": key }),
            DraftError::Network(msg) => json!({ "cause": msg }),
            DraftError::Ledger { code, message } => json!({ "code": code, "message": message }),
            DraftError::Timeout { after_ms } => json!({ "after_ms": after_ms }),
            DraftError::Cancelled => json!({}),
            DraftError::Internal(msg) => json!({ "cause": msg }),
        }
    }
}

impl From<CollaboratorError> for DraftError {
    fn from(e: CollaboratorError) -> Self {
        match e {
            CollaboratorError::Network(msg) => DraftError::Network(msg),
            CollaboratorError::Ledger { code, message } => DraftError::Ledger { code, message },
        }
    }
}

// ---------------------------------------------------------------------------
// ErrorKind
// ---------------------------------------------------------------------------

/// Stable classification of a [`DraftError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    InsufficientBalance,
    FieldConflict,
    Network,
    Ledger,
    Timeout,
    Cancelled,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::InsufficientBalance => "insufficient_balance",
            ErrorKind::FieldConflict => "field_conflict",
            ErrorKind::Network => "network",
            ErrorKind::Ledger => "ledger",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Internal => "internal",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// ServiceError
// ---------------------------------------------------------------------------

/// A [`DraftError`] tagged with the trace id of the call that raised it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{trace_id}] {error}")]
pub struct ServiceError {
    pub trace_id: Uuid,
    #[source]
    pub error: DraftError,
}

impl ServiceError {
    pub fn new(trace_id: Uuid, error: DraftError) -> Self {
        Self { trace_id, error }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    pub fn is_retryable(&self) -> bool {
        self.error.is_retryable()
    }

    /// Human-readable message, without the trace id.
    pub fn message(&self) -> String {
        self.error.to_string()
    }

    pub fn detail(&self) -> serde_json::Value {
        self.error.detail()
    }

    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            message: self.message(),
            detail: self.detail(),
            trace_id: self.trace_id,
            retryable: self.is_retryable(),
        }
    }
}

/// Serializable form of a [`ServiceError`] for surfacing to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
    pub detail: serde_json::Value,
    pub trace_id: Uuid,
    pub retryable: bool,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
