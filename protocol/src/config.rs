//! # Builder Configuration & Constants
//!
//! Every fixed width, reserved name and default limit used by the draft
//! builder lives here. Runtime-tunable values are grouped into
//! [`BuilderConfig`] and [`BatchConfig`]; both deserialize with defaults so a
//! partial JSON object is a valid configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Identifier Widths
// ---------------------------------------------------------------------------

/// Account addresses are 20 bytes.
pub const ACCOUNT_ADDRESS_LENGTH: usize = 20;

/// Resource / contract identifiers are 32-byte content hashes.
pub const RESOURCE_ID_LENGTH: usize = 32;

/// Token identifiers are 32 bytes.
pub const TOKEN_ID_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Payload keys owned by the protocol. Extension keys may not reuse them.
pub const RESERVED_PAYLOAD_KEYS: [&str; 4] = ["from", "to", "amount", "token_id"];

/// Extension the assembler fills with the operation kind. Business
/// services may not set it.
pub const METHOD_EXTENSION: &str = "method";

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Maximum inputs in one draft. Selection beyond this is refused rather
/// than producing a transaction the node would reject for size.
pub const MAX_TX_INPUTS: usize = 256;

/// Maximum outputs in one draft, change included.
pub const MAX_TX_OUTPUTS: usize = 256;

/// Maximum items in one batch transfer. One slot is left for change.
pub const MAX_BATCH_ITEMS: usize = MAX_TX_OUTPUTS - 1;

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// Default bound on any single collaborator call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Batched Reads
// ---------------------------------------------------------------------------

pub const DEFAULT_BATCH_SIZE: usize = 50;
pub const DEFAULT_BATCH_WORKERS: usize = 8;

// ---------------------------------------------------------------------------
// BuilderConfig
// ---------------------------------------------------------------------------

/// Limits applied by the validator and assembler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub max_inputs: usize,
    pub max_outputs: usize,
    pub max_batch_items: usize,
    /// Default timeout for contexts created with [`crate::context::CallContext::from_config`].
    pub call_timeout_ms: u64,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            max_inputs: MAX_TX_INPUTS,
            max_outputs: MAX_TX_OUTPUTS,
            max_batch_items: MAX_BATCH_ITEMS,
            call_timeout_ms: DEFAULT_CALL_TIMEOUT.as_millis() as u64,
        }
    }
}

impl BuilderConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

// ---------------------------------------------------------------------------
// BatchConfig
// ---------------------------------------------------------------------------

/// Shape of a bounded-concurrency read batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Items per chunk. Progress is reported once per chunk.
    pub batch_size: usize,
    /// Maximum calls in flight at once.
    pub workers: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            workers: DEFAULT_BATCH_WORKERS,
        }
    }
}

impl BatchConfig {
    /// Zero values are treated as one so a misconfigured batch still runs.
    pub fn normalized(self) -> Self {
        Self {
            batch_size: self.batch_size.max(1),
            workers: self.workers.max(1),
        }
    }
}
