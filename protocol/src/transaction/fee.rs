//! # Fee Attribution
//!
//! The network fee is borne by the receiving side of every operation. The
//! sender's selected inputs and change are never reduced by a fee term, for
//! any operation kind, so single, batched and burn drafts share one change
//! formula:
//!
//! ```text
//! change = total_selected_input - total_required_output
//! ```
//!
//! Burn once deducted a fee from change. That rule is gone; keep burn on the
//! same formula as transfers unless the business rule itself changes.

use serde::{Deserialize, Serialize};

use super::draft::OperationKind;
use crate::types::Amount;

/// Party charged the network fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum FeeBearer {
    Receiver,
}

/// Fee attribution rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeePolicy;

impl FeePolicy {
    pub fn new() -> Self {
        Self
    }

    /// Who pays the fee for `kind`.
    pub fn bearer(&self, _kind: OperationKind) -> FeeBearer {
        FeeBearer::Receiver
    }

    /// Amount subtracted from the sender's side for `kind`.
    pub fn sender_deduction(&self, kind: OperationKind) -> Amount {
        match self.bearer(kind) {
            FeeBearer::Receiver => 0,
        }
    }

    /// Amount the sender must cover: outputs plus any sender-side fee.
    pub fn sender_requirement(&self, kind: OperationKind, outputs: Amount) -> Option<Amount> {
        outputs.checked_add(self.sender_deduction(kind))
    }
}
