//! Transaction outputs.

use serde::{Deserialize, Serialize};

use super::address::Address;
use super::amount::Amount;
use super::lock::LockSpec;
use super::token::TokenId;

/// A value-bearing output of a draft.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub owner: Address,
    #[serde(with = "super::amount::decimal")]
    pub amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<TokenId>,
    pub lock: LockSpec,
}

impl Output {
    pub fn new(owner: Address, amount: Amount, token_id: Option<TokenId>, lock: LockSpec) -> Self {
        Self {
            owner,
            amount,
            token_id,
            lock,
        }
    }

    /// A plain payment: owned by and locked to `owner`'s key.
    pub fn pay_to(owner: Address, amount: Amount, token_id: Option<TokenId>) -> Self {
        Self::new(owner, amount, token_id, LockSpec::single_key(owner))
    }

    /// Canonical bytes for draft ids.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(128);
        buf.extend_from_slice(self.owner.as_bytes());
        buf.extend_from_slice(&self.amount.to_le_bytes());
        match &self.token_id {
            Some(id) => {
                buf.push(0x01);
                buf.extend_from_slice(id.as_bytes());
            }
            None => buf.push(0x00),
        }
        buf.extend_from_slice(&self.lock.canonical_bytes());
        buf
    }
}
