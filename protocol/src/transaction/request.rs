//! Raw build requests, as handed over by callers.
//!
//! Address and token fields are plain byte strings here: an empty
//! `Vec<u8>` means "absent". Nothing in this module checks anything; the
//! validator turns a request into its typed `Valid*` counterpart.

use serde_json::Value;
use std::collections::BTreeMap;

use super::draft::OperationKind;
use crate::types::{Amount, Output, Recipient, TokenId};

/// Send `amount` from one account to another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferRequest {
    pub from: Vec<u8>,
    pub to: Vec<u8>,
    pub amount: Amount,
    pub token_id: Option<Vec<u8>>,
}

impl TransferRequest {
    pub fn new(from: impl Into<Vec<u8>>, to: impl Into<Vec<u8>>, amount: Amount) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
            token_id: None,
        }
    }

    pub fn with_token(mut self, token_id: impl Into<Vec<u8>>) -> Self {
        self.token_id = Some(token_id.into());
        self
    }
}

/// One destination of a batch transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferItem {
    pub to: Vec<u8>,
    pub amount: Amount,
    /// `None` inherits the batch token; `Some` must equal it.
    pub token_id: Option<Vec<u8>>,
}

impl TransferItem {
    pub fn new(to: impl Into<Vec<u8>>, amount: Amount) -> Self {
        Self {
            to: to.into(),
            amount,
            token_id: None,
        }
    }
}

/// Several destinations funded by one input selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchTransferRequest {
    pub from: Vec<u8>,
    pub items: Vec<TransferItem>,
    pub token_id: Option<Vec<u8>>,
}

/// Destroy `amount` of the sender's funds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BurnRequest {
    pub from: Vec<u8>,
    pub amount: Amount,
    pub token_id: Option<Vec<u8>>,
}

/// Outputs prepared by a business service, each with its own lock.
#[derive(Debug, Clone, PartialEq)]
pub struct LockedRequest {
    pub kind: OperationKind,
    pub from: Vec<u8>,
    pub outputs: Vec<Output>,
    pub token_id: Option<Vec<u8>>,
    /// Reserved `to` of the payload: the contract, validator or counterparty
    /// the operation addresses, if it has one.
    pub to: Option<Recipient>,
    pub extensions: BTreeMap<String, Value>,
}

impl LockedRequest {
    pub fn new(kind: OperationKind, from: impl Into<Vec<u8>>, outputs: Vec<Output>) -> Self {
        Self {
            kind,
            from: from.into(),
            outputs,
            token_id: None,
            to: None,
            extensions: BTreeMap::new(),
        }
    }

    pub fn with_token(mut self, token_id: impl Into<Vec<u8>>) -> Self {
        self.token_id = Some(token_id.into());
        self
    }

    /// Typed variant of [`LockedRequest::with_token`]; `None` is native.
    pub fn with_token_id(mut self, token_id: Option<TokenId>) -> Self {
        self.token_id = token_id.map(|t| t.as_bytes().to_vec());
        self
    }

    pub fn with_to(mut self, to: impl Into<Recipient>) -> Self {
        self.to = Some(to.into());
        self
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }
}
