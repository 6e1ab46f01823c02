//! Request validation.
//!
//! Every build call starts here, before any ledger I/O. The checks are
//! total and side-effect-free: a request either becomes a typed `Valid*`
//! value with fixed-width identifiers and nonzero amounts, or it is
//! rejected with a [`DraftError::Validation`] naming the offending field
//! (`from`, `amount`, `items[2].to`, `outputs[0].token_id`, ...).
//!
//! Checks run field by field in declaration order, so the first malformed
//! field is the one reported.

use serde_json::Value;
use std::collections::BTreeMap;

use super::draft::OperationKind;
use super::request::{BatchTransferRequest, BurnRequest, LockedRequest, TransferRequest};
use crate::config::{BuilderConfig, METHOD_EXTENSION, RESERVED_PAYLOAD_KEYS};
use crate::error::DraftError;
use crate::types::{Address, Amount, Output, Recipient, TokenId};

// ---------------------------------------------------------------------------
// Validated forms
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidTransfer {
    pub from: Address,
    pub to: Address,
    pub amount: Amount,
    pub token_id: Option<TokenId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidItem {
    pub to: Address,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidBatch {
    pub from: Address,
    pub items: Vec<ValidItem>,
    pub token_id: Option<TokenId>,
    /// Sum of item amounts; the single selection requirement.
    pub total: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidBurn {
    pub from: Address,
    pub amount: Amount,
    pub token_id: Option<TokenId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidLocked {
    pub kind: OperationKind,
    pub from: Address,
    pub outputs: Vec<Output>,
    pub token_id: Option<TokenId>,
    pub to: Option<Recipient>,
    pub extensions: BTreeMap<String, Value>,
    /// Sum of output amounts.
    pub total: Amount,
}

// ---------------------------------------------------------------------------
// Field checks
// ---------------------------------------------------------------------------

/// A required 20-byte account address.
pub fn account_address(field: &str, bytes: &[u8]) -> Result<Address, DraftError> {
    if bytes.is_empty() {
        return Err(DraftError::validation(field, "is required"));
    }
    Address::from_slice(bytes).map_err(|e| DraftError::validation(field, e.to_string()))
}

/// An optional 32-byte token identity. `None` is the native asset.
pub fn token_identity(field: &str, bytes: Option<&[u8]>) -> Result<Option<TokenId>, DraftError> {
    bytes
        .map(|b| TokenId::from_slice(b).map_err(|e| DraftError::validation(field, e.to_string())))
        .transpose()
}

fn nonzero_amount(field: &str, amount: Amount) -> Result<Amount, DraftError> {
    if amount == 0 {
        return Err(DraftError::validation(field, "must be greater than zero"));
    }
    Ok(amount)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub fn validate_transfer(req: &TransferRequest) -> Result<ValidTransfer, DraftError> {
    Ok(ValidTransfer {
        from: account_address("from", &req.from)?,
        to: account_address("to", &req.to)?,
        amount: nonzero_amount("amount", req.amount)?,
        token_id: token_identity("token_id", req.token_id.as_deref())?,
    })
}

/// Validates a batch against one token identity.
///
/// The identity is the batch's `token_id`, or else the first item token
/// present. Items without a token inherit it; items naming a different one
/// are rejected.
pub fn validate_batch(
    req: &BatchTransferRequest,
    config: &BuilderConfig,
) -> Result<ValidBatch, DraftError> {
    let from = account_address("from", &req.from)?;
    let token_id = match token_identity("token_id", req.token_id.as_deref())? {
        Some(token) => Some(token),
        // No batch-level token: the first item that names one sets it.
        None => match req.items.iter().position(|item| item.token_id.is_some()) {
            Some(i) => token_identity(
                &format!("items[{i}].token_id"),
                req.items[i].token_id.as_deref(),
            )?,
            None => None,
        },
    };

    if req.items.is_empty() {
        return Err(DraftError::validation("items", "must not be empty"));
    }
    if req.items.len() > config.max_batch_items {
        return Err(DraftError::validation(
            "items",
            format!(
                "{} items exceed the limit of {}",
                req.items.len(),
                config.max_batch_items
            ),
        ));
    }
    if req.items.len() >= config.max_outputs {
        return Err(DraftError::validation(
            "items",
            format!(
                "{} items leave no room for change under the output limit of {}",
                req.items.len(),
                config.max_outputs
            ),
        ));
    }

    let mut items = Vec::with_capacity(req.items.len());
    let mut total: Amount = 0;
    for (i, item) in req.items.iter().enumerate() {
        let to = account_address(&format!("items[{i}].to"), &item.to)?;
        let amount = nonzero_amount(&format!("items[{i}].amount"), item.amount)?;

        let field = format!("items[{i}].token_id");
        let item_token = token_identity(&field, item.token_id.as_deref())?;
        if item.token_id.is_some() && item_token != token_id {
            return Err(DraftError::validation(
                field,
                "differs from the batch token identity",
            ));
        }

        total = total
            .checked_add(amount)
            .ok_or_else(|| DraftError::validation("items", "total amount overflows"))?;
        items.push(ValidItem { to, amount });
    }

    Ok(ValidBatch {
        from,
        items,
        token_id,
        total,
    })
}

pub fn validate_burn(req: &BurnRequest) -> Result<ValidBurn, DraftError> {
    Ok(ValidBurn {
        from: account_address("from", &req.from)?,
        amount: nonzero_amount("amount", req.amount)?,
        token_id: token_identity("token_id", req.token_id.as_deref())?,
    })
}

/// Validates business-service outputs.
///
/// Reserved payload keys and the core-owned `method` extension are
/// reported here as [`DraftError::FieldConflict`] so the conflict surfaces
/// before the ledger is queried.
pub fn validate_locked(
    req: &LockedRequest,
    config: &BuilderConfig,
) -> Result<ValidLocked, DraftError> {
    if !req.kind.is_locked() {
        return Err(DraftError::validation(
            "kind",
            format!("{} does not take prepared outputs", req.kind),
        ));
    }

    let from = account_address("from", &req.from)?;
    let token_id = token_identity("token_id", req.token_id.as_deref())?;

    if req.outputs.is_empty() {
        return Err(DraftError::validation("outputs", "must not be empty"));
    }
    if req.outputs.len() >= config.max_outputs {
        return Err(DraftError::validation(
            "outputs",
            format!(
                "{} outputs leave no room for change under the limit of {}",
                req.outputs.len(),
                config.max_outputs
            ),
        ));
    }

    let mut total: Amount = 0;
    for (i, output) in req.outputs.iter().enumerate() {
        nonzero_amount(&format!("outputs[{i}].amount"), output.amount)?;
        if output.token_id != token_id {
            return Err(DraftError::validation(
                format!("outputs[{i}].token_id"),
                "differs from the request token identity",
            ));
        }
        total = total
            .checked_add(output.amount)
            .ok_or_else(|| DraftError::validation("outputs", "total amount overflows"))?;
    }

    if let Some(key) = req
        .extensions
        .keys()
        .find(|k| RESERVED_PAYLOAD_KEYS.contains(&k.as_str()) || k.as_str() == METHOD_EXTENSION)
    {
        return Err(DraftError::FieldConflict { key: key.clone() });
    }

    Ok(ValidLocked {
        kind: req.kind,
        from,
        outputs: req.outputs.clone(),
        token_id,
        to: req.to,
        extensions: req.extensions.clone(),
        total,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
