//! # UTXO Selection
//!
//! Deterministic sequential selection:
//!
//! 1. Keep only candidates whose token identity equals the filter exactly
//!    (`None` matches only the native asset).
//! 2. Walk the survivors in the order the ledger returned them.
//! 3. Stop as soon as the running total reaches the requirement.
//!
//! No sorting and no largest-first heuristic: the same snapshot always
//! yields the same inputs. Batch transfers call this once with the summed
//! requirement.

use tracing::debug;

use crate::error::DraftError;
use crate::types::token::token_label;
use crate::types::{Amount, TokenId, Utxo};

/// Inputs chosen to cover a requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub utxos: Vec<Utxo>,
    pub total: Amount,
}

impl Selection {
    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }
}

/// Selects UTXOs from `candidates` covering `required` of `token_id`.
///
/// # Errors
///
/// [`DraftError::InsufficientBalance`] when the filtered set is exhausted
/// first; `found` is the full filtered total.
pub fn select_utxos(
    candidates: &[Utxo],
    required: Amount,
    token_id: Option<&TokenId>,
) -> Result<Selection, DraftError> {
    let mut selected = Vec::new();
    let mut total: Amount = 0;

    if required == 0 {
        return Ok(Selection {
            utxos: selected,
            total,
        });
    }

    for utxo in candidates.iter().filter(|u| u.matches_token(token_id)) {
        total = total
            .checked_add(utxo.amount)
            .ok_or_else(|| DraftError::Internal("selected input total overflows".into()))?;
        selected.push(utxo.clone());
        if total >= required {
            debug!(
                token = %token_label(token_id),
                candidates = candidates.len(),
                selected = selected.len(),
                %required,
                %total,
                "utxo selection satisfied"
            );
            return Ok(Selection {
                utxos: selected,
                total,
            });
        }
    }

    // Filtered set exhausted: `total` is everything the filter admits.
    debug!(
        token = %token_label(token_id),
        candidates = candidates.len(),
        %required,
        found = %total,
        "utxo selection short"
    );
    Err(DraftError::InsufficientBalance {
        required,
        found: total,
    })
}

/// Total of `candidates` admitted by the `token_id` filter.
pub fn available_balance(
    candidates: &[Utxo],
    token_id: Option<&TokenId>,
) -> Result<Amount, DraftError> {
    candidates
        .iter()
        .filter(|u| u.matches_token(token_id))
        .try_fold(0 as Amount, |acc, u| acc.checked_add(u.amount))
        .ok_or_else(|| DraftError::Internal("balance overflows".into()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
