//! Change output computation.

use crate::error::DraftError;
use crate::types::{Address, Amount, Output, TokenId};

/// Returns the change output owed to `sender`, or `None` on an exact match.
///
/// Change is locked to the sender's key and carries the inputs' token
/// identity. Input below output is an internal-consistency failure: the
/// selector never returns a selection that short.
pub fn compute_change(
    total_input: Amount,
    total_output: Amount,
    sender: Address,
    token_id: Option<TokenId>,
) -> Result<Option<Output>, DraftError> {
    let change = total_input.checked_sub(total_output).ok_or_else(|| {
        DraftError::Internal(format!(
            "selected input {total_input} below required output {total_output}"
        ))
    })?;

    if change == 0 {
        return Ok(None);
    }
    Ok(Some(Output::pay_to(sender, change, token_id)))
}
