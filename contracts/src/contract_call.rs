//! # Contract Calls
//!
//! Invokes a method on a deployed contract. The call itself travels as a
//! deposit output locked to the contract, with the canonical call document
//! as lock data:
//!
//! ```text
//! Contract { contract, data: {"args":...,"method":"..."} }
//! ```
//!
//! A call always moves value: the ledger has no zero-amount outputs, so a
//! call without a deposit cannot be expressed.

use serde_json::{json, Value};
use tracing::debug;

use cairn_protocol::transaction::{LockedRequest, OperationKind};
use cairn_protocol::types::{Address, Amount, LockSpec, Output, ResourceId, TokenId};
use cairn_protocol::{CallContext, DraftService, LedgerQuery, ServiceError, TransactionDraft};

use crate::error::ServiceSetupError;

#[derive(Debug, Clone, PartialEq)]
pub struct ContractCallParams {
    pub caller: Address,
    pub contract: ResourceId,
    pub method: String,
    pub args: Value,
    pub deposit: Amount,
    pub token_id: Option<TokenId>,
}

fn valid_method(method: &str) -> bool {
    let mut chars = method.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[derive(Debug, Clone, Default)]
pub struct ContractCallService {
    drafts: DraftService,
}

impl ContractCallService {
    pub fn new(drafts: DraftService) -> Self {
        Self { drafts }
    }

    pub fn request(&self, params: &ContractCallParams) -> Result<LockedRequest, ServiceSetupError> {
        if !valid_method(&params.method) {
            return Err(ServiceSetupError::invalid(
                "method",
                format!("{:?} is not an identifier", params.method),
            ));
        }
        if params.deposit == 0 {
            return Err(ServiceSetupError::invalid(
                "deposit",
                "a contract call must lock a nonzero deposit",
            ));
        }

        let call = json!({ "method": params.method, "args": params.args });
        let data = serde_json::to_vec(&call)
            .map_err(|e| ServiceSetupError::invalid("args", e.to_string()))?;
        let output = Output::new(
            params.caller,
            params.deposit,
            params.token_id,
            LockSpec::contract(params.contract, data),
        );

        debug!(contract = %params.contract, method = %params.method, "contract call prepared");

        Ok(LockedRequest::new(
            OperationKind::ContractCall,
            params.caller.as_bytes().to_vec(),
            vec![output],
        )
        .with_token_id(params.token_id)
        .with_to(params.contract)
        .with_extension("entrypoint", params.method.as_str())
        .with_extension("args", params.args.clone()))
    }

    pub async fn call(
        &self,
        ledger: &dyn LedgerQuery,
        params: &ContractCallParams,
        ctx: &CallContext,
    ) -> Result<TransactionDraft, ServiceError> {
        crate::build_prepared(&self.drafts, ledger, self.request(params), ctx).await
    }
}
