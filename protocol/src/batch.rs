//! # Batched Reads
//!
//! Bounded-concurrency helper for read-only fan-out, e.g. refreshing the
//! balances of many accounts. Items are processed chunk by chunk; within a
//! chunk at most `workers` futures are in flight.
//!
//! This helper is never used for input selection. Draft builds query one
//! sender at a time through [`crate::service::DraftService`].

use futures::stream::{self, StreamExt};
use std::future::Future;

use crate::config::BatchConfig;
use crate::context::CallContext;
use crate::error::DraftError;
use crate::ledger::LedgerQuery;
use crate::transaction::selector::available_balance;
use crate::types::{Address, Amount, TokenId};

/// Applies `f` to every item and returns the results in input order.
///
/// `progress(done, total)` runs after each chunk completes.
pub async fn parallel_map<T, R, F, Fut, P>(
    items: Vec<T>,
    config: BatchConfig,
    mut progress: P,
    f: F,
) -> Vec<R>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = R>,
    P: FnMut(usize, usize),
{
    let config = config.normalized();
    let total = items.len();
    let mut results = Vec::with_capacity(total);
    let mut pending = items.into_iter();

    loop {
        let chunk: Vec<T> = pending.by_ref().take(config.batch_size).collect();
        if chunk.is_empty() {
            break;
        }

        let mut indexed: Vec<(usize, R)> = stream::iter(chunk.into_iter().enumerate())
            .map(|(i, item)| {
                let fut = f(item);
                async move { (i, fut.await) }
            })
            .buffer_unordered(config.workers)
            .collect()
            .await;
        indexed.sort_unstable_by_key(|(i, _)| *i);
        results.extend(indexed.into_iter().map(|(_, r)| r));

        progress(results.len(), total);
    }

    results
}

/// Balance of each address in one token identity, in input order.
///
/// One failed query does not fail the batch; its slot holds the error.
pub async fn query_balances<P>(
    ledger: &dyn LedgerQuery,
    addresses: Vec<Address>,
    token_id: Option<TokenId>,
    config: BatchConfig,
    ctx: &CallContext,
    progress: P,
) -> Vec<(Address, Result<Amount, DraftError>)>
where
    P: FnMut(usize, usize),
{
    parallel_map(addresses, config, progress, |address| async move {
        let balance = async {
            let utxos = ctx
                .guard(ledger.query_utxos(&address, token_id.as_ref()))
                .await?;
            available_balance(&utxos, token_id.as_ref())
        }
        .await;
        (address, balance)
    })
    .await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
