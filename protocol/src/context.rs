//! Per-call context: trace id, deadline and cancellation.
//!
//! Every await on a collaborator goes through [`CallContext::guard`], which
//! races the call against the context's timeout and its cancel channel. A
//! build that loses the race returns an error and no draft; nothing partial
//! escapes.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use uuid::Uuid;

use crate::config::{BuilderConfig, DEFAULT_CALL_TIMEOUT};
use crate::error::{DraftError, ServiceError};
use crate::ledger::CollaboratorError;

/// Caller-supplied bounds for one service call.
#[derive(Debug, Clone)]
pub struct CallContext {
    pub trace_id: Uuid,
    /// Bound on each individual collaborator call.
    pub timeout: Duration,
    /// Flipping the channel to `true` abandons the call.
    pub cancel: Option<watch::Receiver<bool>>,
}

impl Default for CallContext {
    fn default() -> Self {
        Self::new(DEFAULT_CALL_TIMEOUT)
    }
}

impl CallContext {
    pub fn new(timeout: Duration) -> Self {
        Self {
            trace_id: Uuid::new_v4(),
            timeout,
            cancel: None,
        }
    }

    pub fn from_config(config: &BuilderConfig) -> Self {
        Self::new(config.call_timeout())
    }

    pub fn with_cancel(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn with_trace_id(mut self, trace_id: Uuid) -> Self {
        self.trace_id = trace_id;
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().map_or(false, |rx| *rx.borrow())
    }

    /// Fails with [`DraftError::Cancelled`] if cancellation was requested.
    pub fn check(&self) -> Result<(), DraftError> {
        if self.is_cancelled() {
            return Err(DraftError::Cancelled);
        }
        Ok(())
    }

    /// Wraps a [`DraftError`] with this call's trace id.
    pub fn fail(&self, error: DraftError) -> ServiceError {
        ServiceError::new(self.trace_id, error)
    }

    /// Awaits a collaborator call under this context's deadline and cancel
    /// signal.
    pub async fn guard<F, T>(&self, call: F) -> Result<T, DraftError>
    where
        F: Future<Output = Result<T, CollaboratorError>>,
    {
        self.check()?;

        let mut cancel = self.cancel.clone();
        let cancelled = async move {
            match cancel.as_mut() {
                Some(rx) => loop {
                    if *rx.borrow_and_update() {
                        return;
                    }
                    if rx.changed().await.is_err() {
                        // Sender gone: cancellation can no longer happen.
                        std::future::pending::<()>().await;
                    }
                },
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            result = call => result.map_err(DraftError::from),
            _ = tokio::time::sleep(self.timeout) => Err(DraftError::Timeout {
                after_ms: self.timeout.as_millis() as u64,
            }),
            _ = cancelled => Err(DraftError::Cancelled),
        }
    }
}
