//! Submission retry loop.
//!
//! ```text
//!            ┌──────────── transient error, delay ───────────┐
//!            ▼                                               │
//!       Attempting ──► Success                               │
//!            │                                               │
//!            ├──► Retrying ──────────────────────────────────┘
//!            │
//!            └──► PermanentFailure (signer + diagnostic attached)
//! ```
//!
//! Transient errors are retried without limit at a fixed delay. Retries
//! resubmit the same logical call; idempotency (nonce reuse) is up to the
//! submission closure. The loop checks the cancellation token before every
//! attempt and while sleeping.

use std::{future::Future, sync::Arc, time::Duration};

use alloy::primitives::Address;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::ext::{
    classify_node_error, diagnose_node_error, BoxError, NodeErrorKind, NodeErrorMessage,
    SubmissionError,
};

/// Default delay between attempts after a transient error.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

// ============================================================================
// Sleeper
// ============================================================================

/// Source of the delay between attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

// ============================================================================
// Attempt State
// ============================================================================

/// Bookkeeping for one `submit` call.
#[derive(Debug, Clone, Default)]
pub struct SubmissionAttempt {
    /// Attempts made so far
    pub attempts: u32,
    /// Node message of the most recent failure
    pub last_error: Option<String>,
    /// Total time spent waiting between attempts
    pub waited: Duration,
}

// ============================================================================
// SubmissionRetrier
// ============================================================================

/// Retries a submission while the node reports transient errors.
#[derive(Clone)]
pub struct SubmissionRetrier {
    signer: Address,
    delay: Duration,
    sleeper: Arc<dyn Sleeper>,
    cancel: CancellationToken,
}

impl SubmissionRetrier {
    /// Retrier for `signer` with the default delay and a tokio sleeper.
    pub fn new(signer: Address) -> Self {
        Self {
            signer,
            delay: DEFAULT_RETRY_DELAY,
            sleeper: Arc::new(TokioSleeper),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn signer(&self) -> Address {
        self.signer
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `attempt` until it succeeds or fails permanently.
    ///
    /// A permanent failure carries the signer address and, when the node
    /// message is recognized, a [`NodeDiagnostic`](crate::ext::NodeDiagnostic).
    pub async fn submit<T, E, F, Fut>(&self, mut attempt: F) -> Result<T, SubmissionError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: NodeErrorMessage,
    {
        let signer = self.signer;
        let mut state = SubmissionAttempt::default();

        loop {
            if self.cancel.is_cancelled() {
                return Err(self.cancelled(&state));
            }

            state.attempts += 1;
            let error = match attempt().await {
                Ok(value) => {
                    if state.attempts > 1 {
                        tracing::info!(%signer, attempts = state.attempts, "submission succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            let message = error.node_message().into_owned();
            let kind = classify_node_error(&message);

            if !kind.is_transient() {
                tracing::warn!(
                    %signer, attempts = state.attempts, ?kind, error = %message,
                    "submission failed permanently"
                );
                return Err(self.permanent(kind, message, state.attempts, error.into_source()));
            }

            tracing::debug!(
                %signer, attempt = state.attempts, ?kind, delay = ?self.delay,
                "transient submission error, retrying"
            );
            state.last_error = Some(message);

            tokio::select! {
                _ = self.cancel.cancelled() => return Err(self.cancelled(&state)),
                _ = self.sleeper.sleep(self.delay) => state.waited += self.delay,
            }
        }
    }

    fn permanent(
        &self,
        kind: NodeErrorKind,
        message: String,
        attempts: u32,
        source: BoxError,
    ) -> SubmissionError {
        let diagnostic = diagnose_node_error(&message, self.signer);
        SubmissionError::Permanent {
            signer: self.signer,
            kind,
            message,
            attempts,
            diagnostic,
            source,
        }
    }

    fn cancelled(&self, state: &SubmissionAttempt) -> SubmissionError {
        tracing::info!(
            signer = %self.signer,
            attempts = state.attempts,
            waited = ?state.waited,
            last_error = ?state.last_error,
            "submission cancelled"
        );
        SubmissionError::Cancelled {
            attempts: state.attempts,
        }
    }
}
