//! The anchoring boundary.
//!
//! The registry hands a sealed batch's root to an external chain client and
//! stores whatever receipt comes back, never validating its contents. There
//! is no built-in fallback client: a node without a real client simply does
//! not anchor.

use async_trait::async_trait;
use std::time::Duration;

use pohw_core::{BatchAnchor, BatchId};
use pohw_ledger::{AnchorView, BatchEngine};

use crate::error::RegistryError;

/// A client able to anchor a batch root on some external chain.
#[async_trait]
pub trait AnchorClient: Send + Sync {
    /// Chain identifier recorded in the anchor receipt.
    fn chain(&self) -> &str;

    /// Publish the batch root; returns the receipt on success.
    async fn anchor(&self, view: &AnchorView) -> Result<BatchAnchor, String>;
}

/// Retry schedule for anchor attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub attempts: u32,
    /// Delay before the second attempt; doubles each retry.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

/// Anchor one sealed batch with bounded exponential backoff, then write the
/// receipt back to the batch's append-only anchor list.
pub async fn anchor_with_retry(
    client: &dyn AnchorClient,
    engine: &BatchEngine,
    batch_id: &BatchId,
    policy: &RetryPolicy,
) -> Result<BatchAnchor, RegistryError> {
    let view = engine.anchor_view(batch_id)?;
    let mut delay = policy.base_delay;
    let mut last = String::new();

    for attempt in 1..=policy.attempts {
        match client.anchor(&view).await {
            Ok(receipt) => {
                engine.append_anchor(batch_id, receipt.clone())?;
                tracing::info!(
                    batch_id = %batch_id,
                    chain = client.chain(),
                    tx = %receipt.tx,
                    attempt,
                    "batch anchored"
                );
                return Ok(receipt);
            }
            Err(e) => {
                tracing::warn!(
                    batch_id = %batch_id,
                    chain = client.chain(),
                    attempt,
                    error = %e,
                    "anchor attempt failed"
                );
                last = e;
                if attempt < policy.attempts {
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }
    Err(RegistryError::AnchorFailed {
        attempts: policy.attempts,
        last,
    })
}
