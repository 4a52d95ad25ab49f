//! Background batch sealer.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use pohw_ledger::BatchEngine;

/// Handle to a running sealer task.
pub struct SealerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SealerHandle {
    /// Signal shutdown and wait for the task. An in-flight seal completes;
    /// proofs still pending stay queued for the next node.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

/// Spawn the sealer: polls the engine's triggers and seals when one fires.
///
/// Sealing failures are logged and retried on the next tick; the queue
/// itself is restored by the engine, so no proof is lost to a failed seal.
pub fn spawn_sealer(engine: Arc<BatchEngine>, poll_interval: Duration) -> SealerHandle {
    let (shutdown, mut shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if engine.should_create_batch() {
                        match engine.create_batch() {
                            Ok(Some(batch)) => {
                                tracing::info!(batch_id = %batch.id, size = batch.size, "sealer sealed batch");
                            }
                            Ok(None) => {}
                            Err(e) => {
                                tracing::error!(error = %e, "seal attempt failed, queue retained");
                            }
                        }
                    }
                }
                _ = shutdown_rx.changed() => {
                    tracing::info!(pending = engine.pending_len(), "sealer shutting down");
                    break;
                }
            }
        }
    });
    SealerHandle { shutdown, task }
}
