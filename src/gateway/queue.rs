//! Request serialization gateway
//!
//! Many concurrent callers submit chat tasks; a single worker task drains
//! them in FIFO order and is the only caller of the inference backend, so
//! at most one generation is ever in flight. Each task carries a oneshot
//! reply channel back to its submitter.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::backend::InferenceBackend;
use crate::error::{AppError, Result};

/// A queued chat request
#[derive(Debug)]
pub struct ChatTask {
    pub prompt: String,
    pub model: String,
    pub submitted_at: DateTime<Utc>,
}

enum QueueMessage {
    Task(ChatTask, oneshot::Sender<Result<String>>),
    /// Sentinel that terminates the worker loop
    Shutdown,
}

/// Handle for submitting work to the single gateway worker
pub struct ChatGateway {
    tx: mpsc::Sender<QueueMessage>,
    reply_timeout: Duration,
}

impl ChatGateway {
    /// Spawn the worker loop and return a submission handle.
    ///
    /// * `capacity` - bound of the task queue; submissions beyond it wait
    ///   for queue space (admission control).
    /// * `reply_timeout` - how long a caller waits for its reply before
    ///   detaching with [`AppError::Timeout`].
    pub fn start(
        adapter: Arc<dyn InferenceBackend>,
        capacity: usize,
        reply_timeout: Duration,
    ) -> Self {
        let (tx, rx) = mpsc::channel::<QueueMessage>(capacity);

        tokio::spawn(async move {
            worker_loop(rx, adapter).await;
        });

        Self { tx, reply_timeout }
    }

    /// Submit a chat task and wait for its result.
    ///
    /// Empty prompt or model are rejected before the task ever reaches the
    /// queue. On timeout the caller detaches; the worker still runs the
    /// task to completion and discards the reply.
    pub async fn submit(&self, prompt: &str, model: &str) -> Result<String> {
        if prompt.trim().is_empty() {
            return Err(AppError::InvalidRequest("prompt must not be empty".to_string()));
        }
        if model.trim().is_empty() {
            return Err(AppError::InvalidRequest("model must not be empty".to_string()));
        }

        let task = ChatTask {
            prompt: prompt.to_string(),
            model: model.to_string(),
            submitted_at: Utc::now(),
        };

        let (reply_tx, reply_rx) = oneshot::channel();

        // One deadline spans queue admission and the reply wait: a full
        // queue must not hold a caller past its timeout either.
        let submission = async {
            self.tx
                .send(QueueMessage::Task(task, reply_tx))
                .await
                .map_err(|_| AppError::Internal("gateway worker is not running".to_string()))?;

            match reply_rx.await {
                Ok(result) => result,
                // Worker dropped the reply channel without sending; should
                // not happen while the loop is alive.
                Err(_) => Err(AppError::Internal(
                    "gateway worker dropped the reply channel".to_string(),
                )),
            }
        };

        match tokio::time::timeout(self.reply_timeout, submission).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout),
        }
    }

    /// Enqueue the shutdown sentinel. Tasks already queued ahead of it are
    /// still processed; later submissions fail.
    pub async fn shutdown(&self) {
        if self.tx.send(QueueMessage::Shutdown).await.is_err() {
            debug!("Gateway worker already stopped");
        }
    }
}

/// The single consumer of the task queue. A failing task never exits the
/// loop; only the shutdown sentinel does.
async fn worker_loop(mut rx: mpsc::Receiver<QueueMessage>, adapter: Arc<dyn InferenceBackend>) {
    info!("Gateway worker started");

    while let Some(message) = rx.recv().await {
        match message {
            QueueMessage::Shutdown => {
                info!("Gateway worker received shutdown sentinel");
                break;
            }
            QueueMessage::Task(task, reply_tx) => {
                let queued_for = Utc::now() - task.submitted_at;
                debug!(
                    model = %task.model,
                    queued_ms = queued_for.num_milliseconds(),
                    "Processing chat task"
                );

                let result = adapter.chat(&task.model, &task.prompt).await;

                if let Err(e) = &result {
                    warn!(model = %task.model, error = %e, "Chat task failed");
                }

                // A detached (timed out or disconnected) caller is fine:
                // the result is simply discarded.
                if reply_tx.send(result).is_err() {
                    debug!(model = %task.model, "Caller detached before reply delivery");
                }
            }
        }
    }

    info!("Gateway worker stopped");
}
