//! Worker execution context for CPU-bound analysis work.
//!
//! A dedicated OS thread owns the extraction/parsing routines; the rest of
//! the process talks to it exclusively through a message channel, one
//! oneshot reply per request. No memory is shared. Back-to-back calls may
//! complete in either order; await sequentially when order matters.

pub mod extract;
pub mod profile;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::models::profile::{NormalizedProfile, ParsedProfile, ProfileSuggestion};

#[derive(Debug, Clone, Error)]
pub enum WorkerError {
    /// The worker thread is gone (or was never started in this context).
    #[error("Worker unavailable")]
    Unavailable,

    #[error("Worker processing failed: {0}")]
    Processing(String),
}

enum WorkerRequest {
    ExtractSkills {
        text: String,
        reply: oneshot::Sender<Result<Vec<String>, WorkerError>>,
    },
    ParseProfile {
        raw: Value,
        reply: oneshot::Sender<Result<ParsedProfile, WorkerError>>,
    },
    GenerateSuggestions {
        profile: NormalizedProfile,
        reply: oneshot::Sender<Result<Vec<ProfileSuggestion>, WorkerError>>,
    },
}

/// Handle to the worker thread. Cheap to clone; all clones feed the same
/// channel. Constructed once at startup and injected everywhere it is
/// needed.
#[derive(Clone)]
pub struct WorkerChannel {
    tx: mpsc::Sender<WorkerRequest>,
    handled: Arc<AtomicU64>,
}

impl WorkerChannel {
    /// Spawns the worker thread and returns its handle.
    pub fn spawn() -> Self {
        let (tx, mut rx) = mpsc::channel::<WorkerRequest>(64);
        let handled = Arc::new(AtomicU64::new(0));
        let handled_in_thread = Arc::clone(&handled);

        std::thread::Builder::new()
            .name("analysis-worker".to_string())
            .spawn(move || {
                info!("Analysis worker thread started");
                while let Some(request) = rx.blocking_recv() {
                    handled_in_thread.fetch_add(1, Ordering::Relaxed);
                    match request {
                        WorkerRequest::ExtractSkills { text, reply } => {
                            let _ = reply.send(Ok(extract::extract_skills(&text)));
                        }
                        WorkerRequest::ParseProfile { raw, reply } => {
                            let _ = reply.send(profile::parse_profile_data(&raw));
                        }
                        WorkerRequest::GenerateSuggestions { profile, reply } => {
                            let _ = reply.send(Ok(profile::generate_initial_suggestions(&profile)));
                        }
                    }
                }
                debug!("Analysis worker channel closed, thread exiting");
            })
            .expect("failed to spawn analysis worker thread");

        Self { tx, handled }
    }

    /// A handle whose worker is gone. Every call fails with `Unavailable`;
    /// used to exercise degraded paths.
    #[cfg(test)]
    pub fn disconnected() -> Self {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        Self {
            tx,
            handled: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Requests handled since startup. Diagnostics only.
    #[allow(dead_code)]
    pub fn handled(&self) -> u64 {
        self.handled.load(Ordering::Relaxed)
    }

    pub async fn extract_skills(&self, text: &str) -> Result<Vec<String>, WorkerError> {
        let (reply, rx) = oneshot::channel();
        self.send(WorkerRequest::ExtractSkills {
            text: text.to_string(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| WorkerError::Unavailable)?
    }

    pub async fn parse_profile_data(&self, raw: Value) -> Result<ParsedProfile, WorkerError> {
        let (reply, rx) = oneshot::channel();
        self.send(WorkerRequest::ParseProfile { raw, reply }).await?;
        rx.await.map_err(|_| WorkerError::Unavailable)?
    }

    pub async fn generate_initial_suggestions(
        &self,
        profile: NormalizedProfile,
    ) -> Result<Vec<ProfileSuggestion>, WorkerError> {
        let (reply, rx) = oneshot::channel();
        self.send(WorkerRequest::GenerateSuggestions { profile, reply })
            .await?;
        rx.await.map_err(|_| WorkerError::Unavailable)?
    }

    async fn send(&self, request: WorkerRequest) -> Result<(), WorkerError> {
        self.tx
            .send(request)
            .await
            .map_err(|_| WorkerError::Unavailable)
    }
}
