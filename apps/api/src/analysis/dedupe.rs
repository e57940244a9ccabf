//! In-flight request deduplication.
//!
//! At most one computation runs per fingerprint. Later callers join the
//! existing shared future instead of starting a second computation. Each
//! joiner holds an `InterestGuard`; the underlying computation is only
//! cancelled when every joiner has walked away, so one caller cancelling
//! never tears the result away from the others.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, Shared};
use tokio_util::sync::CancellationToken;

use crate::errors::AnalysisError;
use crate::models::analysis::AnalysisResult;

/// The shared view of one in-flight computation. The error side is `Arc`
/// so every joiner can observe the same failure.
pub type SharedAnalysis = Shared<BoxFuture<'static, Result<AnalysisResult, Arc<AnalysisError>>>>;

/// Joiner accounting for one computation.
struct Interest {
    joiners: AtomicUsize,
    compute_token: CancellationToken,
}

/// Held by each joiner for the duration of its wait. Dropping the last
/// guard cancels the underlying computation: nobody is listening anymore.
pub struct InterestGuard {
    interest: Arc<Interest>,
}

impl Drop for InterestGuard {
    fn drop(&mut self) {
        if self.interest.joiners.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.interest.compute_token.cancel();
        }
    }
}

struct PendingEntry {
    shared: SharedAnalysis,
    interest: Arc<Interest>,
}

/// Fingerprint -> in-flight computation. Entries are removed as soon as
/// the computation settles, however many callers joined it.
#[derive(Default)]
pub struct PendingRequestTable {
    inner: Mutex<HashMap<String, PendingEntry>>,
}

impl PendingRequestTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Joins the computation for `fingerprint`, starting it when absent.
    ///
    /// `start` receives the computation's own cancellation token (distinct
    /// from any joiner's token) and must return the shared future; it runs
    /// under the table lock, so it must only spawn, never await. The bool
    /// is true when this call started the computation.
    pub fn join_or_start<F>(
        &self,
        fingerprint: &str,
        start: F,
    ) -> (SharedAnalysis, InterestGuard, bool)
    where
        F: FnOnce(CancellationToken) -> SharedAnalysis,
    {
        let mut table = self.inner.lock().unwrap();

        if let Some(entry) = table.get(fingerprint) {
            entry.interest.joiners.fetch_add(1, Ordering::AcqRel);
            let guard = InterestGuard {
                interest: Arc::clone(&entry.interest),
            };
            return (entry.shared.clone(), guard, false);
        }

        let interest = Arc::new(Interest {
            joiners: AtomicUsize::new(1),
            compute_token: CancellationToken::new(),
        });
        let shared = start(interest.compute_token.clone());
        table.insert(
            fingerprint.to_string(),
            PendingEntry {
                shared: shared.clone(),
                interest: Arc::clone(&interest),
            },
        );
        (shared, InterestGuard { interest }, true)
    }

    /// Drops the entry for a settled computation. Idempotent.
    pub fn remove(&self, fingerprint: &str) {
        self.inner.lock().unwrap().remove(fingerprint);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
