//! Analysis orchestration.
//!
//! One entry point per analysis kind. Each call walks the same path:
//! validate, fingerprint, cache lookup (memory then durable), join any
//! identical in-flight computation, otherwise compute (skill extraction
//! and model scoring in parallel), assemble, write both cache tiers, and
//! hand the record to the persistence chain without waiting for it.
//!
//! Cancellation is cooperative and per caller: a joiner that cancels gets
//! its rejection immediately, while the shared computation keeps running
//! for everyone still waiting. Only when the last joiner leaves is the
//! underlying work aborted.

pub mod dedupe;
pub mod fingerprint;
pub mod score;

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cache::durable::DurableCache;
use crate::cache::memo::Memoizer;
use crate::cache::tiered::TieredCache;
use crate::clients::profile::ProfileSource;
use crate::clients::retry::CallError;
use crate::clients::scoring::{ScoreModel, ScoreRequest};
use crate::errors::AnalysisError;
use crate::models::analysis::{AnalysisKind, AnalysisRecord, AnalysisResult, Suggestions};
use crate::models::profile::{ProfileSection, ProfileSuggestion, SuggestionPriority};
use crate::persistence::{persist_best_effort, AnalysisStore};
use crate::telemetry::PerformanceMonitor;
use crate::worker::{WorkerChannel, WorkerError};

use dedupe::{InterestGuard, PendingRequestTable, SharedAnalysis};
use score::{fallback_tokens, score_skill_overlap};

const CACHE_NAMESPACE: &str = "analysis";

#[derive(Debug, Clone, Deserialize)]
pub struct ResumeAnalysisRequest {
    pub user_id: Uuid,
    pub resume_text: String,
    pub job_description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileAnalysisRequest {
    pub user_id: Uuid,
    pub profile_url: String,
}

pub struct AnalysisOrchestrator {
    cache: TieredCache<AnalysisResult>,
    pending: PendingRequestTable,
    memo: Memoizer,
    worker: WorkerChannel,
    scorer: Arc<dyn ScoreModel>,
    profiles: Arc<dyn ProfileSource>,
    store: Arc<dyn AnalysisStore>,
    monitor: Arc<PerformanceMonitor>,
}

impl AnalysisOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        cache_capacity: usize,
        cache_ttl: Duration,
        durable: Arc<dyn DurableCache>,
        worker: WorkerChannel,
        scorer: Arc<dyn ScoreModel>,
        profiles: Arc<dyn ProfileSource>,
        store: Arc<dyn AnalysisStore>,
        monitor: Arc<PerformanceMonitor>,
    ) -> Self {
        Self {
            cache: TieredCache::new(cache_capacity, cache_ttl, CACHE_NAMESPACE, durable),
            pending: PendingRequestTable::new(),
            memo: Memoizer::new(cache_capacity, cache_ttl),
            worker,
            scorer,
            profiles,
            store,
            monitor,
        }
    }

    /// Scores a resume against a job description.
    pub async fn analyze_resume(
        self: Arc<Self>,
        request: ResumeAnalysisRequest,
        token: CancellationToken,
    ) -> Result<AnalysisResult, AnalysisError> {
        if request.resume_text.trim().is_empty() {
            return Err(AnalysisError::Validation("resume text is empty".to_string()));
        }
        if request.job_description.trim().is_empty() {
            return Err(AnalysisError::Validation(
                "job description is empty".to_string(),
            ));
        }

        let fp = fingerprint::resume(&request.resume_text, &request.job_description);
        if let Some(hit) = self.cached(&fp).await {
            return Ok(hit);
        }

        let this = Arc::clone(&self);
        let compute_fp = fp.clone();
        let (shared, guard, started) = self.pending.join_or_start(&fp, move |compute_token| {
            spawn_shared(async move {
                let outcome = this
                    .compute_resume(request, &compute_fp, &compute_token)
                    .await;
                this.pending.remove(&compute_fp);
                outcome
            })
        });
        if !started {
            debug!("Joined in-flight resume analysis for identical input");
        }
        join_shared(shared, guard, &token).await
    }

    /// Fetches and scores a public profile.
    pub async fn analyze_profile(
        self: Arc<Self>,
        request: ProfileAnalysisRequest,
        token: CancellationToken,
    ) -> Result<AnalysisResult, AnalysisError> {
        let url = request.profile_url.trim();
        if url.is_empty() {
            return Err(AnalysisError::Validation("profile URL is empty".to_string()));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(AnalysisError::Validation(
                "profile URL must start with http:// or https://".to_string(),
            ));
        }

        let fp = fingerprint::profile(&request.profile_url);
        if let Some(hit) = self.cached(&fp).await {
            return Ok(hit);
        }

        let this = Arc::clone(&self);
        let compute_fp = fp.clone();
        let (shared, guard, started) = self.pending.join_or_start(&fp, move |compute_token| {
            spawn_shared(async move {
                let outcome = this
                    .compute_profile(request, &compute_fp, &compute_token)
                    .await;
                this.pending.remove(&compute_fp);
                outcome
            })
        });
        if !started {
            debug!("Joined in-flight profile analysis for identical input");
        }
        join_shared(shared, guard, &token).await
    }

    async fn cached(&self, fingerprint: &str) -> Option<AnalysisResult> {
        let lookup = Instant::now();
        let hit = self.cache.get(fingerprint).await;
        self.monitor.record("cache_lookup", lookup.elapsed());
        hit
    }

    async fn compute_resume(
        &self,
        request: ResumeAnalysisRequest,
        fingerprint: &str,
        token: &CancellationToken,
    ) -> Result<AnalysisResult, AnalysisError> {
        let started = Instant::now();

        // Extraction and model scoring have no data dependency; run both
        // and join.
        let extraction = async {
            let resume_skills = self.extract_memoized(&request.resume_text).await?;
            let jd_skills = self.extract_memoized(&request.job_description).await?;
            Ok::<_, WorkerError>((resume_skills, jd_skills))
        };
        let score_request = ScoreRequest::Resume {
            resume_text: request.resume_text.clone(),
            job_description: request.job_description.clone(),
        };
        let scoring = async {
            let call = Instant::now();
            let verdict = self.scorer.score(&score_request, token).await;
            self.monitor.record("model_score", call.elapsed());
            verdict
        };

        let (extraction, verdict) = tokio::join!(extraction, scoring);
        if token.is_cancelled() {
            return Err(AnalysisError::Cancelled);
        }
        let verdict = verdict.map_err(map_call_error)?;

        let (overlap, degraded, warnings) = match extraction {
            Ok((resume_skills, jd_skills)) => {
                (score_skill_overlap(&resume_skills, &jd_skills), false, vec![])
            }
            Err(e) => {
                warn!("Skill extraction unavailable, falling back to reduced scoring: {e}");
                let overlap = score_skill_overlap(
                    &fallback_tokens(&request.resume_text),
                    &fallback_tokens(&request.job_description),
                );
                let warning =
                    "Skill extraction was unavailable; the score was computed from reduced input."
                        .to_string();
                (overlap, true, vec![warning])
            }
        };

        let result = AnalysisResult {
            score: overlap.score,
            matching_skills: overlap.matching,
            missing_skills: overlap.missing,
            suggestions: Suggestions::Text(verdict.suggestions),
            strengths: verdict.strengths,
            weaknesses: verdict.weaknesses,
            raw_model_text: verdict.raw_text,
            degraded,
            warnings,
        };

        self.finish(
            request.user_id,
            fingerprint,
            AnalysisKind::Resume,
            result,
            started,
        )
        .await
    }

    async fn compute_profile(
        &self,
        request: ProfileAnalysisRequest,
        fingerprint: &str,
        token: &CancellationToken,
    ) -> Result<AnalysisResult, AnalysisError> {
        let started = Instant::now();

        let fetch = Instant::now();
        let document = self
            .profiles
            .fetch(&request.profile_url, token)
            .await
            .map_err(map_call_error)?;
        self.monitor.record("profile_fetch", fetch.elapsed());
        if token.is_cancelled() {
            return Err(AnalysisError::Cancelled);
        }

        // No partial data exists yet, so a worker failure here is fatal.
        let parsed = self
            .worker
            .parse_profile_data(document)
            .await
            .map_err(|e| match e {
                WorkerError::Unavailable => AnalysisError::TransientService(
                    "profile analysis is temporarily unavailable".to_string(),
                ),
                WorkerError::Processing(msg) => {
                    AnalysisError::Validation(format!("profile could not be analyzed: {msg}"))
                }
            })?;
        let (profile, mut warnings) = parsed.into_parts();
        let mut degraded = !warnings.is_empty();

        let suggesting = self.worker.generate_initial_suggestions(profile.clone());
        let score_request = ScoreRequest::Profile {
            profile: profile.clone(),
        };
        let scoring = async {
            let call = Instant::now();
            let verdict = self.scorer.score(&score_request, token).await;
            self.monitor.record("model_score", call.elapsed());
            verdict
        };

        let (suggestions, verdict) = tokio::join!(suggesting, scoring);
        if token.is_cancelled() {
            return Err(AnalysisError::Cancelled);
        }
        let verdict = verdict.map_err(map_call_error)?;

        // A usable profile exists by now, so suggestion failure only
        // degrades the result.
        let mut suggestions = match suggestions {
            Ok(s) => s,
            Err(e) => {
                warn!("Suggestion generation failed, returning model suggestions only: {e}");
                degraded = true;
                warnings.push("Some suggestions could not be generated.".to_string());
                vec![]
            }
        };
        suggestions.extend(verdict.suggestions.iter().map(|text| ProfileSuggestion {
            section: ProfileSection::Profile,
            text: text.clone(),
            priority: SuggestionPriority::Medium,
        }));

        let overlap = score_skill_overlap(&profile.skills, &verdict.target_skills);
        let result = AnalysisResult {
            score: overlap.score,
            matching_skills: overlap.matching,
            missing_skills: overlap.missing,
            suggestions: Suggestions::Profile(suggestions),
            strengths: verdict.strengths,
            weaknesses: verdict.weaknesses,
            raw_model_text: verdict.raw_text,
            degraded,
            warnings,
        };

        self.finish(
            request.user_id,
            fingerprint,
            AnalysisKind::Profile,
            result,
            started,
        )
        .await
    }

    /// Cache write, fire-and-forget persistence, latency sample.
    async fn finish(
        &self,
        user_id: Uuid,
        fingerprint: &str,
        kind: AnalysisKind,
        result: AnalysisResult,
        started: Instant,
    ) -> Result<AnalysisResult, AnalysisError> {
        self.cache.set(fingerprint, &result).await;

        let record = AnalysisRecord::from_result(user_id, fingerprint, kind, &result);
        let store = Arc::clone(&self.store);
        // Spawned with its own error boundary: the chain cannot fail, and
        // the caller never waits on it.
        tokio::spawn(async move {
            let outcome = persist_best_effort(store.as_ref(), &record).await;
            debug!("Persistence outcome for {}: {outcome:?}", record.user_id);
        });

        self.monitor.record(
            match kind {
                AnalysisKind::Resume => "analyze_resume",
                AnalysisKind::Profile => "analyze_profile",
            },
            started.elapsed(),
        );
        Ok(result)
    }

    async fn extract_memoized(&self, text: &str) -> Result<Vec<String>, WorkerError> {
        let call = Instant::now();
        let skills = self
            .memo
            .get_or_compute("extract_skills", text, || self.worker.extract_skills(text))
            .await;
        self.monitor.record("worker_extract", call.elapsed());
        skills
    }
}

/// Runs a computation on its own task so no single joiner's cancellation
/// can tear it down, and exposes it as a cloneable shared future.
fn spawn_shared<F>(compute: F) -> SharedAnalysis
where
    F: std::future::Future<Output = Result<AnalysisResult, AnalysisError>> + Send + 'static,
{
    let handle = tokio::spawn(async move { compute.await.map_err(Arc::new) });
    async move {
        match handle.await {
            Ok(outcome) => outcome,
            Err(e) => Err(Arc::new(AnalysisError::Internal(format!(
                "analysis task failed: {e}"
            )))),
        }
    }
    .boxed()
    .shared()
}

/// Waits for the shared computation, racing the caller's own token. The
/// guard is released on either exit, which cancels the underlying work
/// only when this was the last interested caller.
async fn join_shared(
    shared: SharedAnalysis,
    guard: InterestGuard,
    token: &CancellationToken,
) -> Result<AnalysisResult, AnalysisError> {
    let outcome = if token.is_cancelled() {
        Err(AnalysisError::Cancelled)
    } else {
        tokio::select! {
            outcome = shared => outcome.map_err(|e| (*e).clone()),
            _ = token.cancelled() => Err(AnalysisError::Cancelled),
        }
    };
    drop(guard);
    outcome
}

fn map_call_error(error: CallError) -> AnalysisError {
    match &error {
        CallError::Cancelled => AnalysisError::Cancelled,
        CallError::Timeout(_) | CallError::Network(_) => {
            AnalysisError::TransientService(error.to_string())
        }
        CallError::Status {
            retryable: true, ..
        } => AnalysisError::TransientService(error.to_string()),
        CallError::Status { .. } | CallError::Shape(_) => {
            AnalysisError::Internal(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::durable::memory::MemoryDurableCache;
    use crate::clients::scoring::ModelVerdict;
    use crate::persistence::testing::ScriptedStore;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Scoring double: counts calls, optionally delays, honors the token.
    struct MockScorer {
        calls: AtomicU32,
        delay: Duration,
        verdict: fn() -> Result<ModelVerdict, CallError>,
    }

    impl MockScorer {
        fn ok() -> Self {
            Self::with_delay(Duration::ZERO)
        }

        fn with_delay(delay: Duration) -> Self {
            Self {
                calls: AtomicU32::new(0),
                delay,
                verdict: || {
                    Ok(ModelVerdict {
                        suggestions: vec!["quantify your impact".to_string()],
                        strengths: vec!["solid core stack".to_string()],
                        weaknesses: vec!["no cloud experience".to_string()],
                        target_skills: vec!["rust".to_string(), "aws".to_string()],
                        raw_text: "{}".to_string(),
                    })
                },
            }
        }

        fn hanging() -> Self {
            Self {
                calls: AtomicU32::new(0),
                delay: Duration::from_secs(3600),
                verdict: || panic!("hanging scorer must be cancelled"),
            }
        }

        fn count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ScoreModel for MockScorer {
        async fn score(
            &self,
            _request: &ScoreRequest,
            token: &CancellationToken,
        ) -> Result<ModelVerdict, CallError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(self.delay) => {}
                    _ = token.cancelled() => return Err(CallError::Cancelled),
                }
            }
            (self.verdict)()
        }
    }

    struct MockProfileSource {
        calls: AtomicU32,
        document: Value,
    }

    impl MockProfileSource {
        fn with_document(document: Value) -> Self {
            Self {
                calls: AtomicU32::new(0),
                document,
            }
        }
    }

    #[async_trait]
    impl ProfileSource for MockProfileSource {
        async fn fetch(
            &self,
            _profile_url: &str,
            _token: &CancellationToken,
        ) -> Result<Value, CallError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.document.clone())
        }
    }

    struct Harness {
        orchestrator: Arc<AnalysisOrchestrator>,
        scorer: Arc<MockScorer>,
        store: Arc<ScriptedStore>,
        worker: WorkerChannel,
    }

    fn harness(scorer: MockScorer) -> Harness {
        harness_with(scorer, WorkerChannel::spawn(), ScriptedStore::default())
    }

    fn harness_with(scorer: MockScorer, worker: WorkerChannel, store: ScriptedStore) -> Harness {
        let scorer = Arc::new(scorer);
        let store = Arc::new(store);
        let profiles = Arc::new(MockProfileSource::with_document(json!({
            "headline": "Platform Engineer",
            "summary": "Builds reliable backend services in rust on aws.",
            "skills": ["rust", "docker"],
            "positions": [{}],
            "education": [{}]
        })));
        let orchestrator = Arc::new(AnalysisOrchestrator::new(
            16,
            Duration::from_secs(60),
            Arc::new(MemoryDurableCache::new()),
            worker.clone(),
            scorer.clone(),
            profiles,
            store.clone(),
            Arc::new(PerformanceMonitor::new(32)),
        ));
        Harness {
            orchestrator,
            scorer,
            store,
            worker,
        }
    }

    fn resume_request() -> ResumeAnalysisRequest {
        ResumeAnalysisRequest {
            user_id: Uuid::new_v4(),
            resume_text: "react, node, sql".to_string(),
            job_description: "react, node, aws, sql".to_string(),
        }
    }

    fn profile_request() -> ProfileAnalysisRequest {
        ProfileAnalysisRequest {
            user_id: Uuid::new_v4(),
            profile_url: "https://example.com/in/jane".to_string(),
        }
    }

    #[tokio::test]
    async fn test_resume_overlap_example() {
        let h = harness(MockScorer::ok());
        let result = h
            .orchestrator
            .clone()
            .analyze_resume(resume_request(), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result.score, 75);
        assert_eq!(result.matching_skills, vec!["react", "node", "sql"]);
        assert_eq!(result.missing_skills, vec!["aws"]);
        assert!(!result.degraded);
        assert_eq!(result.suggestions.len(), 1);
        assert_eq!(result.strengths, vec!["solid core stack"]);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_external_calls() {
        let h = harness(MockScorer::ok());
        let first = h
            .orchestrator
            .clone()
            .analyze_resume(resume_request(), CancellationToken::new())
            .await
            .unwrap();
        let second = h
            .orchestrator
            .clone()
            .analyze_resume(resume_request(), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(h.scorer.count(), 1);
        assert_eq!(first.score, second.score);
    }

    #[tokio::test]
    async fn test_concurrent_identical_calls_share_one_computation() {
        let h = harness(MockScorer::with_delay(Duration::from_millis(50)));
        let (a, b) = tokio::join!(
            h.orchestrator
                .clone()
                .analyze_resume(resume_request(), CancellationToken::new()),
            h.orchestrator
                .clone()
                .analyze_resume(resume_request(), CancellationToken::new()),
        );
        assert_eq!(a.unwrap().score, 75);
        assert_eq!(b.unwrap().score, 75);
        // One scoring call, and one extraction per input text.
        assert_eq!(h.scorer.count(), 1);
        assert_eq!(h.worker.handled(), 2);
        assert!(h.orchestrator.pending.is_empty());
    }

    #[tokio::test]
    async fn test_cancellation_rejects_promptly_without_retry() {
        let h = harness(MockScorer::hanging());
        let token = CancellationToken::new();
        let cancel = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        });
        let started = Instant::now();
        let err = h
            .orchestrator
            .clone()
            .analyze_resume(resume_request(), token)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Cancelled));
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(h.scorer.count(), 1);
        // The sole joiner left, so the computation aborted and cleaned up.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(h.orchestrator.pending.is_empty());
    }

    #[tokio::test]
    async fn test_other_joiner_still_gets_result_after_one_cancels() {
        let h = harness(MockScorer::with_delay(Duration::from_millis(80)));
        let cancelled_token = CancellationToken::new();
        let patient = h
            .orchestrator
            .clone()
            .analyze_resume(resume_request(), CancellationToken::new());
        let impatient = h
            .orchestrator
            .clone()
            .analyze_resume(resume_request(), cancelled_token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancelled_token.cancel();
        });
        let (patient, impatient, _) = tokio::join!(patient, impatient, canceller);

        assert!(matches!(impatient.unwrap_err(), AnalysisError::Cancelled));
        assert_eq!(patient.unwrap().score, 75);
        assert_eq!(h.scorer.count(), 1);
    }

    #[tokio::test]
    async fn test_result_resolves_even_when_all_persistence_fails() {
        let h = harness_with(
            MockScorer::ok(),
            WorkerChannel::spawn(),
            ScriptedStore::failing_all(),
        );
        let result = h
            .orchestrator
            .clone()
            .analyze_resume(resume_request(), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result.score, 75);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(h.store.upsert_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.store.procedure_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_successful_analysis_is_persisted_once() {
        let h = harness(MockScorer::ok());
        h.orchestrator
            .clone()
            .analyze_resume(resume_request(), CancellationToken::new())
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(h.store.upsert_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.store.insert_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_worker_failure_degrades_resume_analysis() {
        let h = harness_with(
            MockScorer::ok(),
            WorkerChannel::disconnected(),
            ScriptedStore::default(),
        );
        let result = h
            .orchestrator
            .clone()
            .analyze_resume(resume_request(), CancellationToken::new())
            .await
            .unwrap();
        assert!(result.degraded);
        assert!(!result.warnings.is_empty());
        // Reduced tokenization still finds the overlap in this input.
        assert_eq!(result.score, 75);
    }

    #[tokio::test]
    async fn test_worker_failure_is_fatal_for_profile_analysis() {
        let h = harness_with(
            MockScorer::ok(),
            WorkerChannel::disconnected(),
            ScriptedStore::default(),
        );
        let err = h
            .orchestrator
            .clone()
            .analyze_profile(profile_request(), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::TransientService(_)));
    }

    #[tokio::test]
    async fn test_profile_analysis_happy_path() {
        let h = harness(MockScorer::ok());
        let result = h
            .orchestrator
            .clone()
            .analyze_profile(profile_request(), CancellationToken::new())
            .await
            .unwrap();
        // Profile lists rust but not aws; target skills are [rust, aws].
        assert_eq!(result.score, 50);
        assert_eq!(result.matching_skills, vec!["rust"]);
        assert_eq!(result.missing_skills, vec!["aws"]);
        match &result.suggestions {
            Suggestions::Profile(s) => {
                assert!(s.iter().any(|s| s.section == ProfileSection::Profile));
            }
            Suggestions::Text(_) => panic!("profile analysis must return structured suggestions"),
        }
        assert!(!result.degraded);
    }

    #[tokio::test]
    async fn test_validation_rejects_empty_inputs() {
        let h = harness(MockScorer::ok());
        let err = h
            .orchestrator
            .clone()
            .analyze_resume(
                ResumeAnalysisRequest {
                    user_id: Uuid::new_v4(),
                    resume_text: "  ".to_string(),
                    job_description: "x".to_string(),
                },
                CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Validation(_)));

        let err = h
            .orchestrator
            .clone()
            .analyze_profile(
                ProfileAnalysisRequest {
                    user_id: Uuid::new_v4(),
                    profile_url: "ftp://example.com".to_string(),
                },
                CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Validation(_)));
        assert_eq!(h.scorer.count(), 0);
    }

    #[tokio::test]
    async fn test_transient_exhaustion_is_typed() {
        let scorer = MockScorer {
            calls: AtomicU32::new(0),
            delay: Duration::ZERO,
            verdict: || Err(CallError::status(503, "upstream down")),
        };
        let h = harness(scorer);
        let err = h
            .orchestrator
            .clone()
            .analyze_resume(resume_request(), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::TransientService(_)));
    }
}
