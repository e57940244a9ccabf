//! Best-effort durable storage of analysis results.
//!
//! The chain tries each write shape in order: idempotent upsert on the
//! natural key, plain insert, then the `record_analysis` database
//! procedure. Every failure is caught, logged and advanced past; when all
//! three fail the result simply stays in memory (and in the cache tiers).
//! Nothing here ever surfaces an error to the analysis caller.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::analysis::AnalysisRecord;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// The three durable write shapes. Each accepts the same logical payload.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    async fn upsert(&self, record: &AnalysisRecord) -> Result<(), PersistenceError>;
    async fn insert(&self, record: &AnalysisRecord) -> Result<(), PersistenceError>;
    async fn record_via_procedure(&self, record: &AnalysisRecord) -> Result<(), PersistenceError>;
}

/// Which strategy, if any, landed the write. Diagnostics only; callers of
/// the analysis API never see this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    Upserted,
    Inserted,
    Procedure,
    InMemoryOnly,
}

/// Runs the fallback chain. Infallible by construction: the worst case is
/// `InMemoryOnly` plus a warning in the logs.
pub async fn persist_best_effort(
    store: &dyn AnalysisStore,
    record: &AnalysisRecord,
) -> PersistOutcome {
    match store.upsert(record).await {
        Ok(()) => {
            debug!("Analysis for user {} upserted", record.user_id);
            return PersistOutcome::Upserted;
        }
        Err(e) => warn!("Analysis upsert failed, trying insert: {e}"),
    }

    match store.insert(record).await {
        Ok(()) => {
            debug!("Analysis for user {} inserted", record.user_id);
            return PersistOutcome::Inserted;
        }
        Err(e) => warn!("Analysis insert failed, trying procedure: {e}"),
    }

    match store.record_via_procedure(record).await {
        Ok(()) => {
            debug!("Analysis for user {} recorded via procedure", record.user_id);
            PersistOutcome::Procedure
        }
        Err(e) => {
            warn!(
                "All persistence strategies failed for user {}; result kept in memory only: {e}",
                record.user_id
            );
            PersistOutcome::InMemoryOnly
        }
    }
}

/// Postgres-backed store.
pub struct PgAnalysisStore {
    pool: PgPool,
}

impl PgAnalysisStore {
    pub fn new(pool: PgPool) -> Self {
        info!("Analysis store initialized");
        Self { pool }
    }
}

#[async_trait]
impl AnalysisStore for PgAnalysisStore {
    async fn upsert(&self, record: &AnalysisRecord) -> Result<(), PersistenceError> {
        sqlx::query(
            r#"
            INSERT INTO analyses
                (user_id, fingerprint, kind, score, suggestions, strengths, weaknesses)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id, fingerprint) DO UPDATE SET
                score = EXCLUDED.score,
                suggestions = EXCLUDED.suggestions,
                strengths = EXCLUDED.strengths,
                weaknesses = EXCLUDED.weaknesses,
                updated_at = now()
            "#,
        )
        .bind(record.user_id)
        .bind(&record.fingerprint)
        .bind(record.kind.as_str())
        .bind(record.score)
        .bind(&record.suggestions)
        .bind(&record.strengths)
        .bind(&record.weaknesses)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert(&self, record: &AnalysisRecord) -> Result<(), PersistenceError> {
        sqlx::query(
            r#"
            INSERT INTO analyses
                (user_id, fingerprint, kind, score, suggestions, strengths, weaknesses)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.user_id)
        .bind(&record.fingerprint)
        .bind(record.kind.as_str())
        .bind(record.score)
        .bind(&record.suggestions)
        .bind(&record.strengths)
        .bind(&record.weaknesses)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_via_procedure(&self, record: &AnalysisRecord) -> Result<(), PersistenceError> {
        sqlx::query("SELECT record_analysis($1, $2, $3, $4, $5, $6, $7)")
            .bind(record.user_id)
            .bind(&record.fingerprint)
            .bind(record.kind.as_str())
            .bind(record.score)
            .bind(&record.suggestions)
            .bind(&record.strengths)
            .bind(&record.weaknesses)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
