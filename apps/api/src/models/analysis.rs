#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::profile::ProfileSuggestion;

/// Which analysis pipeline produced a result. Stored alongside the
/// persisted record and folded into the cache namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Resume,
    Profile,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Resume => "resume",
            AnalysisKind::Profile => "profile",
        }
    }
}

/// Suggestions carried on an analysis result. Resume analysis produces
/// plain text suggestions; profile analysis produces structured ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Suggestions {
    Text(Vec<String>),
    Profile(Vec<ProfileSuggestion>),
}

impl Suggestions {
    pub fn len(&self) -> usize {
        match self {
            Suggestions::Text(v) => v.len(),
            Suggestions::Profile(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The assembled outcome of one analysis run. Created once per successful
/// orchestration, immutable afterwards; clones of it live in the cache tiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Skill overlap score, 0-100.
    pub score: u8,
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub suggestions: Suggestions,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    /// Unparsed text returned by the scoring model, kept for display.
    pub raw_model_text: String,
    /// True when skill extraction was unavailable and the score was
    /// computed from reduced inputs.
    pub degraded: bool,
    pub warnings: Vec<String>,
}

/// Logical payload accepted by every durable write shape (upsert, insert,
/// stored procedure). Natural key: (user_id, fingerprint).
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRecord {
    pub user_id: Uuid,
    pub fingerprint: String,
    pub kind: AnalysisKind,
    pub score: i16,
    pub suggestions: Value,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

impl AnalysisRecord {
    pub fn from_result(
        user_id: Uuid,
        fingerprint: &str,
        kind: AnalysisKind,
        result: &AnalysisResult,
    ) -> Self {
        Self {
            user_id,
            fingerprint: fingerprint.to_string(),
            kind,
            score: i16::from(result.score),
            suggestions: serde_json::to_value(&result.suggestions).unwrap_or(Value::Null),
            strengths: result.strengths.clone(),
            weaknesses: result.weaknesses.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnalysisRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub fingerprint: String,
    pub kind: String,
    pub score: i16,
    pub suggestions: Value,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
