#![allow(dead_code)]

use serde::{Deserialize, Serialize};

/// Profile section a suggestion points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileSection {
    Profile,
    Experience,
    Network,
    Skills,
    Education,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionPriority {
    High,
    Medium,
    Low,
}

/// A single actionable improvement for a profile. Derived per run,
/// never persisted on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSuggestion {
    pub section: ProfileSection,
    pub text: String,
    pub priority: SuggestionPriority,
}

/// Normalized view of a fetched profile document, produced by the worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedProfile {
    pub headline: String,
    pub summary: String,
    pub skills: Vec<String>,
    pub experience_count: u32,
    pub education_count: u32,
}

impl NormalizedProfile {
    /// A profile with no headline, no summary and no skills carries
    /// nothing the scoring pipeline can work with.
    pub fn is_empty(&self) -> bool {
        self.headline.is_empty() && self.summary.is_empty() && self.skills.is_empty()
    }
}

/// Outcome of profile-document parsing. The fallback path is an explicit
/// variant, not an exception branch: callers decide what a partial
/// extraction means for them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ParsedProfile {
    Validated(NormalizedProfile),
    PartiallyExtracted {
        profile: NormalizedProfile,
        warnings: Vec<String>,
    },
}

impl ParsedProfile {
    pub fn profile(&self) -> &NormalizedProfile {
        match self {
            ParsedProfile::Validated(p) => p,
            ParsedProfile::PartiallyExtracted { profile, .. } => profile,
        }
    }

    pub fn warnings(&self) -> &[String] {
        match self {
            ParsedProfile::Validated(_) => &[],
            ParsedProfile::PartiallyExtracted { warnings, .. } => warnings,
        }
    }

    pub fn into_parts(self) -> (NormalizedProfile, Vec<String>) {
        match self {
            ParsedProfile::Validated(p) => (p, vec![]),
            ParsedProfile::PartiallyExtracted { profile, warnings } => (profile, warnings),
        }
    }
}
