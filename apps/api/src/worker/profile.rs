//! Profile-document parsing and suggestion generation.
//!
//! The fetch endpoint returns a loosely-typed document. The happy path is
//! schema validation straight into `NormalizedProfile`; when that fails we
//! fall back to manual field extraction and report what was missing as an
//! explicit `PartiallyExtracted` variant instead of guessing silently.

use serde::Deserialize;
use serde_json::Value;

use crate::models::profile::{
    NormalizedProfile, ParsedProfile, ProfileSection, ProfileSuggestion, SuggestionPriority,
};
use crate::worker::extract::extract_skills;
use crate::worker::WorkerError;

/// Shape we expect from a well-formed fetch response.
#[derive(Debug, Deserialize)]
struct ProfileDocument {
    headline: String,
    #[serde(default)]
    summary: String,
    skills: Vec<String>,
    #[serde(default)]
    positions: Vec<Value>,
    #[serde(default)]
    education: Vec<Value>,
}

/// Parses a fetched profile document. Returns `Validated` when the schema
/// holds, `PartiallyExtracted` with warnings when only some fields could
/// be recovered, and an error when nothing usable exists.
pub fn parse_profile_data(raw: &Value) -> Result<ParsedProfile, WorkerError> {
    if let Ok(doc) = serde_json::from_value::<ProfileDocument>(raw.clone()) {
        let profile = NormalizedProfile {
            headline: doc.headline.trim().to_string(),
            summary: doc.summary.trim().to_string(),
            skills: normalize_skills(doc.skills),
            experience_count: doc.positions.len() as u32,
            education_count: doc.education.len() as u32,
        };
        return Ok(ParsedProfile::Validated(profile));
    }

    let mut warnings = Vec::new();

    let headline = string_field(raw, &["headline", "title"]).unwrap_or_else(|| {
        warnings.push("headline missing from profile document".to_string());
        String::new()
    });
    let summary = string_field(raw, &["summary", "about", "description"]).unwrap_or_else(|| {
        warnings.push("summary missing from profile document".to_string());
        String::new()
    });
    let skills = match skills_field(raw) {
        Some(skills) => skills,
        None => {
            warnings.push("skill list missing; derived from summary text".to_string());
            extract_skills(&summary)
        }
    };
    let experience_count = array_len(raw, &["positions", "experience", "experiences"]);
    let education_count = array_len(raw, &["education", "schools"]);

    let profile = NormalizedProfile {
        headline,
        summary,
        skills: normalize_skills(skills),
        experience_count,
        education_count,
    };

    if profile.is_empty() {
        return Err(WorkerError::Processing(
            "profile document contains no usable fields".to_string(),
        ));
    }

    Ok(ParsedProfile::PartiallyExtracted { profile, warnings })
}

/// Rule-based starter suggestions, ordered roughly by leverage.
pub fn generate_initial_suggestions(profile: &NormalizedProfile) -> Vec<ProfileSuggestion> {
    let mut suggestions = Vec::new();

    if profile.headline.is_empty() {
        suggestions.push(suggestion(
            ProfileSection::Profile,
            SuggestionPriority::High,
            "Add a headline that states your role and specialty.",
        ));
    }
    if profile.summary.is_empty() {
        suggestions.push(suggestion(
            ProfileSection::Profile,
            SuggestionPriority::High,
            "Write a summary covering your experience, strengths and what you are looking for.",
        ));
    } else if profile.summary.len() < 120 {
        suggestions.push(suggestion(
            ProfileSection::Profile,
            SuggestionPriority::Medium,
            "Expand your summary; a few sentences of concrete detail reads far stronger.",
        ));
    }
    if profile.experience_count == 0 {
        suggestions.push(suggestion(
            ProfileSection::Experience,
            SuggestionPriority::High,
            "List at least one position with measurable outcomes.",
        ));
    }
    if profile.skills.len() < 5 {
        suggestions.push(suggestion(
            ProfileSection::Skills,
            SuggestionPriority::Medium,
            "Add more skills; five or more helps recruiters find you in searches.",
        ));
    }
    if profile.education_count == 0 {
        suggestions.push(suggestion(
            ProfileSection::Education,
            SuggestionPriority::Low,
            "Add your education history, including certifications.",
        ));
    }
    if profile.experience_count < 2 {
        suggestions.push(suggestion(
            ProfileSection::Network,
            SuggestionPriority::Low,
            "Ask colleagues for recommendations to back up your listed experience.",
        ));
    }

    suggestions
}

fn suggestion(
    section: ProfileSection,
    priority: SuggestionPriority,
    text: &str,
) -> ProfileSuggestion {
    ProfileSuggestion {
        section,
        text: text.to_string(),
        priority,
    }
}

fn normalize_skills(skills: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    skills
        .into_iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect()
}

fn string_field(raw: &Value, names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| raw.get(name).and_then(|v| v.as_str()))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Skills may arrive as `["rust"]` or `[{"name": "rust"}]`.
fn skills_field(raw: &Value) -> Option<Vec<String>> {
    let array = raw.get("skills").and_then(|v| v.as_array())?;
    let skills: Vec<String> = array
        .iter()
        .filter_map(|item| {
            item.as_str()
                .map(String::from)
                .or_else(|| item.get("name").and_then(|n| n.as_str()).map(String::from))
        })
        .collect();
    if skills.is_empty() {
        None
    } else {
        Some(skills)
    }
}

fn array_len(raw: &Value, names: &[&str]) -> u32 {
    names
        .iter()
        .find_map(|name| raw.get(name).and_then(|v| v.as_array()))
        .map(|a| a.len() as u32)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_well_formed_document_validates() {
        let raw = json!({
            "headline": "Backend Engineer",
            "summary": "Ten years of distributed systems.",
            "skills": ["Rust", "SQL", "rust"],
            "positions": [{"company": "Acme"}],
            "education": [{"school": "State"}]
        });
        let parsed = parse_profile_data(&raw).unwrap();
        assert!(matches!(parsed, ParsedProfile::Validated(_)));
        let profile = parsed.profile();
        assert_eq!(profile.headline, "Backend Engineer");
        assert_eq!(profile.skills, vec!["rust", "sql"]);
        assert_eq!(profile.experience_count, 1);
        assert_eq!(profile.education_count, 1);
    }

    #[test]
    fn test_alternate_field_names_extract_partially() {
        let raw = json!({
            "title": "Data Analyst",
            "about": "I analyze data with python and sql every day.",
            "experiences": [{}, {}]
        });
        let parsed = parse_profile_data(&raw).unwrap();
        let warnings = parsed.warnings().to_vec();
        assert!(matches!(parsed, ParsedProfile::PartiallyExtracted { .. }));
        assert!(warnings.iter().any(|w| w.contains("skill list missing")));
        let profile = parsed.profile();
        assert_eq!(profile.headline, "Data Analyst");
        assert_eq!(profile.experience_count, 2);
        // Skills recovered from the summary text.
        assert!(profile.skills.contains(&"python".to_string()));
        assert!(profile.skills.contains(&"sql".to_string()));
    }

    #[test]
    fn test_object_shaped_skills_are_accepted() {
        let raw = json!({
            "title": "Engineer",
            "skills": [{"name": "Go"}, {"name": "Kafka"}]
        });
        let parsed = parse_profile_data(&raw).unwrap();
        assert_eq!(parsed.profile().skills, vec!["go", "kafka"]);
    }

    #[test]
    fn test_unusable_document_is_an_error() {
        let raw = json!({"unrelated": true});
        let err = parse_profile_data(&raw).unwrap_err();
        assert!(err.to_string().contains("no usable fields"));
    }

    #[test]
    fn test_suggestions_for_sparse_profile() {
        let profile = NormalizedProfile {
            headline: String::new(),
            summary: String::new(),
            skills: vec!["rust".to_string()],
            experience_count: 0,
            education_count: 0,
        };
        let suggestions = generate_initial_suggestions(&profile);
        let sections: Vec<_> = suggestions.iter().map(|s| s.section).collect();
        assert!(sections.contains(&ProfileSection::Profile));
        assert!(sections.contains(&ProfileSection::Experience));
        assert!(sections.contains(&ProfileSection::Skills));
        assert!(sections.contains(&ProfileSection::Education));
        assert!(sections.contains(&ProfileSection::Network));
        assert!(suggestions
            .iter()
            .any(|s| s.priority == SuggestionPriority::High));
    }

    #[test]
    fn test_complete_profile_gets_few_suggestions() {
        let profile = NormalizedProfile {
            headline: "Staff Engineer".to_string(),
            summary: "A long, detailed summary describing a decade of platform work, \
                      team leadership and measurable wins across several companies."
                .to_string(),
            skills: (0..6).map(|i| format!("skill{i}")).collect(),
            experience_count: 3,
            education_count: 1,
        };
        assert!(generate_initial_suggestions(&profile).is_empty());
    }
}
