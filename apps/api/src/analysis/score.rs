//! Skill-overlap scoring.
//!
//! The score is the overlap ratio between the candidate's skill set and
//! the required skill set, 0-100 rounded. An empty requirement set scores
//! zero rather than dividing by it.

use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct SkillOverlap {
    pub score: u8,
    pub matching: Vec<String>,
    pub missing: Vec<String>,
}

/// Partitions `required` into matching/missing against `candidate` and
/// scores the overlap. Comparison is on normalized (lowercased, trimmed)
/// names; output preserves the order of `required`.
pub fn score_skill_overlap(candidate: &[String], required: &[String]) -> SkillOverlap {
    let candidate_set: HashSet<String> = candidate.iter().map(|s| canon(s)).collect();

    let mut seen = HashSet::new();
    let mut matching = Vec::new();
    let mut missing = Vec::new();
    for skill in required {
        let normalized = canon(skill);
        if normalized.is_empty() || !seen.insert(normalized.clone()) {
            continue;
        }
        if candidate_set.contains(&normalized) {
            matching.push(normalized);
        } else {
            missing.push(normalized);
        }
    }

    let total = matching.len() + missing.len();
    let score = if total == 0 {
        0
    } else {
        ((matching.len() as f64 / total as f64) * 100.0).round() as u8
    };

    SkillOverlap {
        score,
        matching,
        missing,
    }
}

/// Crude token fallback used when the extraction worker is unavailable:
/// comma/whitespace separated words, lowercased. Good enough for a
/// reduced-confidence score, nothing more.
pub fn fallback_tokens(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.split(|c: char| c == ',' || c.is_whitespace())
        .map(|t| t.trim().to_lowercase())
        .filter(|t| t.len() > 1 && seen.insert(t.clone()))
        .collect()
}

fn canon(skill: &str) -> String {
    skill.trim().to_lowercase()
}
