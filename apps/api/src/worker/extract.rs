//! Lexicon-driven skill extraction.
//!
//! Pure CPU work: tokenize, normalize through the alias table, keep the
//! first occurrence of each canonical skill. Runs on the worker thread so
//! large documents never stall the request path.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

/// Alias -> canonical skill name. Kept deliberately small and curated;
/// an unknown token is simply not a skill.
static SKILL_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let pairs: &[(&str, &str)] = &[
        ("rust", "rust"),
        ("go", "go"),
        ("golang", "go"),
        ("python", "python"),
        ("java", "java"),
        ("kotlin", "kotlin"),
        ("swift", "swift"),
        ("ruby", "ruby"),
        ("php", "php"),
        ("c", "c"),
        ("c++", "c++"),
        ("cpp", "c++"),
        ("c#", "c#"),
        ("csharp", "c#"),
        ("javascript", "javascript"),
        ("js", "javascript"),
        ("typescript", "typescript"),
        ("ts", "typescript"),
        ("html", "html"),
        ("css", "css"),
        ("react", "react"),
        ("reactjs", "react"),
        ("react.js", "react"),
        ("angular", "angular"),
        ("vue", "vue"),
        ("vuejs", "vue"),
        ("svelte", "svelte"),
        ("node", "node"),
        ("nodejs", "node"),
        ("node.js", "node"),
        ("express", "express"),
        ("django", "django"),
        ("flask", "flask"),
        ("rails", "rails"),
        ("spring", "spring"),
        ("sql", "sql"),
        ("mysql", "sql"),
        ("postgres", "sql"),
        ("postgresql", "sql"),
        ("nosql", "nosql"),
        ("mongodb", "mongodb"),
        ("mongo", "mongodb"),
        ("redis", "redis"),
        ("elasticsearch", "elasticsearch"),
        ("kafka", "kafka"),
        ("rabbitmq", "rabbitmq"),
        ("graphql", "graphql"),
        ("rest", "rest"),
        ("grpc", "grpc"),
        ("aws", "aws"),
        ("gcp", "gcp"),
        ("azure", "azure"),
        ("docker", "docker"),
        ("kubernetes", "kubernetes"),
        ("k8s", "kubernetes"),
        ("terraform", "terraform"),
        ("ansible", "ansible"),
        ("jenkins", "jenkins"),
        ("git", "git"),
        ("linux", "linux"),
        ("bash", "bash"),
        ("ml", "machine learning"),
        ("tensorflow", "tensorflow"),
        ("pytorch", "pytorch"),
        ("pandas", "pandas"),
        ("numpy", "numpy"),
        ("spark", "spark"),
        ("hadoop", "hadoop"),
        ("tableau", "tableau"),
        ("excel", "excel"),
        ("jira", "jira"),
        ("figma", "figma"),
        ("agile", "agile"),
        ("scrum", "scrum"),
    ];
    pairs.iter().copied().collect()
});

/// Extracts canonical skills from free text, first-seen order, no
/// duplicates.
pub fn extract_skills(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut skills = Vec::new();
    for token in tokenize(text) {
        if let Some(&canonical) = SKILL_ALIASES.get(token.as_str()) {
            if seen.insert(canonical) {
                skills.push(canonical.to_string());
            }
        }
    }
    skills
}

/// Lowercased tokens split on separators, keeping the characters that are
/// load-bearing in skill names (`+`, `#`, `.`). Trailing dots are shed so
/// sentence punctuation does not produce "node." style tokens.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#' || c == '.'))
        .map(|t| t.trim_matches('.').to_lowercase())
        .filter(|t| !t.is_empty())
}
