//! Request fingerprints.
//!
//! A fingerprint is the deterministic serialization of the normalized
//! input parameters. It keys both cache tiers and the in-flight dedupe
//! table, so normalization has to be aggressive enough that trivially
//! different spellings of the same request collapse to one key.

/// Collapses whitespace runs, trims and lowercases.
pub fn normalize(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Fingerprint for a resume-vs-job-description analysis.
pub fn resume(resume_text: &str, job_description: &str) -> String {
    serialize("resume", &[resume_text, job_description])
}

/// Fingerprint for a profile analysis.
pub fn profile(profile_url: &str) -> String {
    serialize("profile", &[profile_url])
}

/// Order-sensitive, value-based key: a JSON array of the operation name
/// and each normalized argument.
fn serialize(op: &str, args: &[&str]) -> String {
    let mut parts = Vec::with_capacity(args.len() + 1);
    parts.push(op.to_string());
    parts.extend(args.iter().map(|a| normalize(a)));
    serde_json::to_string(&parts).expect("string arrays always serialize")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_deterministic() {
        assert_eq!(resume("a", "b"), resume("a", "b"));
    }

    #[test]
    fn test_whitespace_and_case_collapse() {
        assert_eq!(
            resume("React  Developer\n", "  remote JOB "),
            resume("react developer", "remote job")
        );
    }

    #[test]
    fn test_argument_order_matters() {
        assert_ne!(resume("a", "b"), resume("b", "a"));
    }

    #[test]
    fn test_operations_do_not_collide() {
        assert_ne!(resume("x", ""), profile("x"));
    }

    #[test]
    fn test_different_inputs_differ() {
        assert_ne!(profile("linkedin.com/in/a"), profile("linkedin.com/in/b"));
    }
}
