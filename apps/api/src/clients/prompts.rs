//! Prompt templates for the scoring model.
//!
//! The model is instructed to answer with bare JSON so responses can be
//! deserialized directly; code fences are tolerated and stripped anyway.

pub const SCORING_SYSTEM: &str = "You are a career coach API. \
Respond with a single JSON object and nothing else. The object has keys: \
\"suggestions\" (array of strings), \"strengths\" (array of strings), \
\"weaknesses\" (array of strings), \"target_skills\" (array of strings).";

pub const RESUME_SCORE_TEMPLATE: &str = r#"Evaluate how well this resume fits the job description.

RESUME:
{resume_text}

JOB DESCRIPTION:
{job_description}

Return JSON with concrete suggestions to improve the resume for this role,
the candidate's strengths and weaknesses relative to the posting, and
target_skills: the skills the posting actually requires."#;

pub const PROFILE_SCORE_TEMPLATE: &str = r#"Evaluate this professional profile.

HEADLINE:
{headline}

SUMMARY:
{summary}

SKILLS:
{skills}

Return JSON with concrete suggestions to strengthen the profile, its
strengths and weaknesses, and target_skills: the skills someone with this
headline is expected to list."#;
