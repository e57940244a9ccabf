//! Client for the AI scoring endpoint.
//!
//! Single point of entry for model calls: chat-completion shaped POST with
//! bearer auth, response schema validated before anything downstream sees
//! it. Retry, timeout and cancellation are handled by `retry::call_with_retry`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::clients::prompts::{PROFILE_SCORE_TEMPLATE, RESUME_SCORE_TEMPLATE, SCORING_SYSTEM};
use crate::clients::retry::{call_with_retry, CallError, RetryPolicy};
use crate::models::profile::NormalizedProfile;

const MAX_TOKENS: u32 = 1024;
const TEMPERATURE: f32 = 0.2;

/// What the orchestrator asks the model to look at.
#[derive(Debug, Clone)]
pub enum ScoreRequest {
    Resume {
        resume_text: String,
        job_description: String,
    },
    Profile {
        profile: NormalizedProfile,
    },
}

impl ScoreRequest {
    fn prompt(&self) -> String {
        match self {
            ScoreRequest::Resume {
                resume_text,
                job_description,
            } => RESUME_SCORE_TEMPLATE
                .replace("{resume_text}", resume_text)
                .replace("{job_description}", job_description),
            ScoreRequest::Profile { profile } => PROFILE_SCORE_TEMPLATE
                .replace("{headline}", &profile.headline)
                .replace("{summary}", &profile.summary)
                .replace("{skills}", &profile.skills.join(", ")),
        }
    }
}

/// Parsed model output. Optional fields default to empty so a sparse but
/// well-formed answer is still usable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelVerdict {
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub target_skills: Vec<String>,
    #[serde(skip)]
    pub raw_text: String,
}

/// Seam for the scoring backend. The orchestrator only sees this trait;
/// tests drop in counting or failing implementations.
#[async_trait]
pub trait ScoreModel: Send + Sync {
    async fn score(
        &self,
        request: &ScoreRequest,
        token: &CancellationToken,
    ) -> Result<ModelVerdict, CallError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<MessageBody>,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    content: Option<String>,
}

pub struct ScoringClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    policy: RetryPolicy,
}

impl ScoringClient {
    pub fn new(api_url: String, api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url,
            api_key,
            model,
            policy: RetryPolicy::new(3, std::time::Duration::from_secs(30)),
        }
    }

    async fn attempt(&self, prompt: &str) -> Result<ModelVerdict, CallError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SCORING_SYSTEM,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CallError::status(status.as_u16(), message));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| CallError::Shape(format!("response is not valid JSON: {e}")))?;
        let content = extract_content(&parsed)?;

        debug!("Scoring call succeeded ({} chars)", content.len());
        parse_verdict(&content)
    }
}

#[async_trait]
impl ScoreModel for ScoringClient {
    async fn score(
        &self,
        request: &ScoreRequest,
        token: &CancellationToken,
    ) -> Result<ModelVerdict, CallError> {
        let prompt = request.prompt();
        call_with_retry(&self.policy, token, "scoring", || self.attempt(&prompt)).await
    }
}

/// The one field the contract requires: `choices[0].message.content`.
/// Anything else missing is tolerated; this missing is a shape error.
fn extract_content(response: &ChatResponse) -> Result<String, CallError> {
    response
        .choices
        .first()
        .and_then(|c| c.message.as_ref())
        .and_then(|m| m.content.clone())
        .ok_or_else(|| CallError::Shape("choices[0].message.content missing".to_string()))
}

/// Parses the model's JSON answer, tolerating markdown code fences.
fn parse_verdict(content: &str) -> Result<ModelVerdict, CallError> {
    let stripped = strip_json_fences(content);
    let mut verdict: ModelVerdict = serde_json::from_str(stripped)
        .map_err(|e| CallError::Shape(format!("model answer is not the expected JSON: {e}")))?;
    verdict.raw_text = content.to_string();
    Ok(verdict)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    for prefix in ["```json", "```"] {
        if let Some(stripped) = text.strip_prefix(prefix) {
            return stripped
                .trim_start()
                .strip_suffix("```")
                .map(|s| s.trim())
                .unwrap_or_else(|| stripped.trim_start());
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_content_is_a_shape_error() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(
            extract_content(&response),
            Err(CallError::Shape(_))
        ));

        let response: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": null}}]}"#).unwrap();
        assert!(extract_content(&response).is_err());
    }

    #[test]
    fn test_optional_fields_tolerated() {
        // Extra and missing optional fields must not break extraction.
        let response: ChatResponse = serde_json::from_str(
            r#"{"id": "x", "usage": {"total_tokens": 10},
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "hi"}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_content(&response).unwrap(), "hi");
    }

    #[test]
    fn test_parse_verdict_with_fences() {
        let content = "```json\n{\"suggestions\": [\"add metrics\"], \"target_skills\": [\"aws\"]}\n```";
        let verdict = parse_verdict(content).unwrap();
        assert_eq!(verdict.suggestions, vec!["add metrics"]);
        assert_eq!(verdict.target_skills, vec!["aws"]);
        assert!(verdict.strengths.is_empty());
        assert_eq!(verdict.raw_text, content);
    }

    #[test]
    fn test_parse_verdict_rejects_non_json() {
        assert!(matches!(
            parse_verdict("I think the resume is fine."),
            Err(CallError::Shape(_))
        ));
    }

    #[test]
    fn test_strip_json_fences_variants() {
        assert_eq!(strip_json_fences("```json\n{}\n```"), "{}");
        assert_eq!(strip_json_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_json_fences("{}"), "{}");
    }

    #[test]
    fn test_resume_prompt_interpolation() {
        let request = ScoreRequest::Resume {
            resume_text: "RESUME BODY".to_string(),
            job_description: "JD BODY".to_string(),
        };
        let prompt = request.prompt();
        assert!(prompt.contains("RESUME BODY"));
        assert!(prompt.contains("JD BODY"));
        assert!(!prompt.contains("{resume_text}"));
    }
}
