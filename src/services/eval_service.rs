use crate::error::{Error, Result};
use crate::models::attempt::ReasoningEvaluation;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::Duration;
use validator::Validate;

/// Strengths/improvements lists are bounded at the boundary.
pub const MAX_FEEDBACK_ITEMS: usize = 3;

#[derive(Debug, Clone, Serialize)]
pub struct ReasoningRequest {
    pub question: String,
    pub correct_option: String,
    pub chosen_option: String,
    pub user_explanation: String,
}

/// The reasoning-grading side of the external facade. May fail or time
/// out; callers must recover with `ReasoningEvaluation::fallback`.
#[allow(async_fn_in_trait)]
pub trait ReasoningJudge {
    async fn evaluate_reasoning(&self, req: &ReasoningRequest) -> Result<ReasoningEvaluation>;
}

#[derive(Debug, Deserialize, Validate)]
struct RawVerdict {
    #[validate(range(min = 1, max = 5))]
    score: i64,
    feedback: Option<String>,
    strengths: Option<Vec<String>>,
    improvements: Option<Vec<String>>,
}

#[derive(Clone)]
pub struct OpenAiEvalService {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiEvalService {
    pub fn new(api_key: String, base_url: String, model: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            base_url,
            model,
        }
    }

    /// Narrows the free-form judge payload into the typed verdict:
    /// out-of-range scores are clamped, list fields bounded.
    fn coerce_verdict(raw: RawVerdict) -> ReasoningEvaluation {
        if raw.validate().is_err() {
            tracing::warn!("reasoning score {} out of range, clamping", raw.score);
        }
        let score = raw.score.clamp(1, 5) as u8;

        let mut strengths = raw.strengths.unwrap_or_default();
        strengths.truncate(MAX_FEEDBACK_ITEMS);
        let mut improvements = raw.improvements.unwrap_or_default();
        improvements.truncate(MAX_FEEDBACK_ITEMS);

        ReasoningEvaluation {
            score,
            feedback: raw
                .feedback
                .unwrap_or_else(|| "No detailed feedback was returned.".to_string()),
            strengths,
            improvements,
            fallback: false,
        }
    }
}

impl ReasoningJudge for OpenAiEvalService {
    async fn evaluate_reasoning(&self, req: &ReasoningRequest) -> Result<ReasoningEvaluation> {
        let system_prompt = r#"You are a strict but encouraging tutor grading a student's written justification of a quiz answer.
Output a JSON object: {"score": <1-5>, "feedback": "<one short paragraph>", "strengths": ["..."], "improvements": ["..."]}.
Score 5 means the reasoning is correct, complete, and clearly tied to the material; 1 means it is absent or unrelated.
Grade the reasoning itself, not whether the chosen option was correct."#;

        let payload = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": serde_json::to_string(req)?}
            ],
            "response_format": { "type": "json_object" },
            "temperature": 0.1
        });

        let res = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .timeout(Duration::from_secs(120))
            .send()
            .await
            .map_err(|e| Error::EvaluationUnavailable(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            return Err(Error::EvaluationUnavailable(format!(
                "judge returned status {}",
                status
            )));
        }

        let body: JsonValue = res
            .json()
            .await
            .map_err(|e| Error::EvaluationUnavailable(e.to_string()))?;

        let content = body
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| {
                Error::EvaluationUnavailable("malformed judge response".to_string())
            })?;

        let raw: RawVerdict = serde_json::from_str(content)
            .map_err(|e| Error::EvaluationUnavailable(format!("unparseable verdict: {}", e)))?;

        Ok(Self::coerce_verdict(raw))
    }
}
