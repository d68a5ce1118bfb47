use crate::models::question::Question;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel choice index auto-submitted when the countdown reaches zero.
pub const TIME_EXPIRED_INDEX: i32 = -1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerInput {
    Choice { index: i32 },
    Blanks { responses: Vec<String> },
    Explained { index: i32, justification: String },
}

impl AnswerInput {
    pub fn is_time_expired(&self) -> bool {
        match self {
            AnswerInput::Choice { index } | AnswerInput::Explained { index, .. } => {
                *index == TIME_EXPIRED_INDEX
            }
            AnswerInput::Blanks { responses } => responses.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlankResult {
    pub blank_id: String,
    pub response: String,
    pub correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningEvaluation {
    pub score: u8,
    pub feedback: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub fallback: bool,
}

impl ReasoningEvaluation {
    /// Local verdict used whenever the external judge cannot produce one.
    /// The session must keep moving, so grading proceeds as if judged.
    pub fn fallback(choice_correct: bool) -> Self {
        let (score, feedback) = if choice_correct {
            (
                3,
                "Your answer was correct. We could not grade the written reasoning this time."
                    .to_string(),
            )
        } else {
            (
                2,
                "Your answer was incorrect. We could not grade the written reasoning this time."
                    .to_string(),
            )
        };

        Self {
            score,
            feedback,
            strengths: vec![],
            improvements: vec!["Review the explanation shown for this question.".to_string()],
            fallback: true,
        }
    }
}

/// One graded answer. Created exactly once per question per session,
/// append-only, never retroactively mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptedQuestion {
    pub question: Question,
    pub input: AnswerInput,
    pub overall_correct: bool,
    pub timed_out: bool,
    pub points: u32,
    pub blank_results: Vec<BlankResult>,
    pub reasoning: Option<ReasoningEvaluation>,
    pub time_remaining: u32,
    pub answered_at: DateTime<Utc>,
}
