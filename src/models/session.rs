use crate::models::attempt::AttemptedQuestion;
use crate::models::question::{Difficulty, Question, QuizMode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizView {
    Setup,
    Playing,
    Waiting,
    Leaderboard,
    Results,
}

/// Sub-state of the current question. First write wins: once a question
/// leaves `Unanswered`, further submissions are no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionPhase {
    Unanswered,
    Evaluating,
    Answered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    pub enabled: bool,
    pub duration_seconds: u32,
}

impl TimerConfig {
    /// Recognized per-mode defaults; callers may override.
    pub fn for_mode(mode: QuizMode) -> Self {
        match mode {
            QuizMode::Standard => Self {
                enabled: true,
                duration_seconds: 30,
            },
            QuizMode::Swipe => Self {
                enabled: false,
                duration_seconds: 15,
            },
            QuizMode::FillBlanks => Self {
                enabled: false,
                duration_seconds: 45,
            },
            QuizMode::Explain => Self {
                enabled: false,
                duration_seconds: 90,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndCondition {
    Finished,
    /// Adaptive continuation could not produce more questions.
    GenerationExhausted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSession {
    pub id: Uuid,
    pub mode: QuizMode,
    pub difficulty: Difficulty,
    pub source_text: String,
    pub questions: Vec<Question>,
    pub current_index: usize,
    pub score: u32,
    pub streak: u32,
    pub timer: TimerConfig,
    pub time_remaining: u32,
    pub phase: QuestionPhase,
    pub view: QuizView,
    pub attempts: Vec<AttemptedQuestion>,
    pub swipe_correct: u32,
    pub end_condition: Option<EndCondition>,
    pub started_at: DateTime<Utc>,
}

impl QuizSession {
    pub fn current_question(&self) -> Option<&Question> {
        if self.view != QuizView::Playing {
            return None;
        }
        self.questions.get(self.current_index)
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 >= self.questions.len()
    }
}
