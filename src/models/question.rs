use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The two swipe options, in index order.
pub const SWIPE_OPTIONS: [&str; 2] = ["True", "False"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn escalate(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Hard,
        }
    }

    pub fn de_escalate(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Easy,
            Difficulty::Medium => Difficulty::Easy,
            Difficulty::Hard => Difficulty::Medium,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizMode {
    Standard,
    Swipe,
    FillBlanks,
    Explain,
}

impl QuizMode {
    pub fn label(self) -> &'static str {
        match self {
            QuizMode::Standard => "standard",
            QuizMode::Swipe => "swipe",
            QuizMode::FillBlanks => "fill_blanks",
            QuizMode::Explain => "explain",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blank {
    pub id: String,
    pub accepted_answers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum QuestionDetails {
    Standard {
        options: Vec<String>,
        correct_index: usize,
        explanation: String,
    },
    Swipe {
        correct_index: usize,
    },
    FillBlanks {
        text_with_blanks: String,
        blanks: Vec<Blank>,
    },
    Explain {
        options: Vec<String>,
        correct_index: usize,
        explanation: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub prompt: String,
    pub difficulty: Difficulty,
    #[serde(flatten)]
    pub details: QuestionDetails,
}

impl Question {
    pub fn mode(&self) -> QuizMode {
        match self.details {
            QuestionDetails::Standard { .. } => QuizMode::Standard,
            QuestionDetails::Swipe { .. } => QuizMode::Swipe,
            QuestionDetails::FillBlanks { .. } => QuizMode::FillBlanks,
            QuestionDetails::Explain { .. } => QuizMode::Explain,
        }
    }

    /// Correct option index for the choice-based modes.
    pub fn correct_index(&self) -> Option<usize> {
        match self.details {
            QuestionDetails::Standard { correct_index, .. }
            | QuestionDetails::Swipe { correct_index }
            | QuestionDetails::Explain { correct_index, .. } => Some(correct_index),
            QuestionDetails::FillBlanks { .. } => None,
        }
    }

    pub fn options(&self) -> Option<Vec<String>> {
        match &self.details {
            QuestionDetails::Standard { options, .. }
            | QuestionDetails::Explain { options, .. } => Some(options.clone()),
            QuestionDetails::Swipe { .. } => {
                Some(SWIPE_OPTIONS.iter().map(|s| s.to_string()).collect())
            }
            QuestionDetails::FillBlanks { .. } => None,
        }
    }

    pub fn explanation(&self) -> Option<&str> {
        match &self.details {
            QuestionDetails::Standard { explanation, .. }
            | QuestionDetails::Explain { explanation, .. } => Some(explanation.as_str()),
            _ => None,
        }
    }
}
