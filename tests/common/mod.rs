#![allow(dead_code)]

use chrono::Utc;
use quiz_engine::error::{Error, Result};
use quiz_engine::models::attempt::{
    AnswerInput, AttemptedQuestion, ReasoningEvaluation,
};
use quiz_engine::models::multiplayer::RecordedAnswer;
use quiz_engine::models::question::{Blank, Difficulty, Question, QuestionDetails, QuizMode};
use quiz_engine::services::eval_service::{ReasoningJudge, ReasoningRequest};
use quiz_engine::services::generation_service::QuestionSource;
use std::collections::VecDeque;
use std::sync::Mutex;
use uuid::Uuid;

/// Question source serving pre-baked batches in order; once exhausted it
/// returns empty batches. Records the difficulty of every request.
pub struct StubSource {
    batches: Mutex<VecDeque<Vec<Question>>>,
    pub requested: Mutex<Vec<Difficulty>>,
}

impl StubSource {
    pub fn new(batches: Vec<Vec<Question>>) -> Self {
        Self {
            batches: Mutex::new(batches.into_iter().collect()),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }
}

impl QuestionSource for StubSource {
    async fn generate_questions(
        &self,
        _source_text: &str,
        _mode: QuizMode,
        difficulty: Difficulty,
        _count: usize,
    ) -> Result<Vec<Question>> {
        self.requested.lock().unwrap().push(difficulty);
        Ok(self.batches.lock().unwrap().pop_front().unwrap_or_default())
    }
}

/// Judge returning a fixed verdict, or failing when built `offline`.
pub struct StubJudge {
    verdict: Option<ReasoningEvaluation>,
}

impl StubJudge {
    pub fn scoring(score: u8) -> Self {
        Self {
            verdict: Some(ReasoningEvaluation {
                score,
                feedback: "stub feedback".to_string(),
                strengths: vec!["stub strength".to_string()],
                improvements: vec![],
                fallback: false,
            }),
        }
    }

    pub fn offline() -> Self {
        Self { verdict: None }
    }
}

impl ReasoningJudge for StubJudge {
    async fn evaluate_reasoning(&self, _req: &ReasoningRequest) -> Result<ReasoningEvaluation> {
        match &self.verdict {
            Some(v) => Ok(v.clone()),
            None => Err(Error::EvaluationUnavailable("stub judge offline".to_string())),
        }
    }
}

pub fn standard_question(correct_index: usize) -> Question {
    standard_question_at(Difficulty::Medium, correct_index)
}

pub fn standard_question_at(difficulty: Difficulty, correct_index: usize) -> Question {
    Question {
        id: Uuid::new_v4(),
        prompt: "Which layer of the atmosphere contains the ozone layer?".to_string(),
        difficulty,
        details: QuestionDetails::Standard {
            options: vec![
                "Troposphere".to_string(),
                "Stratosphere".to_string(),
                "Mesosphere".to_string(),
                "Thermosphere".to_string(),
            ],
            correct_index,
            explanation: "The ozone layer sits in the lower stratosphere.".to_string(),
        },
    }
}

pub fn swipe_question(is_true: bool) -> Question {
    Question {
        id: Uuid::new_v4(),
        prompt: "Water boils at 100 degrees Celsius at sea level.".to_string(),
        difficulty: Difficulty::Easy,
        details: QuestionDetails::Swipe {
            correct_index: usize::from(!is_true),
        },
    }
}

pub fn fill_question(accepted_per_blank: &[&[&str]]) -> Question {
    let blanks: Vec<Blank> = accepted_per_blank
        .iter()
        .enumerate()
        .map(|(idx, accepted)| Blank {
            id: format!("b{}", idx + 1),
            accepted_answers: accepted.iter().map(|s| s.to_string()).collect(),
        })
        .collect();
    let text_with_blanks = vec!["___"; blanks.len()].join(" and ");

    Question {
        id: Uuid::new_v4(),
        prompt: "Complete the sentence.".to_string(),
        difficulty: Difficulty::Medium,
        details: QuestionDetails::FillBlanks {
            text_with_blanks,
            blanks,
        },
    }
}

pub fn explain_question(correct_index: usize) -> Question {
    Question {
        id: Uuid::new_v4(),
        prompt: "Why do plants appear green?".to_string(),
        difficulty: Difficulty::Medium,
        details: QuestionDetails::Explain {
            options: vec![
                "They absorb green light".to_string(),
                "They reflect green light".to_string(),
                "They emit green light".to_string(),
                "They scatter all light equally".to_string(),
            ],
            correct_index,
            explanation: "Chlorophyll reflects green wavelengths.".to_string(),
        },
    }
}

/// Minimal attempt record for feeding the adaptive controller.
pub fn attempt(correct: bool) -> AttemptedQuestion {
    AttemptedQuestion {
        question: standard_question(0),
        input: AnswerInput::Choice {
            index: if correct { 0 } else { 1 },
        },
        overall_correct: correct,
        timed_out: false,
        points: if correct { 100 } else { 0 },
        blank_results: vec![],
        reasoning: None,
        time_remaining: 0,
        answered_at: Utc::now(),
    }
}

pub fn recorded_answer(
    question_index: usize,
    is_correct: bool,
    points: u32,
    time_spent_seconds: u32,
) -> RecordedAnswer {
    RecordedAnswer {
        question_index,
        input: AnswerInput::Choice { index: 0 },
        is_correct,
        points,
        time_spent_seconds,
        answered_at: Utc::now(),
    }
}
