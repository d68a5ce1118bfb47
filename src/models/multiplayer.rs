use crate::models::attempt::AnswerInput;
use crate::models::question::Question;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const INVITE_CODE_LENGTH: usize = 6;

/// Monotonic lifecycle: waiting -> active -> completed, no regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Waiting,
    Active,
    Completed,
}

/// One answer in a participant's log. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedAnswer {
    pub question_index: usize,
    pub input: AnswerInput,
    pub is_correct: bool,
    pub points: u32,
    pub time_spent_seconds: u32,
    pub answered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: Uuid,
    pub name: String,
    pub score: u32,
    pub answers: Vec<RecordedAnswer>,
    pub is_ready: bool,
    pub joined_at: DateTime<Utc>,
}

impl Participant {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            score: 0,
            answers: Vec::new(),
            is_ready: false,
            joined_at: Utc::now(),
        }
    }

    pub fn correct_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_correct).count()
    }

    pub fn total_time_seconds(&self) -> u32 {
        self.answers.iter().map(|a| a.time_spent_seconds).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiplayerQuizSession {
    pub id: Uuid,
    pub invite_code: String,
    pub host_id: Uuid,
    pub status: SessionStatus,
    pub questions: Vec<Question>,
    pub participants: Vec<Participant>,
    pub created_at: DateTime<Utc>,
}

impl MultiplayerQuizSession {
    pub fn participant(&self, participant_id: Uuid) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == participant_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub participant_id: Uuid,
    pub name: String,
    pub score: u32,
    pub correct_count: usize,
    pub total_time_seconds: u32,
}
