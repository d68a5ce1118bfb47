use crate::error::{Error, Result};
use crate::models::multiplayer::{
    LeaderboardEntry, MultiplayerQuizSession, Participant, RecordedAnswer, SessionStatus,
    INVITE_CODE_LENGTH,
};
use crate::models::question::Question;
use crate::utils::token::generate_invite_code;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Registry {
    sessions: HashMap<Uuid, MultiplayerQuizSession>,
    /// Invite-code index over open (non-completed) sessions only; codes of
    /// completed sessions are released.
    codes: HashMap<String, Uuid>,
}

/// Coordinates shared multiplayer sessions. The session record is the only
/// shared resource: each participant appends to their own answer log, so
/// concurrent writers commute; status transitions are host-owned.
#[derive(Clone, Default)]
pub struct MultiplayerService {
    registry: Arc<RwLock<Registry>>,
}

impl MultiplayerService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a session in `Waiting` with a fresh collision-checked invite
    /// code. The host is enrolled as the first participant, marked ready.
    pub async fn create_session(
        &self,
        mut host: Participant,
        questions: Vec<Question>,
    ) -> Result<MultiplayerQuizSession> {
        if questions.is_empty() {
            return Err(Error::GenerationEmpty);
        }

        let mut registry = self.registry.write().await;
        let invite_code = loop {
            let code = generate_invite_code(INVITE_CODE_LENGTH);
            if !registry.codes.contains_key(&code) {
                break code;
            }
        };

        host.is_ready = true;
        let session = MultiplayerQuizSession {
            id: Uuid::new_v4(),
            invite_code: invite_code.clone(),
            host_id: host.id,
            status: SessionStatus::Waiting,
            questions,
            participants: vec![host],
            created_at: Utc::now(),
        };
        registry.codes.insert(invite_code, session.id);
        registry.sessions.insert(session.id, session.clone());
        tracing::info!(
            "multiplayer session {} created, invite code {}",
            session.id,
            session.invite_code
        );
        Ok(session)
    }

    /// Joins by invite code. Unknown (or released) codes fail with
    /// `InvalidJoinCode` and mutate nothing. Re-joining is idempotent:
    /// the existing enrollment is returned, never duplicated. Enrollment
    /// only appends.
    pub async fn join_by_code(
        &self,
        code: &str,
        participant: Participant,
    ) -> Result<MultiplayerQuizSession> {
        let code = code.trim().to_uppercase();
        let mut registry = self.registry.write().await;
        let session_id = *registry
            .codes
            .get(&code)
            .ok_or_else(|| Error::InvalidJoinCode(code.clone()))?;
        let session = registry
            .sessions
            .get_mut(&session_id)
            .ok_or_else(|| Error::Internal(format!("dangling invite code {}", code)))?;

        if session.participant(participant.id).is_some() {
            return Ok(session.clone());
        }

        tracing::info!(
            "participant {} joined session {}",
            participant.id,
            session.id
        );
        session.participants.push(participant);
        Ok(session.clone())
    }

    /// `Waiting -> Active`. Host-only; a repeat start is a no-op.
    pub async fn start_session(
        &self,
        session_id: Uuid,
        requested_by: Uuid,
    ) -> Result<MultiplayerQuizSession> {
        let mut registry = self.registry.write().await;
        let session = registry
            .sessions
            .get_mut(&session_id)
            .ok_or_else(|| Error::NotFound(format!("session {}", session_id)))?;

        if session.host_id != requested_by {
            return Err(Error::BadRequest(
                "only the host may start the session".to_string(),
            ));
        }
        match session.status {
            SessionStatus::Waiting => {
                session.status = SessionStatus::Active;
                tracing::info!("multiplayer session {} is now active", session.id);
            }
            SessionStatus::Active => {}
            SessionStatus::Completed => {
                return Err(Error::BadRequest(
                    "session is already completed".to_string(),
                ));
            }
        }
        Ok(session.clone())
    }

    /// Appends one answer to the submitting participant's own log. A
    /// repeat submission for the same question index is a silent no-op,
    /// so an answer log never exceeds the question list and never rewrites.
    pub async fn submit_answer(
        &self,
        session_id: Uuid,
        participant_id: Uuid,
        answer: RecordedAnswer,
    ) -> Result<()> {
        let mut registry = self.registry.write().await;
        let session = registry
            .sessions
            .get_mut(&session_id)
            .ok_or_else(|| Error::NotFound(format!("session {}", session_id)))?;

        if session.status != SessionStatus::Active {
            return Err(Error::BadRequest("session is not active".to_string()));
        }
        if answer.question_index >= session.questions.len() {
            return Err(Error::BadRequest(format!(
                "question index {} out of range",
                answer.question_index
            )));
        }

        let participant = session
            .participants
            .iter_mut()
            .find(|p| p.id == participant_id)
            .ok_or_else(|| Error::NotFound(format!("participant {}", participant_id)))?;

        if participant
            .answers
            .iter()
            .any(|a| a.question_index == answer.question_index)
        {
            tracing::debug!(
                "duplicate answer for question {} from participant {} ignored",
                answer.question_index,
                participant_id
            );
            return Ok(());
        }

        participant.score += answer.points;
        participant.answers.push(answer);
        Ok(())
    }

    /// One-way transition to `Completed`; releases the invite code and
    /// derives the leaderboard. Completing twice just re-derives.
    pub async fn complete_session(&self, session_id: Uuid) -> Result<Vec<LeaderboardEntry>> {
        let mut registry = self.registry.write().await;
        let Registry { sessions, codes } = &mut *registry;
        let session = sessions
            .get_mut(&session_id)
            .ok_or_else(|| Error::NotFound(format!("session {}", session_id)))?;

        if session.status != SessionStatus::Completed {
            session.status = SessionStatus::Completed;
            codes.remove(&session.invite_code);
            tracing::info!("multiplayer session {} completed", session.id);
        }
        Ok(Self::leaderboard(session))
    }

    pub async fn session(&self, session_id: Uuid) -> Result<MultiplayerQuizSession> {
        let registry = self.registry.read().await;
        registry
            .sessions
            .get(&session_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("session {}", session_id)))
    }

    /// Ranks participants by score, then correct answers, then lower total
    /// time; remaining ties keep join order (stable sort). Pure function
    /// of the immutable answer logs, so re-derivation is free of surprises.
    pub fn leaderboard(session: &MultiplayerQuizSession) -> Vec<LeaderboardEntry> {
        let mut ranked: Vec<&Participant> = session.participants.iter().collect();
        ranked.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| b.correct_count().cmp(&a.correct_count()))
                .then_with(|| a.total_time_seconds().cmp(&b.total_time_seconds()))
        });

        ranked
            .iter()
            .enumerate()
            .map(|(idx, p)| LeaderboardEntry {
                rank: idx + 1,
                participant_id: p.id,
                name: p.name.clone(),
                score: p.score,
                correct_count: p.correct_count(),
                total_time_seconds: p.total_time_seconds(),
            })
            .collect()
    }
}
