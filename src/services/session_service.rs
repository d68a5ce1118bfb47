use crate::error::{Error, Result};
use crate::models::attempt::{
    AnswerInput, AttemptedQuestion, ReasoningEvaluation, TIME_EXPIRED_INDEX,
};
use crate::models::question::{Difficulty, Question, QuestionDetails, QuizMode};
use crate::models::report::QuizReport;
use crate::models::session::{EndCondition, QuestionPhase, QuizSession, QuizView, TimerConfig};
use crate::services::adaptive_service::AdaptiveService;
use crate::services::eval_service::{ReasoningJudge, ReasoningRequest};
use crate::services::generation_service::QuestionSource;
use crate::services::matcher_service::MatcherService;
use crate::services::report_service::ReportService;
use crate::services::scoring_service::ScoringService;
use chrono::Utc;
use uuid::Uuid;

pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Drives one quiz session from setup to results. All mutation goes
/// through `&mut QuizSession` on discrete events: a user submission, a
/// one-second tick, or the resolution of a facade call.
#[derive(Clone)]
pub struct SessionService<G, J> {
    source: G,
    judge: J,
    batch_size: usize,
}

impl<G: QuestionSource, J: ReasoningJudge> SessionService<G, J> {
    pub fn new(source: G, judge: J) -> Self {
        Self {
            source,
            judge,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Generates the opening batch from the study text and starts playing.
    /// An empty batch is surfaced as `GenerationEmpty`; no session starts.
    pub async fn launch(
        &self,
        source_text: &str,
        mode: QuizMode,
        difficulty: Difficulty,
        timer: Option<TimerConfig>,
    ) -> Result<QuizSession> {
        let questions = self
            .source
            .generate_questions(source_text, mode, difficulty, self.batch_size)
            .await?;
        self.start_session(source_text, questions, mode, difficulty, timer)
    }

    /// Starts a session over an already-generated question list.
    pub fn start_session(
        &self,
        source_text: impl Into<String>,
        questions: Vec<Question>,
        mode: QuizMode,
        difficulty: Difficulty,
        timer: Option<TimerConfig>,
    ) -> Result<QuizSession> {
        if questions.is_empty() {
            return Err(Error::GenerationEmpty);
        }
        if let Some(q) = questions.iter().find(|q| q.mode() != mode) {
            return Err(Error::BadRequest(format!(
                "question {} does not match session mode {}",
                q.id,
                mode.label()
            )));
        }

        let timer = timer.unwrap_or_else(|| TimerConfig::for_mode(mode));
        let session = QuizSession {
            id: Uuid::new_v4(),
            mode,
            difficulty,
            source_text: source_text.into(),
            questions,
            current_index: 0,
            score: 0,
            streak: 0,
            timer,
            time_remaining: timer.duration_seconds,
            phase: QuestionPhase::Unanswered,
            view: QuizView::Playing,
            attempts: Vec::new(),
            swipe_correct: 0,
            end_condition: None,
            started_at: Utc::now(),
        };
        tracing::info!(
            "session {} started: {} question(s), mode {}",
            session.id,
            session.questions.len(),
            mode.label()
        );
        Ok(session)
    }

    /// Submits an answer for the current question. First write wins: a
    /// repeat submission, or a submission with no active question, is a
    /// silent no-op returning `Ok(false)`. A submission whose input kind
    /// does not fit the question is a caller bug and errors.
    pub async fn submit_answer(
        &self,
        session: &mut QuizSession,
        input: AnswerInput,
    ) -> Result<bool> {
        if session.view != QuizView::Playing || session.phase != QuestionPhase::Unanswered {
            return Ok(false);
        }
        let Some(question) = session.questions.get(session.current_index).cloned() else {
            return Ok(false);
        };

        let kind_matches = matches!(
            (&question.details, &input),
            (QuestionDetails::Standard { .. }, AnswerInput::Choice { .. })
                | (QuestionDetails::Swipe { .. }, AnswerInput::Choice { .. })
                | (QuestionDetails::FillBlanks { .. }, AnswerInput::Blanks { .. })
                | (QuestionDetails::Explain { .. }, AnswerInput::Explained { .. })
        );
        if !kind_matches {
            return Err(Error::BadRequest(format!(
                "answer input does not fit a {} question",
                question.mode().label()
            )));
        }

        let reasoning = if let (
            QuestionDetails::Explain {
                options,
                correct_index,
                ..
            },
            AnswerInput::Explained {
                index,
                justification,
            },
        ) = (&question.details, &input)
        {
            match self
                .obtain_reasoning(session, &question, options, *correct_index, *index, justification)
                .await
            {
                Some(verdict) => Some(verdict),
                // Stale: the session moved on while the judge was running.
                None => return Ok(false),
            }
        } else {
            None
        };

        self.apply_answer(session, question, input, false, reasoning);
        Ok(true)
    }

    /// One countdown step. Synchronous by design: nothing here blocks or
    /// performs I/O. Reaching zero while unanswered auto-submits the
    /// time-expired sentinel.
    pub fn tick(&self, session: &mut QuizSession) {
        if session.view != QuizView::Playing
            || session.phase != QuestionPhase::Unanswered
            || !session.timer.enabled
        {
            return;
        }
        if session.time_remaining > 0 {
            session.time_remaining -= 1;
        }
        if session.time_remaining == 0 {
            self.expire_current(session);
        }
    }

    /// Moves to the next question, resetting the question sub-state and
    /// timer. Returns false at the end of the list (or before the current
    /// question has been answered).
    pub fn advance(&self, session: &mut QuizSession) -> bool {
        if session.view != QuizView::Playing
            || session.phase != QuestionPhase::Answered
            || session.is_last_question()
        {
            return false;
        }
        session.current_index += 1;
        session.phase = QuestionPhase::Unanswered;
        session.time_remaining = session.timer.duration_seconds;
        true
    }

    /// Adaptive continuation: re-tunes difficulty from the trailing
    /// attempt window and appends a freshly generated batch. Score, streak
    /// and position carry over so play continues seamlessly. If generation
    /// yields nothing the session ends in `Results` with the condition
    /// recorded, prior progress intact.
    pub async fn continue_session(&self, session: &mut QuizSession) -> Result<Difficulty> {
        if session.view != QuizView::Playing {
            return Err(Error::BadRequest("session is not playing".to_string()));
        }

        let next = AdaptiveService::next_difficulty(&session.attempts, session.difficulty);
        if next != session.difficulty {
            tracing::info!(
                "session {}: difficulty {} -> {}",
                session.id,
                session.difficulty.label(),
                next.label()
            );
        }
        session.difficulty = next;

        let batch = match self
            .source
            .generate_questions(&session.source_text, session.mode, next, self.batch_size)
            .await
        {
            Ok(batch) => batch,
            Err(e) => {
                tracing::error!(error = %e, "continuation generation failed");
                Vec::new()
            }
        };

        if batch.is_empty() {
            session.view = QuizView::Results;
            session.end_condition = Some(EndCondition::GenerationExhausted);
            return Err(Error::GenerationEmpty);
        }

        session.questions.extend(batch);
        Ok(next)
    }

    /// Ends the session and derives the report. Swipe sessions apply their
    /// ratio-based final score exactly once here.
    pub fn finish(&self, session: &mut QuizSession) -> QuizReport {
        if matches!(
            session.view,
            QuizView::Playing | QuizView::Waiting | QuizView::Leaderboard
        ) {
            if session.mode == QuizMode::Swipe {
                session.score += ScoringService::swipe_final_score(
                    session.swipe_correct,
                    session.attempts.len() as u32,
                );
            }
            session.view = QuizView::Results;
            session.end_condition.get_or_insert(EndCondition::Finished);
            tracing::info!(
                "session {} finished: score {}, {}/{} correct",
                session.id,
                session.score,
                session.attempts.iter().filter(|a| a.overall_correct).count(),
                session.attempts.len()
            );
        }
        ReportService::build(session)
    }

    /// Multiplayer: local questions are done, other participants are not.
    pub fn enter_waiting(&self, session: &mut QuizSession) -> bool {
        if session.view != QuizView::Playing {
            return false;
        }
        session.view = QuizView::Waiting;
        true
    }

    pub fn show_leaderboard(&self, session: &mut QuizSession) -> bool {
        if !matches!(session.view, QuizView::Playing | QuizView::Waiting) {
            return false;
        }
        session.view = QuizView::Leaderboard;
        true
    }

    /// The only exit from `Results`: a full reset back to `Setup`.
    pub fn reset(&self, session: &mut QuizSession) -> bool {
        if session.view != QuizView::Results {
            return false;
        }
        session.view = QuizView::Setup;
        session.questions.clear();
        session.attempts.clear();
        session.current_index = 0;
        session.score = 0;
        session.streak = 0;
        session.swipe_correct = 0;
        session.time_remaining = 0;
        session.phase = QuestionPhase::Unanswered;
        session.end_condition = None;
        true
    }

    /// Reasoning verdict for an explain submission. Timeouts and empty
    /// justifications never reach the judge; judge failures degrade to the
    /// local fallback. Returns None when the verdict arrived stale.
    async fn obtain_reasoning(
        &self,
        session: &mut QuizSession,
        question: &Question,
        options: &[String],
        correct_index: usize,
        chosen: i32,
        justification: &str,
    ) -> Option<ReasoningEvaluation> {
        let outcome = MatcherService::match_choice(chosen, correct_index);
        if outcome.timed_out() || justification.trim().is_empty() {
            return Some(ReasoningEvaluation::fallback(outcome.is_correct()));
        }

        session.phase = QuestionPhase::Evaluating;
        let captured_id = question.id;
        let captured_index = session.current_index;

        let req = ReasoningRequest {
            question: question.prompt.clone(),
            correct_option: options.get(correct_index).cloned().unwrap_or_default(),
            chosen_option: options.get(chosen as usize).cloned().unwrap_or_default(),
            user_explanation: justification.to_string(),
        };

        let verdict = match self.judge.evaluate_reasoning(&req).await {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::warn!(error = %e, "reasoning evaluation unavailable, using local fallback");
                ReasoningEvaluation::fallback(outcome.is_correct())
            }
        };

        let still_current = session.phase == QuestionPhase::Evaluating
            && session.current_index == captured_index
            && session.questions.get(captured_index).map(|q| q.id) == Some(captured_id);
        if !still_current {
            tracing::warn!("discarding stale reasoning verdict for question {}", captured_id);
            return None;
        }
        Some(verdict)
    }

    fn expire_current(&self, session: &mut QuizSession) {
        let Some(question) = session.questions.get(session.current_index).cloned() else {
            return;
        };
        tracing::info!(
            "session {}: time expired on question {}",
            session.id,
            session.current_index + 1
        );

        let input = match &question.details {
            QuestionDetails::Standard { .. } | QuestionDetails::Swipe { .. } => {
                AnswerInput::Choice {
                    index: TIME_EXPIRED_INDEX,
                }
            }
            QuestionDetails::FillBlanks { .. } => AnswerInput::Blanks { responses: vec![] },
            QuestionDetails::Explain { .. } => AnswerInput::Explained {
                index: TIME_EXPIRED_INDEX,
                justification: String::new(),
            },
        };
        let reasoning = matches!(question.details, QuestionDetails::Explain { .. })
            .then(|| ReasoningEvaluation::fallback(false));

        self.apply_answer(session, question, input, true, reasoning);
    }

    /// Grades and records one answer. Points are computed against the
    /// streak and clock held before this answer; a timed-out question
    /// earns nothing in any mode.
    fn apply_answer(
        &self,
        session: &mut QuizSession,
        question: Question,
        input: AnswerInput,
        forced_timeout: bool,
        reasoning: Option<ReasoningEvaluation>,
    ) {
        let time_remaining = session.time_remaining;
        let timer_enabled = session.timer.enabled;
        let streak = session.streak;

        let (overall_correct, timed_out, points, blank_results) =
            match (&question.details, &input) {
                (
                    QuestionDetails::Standard { correct_index, .. },
                    AnswerInput::Choice { index },
                ) => {
                    let outcome = MatcherService::match_choice(*index, *correct_index);
                    let timed_out = forced_timeout || outcome.timed_out();
                    let points = if timed_out {
                        0
                    } else {
                        ScoringService::standard_points(
                            outcome.is_correct(),
                            streak,
                            time_remaining,
                            timer_enabled,
                        )
                    };
                    (outcome.is_correct(), timed_out, points, vec![])
                }
                (QuestionDetails::Swipe { correct_index }, AnswerInput::Choice { index }) => {
                    let outcome = MatcherService::match_choice(*index, *correct_index);
                    if outcome.is_correct() {
                        session.swipe_correct += 1;
                    }
                    (
                        outcome.is_correct(),
                        forced_timeout || outcome.timed_out(),
                        0,
                        vec![],
                    )
                }
                (
                    QuestionDetails::FillBlanks { blanks, .. },
                    AnswerInput::Blanks { responses },
                ) => {
                    let results = MatcherService::match_blanks(responses, blanks);
                    let correct_blanks = results.iter().filter(|r| r.correct).count();
                    let all_correct = correct_blanks == blanks.len();
                    let points = if forced_timeout {
                        0
                    } else {
                        ScoringService::fill_blanks_points(
                            correct_blanks as u32,
                            all_correct,
                            streak,
                            time_remaining,
                            timer_enabled,
                        )
                    };
                    (all_correct, forced_timeout, points, results)
                }
                (
                    QuestionDetails::Explain { correct_index, .. },
                    AnswerInput::Explained { index, .. },
                ) => {
                    let outcome = MatcherService::match_choice(*index, *correct_index);
                    let timed_out = forced_timeout || outcome.timed_out();
                    let reasoning_score = reasoning.as_ref().map(|r| r.score).unwrap_or(1);
                    let points = if timed_out {
                        0
                    } else {
                        ScoringService::explain_points(
                            outcome.is_correct(),
                            reasoning_score,
                            streak,
                            time_remaining,
                            timer_enabled,
                        )
                    };
                    (outcome.is_correct(), timed_out, points, vec![])
                }
                _ => {
                    tracing::error!("mismatched answer kind reached grading, ignoring");
                    return;
                }
            };

        session.score += points;
        if overall_correct {
            session.streak += 1;
        } else {
            session.streak = 0;
        }
        session.attempts.push(AttemptedQuestion {
            question,
            input,
            overall_correct,
            timed_out,
            points,
            blank_results,
            reasoning,
            time_remaining,
            answered_at: Utc::now(),
        });
        session.phase = QuestionPhase::Answered;
        tracing::info!(
            "session {}: question {} answered, correct={}, points={}, streak={}",
            session.id,
            session.current_index + 1,
            overall_correct,
            points,
            session.streak
        );
    }
}
