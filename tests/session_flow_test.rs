mod common;

use common::{
    explain_question, fill_question, standard_question, swipe_question, StubJudge, StubSource,
};
use quiz_engine::error::Error;
use quiz_engine::models::attempt::{AnswerInput, TIME_EXPIRED_INDEX};
use quiz_engine::models::question::{Difficulty, QuizMode};
use quiz_engine::models::session::{QuestionPhase, QuizView, TimerConfig};
use quiz_engine::services::session_service::SessionService;

fn service(source: StubSource, judge: StubJudge) -> SessionService<StubSource, StubJudge> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("quiz_engine=debug")
        .try_init();
    SessionService::new(source, judge)
}

#[tokio::test]
async fn empty_question_list_does_not_start_a_session() {
    let svc = service(StubSource::empty(), StubJudge::scoring(3));

    let direct = svc.start_session("text", vec![], QuizMode::Standard, Difficulty::Easy, None);
    assert!(matches!(direct, Err(Error::GenerationEmpty)));

    let launched = svc
        .launch("some study text", QuizMode::Standard, Difficulty::Easy, None)
        .await;
    assert!(matches!(launched, Err(Error::GenerationEmpty)));
}

#[tokio::test]
async fn standard_flow_scores_and_streaks() {
    let svc = service(StubSource::empty(), StubJudge::scoring(3));
    let questions = vec![
        standard_question(1),
        standard_question(0),
        standard_question(2),
    ];
    let mut session = svc
        .start_session("text", questions, QuizMode::Standard, Difficulty::Medium, None)
        .unwrap();
    assert_eq!(session.view, QuizView::Playing);
    assert!(session.timer.enabled);
    assert_eq!(session.time_remaining, 30);

    // correct, full clock: 100 + 60 time + 0 streak
    let applied = svc
        .submit_answer(&mut session, AnswerInput::Choice { index: 1 })
        .await
        .unwrap();
    assert!(applied);
    assert_eq!(session.score, 160);
    assert_eq!(session.streak, 1);
    assert_eq!(session.phase, QuestionPhase::Answered);

    // second submit on the same question is a silent no-op
    let repeat = svc
        .submit_answer(&mut session, AnswerInput::Choice { index: 0 })
        .await
        .unwrap();
    assert!(!repeat);
    assert_eq!(session.attempts.len(), 1);
    assert_eq!(session.score, 160);

    assert!(svc.advance(&mut session));
    assert_eq!(session.time_remaining, 30);

    // correct again: 100 + 60 + streak bonus 10
    svc.submit_answer(&mut session, AnswerInput::Choice { index: 0 })
        .await
        .unwrap();
    assert_eq!(session.score, 330);
    assert_eq!(session.streak, 2);

    assert!(svc.advance(&mut session));

    // wrong pick: nothing earned, streak resets
    svc.submit_answer(&mut session, AnswerInput::Choice { index: 3 })
        .await
        .unwrap();
    assert_eq!(session.score, 330);
    assert_eq!(session.streak, 0);
    assert!(!session.attempts[2].overall_correct);
    assert!(!session.attempts[2].timed_out);

    // end of list
    assert!(!svc.advance(&mut session));

    let report = svc.finish(&mut session);
    assert_eq!(session.view, QuizView::Results);
    assert_eq!(report.questions_answered, 3);
    assert!((report.overall_accuracy - 2.0 / 3.0).abs() < 1e-9);
    assert_eq!(report.total_score, 330);
    assert_eq!(report.difficulty_progression.len(), 3);

    // results -> setup is the only exit
    assert!(svc.reset(&mut session));
    assert_eq!(session.view, QuizView::Setup);
    assert_eq!(session.score, 0);
    assert!(session.attempts.is_empty());
    assert!(session.questions.is_empty());
}

#[tokio::test]
async fn countdown_expiry_auto_submits_the_sentinel() {
    let svc = service(StubSource::empty(), StubJudge::scoring(3));
    let mut session = svc
        .start_session(
            "text",
            vec![standard_question(0), standard_question(0)],
            QuizMode::Standard,
            Difficulty::Easy,
            Some(TimerConfig {
                enabled: true,
                duration_seconds: 3,
            }),
        )
        .unwrap();

    svc.tick(&mut session);
    svc.tick(&mut session);
    assert_eq!(session.time_remaining, 1);
    assert_eq!(session.phase, QuestionPhase::Unanswered);

    svc.tick(&mut session);
    assert_eq!(session.phase, QuestionPhase::Answered);
    let attempt = &session.attempts[0];
    assert!(attempt.timed_out);
    assert!(!attempt.overall_correct);
    assert_eq!(attempt.points, 0);
    assert_eq!(
        attempt.input,
        AnswerInput::Choice {
            index: TIME_EXPIRED_INDEX
        }
    );
    assert_eq!(session.streak, 0);

    // a late user submit after expiry changes nothing
    let late = svc
        .submit_answer(&mut session, AnswerInput::Choice { index: 0 })
        .await
        .unwrap();
    assert!(!late);
    assert_eq!(session.attempts.len(), 1);

    // ticks on an answered question are inert
    svc.tick(&mut session);
    assert_eq!(session.attempts.len(), 1);

    svc.advance(&mut session);
    svc.submit_answer(&mut session, AnswerInput::Choice { index: 0 })
        .await
        .unwrap();
    let report = svc.finish(&mut session);
    assert!(report
        .suggestions
        .iter()
        .any(|s| s.contains("timed out")));
}

#[tokio::test]
async fn multiplayer_views_route_through_waiting_and_leaderboard() {
    let svc = service(StubSource::empty(), StubJudge::scoring(3));
    let mut session = svc
        .start_session(
            "text",
            vec![standard_question(0)],
            QuizMode::Standard,
            Difficulty::Easy,
            None,
        )
        .unwrap();

    svc.submit_answer(&mut session, AnswerInput::Choice { index: 0 })
        .await
        .unwrap();
    assert!(svc.enter_waiting(&mut session));
    assert_eq!(session.view, QuizView::Waiting);
    assert!(!svc.enter_waiting(&mut session));

    assert!(svc.show_leaderboard(&mut session));
    assert_eq!(session.view, QuizView::Leaderboard);

    svc.finish(&mut session);
    assert_eq!(session.view, QuizView::Results);
    assert!(!svc.show_leaderboard(&mut session));
    assert!(svc.reset(&mut session));
    assert_eq!(session.view, QuizView::Setup);

    // finishing from setup is a no-op view-wise
    svc.finish(&mut session);
    assert_eq!(session.view, QuizView::Setup);
}

#[tokio::test]
async fn mismatched_input_kind_is_rejected() {
    let svc = service(StubSource::empty(), StubJudge::scoring(3));
    let mut session = svc
        .start_session(
            "text",
            vec![standard_question(0)],
            QuizMode::Standard,
            Difficulty::Easy,
            None,
        )
        .unwrap();

    let result = svc
        .submit_answer(
            &mut session,
            AnswerInput::Blanks {
                responses: vec!["100".to_string()],
            },
        )
        .await;
    assert!(matches!(result, Err(Error::BadRequest(_))));
    assert!(session.attempts.is_empty());
    assert_eq!(session.phase, QuestionPhase::Unanswered);
}

#[tokio::test]
async fn fill_blanks_flow_grades_fuzzily() {
    let svc = service(StubSource::empty(), StubJudge::scoring(3));
    let questions = vec![fill_question(&[&["100", "one hundred"], &["atmospheric"]])];
    let mut session = svc
        .start_session("text", questions, QuizMode::FillBlanks, Difficulty::Medium, None)
        .unwrap();
    assert!(!session.timer.enabled);

    // "atmospheri" is one edit off an 11-char accepted answer
    svc.submit_answer(
        &mut session,
        AnswerInput::Blanks {
            responses: vec!["100".to_string(), "atmospheri".to_string()],
        },
    )
    .await
    .unwrap();

    let attempt = &session.attempts[0];
    assert!(attempt.overall_correct);
    assert_eq!(attempt.blank_results.len(), 2);
    assert_eq!(session.score, 90);
    assert_eq!(session.streak, 1);
}

#[tokio::test]
async fn explain_flow_uses_the_judge_verdict() {
    let svc = service(StubSource::empty(), StubJudge::scoring(4));
    let mut session = svc
        .start_session(
            "text",
            vec![explain_question(1)],
            QuizMode::Explain,
            Difficulty::Medium,
            None,
        )
        .unwrap();

    svc.submit_answer(
        &mut session,
        AnswerInput::Explained {
            index: 1,
            justification: "Chlorophyll absorbs red and blue light and reflects green."
                .to_string(),
        },
    )
    .await
    .unwrap();

    let attempt = &session.attempts[0];
    assert!(attempt.overall_correct);
    let reasoning = attempt.reasoning.as_ref().unwrap();
    assert_eq!(reasoning.score, 4);
    assert!(!reasoning.fallback);
    // 50 choice + 40 reasoning, untimed, no streak
    assert_eq!(session.score, 90);
}

#[tokio::test]
async fn judge_failure_falls_back_without_stalling() {
    let svc = service(StubSource::empty(), StubJudge::offline());
    let mut session = svc
        .start_session(
            "text",
            vec![explain_question(0)],
            QuizMode::Explain,
            Difficulty::Medium,
            None,
        )
        .unwrap();

    let applied = svc
        .submit_answer(
            &mut session,
            AnswerInput::Explained {
                index: 0,
                justification: "Because of chlorophyll.".to_string(),
            },
        )
        .await
        .unwrap();
    assert!(applied);

    let attempt = &session.attempts[0];
    let reasoning = attempt.reasoning.as_ref().unwrap();
    assert!(reasoning.fallback);
    // correct choice under fallback grades 3/5
    assert_eq!(reasoning.score, 3);
    assert_eq!(session.score, 80);
    assert_eq!(session.phase, QuestionPhase::Answered);
}

#[tokio::test]
async fn explain_timeout_never_calls_the_judge() {
    // an offline judge would error if consulted; expiry must not reach it
    let svc = service(StubSource::empty(), StubJudge::offline());
    let mut session = svc
        .start_session(
            "text",
            vec![explain_question(0)],
            QuizMode::Explain,
            Difficulty::Medium,
            Some(TimerConfig {
                enabled: true,
                duration_seconds: 1,
            }),
        )
        .unwrap();

    svc.tick(&mut session);
    let attempt = &session.attempts[0];
    assert!(attempt.timed_out);
    assert_eq!(attempt.points, 0);
    let reasoning = attempt.reasoning.as_ref().unwrap();
    assert!(reasoning.fallback);
    assert_eq!(reasoning.score, 2);
}

#[tokio::test]
async fn swipe_sessions_score_once_at_the_end() {
    let svc = service(StubSource::empty(), StubJudge::scoring(3));
    let questions = vec![
        swipe_question(true),
        swipe_question(false),
        swipe_question(true),
        swipe_question(false),
    ];
    let mut session = svc
        .start_session("text", questions, QuizMode::Swipe, Difficulty::Easy, None)
        .unwrap();
    assert_eq!(
        session.questions[0].options().unwrap(),
        vec!["True".to_string(), "False".to_string()]
    );

    // 3 of 4 correct; per-question contributions stay zero
    for answer in [0, 1, 1, 1] {
        svc.submit_answer(&mut session, AnswerInput::Choice { index: answer })
            .await
            .unwrap();
        assert_eq!(session.score, 0);
        svc.advance(&mut session);
    }
    assert_eq!(session.swipe_correct, 3);

    let report = svc.finish(&mut session);
    assert_eq!(session.score, 750);
    assert_eq!(report.total_score, 750);

    // finishing again must not re-apply the scale
    let report = svc.finish(&mut session);
    assert_eq!(report.total_score, 750);
}
