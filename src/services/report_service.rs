use crate::models::question::{Difficulty, QuizMode};
use crate::models::report::QuizReport;
use crate::models::session::QuizSession;

const STRENGTH_ACCURACY: f64 = 0.75;
const WEAKNESS_ACCURACY: f64 = 0.5;

pub struct ReportService;

impl ReportService {
    /// Derives the end-of-session report from the attempt log. Everything
    /// here is computed locally; in particular accuracy is never taken
    /// from an external generator.
    pub fn build(session: &QuizSession) -> QuizReport {
        let attempts = &session.attempts;
        let total = attempts.len();
        let correct = attempts.iter().filter(|a| a.overall_correct).count();
        let overall_accuracy = if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        };

        let mut strengths = Vec::new();
        let mut weaknesses = Vec::new();
        let mut suggestions = Vec::new();

        for tier in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            let at_tier: Vec<_> = attempts
                .iter()
                .filter(|a| a.question.difficulty == tier)
                .collect();
            if at_tier.is_empty() {
                continue;
            }
            let tier_correct = at_tier.iter().filter(|a| a.overall_correct).count();
            let accuracy = tier_correct as f64 / at_tier.len() as f64;
            if accuracy >= STRENGTH_ACCURACY {
                strengths.push(format!(
                    "Solid on {} questions ({}/{} correct)",
                    tier.label(),
                    tier_correct,
                    at_tier.len()
                ));
            } else if accuracy < WEAKNESS_ACCURACY {
                weaknesses.push(format!(
                    "Struggled with {} questions ({}/{} correct)",
                    tier.label(),
                    tier_correct,
                    at_tier.len()
                ));
            }
        }

        if session.mode == QuizMode::Explain {
            let scores: Vec<u8> = attempts
                .iter()
                .filter_map(|a| a.reasoning.as_ref().map(|r| r.score))
                .collect();
            if !scores.is_empty() {
                let avg = scores.iter().map(|s| *s as f64).sum::<f64>() / scores.len() as f64;
                if avg >= 4.0 {
                    strengths.push("Clear, well-reasoned written explanations".to_string());
                } else if avg <= 2.0 {
                    weaknesses.push("Written explanations often missed the key idea".to_string());
                }
            }
        }

        let timeouts = attempts.iter().filter(|a| a.timed_out).count();
        if timeouts > 0 {
            suggestions.push(format!(
                "{} question(s) timed out; try an untimed session to practice recall first",
                timeouts
            ));
        }
        if !weaknesses.is_empty() {
            suggestions.push("Revisit the source material for the areas listed above".to_string());
        }
        if overall_accuracy >= STRENGTH_ACCURACY && session.difficulty != Difficulty::Hard {
            suggestions.push("Accuracy is high; consider moving up a difficulty tier".to_string());
        }

        QuizReport {
            strengths,
            weaknesses,
            suggestions,
            difficulty_progression: attempts.iter().map(|a| a.question.difficulty).collect(),
            overall_accuracy,
            total_score: session.score,
            questions_answered: total,
        }
    }
}
