use crate::models::attempt::{BlankResult, TIME_EXPIRED_INDEX};
use crate::models::question::Blank;
use crate::utils::text::{levenshtein, normalize_answer};

/// Edits tolerated per accepted answer, as a fraction of its length.
pub const FUZZY_TOLERANCE_RATIO: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceOutcome {
    Correct,
    Incorrect,
    /// The countdown expired before any selection was made. Always
    /// incorrect, but recorded distinctly from a wrong pick.
    TimedOut,
}

impl ChoiceOutcome {
    pub fn is_correct(self) -> bool {
        matches!(self, ChoiceOutcome::Correct)
    }

    pub fn timed_out(self) -> bool {
        matches!(self, ChoiceOutcome::TimedOut)
    }
}

pub struct MatcherService;

impl MatcherService {
    pub fn match_choice(selected: i32, correct_index: usize) -> ChoiceOutcome {
        if selected == TIME_EXPIRED_INDEX {
            return ChoiceOutcome::TimedOut;
        }
        if selected >= 0 && selected as usize == correct_index {
            ChoiceOutcome::Correct
        } else {
            ChoiceOutcome::Incorrect
        }
    }

    /// Edits tolerated for an accepted answer of `len` chars: 15% of its
    /// length, never below one edit.
    pub fn fuzzy_tolerance(len: usize) -> usize {
        ((len as f64 * FUZZY_TOLERANCE_RATIO).floor() as usize).max(1)
    }

    /// Normalized comparison against every accepted answer: exact match
    /// first, then Levenshtein distance within the tolerance.
    pub fn fuzzy_match(candidate: &str, accepted_answers: &[String]) -> bool {
        let candidate = normalize_answer(candidate);
        if candidate.is_empty() {
            return false;
        }

        accepted_answers.iter().any(|raw| {
            let accepted = normalize_answer(raw);
            if accepted.is_empty() {
                return false;
            }
            if candidate == accepted {
                return true;
            }
            let tolerance = Self::fuzzy_tolerance(accepted.chars().count());
            levenshtein(&candidate, &accepted) <= tolerance
        })
    }

    /// Grades each blank against the response at the same position.
    /// Missing responses grade as empty, and empty never matches.
    pub fn match_blanks(responses: &[String], blanks: &[Blank]) -> Vec<BlankResult> {
        blanks
            .iter()
            .enumerate()
            .map(|(idx, blank)| {
                let response = responses.get(idx).cloned().unwrap_or_default();
                let correct = Self::fuzzy_match(&response, &blank.accepted_answers);
                BlankResult {
                    blank_id: blank.id.clone(),
                    response,
                    correct,
                }
            })
            .collect()
    }
}
