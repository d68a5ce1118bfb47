use crate::models::attempt::AttemptedQuestion;
use crate::models::question::Difficulty;

/// Trailing attempts inspected when deciding the next difficulty tier.
pub const ADAPTIVE_WINDOW: usize = 5;
pub const ESCALATE_AT: usize = 4;
pub const DE_ESCALATE_AT: usize = 2;

pub struct AdaptiveService;

impl AdaptiveService {
    /// Difficulty for the next batch, from the last `ADAPTIVE_WINDOW`
    /// attempts (or fewer in a shorter session). Moves at most one tier
    /// per invocation and saturates at the ends of the scale.
    pub fn next_difficulty(attempts: &[AttemptedQuestion], current: Difficulty) -> Difficulty {
        let correct = attempts
            .iter()
            .rev()
            .take(ADAPTIVE_WINDOW)
            .filter(|a| a.overall_correct)
            .count();

        if correct >= ESCALATE_AT {
            current.escalate()
        } else if correct <= DE_ESCALATE_AT {
            current.de_escalate()
        } else {
            current
        }
    }
}
