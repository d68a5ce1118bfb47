use crate::models::question::Difficulty;
use serde::{Deserialize, Serialize};

/// Read-only session summary derived once at session end from the full
/// attempt log. `overall_accuracy` is always recomputed locally so it can
/// never drift from the raw attempt data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizReport {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub suggestions: Vec<String>,
    pub difficulty_progression: Vec<Difficulty>,
    pub overall_accuracy: f64,
    pub total_score: u32,
    pub questions_answered: usize,
}
