//! Per-question and session scoring. All scores are non-negative integers,
//! computed once per attempt and never retroactively mutated. The streak
//! cap and time-bonus rate are shared across modes so leaderboard scores
//! stay comparable between sessions of different modes.

pub const STANDARD_BASE_POINTS: u32 = 100;
pub const STREAK_BONUS_STEP: u32 = 10;
pub const STREAK_BONUS_CAP: u32 = 50;
pub const TIME_BONUS_RATE: u32 = 2;
pub const BLANK_POINTS: u32 = 20;
pub const ALL_BLANKS_BONUS: u32 = 50;
pub const EXPLAIN_CHOICE_POINTS: u32 = 50;
pub const REASONING_POINTS_STEP: u32 = 10;
pub const SWIPE_SCORE_SCALE: u32 = 1000;

pub struct ScoringService;

impl ScoringService {
    pub fn streak_bonus(streak: u32) -> u32 {
        (streak * STREAK_BONUS_STEP).min(STREAK_BONUS_CAP)
    }

    pub fn time_bonus(time_remaining: u32, timer_enabled: bool) -> u32 {
        if timer_enabled {
            time_remaining * TIME_BONUS_RATE
        } else {
            0
        }
    }

    /// Standard mode. Incorrect or time-expired answers earn nothing.
    /// The streak bonus is paid on the streak held *before* this answer.
    pub fn standard_points(
        correct: bool,
        streak: u32,
        time_remaining: u32,
        timer_enabled: bool,
    ) -> u32 {
        if !correct {
            return 0;
        }
        STANDARD_BASE_POINTS
            + Self::streak_bonus(streak)
            + Self::time_bonus(time_remaining, timer_enabled)
    }

    /// Fill-in-the-blanks: per-blank points, an all-correct bonus, and the
    /// shared time/streak bonuses.
    pub fn fill_blanks_points(
        correct_blanks: u32,
        all_blanks_correct: bool,
        streak: u32,
        time_remaining: u32,
        timer_enabled: bool,
    ) -> u32 {
        let all_bonus = if all_blanks_correct {
            ALL_BLANKS_BONUS
        } else {
            0
        };
        BLANK_POINTS * correct_blanks
            + all_bonus
            + Self::time_bonus(time_remaining, timer_enabled)
            + Self::streak_bonus(streak)
    }

    /// Explain mode: the choice and the written reasoning are graded
    /// orthogonally, so reasoning points are earned even on a wrong pick.
    pub fn explain_points(
        choice_correct: bool,
        reasoning_score: u8,
        streak: u32,
        time_remaining: u32,
        timer_enabled: bool,
    ) -> u32 {
        let choice_points = if choice_correct {
            EXPLAIN_CHOICE_POINTS
        } else {
            0
        };
        choice_points
            + u32::from(reasoning_score) * REASONING_POINTS_STEP
            + Self::time_bonus(time_remaining, timer_enabled)
            + Self::streak_bonus(streak)
    }

    /// Swipe mode scores once at session end: the correct ratio scaled to
    /// a fixed-range integer. Per-question contributions are zero.
    pub fn swipe_final_score(correct: u32, total: u32) -> u32 {
        if total == 0 {
            return 0;
        }
        ((correct as f64 / total as f64) * SWIPE_SCORE_SCALE as f64).round() as u32
    }
}
