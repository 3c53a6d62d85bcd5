
pub mod quiz;

pub use quiz::{AnswerOutcome, QuizPhase, QuizSession, RoundSettings, RoundSummary, SessionStep};

pub const BASE_POINTS: u32 = 10;
pub const LARGE_TIME_BONUS: u32 = 5;
pub const SMALL_TIME_BONUS: u32 = 1;
/// Answers with more than this many seconds left earn the large bonus.
pub const LARGE_BONUS_THRESHOLD_SECS: u32 = 10;

/// Points for one answer.
///
/// A wrong answer is worth nothing. A correct one earns [`BASE_POINTS`],
/// plus [`LARGE_TIME_BONUS`] with more than ten seconds left or
/// [`SMALL_TIME_BONUS`] with any time left at all.
pub fn calculate_score(is_correct: bool, seconds_left: u32) -> u32 {
    if !is_correct {
        return 0;
    }

    if seconds_left > LARGE_BONUS_THRESHOLD_SECS {
        BASE_POINTS + LARGE_TIME_BONUS
    } else if seconds_left > 0 {
        BASE_POINTS + SMALL_TIME_BONUS
    } else {
        BASE_POINTS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    /// No time limit, flat points per correct answer.
    Classic,
    /// A countdown per question with a bonus for fast answers.
    Timed,
}

impl GameMode {
    pub fn is_timed(&self) -> bool {
        matches!(self, GameMode::Timed)
    }

    pub fn label(&self) -> &'static str {
        match self {
            GameMode::Classic => "Quiz",
            GameMode::Timed => "Time mode",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            GameMode::Classic => "Classic mode. No time limit. Test your knowledge.",
            GameMode::Timed => "A countdown per question. Bonus points for speed!",
        }
    }
}
