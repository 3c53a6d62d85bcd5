use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of answer options every question carries (A to D).
pub const OPTION_COUNT: usize = 4;

/// A single multiple-choice question as stored in `questions.json`.
///
/// `correct_index` is stored verbatim even when it points outside
/// `options`; callers check [`Question::is_playable`] before putting a
/// question in front of a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub text: String,
    pub options: [String; OPTION_COUNT],
    pub correct_index: usize,
}

impl Question {
    pub fn new(text: impl Into<String>, options: [String; OPTION_COUNT], correct_index: usize) -> Self {
        Self {
            text: text.into(),
            options,
            correct_index,
        }
    }

    pub fn is_playable(&self) -> bool {
        self.correct_index < OPTION_COUNT
    }

    pub fn is_correct(&self, chosen: usize) -> bool {
        chosen == self.correct_index
    }

    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.correct_index).map(String::as_str)
    }
}

/// One finished round in the highscore table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighscoreEntry {
    pub player_name: String,
    pub score: u32,
    pub date: NaiveDate,
}

impl HighscoreEntry {
    pub fn new(player_name: impl Into<String>, score: u32, date: NaiveDate) -> Self {
        Self {
            player_name: player_name.into(),
            score,
            date,
        }
    }
}

/// The player of the current session. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub current_score: u32,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            current_score: 0,
        }
    }

    pub fn add_points(&mut self, points: u32) {
        self.current_score = self.current_score.saturating_add(points);
    }
}
