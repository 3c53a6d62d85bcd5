// src/db.rs

use chrono::{Local, NaiveDate};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::Path;

use crate::config::StorageConfig;
use crate::content::default_questions;
use crate::error::DbError;
use crate::game_logic::RoundSummary;
use crate::model::{HighscoreEntry, Question};

/// Reads and writes the question catalogue and the highscore table.
///
/// Both live in pretty-printed JSON files that are loaded and rewritten as a
/// whole on every mutation; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct DataManager {
    config: StorageConfig,
}

impl DataManager {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    #[tracing::instrument(skip(self), fields(file.path = ?self.config.questions_path))]
    pub async fn load_questions(&self) -> Result<Vec<Question>, DbError> {
        read_json_list(&self.config.questions_path).await
    }

    #[tracing::instrument(skip(self, questions), fields(questions.count = questions.len()))]
    pub async fn save_questions(&self, questions: &[Question]) -> Result<(), DbError> {
        write_json_list(&self.config.questions_path, questions).await
    }

    pub async fn add_question(&self, question: Question) -> Result<(), DbError> {
        let mut questions = self.load_questions().await?;
        questions.push(question);
        self.save_questions(&questions).await?;
        tracing::info!(questions.count = questions.len(), "Question added");
        Ok(())
    }

    pub async fn update_question(&self, index: usize, question: Question) -> Result<(), DbError> {
        let mut questions = self.load_questions().await?;
        let len = questions.len();
        let slot = questions
            .get_mut(index)
            .ok_or(DbError::IndexOutOfRange { index, len })?;
        *slot = question;
        self.save_questions(&questions).await?;
        tracing::info!(question.index = index, "Question updated");
        Ok(())
    }

    pub async fn delete_question(&self, index: usize) -> Result<Question, DbError> {
        let mut questions = self.load_questions().await?;
        if index >= questions.len() {
            return Err(DbError::IndexOutOfRange {
                index,
                len: questions.len(),
            });
        }
        let removed = questions.remove(index);
        self.save_questions(&questions).await?;
        tracing::info!(question.index = index, questions.count = questions.len(), "Question deleted");
        Ok(removed)
    }

    /// Seeds the default catalogue when there are no questions yet.
    /// Returns how many questions were written.
    pub async fn ensure_questions_exist(&self) -> Result<usize, DbError> {
        let current = self.load_questions().await?;
        if !current.is_empty() {
            tracing::debug!(questions.count = current.len(), "Question catalogue present");
            return Ok(0);
        }

        let defaults = default_questions();
        self.save_questions(&defaults).await?;
        tracing::info!(questions.count = defaults.len(), "Seeded default question catalogue");
        Ok(defaults.len())
    }

    /// All highscores, best first.
    #[tracing::instrument(skip(self), fields(file.path = ?self.config.highscores_path))]
    pub async fn load_highscores(&self) -> Result<Vec<HighscoreEntry>, DbError> {
        let mut entries: Vec<HighscoreEntry> =
            read_json_list(&self.config.highscores_path).await?;
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(entries)
    }

    /// Appends a result dated today.
    pub async fn save_highscore(&self, name: &str, score: u32) -> Result<HighscoreEntry, DbError> {
        self.save_highscore_on(name, score, Local::now().date_naive())
            .await
    }

    async fn save_highscore_on(
        &self,
        name: &str,
        score: u32,
        date: NaiveDate,
    ) -> Result<HighscoreEntry, DbError> {
        let mut entries = self.load_highscores().await?;
        let entry = HighscoreEntry::new(name, score, date);
        entries.push(entry.clone());
        write_json_list(&self.config.highscores_path, &entries).await?;

        tracing::info!(player = %name, score, "Highscore saved");
        Ok(entry)
    }

    pub async fn record_round(&self, summary: &RoundSummary) -> Result<HighscoreEntry, DbError> {
        self.save_highscore(&summary.player, summary.score).await
    }

    /// Entries for `username`, compared case-insensitively. A blank name
    /// matches nothing.
    pub async fn user_highscores(&self, username: &str) -> Result<Vec<HighscoreEntry>, DbError> {
        let username = username.trim();
        if username.is_empty() {
            return Ok(Vec::new());
        }
        let needle = username.to_lowercase();

        let entries = self.load_highscores().await?;
        Ok(entries
            .into_iter()
            .filter(|entry| entry.player_name.to_lowercase() == needle)
            .collect())
    }

    /// Best score of `username`, 0 when there is none.
    pub async fn user_best_score(&self, username: &str) -> Result<u32, DbError> {
        let entries = self.user_highscores(username).await?;
        Ok(entries.iter().map(|entry| entry.score).max().unwrap_or(0))
    }
}

async fn read_json_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DbError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(file.path = ?path, "File missing, starting with an empty list");
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(DbError::FileRead {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(&content).map_err(|e| {
        tracing::error!(file.path = ?path, error = %e, "Failed to parse data file");
        DbError::Parse {
            path: path.to_path_buf(),
            source: e,
        }
    })
}

async fn write_json_list<T: Serialize>(path: &Path, items: &[T]) -> Result<(), DbError> {
    let json = serde_json::to_string_pretty(items)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| DbError::FileWrite {
                path: path.to_path_buf(),
                source: e,
            })?;
    }

    tokio::fs::write(path, json)
        .await
        .map_err(|e| DbError::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })
}
