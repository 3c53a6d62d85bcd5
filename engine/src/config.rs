use crate::error::{ConfigError, Result as AppResult};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub questions_path: PathBuf,
    pub highscores_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizConfig {
    pub questions_per_round: usize,
    pub seconds_per_question: u64,
    pub feedback_delay_ms: u64,
}

impl QuizConfig {
    pub fn time_per_question(&self) -> Duration {
        Duration::from_secs(self.seconds_per_question)
    }

    pub fn feedback_delay(&self) -> Duration {
        Duration::from_millis(self.feedback_delay_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginConfig {
    pub min_username_len: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub file: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    pub storage: StorageConfig,
    pub quiz: QuizConfig,
    pub login: LoginConfig,
    pub logging: LoggingConfig,
}

/// Loads settings from `QUIZAPP__*` environment variables and an optional
/// `config.*` file in the working directory, on top of built-in defaults.
pub fn load_settings() -> AppResult<AppSettings> {
    let builder = Config::builder()
        .add_source(environment())
        .add_source(File::with_name("config").required(false));

    build_settings(builder)
}

/// `QUIZAPP__QUIZ__SECONDS_PER_QUESTION=30` sets `quiz.seconds_per_question`.
fn environment() -> Environment {
    Environment::with_prefix("QUIZAPP")
        .separator("__")
        .try_parsing(true)
}

fn build_settings(builder: ConfigBuilder<DefaultState>) -> AppResult<AppSettings> {
    let settings = with_defaults(builder)
        .map_err(|e| ConfigError::Load(e.to_string()))?
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let settings: AppSettings = settings
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate(&settings)?;
    Ok(settings)
}

fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
    builder
        .set_default("storage.questions_path", "questions.json")?
        .set_default("storage.highscores_path", "highscores.json")?
        .set_default("quiz.questions_per_round", 10_i64)?
        .set_default("quiz.seconds_per_question", 20_i64)?
        .set_default("quiz.feedback_delay_ms", 1500_i64)?
        .set_default("login.min_username_len", 2_i64)?
        .set_default("logging.file", "quizapp.log")
}

fn validate(settings: &AppSettings) -> Result<(), ConfigError> {
    if settings.quiz.questions_per_round == 0 {
        return Err(ConfigError::InvalidValue(
            "quiz.questions_per_round must be at least 1".to_string(),
        ));
    }
    if settings.quiz.seconds_per_question == 0 {
        return Err(ConfigError::InvalidValue(
            "quiz.seconds_per_question must be at least 1".to_string(),
        ));
    }
    Ok(())
}
