use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading error: {0}")]
    Load(String),
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to serialize data: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("No question at index {index} (catalogue has {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizError {
    #[error("No questions available")]
    NoQuestions,
    #[error("Not accepting answers right now")]
    NotAcceptingAnswers,
    #[error("Option {0} cannot be chosen")]
    InvalidOption(usize),
    #[error("The 50:50 joker has already been used this round")]
    JokerAlreadyUsed,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Storage error: {0}")]
    Db(#[from] DbError),
    #[error("Question editor error: {0}")]
    Draft(#[from] crate::admin::DraftError),
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::DraftError;

    fn convert<E: Into<AppError>>(err: E) -> AppError {
        err.into()
    }

    #[test]
    fn engine_errors_keep_their_message_when_wrapped() {
        let err = convert(DbError::IndexOutOfRange { index: 4, len: 2 });
        assert!(matches!(err, AppError::Db(DbError::IndexOutOfRange { index: 4, len: 2 })));
        assert_eq!(
            err.to_string(),
            "Storage error: No question at index 4 (catalogue has 2)"
        );

        let err = convert(DraftError::MissingText);
        assert!(matches!(err, AppError::Draft(DraftError::MissingText)));

        let err = convert(ConfigError::InvalidValue("quiz.questions_per_round".to_string()));
        assert!(matches!(err, AppError::Config(ConfigError::InvalidValue(_))));
    }
}
