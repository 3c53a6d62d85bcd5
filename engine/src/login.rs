use thiserror::Error;

use crate::model::User;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoginError {
    #[error("Please enter a username.")]
    Empty,
    #[error("Username is too short (at least {min} characters).")]
    TooShort { min: usize },
}

/// Offline login: no password, only a sanity check on the name.
pub fn validate_username(input: &str, min_len: usize) -> Result<User, LoginError> {
    let username = input.trim();
    if username.is_empty() {
        return Err(LoginError::Empty);
    }
    if username.chars().count() < min_len {
        return Err(LoginError::TooShort { min: min_len });
    }

    tracing::info!(user = %username, "User logged in");
    Ok(User::new(username))
}
