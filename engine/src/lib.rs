//! Engine of the quiz app: questions, scoring, quiz rounds and the JSON
//! files they are kept in. The terminal front end lives in `quizapp_tui`.

pub mod admin;
pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod game_logic;
pub mod login;
pub mod model;

pub use config::{AppSettings, load_settings};
pub use db::DataManager;
pub use error::{AppError, Result};
