mod app;
mod ui;

use quizapp::config::LoggingConfig;
use quizapp::{DataManager, load_settings};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let settings = load_settings()?;
    init_tracing(&settings.logging)?;
    tracing::info!(?settings, "Configuration loaded");

    let data = DataManager::new(settings.storage.clone());
    let seeded = data.ensure_questions_exist().await?;
    if seeded > 0 {
        tracing::info!(count = seeded, "Seeded the question catalogue");
    }

    let terminal = ratatui::init();
    let result = App::new(data, settings).run_ui(terminal).await;
    ratatui::restore();

    if let Err(e) = &result {
        tracing::error!(error = %e, "UI loop failed");
    }
    tracing::info!("Quiz app closed");
    result
}

/// The terminal belongs to the UI, so logs go to a file.
fn init_tracing(logging: &LoggingConfig) -> color_eyre::Result<()> {
    if let Some(parent) = logging.file.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&logging.file)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("quizapp=info,{}=info", env!("CARGO_CRATE_NAME")).into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();
    Ok(())
}
