use color_eyre::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use quizapp::admin::{DraftField, QuestionEditor, SaveOutcome};
use quizapp::error::QuizError;
use quizapp::game_logic::{GameMode, QuizSession, RoundSettings, RoundSummary, SessionStep};
use quizapp::login::validate_username;
use quizapp::model::{HighscoreEntry, OPTION_COUNT, Question, User};
use quizapp::{AppSettings, DataManager};
use ratatui::prelude::*;
use ratatui::widgets::{ListState, TableState};
use std::time::{Duration, Instant};

use crate::ui;

const TICK_RATE: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Quiz,
    TimeMode,
    Highscores,
    Admin,
    Credits,
    Logout,
    Quit,
}

impl MenuItem {
    pub fn all() -> Vec<Self> {
        vec![
            MenuItem::Quiz,
            MenuItem::TimeMode,
            MenuItem::Highscores,
            MenuItem::Admin,
            MenuItem::Credits,
            MenuItem::Logout,
            MenuItem::Quit,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            MenuItem::Quiz => GameMode::Classic.label(),
            MenuItem::TimeMode => GameMode::Timed.label(),
            MenuItem::Highscores => "Highscores",
            MenuItem::Admin => "Manage questions",
            MenuItem::Credits => "Credits",
            MenuItem::Logout => "Log out",
            MenuItem::Quit => "Quit",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MenuItem::Quiz => GameMode::Classic.description(),
            MenuItem::TimeMode => GameMode::Timed.description(),
            MenuItem::Highscores => "See the best results and your ranking.",
            MenuItem::Admin => "Add, edit or delete questions.",
            MenuItem::Credits => "Who built this.",
            MenuItem::Logout => "Switch player.",
            MenuItem::Quit => "Leave the app.",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Login,
    Menu,
    Quiz,
    RoundOver { summary: RoundSummary, saved: bool },
    Highscores,
    Admin,
    Credits,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminMode {
    Browse,
    Editing { focus: DraftField },
    ConfirmDelete(usize),
}

pub struct AdminState {
    pub questions: Vec<Question>,
    pub list_state: ListState,
    pub editor: QuestionEditor,
    pub mode: AdminMode,
}

impl AdminState {
    fn new() -> Self {
        Self {
            questions: Vec::new(),
            list_state: ListState::default(),
            editor: QuestionEditor::new(),
            mode: AdminMode::Browse,
        }
    }
}

pub struct App {
    pub data: DataManager,
    pub settings: AppSettings,
    pub screen: Screen,
    pub should_quit: bool,
    pub user: Option<User>,
    pub best_score: u32,
    pub login_input: String,
    pub menu_state: ListState,
    pub session: Option<QuizSession>,
    pub highscores: Vec<HighscoreEntry>,
    pub highscore_state: TableState,
    pub only_mine: bool,
    pub admin: AdminState,
    pub notice: Option<Notice>,
}

impl App {
    pub fn new(data: DataManager, settings: AppSettings) -> Self {
        App {
            data,
            settings,
            screen: Screen::Login,
            should_quit: false,
            user: None,
            best_score: 0,
            login_input: String::new(),
            menu_state: ListState::default().with_selected(Some(0)),
            session: None,
            highscores: Vec::new(),
            highscore_state: TableState::default(),
            only_mine: false,
            admin: AdminState::new(),
            notice: None,
        }
    }

    pub async fn run_ui(&mut self, mut terminal: Terminal<impl Backend>) -> Result<()> {
        while !self.should_quit {
            self.on_tick(Instant::now()).await;

            terminal.draw(|f| ui::draw(f, self, Instant::now()))?;

            if event::poll(TICK_RATE)? {
                if let CrosstermEvent::Key(key_event) = event::read()? {
                    self.handle_key_event(key_event).await;
                }
            }
        }
        Ok(())
    }

    /// Drives the countdown and the pause after each answer.
    pub async fn on_tick(&mut self, now: Instant) {
        if self.screen != Screen::Quiz {
            return;
        }
        let finished = match self.session.as_mut() {
            Some(session) => session.tick(now) == SessionStep::Finished,
            None => false,
        };
        if finished {
            self.finish_round().await;
        }
    }

    pub async fn handle_key_event(&mut self, key_event: KeyEvent) {
        if key_event.kind != KeyEventKind::Press {
            return;
        }
        if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c')
        {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Login => self.handle_login_key(key_event).await,
            Screen::Menu => self.handle_menu_key(key_event).await,
            Screen::Quiz => self.handle_quiz_key(key_event, Instant::now()).await,
            Screen::RoundOver { .. } | Screen::Credits => {
                if matches!(key_event.code, KeyCode::Enter | KeyCode::Esc) {
                    self.screen = Screen::Menu;
                }
            }
            Screen::Highscores => self.handle_highscores_key(key_event).await,
            Screen::Admin => self.handle_admin_key(key_event).await,
        }
    }

    async fn handle_login_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(c) => self.login_input.push(c),
            KeyCode::Backspace => {
                self.login_input.pop();
            }
            KeyCode::Enter => self.submit_login().await,
            _ => {}
        }
    }

    async fn submit_login(&mut self) {
        match validate_username(&self.login_input, self.settings.login.min_username_len) {
            Ok(user) => {
                self.best_score = self.load_best_score(&user.username).await;
                self.user = Some(user);
                self.login_input.clear();
                self.notice = None;
                self.menu_state.select(Some(0));
                self.screen = Screen::Menu;
            }
            Err(e) => self.notice = Some(Notice::Error(e.to_string())),
        }
    }

    async fn load_best_score(&self, username: &str) -> u32 {
        self.data
            .user_best_score(username)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, user = %username, "Could not read best score");
                0
            })
    }

    fn selected_menu_item(&self) -> Option<MenuItem> {
        self.menu_state
            .selected()
            .and_then(|i| MenuItem::all().get(i).copied())
    }

    async fn handle_menu_key(&mut self, key_event: KeyEvent) {
        let item_count = MenuItem::all().len();
        match key_event.code {
            KeyCode::Up | KeyCode::Char('k') => {
                let selected = self.menu_state.selected().unwrap_or(0);
                self.menu_state
                    .select(Some((selected + item_count - 1) % item_count));
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let selected = self.menu_state.selected().unwrap_or(0);
                self.menu_state.select(Some((selected + 1) % item_count));
            }
            KeyCode::Enter => {
                if let Some(item) = self.selected_menu_item() {
                    self.activate(item).await;
                }
            }
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    pub async fn activate(&mut self, item: MenuItem) {
        self.notice = None;
        match item {
            MenuItem::Quiz => self.start_round(GameMode::Classic).await,
            MenuItem::TimeMode => self.start_round(GameMode::Timed).await,
            MenuItem::Highscores => {
                self.refresh_highscores().await;
                self.screen = Screen::Highscores;
            }
            MenuItem::Admin => {
                self.admin.editor.reset();
                self.admin.mode = AdminMode::Browse;
                self.refresh_admin().await;
                self.screen = Screen::Admin;
            }
            MenuItem::Credits => self.screen = Screen::Credits,
            MenuItem::Logout => {
                tracing::info!(user = ?self.user.as_ref().map(|u| &u.username), "User logged out");
                self.user = None;
                self.best_score = 0;
                self.screen = Screen::Login;
            }
            MenuItem::Quit => self.should_quit = true,
        }
    }

    async fn start_round(&mut self, mode: GameMode) {
        let Some(user) = self.user.clone() else {
            self.screen = Screen::Login;
            return;
        };

        let pool = match self.data.load_questions().await {
            Ok(pool) => pool,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load questions");
                self.notice = Some(Notice::Error(format!("Could not load questions: {e}")));
                return;
            }
        };

        let settings = RoundSettings::from(&self.settings.quiz);
        let started = QuizSession::start(
            user,
            mode,
            settings,
            pool,
            &mut rand::thread_rng(),
            Instant::now(),
        );
        match started {
            Ok(session) => {
                self.session = Some(session);
                self.screen = Screen::Quiz;
            }
            Err(e) => self.notice = Some(Notice::Error(e.to_string())),
        }
    }

    async fn handle_quiz_key(&mut self, key_event: KeyEvent, now: Instant) {
        let Some(session) = self.session.as_mut() else {
            self.screen = Screen::Menu;
            return;
        };

        match key_event.code {
            KeyCode::Esc => {
                tracing::info!(
                    session.id = %session.id(),
                    player = %session.player().username,
                    score = session.score(),
                    "Round abandoned"
                );
                self.session = None;
                self.notice = Some(Notice::Info("Round abandoned, nothing was saved.".to_string()));
                self.screen = Screen::Menu;
            }
            KeyCode::Char('j') => match session.use_fifty_fifty() {
                Ok(_) => self.notice = None,
                Err(QuizError::JokerAlreadyUsed) => {
                    self.notice = Some(Notice::Info(QuizError::JokerAlreadyUsed.to_string()));
                }
                Err(_) => {}
            },
            KeyCode::Char('s') => {
                if let Ok(SessionStep::Finished) = session.skip(now) {
                    self.finish_round().await;
                }
            }
            KeyCode::Char(c) => {
                let Some(option) = option_for_key(c) else {
                    return;
                };
                match session.answer(option, now) {
                    Ok(_) => self.notice = None,
                    Err(QuizError::InvalidOption(_)) => {
                        self.notice = Some(Notice::Info("That answer was removed by the joker.".to_string()));
                    }
                    Err(_) => {}
                }
            }
            _ => {}
        }
    }

    async fn finish_round(&mut self) {
        let Some(summary) = self.session.as_ref().and_then(QuizSession::summary) else {
            return;
        };
        self.session = None;

        let saved = match self.data.record_round(&summary).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(error = %e, player = %summary.player, "Failed to save highscore");
                self.notice = Some(Notice::Error(format!("Could not save the result: {e}")));
                false
            }
        };
        if saved {
            self.best_score = self.load_best_score(&summary.player).await;
        }
        self.screen = Screen::RoundOver { summary, saved };
    }

    pub async fn refresh_highscores(&mut self) {
        let loaded = match (&self.user, self.only_mine) {
            (Some(user), true) => self.data.user_highscores(&user.username).await,
            _ => self.data.load_highscores().await,
        };
        match loaded {
            Ok(entries) => {
                self.highscores = entries;
                self.highscore_state
                    .select((!self.highscores.is_empty()).then_some(0));
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load highscores");
                self.highscores.clear();
                self.notice = Some(Notice::Error(format!("Could not load highscores: {e}")));
            }
        }
    }

    async fn handle_highscores_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Esc | KeyCode::Enter => self.screen = Screen::Menu,
            KeyCode::Char('m') => {
                self.only_mine = !self.only_mine;
                self.refresh_highscores().await;
            }
            KeyCode::Up => self.highscore_state.select_previous(),
            KeyCode::Down => self.highscore_state.select_next(),
            _ => {}
        }
    }

    pub async fn refresh_admin(&mut self) {
        match self.data.load_questions().await {
            Ok(questions) => self.admin.questions = questions,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load questions");
                self.admin.questions.clear();
                self.notice = Some(Notice::Error(format!("Could not load questions: {e}")));
            }
        }

        let len = self.admin.questions.len();
        let selected = match self.admin.list_state.selected() {
            _ if len == 0 => None,
            Some(i) => Some(i.min(len - 1)),
            None => Some(0),
        };
        self.admin.list_state.select(selected);
    }

    async fn handle_admin_key(&mut self, key_event: KeyEvent) {
        match self.admin.mode {
            AdminMode::Browse => self.handle_admin_browse_key(key_event).await,
            AdminMode::Editing { focus } => self.handle_admin_form_key(key_event, focus).await,
            AdminMode::ConfirmDelete(index) => {
                if key_event.code == KeyCode::Char('y') {
                    self.delete_question(index).await;
                }
                self.admin.mode = AdminMode::Browse;
            }
        }
    }

    async fn handle_admin_browse_key(&mut self, key_event: KeyEvent) {
        let selected = self.admin.list_state.selected();
        match key_event.code {
            KeyCode::Esc => {
                self.admin.editor.reset();
                self.screen = Screen::Menu;
            }
            KeyCode::Up => self.admin.list_state.select_previous(),
            KeyCode::Down => self.admin.list_state.select_next(),
            KeyCode::Char('n') => {
                self.admin.editor.reset();
                self.admin.mode = AdminMode::Editing { focus: DraftField::Text };
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                if let Some(index) = selected.filter(|&i| i < self.admin.questions.len()) {
                    self.admin.editor.edit(index, &self.admin.questions[index]);
                    self.admin.mode = AdminMode::Editing { focus: DraftField::Text };
                }
            }
            KeyCode::Tab => self.admin.mode = AdminMode::Editing { focus: DraftField::Text },
            KeyCode::Char('d') => {
                if let Some(index) = selected.filter(|&i| i < self.admin.questions.len()) {
                    self.admin.mode = AdminMode::ConfirmDelete(index);
                }
            }
            _ => {}
        }
    }

    /// `Esc` returns to the list with the draft kept; `Tab` from the list
    /// resumes it.
    async fn handle_admin_form_key(&mut self, key_event: KeyEvent, focus: DraftField) {
        match key_event.code {
            KeyCode::Esc => self.admin.mode = AdminMode::Browse,
            KeyCode::Tab => self.admin.mode = AdminMode::Editing { focus: focus.next() },
            KeyCode::BackTab => self.admin.mode = AdminMode::Editing { focus: focus.prev() },
            KeyCode::Char(c) => self.admin.editor.draft.field_mut(focus).push(c),
            KeyCode::Backspace => {
                self.admin.editor.draft.field_mut(focus).pop();
            }
            KeyCode::Enter if focus.is_last() => self.save_question().await,
            KeyCode::Enter => self.admin.mode = AdminMode::Editing { focus: focus.next() },
            _ => {}
        }
    }

    async fn save_question(&mut self) {
        match self.admin.editor.save(&self.data).await {
            Ok(outcome) => {
                let text = match outcome {
                    SaveOutcome::Added => "Question added.".to_string(),
                    SaveOutcome::Updated(index) => format!("Question {} updated.", index + 1),
                };
                self.notice = Some(Notice::Info(text));
                self.admin.mode = AdminMode::Browse;
                self.refresh_admin().await;
            }
            Err(e) => self.notice = Some(Notice::Error(e.to_string())),
        }
    }

    async fn delete_question(&mut self, index: usize) {
        match self.admin.editor.delete(&self.data, index).await {
            Ok(removed) => {
                tracing::info!(question.text = %removed.text, "Question removed from catalogue");
                self.notice = Some(Notice::Info(format!("Question {} deleted.", index + 1)));
            }
            Err(e) => self.notice = Some(Notice::Error(e.to_string())),
        }
        self.refresh_admin().await;
    }
}

/// `a`-`d` and `1`-`4` pick an answer.
fn option_for_key(c: char) -> Option<usize> {
    let index = match c.to_ascii_lowercase() {
        letter @ 'a'..='d' => letter as usize - 'a' as usize,
        digit @ '1'..='4' => digit as usize - '1' as usize,
        _ => return None,
    };
    (index < OPTION_COUNT).then_some(index)
}
