use crate::app::{AdminMode, App, MenuItem, Notice, Screen};
use quizapp::admin::{DraftField, EditTarget};
use quizapp::game_logic::{AnswerOutcome, QuizPhase, QuizSession, RoundSummary};
use quizapp::model::OPTION_COUNT;
use ratatui::{prelude::*, widgets::*};
use std::time::Instant;

const TITLE: &str = "Quiz App";

pub fn draw(f: &mut Frame, app: &mut App, now: Instant) {
    let layout = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(2),
    ])
    .split(f.area());

    draw_header(f, app, layout[0]);
    match app.screen.clone() {
        Screen::Login => draw_login(f, app, layout[1]),
        Screen::Menu => draw_menu(f, app, layout[1]),
        Screen::Quiz => {
            if let Some(session) = &app.session {
                draw_quiz(f, session, now, layout[1]);
            }
        }
        Screen::RoundOver { summary, saved } => draw_round_over(f, &summary, saved, layout[1]),
        Screen::Highscores => draw_highscores(f, app, layout[1]),
        Screen::Admin => draw_admin(f, app, layout[1]),
        Screen::Credits => draw_credits(f, layout[1]),
    }
    draw_footer(f, app, layout[2]);
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::BOTTOM);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let title = Paragraph::new(Line::from(TITLE.bold().cyan()));
    f.render_widget(title, inner);

    if let Some(user) = &app.user {
        let status = Paragraph::new(Line::from(vec![
            "Player: ".into(),
            user.username.as_str().bold(),
            format!("   Best: {}", app.best_score).into(),
        ]))
        .alignment(Alignment::Right);
        f.render_widget(status, inner);
    }
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let hints = match &app.screen {
        Screen::Login => "[Enter] log in  [Esc] quit",
        Screen::Menu => "[↑/↓] choose  [Enter] open  [q] quit",
        Screen::Quiz => "[a-d] answer  [j] 50:50 joker  [s] skip  [Esc] back to menu",
        Screen::RoundOver { .. } | Screen::Credits => "[Enter] back to menu",
        Screen::Highscores => "[↑/↓] scroll  [m] only mine / everyone  [Esc] back",
        Screen::Admin => match app.admin.mode {
            AdminMode::Browse => "[n] new  [Enter] edit  [Tab] open draft  [d] delete  [Esc] back",
            AdminMode::Editing { .. } => "[Tab] next field  [Enter] next / save  [Esc] back to list",
            AdminMode::ConfirmDelete(_) => "[y] delete  [any other key] keep",
        },
    };

    let notice = match &app.notice {
        Some(Notice::Info(text)) => Line::from(text.as_str().green()),
        Some(Notice::Error(text)) => Line::from(text.as_str().red()),
        None => Line::default(),
    };

    f.render_widget(
        Paragraph::new(vec![notice, Line::from(hints.dark_gray())]),
        area,
    );
}

fn draw_login(f: &mut Frame, app: &App, area: Rect) {
    let area = centered_rect(area, 50, 9);
    let layout = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .split(area);

    let welcome = Paragraph::new(vec![
        Line::from("Welcome!".bold()),
        Line::from("Enter a name to start."),
    ])
    .alignment(Alignment::Center);
    f.render_widget(welcome, layout[0]);

    let input = Paragraph::new(app.login_input.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title("Username"));
    f.render_widget(input, layout[1]);

    let note = Paragraph::new("No password required. Offline mode.".dark_gray())
        .alignment(Alignment::Center);
    f.render_widget(note, layout[2]);

    f.set_cursor_position(Position::new(
        layout[1].x + 1 + app.login_input.chars().count() as u16,
        layout[1].y + 1,
    ));
}

fn draw_menu(f: &mut Frame, app: &mut App, area: Rect) {
    let items: Vec<ListItem> = MenuItem::all()
        .into_iter()
        .map(|item| {
            ListItem::new(Line::from(vec![
                format!("{:<18}", item.label()).bold(),
                item.description().dark_gray(),
            ]))
        })
        .collect();

    let title = match &app.user {
        Some(user) => format!("Hello, {}!", user.username),
        None => "Menu".to_string(),
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol(">> ");
    f.render_stateful_widget(list, area, &mut app.menu_state);
}

fn draw_quiz(f: &mut Frame, session: &QuizSession, now: Instant, area: Rect) {
    let timer_height = if session.mode().is_timed() { 3 } else { 0 };
    let layout = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(timer_height),
        Constraint::Length(5),
        Constraint::Length(1),
        Constraint::Min(6),
        Constraint::Length(1),
    ])
    .split(area);

    let stats = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(layout[0]);
    f.render_widget(
        Paragraph::new(format!("POINTS {}", session.score()).bold()),
        stats[0],
    );
    f.render_widget(
        Paragraph::new(format!(
            "QUESTION {} / {}",
            session.question_number(),
            session.total_questions()
        ))
        .alignment(Alignment::Right),
        stats[1],
    );

    if let (Some(fraction), Some(seconds)) = (
        session.time_fraction_left(now),
        session.display_seconds_left(now),
    ) {
        let color = if fraction > 0.5 {
            Color::Green
        } else if fraction > 0.25 {
            Color::Yellow
        } else {
            Color::Red
        };
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("Time left"))
            .gauge_style(Style::default().fg(color))
            .ratio(fraction)
            .label(format!("{seconds}s"));
        f.render_widget(gauge, layout[1]);
    }

    let Some(question) = session.current_question() else {
        return;
    };
    let text = Paragraph::new(question.text.as_str())
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(session.mode().label()));
    f.render_widget(text, layout[2]);

    let feedback = match session.phase() {
        QuizPhase::Feedback { outcome, .. } => Some(outcome),
        _ => None,
    };
    let verdict = match feedback {
        Some(AnswerOutcome::Correct { points, .. }) => Line::from(format!("Correct! +{points}").green().bold()),
        Some(AnswerOutcome::Wrong { .. }) => Line::from("Wrong!".red().bold()),
        Some(AnswerOutcome::TimedOut { .. }) => Line::from("Time's up!".red().bold()),
        None => Line::default(),
    };
    f.render_widget(Paragraph::new(verdict).alignment(Alignment::Center), layout[3]);

    let rows = Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(layout[4]);
    for option in 0..OPTION_COUNT {
        let row = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[option / 2]);
        draw_option(f, session, option, feedback, row[option % 2]);
    }

    let joker = if session.fifty_fifty_available() {
        Span::raw("[j] 50:50 joker")
    } else {
        "[j] 50:50 joker".dark_gray().crossed_out()
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![joker, "   [s] skip question".into()])),
        layout[5],
    );
}

fn draw_option(
    f: &mut Frame,
    session: &QuizSession,
    option: usize,
    feedback: Option<AnswerOutcome>,
    area: Rect,
) {
    let letter = (b'A' + option as u8) as char;
    let hidden = session.is_option_hidden(option);
    let text = match session.current_question() {
        Some(question) if !hidden => question.options[option].as_str(),
        _ => "",
    };

    let style = match feedback {
        Some(outcome) if outcome.correct_index() == option => {
            Style::default().fg(Color::Black).bg(Color::Green)
        }
        Some(outcome) if outcome.chosen() == Some(option) => {
            Style::default().fg(Color::White).bg(Color::Red)
        }
        Some(_) => Style::default().fg(Color::DarkGray),
        None if hidden => Style::default().fg(Color::DarkGray),
        None => Style::default(),
    };

    let paragraph = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .style(style)
        .block(Block::default().borders(Borders::ALL).title(format!("{letter}.")));
    f.render_widget(paragraph, area);
}

fn draw_round_over(f: &mut Frame, summary: &RoundSummary, saved: bool, area: Rect) {
    let saved_line = if saved {
        Line::from(format!("Result saved for {}.", summary.player).green())
    } else {
        Line::from("The result could not be saved.".red())
    };
    let lines = vec![
        Line::from(format!("{} finished!", summary.mode.label()).bold()),
        Line::default(),
        Line::from(format!("Points: {}", summary.score)),
        Line::from(format!(
            "Correct answers: {} / {}",
            summary.correct_answers, summary.total_questions
        )),
        Line::default(),
        saved_line,
    ];
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Round over"));
    f.render_widget(paragraph, centered_rect(area, 50, 8));
}

fn draw_highscores(f: &mut Frame, app: &mut App, area: Rect) {
    let title = if app.only_mine {
        "Highscores (only mine)"
    } else {
        "Highscores"
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    if app.highscores.is_empty() {
        let empty = Paragraph::new("No results yet.")
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let current = app.user.as_ref().map(|u| u.username.to_lowercase());
    let rows: Vec<Row> = app
        .highscores
        .iter()
        .enumerate()
        .map(|(rank, entry)| {
            let row = Row::new(vec![
                format!("{}.", rank + 1),
                entry.player_name.clone(),
                entry.score.to_string(),
                entry.date.format("%Y-%m-%d").to_string(),
            ]);
            if current.as_deref() == Some(entry.player_name.to_lowercase().as_str()) {
                row.style(Style::default().fg(Color::Yellow))
            } else {
                row
            }
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Min(12),
            Constraint::Length(8),
            Constraint::Length(12),
        ],
    )
    .header(
        Row::new(vec!["RANK", "PLAYER", "POINTS", "DATE"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(block)
    .highlight_symbol(">> ");
    f.render_stateful_widget(table, area, &mut app.highscore_state);
}

fn draw_admin(f: &mut Frame, app: &mut App, area: Rect) {
    let layout = Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let items: Vec<ListItem> = app
        .admin
        .questions
        .iter()
        .enumerate()
        .map(|(i, q)| ListItem::new(format!("{}. {}", i + 1, q.text)))
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Questions ({})", app.admin.questions.len())),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol(">> ");
    f.render_stateful_widget(list, layout[0], &mut app.admin.list_state);

    draw_question_form(f, app, layout[1]);

    if let AdminMode::ConfirmDelete(index) = app.admin.mode {
        let popup = centered_rect(area, 40, 5);
        f.render_widget(Clear, popup);
        f.render_widget(
            Paragraph::new(format!("Delete question {}? (y/n)", index + 1))
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("Confirm").red()),
            popup,
        );
    }
}

fn draw_question_form(f: &mut Frame, app: &App, area: Rect) {
    let title = match app.admin.editor.target() {
        EditTarget::Existing(index) => format!("Edit question {}", index + 1),
        EditTarget::New => "New question".to_string(),
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let fields = DraftField::all();
    let mut constraints: Vec<Constraint> = fields.iter().map(|_| Constraint::Length(3)).collect();
    constraints.push(Constraint::Min(0));
    let rows = Layout::vertical(constraints).split(inner);

    let focus = match app.admin.mode {
        AdminMode::Editing { focus } => Some(focus),
        _ => None,
    };

    for (row, field) in fields.into_iter().enumerate() {
        let value = app.admin.editor.draft.field(field);
        let input = Paragraph::new(value)
            .style(if focus == Some(field) {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            })
            .block(Block::default().borders(Borders::ALL).title(field.label()));
        f.render_widget(input, rows[row]);

        if focus == Some(field) {
            f.set_cursor_position(Position::new(
                rows[row].x + 1 + value.chars().count() as u16,
                rows[row].y + 1,
            ));
        }
    }
}

fn draw_credits(f: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from("Credits".bold()),
        Line::default(),
        Line::from("Team"),
        Line::from("Istiqlal Momand"),
        Line::from("Helal Storany"),
        Line::default(),
        Line::from("Software Engineering 1".dark_gray()),
        Line::from("University of Potsdam".dark_gray()),
    ];
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(paragraph, centered_rect(area, 40, 10));
}

/// A `width` x `height` box in the middle of `area`, clipped to it.
fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
