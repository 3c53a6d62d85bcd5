use rand::Rng;
use rand::seq::SliceRandom;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::config::QuizConfig;
use crate::error::QuizError;
use crate::game_logic::{GameMode, calculate_score};
use crate::model::{OPTION_COUNT, Question, User};

/// Number of wrong options the 50:50 joker removes.
const FIFTY_FIFTY_REMOVES: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSettings {
    pub questions_per_round: usize,
    pub time_per_question: Duration,
    pub feedback_delay: Duration,
}

impl Default for RoundSettings {
    fn default() -> Self {
        Self {
            questions_per_round: 10,
            time_per_question: Duration::from_secs(20),
            feedback_delay: Duration::from_millis(1500),
        }
    }
}

impl From<&QuizConfig> for RoundSettings {
    fn from(config: &QuizConfig) -> Self {
        Self {
            questions_per_round: config.questions_per_round,
            time_per_question: config.time_per_question(),
            feedback_delay: config.feedback_delay(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct { chosen: usize, points: u32 },
    Wrong { chosen: usize, correct: usize },
    TimedOut { correct: usize },
}

impl AnswerOutcome {
    pub fn correct_index(&self) -> usize {
        match *self {
            AnswerOutcome::Correct { chosen, .. } => chosen,
            AnswerOutcome::Wrong { correct, .. } | AnswerOutcome::TimedOut { correct } => correct,
        }
    }

    pub fn chosen(&self) -> Option<usize> {
        match *self {
            AnswerOutcome::Correct { chosen, .. } | AnswerOutcome::Wrong { chosen, .. } => {
                Some(chosen)
            }
            AnswerOutcome::TimedOut { .. } => None,
        }
    }

    pub fn points(&self) -> u32 {
        match *self {
            AnswerOutcome::Correct { points, .. } => points,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    Answering,
    /// The answer is revealed; input is ignored until `until`.
    Feedback {
        outcome: AnswerOutcome,
        until: Instant,
    },
    Finished,
}

/// What a call to [`QuizSession::tick`] or [`QuizSession::skip`] changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStep {
    Unchanged,
    TimedOut(AnswerOutcome),
    NextQuestion,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSummary {
    pub player: String,
    pub mode: GameMode,
    pub score: u32,
    pub total_questions: usize,
    pub correct_answers: usize,
}

/// One round of the quiz for one player.
///
/// Time is passed in explicitly so the countdown and the feedback pause are
/// driven by whoever owns the session (the UI loop, or a test).
#[derive(Debug)]
pub struct QuizSession {
    id: Uuid,
    mode: GameMode,
    settings: RoundSettings,
    player: User,
    questions: Vec<Question>,
    index: usize,
    phase: QuizPhase,
    question_started_at: Instant,
    fifty_fifty_used: bool,
    hidden: [bool; OPTION_COUNT],
    correct_answers: usize,
}

impl QuizSession {
    /// Shuffles `pool` and starts a round over the first
    /// `questions_per_round` playable questions.
    pub fn start<R: Rng + ?Sized>(
        player: User,
        mode: GameMode,
        settings: RoundSettings,
        pool: Vec<Question>,
        rng: &mut R,
        now: Instant,
    ) -> Result<Self, QuizError> {
        let pool_size = pool.len();
        let mut questions: Vec<Question> = pool
            .into_iter()
            .filter(|question| {
                if !question.is_playable() {
                    tracing::warn!(
                        question.text = %question.text,
                        question.correct_index = question.correct_index,
                        "Skipping question with out-of-range correct index"
                    );
                }
                question.is_playable()
            })
            .collect();

        questions.shuffle(rng);
        questions.truncate(settings.questions_per_round);

        if questions.is_empty() {
            tracing::warn!(pool.size = pool_size, "No questions available to start a round");
            return Err(QuizError::NoQuestions);
        }

        let id = Uuid::new_v4();
        let mut player = player;
        player.current_score = 0;

        tracing::info!(
            session.id = %id,
            player = %player.username,
            mode = ?mode,
            questions.count = questions.len(),
            "Quiz round started"
        );

        Ok(Self {
            id,
            mode,
            settings,
            player,
            questions,
            index: 0,
            phase: QuizPhase::Answering,
            question_started_at: now,
            fifty_fifty_used: false,
            hidden: [false; OPTION_COUNT],
            correct_answers: 0,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn player(&self) -> &User {
        &self.player
    }

    pub fn score(&self) -> u32 {
        self.player.current_score
    }

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    /// The question on screen; `None` once the round is over.
    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            QuizPhase::Finished => None,
            _ => self.questions.get(self.index),
        }
    }

    /// 1-based position of the current question.
    pub fn question_number(&self) -> usize {
        self.index + 1
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn is_accepting_answers(&self) -> bool {
        self.phase == QuizPhase::Answering
    }

    pub fn is_finished(&self) -> bool {
        self.phase == QuizPhase::Finished
    }

    pub fn is_option_hidden(&self, option: usize) -> bool {
        self.hidden.get(option).copied().unwrap_or(false)
    }

    pub fn fifty_fifty_available(&self) -> bool {
        !self.fifty_fifty_used
    }

    fn remaining(&self, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.question_started_at);
        self.settings.time_per_question.saturating_sub(elapsed)
    }

    /// Whole seconds left on the countdown, rounded down. This is what an
    /// answer is scored with. `None` outside time mode.
    pub fn seconds_left(&self, now: Instant) -> Option<u32> {
        if !self.mode.is_timed() {
            return None;
        }
        Some(saturating_secs(self.frozen_remaining(now)))
    }

    /// Seconds left rounded up, for display.
    pub fn display_seconds_left(&self, now: Instant) -> Option<u32> {
        if !self.mode.is_timed() {
            return None;
        }
        let remaining = self.frozen_remaining(now);
        let whole = saturating_secs(remaining);
        Some(if remaining.subsec_nanos() > 0 {
            whole.saturating_add(1)
        } else {
            whole
        })
    }

    /// Fraction of the countdown left, in `0.0..=1.0`.
    pub fn time_fraction_left(&self, now: Instant) -> Option<f64> {
        if !self.mode.is_timed() {
            return None;
        }
        let total = self.settings.time_per_question.as_secs_f64();
        if total <= 0.0 {
            return Some(0.0);
        }
        Some((self.frozen_remaining(now).as_secs_f64() / total).clamp(0.0, 1.0))
    }

    /// The countdown stops while an answer is being revealed.
    fn frozen_remaining(&self, now: Instant) -> Duration {
        match self.phase {
            QuizPhase::Answering => self.remaining(now),
            QuizPhase::Feedback { outcome, until } => match outcome {
                AnswerOutcome::TimedOut { .. } => Duration::ZERO,
                _ => self.remaining(until.checked_sub(self.settings.feedback_delay).unwrap_or(until)),
            },
            QuizPhase::Finished => Duration::ZERO,
        }
    }

    pub fn answer(&mut self, chosen: usize, now: Instant) -> Result<AnswerOutcome, QuizError> {
        if !self.is_accepting_answers() {
            return Err(QuizError::NotAcceptingAnswers);
        }
        if let SessionStep::TimedOut(outcome) = self.tick(now) {
            return Ok(outcome);
        }
        if chosen >= OPTION_COUNT || self.hidden[chosen] {
            return Err(QuizError::InvalidOption(chosen));
        }

        let question = &self.questions[self.index];
        let is_correct = question.is_correct(chosen);
        let seconds_left = self.seconds_left(now).unwrap_or(0);
        let points = calculate_score(is_correct, seconds_left);

        let outcome = if is_correct {
            AnswerOutcome::Correct { chosen, points }
        } else {
            AnswerOutcome::Wrong {
                chosen,
                correct: question.correct_index,
            }
        };

        if is_correct {
            self.correct_answers += 1;
        }
        self.player.add_points(points);
        self.phase = QuizPhase::Feedback {
            outcome,
            until: now + self.settings.feedback_delay,
        };

        tracing::debug!(
            session.id = %self.id,
            question.number = self.question_number(),
            chosen,
            seconds_left,
            points,
            score = self.score(),
            "Answer submitted"
        );

        Ok(outcome)
    }

    /// Hides the first two wrong options of the current question. Once per
    /// round.
    pub fn use_fifty_fifty(&mut self) -> Result<[usize; FIFTY_FIFTY_REMOVES], QuizError> {
        if !self.is_accepting_answers() {
            return Err(QuizError::NotAcceptingAnswers);
        }
        if self.fifty_fifty_used {
            return Err(QuizError::JokerAlreadyUsed);
        }

        let correct = self.questions[self.index].correct_index;
        let mut removed = [0; FIFTY_FIFTY_REMOVES];
        let wrong_options = (0..OPTION_COUNT).filter(|&option| option != correct);
        for (slot, option) in removed.iter_mut().zip(wrong_options) {
            *slot = option;
            self.hidden[option] = true;
        }
        self.fifty_fifty_used = true;

        tracing::debug!(session.id = %self.id, removed = ?removed, "50:50 joker used");
        Ok(removed)
    }

    /// Moves on without answering. No points.
    pub fn skip(&mut self, now: Instant) -> Result<SessionStep, QuizError> {
        if !self.is_accepting_answers() {
            return Err(QuizError::NotAcceptingAnswers);
        }
        tracing::debug!(session.id = %self.id, question.number = self.question_number(), "Question skipped");
        Ok(self.advance(now))
    }

    /// Expires the countdown and ends the feedback pause when their time
    /// has come.
    pub fn tick(&mut self, now: Instant) -> SessionStep {
        match self.phase {
            QuizPhase::Answering if self.mode.is_timed() && self.remaining(now).is_zero() => {
                let outcome = AnswerOutcome::TimedOut {
                    correct: self.questions[self.index].correct_index,
                };
                self.phase = QuizPhase::Feedback {
                    outcome,
                    until: now + self.settings.feedback_delay,
                };
                tracing::debug!(
                    session.id = %self.id,
                    question.number = self.question_number(),
                    "Time expired"
                );
                SessionStep::TimedOut(outcome)
            }
            QuizPhase::Feedback { until, .. } if now >= until => self.advance(now),
            _ => SessionStep::Unchanged,
        }
    }

    fn advance(&mut self, now: Instant) -> SessionStep {
        if self.index + 1 >= self.questions.len() {
            self.phase = QuizPhase::Finished;
            tracing::info!(
                session.id = %self.id,
                player = %self.player.username,
                score = self.score(),
                correct = self.correct_answers,
                "Quiz round finished"
            );
            return SessionStep::Finished;
        }

        self.index += 1;
        self.hidden = [false; OPTION_COUNT];
        self.phase = QuizPhase::Answering;
        self.question_started_at = now;
        SessionStep::NextQuestion
    }

    pub fn summary(&self) -> Option<RoundSummary> {
        if !self.is_finished() {
            return None;
        }
        Some(RoundSummary {
            player: self.player.username.clone(),
            mode: self.mode,
            score: self.score(),
            total_questions: self.questions.len(),
            correct_answers: self.correct_answers,
        })
    }
}

fn saturating_secs(duration: Duration) -> u32 {
    u32::try_from(duration.as_secs()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn question(n: usize, correct_index: usize) -> Question {
        Question::new(
            format!("Question {n}"),
            [
                format!("{n}a"),
                format!("{n}b"),
                format!("{n}c"),
                format!("{n}d"),
            ],
            correct_index,
        )
    }

    fn pool(size: usize) -> Vec<Question> {
        (0..size).map(|n| question(n, n % OPTION_COUNT)).collect()
    }

    fn settings() -> RoundSettings {
        RoundSettings {
            questions_per_round: 10,
            time_per_question: Duration::from_secs(20),
            feedback_delay: Duration::from_millis(1500),
        }
    }

    fn start(mode: GameMode, pool: Vec<Question>, now: Instant) -> QuizSession {
        let mut rng = StdRng::seed_from_u64(7);
        QuizSession::start(User::new("ada"), mode, settings(), pool, &mut rng, now).unwrap()
    }

    fn correct_of(session: &QuizSession) -> usize {
        session.current_question().unwrap().correct_index
    }

    fn wrong_of(session: &QuizSession) -> usize {
        (correct_of(session) + 1) % OPTION_COUNT
    }

    #[test]
    fn round_takes_at_most_ten_distinct_questions() {
        let now = Instant::now();
        let session = start(GameMode::Classic, pool(25), now);

        assert_eq!(session.total_questions(), 10);
        assert_eq!(session.question_number(), 1);
        assert_eq!(session.score(), 0);

        let mut texts: Vec<&str> = session.questions.iter().map(|q| q.text.as_str()).collect();
        texts.sort();
        texts.dedup();
        assert_eq!(texts.len(), 10);
    }

    #[test]
    fn small_pool_uses_every_question() {
        let session = start(GameMode::Classic, pool(3), Instant::now());
        assert_eq!(session.total_questions(), 3);
    }

    #[test]
    fn empty_or_unplayable_pool_cannot_start() {
        let mut rng = StdRng::seed_from_u64(1);
        let now = Instant::now();

        let empty = QuizSession::start(
            User::new("ada"),
            GameMode::Classic,
            settings(),
            Vec::new(),
            &mut rng,
            now,
        );
        assert_eq!(empty.unwrap_err(), QuizError::NoQuestions);

        let broken = QuizSession::start(
            User::new("ada"),
            GameMode::Timed,
            settings(),
            vec![question(0, 99)],
            &mut rng,
            now,
        );
        assert_eq!(broken.unwrap_err(), QuizError::NoQuestions);
    }

    #[test]
    fn classic_correct_answer_is_worth_base_points() {
        let now = Instant::now();
        let mut session = start(GameMode::Classic, pool(5), now);
        let correct = correct_of(&session);

        let outcome = session.answer(correct, now + Duration::from_secs(60)).unwrap();

        assert_eq!(outcome, AnswerOutcome::Correct { chosen: correct, points: 10 });
        assert_eq!(session.score(), 10);
        assert_eq!(session.seconds_left(now), None);
    }

    #[test]
    fn timed_answers_earn_the_time_bonus() {
        let now = Instant::now();
        let mut session = start(GameMode::Timed, pool(5), now);

        let correct = correct_of(&session);
        let outcome = session.answer(correct, now + Duration::from_secs(3)).unwrap();
        assert_eq!(outcome.points(), 15);

        let next = now + Duration::from_secs(5);
        assert_eq!(session.tick(next), SessionStep::NextQuestion);

        let correct = correct_of(&session);
        let outcome = session
            .answer(correct, next + Duration::from_millis(12_500))
            .unwrap();
        assert_eq!(outcome.points(), 11);
        assert_eq!(session.score(), 26);
    }

    #[test]
    fn wrong_answer_reveals_the_correct_one() {
        let now = Instant::now();
        let mut session = start(GameMode::Timed, pool(5), now);
        let correct = correct_of(&session);
        let wrong = wrong_of(&session);

        let outcome = session.answer(wrong, now).unwrap();

        assert_eq!(outcome, AnswerOutcome::Wrong { chosen: wrong, correct });
        assert_eq!(outcome.correct_index(), correct);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn input_is_ignored_during_feedback() {
        let now = Instant::now();
        let mut session = start(GameMode::Classic, pool(5), now);
        let correct = correct_of(&session);
        session.answer(correct, now).unwrap();

        assert_eq!(session.answer(correct, now), Err(QuizError::NotAcceptingAnswers));
        assert_eq!(session.skip(now), Err(QuizError::NotAcceptingAnswers));
        assert_eq!(session.use_fifty_fifty(), Err(QuizError::NotAcceptingAnswers));
        assert_eq!(session.score(), 10);
    }

    #[test]
    fn feedback_lasts_the_configured_delay() {
        let now = Instant::now();
        let mut session = start(GameMode::Classic, pool(5), now);
        session.answer(0, now).unwrap();

        assert_eq!(session.tick(now + Duration::from_millis(1499)), SessionStep::Unchanged);
        assert_eq!(session.question_number(), 1);
        assert_eq!(session.tick(now + Duration::from_millis(1500)), SessionStep::NextQuestion);
        assert_eq!(session.question_number(), 2);
        assert!(session.is_accepting_answers());
    }

    #[test]
    fn countdown_expiry_times_the_question_out() {
        let now = Instant::now();
        let mut session = start(GameMode::Timed, pool(5), now);
        let correct = correct_of(&session);

        assert_eq!(session.tick(now + Duration::from_secs(19)), SessionStep::Unchanged);

        let expired = now + Duration::from_secs(20);
        assert_eq!(
            session.tick(expired),
            SessionStep::TimedOut(AnswerOutcome::TimedOut { correct })
        );
        assert_eq!(session.score(), 0);
        assert_eq!(session.display_seconds_left(expired), Some(0));
        assert_eq!(session.answer(correct, expired), Err(QuizError::NotAcceptingAnswers));

        let next = expired + Duration::from_millis(1500);
        assert_eq!(session.tick(next), SessionStep::NextQuestion);
        assert_eq!(session.display_seconds_left(next), Some(20));
    }

    #[test]
    fn late_answer_counts_as_timeout() {
        let now = Instant::now();
        let mut session = start(GameMode::Timed, pool(5), now);
        let correct = correct_of(&session);

        let outcome = session.answer(correct, now + Duration::from_secs(25)).unwrap();
        assert_eq!(outcome, AnswerOutcome::TimedOut { correct });
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn classic_mode_never_times_out() {
        let now = Instant::now();
        let mut session = start(GameMode::Classic, pool(5), now);

        assert_eq!(session.tick(now + Duration::from_secs(3600)), SessionStep::Unchanged);
        assert!(session.is_accepting_answers());
    }

    #[test]
    fn display_rounds_up_and_scoring_rounds_down() {
        let now = Instant::now();
        let session = start(GameMode::Timed, pool(5), now);
        let at = now + Duration::from_millis(9_200);

        assert_eq!(session.display_seconds_left(at), Some(11));
        assert_eq!(session.seconds_left(at), Some(10));
        let fraction = session.time_fraction_left(at).unwrap();
        assert!((fraction - 0.54).abs() < 1e-9);
    }

    #[test]
    fn countdown_freezes_while_the_answer_is_shown() {
        let now = Instant::now();
        let mut session = start(GameMode::Timed, pool(5), now);
        let answered_at = now + Duration::from_secs(4);
        session.answer(correct_of(&session), answered_at).unwrap();

        let later = answered_at + Duration::from_secs(1);
        assert_eq!(session.display_seconds_left(later), Some(16));
    }

    #[test]
    fn fifty_fifty_hides_two_wrong_options_once() {
        let now = Instant::now();
        let mut session = start(GameMode::Classic, pool(5), now);
        let correct = correct_of(&session);

        let removed = session.use_fifty_fifty().unwrap();

        assert!(!removed.contains(&correct));
        assert_ne!(removed[0], removed[1]);
        let visible = (0..OPTION_COUNT).filter(|&i| !session.is_option_hidden(i)).count();
        assert_eq!(visible, 2);
        assert!(!session.is_option_hidden(correct));
        assert_eq!(session.answer(removed[0], now), Err(QuizError::InvalidOption(removed[0])));
        assert_eq!(session.use_fifty_fifty(), Err(QuizError::JokerAlreadyUsed));

        session.answer(correct, now).unwrap();
        session.tick(now + Duration::from_secs(2));
        assert!((0..OPTION_COUNT).all(|i| !session.is_option_hidden(i)));
        assert!(!session.fifty_fifty_available());
    }

    #[test]
    fn fifty_fifty_removes_options_in_order() {
        let now = Instant::now();
        let mut session = start(GameMode::Classic, vec![question(0, 1)], now);

        assert_eq!(session.use_fifty_fifty().unwrap(), [0, 2]);
    }

    #[test]
    fn out_of_range_option_is_rejected() {
        let now = Instant::now();
        let mut session = start(GameMode::Classic, pool(5), now);

        assert_eq!(session.answer(4, now), Err(QuizError::InvalidOption(4)));
        assert!(session.is_accepting_answers());
    }

    #[test]
    fn skip_moves_on_without_points() {
        let now = Instant::now();
        let mut session = start(GameMode::Timed, pool(3), now);

        assert_eq!(session.skip(now), Ok(SessionStep::NextQuestion));
        assert_eq!(session.question_number(), 2);
        assert_eq!(session.score(), 0);

        let later = now + Duration::from_secs(8);
        session.skip(later).unwrap();
        assert_eq!(session.display_seconds_left(later), Some(20));
    }

    #[test]
    fn skipping_the_last_question_ends_the_round() {
        let now = Instant::now();
        let mut session = start(GameMode::Classic, pool(1), now);

        assert_eq!(session.skip(now), Ok(SessionStep::Finished));
        assert!(session.is_finished());
        assert!(session.current_question().is_none());
    }

    #[test]
    fn full_round_produces_a_summary() {
        let mut now = Instant::now();
        let mut session = start(GameMode::Classic, pool(4), now);
        assert!(session.summary().is_none());

        let mut steps = Vec::new();
        while !session.is_finished() {
            let choice = if session.question_number() % 2 == 0 {
                wrong_of(&session)
            } else {
                correct_of(&session)
            };
            session.answer(choice, now).unwrap();
            now += Duration::from_secs(2);
            steps.push(session.tick(now));
        }

        assert_eq!(steps.last(), Some(&SessionStep::Finished));
        let summary = session.summary().unwrap();
        assert_eq!(
            summary,
            RoundSummary {
                player: "ada".to_string(),
                mode: GameMode::Classic,
                score: 20,
                total_questions: 4,
                correct_answers: 2,
            }
        );
    }

    #[test]
    fn very_long_countdown_still_earns_the_fast_bonus() {
        let now = Instant::now();
        let long = RoundSettings {
            time_per_question: Duration::from_secs((1 << 32) + 5),
            ..settings()
        };
        let mut rng = StdRng::seed_from_u64(7);
        let mut session =
            QuizSession::start(User::new("ada"), GameMode::Timed, long, pool(3), &mut rng, now)
                .unwrap();

        assert_eq!(session.seconds_left(now), Some(u32::MAX));
        assert_eq!(session.display_seconds_left(now), Some(u32::MAX));

        let outcome = session.answer(correct_of(&session), now).unwrap();
        assert_eq!(outcome.points(), 15);
    }
}
