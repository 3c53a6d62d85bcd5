use thiserror::Error;

use crate::db::DataManager;
use crate::error::Result as AppResult;
use crate::model::{OPTION_COUNT, Question};

/// Index of the correct answer in questions saved from the editor.
pub const DRAFT_CORRECT_INDEX: usize = 0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("Please enter a question.")]
    MissingText,
    #[error("Please fill in all answers.")]
    MissingAnswers,
}

/// The editor form. The correct answer has its own field; saving puts it
/// in option A.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionDraft {
    pub text: String,
    pub correct: String,
    pub wrong: [String; OPTION_COUNT - 1],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Text,
    Correct,
    Wrong(usize),
}

impl DraftField {
    pub fn all() -> Vec<Self> {
        vec![
            DraftField::Text,
            DraftField::Correct,
            DraftField::Wrong(0),
            DraftField::Wrong(1),
            DraftField::Wrong(2),
        ]
    }

    pub fn next(&self) -> Self {
        match self {
            DraftField::Text => DraftField::Correct,
            DraftField::Correct => DraftField::Wrong(0),
            DraftField::Wrong(i) if *i + 1 < OPTION_COUNT - 1 => DraftField::Wrong(i + 1),
            DraftField::Wrong(_) => DraftField::Text,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            DraftField::Text => DraftField::Wrong(OPTION_COUNT - 2),
            DraftField::Correct => DraftField::Text,
            DraftField::Wrong(0) => DraftField::Correct,
            DraftField::Wrong(i) => DraftField::Wrong(i - 1),
        }
    }

    pub fn is_last(&self) -> bool {
        *self == DraftField::Wrong(OPTION_COUNT - 2)
    }

    pub fn label(&self) -> String {
        match self {
            DraftField::Text => "Question".to_string(),
            DraftField::Correct => "Answer A (correct)".to_string(),
            DraftField::Wrong(i) => format!("Answer {}", (b'B' + *i as u8) as char),
        }
    }
}

impl QuestionDraft {
    /// Fills the form from a stored question: its correct option goes into
    /// the first field, the others follow in their original order.
    pub fn from_question(question: &Question) -> Self {
        let correct_index = if question.is_playable() {
            question.correct_index
        } else {
            DRAFT_CORRECT_INDEX
        };

        let mut wrong: [String; OPTION_COUNT - 1] = Default::default();
        let others = question
            .options
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != correct_index)
            .map(|(_, option)| option.clone());
        for (slot, option) in wrong.iter_mut().zip(others) {
            *slot = option;
        }

        Self {
            text: question.text.clone(),
            correct: question.options[correct_index].clone(),
            wrong,
        }
    }

    pub fn field(&self, field: DraftField) -> &str {
        match field {
            DraftField::Text => &self.text,
            DraftField::Correct => &self.correct,
            DraftField::Wrong(i) => &self.wrong[i],
        }
    }

    pub fn field_mut(&mut self, field: DraftField) -> &mut String {
        match field {
            DraftField::Text => &mut self.text,
            DraftField::Correct => &mut self.correct,
            DraftField::Wrong(i) => &mut self.wrong[i],
        }
    }

    pub fn to_question(&self) -> Result<Question, DraftError> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(DraftError::MissingText);
        }
        if self.correct.trim().is_empty() || self.wrong.iter().any(|w| w.trim().is_empty()) {
            return Err(DraftError::MissingAnswers);
        }

        let options = [
            self.correct.trim().to_string(),
            self.wrong[0].trim().to_string(),
            self.wrong[1].trim().to_string(),
            self.wrong[2].trim().to_string(),
        ];
        Ok(Question::new(text, options, DRAFT_CORRECT_INDEX))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditTarget {
    #[default]
    New,
    Existing(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Added,
    Updated(usize),
}

/// Form state of the question admin: a draft plus which catalogue entry it
/// will overwrite, if any.
#[derive(Debug, Default)]
pub struct QuestionEditor {
    pub draft: QuestionDraft,
    target: EditTarget,
}

impl QuestionEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(&self) -> EditTarget {
        self.target
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.target, EditTarget::Existing(_))
    }

    pub fn edit(&mut self, index: usize, question: &Question) {
        self.draft = QuestionDraft::from_question(question);
        self.target = EditTarget::Existing(index);
    }

    pub fn reset(&mut self) {
        self.draft = QuestionDraft::default();
        self.target = EditTarget::New;
    }

    /// Validates the draft and writes it. The form is cleared on success
    /// and kept as-is on failure.
    pub async fn save(&mut self, data: &DataManager) -> AppResult<SaveOutcome> {
        let question = self.draft.to_question()?;

        let outcome = match self.target {
            EditTarget::New => {
                data.add_question(question).await?;
                SaveOutcome::Added
            }
            EditTarget::Existing(index) => {
                data.update_question(index, question).await?;
                SaveOutcome::Updated(index)
            }
        };

        self.reset();
        Ok(outcome)
    }

    /// Deletes a catalogue entry. Deleting the entry being edited cancels
    /// the edit; editing a later entry follows it to its new index.
    pub async fn delete(&mut self, data: &DataManager, index: usize) -> AppResult<Question> {
        let removed = data.delete_question(index).await?;

        match self.target {
            EditTarget::Existing(editing) if editing == index => self.reset(),
            EditTarget::Existing(editing) if editing > index => {
                self.target = EditTarget::Existing(editing - 1);
            }
            _ => {}
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::error::AppError;
    use uuid::Uuid;

    fn stored(text: &str, options: [&str; OPTION_COUNT], correct_index: usize) -> Question {
        Question::new(text, options.map(str::to_string), correct_index)
    }

    fn filled_draft(text: &str) -> QuestionDraft {
        QuestionDraft {
            text: text.to_string(),
            correct: "right".to_string(),
            wrong: ["w1".to_string(), "w2".to_string(), "w3".to_string()],
        }
    }

    fn manager() -> DataManager {
        let dir = std::env::temp_dir().join(format!("quizapp-admin-{}", Uuid::new_v4()));
        DataManager::new(StorageConfig {
            questions_path: dir.join("questions.json"),
            highscores_path: dir.join("highscores.json"),
        })
    }

    #[test]
    fn saved_draft_puts_the_correct_answer_first() {
        let mut draft = filled_draft("  What?  ");
        draft.correct = " right ".to_string();

        let question = draft.to_question().unwrap();

        assert_eq!(question.text, "What?");
        assert_eq!(question.options, ["right", "w1", "w2", "w3"].map(str::to_string));
        assert_eq!(question.correct_index, 0);
    }

    #[test]
    fn every_field_is_required() {
        let mut draft = filled_draft(" ");
        assert_eq!(draft.to_question(), Err(DraftError::MissingText));

        draft.text = "What?".to_string();
        draft.wrong[2] = String::new();
        assert_eq!(draft.to_question(), Err(DraftError::MissingAnswers));

        draft.wrong[2] = "w3".to_string();
        draft.correct = "  ".to_string();
        assert_eq!(draft.to_question(), Err(DraftError::MissingAnswers));
    }

    #[test]
    fn editing_moves_the_correct_option_into_the_first_field() {
        let question = stored("Capital?", ["Oslo", "Bern", "Rome", "Lima"], 2);

        let draft = QuestionDraft::from_question(&question);

        assert_eq!(draft.correct, "Rome");
        assert_eq!(draft.wrong, ["Oslo", "Bern", "Lima"].map(str::to_string));
        assert_eq!(draft.to_question().unwrap().correct_option(), Some("Rome"));
    }

    #[test]
    fn broken_question_is_edited_as_if_a_were_correct() {
        let question = stored("Broken", ["a", "b", "c", "d"], 42);
        let draft = QuestionDraft::from_question(&question);

        assert_eq!(draft.correct, "a");
        assert_eq!(draft.wrong, ["b", "c", "d"].map(str::to_string));
    }

    #[test]
    fn focus_cycles_through_all_fields() {
        let mut field = DraftField::Text;
        let mut visited = vec![field];
        for _ in 0..4 {
            field = field.next();
            visited.push(field);
        }

        assert_eq!(visited, DraftField::all());
        assert!(field.is_last());
        assert_eq!(field.next(), DraftField::Text);
        assert_eq!(DraftField::Text.prev(), field);
        assert_eq!(DraftField::Wrong(0).prev(), DraftField::Correct);
        assert_eq!(DraftField::Wrong(1).label(), "Answer C");
    }

    #[tokio::test]
    async fn new_draft_is_appended_and_form_cleared() {
        let data = manager();
        let mut editor = QuestionEditor::new();
        editor.draft = filled_draft("New?");

        let outcome = editor.save(&data).await.unwrap();

        assert_eq!(outcome, SaveOutcome::Added);
        assert_eq!(editor.draft, QuestionDraft::default());
        assert_eq!(data.load_questions().await.unwrap()[0].text, "New?");
    }

    #[tokio::test]
    async fn edit_overwrites_the_same_index() {
        let data = manager();
        data.add_question(stored("One", ["a", "b", "c", "d"], 1)).await.unwrap();
        data.add_question(stored("Two", ["a", "b", "c", "d"], 3)).await.unwrap();

        let mut editor = QuestionEditor::new();
        let questions = data.load_questions().await.unwrap();
        editor.edit(1, &questions[1]);
        editor.draft.text = "Two, edited".to_string();

        assert_eq!(editor.save(&data).await.unwrap(), SaveOutcome::Updated(1));
        assert!(!editor.is_editing());

        let questions = data.load_questions().await.unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[1].text, "Two, edited");
        assert_eq!(questions[1].correct_index, 0);
        assert_eq!(questions[1].options[0], "d");
    }

    #[tokio::test]
    async fn invalid_draft_keeps_the_form() {
        let data = manager();
        let mut editor = QuestionEditor::new();
        editor.draft.text = "Half done".to_string();

        let err = editor.save(&data).await.unwrap_err();

        assert!(matches!(err, AppError::Draft(DraftError::MissingAnswers)));
        assert_eq!(editor.draft.text, "Half done");
        assert!(data.load_questions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_around_the_edited_question() {
        let data = manager();
        for text in ["One", "Two", "Three"] {
            data.add_question(stored(text, ["a", "b", "c", "d"], 0)).await.unwrap();
        }
        let questions = data.load_questions().await.unwrap();

        let mut editor = QuestionEditor::new();
        editor.edit(2, &questions[2]);
        editor.delete(&data, 0).await.unwrap();
        assert_eq!(editor.target(), EditTarget::Existing(1));

        editor.delete(&data, 1).await.unwrap();
        assert_eq!(editor.target(), EditTarget::New);
        assert_eq!(editor.draft, QuestionDraft::default());

        let remaining = data.load_questions().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].text, "Two");
    }
}
