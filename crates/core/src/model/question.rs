use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("multiple-choice question {0} needs at least one choice")]
    MissingChoices(QuestionId),

    #[error("question {id} has type {actual} but was placed in the {expected} group")]
    TypeMismatch {
        id: QuestionId,
        expected: QuestionType,
        actual: QuestionType,
    },

    #[error("duplicate question id: {0}")]
    DuplicateId(QuestionId),

    #[error("unknown question type: {0}")]
    UnknownType(String),
}

//
// ─── QUESTION TYPE ────────────────────────────────────────────────────────────
//

/// Response type of a question. Each type is rendered by its own section page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    Mcq,
    ShortAnswer,
    Audio,
    Video,
}

impl QuestionType {
    pub const ALL: [QuestionType; 4] = [
        QuestionType::Mcq,
        QuestionType::ShortAnswer,
        QuestionType::Audio,
        QuestionType::Video,
    ];

    /// Wire tag (`MCQ`, `SHORT_ANSWER`, `AUDIO`, `VIDEO`).
    #[must_use]
    pub fn as_tag(self) -> &'static str {
        match self {
            QuestionType::Mcq => "MCQ",
            QuestionType::ShortAnswer => "SHORT_ANSWER",
            QuestionType::Audio => "AUDIO",
            QuestionType::Video => "VIDEO",
        }
    }

    /// URL path segment of the section page.
    #[must_use]
    pub fn as_slug(self) -> &'static str {
        match self {
            QuestionType::Mcq => "mcq",
            QuestionType::ShortAnswer => "short-answer",
            QuestionType::Audio => "audio",
            QuestionType::Video => "video",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            QuestionType::Mcq => "Multiple choice",
            QuestionType::ShortAnswer => "Short answer",
            QuestionType::Audio => "Audio response",
            QuestionType::Video => "Video response",
        }
    }

    /// Audio and video answers are uploaded media rather than typed text.
    #[must_use]
    pub fn is_media(self) -> bool {
        matches!(self, QuestionType::Audio | QuestionType::Video)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_slug())
    }
}

impl FromStr for QuestionType {
    type Err = QuestionError;

    /// Accepts both the wire tag and the route slug.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        QuestionType::ALL
            .into_iter()
            .find(|ty| ty.as_tag() == trimmed || ty.as_slug() == trimmed)
            .ok_or_else(|| QuestionError::UnknownType(trimmed.to_string()))
    }
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// A single question. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    question_type: QuestionType,
    prompt: String,
    order: i64,
    choices: Vec<String>,
}

impl Question {
    /// Build a question without choices.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyPrompt` for a blank prompt.
    pub fn new(
        id: QuestionId,
        question_type: QuestionType,
        prompt: impl Into<String>,
        order: i64,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        Ok(Self {
            id,
            question_type,
            prompt,
            order,
            choices: Vec::new(),
        })
    }

    /// Build a multiple-choice question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyPrompt` for a blank prompt and
    /// `QuestionError::MissingChoices` when no non-blank choice is given.
    pub fn mcq<I, S>(
        id: QuestionId,
        prompt: impl Into<String>,
        order: i64,
        choices: I,
    ) -> Result<Self, QuestionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut question = Self::new(id, QuestionType::Mcq, prompt, order)?;
        question.choices = choices
            .into_iter()
            .map(Into::into)
            .filter(|choice: &String| !choice.trim().is_empty())
            .collect();
        if question.choices.is_empty() {
            return Err(QuestionError::MissingChoices(question.id));
        }
        Ok(question)
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn question_type(&self) -> QuestionType {
        self.question_type
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn order(&self) -> i64 {
        self.order
    }

    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }
}

//
// ─── QUESTION GROUPS ──────────────────────────────────────────────────────────
//

/// All questions of one type, in load order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionGroup {
    question_type: QuestionType,
    questions: Vec<Question>,
}

impl QuestionGroup {
    #[must_use]
    pub fn question_type(&self) -> QuestionType {
        self.question_type
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }
}

/// Mapping from question type to its questions.
///
/// Group declaration order is preserved; the navigator uses it to break ties
/// between questions sharing an `order` value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionGroups {
    groups: Vec<QuestionGroup>,
}

impl QuestionGroups {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Group loose questions by type, in order of first appearance.
    #[must_use]
    pub fn from_questions(questions: impl IntoIterator<Item = Question>) -> Self {
        let mut groups = Self::new();
        for question in questions {
            groups.push_unchecked(question);
        }
        groups
    }

    /// Append questions to the group for `question_type`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::TypeMismatch` if a question's type differs from
    /// the group it is placed in. Nothing is inserted in that case.
    pub fn insert_group(
        &mut self,
        question_type: QuestionType,
        questions: Vec<Question>,
    ) -> Result<(), QuestionError> {
        if let Some(bad) = questions
            .iter()
            .find(|q| q.question_type() != question_type)
        {
            return Err(QuestionError::TypeMismatch {
                id: bad.id().clone(),
                expected: question_type,
                actual: bad.question_type(),
            });
        }
        for question in questions {
            self.push_unchecked(question);
        }
        Ok(())
    }

    fn push_unchecked(&mut self, question: Question) {
        let ty = question.question_type();
        match self.groups.iter_mut().find(|g| g.question_type == ty) {
            Some(group) => group.questions.push(question),
            None => self.groups.push(QuestionGroup {
                question_type: ty,
                questions: vec![question],
            }),
        }
    }

    /// Reject duplicate question ids across all groups.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::DuplicateId` with the first repeated id.
    pub fn ensure_unique_ids(&self) -> Result<(), QuestionError> {
        let mut seen = HashSet::new();
        for question in self.iter() {
            if !seen.insert(question.id()) {
                return Err(QuestionError::DuplicateId(question.id().clone()));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn groups(&self) -> &[QuestionGroup] {
        &self.groups
    }

    /// Questions of one section, empty if the section has none.
    #[must_use]
    pub fn section(&self, question_type: QuestionType) -> &[Question] {
        self.groups
            .iter()
            .find(|g| g.question_type == question_type)
            .map_or(&[], |g| g.questions.as_slice())
    }

    /// All questions in group declaration order (not global order).
    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.groups.iter().flat_map(|g| g.questions.iter())
    }

    #[must_use]
    pub fn find(&self, id: &QuestionId) -> Option<&Question> {
        self.iter().find(|q| q.id() == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.questions.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
