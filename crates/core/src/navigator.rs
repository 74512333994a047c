//! Linear navigation over the global question order.
//!
//! Every question of every group, sorted by `order`, forms one sequence.
//! Ties on `order` keep group declaration order, then position within the group.

use crate::model::{Question, QuestionGroups, QuestionId, QuestionType};
use crate::store::AnswerStore;

/// Where to go after the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// More questions remain; the next one lives in this section.
    NextSection(QuestionType),
    /// The current question was the last one.
    Complete,
    /// No current question, or it is not part of the loaded set. Stay put.
    Unresolved,
}

impl Navigation {
    #[must_use]
    pub fn is_complete(self) -> bool {
        matches!(self, Navigation::Complete)
    }

    #[must_use]
    pub fn next_section(self) -> Option<QuestionType> {
        match self {
            Navigation::NextSection(ty) => Some(ty),
            Navigation::Complete | Navigation::Unresolved => None,
        }
    }
}

/// Read-only view of the loaded questions in global order.
#[derive(Debug, Clone)]
pub struct Navigator<'a> {
    order: Vec<&'a Question>,
}

impl<'a> Navigator<'a> {
    #[must_use]
    pub fn new(groups: &'a QuestionGroups) -> Self {
        let mut order: Vec<&Question> = groups.iter().collect();
        // sort_by_key is stable: equal orders stay in declaration order.
        order.sort_by_key(|q| q.order());
        Self { order }
    }

    #[must_use]
    pub fn for_store(store: &'a AnswerStore) -> Self {
        Self::new(store.questions())
    }

    #[must_use]
    pub fn global_order(&self) -> &[&'a Question] {
        &self.order
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Index of the first question with this id.
    #[must_use]
    pub fn position_of(&self, id: &QuestionId) -> Option<usize> {
        self.order.iter().position(|q| q.id() == id)
    }

    #[must_use]
    pub fn next_question(&self, id: &QuestionId) -> Option<&'a Question> {
        let pos = self.position_of(id)?;
        self.order.get(pos + 1).copied()
    }

    /// Decide what follows `current`.
    #[must_use]
    pub fn navigate(&self, current: Option<&QuestionId>) -> Navigation {
        let Some(pos) = current.and_then(|id| self.position_of(id)) else {
            return Navigation::Unresolved;
        };
        match self.order.get(pos + 1) {
            Some(next) => Navigation::NextSection(next.question_type()),
            None => Navigation::Complete,
        }
    }

    /// Sections in the order their first question appears. Empty groups never show up.
    #[must_use]
    pub fn sections(&self) -> Vec<QuestionType> {
        let mut out = Vec::new();
        for q in &self.order {
            if !out.contains(&q.question_type()) {
                out.push(q.question_type());
            }
        }
        out
    }

    /// Questions of one section, in global order.
    #[must_use]
    pub fn section_questions(&self, section: QuestionType) -> Vec<&'a Question> {
        self.order
            .iter()
            .copied()
            .filter(|q| q.question_type() == section)
            .collect()
    }

    /// True if an unanswered question of the same section follows `current`.
    #[must_use]
    pub fn has_more_in_section(&self, current: &QuestionId, store: &AnswerStore) -> bool {
        let Some(pos) = self.position_of(current) else {
            return false;
        };
        let section = self.order[pos].question_type();
        self.order[pos + 1..]
            .iter()
            .any(|q| q.question_type() == section && !store.is_answered(q.id()))
    }

    /// Resume point: the earliest question without an answer.
    #[must_use]
    pub fn first_unanswered(&self, store: &AnswerStore) -> Option<&'a Question> {
        self.order
            .iter()
            .copied()
            .find(|q| !store.is_answered(q.id()))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
