use crate::model::{Answer, Question, QuestionGroups, QuestionId};
use crate::navigator::Navigator;

/// Loaded questions and recorded answers for one attempt.
///
/// Created once per attempt and passed explicitly to whatever needs it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerStore {
    questions: QuestionGroups,
    answers: Vec<Answer>,
}

impl AnswerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the full question mapping. Ids are not checked for uniqueness here.
    pub fn set_questions(&mut self, groups: QuestionGroups) {
        self.questions = groups;
    }

    #[must_use]
    pub fn questions(&self) -> &QuestionGroups {
        &self.questions
    }

    #[must_use]
    pub fn has_questions(&self) -> bool {
        !self.questions.is_empty()
    }

    #[must_use]
    pub fn find_question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.find(id)
    }

    /// Insert or overwrite the answer for `answer.question_id` (last write wins).
    pub fn add_answer(&mut self, answer: Answer) -> &Answer {
        let idx = match self
            .answers
            .iter()
            .position(|a| a.question_id == answer.question_id)
        {
            Some(idx) => {
                self.answers[idx] = answer;
                idx
            }
            None => {
                self.answers.push(answer);
                self.answers.len() - 1
            }
        };
        &self.answers[idx]
    }

    /// Merge answers restored from saved progress.
    pub fn restore_answers(&mut self, answers: impl IntoIterator<Item = Answer>) {
        for answer in answers {
            self.add_answer(answer);
        }
    }

    #[must_use]
    pub fn find_answer(&self, question_id: &QuestionId) -> Option<&Answer> {
        self.answers.iter().find(|a| &a.question_id == question_id)
    }

    #[must_use]
    pub fn is_answered(&self, question_id: &QuestionId) -> bool {
        self.find_answer(question_id).is_some()
    }

    #[must_use]
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// Questions still missing an answer, in global order.
    #[must_use]
    pub fn unanswered(&self) -> Vec<&Question> {
        Navigator::new(&self.questions)
            .global_order()
            .iter()
            .copied()
            .filter(|q| !self.is_answered(q.id()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionType;

    fn qid(s: &str) -> QuestionId {
        QuestionId::new(s).unwrap()
    }

    fn store_with_two_questions() -> AnswerStore {
        let mut store = AnswerStore::new();
        store.set_questions(QuestionGroups::from_questions([
            Question::new(qid("q2"), QuestionType::ShortAnswer, "Second", 2).unwrap(),
            Question::new(qid("q1"), QuestionType::Audio, "First", 1).unwrap(),
        ]));
        store
    }

    #[test]
    fn last_write_wins() {
        let mut store = store_with_two_questions();
        store.add_answer(Answer::new(qid("q1"), "first"));
        store.add_answer(Answer::new(qid("q1"), "second"));
        store.add_answer(Answer::new(qid("q1"), "third"));

        assert_eq!(store.answered_count(), 1);
        assert_eq!(store.find_answer(&qid("q1")).unwrap().answer, "third");
    }

    #[test]
    fn add_answer_is_idempotent() {
        let mut once = store_with_two_questions();
        once.add_answer(Answer::new(qid("q2"), "same"));

        let mut twice = store_with_two_questions();
        twice.add_answer(Answer::new(qid("q2"), "same"));
        twice.add_answer(Answer::new(qid("q2"), "same"));

        assert_eq!(once, twice);
    }

    #[test]
    fn overwrite_keeps_answer_position() {
        let mut store = store_with_two_questions();
        store.add_answer(Answer::new(qid("q1"), "a"));
        store.add_answer(Answer::new(qid("q2"), "b"));
        store.add_answer(Answer::new(qid("q1"), "c"));

        let ids: Vec<_> = store.answers().iter().map(|a| a.question_id.as_str()).collect();
        assert_eq!(ids, vec!["q1", "q2"]);
    }

    #[test]
    fn unanswered_follows_global_order() {
        let mut store = store_with_two_questions();
        let ids: Vec<_> = store.unanswered().iter().map(|q| q.id().as_str()).collect();
        assert_eq!(ids, vec!["q1", "q2"]);

        store.add_answer(Answer::new(qid("q1"), "done"));
        let ids: Vec<_> = store.unanswered().iter().map(|q| q.id().as_str()).collect();
        assert_eq!(ids, vec!["q2"]);
    }

    #[test]
    fn set_questions_replaces_previous_set() {
        let mut store = store_with_two_questions();
        assert!(store.has_questions());
        store.set_questions(QuestionGroups::new());
        assert!(!store.has_questions());
        assert!(store.find_question(&qid("q1")).is_none());
    }

    #[test]
    fn restore_merges_with_last_write_wins() {
        let mut store = store_with_two_questions();
        store.add_answer(Answer::new(qid("q1"), "local"));
        store.restore_answers([
            Answer::new(qid("q1"), "saved"),
            Answer::new(qid("q2"), "saved too"),
        ]);
        assert_eq!(store.find_answer(&qid("q1")).unwrap().answer, "saved");
        assert_eq!(store.answered_count(), 2);
    }
}
