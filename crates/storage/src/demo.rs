//! Built-in sample assessment used by the seed tool and the in-memory backend.

use assess_core::model::{
    Assessment, AssessmentError, AssessmentId, ParseIdError, Question, QuestionError,
    QuestionGroups, QuestionId, QuestionType,
};
use thiserror::Error;

use crate::repository::{Storage, StorageError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DemoError {
    #[error(transparent)]
    Assessment(#[from] AssessmentError),
    #[error(transparent)]
    Id(#[from] ParseIdError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

const MCQ_SAMPLES: [(&str, &str, i64, [&str; 4]); 2] = [
    (
        "mcq-1",
        "Which keyword declares an **immutable** binding in Rust?",
        1,
        ["let", "mut", "static mut", "var"],
    ),
    (
        "mcq-2",
        "What does `Option::None` represent?",
        4,
        ["An error", "The absence of a value", "A null pointer", "Zero"],
    ),
];

const TEXT_SAMPLES: [(&str, QuestionType, &str, i64); 4] = [
    (
        "short-1",
        QuestionType::ShortAnswer,
        "In one sentence, explain what *ownership* means.",
        2,
    ),
    (
        "short-2",
        QuestionType::ShortAnswer,
        "Name a trait that allows a type to be printed with `{:?}`.",
        5,
    ),
    (
        "audio-1",
        QuestionType::Audio,
        "Record yourself describing a project you are proud of.",
        3,
    ),
    (
        "video-1",
        QuestionType::Video,
        "Record a short video introducing yourself.",
        6,
    ),
];

/// The sample assessment with one group per question type.
///
/// # Errors
///
/// Returns `DemoError` if a sample fails domain validation.
pub fn demo_assessment(id: AssessmentId) -> Result<(Assessment, QuestionGroups), DemoError> {
    let assessment = Assessment::new(
        id,
        "Rust Fundamentals",
        Some("A short mixed-format check covering the basics.".to_string()),
    )?;

    let mut groups = QuestionGroups::new();
    let mut mcq = Vec::new();
    for (qid, prompt, order, choices) in MCQ_SAMPLES {
        mcq.push(Question::mcq(QuestionId::new(qid)?, prompt, order, choices)?);
    }
    groups.insert_group(QuestionType::Mcq, mcq)?;

    for (qid, ty, prompt, order) in TEXT_SAMPLES {
        let question = Question::new(QuestionId::new(qid)?, ty, prompt, order)?;
        groups.insert_group(ty, vec![question])?;
    }

    Ok((assessment, groups))
}

/// Write the sample assessment into `storage`, replacing its questions.
///
/// # Errors
///
/// Returns `DemoError` on validation or storage failures.
pub async fn seed_demo(storage: &Storage, id: AssessmentId) -> Result<Assessment, DemoError> {
    let (assessment, groups) = demo_assessment(id)?;
    storage.assessments.upsert_assessment(&assessment).await?;
    storage.questions.replace_questions(id, &groups).await?;
    Ok(assessment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assess_core::navigator::Navigator;

    #[test]
    fn demo_covers_every_section() {
        let (_, groups) = demo_assessment(AssessmentId::new(1)).unwrap();
        groups.ensure_unique_ids().unwrap();
        let nav = Navigator::new(&groups);
        for ty in QuestionType::ALL {
            assert!(nav.sections().contains(&ty), "missing {ty}");
        }
        assert_eq!(nav.len(), 6);
    }

    #[tokio::test]
    async fn seeding_is_repeatable() {
        let storage = Storage::in_memory();
        let id = AssessmentId::new(3);
        seed_demo(&storage, id).await.unwrap();
        seed_demo(&storage, id).await.unwrap();

        let listed = storage.assessments.list_assessments(10).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(storage.questions.get_questions(id).await.unwrap().len(), 6);
    }
}
