use assess_core::model::AssessmentId;
use services::AssessmentListItem;

use crate::vm::markdown_to_html;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssessmentCardVm {
    pub id: u64,
    pub title: String,
    pub description_html: Option<String>,
    pub question_count_label: String,
    pub can_start: bool,
    pub is_current: bool,
}

#[must_use]
pub fn map_assessment_cards(
    items: &[AssessmentListItem],
    current: AssessmentId,
) -> Vec<AssessmentCardVm> {
    items
        .iter()
        .map(|item| {
            let count = item.question_count;
            AssessmentCardVm {
                id: item.assessment.id().value(),
                title: item.assessment.title().to_owned(),
                description_html: item.assessment.description().map(markdown_to_html),
                question_count_label: match count {
                    1 => "1 question".to_string(),
                    n => format!("{n} questions"),
                },
                can_start: count > 0,
                is_current: item.assessment.id() == current,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assess_core::model::Assessment;

    fn item(id: u64, title: &str, question_count: usize) -> AssessmentListItem {
        AssessmentListItem {
            assessment: Assessment::new(AssessmentId::new(id), title, Some("Read *carefully*.".into()))
                .unwrap(),
            question_count,
        }
    }

    #[test]
    fn cards_mark_current_and_empty_assessments() {
        let cards = map_assessment_cards(
            &[item(1, "Rust", 6), item(2, "Draft", 0), item(3, "Quiz", 1)],
            AssessmentId::new(1),
        );

        assert!(cards[0].is_current);
        assert_eq!(cards[0].question_count_label, "6 questions");
        assert!(!cards[1].can_start);
        assert_eq!(cards[2].question_count_label, "1 question");
        let description = cards[0].description_html.as_deref().unwrap();
        assert!(description.contains("<em>carefully</em>"), "{description}");
    }
}
