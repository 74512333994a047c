mod assessment_vm;
mod markdown_vm;
mod review_vm;
mod section_vm;
mod time_fmt;

pub use assessment_vm::{AssessmentCardVm, map_assessment_cards};
pub use markdown_vm::{markdown_to_html, sanitize_html};
pub use review_vm::{ReviewRowVm, ReviewVm, display_answer, submission_toast};
pub use section_vm::{
    QuestionSlot, QuestionVm, SectionInput, SectionPhase, SectionStep, SectionVm,
};
pub use time_fmt::format_datetime;
