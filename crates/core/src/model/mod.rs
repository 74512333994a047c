mod answer;
mod attempt;
mod ids;
mod media;
mod question;

pub use ids::{AssessmentId, AttemptId, ParseIdError, QuestionId};

pub use answer::{Answer, AnswerError};
pub use attempt::{Assessment, AssessmentError, Attempt, SubmissionReceipt};
pub use media::{MAX_AUDIO_BYTES, MAX_VIDEO_BYTES, MediaFile, MediaUri, MediaValidationError};
pub use question::{Question, QuestionError, QuestionGroup, QuestionGroups, QuestionType};
