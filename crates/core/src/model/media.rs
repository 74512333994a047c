use std::fmt;
use std::path::Path;

use thiserror::Error;
use url::Url;

use crate::model::ids::{AttemptId, QuestionId};
use crate::model::question::QuestionType;

//
// ─── ERRORS (domain validation) ────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MediaValidationError {
    #[error("Please choose a file to upload.")]
    MissingFile,

    #[error("The selected file is empty.")]
    EmptyFile,

    #[error("{found} files are not accepted here. Please upload {expected} media.")]
    WrongType { expected: &'static str, found: String },

    #[error("The file is too large ({size_bytes} bytes). The limit is {limit_bytes} bytes.")]
    TooLarge { size_bytes: u64, limit_bytes: u64 },

    #[error("This question does not take a media answer.")]
    NotMediaQuestion,

    #[error("Media URI is not valid.")]
    InvalidUri,
}

/// Upload limit for audio answers.
pub const MAX_AUDIO_BYTES: u64 = 10 * 1024 * 1024;
/// Upload limit for video answers.
pub const MAX_VIDEO_BYTES: u64 = 100 * 1024 * 1024;

//
// ─── MEDIA FILE ───────────────────────────────────────────────────────────────
//

/// A file picked by the learner for an audio or video answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    file_name: String,
    mime_type: String,
    size_bytes: u64,
}

impl MediaFile {
    /// Describe a file; the mime type is inferred from the extension.
    ///
    /// # Errors
    ///
    /// Returns `MediaValidationError::MissingFile` if the name is blank.
    pub fn new(file_name: impl Into<String>, size_bytes: u64) -> Result<Self, MediaValidationError> {
        let file_name = file_name.into();
        let file_name = file_name.trim();
        if file_name.is_empty() {
            return Err(MediaValidationError::MissingFile);
        }
        Ok(Self {
            mime_type: mime_for_name(file_name).to_string(),
            file_name: file_name.to_string(),
            size_bytes,
        })
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    #[must_use]
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Check type and size against the question this file answers.
    ///
    /// # Errors
    ///
    /// Returns the first failing `MediaValidationError`.
    pub fn validate_for(&self, question_type: QuestionType) -> Result<(), MediaValidationError> {
        let (prefix, expected, limit_bytes) = match question_type {
            QuestionType::Audio => ("audio/", "audio", MAX_AUDIO_BYTES),
            QuestionType::Video => ("video/", "video", MAX_VIDEO_BYTES),
            QuestionType::Mcq | QuestionType::ShortAnswer => {
                return Err(MediaValidationError::NotMediaQuestion);
            }
        };

        if !self.mime_type.starts_with(prefix) {
            return Err(MediaValidationError::WrongType {
                expected,
                found: self.mime_type.clone(),
            });
        }
        if self.size_bytes == 0 {
            return Err(MediaValidationError::EmptyFile);
        }
        if self.size_bytes > limit_bytes {
            return Err(MediaValidationError::TooLarge {
                size_bytes: self.size_bytes,
                limit_bytes,
            });
        }
        Ok(())
    }
}

fn mime_for_name(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        "ogg" | "oga" => "audio/ogg",
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

//
// ─── MEDIA URI ────────────────────────────────────────────────────────────────
//

/// Location of an uploaded media answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUri(Url);

impl MediaUri {
    /// # Errors
    ///
    /// Returns `MediaValidationError::InvalidUri` if the string is not a URL.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, MediaValidationError> {
        let s = raw.as_ref().trim();
        if s.is_empty() {
            return Err(MediaValidationError::InvalidUri);
        }
        Url::parse(s)
            .map(Self)
            .map_err(|_| MediaValidationError::InvalidUri)
    }

    /// Location used by the simulated uploader.
    ///
    /// # Errors
    ///
    /// Returns `MediaValidationError::InvalidUri` if the URL cannot be built.
    pub fn for_upload(
        attempt_id: AttemptId,
        question_id: &QuestionId,
        file: &MediaFile,
    ) -> Result<Self, MediaValidationError> {
        let mut url = Url::parse("mock://uploads/").map_err(|_| MediaValidationError::InvalidUri)?;
        url.path_segments_mut()
            .map_err(|()| MediaValidationError::InvalidUri)?
            .pop_if_empty()
            .push(&attempt_id.to_string())
            .push(question_id.as_str())
            .push(file.file_name());
        Ok(Self(url))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Last path segment, percent-decoding left to the caller.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.0.path_segments().and_then(|mut s| s.next_back())
    }
}

impl fmt::Display for MediaUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
