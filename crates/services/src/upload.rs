//! Simulated media upload with a progress callback.

use std::path::Path;
use std::time::Duration;

use assess_core::model::{AttemptId, MediaFile, MediaUri, QuestionId, QuestionType};
use tracing::debug;

use crate::error::UploadError;

/// Percentage reported while an upload runs, `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct UploadProgress(u8);

impl UploadProgress {
    pub const DONE: Self = Self(100);

    #[must_use]
    pub fn new(percent: u8) -> Self {
        Self(percent.min(100))
    }

    #[must_use]
    pub fn percent(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn is_complete(self) -> bool {
        self.0 >= 100
    }
}

/// Fake uploader: ticks a counter up to `cap` over `duration`, then reports 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadSimulator {
    pub duration: Duration,
    pub tick: Duration,
    pub increment: u8,
    pub cap: u8,
}

impl Default for UploadSimulator {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(2),
            tick: Duration::from_millis(200),
            increment: 10,
            cap: 90,
        }
    }
}

impl UploadSimulator {
    /// Zero-duration simulator for tests and headless runs.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            duration: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Validate `file` for the question, then "upload" it.
    ///
    /// `on_progress` sees a non-decreasing sequence starting at 0 and ending at 100.
    /// Nothing is reported when validation fails.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Invalid` for a file the question cannot accept.
    pub async fn upload<F>(
        &self,
        file: &MediaFile,
        question_type: QuestionType,
        attempt_id: AttemptId,
        question_id: &QuestionId,
        mut on_progress: F,
    ) -> Result<MediaUri, UploadError>
    where
        F: FnMut(UploadProgress),
    {
        file.validate_for(question_type)?;
        let uri = MediaUri::for_upload(attempt_id, question_id, file)?;

        let mut percent = 0_u8;
        on_progress(UploadProgress::new(percent));

        let steps = if self.tick.is_zero() {
            0
        } else {
            self.duration.as_millis() / self.tick.as_millis()
        };
        for _ in 0..steps {
            tokio::time::sleep(self.tick).await;
            percent = percent.saturating_add(self.increment).min(self.cap.min(100));
            on_progress(UploadProgress::new(percent));
        }
        let remainder = self
            .duration
            .saturating_sub(self.tick.saturating_mul(u32::try_from(steps).unwrap_or(u32::MAX)));
        if !remainder.is_zero() {
            tokio::time::sleep(remainder).await;
        }

        on_progress(UploadProgress::DONE);
        debug!(uri = %uri, bytes = file.size_bytes(), "upload finished");
        Ok(uri)
    }
}

/// Describe a file on disk for upload.
///
/// # Errors
///
/// Returns `UploadError::Io` if the file cannot be read and
/// `UploadError::Invalid` if it has no usable name.
pub async fn probe_media(path: impl AsRef<Path>) -> Result<MediaFile, UploadError> {
    let path = path.as_ref();
    let metadata = tokio::fs::metadata(path).await?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(MediaFile::new(name, metadata.len())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assess_core::model::MediaValidationError;

    fn qid() -> QuestionId {
        QuestionId::new("audio-1").unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn progress_is_monotonic_from_zero_to_done() {
        let file = MediaFile::new("take.wav", 2_048).unwrap();
        let mut seen = Vec::new();

        let uri = UploadSimulator::default()
            .upload(&file, QuestionType::Audio, AttemptId::generate(), &qid(), |p| {
                seen.push(p.percent());
            })
            .await
            .unwrap();

        assert!(uri.as_str().ends_with("/audio-1/take.wav"));
        assert_eq!(seen.first(), Some(&0));
        assert_eq!(seen.last(), Some(&100));
        assert!(seen.windows(2).all(|w| w[0] <= w[1]), "not monotonic: {seen:?}");
        assert!(seen[..seen.len() - 1].iter().all(|p| *p <= 90));
        assert!(seen.contains(&90));
    }

    #[tokio::test(start_paused = true)]
    async fn upload_takes_the_configured_duration() {
        let file = MediaFile::new("clip.mp4", 10).unwrap();
        let started = tokio::time::Instant::now();
        UploadSimulator::default()
            .upload(&file, QuestionType::Video, AttemptId::generate(), &qid(), |_| {})
            .await
            .unwrap();
        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn invalid_file_reports_no_progress() {
        let file = MediaFile::new("clip.mp4", 10).unwrap();
        let mut calls = 0;
        let err = UploadSimulator::instant()
            .upload(&file, QuestionType::Audio, AttemptId::generate(), &qid(), |_| calls += 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            UploadError::Invalid(MediaValidationError::WrongType { .. })
        ));
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn probe_reads_size_and_mime() {
        let path = std::env::temp_dir().join(format!("probe-{}.mp3", AttemptId::generate()));
        tokio::fs::write(&path, vec![0_u8; 512]).await.unwrap();

        let file = probe_media(&path).await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(file.size_bytes(), 512);
        assert_eq!(file.mime_type(), "audio/mpeg");
    }

    #[tokio::test]
    async fn probe_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("definitely-not-here.wav");
        assert!(matches!(probe_media(&path).await, Err(UploadError::Io(_))));
    }
}
