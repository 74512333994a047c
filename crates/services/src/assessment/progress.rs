/// Answered/remaining counts for one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
}

impl AttemptProgress {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.remaining == 0
    }

    /// Whole-number percentage for progress bars.
    #[must_use]
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let pct = self.answered.min(self.total) * 100 / self.total;
        u8::try_from(pct).unwrap_or(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_attempt_is_never_complete() {
        let progress = AttemptProgress {
            total: 0,
            answered: 0,
            remaining: 0,
        };
        assert!(!progress.is_complete());
        assert_eq!(progress.percent(), 0);
    }

    #[test]
    fn percent_rounds_down() {
        let progress = AttemptProgress {
            total: 3,
            answered: 2,
            remaining: 1,
        };
        assert_eq!(progress.percent(), 66);
    }
}
