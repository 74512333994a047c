use chrono::{DateTime, Utc};

#[must_use]
pub fn format_datetime(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M UTC").to_string()
}

#[cfg(test)]
mod tests {
    use super::format_datetime;
    use assess_core::time::fixed_now;

    #[test]
    fn formats_to_minutes() {
        assert_eq!(format_datetime(fixed_now()), "2023-11-14 22:13 UTC");
    }
}
