use chrono::{DateTime, Utc};

/// Builds `<prefix><epoch millis>-<file name>`.
///
/// The name is used verbatim: two submits of the same file in the same
/// millisecond collide, and path-unsafe characters are passed through.
///
/// ```
/// use chrono::DateTime;
/// use cloud_todo::upload::generate_object_key;
///
/// let at = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
/// assert_eq!(
///     generate_object_key("uploads/", at, "report.pdf"),
///     "uploads/1700000000123-report.pdf"
/// );
/// ```
pub fn generate_object_key(prefix: &str, at: DateTime<Utc>, file_name: &str) -> String {
    format!("{prefix}{}-{file_name}", at.timestamp_millis())
}

/// Rounded percentage of `loaded` over `total`, clamped to 0..=100. An empty
/// payload counts as complete.
pub fn percent_of(loaded: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let percent = (loaded as f64 / total as f64 * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_matches_prefix_time_and_name() {
        let t = 1_718_000_000_000;
        let at = DateTime::from_timestamp_millis(t).unwrap();
        assert_eq!(
            generate_object_key("uploads/", at, "report.pdf"),
            format!("uploads/{t}-report.pdf")
        );
    }

    #[test]
    fn test_key_keeps_name_unsanitized() {
        let at = DateTime::from_timestamp_millis(5).unwrap();
        assert_eq!(
            generate_object_key("uploads/", at, "../a b?.txt"),
            "uploads/5-../a b?.txt"
        );
    }

    #[test]
    fn test_percent_rounding() {
        assert_eq!(percent_of(10, 100), 10);
        assert_eq!(percent_of(55, 100), 55);
        assert_eq!(percent_of(100, 100), 100);
        assert_eq!(percent_of(1, 3), 33);
        assert_eq!(percent_of(2, 3), 67);
        assert_eq!(percent_of(1, 200), 1);
    }

    #[test]
    fn test_percent_edges() {
        assert_eq!(percent_of(0, 0), 100);
        assert_eq!(percent_of(0, 10), 0);
        assert_eq!(percent_of(15, 10), 100);
    }
}
