use tracing_subscriber::EnvFilter;


pub const DEFAULT_LOG_FILTER: &str = "warn,creator_insight=info";


#[inline]
pub fn safe_truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}


#[inline]
pub fn safe_truncate_ellipsis(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        format!("{}...", s.chars().take(max_chars).collect::<String>())
    } else {
        s.to_string()
    }
}


/// Normalizes a header cell: trimmed, lowercased, spaces as underscores.
pub fn normalize_column_name(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}

/// `RUST_LOG`-style directives when given and valid, otherwise
/// [`DEFAULT_LOG_FILTER`].
pub fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_truncate_multibyte() {
        assert_eq!(safe_truncate("Привет мир", 6), "Привет");
    }

    #[test]
    fn test_safe_truncate_shorter() {
        assert_eq!(safe_truncate("hi", 10), "hi");
    }

    #[test]
    fn test_safe_truncate_ellipsis() {
        assert_eq!(safe_truncate_ellipsis("hello world", 5), "hello...");
        assert_eq!(safe_truncate_ellipsis("hi", 10), "hi");
    }

    #[test]
    fn test_normalize_column_name() {
        assert_eq!(normalize_column_name(" Engagement Rate (%) "), "engagement_rate_(%)");
        assert_eq!(normalize_column_name("Average Likes/Post"), "average_likes/post");
        assert_eq!(normalize_column_name("Name"), "name");
    }

    #[test]
    fn test_log_filter_prefers_user_directives() {
        let filter = log_filter(Some("creator_insight=debug")).to_string();
        assert!(filter.contains("creator_insight=debug"));
        assert!(!filter.contains("creator_insight=info"));
    }

    #[test]
    fn test_log_filter_defaults() {
        assert!(log_filter(None).to_string().contains("creator_insight=info"));
        assert!(log_filter(Some("  ")).to_string().contains("creator_insight=info"));
        assert!(
            log_filter(Some("creator_insight=loud"))
                .to_string()
                .contains("creator_insight=info")
        );
    }
}
