use tracing::debug;


/// Finds the known category named inside `query`, ignoring case.
///
/// When several names occur, the longest wins ("beauty products" over
/// "beauty"); equal lengths keep vocabulary order. The canonical spelling
/// from `known_categories` is returned.
pub fn resolve_category<S: AsRef<str>>(query: &str, known_categories: &[S]) -> Option<String> {
    let query_lower = query.to_lowercase();

    // (canonical spelling, length of the matched lowercase needle)
    let mut best: Option<(&str, usize)> = None;
    for category in known_categories {
        let category = category.as_ref();
        let needle = category.trim().to_lowercase();
        if needle.is_empty() || !query_lower.contains(&needle) {
            continue;
        }
        let len = needle.chars().count();
        if best.is_none_or(|(_, best_len)| len > best_len) {
            best = Some((category, len));
        }
    }

    let best = best.map(|(category, _)| category);
    debug!("Resolved category for '{}': {:?}", crate::safe_truncate(query, 50), best);
    best.map(str::to_string)
}
