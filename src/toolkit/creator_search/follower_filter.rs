use lazy_static::lazy_static;
use regex::Regex;
use std::str::FromStr;

use super::models::{ComparisonOp, CreatorRecord, FollowerFilter};

lazy_static! {
    static ref COMPARISON: Regex =
        Regex::new(r"^\s*([><=])\s*(\d+)").expect("comparison pattern is valid");
}


/// Reads `op value` from the start of `text`, ignoring whatever follows.
///
/// `None` means "no numeric filter"; that includes values too large for
/// `u64`.
pub fn parse_comparison(text: &str) -> Option<FollowerFilter> {
    let captures = COMPARISON.captures(text)?;
    let op = ComparisonOp::from_str(captures.get(1)?.as_str()).ok()?;
    let value = captures.get(2)?.as_str().parse::<u64>().ok()?;
    Some(FollowerFilter { op, value })
}


/// Blank input and "show all" mean no follower filtering.
pub fn normalize_follower_filter(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("show all") {
        None
    } else {
        Some(trimmed.to_string())
    }
}


pub fn apply<'a, I>(records: I, filter: FollowerFilter) -> Vec<&'a CreatorRecord>
where
    I: IntoIterator<Item = &'a CreatorRecord>,
{
    records
        .into_iter()
        .filter(|record| filter.op.holds(record.follower_count, filter.value))
        .collect()
}
