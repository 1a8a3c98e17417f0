use serde::Serialize;
use std::fmt::Write as _;

use super::models::ScoredRecord;

const NOT_AVAILABLE: &str = "N/A";


/// Drill-down view of one ranked creator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatorDetail {
    pub name: String,
    pub score: f64,
    pub category: String,
    pub engagement_rate: f64,
    pub follower_count: u64,
    pub avg_likes_comments: f64,
    pub posting_frequency: String,
    pub brand_collaborations: String,
}

impl From<&ScoredRecord> for CreatorDetail {
    fn from(scored: &ScoredRecord) -> Self {
        let record = &scored.record;
        Self {
            name: record.name.clone(),
            score: scored.score,
            category: record.category.clone(),
            engagement_rate: record.engagement_rate.value(),
            follower_count: record.follower_count,
            avg_likes_comments: scored.likes_comments_combined,
            posting_frequency: record
                .posting_frequency
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            brand_collaborations: record
                .past_brand_collaborations
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        }
    }
}


#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CondensedRow {
    pub name: String,
    pub category: String,
    pub engagement_rate: f64,
    pub follower_count: u64,
    pub score: f64,
}

impl From<&ScoredRecord> for CondensedRow {
    fn from(scored: &ScoredRecord) -> Self {
        Self {
            name: scored.record.name.clone(),
            category: scored.record.category.clone(),
            engagement_rate: scored.record.engagement_rate.value(),
            follower_count: scored.record.follower_count,
            score: scored.score,
        }
    }
}


pub fn top_details(ranked: &[ScoredRecord], limit: usize) -> Vec<CreatorDetail> {
    ranked.iter().take(limit).map(CreatorDetail::from).collect()
}


pub fn top_table(ranked: &[ScoredRecord], limit: usize) -> Vec<CondensedRow> {
    ranked.iter().take(limit).map(CondensedRow::from).collect()
}


pub fn render_details(details: &[CreatorDetail]) -> String {
    let mut out = String::new();
    for detail in details {
        let _ = writeln!(out, "{} (Score: {:.2})", detail.name, detail.score);
        let _ = writeln!(out, "  Category: {}", detail.category);
        let _ = writeln!(out, "  Engagement Rate (%): {}", detail.engagement_rate);
        let _ = writeln!(out, "  Follower count: {}", detail.follower_count);
        let _ = writeln!(out, "  Average likes/comments per post: {}", detail.avg_likes_comments);
        let _ = writeln!(out, "  Posting frequency: {}", detail.posting_frequency);
        let _ = writeln!(out, "  Historical brand collaborations: {}", detail.brand_collaborations);
    }
    out
}


pub fn render_table(rows: &[CondensedRow]) -> String {
    let name_width = rows
        .iter()
        .map(|r| r.name.chars().count())
        .chain(std::iter::once(4))
        .max()
        .unwrap_or(4);
    let category_width = rows
        .iter()
        .map(|r| r.category.chars().count())
        .chain(std::iter::once(8))
        .max()
        .unwrap_or(8);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<name_width$}  {:<category_width$}  {:>10}  {:>14}  {:>10}",
        "name", "category", "engagement", "follower_count", "Score"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:<name_width$}  {:<category_width$}  {:>10.2}  {:>14}  {:>10.2}",
            row.name, row.category, row.engagement_rate, row.follower_count, row.score
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::creator_search::models::{CreatorRecord, WeightVector};
    use crate::toolkit::creator_search::ranking::rank;

    fn ranked() -> Vec<ScoredRecord> {
        let mut a = CreatorRecord::new("A", "fashion", 20000, 5.0, 100.0, 20.0);
        a.posting_frequency = Some("Daily".to_string());
        let b = CreatorRecord::new("B", "fashion", 10000, 8.0, 50.0, 10.0);
        rank(&[a, b], Some("fashion"), None, &WeightVector::default())
    }

    #[test]
    fn test_details_fill_missing_optionals() {
        let details = top_details(&ranked(), 5);
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].name, "A");
        assert_eq!(details[0].posting_frequency, "Daily");
        assert_eq!(details[0].brand_collaborations, "N/A");
        assert_eq!(details[0].avg_likes_comments, 120.0);
        assert_eq!(details[1].posting_frequency, "N/A");
    }

    #[test]
    fn test_limits_apply() {
        assert_eq!(top_details(&ranked(), 1).len(), 1);
        assert_eq!(top_table(&ranked(), 10).len(), 2);
        assert!(top_table(&[], 10).is_empty());
    }

    #[test]
    fn test_render_outputs() {
        let text = render_details(&top_details(&ranked(), 1));
        assert!(text.starts_with("A (Score: 26.80)"));
        assert!(text.contains("Historical brand collaborations: N/A"));

        let table = render_table(&top_table(&ranked(), 10));
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("name"));
        assert!(lines[1].starts_with("A "));
        assert!(lines[1].trim_end().ends_with("26.80"));
    }
}
