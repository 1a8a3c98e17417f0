

use tracing::debug;

use super::follower_filter;
use super::models::{CreatorRecord, FollowerFilter, ScoredRecord, WeightVector};


pub fn calculate_score(
    engagement_rate: f64,
    follower_score: f64,
    likes_comments_combined: f64,
    weights: &WeightVector,
) -> f64 {
    engagement_rate * weights.engagement()
        + follower_score * weights.follower()
        + likes_comments_combined * weights.likes()
}


/// Filters to one category (and optionally a follower comparison), scores
/// the survivors and orders them by score, highest first.
///
/// A missing or blank category yields nothing. Ties keep input order.
pub fn rank(
    records: &[CreatorRecord],
    category: Option<&str>,
    numeric_filter: Option<FollowerFilter>,
    weights: &WeightVector,
) -> Vec<ScoredRecord> {
    let category = match category.map(str::trim) {
        Some(c) if !c.is_empty() => c,
        _ => return Vec::new(),
    };

    let in_category = records.iter().filter(|r| r.in_category(category));
    let filtered: Vec<&CreatorRecord> = match numeric_filter {
        Some(filter) => follower_filter::apply(in_category, filter),
        None => in_category.collect(),
    };

    let max_followers = filtered.iter().map(|r| r.follower_count).max().unwrap_or(0);

    let mut ranked: Vec<ScoredRecord> = filtered
        .into_iter()
        .map(|record| {
            let record = record.coerced();
            let follower_score = if max_followers > 0 {
                record.follower_count as f64 / max_followers as f64
            } else {
                0.0
            };
            let likes_comments_combined = finite_or_zero(
                record.average_likes_per_post.value() + record.average_comments_per_post.value(),
            );
            let score = finite_or_zero(calculate_score(
                record.engagement_rate.value(),
                follower_score,
                likes_comments_combined,
                weights,
            ));
            ScoredRecord {
                record,
                follower_score,
                likes_comments_combined,
                score,
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    debug!(
        "Ranked {} creators in '{}' (filter={:?}, max_followers={})",
        ranked.len(),
        category,
        numeric_filter.map(|f| f.to_string()),
        max_followers
    );
    ranked
}

/// Overflowed sums count as 0, like unparsable cells.
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
