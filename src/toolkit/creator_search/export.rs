

use serde::Serialize;
use std::path::Path;
use tracing::info;

use super::dataset::{
    COL_AVG_COMMENTS, COL_AVG_LIKES, COL_BRAND_COLLABORATIONS, COL_CATEGORY, COL_ENGAGEMENT_RATE,
    COL_FOLLOWER_COUNT, COL_NAME, COL_POSTING_FREQUENCY,
};
use super::models::ScoredRecord;
use crate::core::error::{InsightError, Result};


pub const COL_FOLLOWER_SCORE: &str = "Follower_Score";
pub const COL_LIKES_COMMENTS: &str = "avg_likes_comments";
pub const COL_SCORE: &str = "Score";


pub const EXPORT_COLUMNS: [&str; 11] = [
    COL_NAME,
    COL_CATEGORY,
    COL_FOLLOWER_COUNT,
    COL_ENGAGEMENT_RATE,
    COL_AVG_LIKES,
    COL_AVG_COMMENTS,
    COL_POSTING_FREQUENCY,
    COL_BRAND_COLLABORATIONS,
    COL_FOLLOWER_SCORE,
    COL_LIKES_COMMENTS,
    COL_SCORE,
];


#[derive(Serialize)]
struct ExportRow<'a> {
    name: &'a str,
    category: &'a str,
    follower_count: u64,
    engagement_rate: f64,
    average_likes: f64,
    average_comments: f64,
    posting_frequency: Option<&'a str>,
    brand_collaborations: Option<&'a str>,
    follower_score: f64,
    likes_comments_combined: f64,
    score: f64,
}

impl<'a> From<&'a ScoredRecord> for ExportRow<'a> {
    fn from(scored: &'a ScoredRecord) -> Self {
        let record = &scored.record;
        Self {
            name: &record.name,
            category: &record.category,
            follower_count: record.follower_count,
            engagement_rate: record.engagement_rate.value(),
            average_likes: record.average_likes_per_post.value(),
            average_comments: record.average_comments_per_post.value(),
            posting_frequency: record.posting_frequency.as_deref(),
            brand_collaborations: record.past_brand_collaborations.as_deref(),
            follower_score: scored.follower_score,
            likes_comments_combined: scored.likes_comments_combined,
            score: scored.score,
        }
    }
}


/// Header-first, comma-separated rendering of the whole ranked set.
pub fn to_csv(ranked: &[ScoredRecord]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(EXPORT_COLUMNS)?;
    for scored in ranked {
        writer.serialize(ExportRow::from(scored))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| InsightError::Internal(format!("flushing CSV buffer: {}", e.error())))?;
    String::from_utf8(bytes).map_err(|e| InsightError::Internal(e.to_string()))
}


pub fn write_csv(ranked: &[ScoredRecord], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, to_csv(ranked)?)?;
    info!("Exported {} ranked creators to {}", ranked.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::creator_search::models::{CreatorRecord, Metric, WeightVector};
    use crate::toolkit::creator_search::ranking::rank;

    #[test]
    fn test_header_first_with_derived_columns() {
        let mut a = CreatorRecord::new("A", "fashion", 20000, 5.0, 100.0, 20.0);
        a.posting_frequency = Some("Daily".to_string());
        a.past_brand_collaborations = Some("Zara, H&M".to_string());
        let ranked = rank(&[a], Some("fashion"), None, &WeightVector::default());

        let csv = to_csv(&ranked).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "name,category,follower_count,engagement_rate_(%),average_likes/post,\
             average_comments/post,posting_frequency,past_brand_collaborations,\
             Follower_Score,avg_likes_comments,Score"
        );
        assert_eq!(
            lines.next().unwrap(),
            "A,fashion,20000,5.0,100.0,20.0,Daily,\"Zara, H&M\",1.0,120.0,26.8"
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_coerced_values_and_empty_optionals() {
        let mut b = CreatorRecord::new("B", "tech", 10, 0.0, 1.0, 1.0);
        b.engagement_rate = Metric::Raw("bad".to_string());
        let ranked = rank(&[b], Some("tech"), None, &WeightVector::new(0.0, 0.0, 0.0).unwrap());

        let csv = to_csv(&ranked).unwrap();
        assert_eq!(csv.lines().nth(1).unwrap(), "B,tech,10,0.0,1.0,1.0,,,1.0,2.0,0.0");
    }

    #[test]
    fn test_empty_ranking_still_has_header() {
        let csv = to_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }
}
