

use serde::Serialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::models::{CreatorRecord, Metric};
use crate::core::error::{InsightError, Result};
use crate::utils::normalize_column_name;

pub const COL_NAME: &str = "name";
pub const COL_CATEGORY: &str = "category";
pub const COL_FOLLOWER_COUNT: &str = "follower_count";
pub const COL_ENGAGEMENT_RATE: &str = "engagement_rate_(%)";
pub const COL_AVG_LIKES: &str = "average_likes/post";
pub const COL_AVG_COMMENTS: &str = "average_comments/post";
pub const COL_POSTING_FREQUENCY: &str = "posting_frequency";
pub const COL_BRAND_COLLABORATIONS: &str = "past_brand_collaborations";


struct ColumnIndex {
    name: usize,
    category: usize,
    follower_count: usize,
    engagement_rate: usize,
    average_likes: usize,
    average_comments: usize,
    posting_frequency: Option<usize>,
    brand_collaborations: Option<usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let normalized: Vec<String> = headers.iter().map(normalize_column_name).collect();
        let find = |column: &str| normalized.iter().position(|h| h == column);
        let require = |column: &str| {
            find(column).ok_or_else(|| {
                InsightError::DataSource(format!(
                    "missing required column '{}' (found: {})",
                    column,
                    normalized.join(", ")
                ))
            })
        };

        Ok(Self {
            name: require(COL_NAME)?,
            category: require(COL_CATEGORY)?,
            follower_count: require(COL_FOLLOWER_COUNT)?,
            engagement_rate: require(COL_ENGAGEMENT_RATE)?,
            average_likes: require(COL_AVG_LIKES)?,
            average_comments: require(COL_AVG_COMMENTS)?,
            posting_frequency: find(COL_POSTING_FREQUENCY),
            brand_collaborations: find(COL_BRAND_COLLABORATIONS),
        })
    }
}


#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub records: usize,
    pub categories: Vec<String>,
    pub min_followers: Option<u64>,
    pub max_followers: Option<u64>,
}


/// The read-only creator table every query is ranked against.
#[derive(Debug, Clone, Default)]
pub struct CreatorDataset {
    records: Vec<CreatorRecord>,
    categories: Vec<String>,
    source: Option<PathBuf>,
}

impl CreatorDataset {

    pub fn from_records(records: Vec<CreatorRecord>) -> Self {
        let categories = category_vocabulary(&records);
        Self {
            records,
            categories,
            source: None,
        }
    }


    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading creator data from {}", path.display());
        let file = std::fs::File::open(path).map_err(|e| {
            InsightError::DataSource(format!("cannot open {}: {}", path.display(), e))
        })?;
        let mut dataset = Self::from_reader(file)?;
        dataset.source = Some(path.to_path_buf());
        Ok(dataset)
    }


    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let columns = ColumnIndex::from_headers(csv_reader.headers()?)?;

        let mut records = Vec::new();
        for (i, row) in csv_reader.records().enumerate() {
            let row = row?;
            let line = row.position().map_or(i as u64 + 2, |p| p.line()) as usize;
            records.push(parse_row(&row, &columns, line)?);
        }

        let dataset = Self::from_records(records);
        info!(
            "Loaded {} creators across {} categories",
            dataset.records.len(),
            dataset.categories.len()
        );
        Ok(dataset)
    }


    pub fn records(&self) -> &[CreatorRecord] {
        &self.records
    }

    /// Distinct categories in order of first appearance.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The dataset spelling of `category`, matched case-insensitively.
    pub fn canonical_category(&self, category: &str) -> Option<&str> {
        let wanted = category.trim().to_lowercase();
        self.categories
            .iter()
            .find(|c| c.to_lowercase() == wanted)
            .map(String::as_str)
    }

    pub fn follower_range(&self) -> Option<(u64, u64)> {
        let min = self.records.iter().map(|r| r.follower_count).min()?;
        let max = self.records.iter().map(|r| r.follower_count).max()?;
        Some((min, max))
    }

    pub fn summary(&self) -> DatasetSummary {
        let range = self.follower_range();
        DatasetSummary {
            records: self.records.len(),
            categories: self.categories.clone(),
            min_followers: range.map(|(min, _)| min),
            max_followers: range.map(|(_, max)| max),
        }
    }
}

fn category_vocabulary(records: &[CreatorRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|r| !r.category.trim().is_empty())
        .filter(|r| seen.insert(r.category.to_lowercase()))
        .map(|r| r.category.clone())
        .collect()
}

fn parse_row(row: &csv::StringRecord, columns: &ColumnIndex, line: usize) -> Result<CreatorRecord> {
    let cell = |idx: usize| row.get(idx).unwrap_or("");
    let optional = |idx: Option<usize>| {
        idx.map(cell)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let name = cell(columns.name).trim();
    if name.is_empty() {
        return Err(InsightError::data_source(line, "empty name"));
    }

    let raw_followers = cell(columns.follower_count);
    let follower_count = parse_follower_count(raw_followers).ok_or_else(|| {
        InsightError::data_source(
            line,
            format!("follower_count '{}' is not a non-negative integer", raw_followers),
        )
    })?;

    let record = CreatorRecord {
        name: name.to_string(),
        category: cell(columns.category).trim().to_string(),
        follower_count,
        engagement_rate: Metric::from_raw(cell(columns.engagement_rate)),
        average_likes_per_post: Metric::from_raw(cell(columns.average_likes)),
        average_comments_per_post: Metric::from_raw(cell(columns.average_comments)),
        posting_frequency: optional(columns.posting_frequency),
        past_brand_collaborations: optional(columns.brand_collaborations),
    };

    if matches!(record.engagement_rate, Metric::Raw(_)) {
        debug!("Line {}: non-numeric engagement rate for '{}'", line, record.name);
    }
    Ok(record)
}

/// Accepts `12000`, `12,000` and integral floats such as `12000.0`.
pub fn parse_follower_count(raw: &str) -> Option<u64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',' && *c != '_').collect();
    if let Ok(count) = cleaned.parse::<u64>() {
        return Some(count);
    }
    let value = cleaned.parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64)
        .then_some(value as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Name,Category,Follower Count,Engagement Rate (%),Average Likes/Post,Average Comments/Post,Posting Frequency,Past Brand Collaborations
Ava,Fashion,20000,5.0,100,20,Daily,\"Zara, H&M\"
Ben,Tech,\"12,500\",n/a,50,10,Weekly,
Cara,fashion,10000.0,8.0,50,10,,
Dev,Wellness,3000,2.5,,4,Monthly,Lululemon
";

    #[test]
    fn test_loads_and_normalizes_headers() {
        let dataset = CreatorDataset::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 4);

        let ava = &dataset.records()[0];
        assert_eq!(ava.name, "Ava");
        assert_eq!(ava.follower_count, 20000);
        assert_eq!(ava.engagement_rate, Metric::Number(5.0));
        assert_eq!(ava.posting_frequency.as_deref(), Some("Daily"));
        assert_eq!(ava.past_brand_collaborations.as_deref(), Some("Zara, H&M"));

        let ben = &dataset.records()[1];
        assert_eq!(ben.follower_count, 12500);
        assert_eq!(ben.engagement_rate, Metric::Raw("n/a".to_string()));
        assert_eq!(ben.past_brand_collaborations, None);

        let cara = &dataset.records()[2];
        assert_eq!(cara.follower_count, 10000);
        assert_eq!(cara.posting_frequency, None);

        let dev = &dataset.records()[3];
        assert_eq!(dev.average_likes_per_post.value(), 0.0);
    }

    #[test]
    fn test_category_vocabulary_is_case_insensitive_first_seen() {
        let dataset = CreatorDataset::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(dataset.categories(), &["Fashion", "Tech", "Wellness"]);
        assert_eq!(dataset.canonical_category("FASHION"), Some("Fashion"));
        assert_eq!(dataset.canonical_category("travel"), None);
    }

    #[test]
    fn test_summary_reports_follower_range() {
        let summary = CreatorDataset::from_reader(SAMPLE.as_bytes()).unwrap().summary();
        assert_eq!(summary.records, 4);
        assert_eq!(summary.min_followers, Some(3000));
        assert_eq!(summary.max_followers, Some(20000));
    }

    #[test]
    fn test_missing_required_column() {
        let csv = "name,category,follower_count\nA,tech,1\n";
        let err = CreatorDataset::from_reader(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("engagement_rate_(%)"));
    }

    #[test]
    fn test_bad_follower_count_names_line() {
        let csv = "name,category,follower_count,engagement_rate_(%),average_likes/post,average_comments/post\n\
                   A,tech,lots,1,1,1\n";
        let err = CreatorDataset::from_reader(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("row 2"));
        assert!(err.to_string().contains("lots"));
    }

    #[test]
    fn test_optional_columns_may_be_absent() {
        let csv = "name,category,follower_count,engagement_rate_(%),average_likes/post,average_comments/post\n\
                   A,tech,10,1.5,2,3\n";
        let dataset = CreatorDataset::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(dataset.records()[0].posting_frequency, None);
    }

    #[test]
    fn test_parse_follower_count() {
        assert_eq!(parse_follower_count(" 1,200 "), Some(1200));
        assert_eq!(parse_follower_count("3e3"), Some(3000));
        assert_eq!(parse_follower_count("-5"), None);
        assert_eq!(parse_follower_count("1.5"), None);
        assert_eq!(parse_follower_count(""), None);
    }

    #[test]
    fn test_empty_dataset() {
        let dataset = CreatorDataset::from_records(Vec::new());
        assert!(dataset.is_empty());
        assert_eq!(dataset.follower_range(), None);
    }
}
