use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};

use crate::core::error::{InsightError, Result};


/// A numeric cell as read from the data source.
///
/// Dirty cells stay `Raw` until [`Metric::coerce`] turns them into a number,
/// with anything unparsable or non-finite becoming 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Metric {
    Number(f64),
    Raw(String),
}

impl Metric {
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Self::Number(value),
            _ => Self::Raw(raw.to_string()),
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            Self::Number(value) if value.is_finite() => *value,
            Self::Number(_) => 0.0,
            Self::Raw(raw) => match raw.trim().parse::<f64>() {
                Ok(value) if value.is_finite() => value,
                _ => 0.0,
            },
        }
    }

    pub fn coerce(&self) -> Self {
        Self::Number(self.value())
    }
}

impl From<f64> for Metric {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatorRecord {
    pub name: String,
    pub category: String,
    pub follower_count: u64,
    pub engagement_rate: Metric,
    pub average_likes_per_post: Metric,
    pub average_comments_per_post: Metric,
    pub posting_frequency: Option<String>,
    pub past_brand_collaborations: Option<String>,
}

impl CreatorRecord {

    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        follower_count: u64,
        engagement_rate: impl Into<Metric>,
        average_likes_per_post: impl Into<Metric>,
        average_comments_per_post: impl Into<Metric>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            follower_count,
            engagement_rate: engagement_rate.into(),
            average_likes_per_post: average_likes_per_post.into(),
            average_comments_per_post: average_comments_per_post.into(),
            posting_frequency: None,
            past_brand_collaborations: None,
        }
    }

    /// Copy with every metric coerced to a number.
    pub fn coerced(&self) -> Self {
        Self {
            engagement_rate: self.engagement_rate.coerce(),
            average_likes_per_post: self.average_likes_per_post.coerce(),
            average_comments_per_post: self.average_comments_per_post.coerce(),
            ..self.clone()
        }
    }

    pub fn in_category(&self, category: &str) -> bool {
        self.category.to_lowercase() == category.to_lowercase()
    }
}


/// Coefficients for the composite score. Each lies in `[0, 1]`; they need
/// not sum to one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightVector {
    engagement: f64,
    follower: f64,
    likes: f64,
}

impl WeightVector {
    pub fn new(engagement: f64, follower: f64, likes: f64) -> Result<Self> {
        for (name, weight) in [("engagement", engagement), ("follower", follower), ("likes", likes)] {
            if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
                return Err(InsightError::Validation(format!(
                    "{name} weight must be within [0, 1], got {weight}"
                )));
            }
        }
        Ok(Self {
            engagement,
            follower,
            likes,
        })
    }

    pub fn engagement(&self) -> f64 {
        self.engagement
    }

    pub fn follower(&self) -> f64 {
        self.follower
    }

    pub fn likes(&self) -> f64 {
        self.likes
    }
}

impl Default for WeightVector {
    fn default() -> Self {
        Self {
            engagement: 0.5,
            follower: 0.3,
            likes: 0.2,
        }
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, IntoStaticStr)]
pub enum ComparisonOp {
    #[serde(rename = ">")]
    #[strum(serialize = ">")]
    GreaterThan,
    #[serde(rename = "<")]
    #[strum(serialize = "<")]
    LessThan,
    #[serde(rename = "=")]
    #[strum(serialize = "=")]
    Equal,
}

impl ComparisonOp {
    pub fn holds(self, lhs: u64, rhs: u64) -> bool {
        match self {
            Self::GreaterThan => lhs > rhs,
            Self::LessThan => lhs < rhs,
            Self::Equal => lhs == rhs,
        }
    }

    pub fn symbol(self) -> &'static str {
        self.into()
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowerFilter {
    pub op: ComparisonOp,
    pub value: u64,
}

impl std::fmt::Display for FollowerFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.op.symbol(), self.value)
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub record: CreatorRecord,
    pub follower_score: f64,
    pub likes_comments_combined: f64,
    pub score: f64,
}
