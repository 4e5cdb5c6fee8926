use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Product;

/// Strategy that produced a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    Trending,
    RuleBased,
    Collaborative,
    Hybrid,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Trending => "trending",
            Algorithm::RuleBased => "rule-based",
            Algorithm::Collaborative => "collaborative",
            Algorithm::Hybrid => "hybrid",
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single scored recommendation
///
/// Scores are strategy-local: they order items within one strategy's output
/// but are not comparable across strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub product_id: i32,
    pub score: f64,
    pub algorithm: Algorithm,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl RecommendationResult {
    pub fn new(product_id: i32, score: f64, algorithm: Algorithm) -> Self {
        Self {
            product_id,
            score,
            algorithm,
            explanation: None,
        }
    }
}

/// A recommendation joined with its product detail, as returned to clients
///
/// `product` is `None` when the catalog no longer has the id (e.g. a product
/// removed after the recommendation set was cached).
#[derive(Debug, Clone, Serialize)]
pub struct RecommendedProduct {
    pub product_id: i32,
    pub score: f64,
    pub algorithm: Algorithm,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub product: Option<Product>,
}

impl RecommendedProduct {
    pub fn from_result(result: RecommendationResult, product: Option<Product>) -> Self {
        Self {
            product_id: result.product_id,
            score: result.score,
            algorithm: result.algorithm,
            explanation: result.explanation,
            product,
        }
    }

    /// Back-conversion used when persisting a served set to the cache
    pub fn to_result(&self) -> RecommendationResult {
        RecommendationResult {
            product_id: self.product_id,
            score: self.score,
            algorithm: self.algorithm,
            explanation: self.explanation.clone(),
        }
    }
}

/// A per-user recommendation snapshot with a single shared expiry
///
/// Replaced wholesale on refresh; there is no per-item TTL. A reader must
/// treat an expired snapshot as absent even when it has not been purged yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedRecommendationSet {
    pub results: Vec<RecommendationResult>,
    pub expires_at: DateTime<Utc>,
}

impl CachedRecommendationSet {
    /// Whether the snapshot may still be served at `now`
    ///
    /// Expiry is exclusive: a snapshot expiring exactly at `now` is stale.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}
