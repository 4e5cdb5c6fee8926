use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    config::RecommenderConfig,
    db::{BehaviorStore, PriceBand, ProductCatalog},
    error::AppResult,
    models::{
        ActionKind, Algorithm, BehaviorProfile, Product, RecommendationResult, RecommendedProduct,
    },
    services::{
        merge::merge_first_wins,
        profile,
        tier::{self, Tier},
    },
};

/// Why a strategy handed a request down to a simpler one
///
/// Degradations are designed fallbacks, not errors: the request keeps going
/// and the trail records which rungs of the ladder fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degradation {
    /// No behavior profile exists for the user
    MissingProfile,
    /// Too few distinct viewed products for collaborative filtering
    InsufficientHistory,
    /// No other user shares interaction overlap with the requester
    NoPeerOverlap,
}

/// Output of one strategy invocation, including its degradation trail
#[derive(Debug, Clone)]
pub struct StrategyRun {
    pub results: Vec<RecommendationResult>,
    pub degradations: Vec<Degradation>,
}

impl StrategyRun {
    fn new(results: Vec<RecommendationResult>) -> Self {
        Self {
            results,
            degradations: Vec::new(),
        }
    }

    fn pushed_down(mut self, reason: Degradation) -> Self {
        self.degradations.insert(0, reason);
        self
    }
}

/// The recommendation-selection pipeline
///
/// Summarizes behavior, routes to a tier, runs the selected strategies and
/// merges their output. Holds no state of its own beyond configuration;
/// every request reads fresh from the stores.
#[derive(Clone)]
pub struct Recommender {
    behavior: Arc<dyn BehaviorStore>,
    catalog: Arc<dyn ProductCatalog>,
    config: RecommenderConfig,
}

impl Recommender {
    pub fn new(
        behavior: Arc<dyn BehaviorStore>,
        catalog: Arc<dyn ProductCatalog>,
        config: RecommenderConfig,
    ) -> Self {
        Self {
            behavior,
            catalog,
            config,
        }
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    /// Summarizes the user's recent behavior window into a profile
    ///
    /// `None` means the user has no interactions yet — the cold-start signal.
    pub async fn build_profile(&self, user_id: &str) -> AppResult<Option<BehaviorProfile>> {
        let events = self
            .behavior
            .recent_interactions(user_id, self.config.behavior_window)
            .await?;
        Ok(profile::summarize(&events))
    }

    fn score_ranked(
        &self,
        product_ids: impl IntoIterator<Item = i32>,
        base: f64,
        step: f64,
        algorithm: Algorithm,
    ) -> Vec<RecommendationResult> {
        product_ids
            .into_iter()
            .enumerate()
            .map(|(rank, product_id)| {
                RecommendationResult::new(product_id, base - rank as f64 * step, algorithm)
            })
            .collect()
    }

    /// Popularity ranking: most-reviewed products first
    ///
    /// Serves guests and cold-start users, and is the bottom rung of every
    /// degradation ladder.
    pub async fn trending(&self, limit: usize) -> AppResult<Vec<RecommendationResult>> {
        let products = self.catalog.find_trending(limit as i64).await?;
        Ok(self.score_ranked(
            products.into_iter().map(|p| p.id),
            self.config.trending_base_score,
            self.config.trending_score_step,
            Algorithm::Trending,
        ))
    }

    /// Category and price-band matching against the user's profile
    ///
    /// Without a profile this degrades to trending. A filter that matches
    /// nothing returns an empty list — the band is never widened and the
    /// result is never padded.
    pub async fn rule_based(
        &self,
        profile: Option<&BehaviorProfile>,
        limit: usize,
    ) -> AppResult<StrategyRun> {
        let Some((category, band, exclude)) = profile.and_then(|p| {
            let category = p.top_category.clone()?;
            let band = p
                .avg_price
                .map(|avg| PriceBand::around(avg, self.config.price_band_lower, self.config.price_band_upper));
            Some((category, band, p.viewed_ids_sorted()))
        }) else {
            tracing::debug!(reason = ?Degradation::MissingProfile, "Rule-based degrading to trending");
            let results = self.trending(limit).await?;
            return Ok(StrategyRun::new(results).pushed_down(Degradation::MissingProfile));
        };

        let products = self
            .catalog
            .find_by_category(&category, band, &exclude, limit as i64)
            .await?;

        Ok(StrategyRun::new(self.score_ranked(
            products.into_iter().map(|p| p.id),
            self.config.rule_based_base_score,
            self.config.rule_based_score_step,
            Algorithm::RuleBased,
        )))
    }

    /// Two-hop co-occurrence filtering
    ///
    /// Finds peers through shared product engagement, then ranks what those
    /// peers engaged with that the requester has not seen. Degrades to
    /// rule-based when the user's history is too thin or no peers overlap.
    pub async fn collaborative(
        &self,
        user_id: &str,
        profile: Option<&BehaviorProfile>,
        limit: usize,
    ) -> AppResult<StrategyRun> {
        let viewed = match profile {
            Some(p) if p.viewed_product_ids.len() >= self.config.min_viewed_for_collaborative => {
                p.viewed_ids_sorted()
            }
            _ => {
                tracing::debug!(
                    reason = ?Degradation::InsufficientHistory,
                    "Collaborative degrading to rule-based"
                );
                let run = self.rule_based(profile, limit).await?;
                return Ok(run.pushed_down(Degradation::InsufficientHistory));
            }
        };

        let peers = self
            .behavior
            .group_by_user(
                &viewed,
                user_id,
                &ActionKind::ENGAGEMENT,
                self.config.peer_limit,
            )
            .await?;

        if peers.is_empty() {
            tracing::debug!(
                reason = ?Degradation::NoPeerOverlap,
                "Collaborative degrading to rule-based"
            );
            let run = self.rule_based(profile, limit).await?;
            return Ok(run.pushed_down(Degradation::NoPeerOverlap));
        }

        let peer_ids: Vec<String> = peers.into_iter().map(|peer| peer.user_id).collect();

        let ranked = self
            .behavior
            .group_by_product(&peer_ids, &viewed, &ActionKind::ENGAGEMENT, limit as i64)
            .await?;

        Ok(StrategyRun::new(self.score_ranked(
            ranked.into_iter().map(|entry| entry.product_id),
            self.config.collaborative_base_score,
            self.config.collaborative_score_step,
            Algorithm::Collaborative,
        )))
    }

    /// Blends collaborative and rule-based output for hot-start users
    ///
    /// The two sub-strategies run concurrently against stable store
    /// snapshots; collaborative results are concatenated first so they win
    /// deduplication ties. Every surviving item is relabeled `hybrid` while
    /// its strategy-local score is kept.
    pub async fn hybrid(
        &self,
        user_id: &str,
        profile: Option<&BehaviorProfile>,
        limit: usize,
    ) -> AppResult<StrategyRun> {
        let collaborative_limit =
            (limit as f64 * self.config.hybrid_collaborative_share).ceil() as usize;
        let rule_based_limit = (limit as f64 * self.config.hybrid_rule_based_share).ceil() as usize;

        let (collaborative, rule_based) = tokio::join!(
            self.collaborative(user_id, profile, collaborative_limit),
            self.rule_based(profile, rule_based_limit),
        );
        let collaborative = collaborative?;
        let rule_based = rule_based?;

        let mut degradations = collaborative.degradations;
        degradations.extend(rule_based.degradations);

        let combined: Vec<RecommendationResult> = collaborative
            .results
            .into_iter()
            .chain(rule_based.results)
            .collect();

        let mut merged = merge_first_wins(combined, |result| result.product_id);
        merged.truncate(limit);
        for result in &mut merged {
            result.algorithm = Algorithm::Hybrid;
        }

        Ok(StrategyRun {
            results: merged,
            degradations,
        })
    }

    /// Runs the full selection pipeline for one request
    pub async fn run(&self, user_id: Option<&str>, limit: usize) -> AppResult<StrategyRun> {
        let Some(uid) = user_id else {
            return Ok(StrategyRun::new(self.trending(limit).await?));
        };

        let profile = self.build_profile(uid).await?;
        let tier = tier::route(user_id, profile.as_ref(), &self.config);
        tracing::debug!(user_id = %uid, tier = ?tier, "Routed recommendation request");

        match tier {
            Tier::Trending => Ok(StrategyRun::new(self.trending(limit).await?)),
            Tier::RuleBased => self.rule_based(profile.as_ref(), limit).await,
            Tier::Hybrid => self.hybrid(uid, profile.as_ref(), limit).await,
        }
    }

    /// Ranked, scored recommendations for a user (or guest when `None`)
    pub async fn recommend(
        &self,
        user_id: Option<&str>,
        limit: usize,
    ) -> AppResult<Vec<RecommendationResult>> {
        Ok(self.run(user_id, limit).await?.results)
    }

    /// Like [`recommend`](Self::recommend), with catalog detail joined on
    pub async fn recommend_detailed(
        &self,
        user_id: Option<&str>,
        limit: usize,
    ) -> AppResult<Vec<RecommendedProduct>> {
        let results = self.recommend(user_id, limit).await?;
        self.join_products(results).await
    }

    /// Joins catalog detail onto scored results, preserving result order
    ///
    /// A result whose product has vanished from the catalog keeps its slot
    /// with no detail rather than being dropped.
    pub async fn join_products(
        &self,
        results: Vec<RecommendationResult>,
    ) -> AppResult<Vec<RecommendedProduct>> {
        let ids: Vec<i32> = results.iter().map(|r| r.product_id).collect();
        let products = self.catalog.find_by_ids(&ids).await?;
        let mut by_id: HashMap<i32, Product> =
            products.into_iter().map(|p| (p.id, p)).collect();

        Ok(results
            .into_iter()
            .map(|result| {
                let product = by_id.remove(&result.product_id);
                RecommendedProduct::from_result(result, product)
            })
            .collect())
    }
}
