use crate::config::RecommenderConfig;
use crate::models::BehaviorProfile;

/// Strategy tier selected for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Cold start or guest: popularity only
    Trending,
    /// Warm start: category and price-band matching
    RuleBased,
    /// Hot start: collaborative filtering blended with rule-based
    Hybrid,
}

/// Decides which strategy serves a request
///
/// Driven solely by the view count of the freshly summarized profile (or its
/// absence). Guests always get trending regardless of any session history.
/// Re-evaluated on every request; no tier is sticky.
pub fn route(
    user_id: Option<&str>,
    profile: Option<&BehaviorProfile>,
    config: &RecommenderConfig,
) -> Tier {
    if user_id.is_none() {
        return Tier::Trending;
    }

    match profile {
        None => Tier::Trending,
        Some(p) if p.total_views < config.cold_view_threshold => Tier::Trending,
        Some(p) if p.total_views < config.hot_view_threshold => Tier::RuleBased,
        Some(_) => Tier::Hybrid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_with_views(total_views: u32) -> BehaviorProfile {
        BehaviorProfile {
            total_views,
            ..Default::default()
        }
    }

    #[test]
    fn test_guest_routes_to_trending_even_with_rich_profile() {
        let config = RecommenderConfig::default();
        let profile = profile_with_views(50);

        assert_eq!(route(None, Some(&profile), &config), Tier::Trending);
    }

    #[test]
    fn test_missing_profile_routes_to_trending() {
        let config = RecommenderConfig::default();
        assert_eq!(route(Some("u1"), None, &config), Tier::Trending);
    }

    #[test]
    fn test_tier_boundaries() {
        let config = RecommenderConfig::default();

        assert_eq!(
            route(Some("u1"), Some(&profile_with_views(0)), &config),
            Tier::Trending
        );
        assert_eq!(
            route(Some("u1"), Some(&profile_with_views(2)), &config),
            Tier::Trending
        );
        // 3 views is the first warm tier
        assert_eq!(
            route(Some("u1"), Some(&profile_with_views(3)), &config),
            Tier::RuleBased
        );
        assert_eq!(
            route(Some("u1"), Some(&profile_with_views(9)), &config),
            Tier::RuleBased
        );
        // 10 views is the first hot tier
        assert_eq!(
            route(Some("u1"), Some(&profile_with_views(10)), &config),
            Tier::Hybrid
        );
        assert_eq!(
            route(Some("u1"), Some(&profile_with_views(100)), &config),
            Tier::Hybrid
        );
    }

    #[test]
    fn test_thresholds_come_from_config() {
        let config = RecommenderConfig {
            cold_view_threshold: 1,
            hot_view_threshold: 2,
            ..Default::default()
        };

        assert_eq!(
            route(Some("u1"), Some(&profile_with_views(1)), &config),
            Tier::RuleBased
        );
        assert_eq!(
            route(Some("u1"), Some(&profile_with_views(2)), &config),
            Tier::Hybrid
        );
    }
}
