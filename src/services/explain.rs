use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use crate::models::{BehaviorProfile, RecommendedProduct};
use crate::services::providers::ExplanationGenerator;

/// Substituted whenever a generator call fails, times out, or panics
pub const FALLBACK_EXPLANATION: &str =
    "This product is recommended based on your browsing preferences.";

/// Fills the explanation slots of the top-ranked items
///
/// One generator call per item, each in its own task with its own timeout, so
/// a slow or failing call cannot block or corrupt the others. Rank order —
/// not score — decides which items are explained. Items beyond `top_n`, and
/// items whose product detail is missing, are left without an explanation.
pub async fn attach_explanations(
    generator: Arc<dyn ExplanationGenerator>,
    items: &mut [RecommendedProduct],
    profile: &BehaviorProfile,
    top_n: usize,
    per_call_timeout: Duration,
) {
    let mut tasks = Vec::new();

    for (index, item) in items.iter().take(top_n).enumerate() {
        let Some(product) = item.product.clone() else {
            tracing::warn!(
                product_id = item.product_id,
                "No product detail, skipping explanation"
            );
            continue;
        };

        let generator = generator.clone();
        let profile = profile.clone();
        let task = tokio::spawn(async move {
            timeout(per_call_timeout, generator.explain(product, profile)).await
        });
        tasks.push((index, task));
    }

    for (index, task) in tasks {
        let explanation = match task.await {
            Ok(Ok(Ok(text))) => text,
            Ok(Ok(Err(e))) => {
                tracing::warn!(error = %e, "Explanation generation failed, using fallback");
                FALLBACK_EXPLANATION.to_string()
            }
            Ok(Err(_)) => {
                tracing::warn!(
                    timeout_ms = per_call_timeout.as_millis() as u64,
                    "Explanation generation timed out, using fallback"
                );
                FALLBACK_EXPLANATION.to_string()
            }
            Err(e) => {
                tracing::error!(error = %e, "Explanation task failed, using fallback");
                FALLBACK_EXPLANATION.to_string()
            }
        };

        items[index].explanation = Some(explanation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppResult};
    use crate::models::{Algorithm, Product, RecommendationResult};
    use crate::services::providers::MockExplanationGenerator;
    use async_trait::async_trait;

    fn product(id: i32) -> Product {
        Product {
            id,
            title: format!("Product {}", id),
            price: 20.0,
            category: "electronics".to_string(),
            rating_rate: 4.5,
            rating_count: 10,
            description: String::new(),
            image: String::new(),
        }
    }

    fn item(id: i32) -> RecommendedProduct {
        RecommendedProduct::from_result(
            RecommendationResult::new(id, 0.9, Algorithm::Hybrid),
            Some(product(id)),
        )
    }

    #[tokio::test]
    async fn test_partial_failure_only_affects_failed_item() {
        let mut generator = MockExplanationGenerator::new();
        generator
            .expect_explain()
            .withf(|product, _| product.id == 2)
            .returning(|_, _| Err(AppError::ExternalApi("quota exceeded".to_string())));
        generator
            .expect_explain()
            .returning(|product, _| Ok(format!("Because you like product {}.", product.id)));

        let mut items = vec![item(1), item(2), item(3)];
        attach_explanations(
            Arc::new(generator),
            &mut items,
            &BehaviorProfile::default(),
            3,
            Duration::from_secs(5),
        )
        .await;

        assert_eq!(
            items[0].explanation.as_deref(),
            Some("Because you like product 1.")
        );
        assert_eq!(items[1].explanation.as_deref(), Some(FALLBACK_EXPLANATION));
        assert_eq!(
            items[2].explanation.as_deref(),
            Some("Because you like product 3.")
        );
    }

    #[tokio::test]
    async fn test_only_top_n_items_are_explained() {
        let mut generator = MockExplanationGenerator::new();
        generator
            .expect_explain()
            .times(3)
            .returning(|_, _| Ok("reasoned".to_string()));

        let mut items = vec![item(1), item(2), item(3), item(4), item(5)];
        attach_explanations(
            Arc::new(generator),
            &mut items,
            &BehaviorProfile::default(),
            3,
            Duration::from_secs(5),
        )
        .await;

        assert!(items[0].explanation.is_some());
        assert!(items[1].explanation.is_some());
        assert!(items[2].explanation.is_some());
        assert!(items[3].explanation.is_none());
        assert!(items[4].explanation.is_none());
    }

    #[tokio::test]
    async fn test_missing_product_detail_is_skipped() {
        let mut generator = MockExplanationGenerator::new();
        generator
            .expect_explain()
            .times(2)
            .returning(|_, _| Ok("reasoned".to_string()));

        let mut items = vec![item(1), item(2), item(3)];
        items[1].product = None;

        attach_explanations(
            Arc::new(generator),
            &mut items,
            &BehaviorProfile::default(),
            3,
            Duration::from_secs(5),
        )
        .await;

        assert!(items[0].explanation.is_some());
        assert!(items[1].explanation.is_none());
        assert!(items[2].explanation.is_some());
    }

    struct SlowGenerator;

    #[async_trait]
    impl ExplanationGenerator for SlowGenerator {
        async fn explain(&self, _: Product, _: BehaviorProfile) -> AppResult<String> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok("too late".to_string())
        }
    }

    #[tokio::test]
    async fn test_timeout_maps_to_fallback() {
        let mut items = vec![item(1)];
        attach_explanations(
            Arc::new(SlowGenerator),
            &mut items,
            &BehaviorProfile::default(),
            3,
            Duration::from_millis(10),
        )
        .await;

        assert_eq!(items[0].explanation.as_deref(), Some(FALLBACK_EXPLANATION));
    }
}
