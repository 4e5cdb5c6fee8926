use async_trait::async_trait;
use sqlx::PgPool;

use crate::{error::AppResult, models::Product};

/// Inclusive price range used by the rule-based strategy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBand {
    pub min: f64,
    pub max: f64,
}

impl PriceBand {
    /// Band centered on an average price: `[avg × lower, avg × upper]`,
    /// inclusive at both ends
    pub fn around(avg_price: f64, lower: f64, upper: f64) -> Self {
        Self {
            min: avg_price * lower,
            max: avg_price * upper,
        }
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }
}

/// Read access to the product catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Products by id; ids without a matching product are simply absent from
    /// the result
    async fn find_by_ids(&self, ids: &[i32]) -> AppResult<Vec<Product>>;

    /// Most-reviewed products first: rating count descending, then rating
    /// rate descending
    async fn find_trending(&self, limit: i64) -> AppResult<Vec<Product>>;

    /// Products in a category, optionally price-banded, excluding the given
    /// ids, best-rated first (rating rate descending, then rating count)
    async fn find_by_category(
        &self,
        category: &str,
        price_band: Option<PriceBand>,
        exclude_ids: &[i32],
        limit: i64,
    ) -> AppResult<Vec<Product>>;
}

/// Postgres-backed product catalog
#[derive(Clone)]
pub struct PgProductCatalog {
    pool: PgPool,
}

impl PgProductCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const PRODUCT_COLUMNS: &str =
    "id, title, price, category, rating_rate, rating_count, description, image";

#[async_trait]
impl ProductCatalog for PgProductCatalog {
    async fn find_by_ids(&self, ids: &[i32]) -> AppResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn find_trending(&self, limit: i64) -> AppResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            ORDER BY rating_count DESC, rating_rate DESC
            LIMIT $1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn find_by_category(
        &self,
        category: &str,
        price_band: Option<PriceBand>,
        exclude_ids: &[i32],
        limit: i64,
    ) -> AppResult<Vec<Product>> {
        let (price_min, price_max) = match price_band {
            Some(band) => (Some(band.min), Some(band.max)),
            None => (None, None),
        };

        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE category = $1
              AND ($2::double precision IS NULL OR price >= $2)
              AND ($3::double precision IS NULL OR price <= $3)
              AND NOT (id = ANY($4))
            ORDER BY rating_rate DESC, rating_count DESC
            LIMIT $5
            "#
        ))
        .bind(category)
        .bind(price_min)
        .bind(price_max)
        .bind(exclude_ids)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_band_around_is_inclusive() {
        let band = PriceBand::around(100.0, 0.5, 1.5);
        assert_eq!(band.min, 50.0);
        assert_eq!(band.max, 150.0);

        assert!(band.contains(50.0));
        assert!(band.contains(150.0));
        assert!(band.contains(99.99));
        assert!(!band.contains(49.99));
        assert!(!band.contains(150.01));
    }
}
