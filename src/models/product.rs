use serde::{Deserialize, Serialize};

/// A catalog product as stored in the product table
///
/// Read-only from the recommendation pipeline's perspective; ownership of the
/// catalog (CRUD, imports) lives outside this service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: i32,
    pub title: String,
    pub price: f64,
    pub category: String,
    pub rating_rate: f64,
    pub rating_count: i32,
    pub description: String,
    pub image: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_serde_round_trip() {
        let product = Product {
            id: 7,
            title: "Mens Cotton Jacket".to_string(),
            price: 55.99,
            category: "men's clothing".to_string(),
            rating_rate: 4.7,
            rating_count: 500,
            description: "Great outerwear jacket".to_string(),
            image: "https://example.com/jacket.jpg".to_string(),
        };

        let json = serde_json::to_string(&product).unwrap();
        let decoded: Product = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, product);
    }
}
