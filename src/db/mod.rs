pub mod behavior;
pub mod catalog;
pub mod postgres;
pub mod redis;

pub use behavior::{BehaviorStore, PgBehaviorStore, ProductCount, UserOverlap};
pub use catalog::{PgProductCatalog, PriceBand, ProductCatalog};
pub use postgres::create_pool;
pub use redis::cache::{CacheWriterHandle, RecommendationCache, RedisRecommendationCache};
pub use redis::create_redis_client;
