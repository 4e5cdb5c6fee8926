use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use shoprec_api::{
    config::{Config, RecommenderConfig},
    db::{create_pool, create_redis_client, PgBehaviorStore, PgProductCatalog, RedisRecommendationCache},
    routes::{create_router, AppState},
    services::{OpenAiExplainer, Recommender},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("shoprec_api=debug,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;
    let recommender_config = RecommenderConfig::default();

    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!().run(&pool).await?;

    let redis_client = create_redis_client(&config.redis_url)?;
    let (cache, cache_writer) =
        RedisRecommendationCache::new(redis_client, recommender_config.cache_ttl).await;

    let behavior = Arc::new(PgBehaviorStore::new(pool.clone()));
    let catalog = Arc::new(PgProductCatalog::new(pool));
    let explainer = Arc::new(OpenAiExplainer::new(
        config.openai_api_key.clone(),
        config.openai_api_url.clone(),
    ));

    let recommender = Recommender::new(behavior.clone(), catalog, recommender_config);

    let state = AppState {
        recommender,
        behavior,
        cache: Arc::new(cache),
        explainer,
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Flush any queued cache writes before exiting
    cache_writer.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
