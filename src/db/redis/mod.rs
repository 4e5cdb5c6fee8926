pub mod cache;

use redis::Client;

/// Creates a Redis client for the recommendation cache
///
/// Connection pooling comes from the connection-manager feature.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}
