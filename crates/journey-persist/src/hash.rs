use async_trait::async_trait;

use crate::error::Result;

/// Durable bucketed key-value hash. Writing an existing key overwrites it.
#[async_trait]
pub trait HashStore: Send + Sync {
    async fn hset(&self, bucket: &str, key: &str, value: String) -> Result<()>;

    async fn hget(&self, bucket: &str, key: &str) -> Result<Option<String>>;

    /// All `(key, value)` pairs in a bucket, ordered by key.
    async fn hgetall(&self, bucket: &str) -> Result<Vec<(String, String)>>;
}
