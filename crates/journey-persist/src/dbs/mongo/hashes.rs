use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::{Client, Collection};

use super::models::HashEntry;
use crate::error::Result;
use crate::hash::HashStore;

#[derive(Clone)]
pub struct MongoHashStore {
    collection: Collection<HashEntry>,
}

impl MongoHashStore {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("hashes");
        Self { collection }
    }
}

#[async_trait]
impl HashStore for MongoHashStore {
    async fn hset(&self, bucket: &str, key: &str, value: String) -> Result<()> {
        let entry = HashEntry::new(bucket, key, value);
        self.collection
            .replace_one(doc! { "_id": &entry.id }, &entry)
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn hget(&self, bucket: &str, key: &str) -> Result<Option<String>> {
        let id = format!("{}:{}", bucket, key);
        let entry = self.collection.find_one(doc! { "_id": id }).await?;
        Ok(entry.map(|e| e.value))
    }

    async fn hgetall(&self, bucket: &str) -> Result<Vec<(String, String)>> {
        let entries: Vec<HashEntry> = self
            .collection
            .find(doc! { "bucket": bucket })
            .sort(doc! { "key": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(entries.into_iter().map(|e| (e.key, e.value)).collect())
    }
}
