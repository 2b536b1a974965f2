use async_trait::async_trait;
use chrono::Utc;
use journey_types::ChatMessage;
use mongodb::bson::{self, doc};
use mongodb::{Client, Collection};

use super::models::{MongoMessage, MongoThread};
use crate::error::Result;
use crate::store::{ConversationStore, Session, DEFAULT_THREAD_NAME};

/// One document per thread in `threads`, messages embedded in append order.
#[derive(Clone)]
pub struct MongoConversationStore {
    collection: Collection<MongoThread>,
}

impl MongoConversationStore {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("threads");
        Self { collection }
    }

    async fn find(&self, thread_id: &str) -> Result<Option<MongoThread>> {
        Ok(self.collection.find_one(doc! { "_id": thread_id }).await?)
    }
}

#[async_trait]
impl ConversationStore for MongoConversationStore {
    async fn get_or_create_session(&self, thread_id: &str) -> Result<Session> {
        if let Some(thread) = self.find(thread_id).await? {
            return thread.try_into();
        }

        let now = bson::to_bson(&Utc::now())?;
        self.collection
            .update_one(
                doc! { "_id": thread_id },
                doc! { "$setOnInsert": {
                    "thread_name": DEFAULT_THREAD_NAME,
                    "messages": [],
                    "created_at": now.clone(),
                    "updated_at": now,
                }},
            )
            .upsert(true)
            .await?;

        match self.find(thread_id).await? {
            Some(thread) => thread.try_into(),
            None => Ok(Session::new(thread_id)),
        }
    }

    async fn session(&self, thread_id: &str) -> Result<Option<Session>> {
        self.find(thread_id).await?.map(Session::try_from).transpose()
    }

    async fn append(&self, thread_id: &str, message: ChatMessage) -> Result<()> {
        let user_id = message.user_id.clone();
        let now = bson::to_bson(&Utc::now())?;
        let entry = bson::to_bson(&MongoMessage::from(message))?;

        self.collection
            .update_one(
                doc! { "_id": thread_id },
                doc! {
                    "$push": { "messages": entry },
                    "$set": { "updated_at": now.clone() },
                    "$setOnInsert": {
                        "thread_name": DEFAULT_THREAD_NAME,
                        "created_at": now,
                    },
                },
            )
            .upsert(true)
            .await?;

        if let Some(user_id) = user_id {
            self.collection
                .update_one(
                    doc! { "_id": thread_id, "user_id": null },
                    doc! { "$set": { "user_id": user_id } },
                )
                .await?;
        }
        Ok(())
    }

    async fn history(&self, thread_id: &str) -> Result<Vec<ChatMessage>> {
        match self.find(thread_id).await? {
            Some(thread) => Ok(Session::try_from(thread)?.messages),
            None => Ok(Vec::new()),
        }
    }

    async fn rename(&self, thread_id: &str, new_name: &str) -> Result<bool> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": thread_id },
                doc! { "$set": {
                    "thread_name": new_name,
                    "updated_at": bson::to_bson(&Utc::now())?,
                }},
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    fn backend_name(&self) -> &'static str {
        "mongodb"
    }
}
