mod conversations;
mod hashes;
mod models;

pub use conversations::MongoConversationStore;
pub use hashes::MongoHashStore;

use mongodb::Client;

use crate::error::{PersistError, Result};

/// Connect once and share the client between both stores.
pub async fn connect(mongodb_uri: &str) -> Result<Client> {
    Client::with_uri_str(mongodb_uri)
        .await
        .map_err(|e| PersistError::Connection(e.to_string()))
}
