pub mod dbs;
pub mod error;
pub mod files;
pub mod hash;
pub mod memory;
pub mod store;

pub use error::{PersistError, Result};
pub use files::JsonTable;
pub use hash::HashStore;
pub use memory::{InMemoryConversationStore, InMemoryHashStore};
pub use store::{ConversationStore, Session, DEFAULT_THREAD_NAME};

#[cfg(feature = "mongodb")]
pub use dbs::mongo::{MongoConversationStore, MongoHashStore};
