use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("BSON error: {0}")]
    Bson(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(feature = "mongodb")]
impl From<mongodb::error::Error> for PersistError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[cfg(feature = "mongodb")]
impl From<bson::ser::Error> for PersistError {
    fn from(err: bson::ser::Error) -> Self {
        Self::Bson(err.to_string())
    }
}

#[cfg(feature = "mongodb")]
impl From<bson::de::Error> for PersistError {
    fn from(err: bson::de::Error) -> Self {
        Self::Bson(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PersistError>;
