use mongodb::bson;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Mongo error: {0}")]
    MongoError(#[from] mongodb::error::Error),

    #[error("BSON serialization error: {0}")]
    BsonError(#[from] bson::ser::Error),

    #[error("Failed to serialize document: {0}")]
    FailedToSerializeDocument(String),

    /// A guarded update matched no document: the record changed underneath
    /// the caller (e.g. a concurrent state transition) or does not exist.
    #[error("Conditional update matched no document: {0}")]
    UpdateFailed(String),
}
