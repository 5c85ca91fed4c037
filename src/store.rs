//! Document store interface used by the request handlers.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

/// Collection holding every review document.
pub const REVIEWS_COLLECTION: &str = "reviews";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to write record: {0}")]
    WriteFailed(String),

    #[error("Failed to read records: {0}")]
    ReadFailed(String),

    #[error("Invalid field name: {0}")]
    InvalidField(String),

    #[error("Corrupt record {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

/// A stored record with its store-assigned id and creation time.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub data: Map<String, Value>,
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Persists one immutable record. The store assigns a unique id and the
    /// creation timestamp at write time.
    async fn append(
        &self,
        collection: &str,
        record: Map<String, Value>,
    ) -> Result<Document, StoreError>;

    /// All records in `collection` whose `field` equals `value`, in no
    /// particular order.
    async fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>, StoreError>;
}

/// Field names end up inside a JSON path, so only plain identifiers pass.
pub fn check_field_name(field: &str) -> Result<(), StoreError> {
    if !field.is_empty() && field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(StoreError::InvalidField(field.to_string()))
    }
}
