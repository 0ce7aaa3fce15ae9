use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::entities::EntitySchema;
use crate::filter::EntityQuery;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Session already closed")]
    SessionClosed,

    #[error("Stored document could not be read: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Connectivity failures as opposed to failures of the statement itself
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            DatabaseError::Sqlx(sqlx::Error::PoolTimedOut)
                | DatabaseError::Sqlx(sqlx::Error::PoolClosed)
                | DatabaseError::Sqlx(sqlx::Error::Io(_))
        )
    }
}

/// Persistence context. Hands out one session per unit of work.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    type Session: Session + 'static;

    async fn begin(&self) -> Result<Self::Session, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;

    fn backend(&self) -> &'static str;
}

/// One unit of work against the store. Writes become visible to other
/// sessions on `commit`; a session dropped before that rolls back.
#[async_trait]
pub trait Session: Send {
    /// One page of documents matching the query, in query order
    async fn select(&mut self, schema: &EntitySchema, query: &EntityQuery) -> Result<Vec<Value>, DatabaseError>;

    async fn find(&mut self, schema: &EntitySchema, id: Uuid) -> Result<Option<Value>, DatabaseError>;

    /// Fails with `Conflict` when the id is taken
    async fn insert(&mut self, schema: &EntitySchema, id: Uuid, document: Value) -> Result<(), DatabaseError>;

    /// Replaces the stored document; `false` when no row has this id
    async fn update(&mut self, schema: &EntitySchema, id: Uuid, document: Value) -> Result<bool, DatabaseError>;

    /// `false` when no row has this id
    async fn delete(&mut self, schema: &EntitySchema, id: Uuid) -> Result<bool, DatabaseError>;

    async fn commit(&mut self) -> Result<(), DatabaseError>;
}

/// Quote SQL identifier to prevent injection
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Database URL with the password masked, for logs
pub fn redact_url(raw: &str) -> Result<String, DatabaseError> {
    let mut url = url::Url::parse(raw).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
    if url.password().is_some() {
        url.set_password(Some("***"))
            .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
    }
    Ok(url.into())
}
