pub mod entity_service;
pub mod patch;

pub use entity_service::{EntityService, ListRequest};

use std::fmt::Display;
use thiserror::Error;

use crate::database::DatabaseError;
use crate::filter::FilterError;

/// Outcome of a failed service call; controllers map every variant to a status
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl ServiceError {
    pub fn not_found(entity: &str, id: impl Display) -> Self {
        ServiceError::NotFound(format!("No {} found with id {}", entity, id))
    }
}

impl From<FilterError> for ServiceError {
    fn from(err: FilterError) -> Self {
        ServiceError::InvalidArgument(err.to_string())
    }
}
