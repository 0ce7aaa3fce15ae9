use serde::Serialize;
use uuid::Uuid;

/// Body of a successful create
#[derive(Debug, Serialize)]
pub struct IdResponse {
    pub id: Uuid,
}

/// Body of a successful update, patch or delete
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: bool,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self { status: true }
    }
}
