use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::schema::{EntitySchema, FieldDef, FieldKind};
use super::Entity;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(default)]
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub title: String,
    pub message: String,
    pub priority: i64,
    pub is_read: bool,
    pub created_on: DateTime<Utc>,
    pub read_on: Option<DateTime<Utc>>,
}

static SCHEMA: EntitySchema = EntitySchema {
    name: "Notification",
    route: "notification",
    table: "notification",
    fields: &[
        FieldDef::required("id", FieldKind::Uuid),
        FieldDef::required("recipientId", FieldKind::Uuid),
        FieldDef::required("title", FieldKind::Text),
        FieldDef::required("message", FieldKind::Text),
        FieldDef::required("priority", FieldKind::Integer),
        FieldDef::required("isRead", FieldKind::Boolean),
        FieldDef::required("createdOn", FieldKind::DateTime),
        FieldDef::optional("readOn", FieldKind::DateTime),
    ],
    relations: &[],
};

impl Entity for Notification {
    fn schema() -> &'static EntitySchema {
        &SCHEMA
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
}
