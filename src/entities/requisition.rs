use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::schema::{EntitySchema, FieldDef, FieldKind, Relation};
use super::Entity;

/// A stock request raised against the pharmacy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requisition {
    #[serde(default)]
    pub id: Uuid,
    pub requisition_number: String,
    pub medication_id: Uuid,
    pub requested_by: String,
    pub quantity: i64,
    pub status: String,
    pub requested_on: DateTime<Utc>,
    pub approved_on: Option<DateTime<Utc>>,
}

static SCHEMA: EntitySchema = EntitySchema {
    name: "Requisition",
    route: "requisition",
    table: "requisition",
    fields: &[
        FieldDef::required("id", FieldKind::Uuid),
        FieldDef::required("requisitionNumber", FieldKind::Text),
        FieldDef::required("medicationId", FieldKind::Uuid),
        FieldDef::required("requestedBy", FieldKind::Text),
        FieldDef::required("quantity", FieldKind::Integer),
        FieldDef::required("status", FieldKind::Text),
        FieldDef::required("requestedOn", FieldKind::DateTime),
        FieldDef::optional("approvedOn", FieldKind::DateTime),
    ],
    relations: &[Relation { name: "medication", field: "medicationId", target: "Medication" }],
};

impl Entity for Requisition {
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
