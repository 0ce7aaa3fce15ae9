use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::schema::{EntitySchema, FieldDef, FieldKind};
use super::Entity;

/// A stocked drug product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    #[serde(default)]
    pub id: Uuid,
    pub name: String,
    pub generic_name: Option<String>,
    pub strength: String,
    pub form: String,
    pub unit_price: Decimal,
    pub stock_quantity: i64,
    pub is_active: bool,
}

static SCHEMA: EntitySchema = EntitySchema {
    name: "Medication",
    route: "medication",
    table: "medication",
    fields: &[
        FieldDef::required("id", FieldKind::Uuid),
        FieldDef::required("name", FieldKind::Text),
        FieldDef::optional("genericName", FieldKind::Text),
        FieldDef::required("strength", FieldKind::Text),
        FieldDef::required("form", FieldKind::Text),
        FieldDef::required("unitPrice", FieldKind::Decimal),
        FieldDef::required("stockQuantity", FieldKind::Integer),
        FieldDef::required("isActive", FieldKind::Boolean),
    ],
    relations: &[],
};

impl Entity for Medication {
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
