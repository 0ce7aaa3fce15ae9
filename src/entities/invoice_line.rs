use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::schema::{EntitySchema, FieldDef, FieldKind, Relation};
use super::Entity;

/// One billed line of an invoice, optionally for a dispensed medication
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    #[serde(default)]
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub medication_id: Option<Uuid>,
    pub description: String,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub discount: Option<Decimal>,
    pub line_total: Decimal,
}

static SCHEMA: EntitySchema = EntitySchema {
    name: "InvoiceLine",
    route: "invoiceline",
    table: "invoice_line",
    fields: &[
        FieldDef::required("id", FieldKind::Uuid),
        FieldDef::required("invoiceId", FieldKind::Uuid),
        FieldDef::optional("medicationId", FieldKind::Uuid),
        FieldDef::required("description", FieldKind::Text),
        FieldDef::required("quantity", FieldKind::Integer),
        FieldDef::required("unitPrice", FieldKind::Decimal),
        FieldDef::optional("discount", FieldKind::Decimal),
        FieldDef::required("lineTotal", FieldKind::Decimal),
    ],
    relations: &[Relation { name: "medication", field: "medicationId", target: "Medication" }],
};

impl Entity for InvoiceLine {
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
