use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::schema::{EntitySchema, FieldDef, FieldKind};
use super::Entity;

/// One vital sign captured by a visit template, with its accepted range
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitVitalTemplateParameter {
    #[serde(default)]
    pub id: Uuid,
    pub template_name: String,
    pub parameter_name: String,
    pub unit: Option<String>,
    pub minimum_value: Option<Decimal>,
    pub maximum_value: Option<Decimal>,
    pub sequence: i64,
    pub is_mandatory: bool,
}

static SCHEMA: EntitySchema = EntitySchema {
    name: "VisitVitalTemplateParameter",
    route: "visitvitaltemplateparameter",
    table: "visit_vital_template_parameter",
    fields: &[
        FieldDef::required("id", FieldKind::Uuid),
        FieldDef::required("templateName", FieldKind::Text),
        FieldDef::required("parameterName", FieldKind::Text),
        FieldDef::optional("unit", FieldKind::Text),
        FieldDef::optional("minimumValue", FieldKind::Decimal),
        FieldDef::optional("maximumValue", FieldKind::Decimal),
        FieldDef::required("sequence", FieldKind::Integer),
        FieldDef::required("isMandatory", FieldKind::Boolean),
    ],
    relations: &[],
};

impl Entity for VisitVitalTemplateParameter {
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
