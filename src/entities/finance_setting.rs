use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::schema::{EntitySchema, FieldDef, FieldKind};
use super::Entity;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceSetting {
    #[serde(default)]
    pub id: Uuid,
    pub name: String,
    pub currency_code: String,
    pub tax_rate: Decimal,
    /// 1-12
    pub fiscal_year_start_month: i64,
    pub is_default: bool,
    pub updated_on: Option<DateTime<Utc>>,
}

static SCHEMA: EntitySchema = EntitySchema {
    name: "FinanceSetting",
    route: "financesetting",
    table: "finance_setting",
    fields: &[
        FieldDef::required("id", FieldKind::Uuid),
        FieldDef::required("name", FieldKind::Text),
        FieldDef::required("currencyCode", FieldKind::Text),
        FieldDef::required("taxRate", FieldKind::Decimal),
        FieldDef::required("fiscalYearStartMonth", FieldKind::Integer),
        FieldDef::required("isDefault", FieldKind::Boolean),
        FieldDef::optional("updatedOn", FieldKind::DateTime),
    ],
    relations: &[],
};

impl Entity for FinanceSetting {
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
