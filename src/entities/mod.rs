pub mod schema;

pub mod finance_setting;
pub mod invoice_line;
pub mod medication;
pub mod notification;
pub mod patient_hospitalisation_history;
pub mod requisition;
pub mod visit_vital_template_parameter;

pub use finance_setting::FinanceSetting;
pub use invoice_line::InvoiceLine;
pub use medication::Medication;
pub use notification::Notification;
pub use patient_hospitalisation_history::PatientHospitalisationHistory;
pub use requisition::Requisition;
pub use schema::{EntitySchema, FieldDef, FieldKind, FieldValue, Relation};
pub use visit_vital_template_parameter::VisitVitalTemplateParameter;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;
use uuid::Uuid;

/// A record type served by the generic entity service and controller
pub trait Entity:
    Serialize + DeserializeOwned + Clone + Default + PartialEq + Send + Sync + Unpin + 'static
{
    fn schema() -> &'static EntitySchema;
    fn id(&self) -> Uuid;
    fn set_id(&mut self, id: Uuid);
}

/// An entity as returned by get-by-id and list, with its relations expanded inline
#[derive(Debug, Clone, Serialize)]
pub struct Record<T> {
    #[serde(flatten)]
    pub entity: T,
    #[serde(flatten)]
    pub related: BTreeMap<String, Value>,
}

#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("{entity}: missing non-null uuid field 'id'")]
    MissingId { entity: &'static str },

    #[error("{entity}: duplicate field '{field}'")]
    DuplicateField { entity: &'static str, field: &'static str },

    #[error("{entity}: declared fields {declared:?} do not match serialized fields {actual:?}")]
    FieldMismatch {
        entity: &'static str,
        declared: Vec<String>,
        actual: Vec<String>,
    },

    #[error("{entity}: relation '{relation}' uses '{field}', which is not a uuid field")]
    InvalidRelationField {
        entity: &'static str,
        relation: &'static str,
        field: &'static str,
    },

    #[error("{entity}: relation '{relation}' targets unknown entity '{target}'")]
    UnknownRelationTarget {
        entity: &'static str,
        relation: &'static str,
        target: &'static str,
    },

    #[error("duplicate entity route '{0}'")]
    DuplicateRoute(&'static str),
}

/// Every entity the API serves
pub fn schemas() -> [&'static EntitySchema; 7] {
    [
        FinanceSetting::schema(),
        InvoiceLine::schema(),
        Medication::schema(),
        Notification::schema(),
        PatientHospitalisationHistory::schema(),
        VisitVitalTemplateParameter::schema(),
        Requisition::schema(),
    ]
}

pub fn schema_by_name(name: &str) -> Option<&'static EntitySchema> {
    schemas().into_iter().find(|s| s.name.eq_ignore_ascii_case(name))
}

/// Checks the whole registry. Run once at startup so a bad field name
/// fails the boot instead of a request.
pub fn validate_registry() -> Result<(), SchemaError> {
    validate_entity::<FinanceSetting>()?;
    validate_entity::<InvoiceLine>()?;
    validate_entity::<Medication>()?;
    validate_entity::<Notification>()?;
    validate_entity::<PatientHospitalisationHistory>()?;
    validate_entity::<VisitVitalTemplateParameter>()?;
    validate_entity::<Requisition>()?;

    let mut routes = HashSet::new();
    for schema in schemas() {
        if !routes.insert(schema.route) {
            return Err(SchemaError::DuplicateRoute(schema.route));
        }
        validate_relations(schema, |target| schema_by_name(target).is_some())?;
    }
    Ok(())
}

pub fn validate_entity<T: Entity>() -> Result<(), SchemaError> {
    let schema = T::schema();
    validate_fields(schema)?;

    // The declared fields must be exactly what the type serializes
    let document = serde_json::to_value(T::default()).unwrap_or(Value::Object(Map::new()));
    let mut actual: Vec<String> = document
        .as_object()
        .map(|o| o.keys().cloned().collect())
        .unwrap_or_default();
    let mut declared: Vec<String> = schema.fields.iter().map(|f| f.name.to_string()).collect();
    actual.sort();
    declared.sort();
    if actual != declared {
        return Err(SchemaError::FieldMismatch { entity: schema.name, declared, actual });
    }
    Ok(())
}

fn validate_fields(schema: &EntitySchema) -> Result<(), SchemaError> {
    match schema.field("id") {
        Some(f) if f.kind == FieldKind::Uuid && !f.nullable => {}
        _ => return Err(SchemaError::MissingId { entity: schema.name }),
    }

    let mut seen = HashSet::new();
    for field in schema.fields {
        if !seen.insert(field.name.to_ascii_lowercase()) {
            return Err(SchemaError::DuplicateField { entity: schema.name, field: field.name });
        }
    }
    Ok(())
}

fn validate_relations(
    schema: &EntitySchema,
    target_exists: impl Fn(&str) -> bool,
) -> Result<(), SchemaError> {
    for relation in schema.relations {
        match schema.field(relation.field) {
            Some(f) if f.kind == FieldKind::Uuid => {}
            _ => {
                return Err(SchemaError::InvalidRelationField {
                    entity: schema.name,
                    relation: relation.name,
                    field: relation.field,
                })
            }
        }
        if !target_exists(relation.target) {
            return Err(SchemaError::UnknownRelationTarget {
                entity: schema.name,
                relation: relation.name,
                target: relation.target,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Drifted {
        id: Uuid,
        label: String,
    }

    static DRIFTED: EntitySchema = EntitySchema {
        name: "Drifted",
        route: "drifted",
        table: "drifted",
        fields: &[
            FieldDef::required("id", FieldKind::Uuid),
            FieldDef::required("title", FieldKind::Text),
        ],
        relations: &[],
    };

    impl Entity for Drifted {
        fn schema() -> &'static EntitySchema {
            &DRIFTED
        }
        fn id(&self) -> Uuid {
            self.id
        }
        fn set_id(&mut self, id: Uuid) {
            self.id = id;
        }
    }

    static DANGLING: EntitySchema = EntitySchema {
        name: "Dangling",
        route: "dangling",
        table: "dangling",
        fields: &[
            FieldDef::required("id", FieldKind::Uuid),
            FieldDef::optional("ownerId", FieldKind::Uuid),
            FieldDef::required("ownerName", FieldKind::Text),
        ],
        relations: &[
            Relation { name: "owner", field: "ownerId", target: "Owner" },
            Relation { name: "byName", field: "ownerName", target: "Medication" },
        ],
    };

    #[test]
    fn registry_is_valid() {
        assert_eq!(validate_registry(), Ok(()));
    }

    #[test]
    fn rejects_schema_that_drifted_from_type() {
        match validate_entity::<Drifted>() {
            Err(SchemaError::FieldMismatch { entity, declared, actual }) => {
                assert_eq!(entity, "Drifted");
                assert_eq!(declared, vec!["id", "title"]);
                assert_eq!(actual, vec!["id", "label"]);
            }
            other => panic!("expected mismatch, got {:?}", other),
        }
    }

    #[test]
    fn rejects_dangling_relations() {
        let err = validate_relations(&DANGLING, |t| schema_by_name(t).is_some()).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownRelationTarget { target: "Owner", .. }));

        let err = validate_relations(&DANGLING, |_| true).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidRelationField { field: "ownerName", .. }));
    }

    #[test]
    fn field_lookup_ignores_case() {
        let schema = Medication::schema();
        assert_eq!(schema.field("Name").map(|f| f.name), Some("name"));
        assert_eq!(schema.field("UNITPRICE").map(|f| f.kind), Some(FieldKind::Decimal));
        assert!(schema.field("colour").is_none());
    }
}
