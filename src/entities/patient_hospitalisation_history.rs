use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::schema::{EntitySchema, FieldDef, FieldKind};
use super::Entity;

/// A past admission of a patient, reported at intake
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientHospitalisationHistory {
    #[serde(default)]
    pub id: Uuid,
    pub patient_id: Uuid,
    pub hospital_name: String,
    pub reason: String,
    pub admission_date: DateTime<Utc>,
    pub discharge_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

static SCHEMA: EntitySchema = EntitySchema {
    name: "PatientHospitalisationHistory",
    route: "patienthospitalisationhistory",
    table: "patient_hospitalisation_history",
    fields: &[
        FieldDef::required("id", FieldKind::Uuid),
        FieldDef::required("patientId", FieldKind::Uuid),
        FieldDef::required("hospitalName", FieldKind::Text),
        FieldDef::required("reason", FieldKind::Text),
        FieldDef::required("admissionDate", FieldKind::DateTime),
        FieldDef::optional("dischargeDate", FieldKind::DateTime),
        FieldDef::optional("notes", FieldKind::Text),
    ],
    relations: &[],
};

impl Entity for PatientHospitalisationHistory {
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
