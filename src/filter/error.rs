use thiserror::Error;

use crate::entities::FieldKind;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Unknown property '{property}' on {entity}")]
    UnknownProperty { entity: &'static str, property: String },

    #[error("Unsupported operator: {0}")]
    UnknownOperator(String),

    #[error("Operator {operator} is not supported for {kind:?} property '{property}'")]
    UnsupportedOperator {
        property: String,
        operator: &'static str,
        kind: FieldKind,
    },

    #[error("Value '{value}' is not a valid {kind:?} for property '{property}'")]
    InvalidValue {
        property: String,
        value: String,
        kind: FieldKind,
    },

    #[error("Invalid sort order '{0}'. Use 'asc' or 'desc'")]
    InvalidSortOrder(String),

    #[error("Page size invalid: {0}")]
    InvalidPageSize(i64),

    #[error("Page number invalid: {0}")]
    InvalidPageNumber(i64),

    #[error("Invalid filters JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}
