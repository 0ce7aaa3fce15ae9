use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::entities::{FieldDef, FieldValue};

use super::error::FilterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Contains,
    StartsWith,
    EndsWith,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 9] = [
        FilterOperator::Equal,
        FilterOperator::NotEqual,
        FilterOperator::GreaterThan,
        FilterOperator::GreaterThanOrEqual,
        FilterOperator::LessThan,
        FilterOperator::LessThanOrEqual,
        FilterOperator::Contains,
        FilterOperator::StartsWith,
        FilterOperator::EndsWith,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Equal => "Equal",
            FilterOperator::NotEqual => "NotEqual",
            FilterOperator::GreaterThan => "GreaterThan",
            FilterOperator::GreaterThanOrEqual => "GreaterThanOrEqual",
            FilterOperator::LessThan => "LessThan",
            FilterOperator::LessThanOrEqual => "LessThanOrEqual",
            FilterOperator::Contains => "Contains",
            FilterOperator::StartsWith => "StartsWith",
            FilterOperator::EndsWith => "EndsWith",
        }
    }

    /// Substring operators only apply to text fields
    pub fn is_text_only(&self) -> bool {
        matches!(
            self,
            FilterOperator::Contains | FilterOperator::StartsWith | FilterOperator::EndsWith
        )
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterOperator::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FilterError::UnknownOperator(s.to_string()))
    }
}

impl Serialize for FilterOperator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FilterOperator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One `{PropertyName, Operator, Value}` predicate from the `filters` query parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(rename = "PropertyName", alias = "propertyName")]
    pub property_name: String,
    #[serde(rename = "Operator", alias = "operator")]
    pub operator: FilterOperator,
    #[serde(
        rename = "Value",
        alias = "value",
        default,
        deserialize_with = "deserialize_scalar"
    )]
    pub value: Option<String>,
}

impl FilterCriteria {
    pub fn new(property_name: impl Into<String>, operator: FilterOperator, value: impl Into<String>) -> Self {
        Self {
            property_name: property_name.into(),
            operator,
            value: Some(value.into()),
        }
    }

    /// Parse the JSON array form: `[{"PropertyName": "...", "Operator": "Equal", "Value": "..."}]`
    pub fn parse_list(json: &str) -> Result<Vec<FilterCriteria>, FilterError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Numbers and booleans are accepted as values and kept in their text form
fn deserialize_scalar<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "filter value must be a scalar, got {}",
            other
        ))),
    }
}

/// A criterion bound to a schema field with its value coerced to the field kind
#[derive(Debug, Clone)]
pub struct Predicate {
    pub field: FieldDef,
    pub operator: FilterOperator,
    pub value: FieldValue,
}

#[derive(Debug, Clone)]
pub struct SearchTerm {
    pub term: String,
    pub fields: Vec<FieldDef>,
}

/// Validated filter ready for evaluation or SQL generation
#[derive(Debug, Clone, Default)]
pub struct ResolvedFilter {
    pub predicates: Vec<Predicate>,
    pub search: Option<SearchTerm>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC NULLS FIRST",
            SortDirection::Desc => "DESC NULLS LAST",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SortSpec {
    pub field: FieldDef,
    pub direction: SortDirection,
}
