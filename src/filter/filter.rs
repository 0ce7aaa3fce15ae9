use serde_json::Value;
use std::cmp::Ordering;

use crate::entities::{EntitySchema, FieldKind, FieldValue};

use super::error::FilterError;
use super::types::{FilterCriteria, FilterOperator, Predicate, ResolvedFilter, SearchTerm};

/// Binds filter criteria and a search term to an entity schema and evaluates
/// them against stored documents.
pub struct FilterService;

impl FilterService {
    /// Filters `rows`, keeping their order. All criteria and the search term are
    /// conjoined; empty criteria and an empty term keep every row.
    pub fn apply_filter(
        schema: &EntitySchema,
        rows: Vec<Value>,
        filters: &[FilterCriteria],
        search_term: Option<&str>,
    ) -> Result<Vec<Value>, FilterError> {
        let resolved = Self::resolve(schema, filters, search_term)?;
        Ok(resolved.apply(rows))
    }

    pub fn resolve(
        schema: &EntitySchema,
        filters: &[FilterCriteria],
        search_term: Option<&str>,
    ) -> Result<ResolvedFilter, FilterError> {
        let predicates = filters
            .iter()
            .map(|criteria| Self::resolve_criteria(schema, criteria))
            .collect::<Result<Vec<_>, _>>()?;

        let search = search_term
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|term| SearchTerm {
                term: term.to_string(),
                fields: schema.text_fields().copied().collect(),
            });

        Ok(ResolvedFilter { predicates, search })
    }

    fn resolve_criteria(schema: &EntitySchema, criteria: &FilterCriteria) -> Result<Predicate, FilterError> {
        let field = schema
            .field(&criteria.property_name)
            .copied()
            .ok_or_else(|| FilterError::UnknownProperty {
                entity: schema.name,
                property: criteria.property_name.clone(),
            })?;

        if criteria.operator.is_text_only() && field.kind != FieldKind::Text {
            return Err(FilterError::UnsupportedOperator {
                property: field.name.to_string(),
                operator: criteria.operator.as_str(),
                kind: field.kind,
            });
        }

        let value = match &criteria.value {
            Some(raw) => FieldValue::parse(field.kind, raw).ok_or_else(|| FilterError::InvalidValue {
                property: field.name.to_string(),
                value: raw.clone(),
                kind: field.kind,
            })?,
            None if matches!(criteria.operator, FilterOperator::Equal | FilterOperator::NotEqual) => {
                FieldValue::Null
            }
            None => {
                return Err(FilterError::InvalidValue {
                    property: field.name.to_string(),
                    value: "null".to_string(),
                    kind: field.kind,
                })
            }
        };

        Ok(Predicate { field, operator: criteria.operator, value })
    }
}

impl ResolvedFilter {
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty() && self.search.is_none()
    }

    pub fn apply(&self, rows: Vec<Value>) -> Vec<Value> {
        if self.is_empty() {
            return rows;
        }
        rows.into_iter().filter(|row| self.matches(row)).collect()
    }

    pub fn matches(&self, document: &Value) -> bool {
        self.predicates.iter().all(|p| p.matches(document))
            && self.search.as_ref().map_or(true, |s| s.matches(document))
    }
}

impl Predicate {
    pub fn matches(&self, document: &Value) -> bool {
        let actual = self.field.read(document);

        match self.operator {
            FilterOperator::Equal => actual == self.value,
            FilterOperator::NotEqual => actual != self.value,
            FilterOperator::GreaterThan => self.ordering(&actual) == Some(Ordering::Greater),
            FilterOperator::GreaterThanOrEqual => {
                matches!(self.ordering(&actual), Some(Ordering::Greater | Ordering::Equal))
            }
            FilterOperator::LessThan => self.ordering(&actual) == Some(Ordering::Less),
            FilterOperator::LessThanOrEqual => {
                matches!(self.ordering(&actual), Some(Ordering::Less | Ordering::Equal))
            }
            FilterOperator::Contains | FilterOperator::StartsWith | FilterOperator::EndsWith => {
                match (&actual, &self.value) {
                    (FieldValue::Text(haystack), FieldValue::Text(needle)) => {
                        let haystack = haystack.to_lowercase();
                        let needle = needle.to_lowercase();
                        match self.operator {
                            FilterOperator::Contains => haystack.contains(&needle),
                            FilterOperator::StartsWith => haystack.starts_with(&needle),
                            _ => haystack.ends_with(&needle),
                        }
                    }
                    _ => false,
                }
            }
        }
    }

    fn ordering(&self, actual: &FieldValue) -> Option<Ordering> {
        actual.partial_cmp_value(&self.value)
    }
}

impl SearchTerm {
    pub fn matches(&self, document: &Value) -> bool {
        let needle = self.term.to_lowercase();
        self.fields.iter().any(|field| match field.read(document) {
            FieldValue::Text(text) => text.to_lowercase().contains(&needle),
            _ => false,
        })
    }
}
