use serde_json::Value;

use crate::entities::{EntitySchema, FieldKind};

use super::error::FilterError;
use super::filter_where::field_expr;
use super::types::{SortDirection, SortSpec};

pub struct FilterOrder;

impl FilterOrder {
    /// Resolve `sortField`/`sortOrder`. The order is only checked when a field is given.
    pub fn resolve(
        schema: &EntitySchema,
        sort_field: Option<&str>,
        sort_order: Option<&str>,
    ) -> Result<Option<SortSpec>, FilterError> {
        let Some(field_name) = sort_field.map(str::trim).filter(|f| !f.is_empty()) else {
            return Ok(None);
        };

        let field = schema
            .field(field_name)
            .copied()
            .ok_or_else(|| FilterError::UnknownProperty {
                entity: schema.name,
                property: field_name.to_string(),
            })?;
        let direction = Self::parse_direction(sort_order.unwrap_or("asc"))?;

        Ok(Some(SortSpec { field, direction }))
    }

    pub fn parse_direction(order: &str) -> Result<SortDirection, FilterError> {
        let order = order.trim();
        if order.eq_ignore_ascii_case("asc") {
            Ok(SortDirection::Asc)
        } else if order.eq_ignore_ascii_case("desc") {
            Ok(SortDirection::Desc)
        } else {
            Err(FilterError::InvalidSortOrder(order.to_string()))
        }
    }

    /// Stable sort; rows that tie keep their incoming order
    pub fn apply(rows: &mut [Value], spec: Option<&SortSpec>) {
        let Some(spec) = spec else { return };
        rows.sort_by(|a, b| {
            let ordering = spec.field.read(a).sort_cmp(&spec.field.read(b));
            match spec.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }

    /// ORDER BY clause. Always ends with the primary key so pages stay disjoint.
    pub fn generate(spec: Option<&SortSpec>) -> String {
        match spec {
            Some(spec) => {
                let column = field_expr(&spec.field);
                let column = if spec.field.kind == FieldKind::Text {
                    format!("{} COLLATE \"C\"", column)
                } else {
                    column
                };
                format!("ORDER BY {} {}, \"id\" ASC", column, spec.direction.to_sql())
            }
            None => "ORDER BY \"id\" ASC".to_string(),
        }
    }
}
