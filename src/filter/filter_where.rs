use crate::entities::{FieldDef, FieldKind};

use super::types::{FilterOperator, Predicate, ResolvedFilter, SearchTerm};

/// Compiles a resolved filter into a parameterised WHERE clause over the
/// `body` JSONB column. Identifiers come from the schema, values are always bound.
pub struct FilterWhere {
    param_values: Vec<String>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    pub fn generate(filter: &ResolvedFilter, starting_param_index: usize) -> (String, Vec<String>) {
        let mut filter_where = Self::new(starting_param_index);
        filter_where.build(filter)
    }

    fn build(&mut self, filter: &ResolvedFilter) -> (String, Vec<String>) {
        let mut sql_conditions: Vec<String> = filter
            .predicates
            .iter()
            .map(|p| self.build_predicate(p))
            .collect();
        if let Some(search) = &filter.search {
            sql_conditions.push(self.build_search(search));
        }

        let where_clause = if sql_conditions.is_empty() {
            "1=1".to_string()
        } else {
            sql_conditions.join(" AND ")
        };
        (where_clause, std::mem::take(&mut self.param_values))
    }

    fn build_predicate(&mut self, predicate: &Predicate) -> String {
        let column = field_expr(&predicate.field);
        let kind = predicate.field.kind;

        let value = match predicate.value.to_sql_param() {
            Some(v) => v,
            None => {
                return match predicate.operator {
                    FilterOperator::NotEqual => format!("{} IS NOT NULL", column),
                    _ => format!("{} IS NULL", column),
                };
            }
        };

        match predicate.operator {
            FilterOperator::Equal => format!("{} = {}", column, self.param(value, kind)),
            FilterOperator::NotEqual => format!("{} IS DISTINCT FROM {}", column, self.param(value, kind)),
            FilterOperator::GreaterThan => self.comparison(&column, ">", value, kind),
            FilterOperator::GreaterThanOrEqual => self.comparison(&column, ">=", value, kind),
            FilterOperator::LessThan => self.comparison(&column, "<", value, kind),
            FilterOperator::LessThanOrEqual => self.comparison(&column, "<=", value, kind),
            FilterOperator::Contains => {
                format!("{} ILIKE {}", column, self.text_param(format!("%{}%", escape_like(&value))))
            }
            FilterOperator::StartsWith => {
                format!("{} ILIKE {}", column, self.text_param(format!("{}%", escape_like(&value))))
            }
            FilterOperator::EndsWith => {
                format!("{} ILIKE {}", column, self.text_param(format!("%{}", escape_like(&value))))
            }
        }
    }

    fn comparison(&mut self, column: &str, op: &str, value: String, kind: FieldKind) -> String {
        let param = self.param(value, kind);
        if kind == FieldKind::Text {
            // Byte-wise ordering, same as the in-memory store
            format!("{} COLLATE \"C\" {} {}", column, op, param)
        } else {
            format!("{} {} {}", column, op, param)
        }
    }

    fn build_search(&mut self, search: &SearchTerm) -> String {
        if search.fields.is_empty() {
            return "1=0".to_string();
        }
        let param = self.text_param(format!("%{}%", escape_like(&search.term)));
        let parts: Vec<String> = search
            .fields
            .iter()
            .map(|f| format!("{} ILIKE {}", field_expr(f), param))
            .collect();
        format!("({})", parts.join(" OR "))
    }

    fn param(&mut self, value: String, kind: FieldKind) -> String {
        let placeholder = self.text_param(value);
        match kind.sql_cast() {
            Some(cast) => format!("{}::{}", placeholder, cast),
            None => placeholder,
        }
    }

    fn text_param(&mut self, value: String) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

/// `(body->>'field')` with the cast for the field kind
pub fn field_expr(field: &FieldDef) -> String {
    let raw = format!("(body->>'{}')", field.name.replace('\'', "''"));
    match field.kind.sql_cast() {
        Some(cast) => format!("{}::{}", raw, cast),
        None => raw,
    }
}

fn escape_like(value: &str) -> String {
    value.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}
