use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::str::FromStr;
use uuid::Uuid;

/// Storage-independent type of an entity field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Integer,
    Decimal,
    Boolean,
    Uuid,
    DateTime,
}

impl FieldKind {
    /// Postgres cast applied to `body->>'field'` when comparing or ordering
    pub fn sql_cast(&self) -> Option<&'static str> {
        match self {
            FieldKind::Text => None,
            FieldKind::Integer => Some("bigint"),
            FieldKind::Decimal => Some("numeric"),
            FieldKind::Boolean => Some("boolean"),
            FieldKind::Uuid => Some("uuid"),
            FieldKind::DateTime => Some("timestamptz"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
    pub nullable: bool,
}

impl FieldDef {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, nullable: false }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, nullable: true }
    }

    /// Read this field out of a stored document
    pub fn read(&self, document: &Value) -> FieldValue {
        document
            .get(self.name)
            .map(|v| FieldValue::from_json(self.kind, v))
            .unwrap_or(FieldValue::Null)
    }
}

/// A foreign key expanded by "include related" lookups
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Relation {
    /// Key the related document is embedded under
    pub name: &'static str,
    /// Uuid field holding the foreign key
    pub field: &'static str,
    /// Entity name of the target
    pub target: &'static str,
}

#[derive(Debug, Serialize)]
pub struct EntitySchema {
    pub name: &'static str,
    pub route: &'static str,
    pub table: &'static str,
    pub fields: &'static [FieldDef],
    pub relations: &'static [Relation],
}

impl EntitySchema {
    /// Case-insensitive field lookup, so `Name` and `name` bind to the same field
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        let name = name.trim();
        self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn text_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.kind == FieldKind::Text)
    }
}

/// Typed value of a field, used for predicates and ordering
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Integer(i64),
    Decimal(Decimal),
    Boolean(bool),
    Uuid(Uuid),
    DateTime(DateTime<Utc>),
}

impl FieldValue {
    /// Coerce a filter value string to the given kind
    pub fn parse(kind: FieldKind, raw: &str) -> Option<Self> {
        let raw_trimmed = raw.trim();
        match kind {
            FieldKind::Text => Some(FieldValue::Text(raw.to_string())),
            FieldKind::Integer => raw_trimmed.parse().ok().map(FieldValue::Integer),
            FieldKind::Decimal => Decimal::from_str(raw_trimmed)
                .or_else(|_| Decimal::from_scientific(raw_trimmed))
                .ok()
                .map(FieldValue::Decimal),
            FieldKind::Boolean => match raw_trimmed.to_ascii_lowercase().as_str() {
                "true" | "1" => Some(FieldValue::Boolean(true)),
                "false" | "0" => Some(FieldValue::Boolean(false)),
                _ => None,
            },
            FieldKind::Uuid => Uuid::parse_str(raw_trimmed).ok().map(FieldValue::Uuid),
            FieldKind::DateTime => parse_datetime(raw_trimmed).map(FieldValue::DateTime),
        }
    }

    /// Read a stored JSON value as the given kind. Shapes that do not match
    /// the kind read as null.
    pub fn from_json(kind: FieldKind, value: &Value) -> Self {
        let parsed = match (kind, value) {
            (_, Value::Null) => None,
            (FieldKind::Text, Value::String(s)) => Some(FieldValue::Text(s.clone())),
            (FieldKind::Integer, Value::Number(n)) => n.as_i64().map(FieldValue::Integer),
            (FieldKind::Decimal, Value::Number(n)) => Self::parse(kind, &n.to_string()),
            (FieldKind::Boolean, Value::Bool(b)) => Some(FieldValue::Boolean(*b)),
            (FieldKind::Text, _) | (FieldKind::Boolean, _) | (FieldKind::Integer, _) => None,
            (_, Value::String(s)) => Self::parse(kind, s),
            _ => None,
        };
        parsed.unwrap_or(FieldValue::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Total order used for sorting: null sorts before every value.
    /// Values of different kinds never meet inside one field.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (FieldValue::Null, FieldValue::Null) => Ordering::Equal,
            (FieldValue::Null, _) => Ordering::Less,
            (_, FieldValue::Null) => Ordering::Greater,
            _ => self.partial_cmp_value(other).unwrap_or(Ordering::Equal),
        }
    }

    /// Comparison for predicates; `None` when either side is null
    pub fn partial_cmp_value(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => Some(a.cmp(b)),
            (FieldValue::Integer(a), FieldValue::Integer(b)) => Some(a.cmp(b)),
            (FieldValue::Decimal(a), FieldValue::Decimal(b)) => Some(a.cmp(b)),
            (FieldValue::Boolean(a), FieldValue::Boolean(b)) => Some(a.cmp(b)),
            (FieldValue::Uuid(a), FieldValue::Uuid(b)) => Some(a.cmp(b)),
            (FieldValue::DateTime(a), FieldValue::DateTime(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Parameter text bound into SQL, cast server-side to the field kind
    pub fn to_sql_param(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Integer(i) => Some(i.to_string()),
            FieldValue::Decimal(d) => Some(d.to_string()),
            FieldValue::Boolean(b) => Some(b.to_string()),
            FieldValue::Uuid(u) => Some(u.to_string()),
            FieldValue::DateTime(dt) => Some(dt.to_rfc3339()),
        }
    }
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // Bare dates mean midnight UTC
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
