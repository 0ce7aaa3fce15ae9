use json_patch::Patch;
use serde_json::Value;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::database::Session;
use crate::entities::{schema_by_name, Entity, FieldValue, Record};
use crate::filter::{EntityQuery, FilterCriteria, FilterOrder, FilterService, Pagination};

use super::patch::apply_patch;
use super::ServiceError;

/// Parameters of a list request, as received from the caller
#[derive(Debug, Clone)]
pub struct ListRequest {
    pub filters: Vec<FilterCriteria>,
    pub search_term: Option<String>,
    pub page_number: i64,
    pub page_size: i64,
    pub sort_field: Option<String>,
    pub sort_order: Option<String>,
}

impl Default for ListRequest {
    fn default() -> Self {
        Self {
            filters: vec![],
            search_term: None,
            page_number: 1,
            page_size: 10,
            sort_field: None,
            sort_order: None,
        }
    }
}

/// CRUD operations for one entity type inside one session.
/// Mutations commit the session before returning.
pub struct EntityService<'s, T, C> {
    session: &'s mut C,
    _entity: PhantomData<fn() -> T>,
}

impl<'s, T: Entity, C: Session> EntityService<'s, T, C> {
    pub fn new(session: &'s mut C) -> Self {
        Self {
            session,
            _entity: PhantomData,
        }
    }

    /// One page of entities, each with its relations expanded
    pub async fn get(&mut self, request: &ListRequest) -> Result<Vec<Record<T>>, ServiceError> {
        let schema = T::schema();
        let pagination = Pagination::new(request.page_number, request.page_size)?;
        let filter = FilterService::resolve(schema, &request.filters, request.search_term.as_deref())?;
        let sort = FilterOrder::resolve(
            schema,
            request.sort_field.as_deref(),
            request.sort_order.as_deref(),
        )?;

        let query = EntityQuery { filter, sort, pagination };
        let rows = self.session.select(schema, &query).await?;
        debug!(
            "{}: page {} (size {}) returned {} row(s)",
            schema.name,
            pagination.page_number(),
            pagination.page_size(),
            rows.len()
        );

        let mut records = Vec::with_capacity(rows.len());
        for document in rows {
            records.push(self.expand(document).await?);
        }
        Ok(records)
    }

    /// The entity with its relations expanded, or `None` when no row has this id
    pub async fn get_by_id(&mut self, id: Uuid) -> Result<Option<Record<T>>, ServiceError> {
        let schema = T::schema();
        match self.session.find(schema, id).await? {
            Some(document) => Ok(Some(self.expand(document).await?)),
            None => Ok(None),
        }
    }

    /// Stores a new entity, assigning an id when the model carries the nil id
    pub async fn create(&mut self, mut model: T) -> Result<Uuid, ServiceError> {
        let schema = T::schema();
        if model.id().is_nil() {
            model.set_id(Uuid::new_v4());
        }
        let id = model.id();

        self.session.insert(schema, id, Self::encode(&model)?).await?;
        self.session.commit().await?;

        info!("Created {} {}", schema.name, id);
        Ok(id)
    }

    /// Full replacement. The row is keyed by the entity's own id; callers
    /// check that it agrees with `id`.
    pub async fn update(&mut self, id: Uuid, updated: T) -> Result<bool, ServiceError> {
        let schema = T::schema();
        let entity_id = updated.id();
        if entity_id != id {
            warn!("{} update for {} carries id {}", schema.name, id, entity_id);
        }

        if !self.session.update(schema, entity_id, Self::encode(&updated)?).await? {
            return Err(ServiceError::not_found(schema.name, entity_id));
        }
        self.session.commit().await?;

        info!("Updated {} {}", schema.name, entity_id);
        Ok(true)
    }

    pub async fn patch(&mut self, id: Uuid, operations: Option<Patch>) -> Result<bool, ServiceError> {
        let schema = T::schema();
        let operations = operations
            .ok_or_else(|| ServiceError::InvalidArgument("Patch document is missing".to_string()))?;

        let existing = match self.session.find(schema, id).await? {
            Some(document) => Self::decode(document)?,
            None => return Err(ServiceError::not_found(schema.name, id)),
        };
        let patched = apply_patch(&existing, &operations)?;

        if !self.session.update(schema, id, Self::encode(&patched)?).await? {
            return Err(ServiceError::not_found(schema.name, id));
        }
        self.session.commit().await?;

        info!("Patched {} {} ({} operation(s))", schema.name, id, operations.0.len());
        Ok(true)
    }

    pub async fn delete(&mut self, id: Uuid) -> Result<bool, ServiceError> {
        let schema = T::schema();
        if !self.session.delete(schema, id).await? {
            return Err(ServiceError::not_found(schema.name, id));
        }
        self.session.commit().await?;

        info!("Deleted {} {}", schema.name, id);
        Ok(true)
    }

    /// Decodes a stored document and looks up each related row. A null or
    /// dangling foreign key expands to `null`.
    async fn expand(&mut self, document: Value) -> Result<Record<T>, ServiceError> {
        let schema = T::schema();
        let mut related = BTreeMap::new();
        for relation in schema.relations {
            let target = schema_by_name(relation.target).ok_or_else(|| {
                ServiceError::InvalidArgument(format!("Unknown related entity {}", relation.target))
            })?;
            let value = match schema.field(relation.field).map(|f| f.read(&document)) {
                Some(FieldValue::Uuid(foreign_id)) => {
                    self.session.find(target, foreign_id).await?.unwrap_or(Value::Null)
                }
                _ => Value::Null,
            };
            related.insert(relation.name.to_string(), value);
        }

        Ok(Record {
            entity: Self::decode(document)?,
            related,
        })
    }

    fn encode(entity: &T) -> Result<Value, ServiceError> {
        Ok(serde_json::to_value(entity).map_err(crate::database::DatabaseError::from)?)
    }

    fn decode(document: Value) -> Result<T, ServiceError> {
        Ok(serde_json::from_value(document).map_err(crate::database::DatabaseError::from)?)
    }
}
