use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::entities::EntitySchema;
use crate::filter::{EntityQuery, FilterOrder};

use super::manager::{DatabaseError, Session, Store};

type Tables = HashMap<&'static str, BTreeMap<Uuid, Value>>;

/// Process-local store. Sessions run one at a time; rows are kept in id order.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    type Session = MemorySession;

    async fn begin(&self) -> Result<MemorySession, DatabaseError> {
        let tables = self.tables.clone().lock_owned().await;
        Ok(MemorySession {
            tables,
            journal: Vec::new(),
        })
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

struct Undo {
    table: &'static str,
    id: Uuid,
    previous: Option<Value>,
}

pub struct MemorySession {
    tables: OwnedMutexGuard<Tables>,
    journal: Vec<Undo>,
}

impl MemorySession {
    fn table(&mut self, schema: &EntitySchema) -> &mut BTreeMap<Uuid, Value> {
        self.tables.entry(schema.table).or_default()
    }

    fn record(&mut self, table: &'static str, id: Uuid, previous: Option<Value>) {
        self.journal.push(Undo { table, id, previous });
    }
}

#[async_trait]
impl Session for MemorySession {
    async fn select(&mut self, schema: &EntitySchema, query: &EntityQuery) -> Result<Vec<Value>, DatabaseError> {
        let rows: Vec<Value> = self
            .tables
            .get(schema.table)
            .map(|t| t.values().cloned().collect())
            .unwrap_or_default();

        let mut rows = query.filter.apply(rows);
        FilterOrder::apply(&mut rows, query.sort.as_ref());

        let offset = usize::try_from(query.pagination.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.pagination.limit()).unwrap_or(usize::MAX);
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    async fn find(&mut self, schema: &EntitySchema, id: Uuid) -> Result<Option<Value>, DatabaseError> {
        Ok(self.tables.get(schema.table).and_then(|t| t.get(&id)).cloned())
    }

    async fn insert(&mut self, schema: &EntitySchema, id: Uuid, document: Value) -> Result<(), DatabaseError> {
        let table = self.table(schema);
        if table.contains_key(&id) {
            return Err(DatabaseError::Conflict(format!("{} {} already exists", schema.name, id)));
        }
        table.insert(id, document);
        self.record(schema.table, id, None);
        Ok(())
    }

    async fn update(&mut self, schema: &EntitySchema, id: Uuid, document: Value) -> Result<bool, DatabaseError> {
        let previous = match self.table(schema).get_mut(&id) {
            Some(slot) => std::mem::replace(slot, document),
            None => return Ok(false),
        };
        self.record(schema.table, id, Some(previous));
        Ok(true)
    }

    async fn delete(&mut self, schema: &EntitySchema, id: Uuid) -> Result<bool, DatabaseError> {
        match self.table(schema).remove(&id) {
            Some(previous) => {
                self.record(schema.table, id, Some(previous));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn commit(&mut self) -> Result<(), DatabaseError> {
        self.journal.clear();
        Ok(())
    }
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        if self.journal.is_empty() {
            return;
        }
        tracing::debug!("Rolling back {} uncommitted change(s)", self.journal.len());
        while let Some(undo) = self.journal.pop() {
            let table = self.tables.entry(undo.table).or_default();
            match undo.previous {
                Some(previous) => {
                    table.insert(undo.id, previous);
                }
                None => {
                    table.remove(&undo.id);
                }
            }
        }
    }
}
