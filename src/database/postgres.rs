use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgConnection, PgPool, Postgres, Transaction};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::entities::EntitySchema;
use crate::filter::{EntityQuery, FilterOrder, FilterWhere};

use super::manager::{quote_identifier, redact_url, DatabaseError, Session, Store};

/// Postgres store: one `(id UUID, body JSONB)` table per entity
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
        let redacted = redact_url(url)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Created database pool for: {}", redacted);
        Ok(Self { pool })
    }

    /// Create any missing entity tables
    pub async fn ensure_schema(&self, schemas: &[&EntitySchema]) -> Result<(), DatabaseError> {
        for schema in schemas {
            let sql = create_table_sql(schema);
            sqlx::query(&sql).execute(&self.pool).await?;
            info!("Ensured table {}", schema.table);
        }
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}

#[async_trait]
impl Store for PgStore {
    type Session = PgSession;

    async fn begin(&self) -> Result<PgSession, DatabaseError> {
        let tx = self.pool.begin().await?;
        Ok(PgSession { tx: Some(tx) })
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

/// A transaction; sqlx rolls it back if it is dropped before `commit`
pub struct PgSession {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgSession {
    fn conn(&mut self) -> Result<&mut PgConnection, DatabaseError> {
        let tx = self.tx.as_mut().ok_or(DatabaseError::SessionClosed)?;
        Ok(&mut **tx)
    }
}

#[async_trait]
impl Session for PgSession {
    async fn select(&mut self, schema: &EntitySchema, query: &EntityQuery) -> Result<Vec<Value>, DatabaseError> {
        let (sql, params) = select_sql(schema, query);

        let mut q = sqlx::query_scalar::<_, Value>(&sql);
        for p in params {
            q = q.bind(p);
        }
        let rows = q
            .bind(query.pagination.limit() as i64)
            .bind(query.pagination.offset() as i64)
            .fetch_all(self.conn()?)
            .await?;
        Ok(rows)
    }

    async fn find(&mut self, schema: &EntitySchema, id: Uuid) -> Result<Option<Value>, DatabaseError> {
        let sql = format!("SELECT body FROM {} WHERE id = $1", quote_identifier(schema.table));
        let row = sqlx::query_scalar::<_, Value>(&sql)
            .bind(id)
            .fetch_optional(self.conn()?)
            .await?;
        Ok(row)
    }

    async fn insert(&mut self, schema: &EntitySchema, id: Uuid, document: Value) -> Result<(), DatabaseError> {
        let sql = format!("INSERT INTO {} (id, body) VALUES ($1, $2)", quote_identifier(schema.table));
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(document)
            .execute(self.conn()?)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.as_database_error().map_or(false, |d| d.is_unique_violation()) => {
                Err(DatabaseError::Conflict(format!("{} {} already exists", schema.name, id)))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&mut self, schema: &EntitySchema, id: Uuid, document: Value) -> Result<bool, DatabaseError> {
        let sql = format!("UPDATE {} SET body = $2 WHERE id = $1", quote_identifier(schema.table));
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(document)
            .execute(self.conn()?)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&mut self, schema: &EntitySchema, id: Uuid) -> Result<bool, DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", quote_identifier(schema.table));
        let result = sqlx::query(&sql).bind(id).execute(self.conn()?).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn commit(&mut self) -> Result<(), DatabaseError> {
        let tx = self.tx.take().ok_or(DatabaseError::SessionClosed)?;
        tx.commit().await?;
        Ok(())
    }
}

fn create_table_sql(schema: &EntitySchema) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (id UUID PRIMARY KEY, body JSONB NOT NULL)",
        quote_identifier(schema.table)
    )
}

/// Page query; the caller binds `params`, then limit, then offset
fn select_sql(schema: &EntitySchema, query: &EntityQuery) -> (String, Vec<String>) {
    let (where_clause, params) = FilterWhere::generate(&query.filter, 0);
    let order_clause = FilterOrder::generate(query.sort.as_ref());
    let sql = format!(
        "SELECT body FROM {} WHERE {} {} LIMIT ${} OFFSET ${}",
        quote_identifier(schema.table),
        where_clause,
        order_clause,
        params.len() + 1,
        params.len() + 2
    );
    (sql, params)
}
