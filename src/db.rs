use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use log::{debug, error, info};
use rusqlite::{params, Connection};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::store::{check_field_name, Document, ReviewStore, StoreError};

// SQLite-backed document store
#[derive(Debug)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    // Open (or create) the database at `db_path`; ":memory:" works for tests
    pub fn new(db_path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(db_path).map_err(|e| {
            error!("[DB] Failed to open database at {}: {}", db_path, e);
            StoreError::Unavailable(e.to_string())
        })?;
        info!("[DB] Database connection established at: {}", db_path);
        Ok(Database {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub async fn create_schema(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                collection TEXT NOT NULL,
                data TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_documents_collection
                ON documents (collection);",
        )
        .map_err(|e| {
            error!("[DB] Failed creating documents table: {}", e);
            StoreError::Unavailable(e.to_string())
        })?;
        Ok(())
    }

    // Open and prepare the schema in one step
    pub async fn open(db_path: &str) -> Result<Self, StoreError> {
        let db = Database::new(db_path)?;
        db.create_schema().await?;
        Ok(db)
    }
}

#[async_trait]
impl ReviewStore for Database {
    async fn append(
        &self,
        collection: &str,
        record: Map<String, Value>,
    ) -> Result<Document, StoreError> {
        let id = Uuid::new_v4().to_string();
        // Stored with microsecond precision, so the returned value matches later reads
        let created_at = Utc::now().trunc_subsecs(6);
        let data = serde_json::to_string(&record)
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO documents (id, collection, data, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                &id,
                collection,
                &data,
                created_at.to_rfc3339_opts(SecondsFormat::Micros, true)
            ],
        )
        .map_err(|e| {
            error!("[DB] Insert into {} failed: {}", collection, e);
            StoreError::WriteFailed(e.to_string())
        })?;
        debug!("[DB] Appended document {} to {}", id, collection);

        Ok(Document {
            id,
            created_at,
            data: record,
        })
    }

    async fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>, StoreError> {
        check_field_name(field)?;
        let path = format!("$.{field}");

        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(
                "SELECT id, data, created_at FROM documents
                WHERE collection = ?1 AND json_extract(data, ?2) = ?3",
            )
            .map_err(|e| StoreError::ReadFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![collection, &path, value], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(|e| StoreError::ReadFailed(e.to_string()))?;

        let mut documents = Vec::new();
        for row in rows {
            let (id, data, created_at) = row.map_err(|e| StoreError::ReadFailed(e.to_string()))?;
            documents.push(decode_document(id, &data, &created_at)?);
        }
        debug!(
            "[DB] {} documents in {} where {} = {}",
            documents.len(),
            collection,
            field,
            value
        );
        Ok(documents)
    }
}

fn decode_document(id: String, data: &str, created_at: &str) -> Result<Document, StoreError> {
    let data = match serde_json::from_str::<Value>(data) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            return Err(StoreError::Corrupt {
                id,
                reason: "data is not a JSON object".into(),
            })
        }
        Err(e) => {
            return Err(StoreError::Corrupt {
                id,
                reason: e.to_string(),
            })
        }
    };
    let created_at = match DateTime::parse_from_rfc3339(created_at) {
        Ok(ts) => ts.with_timezone(&Utc),
        Err(e) => {
            return Err(StoreError::Corrupt {
                id,
                reason: e.to_string(),
            })
        }
    };
    Ok(Document {
        id,
        created_at,
        data,
    })
}
