// src/store/mod.rs

use serde::{Serialize, de::DeserializeOwned};
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::error::AppError;

/// A stored document type, bound to one collection.
///
/// Documents are opaque JSON to the storage layer; the core depends only on
/// the four verbs below (plus filtered listing), never on a query language.
pub trait Document: Serialize + DeserializeOwned + Send + Sync + Unpin {
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}

const COLLECTIONS: &[&str] = &["users", "communities", "posts", "comments", "linkflairs"];

/// Creates the per-collection tables. Each collection is a flat table of
/// `(id, doc)` rows, the arena the comment-tree engines walk over.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for collection in COLLECTIONS {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {collection} (id TEXT PRIMARY KEY, doc TEXT NOT NULL)"
        );
        sqlx::query(&sql).execute(pool).await?;
    }
    Ok(())
}

/// Document store over a SQLite pool.
///
/// Exposes find-by-id, find-by-filter, insert, update and delete over the
/// fixed set of collections. `begin` opens a transaction carrying the same
/// verbs, so multi-document mutations (cascade deletes in particular) are
/// atomic.
#[derive(Clone)]
pub struct DocStore {
    pool: SqlitePool,
}

impl DocStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn get<T: Document>(&self, id: &str) -> Result<Option<T>, AppError> {
        let sql = format!("SELECT doc FROM {} WHERE id = ?", T::COLLECTION);
        let row: Option<String> = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        decode(row)
    }

    pub async fn list<T: Document>(&self) -> Result<Vec<T>, AppError> {
        let sql = format!("SELECT doc FROM {} ORDER BY rowid", T::COLLECTION);
        let rows: Vec<String> = sqlx::query_scalar(&sql).fetch_all(&self.pool).await?;
        decode_all(rows)
    }

    /// Find-by-filter: lists the collection and applies the predicate.
    /// Documents are opaque JSON, so filtering happens after decode.
    pub async fn find<T: Document>(
        &self,
        predicate: impl Fn(&T) -> bool,
    ) -> Result<Vec<T>, AppError> {
        let mut all = self.list::<T>().await?;
        all.retain(|doc| predicate(doc));
        Ok(all)
    }

    pub async fn insert<T: Document>(&self, doc: &T) -> Result<(), AppError> {
        let sql = format!("INSERT INTO {} (id, doc) VALUES (?, ?)", T::COLLECTION);
        sqlx::query(&sql)
            .bind(doc.id())
            .bind(serde_json::to_string(doc)?)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn update<T: Document>(&self, doc: &T) -> Result<(), AppError> {
        let sql = format!("UPDATE {} SET doc = ? WHERE id = ?", T::COLLECTION);
        sqlx::query(&sql)
            .bind(serde_json::to_string(doc)?)
            .bind(doc.id())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Returns whether a document was actually removed.
    pub async fn delete<T: Document>(&self, id: &str) -> Result<bool, AppError> {
        let sql = format!("DELETE FROM {} WHERE id = ?", T::COLLECTION);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn begin(&self) -> Result<StoreTx, AppError> {
        Ok(StoreTx {
            tx: self.pool.begin().await?,
        })
    }
}

/// A store transaction. Same verbs as `DocStore`; nothing is visible to
/// other connections until `commit`.
pub struct StoreTx {
    tx: Transaction<'static, Sqlite>,
}

impl StoreTx {
    pub async fn get<T: Document>(&mut self, id: &str) -> Result<Option<T>, AppError> {
        let sql = format!("SELECT doc FROM {} WHERE id = ?", T::COLLECTION);
        let row: Option<String> = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        decode(row)
    }

    pub async fn list<T: Document>(&mut self) -> Result<Vec<T>, AppError> {
        let sql = format!("SELECT doc FROM {} ORDER BY rowid", T::COLLECTION);
        let rows: Vec<String> = sqlx::query_scalar(&sql).fetch_all(&mut *self.tx).await?;
        decode_all(rows)
    }

    pub async fn insert<T: Document>(&mut self, doc: &T) -> Result<(), AppError> {
        let sql = format!("INSERT INTO {} (id, doc) VALUES (?, ?)", T::COLLECTION);
        sqlx::query(&sql)
            .bind(doc.id())
            .bind(serde_json::to_string(doc)?)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    pub async fn update<T: Document>(&mut self, doc: &T) -> Result<(), AppError> {
        let sql = format!("UPDATE {} SET doc = ? WHERE id = ?", T::COLLECTION);
        sqlx::query(&sql)
            .bind(serde_json::to_string(doc)?)
            .bind(doc.id())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    pub async fn delete<T: Document>(&mut self, id: &str) -> Result<bool, AppError> {
        let sql = format!("DELETE FROM {} WHERE id = ?", T::COLLECTION);
        let result = sqlx::query(&sql).bind(id).execute(&mut *self.tx).await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn commit(self) -> Result<(), AppError> {
        self.tx.commit().await?;
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(row: Option<String>) -> Result<Option<T>, AppError> {
    match row {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

fn decode_all<T: DeserializeOwned>(rows: Vec<String>) -> Result<Vec<T>, AppError> {
    rows.iter()
        .map(|json| serde_json::from_str(json).map_err(AppError::from))
        .collect()
}

/// Generates a fresh opaque document id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Validates the shape of a client-supplied document id.
/// Malformed ids are rejected with a 400 at the route boundary, before any
/// lookup happens.
pub fn check_id(id: &str) -> Result<(), AppError> {
    uuid::Uuid::parse_str(id)
        .map(|_| ())
        .map_err(|_| AppError::BadRequest(format!("Invalid id: {id}")))
}
