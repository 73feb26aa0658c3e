//! Document store contract and its SQLite implementation.
//!
//! # Responsibility
//! - Persist JSON documents per collection and hand out store-assigned ids.
//! - Evaluate filters, projections and size grouping inside SQLite.
//!
//! # Invariants
//! - Connections must be migrated to the latest schema version.
//! - Field names reach SQL only as bound JSON paths, never as SQL text.
//! - Results are ordered by `rowid`, i.e. insertion order.

use super::document::{Collection, Document, DocumentBody, Filter, Projection, SizeGroup};
use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::DocumentId;
use log::debug;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde_json::Value;
use std::collections::BTreeSet;
use uuid::Uuid;

const REQUIRED_COLUMNS: [&str; 3] = ["id", "body", "created_at"];

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures raised by the document store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("document store requires schema version {expected_version}, got {actual_version}")]
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    #[error("document store requires table `{0}`")]
    MissingRequiredTable(&'static str),
    #[error("document store requires column `{column}` in table `{table}`")]
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    #[error("invalid field name `{0}`")]
    InvalidFieldName(String),
    #[error("field `{0}` can only be compared with a scalar value")]
    UnsupportedFilterValue(String),
    #[error("invalid document in `{collection}`: {message}")]
    InvalidDocument {
        collection: Collection,
        message: String,
    },
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage gateway consumed by the pet directory service.
pub trait DocumentStore {
    /// Persists `body` as a new document and returns it with its new id.
    fn insert(&self, collection: Collection, body: DocumentBody) -> StoreResult<Document>;

    /// Point lookup by id.
    fn find_by_id(&self, collection: Collection, id: DocumentId)
        -> StoreResult<Option<Document>>;

    /// Filtered, projected scan in natural order.
    fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        projection: &Projection,
    ) -> StoreResult<Vec<Document>>;

    /// Groups documents by the summed length of `array_fields`.
    ///
    /// A missing or non-array field counts as length 0. Group order is
    /// unspecified.
    fn group_by_total_size(
        &self,
        collection: Collection,
        array_fields: &[&str],
    ) -> StoreResult<Vec<SizeGroup>>;
}

/// SQLite-backed document store.
pub struct SqliteDocumentStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentStore<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_store_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl DocumentStore for SqliteDocumentStore<'_> {
    fn insert(&self, collection: Collection, body: DocumentBody) -> StoreResult<Document> {
        let id = Uuid::new_v4();
        let text = serde_json::to_string(&body)?;
        self.conn.execute(
            &format!(
                "INSERT INTO {} (id, body) VALUES (?1, ?2);",
                collection.table_name()
            ),
            params![id.to_string(), text],
        )?;

        debug!("event=store_insert module=store status=ok collection={collection} id={id}");
        Ok(Document { id, body })
    }

    fn find_by_id(
        &self,
        collection: Collection,
        id: DocumentId,
    ) -> StoreResult<Option<Document>> {
        let found = self
            .conn
            .query_row(
                &format!(
                    "SELECT id, body FROM {} WHERE id = ?1;",
                    collection.table_name()
                ),
                [id.to_string()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        debug!(
            "event=store_find_by_id module=store status=ok collection={} found={}",
            collection,
            found.is_some()
        );
        found
            .map(|(id_text, body_text)| parse_document(collection, &id_text, &body_text))
            .transpose()
    }

    fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        projection: &Projection,
    ) -> StoreResult<Vec<Document>> {
        let mut bind_values: Vec<SqlValue> = Vec::new();
        let condition = match filter {
            Filter::All => "1 = 1".to_string(),
            Filter::Eq { field, value } => {
                eq_condition(field, value, &mut bind_values)?
            }
            Filter::IdIn(ids) => {
                if ids.is_empty() {
                    return Ok(Vec::new());
                }
                let id_list = ids.iter().map(Uuid::to_string).collect::<Vec<_>>();
                bind_values.push(SqlValue::Text(serde_json::to_string(&id_list)?));
                "id IN (SELECT value FROM json_each(?))".to_string()
            }
        };

        let sql = format!(
            "SELECT id, body FROM {} WHERE {condition} ORDER BY rowid ASC;",
            collection.table_name()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut documents = Vec::new();
        while let Some(row) = rows.next()? {
            let mut document = parse_row(collection, row)?;
            projection.apply(&mut document.body);
            documents.push(document);
        }

        debug!(
            "event=store_find module=store status=ok collection={} rows={}",
            collection,
            documents.len()
        );
        Ok(documents)
    }

    fn group_by_total_size(
        &self,
        collection: Collection,
        array_fields: &[&str],
    ) -> StoreResult<Vec<SizeGroup>> {
        let mut bind_values: Vec<SqlValue> = Vec::new();
        let mut terms = Vec::with_capacity(array_fields.len());
        for field in array_fields {
            bind_values.push(SqlValue::Text(json_path(field)?));
            terms.push("COALESCE(json_array_length(body, ?), 0)");
        }
        let total_expr = if terms.is_empty() {
            "0".to_string()
        } else {
            terms.join(" + ")
        };

        let sql = format!(
            "SELECT total, json_group_array(id) AS ids
             FROM (
                SELECT id, {total_expr} AS total
                FROM {}
                ORDER BY rowid ASC
             )
             GROUP BY total;",
            collection.table_name()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut groups = Vec::new();
        while let Some(row) = rows.next()? {
            let total: i64 = row.get("total")?;
            let ids_text: String = row.get("ids")?;
            let ids = serde_json::from_str::<Vec<String>>(&ids_text)?
                .iter()
                .map(|id_text| parse_id(collection, id_text))
                .collect::<StoreResult<BTreeSet<_>>>()?;
            groups.push(SizeGroup { total, ids });
        }

        debug!(
            "event=store_group module=store status=ok collection={} groups={}",
            collection,
            groups.len()
        );
        Ok(groups)
    }
}

fn eq_condition(
    field: &str,
    value: &Value,
    bind_values: &mut Vec<SqlValue>,
) -> StoreResult<String> {
    let path = json_path(field)?;
    let condition = match value {
        Value::Null => {
            bind_values.push(SqlValue::Text(path));
            "json_type(body, ?) = 'null'"
        }
        Value::Bool(flag) => {
            bind_values.push(SqlValue::Text(path));
            bind_values.push(SqlValue::Text(flag.to_string()));
            "json_type(body, ?) = ?"
        }
        Value::String(text) => {
            bind_values.push(SqlValue::Text(path.clone()));
            bind_values.push(SqlValue::Text(path));
            bind_values.push(SqlValue::Text(text.clone()));
            "(json_type(body, ?) = 'text' AND json_extract(body, ?) = ?)"
        }
        Value::Number(number) => {
            let bound = match number.as_i64() {
                Some(integer) => SqlValue::Integer(integer),
                None => SqlValue::Real(number.as_f64().unwrap_or(f64::NAN)),
            };
            bind_values.push(SqlValue::Text(path.clone()));
            bind_values.push(SqlValue::Text(path));
            bind_values.push(bound);
            "(json_type(body, ?) IN ('integer', 'real') AND json_extract(body, ?) = ?)"
        }
        Value::Array(_) | Value::Object(_) => {
            return Err(StoreError::UnsupportedFilterValue(field.to_string()));
        }
    };
    Ok(condition.to_string())
}

fn json_path(field: &str) -> StoreResult<String> {
    let valid = !field.is_empty()
        && field
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
    if !valid {
        return Err(StoreError::InvalidFieldName(field.to_string()));
    }
    Ok(format!("$.{field}"))
}

fn parse_row(collection: Collection, row: &Row<'_>) -> StoreResult<Document> {
    let id_text: String = row.get("id")?;
    let body_text: String = row.get("body")?;
    parse_document(collection, &id_text, &body_text)
}

fn parse_document(collection: Collection, id_text: &str, body_text: &str) -> StoreResult<Document> {
    let id = parse_id(collection, id_text)?;
    match serde_json::from_str::<Value>(body_text)? {
        Value::Object(body) => Ok(Document { id, body }),
        _ => Err(StoreError::InvalidDocument {
            collection,
            message: format!("body of `{id}` is not a JSON object"),
        }),
    }
}

fn parse_id(collection: Collection, id_text: &str) -> StoreResult<DocumentId> {
    Uuid::parse_str(id_text).map_err(|_| StoreError::InvalidDocument {
        collection,
        message: format!("invalid id value `{id_text}`"),
    })
}

fn ensure_store_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for collection in Collection::ALL {
        let table = collection.table_name();
        if !table_exists(conn, table)? {
            return Err(StoreError::MissingRequiredTable(table));
        }
        for column in REQUIRED_COLUMNS {
            if !table_has_column(conn, table, column)? {
                return Err(StoreError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2;",
        [table, column],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}
