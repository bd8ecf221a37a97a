use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

const TABLENAME: &str = "kvstore";
const KEY_FIELD: &str = "key";
const VALUE_FIELD: &str = "value";

#[derive(Error, Debug)]
pub enum KVStoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("could not (de)serialize value: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    IOError(#[from] std::io::Error),
}

/// JSON-valued key/value table backed by SQLite
pub struct KVDb(Connection);

impl KVDb {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, KVStoreError> {
        // Create directory for DB if it doesn't already exist
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let connection = Connection::open(path.as_ref())?;
        connection.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS '{TABLENAME}' (
                {KEY_FIELD} TEXT PRIMARY KEY NOT NULL,
                {VALUE_FIELD} BLOB NOT NULL
                )"
            ),
            [],
        )?;
        log::debug!("Opened KV store at {}", path.as_ref().display());
        Ok(KVDb(connection))
    }

    fn select(&self, key: &str) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.0
            .query_row(
                &format!("SELECT {VALUE_FIELD} FROM '{TABLENAME}' WHERE {KEY_FIELD} = ?1"),
                [key],
                |r| r.get::<_, Vec<u8>>(0),
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn get<T: DeserializeOwned>(&self, key: impl AsRef<str>) -> Result<Option<T>, KVStoreError> {
        self.select(key.as_ref())?
            .map(|v| serde_json::from_slice::<T>(&v))
            .transpose()
            .map_err(Into::into)
    }

    pub fn set<K: AsRef<str>, V: Serialize>(&self, key: K, value: V) -> Result<(), KVStoreError> {
        let value = serde_json::to_vec(&value)?;
        let mut stmt = self.0.prepare(&format!(
            "INSERT INTO '{TABLENAME}' ({KEY_FIELD}, {VALUE_FIELD}) values (?1, ?2)
            ON CONFLICT({KEY_FIELD}) DO UPDATE SET {VALUE_FIELD}=?2",
        ))?;
        let res = stmt.execute(params![key.as_ref(), value])?;
        log::trace!("Upserted {} row(s) for key '{}'", res, key.as_ref());
        Ok(())
    }

    /// Returns whether a value was present
    pub fn remove(&self, key: impl AsRef<str>) -> Result<bool, KVStoreError> {
        let res = self.0.execute(
            &format!("DELETE FROM '{TABLENAME}' WHERE {KEY_FIELD} = ?1"),
            [key.as_ref()],
        )?;
        Ok(res > 0)
    }
}
