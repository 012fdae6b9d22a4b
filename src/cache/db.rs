// SPDX-License-Identifier: MPL-2.0

use crate::cache::CacheError;
use crate::cache::schema::SCHEMA;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Handle to the device cache database
#[derive(Clone)]
pub struct CacheDb {
    conn: Arc<Mutex<Connection>>,
}

impl CacheDb {
    /// Open or create the cache database under `data_dir`, or the platform data dir
    /// Path: ~/.local/share/aianimals/cache.db
    pub fn open_default(data_dir: Option<&Path>) -> Result<Self, CacheError> {
        let path = Self::cache_path(data_dir)?;
        Self::open(&path)
    }

    /// Open or create the cache database at an explicit path
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CacheError::Path(format!("failed to create cache dir: {}", e)))?;
        }

        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Private in-memory database, used by tests and by callers that want no persistence
    pub fn open_in_memory() -> Result<Self, CacheError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, CacheError> {
        Self::migrate(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run schema migrations
    fn migrate(conn: &Connection) -> Result<(), CacheError> {
        // Execute the schema (all CREATE IF NOT EXISTS)
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    fn cache_path(data_dir: Option<&Path>) -> Result<PathBuf, CacheError> {
        let data_dir = match data_dir {
            Some(dir) => dir.to_path_buf(),
            None => dirs::data_dir()
                .ok_or_else(|| CacheError::Path("could not find data directory".to_string()))?,
        };

        Ok(data_dir.join("aianimals").join("cache.db"))
    }

    /// Access connection for operations
    pub fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("cache lock poisoned")
    }

    /// Get current unix timestamp
    pub fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }
}
