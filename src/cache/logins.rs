// SPDX-License-Identifier: MPL-2.0

use crate::api::Login;
use crate::cache::{CacheDb, CacheError};
use chrono::{DateTime, Utc};
use rusqlite::params;

/// Cache operations for the single device login
pub struct LoginCache<'a> {
    db: &'a CacheDb,
}

impl<'a> LoginCache<'a> {
    pub fn new(db: &'a CacheDb) -> Self {
        Self { db }
    }

    /// Store the login, replacing any previous one
    pub fn store(&self, login: &Login) -> Result<(), CacheError> {
        let conn = self.db.conn();
        conn.execute(
            r#"
            INSERT INTO logins (slot, user_id, handle_name, email_address, token, last_login_at)
            VALUES (0, ?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(slot) DO UPDATE SET
                user_id = excluded.user_id,
                handle_name = excluded.handle_name,
                email_address = excluded.email_address,
                token = excluded.token,
                last_login_at = excluded.last_login_at
            "#,
            params![
                login.user_id,
                login.handle_name,
                login.email_address,
                login.token,
                login.last_login_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get(&self) -> Result<Login, CacheError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            "SELECT user_id, handle_name, email_address, token, last_login_at FROM logins WHERE slot = 0",
        )?;

        let (user_id, handle_name, email_address, token, last_login_at) = stmt
            .query_row([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => CacheError::NotFound,
                other => CacheError::Database(other),
            })?;

        let last_login_at = DateTime::parse_from_rfc3339(&last_login_at)
            .map_err(|e| CacheError::InvalidData(format!("last_login_at: {e}")))?
            .with_timezone(&Utc);

        Ok(Login {
            user_id,
            handle_name,
            email_address,
            token,
            last_login_at,
        })
    }

    /// Remove the stored login; returns whether one existed
    pub fn clear(&self) -> Result<bool, CacheError> {
        let conn = self.db.conn();
        let removed = conn.execute("DELETE FROM logins", [])?;
        Ok(removed > 0)
    }
}
