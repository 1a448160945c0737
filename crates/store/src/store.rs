// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Kibitz Contributors

//! SQLite-backed record store, one row per tracked identity.
//!
//! All timestamps are stored as RFC 3339 TEXT; the profile blob is stored as
//! JSON TEXT. Point reads and point updates only, no event history.

use std::path::Path;
use std::time::Duration;

use kz_core::{IdentityId, TrackedIdentity};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow, SqliteSynchronous,
};
use sqlx::{Row, SqlitePool};
use thiserror::Error;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

const SELECT_IDENTITY: &str = "SELECT id, key, display_name, profile, status, last_active, \
     updated_at, webhook_url, created_at FROM identities";

/// Errors from opening or operating on the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("identity '{0}' is already tracked")]
    Duplicate(String),

    #[error("no identity matches '{0}'")]
    NotFound(String),

    #[error("'{0}' matches more than one identity")]
    Ambiguous(String),

    #[error("stored profile for {0} is not valid JSON: {1}")]
    BadProfile(String, #[source] serde_json::Error),
}

/// Handle to the identities database. Cheap to clone; all clones share one
/// connection pool.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating and migrating if needed) the database at `path`.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5));
        let pool = SqlitePoolOptions::new().max_connections(5).connect_with(options).await?;
        MIGRATOR.run(&pool).await?;
        Ok(Self { pool })
    }

    /// Insert a new identity. The provider key must be unused.
    pub async fn insert(&self, identity: &TrackedIdentity) -> Result<(), StoreError> {
        let profile = identity.profile.as_ref().map(ToString::to_string);
        let result = sqlx::query(
            "INSERT INTO identities \
                 (id, key, display_name, profile, status, last_active, updated_at, \
                  webhook_url, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(identity.id.as_str())
        .bind(&identity.key)
        .bind(&identity.display_name)
        .bind(profile)
        .bind(&identity.status)
        .bind(&identity.last_active)
        .bind(&identity.updated_at)
        .bind(&identity.webhook_url)
        .bind(&identity.created_at)
        .execute(&self.pool)
        .await;
        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::Duplicate(identity.key.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// All tracked identities, oldest first.
    pub async fn list(&self) -> Result<Vec<TrackedIdentity>, StoreError> {
        let rows = sqlx::query(&format!("{SELECT_IDENTITY} ORDER BY created_at, id"))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(identity_from_row).collect()
    }

    /// Identities the poll loop should sample this cycle.
    pub async fn list_pollable(&self) -> Result<Vec<TrackedIdentity>, StoreError> {
        let rows = sqlx::query(&format!(
            "{SELECT_IDENTITY} WHERE key != '' ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(identity_from_row).collect()
    }

    /// Resolve a user-supplied target: exact id, key, or display name first,
    /// then unique id prefix.
    pub async fn find(&self, target: &str) -> Result<Option<TrackedIdentity>, StoreError> {
        let rows = sqlx::query(&format!(
            "{SELECT_IDENTITY} WHERE id = ?1 OR key = ?1 OR display_name = ?1"
        ))
        .bind(target)
        .fetch_all(&self.pool)
        .await?;
        match rows.as_slice() {
            [row] => Ok(Some(identity_from_row(row)?)),
            [] => self.find_by_id_prefix(target).await,
            _ => Err(StoreError::Ambiguous(target.to_string())),
        }
    }

    async fn find_by_id_prefix(&self, prefix: &str) -> Result<Option<TrackedIdentity>, StoreError> {
        if prefix.is_empty() {
            return Ok(None);
        }
        let rows = sqlx::query(&format!(
            "{SELECT_IDENTITY} WHERE substr(id, 1, length(?1)) = ?1"
        ))
        .bind(prefix)
        .fetch_all(&self.pool)
        .await?;
        match rows.as_slice() {
            [] => Ok(None),
            [row] => Ok(Some(identity_from_row(row)?)),
            _ => Err(StoreError::Ambiguous(prefix.to_string())),
        }
    }

    /// Persist a confirmed transition. Returns false when the identity was
    /// removed since the cycle snapshot, which callers treat as benign.
    pub async fn record_transition(
        &self,
        id: &IdentityId,
        status: &str,
        last_active: Option<&str>,
        updated_at: &str,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE identities SET status = ?2, last_active = ?3, updated_at = ?4 WHERE id = ?1",
        )
        .bind(id.as_str())
        .bind(status)
        .bind(last_active)
        .bind(updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set or clear the webhook endpoint for an identity.
    pub async fn set_webhook(
        &self,
        id: &IdentityId,
        url: Option<&str>,
    ) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE identities SET webhook_url = ?2 WHERE id = ?1")
            .bind(id.as_str())
            .bind(url)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Delete an identity record.
    pub async fn remove(&self, id: &IdentityId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM identities WHERE id = ?1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Persisted (key, status) pairs for warming the in-memory status cache.
    ///
    /// Keyless identities never poll, so their statuses have nothing to seed.
    pub async fn seed_statuses(&self) -> Result<Vec<(String, String)>, StoreError> {
        let rows =
            sqlx::query("SELECT key, status FROM identities WHERE status IS NOT NULL AND key != ''")
                .fetch_all(&self.pool)
                .await?;
        rows.iter()
            .map(|row| -> Result<(String, String), StoreError> {
                Ok((row.try_get("key")?, row.try_get("status")?))
            })
            .collect()
    }

    /// (tracked, pollable) counts for the daemon status report.
    pub async fn counts(&self) -> Result<(usize, usize), StoreError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS tracked, \
                    COUNT(CASE WHEN key != '' THEN 1 END) AS pollable \
             FROM identities",
        )
        .fetch_one(&self.pool)
        .await?;
        let tracked: i64 = row.try_get("tracked")?;
        let pollable: i64 = row.try_get("pollable")?;
        Ok((tracked as usize, pollable as usize))
    }
}

fn identity_from_row(row: &SqliteRow) -> Result<TrackedIdentity, StoreError> {
    let id: String = row.try_get("id")?;
    let profile = row
        .try_get::<Option<String>, _>("profile")?
        .map(|text| {
            serde_json::from_str(&text).map_err(|e| StoreError::BadProfile(id.clone(), e))
        })
        .transpose()?;
    Ok(TrackedIdentity {
        id: IdentityId::from_string(id),
        key: row.try_get("key")?,
        display_name: row.try_get("display_name")?,
        profile,
        status: row.try_get("status")?,
        last_active: row.try_get("last_active")?,
        updated_at: row.try_get("updated_at")?,
        webhook_url: row.try_get("webhook_url")?,
        created_at: row.try_get("created_at")?,
    })
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
