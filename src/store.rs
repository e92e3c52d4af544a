//! Durable user preferences.
//!
//! A tiny SQLite key/value table with per-entry expiry plays the role of a
//! browser cookie jar. The only entry written today is the user's chosen
//! search origin under [`LOCATION_KEY`].

use crate::models::UserLocation;
use chrono::{Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

pub const LOCATION_KEY: &str = "user_location";
pub const LOCATION_TTL_DAYS: i64 = 365;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("preference database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("could not encode preference: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Holds the active [`UserLocation`] in memory and mirrors every change to disk.
pub struct LocationStore {
    conn: Connection,
    current: Option<UserLocation>,
}

impl LocationStore {
    /// Opens (or creates) the preference database and restores the stored location.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS prefs (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                expires_at INTEGER NOT NULL
            )",
            [],
        )?;

        let mut store = Self {
            conn,
            current: None,
        };
        store.current = store.restore()?;
        Ok(store)
    }

    /// Reads the persisted location. Expired rows are dropped and an
    /// unparsable value counts as no location at all.
    fn restore(&self) -> Result<Option<UserLocation>, StoreError> {
        let Some(raw) = self.read(LOCATION_KEY)? else {
            info!("No stored location found.");
            return Ok(None);
        };

        match serde_json::from_str::<UserLocation>(&raw) {
            Ok(location) => {
                info!(
                    "Restored location '{}' ({}, {})",
                    location.address, location.lat, location.lng
                );
                Ok(Some(location))
            }
            Err(e) => {
                warn!("Failed to parse stored location: {}. Ignoring it.", e);
                Ok(None)
            }
        }
    }

    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = Utc::now().timestamp();
        let row: Option<(String, i64)> = self
            .conn
            .query_row(
                "SELECT value, expires_at FROM prefs WHERE key = ?",
                [key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((_, expires_at)) if expires_at <= now => {
                self.conn.execute("DELETE FROM prefs WHERE key = ?", [key])?;
                Ok(None)
            }
            Some((value, _)) => Ok(Some(value)),
            None => Ok(None),
        }
    }

    fn write(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let expires_at = (Utc::now() + ttl).timestamp();
        self.conn.execute(
            "INSERT OR REPLACE INTO prefs (key, value, expires_at) VALUES (?, ?, ?)",
            params![key, value, expires_at],
        )?;
        Ok(())
    }

    pub fn get(&self) -> Option<&UserLocation> {
        self.current.as_ref()
    }

    /// Replaces the active location and persists it for a year.
    ///
    /// The in-memory value is updated even when the write fails, so the
    /// session keeps working and only persistence is lost.
    pub fn set(&mut self, lat: f64, lng: f64, address: Option<&str>) -> Result<UserLocation, StoreError> {
        let location = UserLocation::new(lat, lng, address);
        self.current = Some(location.clone());

        let encoded = serde_json::to_string(&location)?;
        self.write(LOCATION_KEY, &encoded, Duration::days(LOCATION_TTL_DAYS))?;
        info!("Location set to '{}' ({}, {})", location.address, lat, lng);
        Ok(location)
    }
}
