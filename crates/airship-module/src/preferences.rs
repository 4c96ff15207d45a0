// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Persisted module preferences.
//
// Only a handful of values survive restarts: the last observed opt-in status,
// the notification presentation strings pushed by the host, and the
// message-center auto-launch flag. Values are stored as JSON text so one
// table serves both booleans and strings.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use airship_bridge::traits::PreferenceStore;
use airship_core::config::{NotificationConfig, keys};
use airship_core::error::{AirshipError, Result};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info, instrument};

const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS preferences (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )
"#;

fn db_err(context: &str, e: rusqlite::Error) -> AirshipError {
    AirshipError::Preferences(format!("{context}: {e}"))
}

// ---------------------------------------------------------------------------
// SQLite store
// ---------------------------------------------------------------------------

/// Preference store backed by a SQLite file.
///
/// `rusqlite::Connection` is `Send` but not `Sync`, so it sits behind a mutex.
pub struct SqlitePreferences {
    conn: Mutex<Connection>,
}

impl SqlitePreferences {
    /// Open (or create) the preference database at the given path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref()).map_err(|e| db_err("open", e))?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| db_err("WAL pragma", e))?;

        conn.execute_batch(CREATE_TABLE_SQL)
            .map_err(|e| db_err("create table", e))?;

        info!("preference database opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| db_err("open in-memory", e))?;

        conn.execute_batch(CREATE_TABLE_SQL)
            .map_err(|e| db_err("create table", e))?;

        debug!("in-memory preference database opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        self.conn()
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| db_err("read preference", e))
    }

    fn write(&self, key: &str, json: &str) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO preferences (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, json],
            )
            .map_err(|e| db_err("write preference", e))?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.conn()
            .execute("DELETE FROM preferences WHERE key = ?1", params![key])
            .map_err(|e| db_err("delete preference", e))?;
        Ok(())
    }
}

impl PreferenceStore for SqlitePreferences {
    fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.read(key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn put_bool(&self, key: &str, value: bool) -> Result<()> {
        self.write(key, &serde_json::to_string(&value)?)
    }

    fn get_string(&self, key: &str) -> Result<Option<String>> {
        match self.read(key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn put_string(&self, key: &str, value: Option<&str>) -> Result<()> {
        match value {
            Some(value) => self.write(key, &serde_json::to_string(value)?),
            None => self.delete(key),
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Stored {
    Bool(bool),
    Text(String),
}

/// Volatile preference store for tests and hosts without persistence.
#[derive(Default)]
pub struct MemoryPreferences {
    values: Mutex<HashMap<String, Stored>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> MutexGuard<'_, HashMap<String, Stored>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.values().get(key) {
            Some(Stored::Bool(value)) => Ok(Some(*value)),
            Some(Stored::Text(_)) => Err(AirshipError::Preferences(format!(
                "{key} holds a string, not a boolean"
            ))),
            None => Ok(None),
        }
    }

    fn put_bool(&self, key: &str, value: bool) -> Result<()> {
        self.values().insert(key.to_string(), Stored::Bool(value));
        Ok(())
    }

    fn get_string(&self, key: &str) -> Result<Option<String>> {
        match self.values().get(key) {
            Some(Stored::Text(value)) => Ok(Some(value.clone())),
            Some(Stored::Bool(_)) => Err(AirshipError::Preferences(format!(
                "{key} holds a boolean, not a string"
            ))),
            None => Ok(None),
        }
    }

    fn put_string(&self, key: &str, value: Option<&str>) -> Result<()> {
        let mut values = self.values();
        match value {
            Some(value) => {
                values.insert(key.to_string(), Stored::Text(value.to_string()));
            }
            None => {
                values.remove(key);
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Typed view
// ---------------------------------------------------------------------------

/// Typed accessors over the fixed preference keys.
#[derive(Clone)]
pub struct ModulePreferences {
    store: Arc<dyn PreferenceStore>,
}

impl ModulePreferences {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    /// Last persisted opt-in status; `false` until first written.
    pub fn opt_in_status(&self) -> Result<bool> {
        Ok(self.store.get_bool(keys::OPT_IN_STATUS)?.unwrap_or(false))
    }

    pub fn set_opt_in_status(&self, opt_in: bool) -> Result<()> {
        self.store.put_bool(keys::OPT_IN_STATUS, opt_in)
    }

    pub fn notification_config(&self) -> Result<NotificationConfig> {
        Ok(NotificationConfig {
            icon: self.store.get_string(keys::NOTIFICATION_ICON)?,
            large_icon: self.store.get_string(keys::NOTIFICATION_LARGE_ICON)?,
            accent_color: self.store.get_string(keys::NOTIFICATION_ACCENT_COLOR)?,
            default_channel_id: self.store.get_string(keys::DEFAULT_NOTIFICATION_CHANNEL_ID)?,
        })
    }

    /// Persist every field; absent fields clear their key.
    pub fn set_notification_config(&self, config: &NotificationConfig) -> Result<()> {
        self.store
            .put_string(keys::NOTIFICATION_ICON, config.icon.as_deref())?;
        self.store
            .put_string(keys::NOTIFICATION_LARGE_ICON, config.large_icon.as_deref())?;
        self.store
            .put_string(keys::NOTIFICATION_ACCENT_COLOR, config.accent_color.as_deref())?;
        self.store.put_string(
            keys::DEFAULT_NOTIFICATION_CHANNEL_ID,
            config.default_channel_id.as_deref(),
        )
    }

    /// Whether the default message center opens from a push; `true` unless
    /// the host turned it off.
    pub fn auto_launch_message_center(&self) -> Result<bool> {
        Ok(self
            .store
            .get_bool(keys::AUTO_LAUNCH_MESSAGE_CENTER)?
            .unwrap_or(true))
    }

    pub fn set_auto_launch_message_center(&self, enabled: bool) -> Result<()> {
        self.store.put_bool(keys::AUTO_LAUNCH_MESSAGE_CENTER, enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_round_trips_bools_and_strings() {
        let store = SqlitePreferences::open_in_memory().expect("open in-memory db");
        store.put_bool("flag", true).expect("put bool");
        store.put_string("name", Some("ic_push")).expect("put string");

        assert_eq!(store.get_bool("flag").expect("get bool"), Some(true));
        assert_eq!(
            store.get_string("name").expect("get string").as_deref(),
            Some("ic_push")
        );
        assert_eq!(store.get_bool("missing").expect("get missing"), None);
    }

    #[test]
    fn sqlite_overwrites_and_clears() {
        let store = SqlitePreferences::open_in_memory().expect("open in-memory db");
        store.put_string("k", Some("a")).expect("put");
        store.put_string("k", Some("b")).expect("overwrite");
        assert_eq!(store.get_string("k").expect("get").as_deref(), Some("b"));

        store.put_string("k", None).expect("clear");
        assert_eq!(store.get_string("k").expect("get"), None);
    }

    #[test]
    fn sqlite_persists_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("prefs.db");
        {
            let store = SqlitePreferences::open(&path).expect("open");
            store.put_bool(keys::OPT_IN_STATUS, true).expect("put");
        }
        let store = SqlitePreferences::open(&path).expect("reopen");
        assert_eq!(store.get_bool(keys::OPT_IN_STATUS).expect("get"), Some(true));
    }

    #[test]
    fn memory_store_reports_type_mismatch() {
        let store = MemoryPreferences::new();
        store.put_string("k", Some("text")).expect("put");
        assert!(matches!(
            store.get_bool("k"),
            Err(AirshipError::Preferences(_))
        ));
    }

    #[test]
    fn opt_in_defaults_to_false() {
        let prefs = ModulePreferences::new(Arc::new(MemoryPreferences::new()));
        assert!(!prefs.opt_in_status().expect("read"));
        prefs.set_opt_in_status(true).expect("write");
        assert!(prefs.opt_in_status().expect("read"));
    }

    #[test]
    fn notification_config_absent_fields_clear_keys() {
        let prefs = ModulePreferences::new(Arc::new(MemoryPreferences::new()));
        prefs
            .set_notification_config(&NotificationConfig {
                icon: Some("ic_push".into()),
                large_icon: Some("ic_large".into()),
                accent_color: Some("#00ff00".into()),
                default_channel_id: Some("alerts".into()),
            })
            .expect("write");

        prefs
            .set_notification_config(&NotificationConfig {
                icon: Some("ic_other".into()),
                ..Default::default()
            })
            .expect("rewrite");

        let config = prefs.notification_config().expect("read");
        assert_eq!(config.icon.as_deref(), Some("ic_other"));
        assert!(config.large_icon.is_none());
        assert!(config.accent_color.is_none());
        assert!(config.default_channel_id.is_none());
    }

    #[test]
    fn auto_launch_defaults_to_enabled() {
        let prefs = ModulePreferences::new(Arc::new(MemoryPreferences::new()));
        assert!(prefs.auto_launch_message_center().expect("read"));
        prefs.set_auto_launch_message_center(false).expect("write");
        assert!(!prefs.auto_launch_message_center().expect("read"));
    }
}
