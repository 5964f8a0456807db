//! Key-value access and the ledger load/save lifecycle.

use anyhow::Context;
use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::Database;
use wrm_core::{Ledger, LedgerState, Settings, Source, StoredLog};

pub const SOURCES_KEY: &str = "sources";
pub const LOGS_KEY: &str = "logs";
pub const SETTINGS_KEY: &str = "settings";

impl Database {
    // ───────────────────── Raw blobs ─────────────────────

    pub fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let conn = self.conn.borrow();
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let conn = self.conn.borrow();
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> anyhow::Result<()> {
        let conn = self.conn.borrow();
        conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Delete every key.
    pub fn clear(&self) -> anyhow::Result<()> {
        let conn = self.conn.borrow();
        let removed = conn.execute("DELETE FROM kv", [])?;
        log::info!("[WRM] store: cleared {} keys", removed);
        Ok(())
    }

    pub fn keys(&self) -> anyhow::Result<Vec<String>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare("SELECT key FROM kv ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    fn get_json<T: DeserializeOwned>(&self, key: &str) -> anyhow::Result<Option<T>> {
        match self.get(key)? {
            Some(text) => {
                let value = serde_json::from_str(&text)
                    .with_context(|| format!("stored `{key}` is not valid JSON"))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> anyhow::Result<()> {
        let text = serde_json::to_string(value)?;
        self.set(key, &text)
    }

    // ───────────────────── Ledger lifecycle ─────────────────────

    /// Read the three ledger keys. Missing keys yield empty collections and default settings.
    pub fn load_state(&self) -> anyhow::Result<LedgerState> {
        let sources: Vec<Source> = self.get_json(SOURCES_KEY)?.unwrap_or_default();
        let logs: Vec<StoredLog> = self.get_json(LOGS_KEY)?.unwrap_or_default();
        let settings: Settings = self.get_json(SETTINGS_KEY)?.unwrap_or_default();
        log::info!(
            "[WRM] store: loaded {} sources, {} logs",
            sources.len(),
            logs.len()
        );
        Ok(LedgerState {
            sources,
            logs,
            settings,
        })
    }

    pub fn save_state(&self, state: &LedgerState) -> anyhow::Result<()> {
        self.set_json(SOURCES_KEY, &state.sources)?;
        self.set_json(LOGS_KEY, &state.logs)?;
        self.set_json(SETTINGS_KEY, &state.settings)?;
        log::debug!(
            "[WRM] store: saved {} sources, {} logs",
            state.sources.len(),
            state.logs.len()
        );
        Ok(())
    }

    pub fn load_ledger(&self) -> anyhow::Result<Ledger> {
        let state = self.load_state()?;
        Ledger::from_state(state).context("stored ledger is inconsistent")
    }

    pub fn save_ledger(&self, ledger: &Ledger) -> anyhow::Result<()> {
        self.save_state(&ledger.to_state())
    }
}
