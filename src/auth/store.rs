//! Durable session persistence.
//!
//! The stored record is deliberately minimal: the bearer token and the
//! username it belongs to. Both are written and cleared together; a missing
//! or empty token is the canonical "no session" signal.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Session file name in the data directory
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub username: String,
}

/// File-backed token store. Cloneable so the revalidation task can read the
/// current snapshot without sharing state with the session manager.
#[derive(Debug, Clone)]
pub struct TokenStore {
    dir: PathBuf,
}

impl TokenStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    /// Read the persisted session, if any. An empty token counts as absent.
    pub fn load(&self) -> Result<Option<StoredSession>> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }

        let contents =
            std::fs::read_to_string(&path).context("Failed to read stored session")?;
        let saved: StoredSession =
            serde_json::from_str(&contents).context("Failed to parse stored session")?;

        if saved.token.is_empty() {
            return Ok(None);
        }
        Ok(Some(saved))
    }

    /// Persist token and username together.
    pub fn save(&self, token: &str, username: &str) -> Result<()> {
        let path = self.path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let saved = StoredSession {
            token: token.to_string(),
            username: username.to_string(),
        };
        let contents = serde_json::to_string_pretty(&saved)?;
        std::fs::write(path, contents).context("Failed to write stored session")?;
        Ok(())
    }

    /// Remove the persisted session. A no-op when nothing is stored.
    pub fn clear(&self) -> Result<()> {
        let path = self.path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove stored session")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> TokenStore {
        let dir = std::env::temp_dir().join(format!(
            "pixelport-store-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        TokenStore::new(dir)
    }

    #[test]
    fn load_returns_none_without_a_file() {
        let store = temp_store("empty");
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load_round_trips_both_values() {
        let store = temp_store("roundtrip");
        store.save("t1", "alice").unwrap();

        let saved = store.load().unwrap().expect("session should be present");
        assert_eq!(saved.token, "t1");
        assert_eq!(saved.username, "alice");
    }

    #[test]
    fn clear_removes_token_and_username_together() {
        let store = temp_store("clear");
        store.save("t1", "alice").unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());

        // Clearing again is harmless.
        store.clear().unwrap();
    }

    #[test]
    fn empty_token_counts_as_no_session() {
        let store = temp_store("empty-token");
        store.save("", "alice").unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
