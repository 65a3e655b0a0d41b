//! Durable storage for the persisted session: two keyed entries (token and
//! user identity), read at startup and written on every session change.
//! Absence or corruption of either entry is treated identically to "no
//! session"; vault writes are best-effort and never fail the caller.

use std::collections::HashMap;
use std::path::PathBuf;

use parking_lot::RwLock;
use tracing::warn;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

pub trait SessionVault: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// File-backed vault: one JSON object per file. Unreadable or non-object
/// content yields an empty map and is overwritten on the next write.
pub struct FileVault {
    path: PathBuf,
}

impl FileVault {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> HashMap<String, String> {
        let Ok(raw) = std::fs::read_to_string(&self.path) else {
            return HashMap::new();
        };
        serde_json::from_str(&raw).unwrap_or_default()
    }

    fn save(&self, map: &HashMap<String, String>) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(target: "reclaim::vault", "failed to create vault dir '{}': {}", parent.display(), e);
                return;
            }
        }
        let body = match serde_json::to_string_pretty(map) {
            Ok(b) => b,
            Err(e) => {
                warn!(target: "reclaim::vault", "failed to encode vault: {}", e);
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.path, body) {
            warn!(target: "reclaim::vault", "failed to write vault '{}': {}", self.path.display(), e);
        }
    }
}

impl SessionVault for FileVault {
    fn get(&self, key: &str) -> Option<String> {
        self.load().get(key).cloned()
    }

    fn put(&self, key: &str, value: &str) {
        let mut map = self.load();
        map.insert(key.to_string(), value.to_string());
        self.save(&map);
    }

    fn remove(&self, key: &str) {
        let mut map = self.load();
        if map.remove(key).is_some() || self.path.exists() {
            self.save(&map);
        }
    }
}

/// In-memory vault for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryVault {
    map: RwLock<HashMap<String, String>>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionVault for MemoryVault {
    fn get(&self, key: &str) -> Option<String> {
        self.map.read().get(key).cloned()
    }

    fn put(&self, key: &str, value: &str) {
        self.map.write().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.map.write().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_vault_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FileVault::new(dir.path().join("session.json"));
        assert!(vault.get(TOKEN_KEY).is_none());

        vault.put(TOKEN_KEY, "tok");
        vault.put(USER_KEY, "{\"id\":\"u-1\"}");
        assert_eq!(vault.get(TOKEN_KEY).as_deref(), Some("tok"));

        vault.remove(TOKEN_KEY);
        assert!(vault.get(TOKEN_KEY).is_none());
        assert!(vault.get(USER_KEY).is_some());
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json at all {{{").unwrap();
        let vault = FileVault::new(&path);
        assert!(vault.get(TOKEN_KEY).is_none());

        // next write repairs the file
        vault.put(TOKEN_KEY, "tok");
        assert_eq!(vault.get(TOKEN_KEY).as_deref(), Some("tok"));
    }

    #[test]
    fn memory_vault_round_trip() {
        let vault = MemoryVault::new();
        vault.put("k", "v");
        assert_eq!(vault.get("k").as_deref(), Some("v"));
        vault.remove("k");
        assert!(vault.get("k").is_none());
    }
}
