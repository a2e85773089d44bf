//! Persistent key-value storage port.
//!
//! The session manager keeps visitor identity and session expiry in a plain
//! string store so the host decides where durable identity actually lives.
//! [`FileStorage`] persists to a JSON file under the platform data
//! directory; [`MemoryStorage`] backs tests and ephemeral hosts.
//!
//! Storage failures never surface to the host: a store that cannot be read
//! or written degrades to in-memory behavior with a warning.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Key for the durable visitor id.
///
/// Reads and writes share one key so a freshly minted visitor id is read
/// back on every later launch instead of being minted again.
pub const VISITOR_ID_KEY: &str = "analytics-visitorid";

/// Key for the current session id.
pub const SESSION_ID_KEY: &str = "analytics-sessionid";

/// Key for the session expiry, stored as epoch milliseconds.
pub const SESSION_EXPIRATION_KEY: &str = "analytics-session-expiration";

/// A persistent string-to-string store.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// In-memory storage for tests and hosts that opt out of durability.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().expect("storage poisoned").get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .expect("storage poisoned")
            .insert(key.to_string(), value.to_string());
    }
}

/// JSON-file-backed storage.
///
/// The whole map is rewritten on every `set`; the store holds a handful of
/// short identity strings, so write-through keeps the file and memory in
/// step without a flush protocol.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// Open (or create) a store at the given path.
    ///
    /// An unreadable or unparseable file is treated as empty; the store
    /// still works in memory and will try to persist again on the next set.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable storage file");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    /// Open a store at the default platform location.
    pub fn open_default() -> Self {
        Self::open(Self::default_path())
    }

    /// Default storage file path under the platform data directory.
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("beacon-analytics")
            .join("storage.json")
    }

    fn persist(&self, entries: &HashMap<String, String>) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!(path = %self.path.display(), error = %e, "could not create storage directory");
                return;
            }
        }

        match serde_json::to_string_pretty(entries) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&self.path, json) {
                    tracing::warn!(path = %self.path.display(), error = %e, "could not persist storage");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not serialize storage");
            }
        }
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().expect("storage poisoned").get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock().expect("storage poisoned");
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries);
    }
}
