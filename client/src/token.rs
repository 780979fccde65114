use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::warn;

/// Process-wide slot for the session bearer token.
///
/// The token is read before every authenticated call and overwritten after
/// every successful account refresh (the server rotates it).
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Option<String>;
    fn store(&self, token: &str);
}

/// In-memory token slot.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }

    fn store(&self, token: &str) {
        *self.token.lock().unwrap() = Some(token.to_string());
    }
}

/// Durable single-slot token file.
///
/// I/O failures are logged and otherwise swallowed: losing a rotation makes
/// the next authenticated call fail with a server error, which the caller
/// already handles.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(token) => {
                let token = token.trim().to_string();
                (!token.is_empty()).then_some(token)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "failed to read token file");
                None
            }
        }
    }

    fn store(&self, token: &str) {
        if let Err(err) = fs::write(&self.path, token) {
            warn!(path = %self.path.display(), %err, "failed to persist token");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.load(), None);

        store.store("first");
        assert_eq!(store.load(), Some("first".to_string()));

        store.store("rotated");
        assert_eq!(store.load(), Some("rotated".to_string()));
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = std::env::temp_dir().join(format!("splitbet-token-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("token");

        let store = FileTokenStore::new(&path);
        assert_eq!(store.load(), None);

        store.store("first");
        assert_eq!(store.load(), Some("first".to_string()));

        // A second store instance sees the persisted value.
        let other = FileTokenStore::new(&path);
        assert_eq!(other.load(), Some("first".to_string()));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
