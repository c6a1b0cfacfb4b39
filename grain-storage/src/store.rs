//! Key-value store client abstraction.
//!
//! The provider never talks to a concrete store. It holds an
//! `Arc<dyn KvStore>` built at init time by a [`StoreConnector`] from the
//! configured connection target:
//!
//! - **KvStore**: get / put / delete of whole values by key
//! - **StoreConnector**: turns a connection target into a client
//! - **InMemoryKvStore**: process-local map, for tests and single-node development
//! - **FileKvStore**: one file per key under a directory

use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::error::StoreError;

/// Connection target scheme for [`InMemoryKvStore`].
pub const MEMORY_SCHEME: &str = "memory://";

/// Connection target scheme for [`FileKvStore`].
pub const FILE_SCHEME: &str = "file://";

/// Client for an external key-value store.
///
/// Values are opaque bytes replaced whole on every put. Implementations must
/// be safe to share across concurrent calls.
#[async_trait]
pub trait KvStore: Send + Sync + std::fmt::Debug {
    /// Fetch the value stored under `key`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(bytes))`: value found
    /// - `Ok(None)`: key never written, or deleted
    /// - `Err(StoreError)`: the store could not answer
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Store `value` under `key`, replacing any previous value unconditionally.
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    /// Remove `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Builds store clients from connection targets.
#[async_trait]
pub trait StoreConnector: Send + Sync + std::fmt::Debug {
    /// Connect to the store named by `target`.
    async fn connect(&self, target: &str) -> Result<Arc<dyn KvStore>, StoreError>;
}

/// In-memory store for testing and single-node development.
///
/// State lives in a `HashMap` and is lost when the process exits. The store
/// can be switched to unavailable to exercise failure paths.
#[derive(Debug, Default)]
pub struct InMemoryKvStore {
    data: RwLock<HashMap<String, Vec<u8>>>,
    unavailable: AtomicBool,
}

impl InMemoryKvStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`] (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    /// Whether the store holds no keys.
    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }

    /// Whether `key` is present.
    pub async fn contains_key(&self, key: &str) -> bool {
        self.data.read().await.contains_key(key)
    }

    /// All stored keys, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.data.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "in-memory store switched off".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl KvStore for InMemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.check_available()?;
        Ok(self.data.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        self.check_available()?;
        self.data.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.check_available()?;
        self.data.write().await.remove(key);
        Ok(())
    }
}

/// Directory-backed store: each key is one file.
///
/// File names are the key with every byte outside `[A-Za-z0-9._+-]`
/// percent-escaped (a leading `.` too). Puts write a temporary file and
/// rename it over the target so readers never observe a partial value.
#[derive(Debug, Clone)]
pub struct FileKvStore {
    root: PathBuf,
}

impl FileKvStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// Directory holding the stored files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(escape_file_name(key))
    }
}

#[async_trait]
impl KvStore for FileKvStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        let target = self.path_for(key);
        let staging = self.root.join(format!("~{}.tmp", uuid::Uuid::new_v4().simple()));
        tokio::fs::write(&staging, &value).await?;
        if let Err(e) = tokio::fs::rename(&staging, &target).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn escape_file_name(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for (i, b) in key.bytes().enumerate() {
        let plain = b.is_ascii_alphanumeric() || matches!(b, b'_' | b'+' | b'-' | b'.');
        if plain && !(i == 0 && b == b'.') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

/// Connector for the built-in `memory://` and `file://` targets.
///
/// `memory://<name>` targets with the same name resolve to the same
/// [`InMemoryKvStore`], so several providers configured against one target
/// share data the way they would share a remote cluster.
#[derive(Debug, Default)]
pub struct DefaultConnector {
    memory: Mutex<HashMap<String, Arc<InMemoryKvStore>>>,
}

impl DefaultConnector {
    /// Create a connector with no memory stores yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The in-memory store registered under `name`, if one was connected.
    pub async fn memory_store(&self, name: &str) -> Option<Arc<InMemoryKvStore>> {
        self.memory.lock().await.get(name).cloned()
    }
}

#[async_trait]
impl StoreConnector for DefaultConnector {
    async fn connect(&self, target: &str) -> Result<Arc<dyn KvStore>, StoreError> {
        if let Some(name) = target.strip_prefix(MEMORY_SCHEME) {
            let store = self
                .memory
                .lock()
                .await
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(InMemoryKvStore::new()))
                .clone();
            return Ok(store);
        }

        if let Some(dir) = target.strip_prefix(FILE_SCHEME) {
            if dir.is_empty() {
                return Err(StoreError::InvalidTarget {
                    target: target.to_string(),
                    reason: "file target needs a directory".to_string(),
                });
            }
            return Ok(Arc::new(FileKvStore::open(dir).await?));
        }

        Err(StoreError::InvalidTarget {
            target: target.to_string(),
            reason: format!("expected {} or {} scheme", MEMORY_SCHEME, FILE_SCHEME),
        })
    }
}
