//! Storage key derivation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::id::GrainId;

/// Separator between key components.
pub const KEY_SEPARATOR: char = '-';

/// Suffix marking the payload content type.
pub const KEY_SUFFIX: &str = ".json";

/// Key under which one grain's state blob is stored.
///
/// Always of the form `{provider}-{grain_type}-{grain_id}.json`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StorageKey(String);

impl StorageKey {
    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the key and return the owned string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<StorageKey> for String {
    fn from(key: StorageKey) -> Self {
        key.0
    }
}

/// Derive the storage key for a grain.
///
/// Pure and total. The provider name namespaces keys so several providers can
/// share one store.
pub fn derive_key(provider_name: &str, grain_type: &str, grain_id: &GrainId) -> StorageKey {
    StorageKey(format!(
        "{provider_name}{sep}{grain_type}{sep}{id}{KEY_SUFFIX}",
        sep = KEY_SEPARATOR,
        id = grain_id.to_key_string(),
    ))
}
