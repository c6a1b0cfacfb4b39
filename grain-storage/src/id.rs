//! Grain identity types.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The primary key of a grain instance.
///
/// Hosts address grains by integer, UUID or string keys. The compound forms
/// pair an integer or UUID with a string extension (e.g. a region or shard
/// name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrainKey {
    /// 64-bit integer key.
    Integer(i64),
    /// UUID key.
    Uuid(Uuid),
    /// Free-form string key.
    String(String),
    /// Integer key with a string extension.
    IntegerCompound(i64, String),
    /// UUID key with a string extension.
    UuidCompound(Uuid, String),
}

/// Stable identifier of one grain instance, supplied by the host.
///
/// # String Format
///
/// [`GrainId::to_key_string`] yields the canonical form used in storage keys.
/// Every form starts with a kind prefix, so two ids of different kinds never
/// share a canonical form:
///
/// | key                        | canonical form               |
/// |----------------------------|------------------------------|
/// | `Integer(42)`              | `i:42`                       |
/// | `Uuid(u)`                  | `u:` + `u` lowercase hyphenated |
/// | `String("alice")`          | `s:alice`                    |
/// | `IntegerCompound(42, "eu")`| `i:42+eu`                    |
/// | `UuidCompound(u, "eu")`    | `u:` + `u` + `+eu`           |
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GrainId {
    key: GrainKey,
}

impl GrainId {
    /// Create a grain id from a key.
    pub fn new(key: GrainKey) -> Self {
        Self { key }
    }

    /// Grain id with an integer key.
    pub fn integer(key: i64) -> Self {
        Self::new(GrainKey::Integer(key))
    }

    /// Grain id with a UUID key.
    pub fn uuid(key: Uuid) -> Self {
        Self::new(GrainKey::Uuid(key))
    }

    /// Grain id with a string key.
    pub fn string(key: impl Into<String>) -> Self {
        Self::new(GrainKey::String(key.into()))
    }

    /// Grain id with an integer key and a string extension.
    pub fn integer_compound(key: i64, extension: impl Into<String>) -> Self {
        Self::new(GrainKey::IntegerCompound(key, extension.into()))
    }

    /// Grain id with a UUID key and a string extension.
    pub fn uuid_compound(key: Uuid, extension: impl Into<String>) -> Self {
        Self::new(GrainKey::UuidCompound(key, extension.into()))
    }

    /// The underlying key.
    pub fn key(&self) -> &GrainKey {
        &self.key
    }

    /// The string extension of a compound key, if any.
    pub fn key_extension(&self) -> Option<&str> {
        match &self.key {
            GrainKey::IntegerCompound(_, ext) | GrainKey::UuidCompound(_, ext) => Some(ext),
            _ => None,
        }
    }

    /// Canonical string form used when deriving storage keys.
    pub fn to_key_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for GrainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            GrainKey::Integer(n) => write!(f, "i:{}", n),
            GrainKey::Uuid(u) => write!(f, "u:{}", u.hyphenated()),
            GrainKey::String(s) => write!(f, "s:{}", s),
            // Integers and UUIDs never contain '+', so the first one ends the key.
            GrainKey::IntegerCompound(n, ext) => write!(f, "i:{}+{}", n, ext),
            GrainKey::UuidCompound(u, ext) => write!(f, "u:{}+{}", u.hyphenated(), ext),
        }
    }
}

impl From<i64> for GrainId {
    fn from(key: i64) -> Self {
        Self::integer(key)
    }
}

impl From<Uuid> for GrainId {
    fn from(key: Uuid) -> Self {
        Self::uuid(key)
    }
}

impl From<&str> for GrainId {
    fn from(key: &str) -> Self {
        Self::string(key)
    }
}

impl From<String> for GrainId {
    fn from(key: String) -> Self {
        Self::string(key)
    }
}
