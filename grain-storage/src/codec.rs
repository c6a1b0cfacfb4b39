//! State serialization.
//!
//! Grain state crosses the durable boundary as JSON. How the JSON is rendered
//! (compact or indented, with or without a type tag) is fixed once per
//! provider in a [`SerializerSettings`] value; every [`JsonCodec`] call reads
//! that value and never changes it.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::error::{CodecError, InitError};

/// Controls whether payloads carry the name of the state type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeNameHandling {
    /// Bare payload, no type tag.
    #[default]
    None,
    /// Insert a type tag field into JSON object payloads only.
    Objects,
    /// Tag every payload; non-object payloads are wrapped.
    All,
}

/// Serializer configuration, immutable once a provider is initialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerSettings {
    /// Tag with the full type path instead of the last path segment.
    pub use_full_type_names: bool,
    /// Render indented JSON.
    pub indent_output: bool,
    /// Type tag policy.
    pub type_name_handling: TypeNameHandling,
    /// Field holding the type tag.
    pub type_tag_field: String,
    /// Field holding a wrapped non-object payload.
    pub value_field: String,
}

impl Default for SerializerSettings {
    fn default() -> Self {
        Self {
            use_full_type_names: false,
            indent_output: false,
            type_name_handling: TypeNameHandling::None,
            type_tag_field: "$type".to_string(),
            value_field: "$value".to_string(),
        }
    }
}

impl SerializerSettings {
    /// Check that the tag and wrapper field names are usable.
    pub fn validate(&self) -> Result<(), InitError> {
        if self.type_tag_field.is_empty() {
            return Err(InitError::InvalidSettings(
                "type_tag_field cannot be empty".to_string(),
            ));
        }
        if self.value_field.is_empty() {
            return Err(InitError::InvalidSettings(
                "value_field cannot be empty".to_string(),
            ));
        }
        if self.type_tag_field == self.value_field {
            return Err(InitError::InvalidSettings(format!(
                "type_tag_field and value_field are both '{}'",
                self.value_field
            )));
        }
        Ok(())
    }

    /// Name written into the type tag for `T`.
    ///
    /// Derived from [`std::any::type_name`], so tags are only stable across
    /// builds of the same compiler and crate layout.
    pub fn type_name_of<T: ?Sized>(&self) -> String {
        let full = std::any::type_name::<T>();
        if self.use_full_type_names {
            full.to_string()
        } else {
            short_type_name(full)
        }
    }
}

/// Trait for encoding and decoding grain state.
pub trait StateCodec {
    /// Encode state to its storage representation.
    fn encode<T: Serialize>(&self, state: &T) -> Result<Vec<u8>, CodecError>;

    /// Decode a stored payload. Never called with an absent payload.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, CodecError>;
}

/// JSON codec bound to one shared settings value.
#[derive(Debug, Clone, Default)]
pub struct JsonCodec {
    settings: Arc<SerializerSettings>,
}

impl JsonCodec {
    /// Create a codec over shared settings.
    pub fn new(settings: Arc<SerializerSettings>) -> Self {
        Self { settings }
    }

    /// The settings this codec renders with.
    pub fn settings(&self) -> &SerializerSettings {
        &self.settings
    }

    fn render<V: Serialize + ?Sized>(&self, value: &V) -> Result<Vec<u8>, CodecError> {
        let rendered = if self.settings.indent_output {
            serde_json::to_vec_pretty(value)
        } else {
            serde_json::to_vec(value)
        };
        rendered.map_err(|e| CodecError::Serialization(e.to_string()))
    }

    fn tag(&self, payload: Value, type_name: String) -> Value {
        let settings = &*self.settings;
        match payload {
            // An object using either reserved field is wrapped whole.
            Value::Object(mut map)
                if !map.contains_key(&settings.type_tag_field)
                    && !map.contains_key(&settings.value_field) =>
            {
                map.insert(settings.type_tag_field.clone(), Value::String(type_name));
                Value::Object(map)
            }
            Value::Object(map) => self.wrap(Value::Object(map), type_name),
            other if settings.type_name_handling == TypeNameHandling::All => {
                self.wrap(other, type_name)
            }
            other => other,
        }
    }

    fn wrap(&self, payload: Value, type_name: String) -> Value {
        let mut map = Map::new();
        map.insert(self.settings.type_tag_field.clone(), Value::String(type_name));
        map.insert(self.settings.value_field.clone(), payload);
        Value::Object(map)
    }

    fn untag<T: ?Sized>(&self, value: Value) -> Result<Value, CodecError> {
        let settings = &*self.settings;
        let mut map = match value {
            Value::Object(map) => map,
            other => return Ok(other),
        };
        let tag = match map.get(&settings.type_tag_field) {
            Some(Value::String(tag)) => tag.clone(),
            _ => return Ok(Value::Object(map)),
        };

        let full = std::any::type_name::<T>();
        if tag != full && tag != short_type_name(full) {
            return Err(CodecError::Deserialization(format!(
                "payload is tagged '{}', expected '{}'",
                tag,
                settings.type_name_of::<T>()
            )));
        }

        map.remove(&settings.type_tag_field);
        if map.len() == 1 {
            if let Some(inner) = map.remove(&settings.value_field) {
                return Ok(inner);
            }
        }
        Ok(Value::Object(map))
    }
}

impl StateCodec for JsonCodec {
    fn encode<T: Serialize>(&self, state: &T) -> Result<Vec<u8>, CodecError> {
        if self.settings.type_name_handling == TypeNameHandling::None {
            return self.render(state);
        }
        let payload =
            serde_json::to_value(state).map_err(|e| CodecError::Serialization(e.to_string()))?;
        let tagged = self.tag(payload, self.settings.type_name_of::<T>());
        self.render(&tagged)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, CodecError> {
        let de = |e: serde_json::Error| CodecError::Deserialization(e.to_string());
        if self.settings.type_name_handling == TypeNameHandling::None {
            return serde_json::from_slice(data).map_err(de);
        }
        let value: Value = serde_json::from_slice(data).map_err(de)?;
        let value = self.untag::<T>(value)?;
        serde_json::from_value(value).map_err(de)
    }
}

/// Strip module paths from every segment of a type name.
///
/// `alloc::vec::Vec<app::Account>` becomes `Vec<Account>`.
fn short_type_name(full: &str) -> String {
    fn last_segment(path: &str) -> &str {
        path.rsplit("::").next().unwrap_or(path)
    }

    let mut out = String::with_capacity(full.len());
    let mut start = 0;
    for (i, c) in full.char_indices() {
        if c.is_alphanumeric() || c == '_' || c == ':' {
            continue;
        }
        out.push_str(last_segment(&full[start..i]));
        out.push(c);
        start = i + c.len_utf8();
    }
    out.push_str(last_segment(&full[start..]));
    out
}
