//! Error types for grain state storage.
//!
//! Runtime failures are layered: the codec and the store client raise
//! [`CodecError`] and [`StoreError`], the provider wraps them in an
//! [`OperationError`] and attaches the grain context in
//! [`GrainStorageError`]. Ordering mistakes by the host (calling an operation
//! before `init`, or `init` twice) surface as [`LifecycleError`], which is a
//! programming error rather than a storage failure.

use thiserror::Error;

use crate::lifecycle::ProviderState;

/// Errors raised by the state codec.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The state value cannot be represented in the storage format.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The stored payload is malformed, truncated, or tagged with another type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

/// Errors raised by a key-value store client.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or rejected the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The connection target could not be turned into a client.
    #[error("invalid connection target '{target}': {reason}")]
    InvalidTarget {
        /// The connection target as configured.
        target: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Underlying I/O error (file-backed stores).
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a provider failed to initialize.
#[derive(Debug, Error)]
pub enum InitError {
    /// The provider options are incomplete or inconsistent.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// The serializer settings were rejected after customization.
    #[error("invalid serializer settings: {0}")]
    InvalidSettings(String),

    /// The store client could not be constructed.
    #[error("store connection failed: {0}")]
    Connect(#[source] StoreError),
}

/// The underlying cause of a failed read, write or clear.
#[derive(Debug, Error)]
pub enum OperationError {
    /// Encoding or decoding the state failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The store client failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Host ordering violations.
///
/// These never come from the store or the codec; they mean the host routed
/// a call at the wrong point of the provider's lifecycle.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// An operation was issued before the provider reached `Ready`.
    #[error("provider '{provider}' is {state:?}, operations require Ready")]
    NotReady {
        /// Provider name.
        provider: String,
        /// State observed when the call arrived.
        state: ProviderState,
    },

    /// `init` was called on a provider that already left `Uninitialized`.
    #[error("provider '{provider}' cannot initialize from {state:?}")]
    AlreadyInitialized {
        /// Provider name.
        provider: String,
        /// State observed when the call arrived.
        state: ProviderState,
    },
}

/// Errors returned by a grain storage provider.
#[derive(Debug, Error)]
pub enum GrainStorageError {
    /// Initialization failed; the provider never becomes `Ready`.
    #[error("initialization failed for provider '{provider}' in stage {stage}: {source}")]
    Initialization {
        /// Provider name.
        provider: String,
        /// Lifecycle stage the provider was initializing in.
        stage: i32,
        /// What went wrong.
        #[source]
        source: InitError,
    },

    /// Reading grain state failed.
    #[error("error reading: grain_type={grain_type} grain_id={grain_id} key={key} provider={provider}: {source}")]
    Read {
        /// Provider name.
        provider: String,
        /// Grain type the call was made for.
        grain_type: String,
        /// Canonical grain id.
        grain_id: String,
        /// Derived storage key.
        key: String,
        /// Codec or store failure.
        #[source]
        source: OperationError,
    },

    /// Writing grain state failed.
    #[error("error writing: grain_type={grain_type} grain_id={grain_id} key={key} provider={provider}: {source}")]
    Write {
        /// Provider name.
        provider: String,
        /// Grain type the call was made for.
        grain_type: String,
        /// Canonical grain id.
        grain_id: String,
        /// Derived storage key.
        key: String,
        /// Codec or store failure.
        #[source]
        source: OperationError,
    },

    /// Clearing grain state failed.
    #[error("error clearing: grain_type={grain_type} grain_id={grain_id} key={key} provider={provider}: {source}")]
    Clear {
        /// Provider name.
        provider: String,
        /// Grain type the call was made for.
        grain_type: String,
        /// Canonical grain id.
        grain_id: String,
        /// Derived storage key.
        key: String,
        /// Store failure.
        #[source]
        source: OperationError,
    },

    /// The host called the provider out of lifecycle order.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

impl GrainStorageError {
    /// Whether this error signals a host ordering bug rather than a storage failure.
    pub fn is_programming_error(&self) -> bool {
        matches!(self, GrainStorageError::Lifecycle(_))
    }

    /// The codec or store failure behind a read, write or clear error.
    pub fn operation_error(&self) -> Option<&OperationError> {
        match self {
            GrainStorageError::Read { source, .. }
            | GrainStorageError::Write { source, .. }
            | GrainStorageError::Clear { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Whether the failure came from encoding the state.
    pub fn is_serialization(&self) -> bool {
        matches!(
            self.operation_error(),
            Some(OperationError::Codec(CodecError::Serialization(_)))
        )
    }

    /// Whether the failure came from decoding a stored payload.
    pub fn is_deserialization(&self) -> bool {
        matches!(
            self.operation_error(),
            Some(OperationError::Codec(CodecError::Deserialization(_)))
        )
    }

    /// Whether the failure came from the store client.
    pub fn is_store_failure(&self) -> bool {
        matches!(self.operation_error(), Some(OperationError::Store(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_error(source: OperationError) -> GrainStorageError {
        GrainStorageError::Read {
            provider: "store".to_string(),
            grain_type: "Account".to_string(),
            grain_id: "42".to_string(),
            key: "store-Account-42.json".to_string(),
            source,
        }
    }

    #[test]
    fn test_classification() {
        let err = read_error(CodecError::Deserialization("eof".to_string()).into());
        assert!(err.is_deserialization());
        assert!(!err.is_serialization());
        assert!(!err.is_store_failure());
        assert!(!err.is_programming_error());

        let err = read_error(StoreError::Unavailable("timeout".to_string()).into());
        assert!(err.is_store_failure());

        let err: GrainStorageError = LifecycleError::NotReady {
            provider: "store".to_string(),
            state: ProviderState::Uninitialized,
        }
        .into();
        assert!(err.is_programming_error());
        assert!(err.operation_error().is_none());
    }

    #[test]
    fn test_display_carries_context() {
        let err = read_error(StoreError::Unavailable("timeout".to_string()).into());
        let msg = err.to_string();
        assert!(msg.contains("grain_type=Account"));
        assert!(msg.contains("key=store-Account-42.json"));
        assert!(msg.contains("store unavailable: timeout"));
    }
}
