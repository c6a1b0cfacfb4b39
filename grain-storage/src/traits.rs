//! Grain storage provider trait abstraction.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::GrainStorageError;
use crate::id::GrainId;

/// Host-owned container for one grain's in-memory state.
///
/// Providers only touch `state` and `etag`; the host owns everything else
/// about the grain's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrainState<T> {
    /// The grain's state value.
    pub state: T,
    /// Marker set by the provider when state is loaded, cleared on clear.
    pub etag: Option<String>,
}

impl<T> GrainState<T> {
    /// Wrap a state value that has not been loaded from storage.
    pub fn new(state: T) -> Self {
        Self { state, etag: None }
    }

    /// The current ETag, if any.
    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }
}

/// Trait for durable grain state storage.
///
/// The host calls `read_state` on activation, `write_state` after a
/// state-mutating turn and `clear_state` on explicit reset. Calls for
/// different grains may run concurrently; the host never overlaps
/// write/clear calls for the same grain.
#[async_trait]
pub trait GrainStorage: Send + Sync {
    /// Load stored state into `grain_state`.
    ///
    /// # Returns
    ///
    /// - `Ok(())` with `grain_state` updated: state found and loaded
    /// - `Ok(())` with `grain_state` untouched: nothing stored (new activation)
    /// - `Err(GrainStorageError)`: load failed, `grain_state` untouched
    async fn read_state<T>(
        &self,
        grain_type: &str,
        grain_id: &GrainId,
        grain_state: &mut GrainState<T>,
    ) -> Result<(), GrainStorageError>
    where
        T: DeserializeOwned + Send;

    /// Persist `grain_state.state`, replacing whatever was stored.
    async fn write_state<T>(
        &self,
        grain_type: &str,
        grain_id: &GrainId,
        grain_state: &GrainState<T>,
    ) -> Result<(), GrainStorageError>
    where
        T: Serialize + Sync;

    /// Remove the stored state. The in-memory state value is kept.
    async fn clear_state<T>(
        &self,
        grain_type: &str,
        grain_id: &GrainId,
        grain_state: &mut GrainState<T>,
    ) -> Result<(), GrainStorageError>
    where
        T: Send;
}
