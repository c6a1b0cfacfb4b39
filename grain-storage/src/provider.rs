//! Key-value grain storage provider.
//!
//! [`KvGrainStorage`] stores each grain's state as one JSON value under a key
//! derived from the provider name, grain type and grain id. It is built in
//! two phases: construction only records options, and [`KvGrainStorage::init`]
//! (normally run by the host's [`SiloLifecycle`]) builds the serializer
//! settings and connects the store client. Grain operations are refused until
//! init has succeeded.
//!
//! # Concurrency
//!
//! The store client and serializer settings are created once and shared by
//! every call. There is no per-grain lock and no optimistic concurrency: a
//! write unconditionally replaces the stored value, and the ETag is only the
//! storage key echoed back after a successful read. Two hosts writing the same
//! grain concurrently will silently overwrite each other.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Instant;
use tracing::{error, info, trace};

use crate::codec::{JsonCodec, StateCodec};
use crate::error::{GrainStorageError, InitError, LifecycleError, OperationError};
use crate::id::GrainId;
use crate::key::{derive_key, StorageKey};
use crate::lifecycle::{
    LifecycleObserver, LifecycleParticipant, ObserverError, ProviderState, SiloLifecycle,
};
use crate::options::GrainStorageOptions;
use crate::store::{DefaultConnector, KvStore, StoreConnector};
use crate::traits::{GrainState, GrainStorage};

/// Numeric codes attached to provider log events as the `code` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderEvent {
    /// Init started.
    InitProvider = 310_100,
    /// Storage key prefix in use.
    KeyPrefix = 310_101,
    /// Init finished.
    Initialized = 310_102,
    /// Init failed.
    InitError = 310_103,
    /// Read started.
    Reading = 310_110,
    /// Read finished.
    DataRead = 310_111,
    /// Read failed.
    ReadError = 310_112,
    /// Write started.
    Writing = 310_120,
    /// Write finished.
    Written = 310_121,
    /// Write failed.
    WriteError = 310_122,
    /// Clear started.
    Clearing = 310_130,
    /// Clear finished.
    Cleared = 310_131,
    /// Clear failed.
    ClearError = 310_132,
}

impl ProviderEvent {
    /// The numeric event code.
    pub fn code(self) -> u32 {
        self as u32
    }
}

/// Shared parts built by `init`.
#[derive(Debug)]
struct Connected {
    codec: JsonCodec,
    store: Arc<dyn KvStore>,
}

/// Grain storage provider over a key-value store.
///
/// # Example
///
/// ```rust,ignore
/// let storage = Arc::new(KvGrainStorage::new(
///     "accounts",
///     GrainStorageOptions::builder()
///         .connection_string("memory://cluster")
///         .build(),
/// ));
///
/// let mut lifecycle = SiloLifecycle::new();
/// storage.clone().participate(&mut lifecycle);
/// lifecycle.start().await?;
///
/// let mut state = GrainState::<Account>::default();
/// storage.read_state("Account", &GrainId::from("42"), &mut state).await?;
/// ```
#[derive(Debug)]
pub struct KvGrainStorage {
    name: String,
    options: GrainStorageOptions,
    connector: Arc<dyn StoreConnector>,
    state: Mutex<ProviderState>,
    connected: OnceLock<Connected>,
}

impl KvGrainStorage {
    /// Create a provider that connects through [`DefaultConnector`].
    pub fn new(name: impl Into<String>, options: GrainStorageOptions) -> Self {
        Self::with_connector(name, options, Arc::new(DefaultConnector::new()))
    }

    /// Create a provider that connects through `connector`.
    pub fn with_connector(
        name: impl Into<String>,
        options: GrainStorageOptions,
        connector: Arc<dyn StoreConnector>,
    ) -> Self {
        Self {
            name: name.into(),
            options,
            connector,
            state: Mutex::new(ProviderState::Uninitialized),
            connected: OnceLock::new(),
        }
    }

    /// Provider name, also the storage key prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The options this provider was created with.
    pub fn options(&self) -> &GrainStorageOptions {
        &self.options
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ProviderState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Storage key used for a grain.
    pub fn storage_key(&self, grain_type: &str, grain_id: &GrainId) -> StorageKey {
        derive_key(&self.name, grain_type, grain_id)
    }

    /// Build serializer settings and connect the store client.
    ///
    /// Must be called exactly once before any grain operation. A failure is
    /// fatal: the provider moves to [`ProviderState::Failed`] and stays there.
    pub async fn init(&self) -> Result<(), GrainStorageError> {
        if let Err(state) = self.transition(ProviderState::Initializing) {
            error!(
                code = ProviderEvent::InitError.code(),
                provider = %self.name,
                state = ?state,
                "provider {} is already initialized",
                self.name
            );
            return Err(LifecycleError::AlreadyInitialized {
                provider: self.name.clone(),
                state,
            }
            .into());
        }

        let stage = self.options.init_stage;
        let started = Instant::now();
        info!(
            code = ProviderEvent::InitProvider.code(),
            provider = %self.name,
            options = %self.options,
            "grain storage initializing"
        );
        info!(
            code = ProviderEvent::KeyPrefix.code(),
            provider = %self.name,
            "using storage key prefix {}",
            self.name
        );

        match self.connect().await {
            Ok(connected) => {
                // The state guard makes this the only successful init, so the cell is empty.
                let _ = self.connected.set(connected);
                self.set_state(ProviderState::Ready);
                let elapsed_ms = started.elapsed().as_millis() as u64;
                info!(
                    code = ProviderEvent::Initialized.code(),
                    provider = %self.name,
                    stage,
                    elapsed_ms,
                    "initializing provider {} in stage {} took {} ms",
                    self.name,
                    stage,
                    elapsed_ms
                );
                Ok(())
            }
            Err(source) => {
                self.set_state(ProviderState::Failed);
                let elapsed_ms = started.elapsed().as_millis() as u64;
                error!(
                    code = ProviderEvent::InitError.code(),
                    provider = %self.name,
                    stage,
                    elapsed_ms,
                    error = %source,
                    "initialization failed for provider {} in stage {}",
                    self.name,
                    stage
                );
                Err(GrainStorageError::Initialization {
                    provider: self.name.clone(),
                    stage,
                    source,
                })
            }
        }
    }

    async fn connect(&self) -> Result<Connected, InitError> {
        if self.name.is_empty() {
            return Err(InitError::InvalidOptions(
                "provider name cannot be empty".to_string(),
            ));
        }
        self.options.validate()?;
        let settings = Arc::new(self.options.serializer_settings()?);
        let store = self
            .connector
            .connect(&self.options.connection_string)
            .await
            .map_err(InitError::Connect)?;
        Ok(Connected {
            codec: JsonCodec::new(settings),
            store,
        })
    }

    fn transition(&self, next: ProviderState) -> Result<(), ProviderState> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if !state.can_transition_to(next) {
            return Err(*state);
        }
        *state = next;
        Ok(())
    }

    fn set_state(&self, next: ProviderState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = next;
    }

    fn connected(&self) -> Result<&Connected, LifecycleError> {
        let state = self.state();
        match self.connected.get() {
            Some(connected) if state.can_serve() => Ok(connected),
            _ => Err(LifecycleError::NotReady {
                provider: self.name.clone(),
                state,
            }),
        }
    }
}

#[async_trait]
impl GrainStorage for KvGrainStorage {
    async fn read_state<T>(
        &self,
        grain_type: &str,
        grain_id: &GrainId,
        grain_state: &mut GrainState<T>,
    ) -> Result<(), GrainStorageError>
    where
        T: DeserializeOwned + Send,
    {
        let connected = self.connected()?;
        let key = self.storage_key(grain_type, grain_id);
        trace!(
            code = ProviderEvent::Reading.code(),
            provider = %self.name,
            grain_type,
            grain_id = %grain_id,
            etag = ?grain_state.etag,
            key = %key,
            "reading grain state"
        );

        let fetched = connected.store.get(key.as_str()).await;
        if fetched.is_ok() {
            trace!(
                code = ProviderEvent::DataRead.code(),
                provider = %self.name,
                grain_type,
                grain_id = %grain_id,
                etag = ?grain_state.etag,
                key = %key,
                "read grain state"
            );
        }

        // Decode into a temporary so a failure leaves the caller's state untouched.
        let loaded: Result<Option<T>, OperationError> = match fetched {
            Ok(Some(bytes)) if bytes.is_empty() => Ok(None),
            Ok(Some(bytes)) => connected
                .codec
                .decode(&bytes)
                .map(Some)
                .map_err(OperationError::from),
            Ok(None) => Ok(None),
            Err(e) => Err(e.into()),
        };

        match loaded {
            Ok(Some(state)) => {
                grain_state.state = state;
                grain_state.etag = Some(key.into_string());
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(source) => {
                error!(
                    code = ProviderEvent::ReadError.code(),
                    provider = %self.name,
                    grain_type,
                    grain_id = %grain_id,
                    etag = ?grain_state.etag,
                    key = %key,
                    error = %source,
                    "error reading grain state"
                );
                Err(GrainStorageError::Read {
                    provider: self.name.clone(),
                    grain_type: grain_type.to_string(),
                    grain_id: grain_id.to_key_string(),
                    key: key.into_string(),
                    source,
                })
            }
        }
    }

    async fn write_state<T>(
        &self,
        grain_type: &str,
        grain_id: &GrainId,
        grain_state: &GrainState<T>,
    ) -> Result<(), GrainStorageError>
    where
        T: Serialize + Sync,
    {
        let connected = self.connected()?;
        let key = self.storage_key(grain_type, grain_id);
        trace!(
            code = ProviderEvent::Writing.code(),
            provider = %self.name,
            grain_type,
            grain_id = %grain_id,
            etag = ?grain_state.etag,
            key = %key,
            "writing grain state"
        );

        let written: Result<(), OperationError> = match connected.codec.encode(&grain_state.state) {
            Ok(bytes) => connected
                .store
                .put(key.as_str(), bytes)
                .await
                .map_err(OperationError::from),
            Err(e) => Err(e.into()),
        };

        match written {
            Ok(()) => {
                trace!(
                    code = ProviderEvent::Written.code(),
                    provider = %self.name,
                    grain_type,
                    grain_id = %grain_id,
                    etag = ?grain_state.etag,
                    key = %key,
                    "wrote grain state"
                );
                Ok(())
            }
            Err(source) => {
                error!(
                    code = ProviderEvent::WriteError.code(),
                    provider = %self.name,
                    grain_type,
                    grain_id = %grain_id,
                    etag = ?grain_state.etag,
                    key = %key,
                    error = %source,
                    "error writing grain state"
                );
                Err(GrainStorageError::Write {
                    provider: self.name.clone(),
                    grain_type: grain_type.to_string(),
                    grain_id: grain_id.to_key_string(),
                    key: key.into_string(),
                    source,
                })
            }
        }
    }

    async fn clear_state<T>(
        &self,
        grain_type: &str,
        grain_id: &GrainId,
        grain_state: &mut GrainState<T>,
    ) -> Result<(), GrainStorageError>
    where
        T: Send,
    {
        let connected = self.connected()?;
        let key = self.storage_key(grain_type, grain_id);
        trace!(
            code = ProviderEvent::Clearing.code(),
            provider = %self.name,
            grain_type,
            grain_id = %grain_id,
            etag = ?grain_state.etag,
            key = %key,
            "clearing grain state"
        );

        match connected.store.delete(key.as_str()).await {
            Ok(()) => {
                grain_state.etag = None;
                trace!(
                    code = ProviderEvent::Cleared.code(),
                    provider = %self.name,
                    grain_type,
                    grain_id = %grain_id,
                    key = %key,
                    "cleared grain state"
                );
                Ok(())
            }
            Err(e) => {
                let source = OperationError::from(e);
                error!(
                    code = ProviderEvent::ClearError.code(),
                    provider = %self.name,
                    grain_type,
                    grain_id = %grain_id,
                    etag = ?grain_state.etag,
                    key = %key,
                    error = %source,
                    "error clearing grain state"
                );
                Err(GrainStorageError::Clear {
                    provider: self.name.clone(),
                    grain_type: grain_type.to_string(),
                    grain_id: grain_id.to_key_string(),
                    key: key.into_string(),
                    source,
                })
            }
        }
    }
}

#[async_trait]
impl LifecycleObserver for KvGrainStorage {
    async fn on_start(&self) -> Result<(), ObserverError> {
        self.init().await.map_err(Into::into)
    }
}

impl LifecycleParticipant for KvGrainStorage {
    fn participate(self: Arc<Self>, lifecycle: &mut SiloLifecycle) {
        let name = format!("KvGrainStorage-{}", self.name);
        let stage = self.options.init_stage;
        lifecycle.subscribe(name, stage, self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CodecError, StoreError};
    use crate::store::InMemoryKvStore;
    use serde::Deserialize;

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    struct Account {
        balance: i64,
    }

    /// Connector handing out one pre-built store, so tests can reach into it.
    #[derive(Debug)]
    struct FixedConnector(Arc<InMemoryKvStore>);

    #[async_trait]
    impl StoreConnector for FixedConnector {
        async fn connect(&self, _target: &str) -> Result<Arc<dyn KvStore>, StoreError> {
            Ok(self.0.clone())
        }
    }

    /// Log sink for a test-local subscriber.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            let buf = self.0.lock().unwrap_or_else(|e| e.into_inner());
            String::from_utf8_lossy(&buf).into_owned()
        }
    }

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
            self.0
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn options() -> GrainStorageOptions {
        GrainStorageOptions::builder()
            .connection_string("memory://test")
            .build()
    }

    async fn ready_provider() -> (KvGrainStorage, Arc<InMemoryKvStore>) {
        let store = Arc::new(InMemoryKvStore::new());
        let provider = KvGrainStorage::with_connector(
            "store",
            options(),
            Arc::new(FixedConnector(store.clone())),
        );
        provider.init().await.expect("init");
        (provider, store)
    }

    #[tokio::test]
    async fn test_init_transitions_to_ready() {
        let provider = KvGrainStorage::new("store", options());
        assert_eq!(provider.state(), ProviderState::Uninitialized);

        provider.init().await.expect("init");
        assert_eq!(provider.state(), ProviderState::Ready);
    }

    #[tokio::test]
    async fn test_init_twice_is_a_programming_error() {
        let (provider, _) = ready_provider().await;
        let err = provider.init().await.expect_err("second init");
        assert!(err.is_programming_error());
        assert!(matches!(
            err,
            GrainStorageError::Lifecycle(LifecycleError::AlreadyInitialized {
                state: ProviderState::Ready,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_init_logs_elapsed_time() {
        let provider = KvGrainStorage::new("store", options());

        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer({
                let logs = logs.clone();
                move || logs.clone()
            })
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        provider.init().await.expect("init");

        let output = logs.contents();
        let line = output
            .lines()
            .find(|line| line.contains("code=310102"))
            .unwrap_or_else(|| panic!("no init log: {output}"));
        let field = line
            .split_whitespace()
            .find_map(|token| token.strip_prefix("elapsed_ms="))
            .expect("elapsed_ms field");
        assert!(
            line.contains(&format!("took {} ms", field)),
            "message and field disagree: {line}"
        );
    }

    #[tokio::test]
    async fn test_init_twice_logs_init_error() {
        let (provider, _) = ready_provider().await;

        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer({
                let logs = logs.clone();
                move || logs.clone()
            })
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        provider.init().await.expect_err("second init");

        let output = logs.contents();
        assert!(output.contains("ERROR"), "logs: {output}");
        assert!(output.contains("code=310103"), "logs: {output}");
        assert!(output.contains("already initialized"), "logs: {output}");
    }

    #[tokio::test]
    async fn test_operations_require_ready_state() {
        let (provider, _) = ready_provider().await;
        provider.set_state(ProviderState::Failed);

        let mut state = GrainState::<Account>::default();
        let err = provider
            .read_state("Account", &GrainId::from("42"), &mut state)
            .await
            .expect_err("provider no longer ready");
        assert!(matches!(
            err,
            GrainStorageError::Lifecycle(LifecycleError::NotReady {
                state: ProviderState::Failed,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_operations_before_init_fail_fast() {
        let provider = KvGrainStorage::new("store", options());
        let id = GrainId::from("42");
        let mut state = GrainState::<Account>::default();

        let err = provider
            .read_state("Account", &id, &mut state)
            .await
            .expect_err("read before init");
        assert!(matches!(
            err,
            GrainStorageError::Lifecycle(LifecycleError::NotReady {
                state: ProviderState::Uninitialized,
                ..
            })
        ));
        assert!(provider
            .write_state("Account", &id, &state)
            .await
            .expect_err("write before init")
            .is_programming_error());
        assert!(provider
            .clear_state("Account", &id, &mut state)
            .await
            .expect_err("clear before init")
            .is_programming_error());
    }

    #[tokio::test]
    async fn test_init_failure_is_terminal() {
        let provider = KvGrainStorage::new(
            "store",
            GrainStorageOptions::builder()
                .connection_string("etcd://localhost:2379")
                .build(),
        );

        let err = provider.init().await.expect_err("unknown scheme");
        assert!(matches!(
            err,
            GrainStorageError::Initialization {
                source: InitError::Connect(StoreError::InvalidTarget { .. }),
                ..
            }
        ));
        assert_eq!(provider.state(), ProviderState::Failed);

        let err = provider.init().await.expect_err("no re-initialization");
        assert!(err.is_programming_error());

        let mut state = GrainState::<Account>::default();
        let err = provider
            .read_state("Account", &GrainId::from("1"), &mut state)
            .await
            .expect_err("failed provider refuses reads");
        assert!(matches!(
            err,
            GrainStorageError::Lifecycle(LifecycleError::NotReady {
                state: ProviderState::Failed,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_init_rejects_missing_connection_string() {
        let provider = KvGrainStorage::new("store", GrainStorageOptions::default());
        let err = provider.init().await.expect_err("no target");
        assert!(matches!(
            err,
            GrainStorageError::Initialization {
                source: InitError::InvalidOptions(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_init_rejects_empty_name() {
        let provider = KvGrainStorage::new("", options());
        assert!(matches!(
            provider.init().await,
            Err(GrainStorageError::Initialization {
                source: InitError::InvalidOptions(_),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_read_sets_state_and_etag() {
        let (provider, store) = ready_provider().await;
        store
            .put("store-Account-s:42.json", br#"{"balance":100}"#.to_vec())
            .await
            .expect("seed");

        let mut state = GrainState::<Account>::default();
        provider
            .read_state("Account", &GrainId::from("42"), &mut state)
            .await
            .expect("read");

        assert_eq!(state.state.balance, 100);
        assert_eq!(state.etag(), Some("store-Account-s:42.json"));
    }

    #[tokio::test]
    async fn test_read_empty_payload_counts_as_absent() {
        let (provider, store) = ready_provider().await;
        store
            .put("store-Account-i:7.json", Vec::new())
            .await
            .expect("seed");

        let mut state = GrainState::new(Account { balance: 3 });
        provider
            .read_state("Account", &GrainId::from(7), &mut state)
            .await
            .expect("read");
        assert_eq!(state, GrainState::new(Account { balance: 3 }));
    }

    #[tokio::test]
    async fn test_read_decode_failure_leaves_state_untouched() {
        let (provider, store) = ready_provider().await;
        store
            .put("store-Account-s:42.json", br#"{"balance":"#.to_vec())
            .await
            .expect("seed");

        let mut state = GrainState {
            state: Account { balance: 5 },
            etag: Some("previous".to_string()),
        };
        let err = provider
            .read_state("Account", &GrainId::from("42"), &mut state)
            .await
            .expect_err("truncated payload");

        assert!(err.is_deserialization());
        assert_eq!(state.state.balance, 5);
        assert_eq!(state.etag(), Some("previous"));
    }

    #[tokio::test]
    async fn test_write_does_not_touch_etag() {
        let (provider, store) = ready_provider().await;
        let state = GrainState {
            state: Account { balance: 9 },
            etag: Some("kept".to_string()),
        };
        provider
            .write_state("Account", &GrainId::from("42"), &state)
            .await
            .expect("write");

        assert_eq!(state.etag(), Some("kept"));
        assert_eq!(
            store.get("store-Account-s:42.json").await.expect("get"),
            Some(br#"{"balance":9}"#.to_vec())
        );
    }

    #[tokio::test]
    async fn test_clear_keeps_state_value() {
        let (provider, store) = ready_provider().await;
        let id = GrainId::from("42");
        let mut state = GrainState::new(Account { balance: 1 });
        provider.write_state("Account", &id, &state).await.expect("write");
        provider.read_state("Account", &id, &mut state).await.expect("read");
        assert!(state.etag().is_some());

        provider.clear_state("Account", &id, &mut state).await.expect("clear");
        assert!(state.etag().is_none());
        assert_eq!(state.state.balance, 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_clear_failure_keeps_etag() {
        let (provider, store) = ready_provider().await;
        store.set_unavailable(true);
        let mut state = GrainState {
            state: Account::default(),
            etag: Some("store-Account-i:1.json".to_string()),
        };

        let err = provider
            .clear_state("Account", &GrainId::from(1), &mut state)
            .await
            .expect_err("store down");
        assert!(matches!(
            err,
            GrainStorageError::Clear {
                source: OperationError::Store(StoreError::Unavailable(_)),
                ..
            }
        ));
        assert_eq!(state.etag(), Some("store-Account-i:1.json"));
    }

    #[tokio::test]
    async fn test_write_store_failure() {
        let (provider, store) = ready_provider().await;
        store.set_unavailable(true);

        let err = provider
            .write_state("Account", &GrainId::from(1), &GrainState::new(Account::default()))
            .await
            .expect_err("store down");
        assert!(err.is_store_failure());
        assert!(matches!(err, GrainStorageError::Write { .. }));
    }

    #[tokio::test]
    async fn test_write_error_carries_context() {
        struct Broken;
        impl Serialize for Broken {
            fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("unrepresentable"))
            }
        }

        let (provider, _) = ready_provider().await;
        let err = provider
            .write_state("Account", &GrainId::from(3), &GrainState::new(Broken))
            .await
            .expect_err("encode fails");
        match err {
            GrainStorageError::Write {
                provider,
                grain_type,
                grain_id,
                key,
                source: OperationError::Codec(CodecError::Serialization(_)),
            } => {
                assert_eq!(provider, "store");
                assert_eq!(grain_type, "Account");
                assert_eq!(grain_id, "i:3");
                assert_eq!(key, "store-Account-i:3.json");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_participate_subscribes_init_at_configured_stage() {
        let provider = Arc::new(KvGrainStorage::new(
            "store",
            GrainStorageOptions::builder()
                .connection_string("memory://test")
                .init_stage(1234)
                .build(),
        ));
        let mut lifecycle = SiloLifecycle::new();
        provider.clone().participate(&mut lifecycle);
        assert_eq!(lifecycle.len(), 1);

        lifecycle.start().await.expect("start");
        assert_eq!(provider.state(), ProviderState::Ready);
        assert_eq!(lifecycle.highest_completed_stage(), Some(1234));
    }

    #[test]
    fn test_event_codes() {
        assert_eq!(ProviderEvent::InitProvider.code(), 310_100);
        assert_eq!(ProviderEvent::ClearError.code(), 310_132);
    }
}
