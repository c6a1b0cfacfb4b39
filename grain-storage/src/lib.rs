//! # grain-storage
//!
//! Durable state for virtual actors ("grains") on top of a key-value store.
//!
//! A grain's whole state is one JSON value stored under
//! `{provider}-{grain_type}-{grain_id}.json`. The host reads it on activation,
//! writes it after state-mutating turns and clears it on explicit reset.
//!
//! ## Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  KvGrainStorage (provider)                                  │
//! │   • read_state / write_state / clear_state                  │
//! │   • init, subscribed to the host SiloLifecycle              │
//! ├──────────────────┬──────────────────┬───────────────────────┤
//! │  key             │  codec           │  store                │
//! │  • derive_key    │  • JsonCodec     │  • KvStore trait      │
//! │  • StorageKey    │  • Serializer-   │  • InMemoryKvStore    │
//! │                  │    Settings      │  • FileKvStore        │
//! │                  │                  │  • StoreConnector     │
//! ├──────────────────┴──────────────────┴───────────────────────┤
//! │  id (GrainId) · options · lifecycle · error                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use grain_storage::*;
//!
//! let storage = Arc::new(KvGrainStorage::new(
//!     "accounts",
//!     GrainStorageOptions::builder()
//!         .connection_string("file:///var/lib/grains")
//!         .build(),
//! ));
//!
//! let mut lifecycle = SiloLifecycle::new();
//! storage.clone().participate(&mut lifecycle);
//! lifecycle.start().await?;
//!
//! let id = GrainId::from("42");
//! let mut state = GrainState::new(Account { balance: 100 });
//! storage.write_state("Account", &id, &state).await?;
//! storage.read_state("Account", &id, &mut state).await?;
//! ```

#![warn(missing_docs)]

pub mod codec;
pub mod error;
pub mod id;
pub mod key;
pub mod lifecycle;
pub mod options;
pub mod provider;
pub mod store;
pub mod traits;

// Re-exports
pub use codec::{JsonCodec, SerializerSettings, StateCodec, TypeNameHandling};
pub use error::{
    CodecError, GrainStorageError, InitError, LifecycleError, OperationError, StoreError,
};
pub use id::{GrainId, GrainKey};
pub use key::{derive_key, StorageKey};
pub use lifecycle::{
    LifecycleObserver, LifecycleParticipant, ObserverError, ProviderState, ServiceLifecycleStage,
    SiloLifecycle, StartupError,
};
pub use options::{GrainStorageOptions, GrainStorageOptionsBuilder, SerializerSettingsHook};
pub use provider::{KvGrainStorage, ProviderEvent};
pub use store::{DefaultConnector, FileKvStore, InMemoryKvStore, KvStore, StoreConnector};
pub use traits::{GrainState, GrainStorage};
