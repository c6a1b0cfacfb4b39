//! Banking Example: bank account grains persisted through `KvGrainStorage`.
//!
//! # What It Shows
//!
//! - **Lifecycle**: the provider's `init` runs as a silo startup stage
//! - **Activation**: each account reads its state, starting from default when new
//! - **Turns**: deposits mutate the in-memory state and write it back
//! - **Reactivation**: a fresh activation sees the persisted balance
//! - **Reset**: clearing removes the durable copy only
//!
//! Run with `RUST_LOG=trace` to see every storage event:
//!
//! ```text
//! cargo run -p grain-storage --example banking
//! ```

use std::sync::Arc;

use grain_storage::{
    GrainId, GrainState, GrainStorage, GrainStorageError, GrainStorageOptions, KvGrainStorage,
    LifecycleParticipant, SiloLifecycle,
};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

const BANK_ACCOUNT: &str = "BankAccount";

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct BankAccountData {
    balance: i64,
    deposits: u32,
}

/// A minimal activation: the host's view of one live grain.
struct BankAccount {
    id: GrainId,
    state: GrainState<BankAccountData>,
}

impl BankAccount {
    async fn activate(
        storage: &KvGrainStorage,
        id: GrainId,
    ) -> Result<Self, GrainStorageError> {
        let mut state = GrainState::default();
        storage.read_state(BANK_ACCOUNT, &id, &mut state).await?;
        Ok(Self { id, state })
    }

    async fn deposit(
        &mut self,
        storage: &KvGrainStorage,
        amount: i64,
    ) -> Result<i64, GrainStorageError> {
        self.state.state.balance += amount;
        self.state.state.deposits += 1;
        storage.write_state(BANK_ACCOUNT, &self.id, &self.state).await?;
        Ok(self.state.state.balance)
    }

    async fn reset(&mut self, storage: &KvGrainStorage) -> Result<(), GrainStorageError> {
        storage.clear_state(BANK_ACCOUNT, &self.id, &mut self.state).await
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let storage = Arc::new(KvGrainStorage::new(
        "bank",
        GrainStorageOptions::builder()
            .connection_string("memory://bank")
            .indent_json(true)
            .build(),
    ));

    let mut lifecycle = SiloLifecycle::new();
    storage.clone().participate(&mut lifecycle);
    lifecycle.start().await?;

    for name in ["alice", "bob"] {
        let mut account = BankAccount::activate(&storage, GrainId::from(name)).await?;
        account.deposit(&storage, 100).await?;
        let balance = account.deposit(&storage, 50).await?;
        println!("{name}: deposited twice, balance {balance}");
    }

    // Deactivated; a new activation reloads from the store.
    let mut alice = BankAccount::activate(&storage, GrainId::from("alice")).await?;
    println!(
        "alice reactivated: balance {} after {} deposits (etag {:?})",
        alice.state.state.balance,
        alice.state.state.deposits,
        alice.state.etag()
    );

    alice.reset(&storage).await?;
    let fresh = BankAccount::activate(&storage, GrainId::from("alice")).await?;
    println!(
        "alice after reset: balance {} (etag {:?})",
        fresh.state.state.balance,
        fresh.state.etag()
    );

    Ok(())
}
