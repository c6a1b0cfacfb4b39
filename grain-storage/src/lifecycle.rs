//! Host startup lifecycle and provider state machine.
//!
//! The host drives startup through numbered stages. Services subscribe an
//! observer at a stage; [`SiloLifecycle::start`] runs the observers in
//! ascending stage order and stops at the first failure, which aborts
//! startup. Storage providers subscribe their `init` this way so that no
//! grain can be activated before its provider is ready.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Well-known startup stages, lowest runs first.
pub struct ServiceLifecycleStage;

impl ServiceLifecycleStage {
    /// First stage.
    pub const FIRST: i32 = i32::MIN;
    /// Runtime bootstrap.
    pub const RUNTIME_INITIALIZE: i32 = 2000;
    /// Core runtime services.
    pub const RUNTIME_SERVICES: i32 = 4000;
    /// Runtime storage services.
    pub const RUNTIME_STORAGE_SERVICES: i32 = 6000;
    /// Grain services.
    pub const RUNTIME_GRAIN_SERVICES: i32 = 8000;
    /// Application services; default stage for grain storage providers.
    pub const APPLICATION_SERVICES: i32 = 10000;
    /// Just before the silo starts accepting requests.
    pub const BECOME_ACTIVE: i32 = Self::ACTIVE - 1;
    /// The silo is active.
    pub const ACTIVE: i32 = 20000;
    /// Last stage.
    pub const LAST: i32 = i32::MAX;
}

/// Grain storage provider lifecycle state machine.
///
/// # State Transitions
///
/// ```text
/// Uninitialized → Initializing → Ready
///                      ↓
///                    Failed
/// ```
///
/// `Ready` and `Failed` are terminal: a provider is initialized at most once
/// and is never re-initialized after a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderState {
    /// Constructed, `init` not yet called.
    Uninitialized,
    /// `init` in progress.
    Initializing,
    /// Serving read/write/clear.
    Ready,
    /// `init` failed.
    Failed,
}

impl ProviderState {
    /// Check if transition to next state is valid.
    pub fn can_transition_to(&self, next: ProviderState) -> bool {
        use ProviderState::*;
        matches!(
            (self, next),
            (Uninitialized, Initializing) | (Initializing, Ready) | (Initializing, Failed)
        )
    }

    /// Check if grain operations may run in this state.
    pub fn can_serve(&self) -> bool {
        matches!(self, ProviderState::Ready)
    }
}

/// Error type observers return from [`LifecycleObserver::on_start`].
pub type ObserverError = Box<dyn std::error::Error + Send + Sync>;

/// A startup hook run by [`SiloLifecycle`].
#[async_trait]
pub trait LifecycleObserver: Send + Sync {
    /// Run the hook. An error aborts startup.
    async fn on_start(&self) -> Result<(), ObserverError>;
}

/// A service that registers observers with the host lifecycle.
pub trait LifecycleParticipant {
    /// Subscribe this service's startup hooks.
    fn participate(self: Arc<Self>, lifecycle: &mut SiloLifecycle);
}

/// Startup aborted because an observer failed.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// An observer returned an error.
    #[error("lifecycle observer '{observer}' failed in stage {stage}: {source}")]
    ObserverFailed {
        /// Name the observer subscribed with.
        observer: String,
        /// Stage it ran in.
        stage: i32,
        /// The observer's error.
        #[source]
        source: ObserverError,
    },

    /// `start` was called more than once.
    #[error("lifecycle already started")]
    AlreadyStarted,
}

struct Subscription {
    name: String,
    stage: i32,
    observer: Arc<dyn LifecycleObserver>,
}

/// Host-side startup orchestrator.
#[derive(Default)]
pub struct SiloLifecycle {
    subscriptions: Vec<Subscription>,
    started: bool,
    highest_completed_stage: Option<i32>,
}

impl std::fmt::Debug for SiloLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiloLifecycle")
            .field(
                "subscriptions",
                &self
                    .subscriptions
                    .iter()
                    .map(|s| (s.name.as_str(), s.stage))
                    .collect::<Vec<_>>(),
            )
            .field("started", &self.started)
            .field("highest_completed_stage", &self.highest_completed_stage)
            .finish()
    }
}

impl SiloLifecycle {
    /// Create an empty lifecycle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `observer` to run at `stage`.
    ///
    /// Observers in the same stage run in subscription order.
    pub fn subscribe(
        &mut self,
        name: impl Into<String>,
        stage: i32,
        observer: Arc<dyn LifecycleObserver>,
    ) {
        self.subscriptions.push(Subscription {
            name: name.into(),
            stage,
            observer,
        });
    }

    /// Number of subscribed observers.
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Highest stage whose observers all completed.
    pub fn highest_completed_stage(&self) -> Option<i32> {
        self.highest_completed_stage
    }

    /// Run every observer in stage order.
    pub async fn start(&mut self) -> Result<(), StartupError> {
        if self.started {
            return Err(StartupError::AlreadyStarted);
        }
        self.started = true;

        // Stable sort keeps subscription order within a stage.
        self.subscriptions.sort_by_key(|s| s.stage);

        let mut index = 0;
        while index < self.subscriptions.len() {
            let stage = self.subscriptions[index].stage;
            let stage_start = Instant::now();
            while index < self.subscriptions.len() && self.subscriptions[index].stage == stage {
                let subscription = &self.subscriptions[index];
                tracing::debug!(
                    observer = %subscription.name,
                    stage,
                    "starting lifecycle observer"
                );
                if let Err(source) = subscription.observer.on_start().await {
                    tracing::error!(
                        observer = %subscription.name,
                        stage,
                        error = %source,
                        "lifecycle observer failed, aborting startup"
                    );
                    return Err(StartupError::ObserverFailed {
                        observer: subscription.name.clone(),
                        stage,
                        source,
                    });
                }
                index += 1;
            }
            self.highest_completed_stage = Some(stage);
            tracing::info!(
                stage,
                elapsed_ms = stage_start.elapsed().as_millis() as u64,
                "lifecycle stage completed"
            );
        }
        Ok(())
    }
}
