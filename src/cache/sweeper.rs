//! # Periodic Expiry Sweeper
//!
//! Background tokio task that reclaims expired sessions from a
//! [`SessionStore`] on a fixed interval, so memory held by sessions nobody
//! will look up again is released even on an idle server.
//!
//! ## Usage
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tls_session_cache::cache::store::SessionStore;
//! use tls_session_cache::cache::sweeper::spawn_sweeper;
//!
//! # async fn run() {
//! let store = Arc::new(SessionStore::new(20 * 1024));
//! let sweeper = spawn_sweeper(store.clone(), Duration::from_secs(60));
//! // ... serve connections ...
//! sweeper.shutdown().await;
//! # }
//! ```

use crate::cache::store::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument};

/// Handle to a running sweeper task
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Stop the sweeper and wait for the task to finish
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        let _ = self.task.await;
    }

    /// Whether the task has already stopped
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawn a task that calls [`SessionStore::sweep_expired`] every `period`.
///
/// The cutoff is the store clock's current reading. A clock reading of 0
/// is skipped, since a sweep with cutoff 0 would clear the whole store.
/// Must be called from within a tokio runtime.
#[instrument(skip(store))]
pub fn spawn_sweeper(store: Arc<SessionStore>, period: Duration) -> SweeperHandle {
    let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
    let period = period.max(Duration::from_millis(1));

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Session sweeper shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    let now = store.clock().now();
                    if now == 0 {
                        continue;
                    }
                    let removed = store.sweep_expired(now);
                    if removed > 0 {
                        debug!(removed_count = removed, "Periodic sweep reclaimed sessions");
                    }
                }
            }
        }
    });

    SweeperHandle { shutdown_tx, task }
}
