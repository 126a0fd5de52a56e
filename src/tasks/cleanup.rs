//! Session Cleanup Task
//!
//! Background task that periodically sweeps idle sessions and expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::sandbox::Sandbox;

/// Spawns a background task that periodically cleans up sandbox state.
///
/// Each run purges TTL-expired cache entries and removes every session idle
/// for longer than the configured timeout. The sandbox never schedules this
/// itself; the host decides the cadence.
///
/// Returns a JoinHandle that can be aborted during graceful shutdown.
pub fn spawn_cleanup_task(sandbox: Arc<RwLock<Sandbox>>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting sandbox cleanup task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let (expired, report) = {
                let mut sandbox = sandbox.write().await;
                (sandbox.cleanup_expired_entries(), sandbox.sweep_inactive())
            };

            if expired > 0 || report.total() > 0 {
                info!(
                    "Sandbox cleanup: removed {} expired entries, {} idle session stores",
                    expired,
                    report.total()
                );
            } else {
                debug!("Sandbox cleanup: nothing to remove");
            }
        }
    })
}
