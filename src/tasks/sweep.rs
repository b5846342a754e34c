//! Memory Sweep Task
//!
//! Expiry in the memory tier is lazy, so an entry that is written once and
//! never read again would sit in the map until eviction pressure found it.
//! This task sweeps expired entries on an interval to bound that growth. The
//! remote tier needs no equivalent; it expires keys natively.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::MemoryTier;

/// Spawns a background task that periodically sweeps expired entries out of
/// the memory tier.
///
/// # Arguments
/// * `memory` - Shared handle to the memory tier
/// * `sweep_interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, used to abort it during graceful
/// shutdown.
pub fn spawn_sweep_task(
    memory: Arc<RwLock<MemoryTier>>,
    sweep_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(sweep_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting memory sweep task with interval of {} seconds",
            sweep_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut tier = memory.write().await;
                tier.sweep_expired()
            };

            if removed > 0 {
                info!("Memory sweep: removed {} expired entries", removed);
            } else {
                debug!("Memory sweep: no expired entries found");
            }
        }
    })
}
