//! Background maintenance: periodic expiry sweeps and statistics passes.
//!
//! The scheduler is owned by the manager's lifecycle: started at
//! construction, stopped cooperatively on shutdown. The stop signal is
//! checked between sweep rounds, never mid-tier, and no tier lock is held
//! across an await point longer than that tier's own sweep.

use std::time::Instant;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::cache::manager::TierMap;
use crate::cache::size::EstimateSize;
use crate::config::MaintenanceConfig;

/// Handle to the running maintenance task.
pub struct MaintenanceHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl MaintenanceHandle {
    /// Signal the task to stop and wait for it to finish its current round.
    pub async fn shutdown(self) {
        let _ = self.stop_tx.send(true);
        let _ = self.task.await;
    }
}

/// Spawn the maintenance task over the given tier registry.
pub(crate) fn spawn<V>(tiers: TierMap<V>, config: MaintenanceConfig) -> MaintenanceHandle
where
    V: EstimateSize + Send + Sync + 'static,
{
    let (stop_tx, mut stop_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut sweep = tokio::time::interval(config.sweep_interval());
        let mut stats = tokio::time::interval(config.stats_interval());
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);
        stats.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // Both intervals fire immediately on creation; consume those ticks
        // so the first real round happens one period in.
        sweep.tick().await;
        stats.tick().await;

        loop {
            tokio::select! {
                _ = sweep.tick() => {
                    sweep_all(&tiers).await;
                }
                _ = stats.tick() => {
                    log_statistics(&tiers).await;
                }
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        break;
                    }
                }
            }
        }

        debug!("Maintenance scheduler stopped");
    });

    MaintenanceHandle { stop_tx, task }
}

/// One expiry sweep across every tier, one tier lock at a time.
async fn sweep_all<V: EstimateSize>(tiers: &TierMap<V>) {
    let snapshot: Vec<_> = {
        let registry = tiers.read().await;
        registry
            .iter()
            .map(|(name, tier)| (name.clone(), tier.clone()))
            .collect()
    };

    for (name, tier) in snapshot {
        let removed = tier.write().await.sweep_expired(Instant::now());
        if removed > 0 {
            info!(tier = %name, removed, "Expiry sweep removed entries");
        }
    }
}

/// Low-frequency observability pass: log a statistics snapshot per tier.
async fn log_statistics<V: EstimateSize>(tiers: &TierMap<V>) {
    let snapshot: Vec<_> = {
        let registry = tiers.read().await;
        registry
            .iter()
            .map(|(name, tier)| (name.clone(), tier.clone()))
            .collect()
    };

    for (name, tier) in snapshot {
        let stats = tier.read().await.statistics();
        debug!(
            tier = %name,
            hits = stats.hits,
            misses = stats.misses,
            hit_rate = stats.hit_rate,
            evictions = stats.evictions,
            entries = stats.entries,
            current_size_bytes = stats.current_size_bytes,
            "Tier statistics"
        );
    }
}
