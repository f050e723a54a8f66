use std::{sync::Arc, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::store::ConversationStore;

/// Sweep period when none is configured.
pub const DEFAULT_SWEEP_PERIOD: Duration = Duration::from_secs(10 * 60);

/// Spawns a task that calls [`ConversationStore::sweep`] every `period`.
///
/// The first sweep happens one full period after spawning. The task exits
/// when `shutdown` is cancelled.
pub fn spawn_sweeper(
    store: Arc<ConversationStore>,
    period: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(period_secs = period.as_secs(), "conversation sweeper started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let removed = store.sweep();
                    if removed > 0 {
                        info!(removed, remaining = store.len(), "expired conversations removed");
                    } else {
                        debug!(remaining = store.len(), "sweep found nothing to remove");
                    }
                }
            }
        }

        info!("conversation sweeper stopped");
    })
}
