//! Periodic liveness probing of every registered provider.
//!
//! One task per provider ticks on the configured probe interval, so a slow
//! or hanging carrier never delays the probes of the others. The first probe
//! runs immediately on start.

use std::sync::Arc;
use std::time::Duration;

use courier_provider::ProviderRegistry;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info};

use crate::health::HealthMonitor;

/// Background probe tasks feeding the [`HealthMonitor`].
pub struct HealthProber {
    providers: ProviderRegistry,
    health: Arc<HealthMonitor>,
    interval: Duration,
    tracker: TaskTracker,
    cancel: CancellationToken,
}

impl HealthProber {
    /// Create a prober using the monitor's configured probe interval.
    pub fn new(providers: ProviderRegistry, health: Arc<HealthMonitor>) -> Self {
        let interval = health.config().probe_interval;
        Self {
            providers,
            health,
            interval,
            tracker: TaskTracker::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Spawn one probe loop per registered provider.
    pub fn start(&self) {
        info!(
            providers = self.providers.len(),
            interval_secs = self.interval.as_secs(),
            "starting provider health probes"
        );
        for id in self.providers.ids() {
            let Some(provider) = self.providers.get(id.as_str()) else {
                continue;
            };
            let health = Arc::clone(&self.health);
            let cancel = self.cancel.clone();
            let period = self.interval;

            self.tracker.spawn(async move {
                let mut ticker = interval(period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    tokio::select! {
                        () = cancel.cancelled() => {
                            debug!(provider = %id, "probe loop stopping");
                            break;
                        }
                        _ = ticker.tick() => {
                            // Failures are already logged and folded into health.
                            let _ = health.probe(&id, provider.as_ref()).await;
                        }
                    }
                }
            });
        }
    }

    /// Stop every probe loop and wait for them to exit.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        self.tracker.close();
        self.tracker.wait().await;
        info!("provider health probes stopped");
    }
}

impl std::fmt::Debug for HealthProber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthProber")
            .field("providers", &self.providers)
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}
