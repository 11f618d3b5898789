//! Sweep ticker.
//!
//! Emits a fixed number of [`AppEvent::SweepTick`] requests at a fixed
//! interval. The event loop turns each one into a pair of crossing one-lot
//! orders; this task never touches trading state itself.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::app::AppEvent;
use crate::config::SweepConfig;

/// Run the ticker. Returns the number of ticks delivered.
pub async fn run(
    config: SweepConfig,
    tx: mpsc::Sender<AppEvent>,
    shutdown: CancellationToken,
) -> u32 {
    info!(
        ticks = config.ticks,
        interval_ms = config.interval_ms,
        "Sweep started"
    );

    let mut interval = tokio::time::interval(Duration::from_millis(config.interval_ms.max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut sent = 0;

    while sent < config.ticks {
        tokio::select! {
            biased;
            () = shutdown.cancelled() => {
                debug!(sent, "Sweep cancelled");
                break;
            }
            _ = interval.tick() => {}
        }

        if tx.send(AppEvent::SweepTick).await.is_err() {
            break;
        }
        sent += 1;
    }

    info!(sent, "Sweep finished");
    sent
}
