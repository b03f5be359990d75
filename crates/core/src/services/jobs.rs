//! Background jobs.

use chrono::Utc;
use std::time::Duration;
use tokio::time::interval;
use tracing::error;

use super::restriction::RestrictionService;

/// Spawn the periodic restriction sweeper.
///
/// Each tick clears expired bans and suspensions and removes expired
/// mute rows. A failed sweep is logged and retried on the next tick.
pub fn spawn_restriction_sweeper(
    restrictions: RestrictionService,
    period: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if let Err(e) = restrictions.sweep_expired(Utc::now().fixed_offset()).await {
                error!(error = %e, "Restriction sweep failed");
            }
        }
    })
}
