//! Background maintenance tasks.

use std::time::Duration;

use tracing::{debug, warn};

use crate::state::AppState;

/// How often the rankings view is recomputed regardless of write traffic.
/// Masks refreshes missed by the best-effort refresh-after-write path.
const RANKINGS_REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// How often expired denylist entries are swept out.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Spawn the periodic maintenance tasks. They run for the lifetime of the
/// process and die with it.
pub fn spawn(state: &AppState) {
    let rankings = state.services.rankings.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(RANKINGS_REFRESH_INTERVAL);
        interval.tick().await; // First tick fires immediately; skip it.
        loop {
            interval.tick().await;
            match rankings.refresh().await {
                Ok(()) => debug!("Periodic rankings refresh complete"),
                Err(e) => warn!("Periodic rankings refresh failed: {}", e),
            }
        }
    });

    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        interval.tick().await;
        loop {
            interval.tick().await;
            sessions.sweep();
            debug!("Session denylist sweep complete");
        }
    });
}
