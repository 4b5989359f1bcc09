//! # Stream Schedulers
//!
//! One loop per enabled stream, each on its own polling interval. Ticks
//! that land while a run is still in flight are skipped rather than
//! queued, so a slow cycle never builds a backlog.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use shared_types::StreamProfile;

use crate::pipeline::Pipeline;

/// Poll one stream until shutdown is signalled.
///
/// The first tick fires immediately, so a freshly started mirror catches
/// up without waiting a full interval.
pub async fn run_stream_loop(
    pipeline: Arc<Pipeline>,
    profile: StreamProfile,
    poll_interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    info!(
        stream = profile.kind.as_str(),
        every_secs = poll_interval.as_secs(),
        "stream poll loop started"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(err) = pipeline.run_once(&profile).await {
                    error!(
                        stream = profile.kind.as_str(),
                        error = %err,
                        "poll cycle failed, will retry on the next tick"
                    );
                }
            }
            _ = shutdown.changed() => {
                info!(
                    stream = profile.kind.as_str(),
                    "shutdown signal received, stopping poll loop"
                );
                break;
            }
        }
    }
}
