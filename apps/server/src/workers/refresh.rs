//! Periodic upstream refresh loop

use crate::{config::IngestConfig, services::Refresher};
use std::sync::Arc;
use tokio::{
    sync::watch,
    time::{sleep, Duration},
};
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct RefreshLoopConfig {
    /// Delay between the end of one successful run and the start of the next.
    pub interval: Duration,
    pub retry_initial: Duration,
    pub retry_max: Duration,
    pub retry_jitter_ratio: f64,
}

impl RefreshLoopConfig {
    pub fn from_config(config: &IngestConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.refresh_interval_hours.max(1) * 3600),
            ..Self::default()
        }
    }
}

impl Default for RefreshLoopConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(24 * 3600),
            retry_initial: Duration::from_secs(60),
            retry_max: Duration::from_secs(3600),
            retry_jitter_ratio: 0.2,
        }
    }
}

fn jittered_duration(base: Duration, jitter_ratio: f64) -> Duration {
    if base.is_zero() || jitter_ratio <= 0.0 {
        return base;
    }

    let bytes = *Uuid::new_v4().as_bytes();
    let mut head = [0u8; 8];
    head.copy_from_slice(&bytes[..8]);
    let unit = (u64::from_le_bytes(head) as f64) / (u64::MAX as f64); // [0,1]
    let signed = unit * 2.0 - 1.0; // [-1,1]
    let factor = (1.0 + signed * jitter_ratio).max(0.0);
    base.mul_f64(factor)
}

/// Run a refresh immediately, then again every `interval` until shutdown.
///
/// Failed runs are logged and retried with exponential backoff, capped at the
/// regular interval, so a flaky upstream never stops the loop.
pub async fn run_refresh_loop(
    refresher: Arc<Refresher>,
    config: RefreshLoopConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    tracing::info!(
        source = refresher.source_name(),
        interval_secs = config.interval.as_secs(),
        "Refresh loop starting"
    );

    let mut retry_delay = config.retry_initial;
    loop {
        if *shutdown.borrow() {
            break;
        }

        let wait = match refresher.run_once().await {
            Ok(report) => {
                tracing::info!(
                    fetched = report.fetched,
                    inserted = report.outcome.inserted,
                    updated = report.outcome.updated,
                    next_run_in_secs = config.interval.as_secs(),
                    "Refresh run finished"
                );
                retry_delay = config.retry_initial;
                config.interval
            }
            Err(e) => {
                let wait = jittered_duration(
                    retry_delay.min(config.interval),
                    config.retry_jitter_ratio,
                );
                tracing::error!(
                    error = %e,
                    retry_in_ms = wait.as_millis() as u64,
                    "Refresh run failed"
                );
                retry_delay = (retry_delay * 2).min(config.retry_max);
                wait
            }
        };

        tokio::select! {
            _ = sleep(wait) => {}
            _ = shutdown.wait_for(|stop| *stop) => break,
        }
    }

    tracing::info!("Refresh loop stopped");
}
