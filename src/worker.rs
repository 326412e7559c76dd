// Background collection worker: one cycle immediately at startup, then
// one per interval until shutdown. The cycle is awaited inside the tick
// arm and missed ticks are skipped, so a slow cycle coalesces overdue
// triggers instead of overlapping them.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::time::{Duration, Instant, interval};

use crate::collector::Collector;
use crate::publish;

/// Collector and shutdown plumbing for the worker.
pub struct WorkerDeps {
    pub collector: Arc<Collector>,
    pub cycles_completed: Arc<AtomicU64>,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

/// Worker timing config. Stats logging runs on its own real-time interval,
/// independent of the collection cadence.
pub struct WorkerConfig {
    pub interval_secs: u64,
    pub stats_log_interval_secs: u64,
    pub output_path: PathBuf,
}

pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<()> {
    let WorkerDeps {
        collector,
        cycles_completed,
        mut shutdown_rx,
    } = deps;
    let WorkerConfig {
        interval_secs,
        stats_log_interval_secs,
        output_path,
    } = config;

    tokio::spawn(async move {
        let mut tick = interval(Duration::from_secs(interval_secs));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut stats_log_tick = interval(Duration::from_secs(stats_log_interval_secs));
        stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut last_cycle_ms: u64 = 0;

        let worker_span = tracing::span!(tracing::Level::DEBUG, "worker", interval_secs);
        let _guard = worker_span.enter();

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let started = Instant::now();
                    let snapshot = collector.collect_snapshot().await;
                    match publish::publish(&snapshot, &output_path).await {
                        Ok(()) => {
                            last_cycle_ms = started.elapsed().as_millis() as u64;
                            cycles_completed.fetch_add(1, Ordering::Relaxed);
                            tracing::info!(
                                accounts = snapshot.accounts.len(),
                                elapsed_ms = last_cycle_ms,
                                operation = "publish_snapshot",
                                "snapshot published"
                            );
                        }
                        Err(e) => {
                            tracing::warn!(
                                error = %e,
                                operation = "publish_snapshot",
                                "publish failed; previous artifact remains authoritative"
                            );
                        }
                    }
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Worker shutting down");
                    break;
                }
                _ = stats_log_tick.tick() => {
                    tracing::info!(
                        cycles_completed = cycles_completed.load(Ordering::Relaxed),
                        last_cycle_ms,
                        "app stats"
                    );
                }
            }
        }
    })
}
