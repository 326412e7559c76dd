use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;
use zonewatch::*;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;

    let resolved = config::resolve_accounts(&app_config.collector.zones_file);
    for failure in &resolved.skipped {
        if failure.error.is_absence() {
            tracing::debug!(source = %failure.source, error = %failure.error, "config source absent");
        } else {
            tracing::warn!(source = %failure.source, error = %failure.error, "config source rejected");
        }
    }
    match resolved.source {
        Some(source) => tracing::info!(
            %source,
            accounts = resolved.accounts.len(),
            "accounts resolved"
        ),
        None => {
            tracing::warn!("no configuration source yielded accounts; snapshots will be empty")
        }
    }
    for (index, account) in resolved.accounts.iter().enumerate() {
        tracing::info!(
            index = index + 1,
            account = %account.name,
            zones = account.zones.len(),
            "configured account"
        );
    }

    let client = client::CfClient::new(
        &app_config.collector.api_url,
        app_config.collector.request_timeout_secs,
    )?;
    let collector = Arc::new(collector::Collector::new(
        client,
        resolved.accounts,
        &app_config.collector,
    ));

    // Token validation phase: once, before the scheduler loop is entered.
    collector.validate_accounts().await;

    let cycles_completed = Arc::new(AtomicU64::new(0));
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let output_path = PathBuf::from(&app_config.publishing.output_path);

    let worker_handle = worker::spawn(
        worker::WorkerDeps {
            collector: collector.clone(),
            cycles_completed: cycles_completed.clone(),
            shutdown_rx,
        },
        worker::WorkerConfig {
            interval_secs: app_config.collector.interval_secs,
            stats_log_interval_secs: app_config.monitoring.stats_log_interval_secs,
            output_path: output_path.clone(),
        },
    );

    let app = routes::app(output_path, collector.account_count(), cycles_completed);
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    let in_container = std::path::Path::new("/.dockerenv").exists()
        || std::env::var("CONTAINER").as_deref() == Ok("1");

    if in_container {
        // In Docker: run server until error or SIGTERM (no signal handler; avoids immediate exit)
        axum::serve(listener, app).await?;
    } else {
        tokio::select! {
            result = axum::serve(listener, app) => {
                result?;
            }
            _ = async {
                #[cfg(unix)]
                {
                    let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                        Ok(s) => s,
                        Err(_) => {
                            let _ = tokio::signal::ctrl_c().await;
                            return;
                        }
                    };
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {}
                        _ = sigterm.recv() => {}
                    }
                }
                #[cfg(not(unix))]
                {
                    tokio::signal::ctrl_c().await
                }
            } => {
                tracing::info!("Received shutdown signal");
                let _ = shutdown_tx.send(());
                let _ = worker_handle.await;
            }
        }
    }

    Ok(())
}
