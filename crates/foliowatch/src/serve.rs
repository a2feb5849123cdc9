// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Long-running modes: `serve`, `poll` and `run`.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use foliowatch_alert::{AlertService, Ingestor, sinks};
use foliowatch_config::FolioConfig;
use foliowatch_core::{BatchSubmitter, FolioError, NotificationSink, SnapshotSource};
use foliowatch_gateway::{AuthConfig, GatewayState};
use foliowatch_poller::{HttpSubmitter, LocalSubmitter, Poller, install_signal_handler};
use foliowatch_storage::{SqliteHistoryStore, SqliteSnapshotSource};

/// Opens the history database and runs pending migrations.
pub async fn open_store(config: &FolioConfig) -> Result<SqliteHistoryStore, FolioError> {
    let store = SqliteHistoryStore::open(&config.storage).await?;
    info!(path = %config.storage.database_path, "history store opened");
    Ok(store)
}

/// The ingestion pipeline over `store`, alerting through the configured sink.
fn build_ingestor(config: &FolioConfig, store: &SqliteHistoryStore) -> Ingestor {
    let sink = sinks::from_config(&config.smtp);
    info!(sink = sink.name(), "alert sink selected");
    let alerts = AlertService::new(Arc::new(store.clone()), sink);
    Ingestor::new(Arc::new(store.clone()), alerts)
}

fn gateway_state(config: &FolioConfig, ingestor: Ingestor) -> GatewayState {
    GatewayState::new(
        ingestor,
        config.retention.days(),
        AuthConfig::new(config.gateway.api_key.clone()),
    )
}

async fn open_source(config: &FolioConfig) -> Result<Arc<dyn SnapshotSource>, FolioError> {
    let path = config.source.database_path.as_deref().ok_or_else(|| {
        FolioError::Config("source.database_path is not set, nothing to poll".to_string())
    })?;
    let source = SqliteSnapshotSource::open(path).await?;
    info!(path, "snapshot source opened");
    Ok(Arc::new(source))
}

fn poll_interval(config: &FolioConfig) -> Result<Duration, FolioError> {
    config.poller.interval().ok_or_else(|| {
        FolioError::Config(format!(
            "poller.interval_hours must be positive, got {}",
            config.poller.interval_hours
        ))
    })
}

/// `foliowatch serve`: host the API until SIGINT/SIGTERM.
pub async fn run_serve(config: FolioConfig) -> Result<(), FolioError> {
    info!(name = %config.service.name, "starting foliowatch serve");

    let store = open_store(&config).await?;
    let state = gateway_state(&config, build_ingestor(&config, &store));
    let shutdown = install_signal_handler();

    let served = foliowatch_gateway::serve(&config.gateway, state, shutdown).await;
    store.close().await?;
    served
}

/// `foliowatch poll`: run the scheduler, or one cycle with `--once`.
///
/// Batches go to `[api]` over HTTP when a base URL is configured, otherwise
/// straight into the local history store.
pub async fn run_poll(config: FolioConfig, once: bool) -> Result<(), FolioError> {
    info!(name = %config.service.name, once, "starting foliowatch poll");

    let source = open_source(&config).await?;
    let interval = poll_interval(&config)?;

    let (submitter, local_store): (Arc<dyn BatchSubmitter>, Option<SqliteHistoryStore>) =
        match HttpSubmitter::from_config(&config.api) {
            Some(http) => {
                info!(url = http.url(), "submitting batches over HTTP");
                (Arc::new(http), None)
            }
            None => {
                let store = open_store(&config).await?;
                let submitter = LocalSubmitter::new(build_ingestor(&config, &store));
                info!("submitting batches in-process");
                (Arc::new(submitter), Some(store))
            }
        };

    let poller =
        Poller::new(source, submitter, interval).run_on_start(config.poller.run_on_start);

    let result = if once {
        poller.run_cycle().await.map(|report| {
            info!(
                invoices = report.invoices,
                credit_notes = report.credit_notes,
                "single poll cycle completed"
            );
        })
    } else {
        poller.run(install_signal_handler()).await;
        Ok(())
    };

    if let Some(store) = local_store {
        store.close().await?;
    }
    result
}

/// `foliowatch run`: API and poller in one process, sharing one pipeline.
pub async fn run_all(config: FolioConfig) -> Result<(), FolioError> {
    info!(name = %config.service.name, "starting foliowatch run");

    let store = open_store(&config).await?;
    let ingestor = build_ingestor(&config, &store);
    let source = open_source(&config).await?;
    let interval = poll_interval(&config)?;
    let shutdown = install_signal_handler();

    let poller = Poller::new(
        source,
        Arc::new(LocalSubmitter::new(ingestor.clone())),
        interval,
    )
    .run_on_start(config.poller.run_on_start);

    let poll_task = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { poller.run(shutdown).await })
    };

    let state = gateway_state(&config, ingestor);
    let served = foliowatch_gateway::serve(&config.gateway, state, shutdown.clone()).await;

    // A server that fails to start must not leave the poller running.
    shutdown.cancel();
    if let Err(e) = poll_task.await {
        error!(error = %e, "poller task failed");
    }

    store.close().await?;
    served
}
