mod cli;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use burrow_analytics::Aggregator;
use burrow_core::{ClickRepository, MappingRepository};
use burrow_gateway::{App, AppState};
use burrow_generator::RandomGenerator;
use burrow_redirector::RedirectorService;
use burrow_shortener::{ShortenerService, ShortenerSettings};
use burrow_storage::{InMemoryStore, MySqlStore};
use clap::Parser;
use sqlx::mysql::MySqlPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{LogFormatArg, StorageBackendArg, CLI};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();
    init_tracing(config.log_format);

    info!(
        listen_addr = %config.listen_addr,
        public_base_url = %config.public_base_url,
        storage_backend = %config.storage,
        max_allocation_attempts = config.max_allocation_attempts,
        "starting gateway server"
    );

    let settings = ShortenerSettings::builder()
        .max_attempts(config.max_allocation_attempts)
        .build();

    let state = match config.storage {
        StorageBackendArg::InMemory => {
            build_state(InMemoryStore::new(), &config.public_base_url, settings)?
        }
        StorageBackendArg::Mysql => {
            let dsn = config
                .mysql_dsn
                .as_deref()
                .context("mysql dsn is required when storage backend is mysql")?;
            let pool = MySqlPoolOptions::new()
                .max_connections(config.mysql_max_connections)
                .acquire_timeout(Duration::from_millis(config.mysql_acquire_timeout_ms))
                .connect(dsn)
                .await
                .context("failed to connect to mysql")?;

            let store = MySqlStore::new(pool);
            store
                .ensure_schema()
                .await
                .context("failed to create mysql schema")?;
            build_state(store, &config.public_base_url, settings)?
        }
    };

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("gateway server stopped");
    Ok(())
}

fn init_tracing(format: LogFormatArg) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormatArg::Text => builder.init(),
        LogFormatArg::Json => builder.json().init(),
    }
}

fn build_state<S>(
    store: S,
    public_base_url: &str,
    settings: ShortenerSettings,
) -> anyhow::Result<AppState>
where
    S: MappingRepository + ClickRepository + Clone,
{
    let generator = RandomGenerator::from_entropy().context("failed to seed code generator")?;
    let shortener = ShortenerService::new(store.clone(), generator).with_settings(settings);
    let redirector = RedirectorService::new(store.clone(), store.clone());
    let analytics = Aggregator::new(store.clone(), store);

    Ok(AppState::new(
        Arc::new(shortener),
        Arc::new(redirector),
        Arc::new(analytics),
        public_base_url,
    ))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
