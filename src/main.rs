// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, sync::Arc};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jwt_authn::{
    api::router,
    auth::Authenticator,
    config::{Config, LogFormat, DEFAULT_LOG_FILTER, IDENTITY_DB_FILE},
    state::AppState,
    storage::{IdentityStore, MemoryIdentityStore, RedbIdentityStore},
};

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

fn open_store(config: &Config) -> Result<Arc<dyn IdentityStore>, Box<dyn std::error::Error>> {
    let entity = config.auth.user_model.as_str();

    match &config.data_dir {
        Some(dir) => {
            let path = dir.join(IDENTITY_DB_FILE);
            let store = RedbIdentityStore::open(&path)?;
            for record in &config.seed_users {
                store.upsert(entity, record)?;
            }
            tracing::info!(path = %path.display(), "opened identity database");
            Ok(Arc::new(store))
        }
        None => {
            let store = MemoryIdentityStore::new();
            for record in &config.seed_users {
                store.insert(entity, record.clone())?;
            }
            tracing::warn!("DATA_DIR not set, using in-memory identity store");
            Ok(Arc::new(store))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    let store = open_store(&config)?;
    let mut authenticator = Authenticator::new(config.auth.clone(), store).with_debug(config.debug);
    if let Some(secret) = &config.app_secret {
        authenticator = authenticator.with_app_secret(secret.as_bytes());
    } else if config.auth.key.is_none() {
        tracing::warn!("neither APP_SECRET nor JWT_KEY is set, every token will be rejected");
    }
    tracing::info!(
        algorithms = ?authenticator.settings().allowed_algorithms,
        query_datastore = authenticator.settings().query_datastore,
        debug = config.debug,
        "authenticator ready"
    );

    let app = router(AppState::new(authenticator));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(%addr, "jwt-authn listening (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
