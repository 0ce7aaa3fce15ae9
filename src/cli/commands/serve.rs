use anyhow::{bail, Context};
use clap::Args;
use tokio::net::TcpListener;
use tracing::info;

use crate::app::{app, AppState};
use crate::config::{config, AppConfig, Backend};
use crate::database::{MemoryStore, PgStore, Store};
use crate::entities::{schemas, validate_registry};

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    #[arg(long, help = "Address to bind (defaults to the configured host)")]
    pub host: Option<String>,

    #[arg(long, help = "Port to bind (defaults to PORT / APP_PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Storage backend: memory or postgres")]
    pub backend: Option<Backend>,
}

impl ServeArgs {
    fn apply(self, mut config: AppConfig) -> AppConfig {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(backend) = self.backend {
            config.database.backend = backend;
        }
        config
    }
}

pub async fn handle(args: ServeArgs) -> anyhow::Result<()> {
    let config = args.apply(config().clone());
    info!("Starting {} in {:?} mode", env!("CARGO_PKG_NAME"), config.environment);

    validate_registry().context("entity registry is inconsistent")?;
    if config.security.jwt_secret.is_empty() {
        bail!("JWT_SECRET must be set outside development");
    }

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    match config.database.backend {
        Backend::Memory => serve(listener, AppState::new(MemoryStore::new(), config)).await,
        Backend::Postgres => {
            let store = PgStore::connect(&config.database).await?;
            if config.database.ensure_schema {
                store.ensure_schema(&schemas()).await?;
            }
            let result = serve(listener, AppState::new(store.clone(), config)).await;
            store.close().await;
            result
        }
    }
}

async fn serve<S: Store>(listener: TcpListener, state: AppState<S>) -> anyhow::Result<()> {
    info!(
        "Listening on http://{} ({} backend)",
        listener.local_addr()?,
        state.store.backend()
    );

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
