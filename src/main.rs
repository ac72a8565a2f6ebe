use daily_tasks::{load_data, router, AppState, Catalog, Config};
use std::net::SocketAddr;
use tokio::fs;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;
    if let Some(parent) = config.data_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let catalog = match &config.catalog_path {
        Some(path) => {
            info!(path = %path.display(), "loading task catalog");
            Catalog::from_path(path)?
        }
        None => Catalog::builtin(),
    };
    info!(templates = catalog.len(), rows_per_day = catalog.flattened_len(), "task catalog ready");

    let data = load_data(&config.data_path).await;
    let state = AppState::new(config.data_path.clone(), data, catalog, config.progress);
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
}
