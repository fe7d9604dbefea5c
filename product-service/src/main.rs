use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use product_service::config::Args;
use product_service::pool::{DbPool, PoolConfig};
use product_service::repository::{DieselProductRepository, ProductRepository};
use product_service::{api, bootstrap};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let args = Args::parse();
    let connection_string = args.connection_string();

    // Schema must exist before anything is served
    info!(
        "Running database migrations against {}:{}/{}...",
        args.db_host, args.db_port, args.db_name
    );
    let migration_target = connection_string.clone();
    tokio::task::spawn_blocking(move || bootstrap::run_migrations(&migration_target)).await??;
    info!("Migrations completed successfully");

    let pool = DbPool::new(PoolConfig::new(connection_string)).await?;
    let repo: Arc<dyn ProductRepository> = Arc::new(DieselProductRepository::new(pool));
    bootstrap::seed_if_empty(repo.as_ref()).await?;

    let app = api::create_router(api::AppState { repo }, &args.public_dir);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", args.port)).await?;

    info!("Product service listening on port {}", args.port);
    info!(
        "Serving API at http://0.0.0.0:{}/api/products and static files from {}",
        args.port,
        args.public_dir.display()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Product service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining in-flight requests");
}
