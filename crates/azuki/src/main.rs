use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use azuki::config::AppConfig;
use azuki::db::PostgresCourseRepository;
use azuki::server::create_router;
use azuki::types::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = AppConfig::parse();
    info!(
        "Using database {} at {}:{}",
        config.database.dbname, config.database.host, config.database.port
    );

    let repository = PostgresCourseRepository::new(&config.database)?;
    if config.init_schema {
        repository.init_schema().await?;
        info!("Course schema initialized");
    }

    let app = create_router(Arc::new(AppState::new(Arc::new(repository))));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
    }
    info!("Shutting down");
}
