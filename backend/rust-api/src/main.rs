use std::sync::Arc;

use tokio::signal;
use tracing::info;

use nuvacm_api::{
    build_router, database,
    image_host::{self, ImageUploader},
    services::AuthGate,
    store::PgRecordStore,
    AppState, Config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nuvacm_api=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting nuvacm API server...");

    let config = Arc::new(Config::from_env()?);
    info!("Configuration loaded");

    let db_pool = database::new_pool(&config.database_url, config.database_name.as_deref()).await?;
    database::run_migrations(&db_pool).await?;
    info!("Database ready");

    if config.image_host_api_key.is_empty() {
        tracing::warn!("IMAGE_HOST_API_KEY is not set; image uploads will be rejected by the host");
    }
    let host = image_host::build_host(
        config.image_host_provider,
        config.image_host_api_key.clone(),
        image_host::http_client()?,
    );
    info!("Image host: {}", host.name());

    let state = AppState {
        config: config.clone(),
        store: Arc::new(PgRecordStore::new(db_pool)),
        auth: Arc::new(AuthGate::from_config(&config)),
        uploader: ImageUploader::new(host, config.max_upload_bytes),
    };

    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received");
}
