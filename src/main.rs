use paywall::{routes::create_router, ApiError, AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,paywall=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting paywall service");
    tracing::info!(
        "Loaded configuration - Server: {}:{}, products: {}",
        config.server.host,
        config.server.port,
        config.billing.product_ids.len()
    );

    // Initialize application state
    let state = AppState::new(config.clone())?;

    // Initial catalog load; a classifier mismatch is a deploy-time error
    match state.paywall_service.refresh().await {
        Ok(status) => tracing::info!(?status, "Initial catalog load finished"),
        Err(ApiError::Catalog(e)) => return Err(e.into()),
        Err(e) => tracing::warn!("Initial catalog load failed, serving without offers: {}", e),
    }

    // Create router
    let app = create_router(state);

    // Create server address
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app).await?;

    Ok(())
}
