// Preserve Explorer Server - public preserve read API plus the admin bridge

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use preserve_explorer::{api::create_app_router, app_state::AppState, config::Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing; RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if config.auth.admin_token.is_none() {
        warn!("ADMIN_TOKEN is not set; admin writes are disabled");
    }

    // Initialize application state
    let app_state = AppState::new(config.clone()).await?;
    let app = create_app_router(app_state);

    let addr = config.server_address();
    info!("🚀 Preserve Explorer server starting on http://{}", addr);
    info!("📋 API:");
    info!("  GET    /preserves                   - Published preserves (?amenities=, ?bbox=)");
    info!("  GET    /preserves/{{id}}              - Single published preserve");
    info!("  GET    /admin/preserves             - All preserves (?status=)");
    info!("  POST   /admin/preserves             - Create preserve");
    info!("  GET    /admin/preserves/{{id}}        - Get preserve");
    info!("  PATCH  /admin/preserves/{{id}}        - Update preserve");
    info!("  DELETE /admin/preserves/{{id}}        - Delete preserve");
    info!("  GET    /health                      - Health check");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
