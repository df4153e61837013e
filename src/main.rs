use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use newday::api::router;
use newday::config::AppConfig;
use newday::db;
use newday::relay::{HttpRelayClient, NoopRelayClient, RelayClient};
use newday::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "newday=debug,tower_http=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let pool = db::create_pool(&config.database_url, 5).await?;
    db::run_migrations(&pool).await?;

    let relay: Arc<dyn RelayClient> = if config.relay.webhook_url.is_some() {
        Arc::new(HttpRelayClient::new(config.relay.clone())?)
    } else {
        warn!("N8N_WEBHOOK_URL not set, outbound n8n events are disabled");
        Arc::new(NoopRelayClient)
    };
    if config.relay.api_key.is_none() {
        warn!("N8N_API_KEY not set, /api/n8n endpoints are unauthenticated");
    }

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let state = AppState::new(pool, relay, config);
    let app = router(state);

    info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
