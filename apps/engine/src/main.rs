use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use engine::config::Config;
use engine::db::create_pool;
use engine::routes::build_router;
use engine::{build_state, llm_client};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting decision engine v{}", env!("CARGO_PKG_VERSION"));

    let pool = match &config.database_url {
        Some(url) => Some(create_pool(url).await?),
        None => {
            info!("DATABASE_URL not set; using in-memory guardrails, modes, and telemetry");
            None
        }
    };

    if config.anthropic_api_key.is_some() {
        info!("LLM polish enabled (model: {})", llm_client::MODEL);
    } else {
        info!("ANTHROPIC_API_KEY not set; explanations will not be polished");
    }
    info!(
        "Default guardrails preset: {}",
        config.default_guardrails_preset
    );

    let port = config.port;
    let state = build_state(config, pool);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
