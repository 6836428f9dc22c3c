use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use metrotable_client::{HtmlTableParser, ReqwestFetcher};
use metrotable_core::{PipelineConfig, TablePipeline};
use metrotable_server::routes;
use metrotable_server::state::AppState;

const DEFAULT_PORT: u16 = 4000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("metrotable=info".parse()?))
        .with_target(false)
        .init();

    let port = match std::env::var("METROTABLE_SERVER_PORT") {
        Ok(raw) => raw
            .parse::<u16>()
            .with_context(|| format!("Invalid METROTABLE_SERVER_PORT '{raw}'"))?,
        Err(_) => DEFAULT_PORT,
    };
    let addr = format!("0.0.0.0:{port}");

    let config = PipelineConfig::from_env()?;
    tracing::info!(
        page = %config.page.source_url(),
        anchor = %config.section_anchor,
        "Serving table"
    );

    let fetcher = ReqwestFetcher::with_timeout(config.stage_timeout)?;
    let pipeline = TablePipeline::new(fetcher, HtmlTableParser::new(), config);
    let state = Arc::new(AppState::from_pipeline(pipeline));

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    tracing::info!("Listening on {addr}");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install CTRL+C handler: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
