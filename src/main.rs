use anyhow::Result;
use tracing::info;

use robokop_ara::config::Settings;
use robokop_ara::server::{app, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter("robokop_ara=info,tower_http=debug")
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let addr = format!("0.0.0.0:{}", settings.port);

    let state = AppState::new(settings);
    let router = app(state);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
