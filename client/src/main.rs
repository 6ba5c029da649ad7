//! Torrent View - headless live torrent table.
//!
//! Polls a status endpoint for the torrents of the current session and logs
//! every cell that changes.

use torrentview_client::{Config, HttpStatusClient, LogSurface, TorrentView};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "torrentview_client=debug,torrentview_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!(
        "Watching {} every {}ms",
        config.base_url,
        config.poll_interval.as_millis()
    );

    let client = HttpStatusClient::new(config.base_url.clone())?;
    let (mut view, _handle) = TorrentView::from_config(client, LogSurface::new(), &config)?;

    view.start().await?;
    view.run().await?;
    view.stop();

    Ok(())
}
