//! Roadmap server command (`roadmap serve`).

use anyhow::Result;

use roadmap::config::RoadmapConfig;
use roadmap::web::server::{ServerConfig, start_server};

pub async fn cmd_serve(config: RoadmapConfig, open: bool, dev: bool) -> Result<()> {
    // Spawn browser open before starting the server (which blocks).
    // Skip in dev mode (no browser inside containers).
    if open && !dev {
        let url = format!("http://localhost:{}", config.port);
        tokio::spawn(async move {
            tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
            if let Err(e) = open::that(&url) {
                eprintln!("Failed to open browser: {}", e);
            }
        });
    }

    start_server(ServerConfig::from_config(&config, dev)).await
}
