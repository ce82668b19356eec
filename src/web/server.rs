use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    http::{HeaderValue, header},
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeader;

use super::api::{self, AppState};
use crate::config::RoadmapConfig;
use crate::store::{RoadmapStore, StoreHandle};

/// Configuration for the roadmap server.
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_file: PathBuf,
    pub static_dir: PathBuf,
    pub default_title: String,
    pub cors: bool,
    pub strict_transitions: bool,
    pub dev_mode: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            data_file: PathBuf::from("data/roadmap.json"),
            static_dir: PathBuf::from("public"),
            default_title: roadmap_core::seed::DEFAULT_TITLE.to_string(),
            cors: true,
            strict_transitions: false,
            dev_mode: false,
        }
    }
}

impl ServerConfig {
    pub fn from_config(config: &RoadmapConfig, dev_mode: bool) -> Self {
        Self {
            host: config.host().to_string(),
            port: config.port,
            data_file: config.data_file.clone(),
            static_dir: config.static_dir.clone(),
            default_title: config.default_title().to_string(),
            cors: config.toml.server.cors,
            strict_transitions: config.strict_transitions(),
            dev_mode,
        }
    }

    /// Dev mode listens on every interface so a container can reach it.
    pub fn bind_host(&self) -> &str {
        if self.dev_mode { "0.0.0.0" } else { &self.host }
    }
}

/// Build the full application router: API routes with the static front-end
/// as the fallback.
pub fn build_router(state: Arc<AppState>, static_dir: &Path) -> Router {
    let files = SetResponseHeader::overriding(
        ServeDir::new(static_dir),
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    let files =
        SetResponseHeader::overriding(files, header::PRAGMA, HeaderValue::from_static("no-cache"));
    let files =
        SetResponseHeader::overriding(files, header::EXPIRES, HeaderValue::from_static("0"));

    api::api_router().fallback_service(files).with_state(state)
}

/// Start the roadmap server.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    let store = RoadmapStore::new(&config.data_file, &config.default_title);
    store
        .initialize(false)
        .context("Failed to initialize roadmap data file")?;
    if let Err(e) = store.migrate() {
        tracing::error!(error = %e, "Roadmap migration failed; serving the document as-is");
    }

    let state = Arc::new(AppState {
        store: StoreHandle::new(store),
        strict_transitions: config.strict_transitions,
    });

    let mut app = build_router(state, &config.static_dir);

    if config.cors || config.dev_mode {
        app = app.layer(CorsLayer::permissive());
    }

    let addr = format!("{}:{}", config.bind_host(), config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let local_addr = listener.local_addr()?;
    tracing::info!(
        addr = %local_addr,
        data_file = %config.data_file.display(),
        static_dir = %config.static_dir.display(),
        "Roadmap server listening"
    );
    println!("Roadmap server running at http://{}", local_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    println!("Server shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    println!("\nShutting down...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use roadmap_core::seed::default_roadmap;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_router() -> (Router, TempDir) {
        let dir = TempDir::new().unwrap();
        let public = dir.path().join("public");
        std::fs::create_dir_all(&public).unwrap();
        std::fs::write(public.join("index.html"), "<h1>Roadmap</h1>").unwrap();

        let store = RoadmapStore::new(dir.path().join("roadmap.json"), "Plan");
        store.save(&default_roadmap("Plan")).unwrap();
        let state = Arc::new(AppState {
            store: StoreHandle::new(store),
            strict_transitions: false,
        });
        (build_router(state, &public), dir)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_via_full_router() {
        let (app, _dir) = test_router();
        let resp = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_routes_mounted() {
        let (app, _dir) = test_router();
        let resp = app.oneshot(get("/api/roadmap")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(doc["roadmap"]["title"], "Plan");
    }

    #[tokio::test]
    async fn test_static_files_are_not_cached() {
        let (app, _dir) = test_router();
        let resp = app.oneshot(get("/index.html")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let headers = resp.headers();
        assert_eq!(
            headers.get(header::CACHE_CONTROL).unwrap(),
            "no-cache, no-store, must-revalidate"
        );
        assert_eq!(headers.get(header::PRAGMA).unwrap(), "no-cache");
        assert_eq!(headers.get(header::EXPIRES).unwrap(), "0");
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"<h1>Roadmap</h1>");
    }

    #[tokio::test]
    async fn test_root_serves_index() {
        let (app, _dir) = test_router();
        let resp = app.oneshot(get("/")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_static_path_is_404() {
        let (app, _dir) = test_router();
        let resp = app.oneshot(get("/missing.js")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 3001);
        assert_eq!(config.data_file, PathBuf::from("data/roadmap.json"));
        assert_eq!(config.static_dir, PathBuf::from("public"));
        assert!(config.cors);
        assert!(!config.dev_mode);
        assert_eq!(config.bind_host(), "127.0.0.1");
    }

    #[test]
    fn test_dev_mode_binds_all_interfaces() {
        let config = ServerConfig {
            dev_mode: true,
            ..Default::default()
        };
        assert_eq!(config.bind_host(), "0.0.0.0");
    }
}
