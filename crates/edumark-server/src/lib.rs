//! HTTP server for EduMark.
//!
//! Serves rendered Markdown with axum:
//! - `/view/{filename}`: remote document by bare filename, `?branch=` optional
//! - `/local/{filename}`: preview of a file in the local source directory
//! - `/local/{filename}/mtime`: modification time polled by the preview page
//! - `/`: list of local documents
//!
//! Resolution, fetching and rendering are blocking and run on tokio's
//! blocking pool, so a slow remote never stalls unrelated requests.
//!
//! # Quick Start
//!
//! ```ignore
//! use edumark_server::{ServerConfig, run_server};
//! use edumark_site::{Site, SiteConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         host: "127.0.0.1".to_owned(),
//!         port: 3000,
//!         verbose: false,
//!         version: "0.1.0".to_owned(),
//!     };
//!     let site = Site::new(SiteConfig::default(), None);
//!
//!     run_server(config, site).await.unwrap();
//! }
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;
mod templates;

use std::net::SocketAddr;
use std::sync::Arc;

use edumark_site::Site;
use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Log renderer warnings.
    pub verbose: bool,
    /// Application version (part of every `ETag`).
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 3000,
            verbose: false,
            version: String::new(),
        }
    }
}

/// Run the server until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address is invalid or the server fails to start.
pub async fn run_server(config: ServerConfig, site: Site) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState {
        site: Arc::new(site),
        verbose: config.verbose,
        version: config.version.clone(),
    });

    let app = app::create_router(state);

    let addr = bind_address(&config.host, config.port).await?;
    tracing::info!(address = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// First socket address for `host`, which may be an IP or a hostname.
async fn bind_address(host: &str, port: u16) -> std::io::Result<SocketAddr> {
    tokio::net::lookup_host((host, port)).await?.next().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::AddrNotAvailable,
            format!("no address found for host {host:?}"),
        )
    })
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from EduMark config.
#[must_use]
pub fn server_config_from_config(
    config: &edumark_config::Config,
    version: String,
    verbose: bool,
) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        verbose,
        version,
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use edumark_cache::NullCache;
    use edumark_remote::{MockRemote, RemoteError};
    use edumark_site::{Resolver, SiteConfig};
    use tempfile::TempDir;
    use tower::util::ServiceExt;

    use super::*;

    struct Fixture {
        _tmp: TempDir,
        remote: Arc<MockRemote>,
        app: Router,
    }

    fn fixture(with_remote: bool) -> Fixture {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("draft.md"), "# Draft\n\nWork in progress.\n").unwrap();
        fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();

        let remote = Arc::new(
            MockRemote::new()
                .with_file("main", "week1/intro.md", "# Intro\ntags: basics; setup\n\n## Goals\n")
                .with_file("draft", "week1/intro.md", "# Intro (draft)\n"),
        );
        let resolver =
            with_remote.then(|| Resolver::new(remote.clone(), remote.clone(), &NullCache));
        let config = SiteConfig {
            source_dir: tmp.path().to_path_buf(),
            default_branch: "main".to_owned(),
        };

        let state = Arc::new(AppState {
            site: Arc::new(Site::new(config, resolver)),
            verbose: false,
            version: "test".to_owned(),
        });
        Fixture {
            _tmp: tmp,
            remote,
            app: app::create_router(state),
        }
    }

    async fn get(app: &Router, uri: &str) -> Response {
        app.clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_bind_address_accepts_ip_and_hostname() {
        let addr = bind_address("127.0.0.1", 3000).await.unwrap();
        assert_eq!(addr, SocketAddr::from(([127, 0, 0, 1], 3000)));

        let addr = bind_address("localhost", 3000).await.unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 3000);
    }

    #[tokio::test]
    async fn test_home_lists_local_documents() {
        let fx = fixture(true);

        let response = get(&fx.app, "/").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains(r#"<a href="/local/draft.md">draft.md</a>"#));
        assert!(!body.contains("notes.txt"));
    }

    #[tokio::test]
    async fn test_view_renders_remote_document() {
        let fx = fixture(true);

        let response = get(&fx.app, "/view/intro.md").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(header::ETAG));
        assert_eq!(
            response.headers()[header::X_FRAME_OPTIONS],
            "DENY"
        );
        assert!(response.headers().contains_key("content-security-policy"));
        let body = body_text(response).await;
        assert!(body.contains("<title>Intro</title>"));
        assert!(body.contains(r#"<span class="tag">basics</span><span class="tag">setup</span>"#));
        assert!(body.contains(r#"<nav id="toc""#));
        assert!(body.contains("week1/intro.md"));
    }

    #[tokio::test]
    async fn test_view_on_branch() {
        let fx = fixture(true);

        let body = body_text(get(&fx.app, "/view/intro.md?branch=draft").await).await;

        assert!(body.contains("Intro (draft)"));
    }

    #[tokio::test]
    async fn test_view_if_none_match_returns_304() {
        let fx = fixture(true);
        let first = get(&fx.app, "/view/intro.md").await;
        let etag = first.headers()[header::ETAG].clone();

        let response = fx
            .app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/view/intro.md")
                    .header(header::IF_NONE_MATCH, etag)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(fx.remote.scan_count(), 1);
    }

    #[tokio::test]
    async fn test_view_missing_document_is_404() {
        let fx = fixture(true);

        let response = get(&fx.app, "/view/missing.md").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_text(response).await;
        assert!(body.contains("<strong>404</strong>"));
        assert_eq!(fx.remote.scan_count(), 2);
    }

    #[tokio::test]
    async fn test_view_rejects_malformed_input() {
        let fx = fixture(true);

        let response = get(&fx.app, "/view/..%2Fsecret.md").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = get(&fx.app, "/view/intro.md?branch=a%20b").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        assert_eq!(fx.remote.scan_count(), 0);
    }

    #[tokio::test]
    async fn test_view_without_remote_is_500() {
        let fx = fixture(false);

        let response = get(&fx.app, "/view/intro.md").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_text(response).await;
        assert!(body.contains("no remote repository configured"));
    }

    #[tokio::test]
    async fn test_view_remote_failures() {
        let fx = fixture(true);

        fx.remote.fail_scans(Some(RemoteError::Timeout { secs: 15 }));
        let response = get(&fx.app, "/view/intro.md").await;
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);

        fx.remote
            .fail_scans(Some(RemoteError::Unavailable("dns failure".to_owned())));
        let response = get(&fx.app, "/view/intro.md").await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_local_preview_and_mtime() {
        let fx = fixture(true);

        let response = get(&fx.app, "/local/draft.md").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Work in progress."));
        assert!(body.contains("/mtime"));

        let response = get(&fx.app, "/local/draft.md/mtime").await;
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(json["mtime"].as_f64().unwrap() > 0.0);

        let response = get(&fx.app, "/local/absent.md").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
