//! HTTP and websocket surface over the index.
//!
//! Thin handlers only: every request reads a snapshot or touches a file, and
//! `/ws` relays whatever the broadcaster publishes.

#[cfg(feature = "http-server")]
pub mod api;
#[cfg(feature = "http-server")]
pub mod ws;

#[cfg(feature = "http-server")]
pub use app::*;

#[cfg(feature = "http-server")]
mod app {
    use axum::Router;
    use axum::routing::get;
    use std::sync::Arc;
    use tokio::net::TcpListener;
    use tokio_util::sync::CancellationToken;
    use tower_http::cors::CorsLayer;

    use super::{api, ws};
    use crate::config::Settings;
    use crate::index::WikiIndex;
    use crate::notifications::NotificationBroadcaster;
    use crate::watcher::WikiWatcher;

    /// Shared handler state.
    #[derive(Clone)]
    pub struct AppState {
        pub index: Arc<WikiIndex>,
        pub broadcaster: Arc<NotificationBroadcaster>,
    }

    /// All routes with CORS open for the browser front end.
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/api/index", get(api::get_index))
            .route("/api/search", get(api::search))
            .route("/api/files", get(api::list_files))
            .route("/api/file", get(api::read_file).post(api::write_file))
            .route("/api/resolve", get(api::resolve_term))
            .route("/ws", get(ws::ws_handler))
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    /// Bind the first free port in `start..start + attempts`.
    pub async fn bind_first_available(
        bind: &str,
        start: u16,
        attempts: u16,
    ) -> anyhow::Result<TcpListener> {
        for offset in 0..attempts {
            let Some(port) = start.checked_add(offset) else {
                break;
            };
            match TcpListener::bind((bind, port)).await {
                Ok(listener) => {
                    if offset > 0 {
                        crate::log_event!("http", "port", "{start} in use, using {port}");
                    }
                    return Ok(listener);
                }
                Err(e) => {
                    crate::debug_event!("http", "port unavailable", "{port}: {e}");
                }
            }
        }

        anyhow::bail!(
            "no free port in {start}..{}",
            start.saturating_add(attempts)
        )
    }

    /// Build the index, start the watcher and serve until Ctrl-C.
    pub async fn serve_http(
        settings: Settings,
        watch: bool,
        port: Option<u16>,
    ) -> anyhow::Result<()> {
        let docs_root = settings.docs_root_path();
        let index = Arc::new(WikiIndex::with_extension(&docs_root, &settings.extension));

        // A missing root is not fatal: serve an empty index until a refresh
        // succeeds.
        let build_index = index.clone();
        match tokio::task::spawn_blocking(move || build_index.rebuild()).await? {
            Ok(stats) => {
                crate::log_event!(
                    "http",
                    "index ready",
                    "{} files, {} terms",
                    stats.files_indexed,
                    stats.terms
                );
            }
            Err(e) => tracing::error!("[index] initial build failed: {e}"),
        }

        let broadcaster = Arc::new(NotificationBroadcaster::new(
            settings.server.broadcast_capacity,
        ));

        // Create cancellation token for coordinated shutdown
        let ct = CancellationToken::new();

        if watch {
            let built = WikiWatcher::builder()
                .index(index.clone())
                .broadcaster(broadcaster.clone())
                .debounce_ms(settings.watch.debounce_ms)
                .channel_capacity(settings.watch.channel_capacity)
                .cancel_token(ct.clone())
                .build();

            match built {
                Ok(watcher) => {
                    tokio::spawn(async move {
                        if let Err(e) = watcher.watch().await {
                            tracing::error!("[watcher] stopped, index will go stale: {e}");
                        }
                    });
                }
                Err(e) => tracing::error!("[watcher] failed to start: {e}"),
            }
        }

        let listener = bind_first_available(
            &settings.server.bind,
            port.unwrap_or(settings.server.port),
            settings.server.port_attempts,
        )
        .await?;
        let addr = listener.local_addr()?;

        eprintln!("wikidex listening on http://{addr}");
        eprintln!("Documents: {}", docs_root.display());
        eprintln!("Press Ctrl+C to stop the server");

        let signal_ct = ct.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            signal_ct.cancel();
        });

        let state = AppState { index, broadcaster };
        axum::serve(listener, router(state))
            .with_graceful_shutdown(async move { ct.cancelled().await })
            .await?;

        eprintln!("HTTP server shut down gracefully");
        Ok(())
    }

    async fn shutdown_signal() {
        match tokio::signal::ctrl_c().await {
            Ok(()) => eprintln!("Received shutdown signal"),
            Err(e) => {
                tracing::error!("[http] cannot listen for ctrl+c: {e}");
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(not(feature = "http-server"))]
pub async fn serve_http(
    _settings: crate::config::Settings,
    _watch: bool,
    _port: Option<u16>,
) -> anyhow::Result<()> {
    anyhow::bail!("HTTP server support is not compiled in; rebuild with --features http-server")
}
