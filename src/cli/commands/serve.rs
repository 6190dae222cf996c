//! Serve command - HTTP and websocket server with live watching.

use crate::config::Settings;

/// Run the serve command.
///
/// `--no-watch` wins over `watch.enabled` in the settings.
pub async fn run(settings: Settings, port: Option<u16>, no_watch: bool) -> anyhow::Result<()> {
    let watch = settings.watch.enabled && !no_watch;
    crate::server::serve_http(settings, watch, port).await
}
