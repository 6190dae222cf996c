//! Watch command - keep the index current and print change messages.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use crate::config::Settings;
use crate::notifications::NotificationBroadcaster;
use crate::watcher::WikiWatcher;

/// Run the watch command until Ctrl+C.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let build_settings = settings.clone();
    let (index, stats) =
        tokio::task::spawn_blocking(move || super::index::build(&build_settings)).await??;
    eprintln!(
        "Indexed {} files ({} terms), watching {}",
        stats.files_indexed,
        stats.terms,
        index.root().display()
    );

    let index = Arc::new(index);
    let broadcaster = Arc::new(NotificationBroadcaster::new(
        settings.server.broadcast_capacity,
    ));
    let mut rx = broadcaster.subscribe();
    let ct = CancellationToken::new();

    let watcher = WikiWatcher::builder()
        .index(index)
        .broadcaster(broadcaster.clone())
        .debounce_ms(settings.watch.debounce_ms)
        .channel_capacity(settings.watch.channel_capacity)
        .cancel_token(ct.clone())
        .build()?;
    let mut watch_task = tokio::spawn(watcher.watch());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                ct.cancel();
                break;
            }

            finished = &mut watch_task => {
                finished??;
                return Ok(());
            }

            message = rx.recv() => {
                match message {
                    Ok(text) => println!("{text}"),
                    Err(RecvError::Lagged(n)) => eprintln!("(skipped {n} messages)"),
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    watch_task.await??;
    Ok(())
}
