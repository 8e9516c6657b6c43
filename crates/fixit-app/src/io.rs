use std::sync::Arc;
use std::time::Duration;

use fixit_types::TextSource;
use kanal::AsyncSender;
use tokio_util::sync::CancellationToken;

use crate::events::AppEvent;
use crate::state::AppState;

/// Feed every new clipboard text into the event loop as a capture
pub async fn watcher_io(
    state: Arc<AppState>,
    cancel: CancellationToken,
    event_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let poll_interval = Duration::from_millis(state.config.watch.poll_interval_ms);
    tracing::info!("Starting clipboard watcher (every {:?})", poll_interval);

    tokio::select! {
        result = fixit_io::clipboard::watch_clipboard(poll_interval, move |text| {
            let tx = event_tx.clone();
            tokio::spawn(async move {
                let event = AppEvent::TextInput {
                    text,
                    source: TextSource::Clipboard,
                };
                if let Err(e) = tx.send(event).await {
                    tracing::error!("Failed to send clipboard text to app: {}", e);
                }
            });
        }) => {
            if let Err(e) = result {
                tracing::error!("Clipboard watcher error: {}", e);
                return Err(e);
            }
        }
        _ = cancel.cancelled() => {
            tracing::info!("Clipboard watcher stopping");
        }
    }

    Ok(())
}
