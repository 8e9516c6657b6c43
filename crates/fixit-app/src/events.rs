use std::sync::Arc;

use fixit_core::Resolution;
use fixit_types::TextSource;
use kanal::{AsyncReceiver, AsyncSender};

use crate::state::AppState;

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Text captured by a source, to be resolved
    TextInput { text: String, source: TextSource },
    ShowResolution {
        text: String,
        resolution: Resolution,
    },
    StatusUpdate { status: String, capturing: bool },
}

/// App's main loop. Returns when every sender is gone.
pub async fn event_loop(
    state: Arc<AppState>,
    input_rx: AsyncReceiver<AppEvent>,
    output_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    tracing::info!("[EVENT_LOOP] Waiting for captures");

    while let Ok(event) = input_rx.recv().await {
        handle_events(state.clone(), &output_tx, event).await?;
    }

    tracing::info!("[EVENT_LOOP] Input closed, stopping");
    Ok(())
}

async fn handle_events(
    state: Arc<AppState>,
    output_tx: &AsyncSender<AppEvent>,
    event: AppEvent,
) -> anyhow::Result<()> {
    match event {
        AppEvent::TextInput { text, source } => {
            tracing::debug!("TextInput from {}: {} chars", source, text.len());
            handle_text_input(state, text, output_tx).await?;
        }
        AppEvent::ShowResolution { .. } | AppEvent::StatusUpdate { .. } => {
            // Output-only events
        }
    }

    Ok(())
}

async fn handle_text_input(
    state: Arc<AppState>,
    text: String,
    output_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let Some(ticket) = state.capture.try_begin() else {
        tracing::info!("Capture in progress... ignoring input");
        output_tx
            .send(AppEvent::StatusUpdate {
                status: "Capture in progress".to_string(),
                capturing: true,
            })
            .await?;
        return Ok(());
    };

    let tx = output_tx.clone();
    tokio::spawn(async move {
        let _ = tx
            .send(AppEvent::StatusUpdate {
                status: "Resolving".to_string(),
                capturing: true,
            })
            .await;

        let resolution = state.resolver.resolve(&text).await;
        drop(ticket);

        if let Err(e) = tx.send(AppEvent::ShowResolution { text, resolution }).await {
            tracing::error!("Failed to send resolution: {}", e);
        }
    });

    Ok(())
}
