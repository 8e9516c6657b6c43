use std::time::Duration;

use arboard::Clipboard;
use tokio::time;

/// Poll the clipboard and hand every new non-empty text to `on_text`.
///
/// Whatever is on the clipboard when watching starts is treated as already
/// seen.
pub async fn watch_clipboard<F>(poll_interval: Duration, mut on_text: F) -> Result<(), anyhow::Error>
where
    F: FnMut(String) + Send + 'static,
{
    let mut clipboard = Clipboard::new()?;
    let mut last_text = clipboard.get_text().unwrap_or_default();

    let mut interval = time::interval(poll_interval);

    loop {
        interval.tick().await;
        if let Ok(text) = clipboard.get_text()
            && is_new_text(&last_text, &text)
        {
            last_text = text.clone();
            on_text(text);
        }
    }
}

/// Replace the clipboard contents with `text`
pub fn copy_to_clipboard(text: &str) -> Result<(), anyhow::Error> {
    let mut clipboard = Clipboard::new()?;
    clipboard.set_text(text.to_string())?;
    tracing::info!("Copied {} chars to clipboard", text.len());
    Ok(())
}

fn is_new_text(last: &str, current: &str) -> bool {
    !current.trim().is_empty() && current != last
}
