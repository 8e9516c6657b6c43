use fixit_core::{MatchKind, Resolution};
use kanal::AsyncReceiver;

use crate::events::AppEvent;

/// Print resolutions to stdout as they arrive
pub async fn output_loop(output_rx: AsyncReceiver<AppEvent>) -> anyhow::Result<()> {
    while let Ok(event) = output_rx.recv().await {
        match event {
            AppEvent::ShowResolution { text, resolution } => {
                println!("{}\n", render(&text, &resolution));
            }
            AppEvent::StatusUpdate { status, capturing } => {
                tracing::info!("Status: {} (capturing: {})", status, capturing);
            }
            AppEvent::TextInput { .. } => {}
        }
    }

    Ok(())
}

pub fn render(text: &str, resolution: &Resolution) -> String {
    let header = format!("Extracted Text: {}", text.trim());

    match resolution {
        Resolution::Matched(found) => {
            let how = match found.kind {
                MatchKind::Substring => "exact".to_string(),
                MatchKind::Fuzzy { ratio } => format!("fuzzy {:.2}", ratio),
            };
            format!(
                "{header}\n[LOCAL DB MATCH] ({how}) Category: {}\nSuggested Fix: {}",
                found.record.category, found.record.solution
            )
        }
        Resolution::Generated {
            record,
            cache_error,
        } => {
            let mut out = format!("{header}\n[AI SUGGESTION]\n{}", record.solution.trim());
            if let Some(e) = cache_error {
                out.push_str(&format!("\n[CACHE ERROR] Could not save suggestion: {e}"));
            }
            out
        }
        Resolution::Failed { error } => format!("{header}\n[ERROR] {error}"),
    }
}
