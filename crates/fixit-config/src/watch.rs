use std::env;

use serde::{Deserialize, Serialize};

fn default_poll_interval_ms() -> u64 {
    env::var("FIXIT_POLL_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(500)
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct WatchConfig {
    /// Clipboard polling interval
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}
