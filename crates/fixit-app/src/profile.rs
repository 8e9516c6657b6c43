use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context;
use fixit_config::Config;
use serde_json::Value;

/// Looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

fn read_config(path: &Path) -> anyhow::Result<Config> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let config = serde_json::from_reader(reader)?;
    Ok(config)
}

/// Load the config file, falling back to defaults when there is none.
/// An explicit path must exist.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = path {
        tracing::info!("Loading config from {}", path.display());
        return read_config(path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }

    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    if default_path.exists() {
        tracing::info!("Loading config from {}", default_path.display());
        read_config(default_path)
            .with_context(|| format!("Failed to load config from {}", default_path.display()))
    } else {
        tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
        Ok(Config::new())
    }
}

/// Write the effective defaults to `path` so they can be edited by hand.
/// The cloud API key is never written.
pub fn init_config(path: &Path, force: bool) -> anyhow::Result<PathBuf> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let mut config = serde_json::to_value(Config::new())?;
    // Left out so the key keeps coming from AZURE_OPENAI_API_KEY at load time
    if let Some(cloud) = config
        .pointer_mut("/completion/cloud")
        .and_then(Value::as_object_mut)
    {
        cloud.shift_remove("api_key");
    }

    fs::write(path, serde_json::to_string_pretty(&config)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!("Created config at {}", path.display());
    Ok(path.to_path_buf())
}
