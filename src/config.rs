use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILE_NAME: &str = "config.json";

/// User settings. The valid window and the weekly requirement are fixed
/// and not read from here.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub progress_bar_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            progress_bar_width: 30,
        }
    }
}

pub fn load_config(base_dir: &Path) -> Result<Config> {
    if !base_dir.exists() {
        fs::create_dir_all(base_dir)?;
    }
    let path = base_dir.join(CONFIG_FILE_NAME);

    if !path.exists() {
        let config = Config::default();
        let data = serde_json::to_string_pretty(&config)?;
        fs::write(&path, data)?;
        return Ok(config);
    }

    let data = fs::read_to_string(&path)?;
    let config = serde_json::from_str(&data)
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    Ok(config)
}
