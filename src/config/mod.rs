use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::GrantError;
use crate::listing::SortKey;

const APP_DIR: &str = "grantdesk";
const CONFIG_FILE: &str = "config.json";
const TMP_SUFFIX: &str = "tmp";

/// Runtime preferences for the CLI and the mock backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub page_size: usize,
    pub default_sort: SortKey,
    /// Simulated network delay applied by the mock backend, in
    /// milliseconds.
    pub mock_latency_ms: u64,
    pub quiet_mode: bool,
    /// Disable colored output (useful for logs and screen readers).
    pub plain_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: 10,
            default_sort: SortKey::StartDate,
            mock_latency_ms: 300,
            quiet_mode: false,
            plain_output: false,
        }
    }
}

/// Loads and persists [`Config`] under the platform config directory.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, GrantError> {
        let base = dirs::config_dir()
            .ok_or_else(|| GrantError::InvalidRef("no platform config directory".into()))?;
        Ok(Self::from_base(base))
    }

    pub fn with_base_dir(base: PathBuf) -> Self {
        Self::from_base(base)
    }

    fn from_base(base: PathBuf) -> Self {
        Self {
            path: base.join(APP_DIR).join(CONFIG_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the config, falling back to defaults when the file does not
    /// exist yet.
    pub fn load(&self) -> Result<Config, GrantError> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Writes the config atomically (write to a temp file, then rename).
    pub fn save(&self, config: &Config) -> Result<(), GrantError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        let mut file = File::create(&tmp)?;
        file.write_all(json.as_bytes())?;
        file.flush()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}
