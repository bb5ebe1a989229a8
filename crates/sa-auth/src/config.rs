//! Engine configuration: key-pair pool sizing, loaded from a TOML file
//! under the platform config directory.

use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

const APP_QUALIFIER: &str = "net";
const APP_ORG: &str = "maidsafe";
const APP_NAME: &str = "self-auth";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Up to how many worker threads pre-generate RSA key-pairs.
    pub max_crypto_thread_count: u16,
    /// How many ready pairs to keep buffered.
    pub crypto_key_buffer_count: u16,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { max_crypto_thread_count: 4, crypto_key_buffer_count: 10 }
    }
}

fn config_path() -> Result<PathBuf, AuthError> {
    let dirs = ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .ok_or_else(|| AuthError::Authentication("cannot determine config directory".into()))?;
    Ok(dirs.config_dir().join("engine.toml"))
}

/// Load `EngineConfig` from the platform config directory, falling back to
/// `EngineConfig::default()` if no file is present yet.
pub fn load_config() -> Result<EngineConfig, AuthError> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(EngineConfig::default());
    }
    let raw = std::fs::read_to_string(&path)
        .map_err(|e| AuthError::Authentication(format!("reading {}: {e}", path.display())))?;
    toml::from_str(&raw).map_err(|e| AuthError::Authentication(e.to_string()))
}

pub fn save_config(config: &EngineConfig) -> Result<(), AuthError> {
    let path = config_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| AuthError::Authentication(format!("creating {}: {e}", parent.display())))?;
    }
    let raw = toml::to_string_pretty(config).map_err(|e| AuthError::Authentication(e.to_string()))?;
    std::fs::write(&path, raw)
        .map_err(|e| AuthError::Authentication(format!("writing {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_values() {
        let cfg = EngineConfig::default();
        assert!(cfg.max_crypto_thread_count > 0);
        assert!(cfg.crypto_key_buffer_count > 0);
    }

    #[test]
    fn round_trips_through_toml() {
        let cfg = EngineConfig { max_crypto_thread_count: 8, crypto_key_buffer_count: 16 };
        let raw = toml::to_string_pretty(&cfg).unwrap();
        let parsed: EngineConfig = toml::from_str(&raw).unwrap();
        assert_eq!(parsed, cfg);
    }
}
