use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use wavefront_core::{Connection, DEFAULT_ENDPOINT};

/// Overrides `~/.wavefront` as the directory for config and credentials.
pub const CONFIG_DIR_ENV: &str = "WAVEFRONT_CONFIG_DIR";

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ProfileConfig {
    pub endpoint: Option<String>,
    pub format: Option<String>,
}

pub type ConfigFile = BTreeMap<String, ProfileConfig>;

pub fn config_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) => PathBuf::from(dir),
        None => dirs::home_dir()
            .context("Cannot determine home directory")?
            .join(".wavefront"),
    };
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create config directory {}", dir.display()))?;
    Ok(dir)
}

fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

pub fn load_all_from(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::new());
    }
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).with_context(|| format!("Invalid config file {}", path.display()))
}

pub fn save_profile_to(path: &Path, profile: &str, config: &ProfileConfig) -> Result<()> {
    let mut all = load_all_from(path)?;
    all.insert(profile.to_string(), config.clone());
    let content = toml::to_string_pretty(&all)?;
    fs::write(path, content)?;
    Ok(())
}

pub fn load_profile(profile: &str) -> Result<ProfileConfig> {
    let mut all = load_all_from(&config_path()?)?;
    Ok(all.remove(profile).unwrap_or_default())
}

pub fn save_profile(profile: &str, config: &ProfileConfig) -> Result<()> {
    save_profile_to(&config_path()?, profile, config)
}

/// Endpoint precedence: --endpoint / WAVEFRONT_ENDPOINT, profile config,
/// stored credentials, then the default cluster.
pub fn resolve_endpoint(cli_endpoint: &Option<String>, profile: &str) -> Result<String> {
    if let Some(endpoint) = cli_endpoint {
        return Ok(endpoint.clone());
    }
    let cfg = load_profile(profile)?;
    if let Some(endpoint) = cfg.endpoint {
        return Ok(endpoint);
    }
    if let Ok(Some(creds)) = crate::auth::load_credentials(profile) {
        return Ok(creds.endpoint);
    }
    Ok(DEFAULT_ENDPOINT.to_string())
}

/// Token precedence: --token / WAVEFRONT_TOKEN, then stored credentials.
pub fn resolve_token(cli_token: &Option<String>, profile: &str) -> Result<String> {
    if let Some(token) = cli_token {
        return Ok(token.clone());
    }
    if let Some(creds) = crate::auth::load_credentials(profile)? {
        return Ok(creds.token);
    }
    anyhow::bail!(
        "No API token configured. Use --token, set WAVEFRONT_TOKEN env var, or run: wf login --api-token <token>"
    )
}

pub fn resolve_connection(
    cli_endpoint: &Option<String>,
    cli_token: &Option<String>,
    profile: &str,
) -> Result<Connection> {
    let endpoint = resolve_endpoint(cli_endpoint, profile)?;
    let token = resolve_token(cli_token, profile)?;
    Ok(Connection::new(endpoint, token))
}
