use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// API token stored for a profile, with the cluster it was issued for.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredCredentials {
    pub endpoint: String,
    pub token: String,
}

impl StoredCredentials {
    /// First and last characters of the token, for display.
    pub fn token_preview(&self) -> String {
        let token = &self.token;
        if token.len() > 20 && token.is_ascii() {
            format!("{}...{}", &token[..8], &token[token.len() - 8..])
        } else {
            "*".repeat(token.chars().count().min(8))
        }
    }
}

fn creds_path(profile: &str) -> Result<PathBuf> {
    Ok(crate::config::config_dir()?.join(format!("credentials.{profile}.json")))
}

pub fn load_credentials_from(path: &Path) -> Result<Option<StoredCredentials>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let creds = serde_json::from_str(&content)
        .with_context(|| format!("Invalid credentials file {}", path.display()))?;
    Ok(Some(creds))
}

pub fn save_credentials_to(path: &Path, creds: &StoredCredentials) -> Result<()> {
    let content = serde_json::to_string_pretty(creds)?;
    fs::write(path, content)?;
    Ok(())
}

pub fn load_credentials(profile: &str) -> Result<Option<StoredCredentials>> {
    load_credentials_from(&creds_path(profile)?)
}

pub fn save_credentials(profile: &str, creds: &StoredCredentials) -> Result<()> {
    save_credentials_to(&creds_path(profile)?, creds)
}

pub fn remove_credentials(profile: &str) -> Result<bool> {
    let path = creds_path(profile)?;
    if path.exists() {
        fs::remove_file(path)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_round_trip() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("credentials.default.json");
        assert!(load_credentials_from(&path).unwrap().is_none());

        let creds = StoredCredentials {
            endpoint: "https://try.wavefront.com".into(),
            token: "12345678-1234-1a11-aa11-123456789abcd".into(),
        };
        save_credentials_to(&path, &creds).unwrap();
        assert_eq!(load_credentials_from(&path).unwrap(), Some(creds));
    }

    #[test]
    fn test_token_preview_hides_middle() {
        let creds = StoredCredentials {
            endpoint: String::new(),
            token: "12345678-1234-1a11-aa11-123456789abcd".into(),
        };
        assert_eq!(creds.token_preview(), "12345678...6789abcd");

        let short = StoredCredentials {
            endpoint: String::new(),
            token: "abc".into(),
        };
        assert_eq!(short.token_preview(), "***");
    }
}
