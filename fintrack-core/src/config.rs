//! Configuration management
//!
//! settings.json in the data directory:
//! ```json
//! {
//!   "auth": { "secretKey": "<hex>", "tokenTtlMinutes": 30 }
//! }
//! ```
//! `FINTRACK_SECRET_KEY` and `FINTRACK_TOKEN_TTL_MINUTES` override the file.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::domain::result::Error;
use crate::services::{TokenSettings, DEFAULT_TOKEN_TTL_MINUTES};

pub const SECRET_KEY_ENV: &str = "FINTRACK_SECRET_KEY";
pub const TOKEN_TTL_ENV: &str = "FINTRACK_TOKEN_TTL_MINUTES";

const SETTINGS_FILE: &str = "settings.json";
const GENERATED_SECRET_BYTES: usize = 32;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    auth: AuthSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    secret_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token_ttl_minutes: Option<i64>,
}

#[derive(Clone)]
pub struct Config {
    pub secret_key: String,
    pub token_ttl_minutes: i64,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("secret_key", &"<redacted>")
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .finish()
    }
}

impl Config {
    /// Load config from the data directory and the process environment
    pub fn load(dir: &Path) -> Result<Self> {
        Self::load_from(dir, |key| std::env::var(key).ok())
    }

    /// Load config with an explicit environment lookup
    ///
    /// Generates and persists a random secret when neither the file nor the
    /// environment provides one.
    pub fn load_from(dir: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut raw = read_settings(dir)?;

        let token_ttl_minutes = match env(TOKEN_TTL_ENV) {
            Some(value) => value
                .trim()
                .parse::<i64>()
                .with_context(|| format!("{} is not a number: {}", TOKEN_TTL_ENV, value))?,
            None => raw.auth.token_ttl_minutes.unwrap_or(DEFAULT_TOKEN_TTL_MINUTES),
        };

        let secret_key = match env(SECRET_KEY_ENV).filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None => match raw.auth.secret_key.clone().filter(|s| !s.is_empty()) {
                Some(secret) => secret,
                None => {
                    let secret = generate_secret();
                    raw.auth.secret_key = Some(secret.clone());
                    write_settings(dir, &raw)?;
                    secret
                }
            },
        };

        Ok(Self {
            secret_key,
            token_ttl_minutes,
        })
    }

    /// Persist the auth settings, keeping unrelated keys intact
    pub fn save(&self, dir: &Path) -> Result<()> {
        let mut raw = read_settings(dir)?;
        raw.auth.secret_key = Some(self.secret_key.clone());
        raw.auth.token_ttl_minutes = Some(self.token_ttl_minutes);
        write_settings(dir, &raw)
    }

    pub fn token_settings(&self) -> crate::domain::result::Result<TokenSettings> {
        if self.token_ttl_minutes <= 0 {
            return Err(Error::Config(format!(
                "token ttl must be positive, got {} minutes",
                self.token_ttl_minutes
            )));
        }
        let ttl = chrono::Duration::try_minutes(self.token_ttl_minutes).ok_or_else(|| {
            Error::Config(format!(
                "token ttl of {} minutes is out of range",
                self.token_ttl_minutes
            ))
        })?;
        Ok(TokenSettings::new(self.secret_key.as_bytes().to_vec(), ttl))
    }
}

fn read_settings(dir: &Path) -> Result<SettingsFile> {
    let path = dir.join(SETTINGS_FILE);
    if !path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(&path)?;
    serde_json::from_str(&content).with_context(|| format!("Invalid {}", path.display()))
}

fn write_settings(dir: &Path, settings: &SettingsFile) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let content = serde_json::to_string_pretty(settings)?;
    std::fs::write(dir.join(SETTINGS_FILE), content)?;
    Ok(())
}

fn generate_secret() -> String {
    let mut bytes = [0u8; GENERATED_SECRET_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
