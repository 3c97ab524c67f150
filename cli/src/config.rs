//! CLI Configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Profile stored under `~/.consul-acl/`
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub address: Option<String>,
    pub token: Option<String>,
    pub datacenter: Option<String>,
    pub default_format: Option<String>,
}

impl Config {
    pub fn load(profile: Option<&str>) -> Result<Self> {
        Self::load_from(&Self::config_path(profile)?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn save(&self, profile: Option<&str>) -> Result<PathBuf> {
        let path = Self::config_path(profile)?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("writing {}", path.display()))
    }

    /// Sets a key by name
    pub fn set(&mut self, key: &str, value: String) -> Result<()> {
        match key {
            "address" => self.address = Some(value),
            "token" => self.token = Some(value),
            "datacenter" => self.datacenter = Some(value),
            "default_format" => self.default_format = Some(value),
            _ => anyhow::bail!("unknown config key: {}", key),
        }
        Ok(())
    }

    /// Reads a key by name, masking the token
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(match key {
            "address" => self.address.clone(),
            "token" => self.token.as_deref().map(mask),
            "datacenter" => self.datacenter.clone(),
            "default_format" => self.default_format.clone(),
            _ => anyhow::bail!("unknown config key: {}", key),
        })
    }

    pub const KEYS: [&'static str; 4] = ["address", "token", "datacenter", "default_format"];

    fn config_path(profile: Option<&str>) -> Result<PathBuf> {
        let home = dirs::home_dir().context("cannot find home directory")?;
        let filename = match profile {
            Some(p) => format!("config.{}.toml", p),
            None => "config.toml".to_string(),
        };
        Ok(home.join(".consul-acl").join(filename))
    }
}

fn mask(token: &str) -> String {
    let visible: String = token.chars().take(4).collect();
    format!("{}****", visible)
}

/// Turns a `CONSUL_HTTP_ADDR` style address (`127.0.0.1:8500`,
/// `https://consul:8501/`) into the API base URL.
pub fn api_base_url(address: &str) -> String {
    let address = address.trim_end_matches('/');
    let address = address.strip_suffix("/v1").unwrap_or(address);
    if address.contains("://") {
        format!("{}/v1", address)
    } else {
        format!("http://{}/v1", address)
    }
}
