//! CLI Commands

pub mod config;
pub mod policies;
pub mod roles;
pub mod tokens;

use anyhow::{Context, Result};
use consul_acl::{Acl, Client, ClientConfig, DEFAULT_BASE_URL};
use std::fs;

use crate::config::{api_base_url, Config};
use crate::output::OutputFormat;
use crate::{GlobalArgs, RulesArgs};

/// Connected client plus the chosen output format
pub struct Session {
    pub acl: Acl,
    pub format: OutputFormat,
}

impl Session {
    /// Flags win over the profile; the profile wins over built-in defaults.
    pub fn open(globals: &GlobalArgs) -> Result<Self> {
        let profile = Config::load(globals.profile.as_deref())?;
        let client_config = client_config(globals, &profile);
        tracing::debug!(config = ?client_config, "connecting");

        let format = match (globals.format, profile.default_format.as_deref()) {
            (Some(format), _) => format,
            (None, Some(configured)) => OutputFormat::from_config(configured)?,
            (None, None) => OutputFormat::Table,
        };

        let client = Client::with_config(client_config)?;
        Ok(Self {
            acl: client.acl(),
            format,
        })
    }
}

fn client_config(globals: &GlobalArgs, profile: &Config) -> ClientConfig {
    let base_url = globals
        .addr
        .as_deref()
        .or(profile.address.as_deref())
        .map(api_base_url)
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    ClientConfig {
        base_url,
        token: globals.token.clone().or_else(|| profile.token.clone()),
        datacenter: globals
            .datacenter
            .clone()
            .or_else(|| profile.datacenter.clone()),
        ..Default::default()
    }
}

/// Rules given inline or read from `--rules-file`
pub fn read_rules(args: &RulesArgs) -> Result<Option<String>> {
    match (&args.rules, &args.rules_file) {
        (Some(rules), _) => Ok(Some(rules.clone())),
        (None, Some(path)) => fs::read_to_string(path)
            .map(Some)
            .with_context(|| format!("reading rules from {}", path)),
        (None, None) => Ok(None),
    }
}

pub async fn replication(session: &Session) -> Result<()> {
    let status = session.acl.replication().await?;
    session.format.print(&status)
}
