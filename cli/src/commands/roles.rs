//! Role commands

use anyhow::{Context, Result};
use consul_acl::{AclPolicy, PolicyLink, ServiceIdentity};
use serde::Deserialize;
use std::fs;

use super::Session;
use crate::RoleCommands;

/// Role definition file, in the same shape the API accepts
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RoleFile {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    policies: Option<Vec<PolicyLink>>,
    #[serde(default)]
    service_identities: Option<Vec<ServiceIdentity>>,
}

impl From<RoleFile> for AclPolicy {
    fn from(file: RoleFile) -> Self {
        AclPolicy {
            name: file.name,
            description: file.description,
            policies: file.policies,
            service_identities: file.service_identities,
            ..Default::default()
        }
    }
}

pub async fn handle(action: RoleCommands, session: &Session) -> Result<()> {
    let acl = &session.acl;
    match action {
        RoleCommands::List => {
            let roles = acl.list_roles().await?;
            session.format.print(&roles)?;
        }
        RoleCommands::Create {
            name,
            description,
            policies,
            policy_ids,
            service_identities,
            file,
        } => {
            let role = match file {
                Some(path) => load_role(&path)?,
                None => {
                    let name = name.context("--name is required without --file")?;
                    from_flags(name, description, policies, policy_ids, service_identities)
                }
            };
            let created = acl.create_role(&role).await?;
            session.format.print(&created)?;
        }
    }
    Ok(())
}

fn from_flags(
    name: String,
    description: Option<String>,
    policies: Vec<String>,
    policy_ids: Vec<String>,
    service_identities: Vec<String>,
) -> AclPolicy {
    let links: Vec<PolicyLink> = policies
        .into_iter()
        .map(PolicyLink::by_name)
        .chain(policy_ids.into_iter().map(PolicyLink::by_id))
        .collect();
    let identities: Vec<ServiceIdentity> = service_identities
        .into_iter()
        .map(ServiceIdentity::new)
        .collect();

    AclPolicy {
        name,
        description,
        policies: Some(links).filter(|l| !l.is_empty()),
        service_identities: Some(identities).filter(|i| !i.is_empty()),
        ..Default::default()
    }
}

fn load_role(path: &str) -> Result<AclPolicy> {
    let content = fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
    parse_role(path, &content)
}

fn parse_role(path: &str, content: &str) -> Result<AclPolicy> {
    let file: RoleFile = if path.ends_with(".yaml") || path.ends_with(".yml") {
        serde_yaml::from_str(content).with_context(|| format!("parsing {}", path))?
    } else {
        serde_json::from_str(content).with_context(|| format!("parsing {}", path))?
    };
    Ok(file.into())
}
