//! Token commands (legacy API)

use anyhow::Result;
use consul_acl::AclToken;
use serde_json::json;

use super::{read_rules, Session};
use crate::TokenCommands;

pub async fn handle(action: TokenCommands, session: &Session) -> Result<()> {
    let acl = &session.acl;
    match action {
        TokenCommands::Current => {
            let token = acl.read_self_token().await?;
            session.format.print(&token)?;
        }
        TokenCommands::Bootstrap => {
            let id = acl.bootstrap().await?;
            session.format.print(&json!({ "ID": id }))?;
        }
        TokenCommands::Create {
            name,
            token_type,
            rules,
        } => {
            let mut token = AclToken::builder().name(name).token_type(token_type);
            if let Some(rules) = read_rules(&rules)? {
                token = token.rules(rules);
            }
            let id = acl.create_token(&token.build()).await?;
            println!("Created token: {}", id);
        }
        TokenCommands::Clone { id } => {
            let cloned = acl.clone_token(&id).await?;
            println!("Cloned token: {}", cloned);
        }
        TokenCommands::Destroy { id } => {
            if acl.destroy_token(&id).await? {
                println!("Destroyed token: {}", id);
            } else {
                anyhow::bail!("token {} was not destroyed", id);
            }
        }
        TokenCommands::Info { id } => {
            let token = acl.token_info(&id).await?;
            session.format.print(&token)?;
        }
        TokenCommands::List => {
            let tokens = acl.list_tokens().await?;
            session.format.print(&tokens)?;
        }
        TokenCommands::Update {
            id,
            name,
            token_type,
            rules,
        } => {
            let mut token = AclToken::builder().name(name).token_type(token_type);
            if let Some(rules) = read_rules(&rules)? {
                token = token.rules(rules);
            }
            let updated = acl.update_token(&id, &token.build()).await?;
            println!("Updated token: {}", updated);
        }
    }
    Ok(())
}
