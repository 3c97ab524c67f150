//! Policy commands

use anyhow::Result;
use consul_acl::AclPolicy;

use super::{read_rules, Session};
use crate::{PolicyArgs, PolicyCommands};

pub async fn handle(action: PolicyCommands, session: &Session) -> Result<()> {
    let acl = &session.acl;
    match action {
        PolicyCommands::List => {
            let policies = acl.list_policies().await?;
            session.format.print(&policies)?;
        }
        PolicyCommands::Get { id } => {
            let policy = acl.read_policy(&id).await?;
            session.format.print(&policy)?;
        }
        PolicyCommands::Create(args) => {
            let policy = acl.create_policy(&build_policy(args)?).await?;
            session.format.print(&policy)?;
        }
        PolicyCommands::Update { id, policy } => {
            let policy = acl.update_policy(&id, &build_policy(policy)?).await?;
            session.format.print(&policy)?;
        }
        PolicyCommands::Delete { id } => {
            if acl.delete_policy(&id).await? {
                println!("Deleted policy: {}", id);
            } else {
                anyhow::bail!("policy {} was not deleted", id);
            }
        }
    }
    Ok(())
}

fn build_policy(args: PolicyArgs) -> Result<AclPolicy> {
    let rules = read_rules(&args.rules)?;
    let mut policy = AclPolicy::builder(args.name);
    if let Some(description) = args.description {
        policy = policy.description(description);
    }
    if !args.datacenters.is_empty() {
        policy = policy.datacenters(args.datacenters);
    }
    if let Some(rules) = rules {
        policy = policy.rules(rules);
    }
    Ok(policy.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RulesArgs;

    #[test]
    fn test_build_policy_leaves_unset_fields_absent() {
        let policy = build_policy(PolicyArgs {
            name: "svc-read".into(),
            description: None,
            datacenters: vec![],
            rules: RulesArgs {
                rules: Some("key \"\" { policy = \"read\" }".into()),
                rules_file: None,
            },
        })
        .unwrap();

        assert_eq!(policy.name, "svc-read");
        assert!(policy.datacenters.is_none());
        assert!(policy.description.is_none());
        assert_eq!(policy.rules.as_deref(), Some("key \"\" { policy = \"read\" }"));
    }

    #[test]
    fn test_build_policy_with_datacenters() {
        let policy = build_policy(PolicyArgs {
            name: "dc-scoped".into(),
            description: Some("only dc1".into()),
            datacenters: vec!["dc1".into()],
            rules: RulesArgs {
                rules: None,
                rules_file: None,
            },
        })
        .unwrap();

        assert_eq!(policy.datacenters, Some(vec!["dc1".to_string()]));
        assert_eq!(policy.description.as_deref(), Some("only dc1"));
        assert!(policy.rules.is_none());
    }
}
