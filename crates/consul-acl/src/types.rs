//! Request models and response records
//!
//! Request models (`AclPolicy`, `AclToken`) are built per call and turned into
//! a JSON object with [`AclPolicy::to_body`] / [`AclToken::to_body`]. Unset
//! fields never appear in the body: Consul treats an explicit `null` differently
//! from an absent key for several of them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::validate::{format_structures, validate_policy_links, validate_service_identities};

// =============================================================================
// Links
// =============================================================================

/// Reference to an existing policy, by ID, by name, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyLink {
    #[serde(rename = "ID", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl PolicyLink {
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: None,
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }

    /// A link must name its policy by `ID` or `Name`.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_none() && self.name.is_none() {
            return Err(Error::AclPolicyFormat(describe(self)));
        }
        Ok(())
    }
}

/// Grants the default permissions of a named service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceIdentity {
    #[serde(rename = "ServiceName", default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    /// Restricts the identity to these datacenters
    #[serde(rename = "Datacenters", default, skip_serializing_if = "Option::is_none")]
    pub datacenters: Option<Vec<String>>,
}

impl ServiceIdentity {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: Some(service_name.into()),
            datacenters: None,
        }
    }

    pub fn with_datacenters(mut self, datacenters: Vec<String>) -> Self {
        self.datacenters = Some(datacenters);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.service_name.is_none() {
            return Err(Error::AclPolicyFormat(describe(self)));
        }
        Ok(())
    }
}

/// Role reference carried by tokens
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleLink {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: String,
}

fn describe<T: Serialize + fmt::Debug>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("{:?}", value))
}

// =============================================================================
// Request models
// =============================================================================

/// Legacy token type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AclTokenType {
    #[default]
    Client,
    Management,
}

impl AclTokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AclTokenType::Client => "client",
            AclTokenType::Management => "management",
        }
    }
}

impl fmt::Display for AclTokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AclTokenType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "client" => Ok(AclTokenType::Client),
            "management" => Ok(AclTokenType::Management),
            other => Err(Error::Config(format!(
                "unknown ACL type {:?}, expected client or management",
                other
            ))),
        }
    }
}

/// Body of the legacy `create` and `update` calls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AclToken {
    pub id: Option<String>,
    pub name: Option<String>,
    pub token_type: AclTokenType,
    /// HCL rules document, passed through untouched
    pub rules: Option<String>,
}

impl AclToken {
    pub fn builder() -> AclTokenBuilder {
        AclTokenBuilder::default()
    }

    pub fn to_body(&self) -> Result<Map<String, Value>> {
        let mut body = Map::new();
        insert(&mut body, "ID", self.id.as_deref())?;
        insert(&mut body, "Name", self.name.as_deref())?;
        insert(&mut body, "Type", Some(self.token_type))?;
        insert(&mut body, "Rules", self.rules.as_deref())?;
        Ok(body)
    }
}

/// Builder for AclToken
#[derive(Debug, Clone, Default)]
pub struct AclTokenBuilder {
    token: AclToken,
}

impl AclTokenBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.token.id = Some(id.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.token.name = Some(name.into());
        self
    }

    pub fn token_type(mut self, token_type: AclTokenType) -> Self {
        self.token.token_type = token_type;
        self
    }

    pub fn rules(mut self, rules: impl Into<String>) -> Self {
        self.token.rules = Some(rules.into());
        self
    }

    pub fn build(self) -> AclToken {
        self.token
    }
}

/// Body of the policy and role calls.
///
/// `policies` and `service_identities` only make sense for roles; the service
/// decides whether a role without either is acceptable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AclPolicy {
    pub name: String,
    pub datacenters: Option<Vec<String>>,
    pub description: Option<String>,
    pub rules: Option<String>,
    pub policies: Option<Vec<PolicyLink>>,
    pub service_identities: Option<Vec<ServiceIdentity>>,
}

impl AclPolicy {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn builder(name: impl Into<String>) -> AclPolicyBuilder {
        AclPolicyBuilder {
            policy: Self::new(name),
        }
    }

    /// Builds the request body, validating any policy links and service
    /// identities first.
    pub fn to_body(&self) -> Result<Map<String, Value>> {
        let mut body = Map::new();
        insert(&mut body, "Name", Some(&self.name))?;
        insert(&mut body, "Datacenters", self.datacenters.as_ref())?;
        insert(&mut body, "Description", self.description.as_deref())?;
        insert(&mut body, "Rules", self.rules.as_deref())?;
        if let Some(links) = format_structures(self.policies.as_deref(), validate_policy_links)? {
            body.insert("Policies".to_string(), links);
        }
        if let Some(identities) = format_structures(
            self.service_identities.as_deref(),
            validate_service_identities,
        )? {
            body.insert("ServiceIdentities".to_string(), identities);
        }
        Ok(body)
    }
}

/// Builder for AclPolicy
#[derive(Debug, Clone)]
pub struct AclPolicyBuilder {
    policy: AclPolicy,
}

impl AclPolicyBuilder {
    pub fn datacenters(mut self, datacenters: Vec<String>) -> Self {
        self.policy.datacenters = Some(datacenters);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.policy.description = Some(description.into());
        self
    }

    pub fn rules(mut self, rules: impl Into<String>) -> Self {
        self.policy.rules = Some(rules.into());
        self
    }

    pub fn policies(mut self, policies: Vec<PolicyLink>) -> Self {
        self.policy.policies = Some(policies);
        self
    }

    pub fn service_identities(mut self, service_identities: Vec<ServiceIdentity>) -> Self {
        self.policy.service_identities = Some(service_identities);
        self
    }

    pub fn build(self) -> AclPolicy {
        self.policy
    }
}

fn insert<V: Serialize>(body: &mut Map<String, Value>, key: &str, value: Option<V>) -> Result<()> {
    if let Some(value) = value {
        body.insert(key.to_string(), serde_json::to_value(value)?);
    }
    Ok(())
}

// =============================================================================
// Response records
// =============================================================================

// Consul writes unset lists as `null` rather than omitting them, which the
// container-level `default` alone does not cover.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Token returned by `token/self`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Token {
    #[serde(rename = "AccessorID", deserialize_with = "null_as_default")]
    pub accessor_id: String,
    #[serde(rename = "SecretID", deserialize_with = "null_as_default")]
    pub secret_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub policies: Vec<PolicyLink>,
    #[serde(deserialize_with = "null_as_default")]
    pub roles: Vec<RoleLink>,
    #[serde(deserialize_with = "null_as_default")]
    pub service_identities: Vec<ServiceIdentity>,
    pub local: bool,
    pub create_time: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "null_as_default")]
    pub hash: String,
    pub create_index: u64,
    pub modify_index: u64,
}

/// ACL policy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Policy {
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    /// Absent from list responses
    pub rules: Option<String>,
    /// Empty when the policy is valid in every datacenter
    #[serde(deserialize_with = "null_as_default")]
    pub datacenters: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub hash: String,
    pub create_index: u64,
    pub modify_index: u64,
}

/// ACL role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Role {
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub policies: Vec<PolicyLink>,
    #[serde(deserialize_with = "null_as_default")]
    pub service_identities: Vec<ServiceIdentity>,
    #[serde(deserialize_with = "null_as_default")]
    pub hash: String,
    pub create_index: u64,
    pub modify_index: u64,
}

/// Token as returned by the legacy API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LegacyToken {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "Type")]
    pub token_type: AclTokenType,
    #[serde(deserialize_with = "null_as_default")]
    pub rules: String,
    pub create_index: u64,
    pub modify_index: u64,
}

/// State of ACL replication in the queried datacenter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ReplicationStatus {
    pub enabled: bool,
    pub running: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub source_datacenter: String,
    #[serde(deserialize_with = "null_as_default")]
    pub replication_type: String,
    pub replicated_index: u64,
    pub replicated_role_index: u64,
    pub replicated_token_index: u64,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_policy_name_only_body() {
        let body = AclPolicy::new("p").to_body().unwrap();
        assert_eq!(Value::Object(body), json!({"Name": "p"}));
    }

    #[test]
    fn test_policy_full_body() {
        let policy = AclPolicy::builder("svc-read")
            .datacenters(vec!["dc1".into(), "dc2".into()])
            .description("read everything")
            .rules(r#"key "" { policy = "read" }"#)
            .build();

        assert_eq!(
            Value::Object(policy.to_body().unwrap()),
            json!({
                "Name": "svc-read",
                "Datacenters": ["dc1", "dc2"],
                "Description": "read everything",
                "Rules": "key \"\" { policy = \"read\" }",
            })
        );
    }

    #[test]
    fn test_role_body_with_links() {
        let role = AclPolicy::builder("r1")
            .policies(vec![PolicyLink::by_name("svc-read")])
            .service_identities(vec![
                ServiceIdentity::new("web").with_datacenters(vec!["dc1".into()])
            ])
            .build();

        assert_eq!(
            Value::Object(role.to_body().unwrap()),
            json!({
                "Name": "r1",
                "Policies": [{"Name": "svc-read"}],
                "ServiceIdentities": [{"ServiceName": "web", "Datacenters": ["dc1"]}],
            })
        );
    }

    #[test]
    fn test_role_body_rejects_empty_link() {
        let role = AclPolicy::builder("bad")
            .policies(vec![PolicyLink::default()])
            .build();

        let err = role.to_body().unwrap_err();
        assert!(err.is_validation_error());
        assert_eq!(err.to_string(), "ACL policy format error: {}");
    }

    #[test]
    fn test_role_body_rejects_nameless_identity() {
        let role = AclPolicy::builder("bad")
            .service_identities(vec![ServiceIdentity {
                service_name: None,
                datacenters: Some(vec!["dc1".into()]),
            }])
            .build();

        assert!(matches!(role.to_body(), Err(Error::AclPolicyFormat(_))));
    }

    #[test]
    fn test_empty_link_lists_are_omitted() {
        let role = AclPolicy::builder("r2")
            .policies(vec![])
            .service_identities(vec![])
            .build();

        assert_eq!(Value::Object(role.to_body().unwrap()), json!({"Name": "r2"}));
    }

    #[test]
    fn test_token_body_defaults_to_client() {
        let token = AclToken::builder().name("agent").build();
        assert_eq!(
            Value::Object(token.to_body().unwrap()),
            json!({"Name": "agent", "Type": "client"})
        );
    }

    #[test]
    fn test_token_body_with_id_and_rules() {
        let token = AclToken::builder()
            .id("8f246b77-f3e1-ff88-5b48-8ec93abf3e05")
            .name("ops")
            .token_type(AclTokenType::Management)
            .rules(r#"service "" { policy = "write" }"#)
            .build();

        assert_eq!(
            Value::Object(token.to_body().unwrap()),
            json!({
                "ID": "8f246b77-f3e1-ff88-5b48-8ec93abf3e05",
                "Name": "ops",
                "Type": "management",
                "Rules": "service \"\" { policy = \"write\" }",
            })
        );
    }

    #[test]
    fn test_token_type_from_str() {
        assert_eq!("client".parse::<AclTokenType>().unwrap(), AclTokenType::Client);
        assert_eq!(
            "management".parse::<AclTokenType>().unwrap(),
            AclTokenType::Management
        );
        assert!("root".parse::<AclTokenType>().is_err());
    }

    #[test]
    fn test_decode_token_self() {
        let token: Token =
            serde_json::from_str(include_str!("../tests/fixtures/token_self.json")).unwrap();

        assert_eq!(token.accessor_id, "6a1253d2-1785-24fd-91c2-f8e78c745511");
        assert_eq!(token.policies.len(), 2);
        assert_eq!(token.policies[0].name.as_deref(), Some("node1-write"));
        assert!(token.roles.is_empty());
        assert!(token.service_identities.is_empty());
        assert_eq!(
            token.create_time.unwrap().to_rfc3339(),
            "2018-10-24T16:25:06.921933+00:00"
        );
        assert_eq!(token.modify_index, 59);
    }

    #[test]
    fn test_decode_policy_list_with_null_datacenters() {
        let policies: Vec<Policy> =
            serde_json::from_str(include_str!("../tests/fixtures/list_policies.json")).unwrap();

        assert_eq!(policies[0].name, "global-management");
        assert!(policies[0].datacenters.is_empty());
        assert!(policies[0].rules.is_none());
        assert_eq!(policies[1].datacenters, vec!["dc1", "dc2"]);
    }

    #[test]
    fn test_decode_policy_ignores_unknown_fields() {
        let policy: Policy =
            serde_json::from_str(include_str!("../tests/fixtures/read_policy.json")).unwrap();

        assert_eq!(policy.id, "e359bd81-baca-903e-7e64-1ccd9fdc78f5");
        assert_eq!(policy.rules.as_deref(), Some("node_prefix \"\" { policy = \"read\"}"));
        assert!(policy.datacenters.is_empty());
    }

    #[test]
    fn test_decode_role_list() {
        let roles: Vec<Role> =
            serde_json::from_str(include_str!("../tests/fixtures/list_roles.json")).unwrap();

        assert!(roles[0].service_identities.is_empty());
        let db = ServiceIdentity::new("db").with_datacenters(vec!["dc1".into()]);
        assert_eq!(roles[1].service_identities[1], db);
    }

    #[test]
    fn test_null_lists_and_strings_decode_as_empty() {
        let role: Role = serde_json::from_value(json!({
            "ID": "r",
            "Name": "r",
            "Description": null,
            "Policies": null,
            "ServiceIdentities": null,
            "Hash": null
        }))
        .unwrap();
        assert_eq!(
            role,
            Role {
                id: "r".into(),
                name: "r".into(),
                ..Role::default()
            }
        );

        let token: LegacyToken =
            serde_json::from_value(json!({"ID": "anonymous", "Rules": null})).unwrap();
        assert_eq!(token.rules, "");
    }

    #[test]
    fn test_decode_legacy_token() {
        let token: LegacyToken = serde_json::from_value(json!({
            "CreateIndex": 3,
            "ModifyIndex": 3,
            "ID": "8f246b77-f3e1-ff88-5b48-8ec93abf3e05",
            "Name": "Client Token",
            "Type": "management",
            "Rules": ""
        }))
        .unwrap();

        assert_eq!(token.token_type, AclTokenType::Management);
        assert_eq!(token.name, "Client Token");
    }

    #[test]
    fn test_decode_replication_status() {
        let status: ReplicationStatus =
            serde_json::from_str(include_str!("../tests/fixtures/replication.json")).unwrap();

        assert!(status.enabled);
        assert_eq!(status.source_datacenter, "dc1");
        assert_eq!(status.replicated_token_index, 2018);
        assert!(status.last_success.is_some());
        assert_eq!(status.last_error.unwrap().timestamp(), -62135596800);
    }
}
