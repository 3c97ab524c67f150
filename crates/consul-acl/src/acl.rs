//! ACL endpoints
//!
//! One method per call of the `/v1/acl` API. Every method sends exactly one
//! request and maps the status code:
//!
//! * 403 is [`Error::Forbidden`] carrying the response body
//! * 404 is [`Error::NotFound`] for single-record reads, an empty list for
//!   list reads
//! * any other non-2xx status is [`Error::Request`]
//!
//! [`Acl::destroy_token`] is the one exception, see its docs.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::client::Client;
use crate::error::{Error, Result};
use crate::transport::Response;
use crate::types::{AclPolicy, AclToken, LegacyToken, Policy, ReplicationStatus, Role, Token};

const ENDPOINT: &str = "acl";

#[derive(Deserialize)]
struct IdResponse {
    #[serde(rename = "ID")]
    id: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// The ACL endpoint group
pub struct Acl {
    client: Client,
}

impl Acl {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Token used by this client
    pub async fn read_self_token(&self) -> Result<Token> {
        self.get_record(&["token", "self"]).await
    }

    pub async fn list_policies(&self) -> Result<Vec<Policy>> {
        self.get_list(&["policies"]).await
    }

    pub async fn read_policy(&self, id: &str) -> Result<Policy> {
        self.get_record(&["policy", id]).await
    }

    pub async fn create_policy(&self, policy: &AclPolicy) -> Result<Policy> {
        let body = policy.to_body()?;
        self.put_record(&["policy"], Some(body)).await
    }

    pub async fn update_policy(&self, id: &str, policy: &AclPolicy) -> Result<Policy> {
        let body = policy.to_body()?;
        self.put_record(&["policy", id], Some(body)).await
    }

    /// Returns the service's verdict, `true` once the policy is gone
    pub async fn delete_policy(&self, id: &str) -> Result<bool> {
        let segments = ["policy", id];
        let uri = self.client.endpoint_uri(ENDPOINT, &segments)?;
        debug!(method = "DELETE", %uri, "sending ACL request");
        let response = self.client.transport().delete(&uri).await?;
        let response = check_status(response, &segments, true)?;
        if response.is_empty_body() {
            return Ok(response.is_success());
        }
        response.json()
    }

    pub async fn list_roles(&self) -> Result<Vec<Role>> {
        self.get_list(&["roles"]).await
    }

    /// Creates a role from `role.policies` and `role.service_identities`.
    /// Malformed links fail here without a request being sent.
    pub async fn create_role(&self, role: &AclPolicy) -> Result<Role> {
        let body = role.to_body()?;
        self.put_record(&["role"], Some(body)).await
    }

    // -------------------------------------------------------------------------
    // Legacy token API, deprecated since Consul 1.4
    // -------------------------------------------------------------------------

    /// One-time bootstrap of the ACL system, returning the first management
    /// token.
    ///
    /// A [`Error::Forbidden`] here means the cluster was already bootstrapped,
    /// which should be treated as a potential compromise.
    pub async fn bootstrap(&self) -> Result<String> {
        self.put_for_id(&["bootstrap"], None).await
    }

    /// Creates a legacy token and returns its ID. Needs a management token.
    pub async fn create_token(&self, token: &AclToken) -> Result<String> {
        let body = token.to_body()?;
        self.put_for_id(&["create"], Some(body)).await
    }

    /// Clones `acl_id`, returning the new token's ID
    pub async fn clone_token(&self, acl_id: &str) -> Result<String> {
        self.put_for_id(&["clone", acl_id], None).await
    }

    /// Destroys a legacy token.
    ///
    /// Unlike every other call, only a 403 is raised. The result is `true`
    /// for a 200 and `false` for any other status, matching how the legacy
    /// endpoint has always been consumed.
    pub async fn destroy_token(&self, acl_id: &str) -> Result<bool> {
        let uri = self.client.endpoint_uri(ENDPOINT, &["destroy", acl_id])?;
        debug!(method = "PUT", %uri, "sending ACL request");
        let response = self.client.transport().put(&uri, None).await?;
        debug!(status = response.status, "ACL response");
        if response.status == 403 {
            warn!(%uri, "ACL request forbidden");
            return Err(Error::Forbidden(response.text()));
        }
        Ok(response.status == 200)
    }

    /// Legacy token details. The service answers 200 with an empty body for
    /// unknown IDs, which is reported as [`Error::NotFound`] as well.
    pub async fn token_info(&self, acl_id: &str) -> Result<LegacyToken> {
        let segments = ["info", acl_id];
        let response = self.fetch(&segments).await?;
        let response = check_status(response, &segments, true)?;
        if response.is_empty_body() {
            return Err(Error::NotFound("ACL not found".to_string()));
        }
        match response.json::<OneOrMany<LegacyToken>>()? {
            OneOrMany::One(token) => Ok(token),
            OneOrMany::Many(tokens) => tokens
                .into_iter()
                .next()
                .ok_or_else(|| Error::NotFound("ACL not found".to_string())),
        }
    }

    pub async fn list_tokens(&self) -> Result<Vec<LegacyToken>> {
        self.get_list(&["list"]).await
    }

    /// Replication state of the datacenter that answers
    pub async fn replication(&self) -> Result<ReplicationStatus> {
        self.get_record(&["replication"]).await
    }

    /// Updates `acl_id` with the fields of `token`, creating it when the
    /// service does not know the ID. Returns the token ID.
    pub async fn update_token(&self, acl_id: &str, token: &AclToken) -> Result<String> {
        let mut body = token.to_body()?;
        body.insert("ID".to_string(), Value::String(acl_id.to_string()));
        self.put_for_id(&["update"], Some(body)).await
    }

    // -------------------------------------------------------------------------
    // Dispatch
    // -------------------------------------------------------------------------

    async fn fetch(&self, segments: &[&str]) -> Result<Response> {
        let uri = self.client.endpoint_uri(ENDPOINT, segments)?;
        debug!(method = "GET", %uri, "sending ACL request");
        self.client.transport().get(&uri).await
    }

    async fn get_record<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let response = self.fetch(segments).await?;
        check_status(response, segments, true)?.json()
    }

    async fn get_list<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<Vec<T>> {
        let response = self.fetch(segments).await?;
        let response = check_status(response, segments, false)?;
        if response.is_not_found() || response.is_empty_body() {
            return Ok(Vec::new());
        }
        response.json()
    }

    async fn put_record<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: Option<Map<String, Value>>,
    ) -> Result<T> {
        let uri = self.client.endpoint_uri(ENDPOINT, segments)?;
        debug!(method = "PUT", %uri, "sending ACL request");
        let response = self
            .client
            .transport()
            .put(&uri, body.map(Value::Object))
            .await?;
        check_status(response, segments, true)?.json()
    }

    async fn put_for_id(
        &self,
        segments: &[&str],
        body: Option<Map<String, Value>>,
    ) -> Result<String> {
        let created: IdResponse = self.put_record(segments, body).await?;
        Ok(created.id)
    }
}

/// Maps error statuses. A 404 passes through untouched unless
/// `raise_on_404` is set.
fn check_status(response: Response, segments: &[&str], raise_on_404: bool) -> Result<Response> {
    debug!(status = response.status, "ACL response");
    match response.status {
        403 => {
            warn!(path = %segments.join("/"), "ACL request forbidden");
            Err(Error::Forbidden(response.text()))
        }
        404 if raise_on_404 => Err(Error::NotFound(format!(
            "{} not found",
            segments.join("/")
        ))),
        404 => Ok(response),
        _ if response.is_success() => Ok(response),
        status => Err(Error::Request {
            status,
            body: response.text(),
        }),
    }
}
