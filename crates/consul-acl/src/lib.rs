//! Consul ACL bindings
//!
//! An async client for the ACL endpoints of the Consul HTTP API: policies,
//! roles, and the legacy (pre 1.4) token API.
//!
//! # Example
//!
//! ```rust,no_run
//! use consul_acl::{AclPolicy, Client, ClientConfig, PolicyLink, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = Client::with_config(
//!         ClientConfig::builder()
//!             .base_url("http://127.0.0.1:8500/v1")
//!             .token("b1gs33cr3t")
//!             .build(),
//!     )?;
//!
//!     let policy = client
//!         .acl()
//!         .create_policy(
//!             &AclPolicy::builder("svc-read")
//!                 .rules(r#"key "" { policy = "read" }"#)
//!                 .build(),
//!         )
//!         .await?;
//!
//!     let role = client
//!         .acl()
//!         .create_role(
//!             &AclPolicy::builder("r1")
//!                 .policies(vec![PolicyLink::by_name(&policy.name)])
//!                 .build(),
//!         )
//!         .await?;
//!
//!     println!("created role {}", role.id);
//!     Ok(())
//! }
//! ```

pub mod acl;
pub mod client;
pub mod error;
pub mod transport;
pub mod types;
pub mod validate;

pub use acl::Acl;
pub use client::{Client, ClientConfig, ClientConfigBuilder};
pub use error::{Error, Result};
pub use transport::{build_uri, HttpTransport, Response, Transport};
pub use types::*;
pub use validate::{format_structures, validate_policy_links, validate_service_identities};

use std::time::Duration;

/// SDK version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default agent address, API version prefix included
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8500/v1";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Header carrying the ACL token on every request
pub const TOKEN_HEADER: &str = "X-Consul-Token";
