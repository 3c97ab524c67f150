//! consul-acl CLI
//!
//! Command-line front-end for the Consul ACL API.
//!
//! # Usage
//!
//! ```bash
//! consul-acl policy create --name svc-read --rules 'key "" { policy = "read" }'
//! consul-acl role create --name r1 --policy svc-read
//! consul-acl token info 8f246b77-f3e1-ff88-5b48-8ec93abf3e05 --format json
//! consul-acl replication --datacenter dc2
//! ```

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use consul_acl::AclTokenType;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod output;

#[derive(Parser)]
#[command(name = "consul-acl")]
#[command(version)]
#[command(about = "Manage Consul ACL policies, roles and tokens", long_about = None)]
struct Cli {
    #[command(flatten)]
    globals: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Consul agent address
    #[arg(long, global = true, env = "CONSUL_HTTP_ADDR")]
    addr: Option<String>,

    /// ACL token
    #[arg(long, global = true, env = "CONSUL_HTTP_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Datacenter to query
    #[arg(long, global = true)]
    datacenter: Option<String>,

    /// Output format
    #[arg(long, short, global = true)]
    format: Option<output::OutputFormat>,

    /// Profile name from config file
    #[arg(long, short, global = true)]
    profile: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage tokens (legacy API)
    Token {
        #[command(subcommand)]
        action: TokenCommands,
    },
    /// Manage policies
    Policy {
        #[command(subcommand)]
        action: PolicyCommands,
    },
    /// Manage roles
    Role {
        #[command(subcommand)]
        action: RoleCommands,
    },
    /// Show ACL replication status
    Replication,
    /// Configure CLI
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum TokenCommands {
    /// Show the token in use
    #[command(name = "self")]
    Current,
    /// Bootstrap the ACL system
    Bootstrap,
    /// Create a legacy token
    Create {
        #[arg(long)]
        name: String,
        #[arg(long = "type", default_value = "client")]
        token_type: AclTokenType,
        #[command(flatten)]
        rules: RulesArgs,
    },
    /// Clone a token
    Clone { id: String },
    /// Destroy a token
    Destroy { id: String },
    /// Show token details
    Info { id: String },
    /// List all tokens
    List,
    /// Update a token, creating it if the ID is unknown
    Update {
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long = "type", default_value = "client")]
        token_type: AclTokenType,
        #[command(flatten)]
        rules: RulesArgs,
    },
}

#[derive(Subcommand)]
pub enum PolicyCommands {
    /// List all policies
    List,
    /// Get policy details
    Get { id: String },
    /// Create a policy
    Create(PolicyArgs),
    /// Replace an existing policy
    Update {
        id: String,
        #[command(flatten)]
        policy: PolicyArgs,
    },
    /// Delete a policy
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum RoleCommands {
    /// List all roles
    List,
    /// Create a role from policies and service identities
    Create {
        #[arg(long, required_unless_present = "file")]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Policy to link, by name (repeatable)
        #[arg(long = "policy")]
        policies: Vec<String>,
        /// Policy to link, by ID (repeatable)
        #[arg(long = "policy-id")]
        policy_ids: Vec<String>,
        /// Service identity to grant (repeatable)
        #[arg(long = "service-identity")]
        service_identities: Vec<String>,
        /// JSON or YAML role definition
        #[arg(long, conflicts_with_all = ["name", "policies", "policy_ids", "service_identities"])]
        file: Option<String>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct PolicyArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    description: Option<String>,
    /// Restrict the policy to a datacenter (repeatable)
    #[arg(long = "valid-datacenter")]
    datacenters: Vec<String>,
    #[command(flatten)]
    rules: RulesArgs,
}

#[derive(Args, Debug, Clone)]
pub struct RulesArgs {
    /// Rules document
    #[arg(long, conflicts_with = "rules_file")]
    rules: Option<String>,
    /// Read the rules document from a file
    #[arg(long)]
    rules_file: Option<String>,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Set configuration value
    Set { key: String, value: String },
    /// Get configuration value
    Get { key: String },
    /// List all configuration
    List,
    /// Initialize configuration
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let globals = cli.globals;
    match cli.command {
        Commands::Config { action } => commands::config::handle(action, globals.profile.as_deref()),
        Commands::Token { action } => {
            commands::tokens::handle(action, &commands::Session::open(&globals)?).await
        }
        Commands::Policy { action } => {
            commands::policies::handle(action, &commands::Session::open(&globals)?).await
        }
        Commands::Role { action } => {
            commands::roles::handle(action, &commands::Session::open(&globals)?).await
        }
        Commands::Replication => commands::replication(&commands::Session::open(&globals)?).await,
    }
}
