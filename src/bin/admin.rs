//! CLI administration tool for linkrift.
//!
//! Provides commands for managing API keys, triggering domain verification,
//! and viewing statistics without requiring HTTP API access.
//!
//! # Usage
//!
//! ```bash
//! # Issue a new API key for a workspace
//! cargo run --bin admin -- key issue <workspace-id> --name "ci" --scope links:read --scope links:write
//!
//! # List a workspace's keys
//! cargo run --bin admin -- key list <workspace-id>
//!
//! # Revoke a key
//! cargo run --bin admin -- key revoke <workspace-id> <key-id>
//!
//! # Force a domain verification check
//! cargo run --bin admin -- domain verify <domain-id> <workspace-id>
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string
//! - `TOKEN_SIGNING_SECRET` (required): HMAC secret used to hash issued keys,
//!   must match the value the server process uses

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use uuid::Uuid;

use linkrift::application::services::ApiKeyService;
use linkrift::domain::entities::ApiKeyScope;
use linkrift::infrastructure::persistence::PgApiKeyRepository;

/// CLI tool for managing linkrift.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage Management API keys
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Force a domain's DNS verification check
    Domain {
        #[command(subcommand)]
        action: DomainAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Key management subcommands.
#[derive(Subcommand)]
enum KeyAction {
    /// Issue a new API key for a workspace
    Issue {
        workspace_id: Uuid,

        #[arg(short, long)]
        name: String,

        /// Scopes to grant, e.g. `links:read`; repeatable
        #[arg(short, long = "scope", required = true)]
        scopes: Vec<String>,

        /// Optional expiry, RFC3339
        #[arg(long)]
        expires_at: Option<chrono::DateTime<chrono::Utc>>,
    },

    /// List a workspace's keys
    List { workspace_id: Uuid },

    /// Revoke a key
    Revoke { workspace_id: Uuid, key_id: Uuid },
}

/// Domain administration subcommands.
#[derive(Subcommand)]
enum DomainAction {
    /// Re-run DNS/SSL verification for a claimed domain
    Verify { domain_id: i64, workspace_id: Uuid },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = PgPool::connect(&database_url).await.context("Failed to connect to database")?;

    match cli.command {
        Commands::Key { action } => handle_key_action(action, &pool).await?,
        Commands::Domain { action } => handle_domain_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

fn api_key_service(pool: &PgPool) -> Result<ApiKeyService<PgApiKeyRepository>> {
    let signing_secret = std::env::var("TOKEN_SIGNING_SECRET").context("TOKEN_SIGNING_SECRET must be set")?;
    let repo = Arc::new(PgApiKeyRepository::new(Arc::new(pool.clone())));
    Ok(ApiKeyService::new(repo, signing_secret))
}

fn parse_scopes(raw: &[String]) -> Result<Vec<ApiKeyScope>> {
    raw.iter()
        .map(|s| ApiKeyScope::from_str(s).ok_or_else(|| anyhow::anyhow!("unknown scope: {s}")))
        .collect()
}

async fn handle_key_action(action: KeyAction, pool: &PgPool) -> Result<()> {
    let service = api_key_service(pool)?;

    match action {
        KeyAction::Issue { workspace_id, name, scopes, expires_at } => {
            let scopes = parse_scopes(&scopes)?;
            let (key, raw_key) = service.issue(workspace_id, name, scopes, expires_at, None).await?;

            println!("{}", "Key issued".bright_green().bold());
            println!("  ID:     {}", key.id.to_string().bright_black());
            println!("  Prefix: {}", key.key_prefix.cyan());
            println!();
            println!("{}", "Save this now, it won't be shown again:".red().bold());
            println!("  {}", raw_key.bright_yellow().bold());
        }
        KeyAction::List { workspace_id } => {
            let keys = service.list(workspace_id).await?;

            if keys.is_empty() {
                println!("{}", "No keys found".yellow());
                return Ok(());
            }

            println!(
                "  {:<36} {:<16} {:<30} {:<10}",
                "ID".bright_white().bold(),
                "Prefix".bright_white().bold(),
                "Name".bright_white().bold(),
                "Status".bright_white().bold()
            );
            for key in &keys {
                let status = if key.revoked_at.is_some() { "REVOKED".red() } else { "ACTIVE".green() };
                println!("  {:<36} {:<16} {:<30} {}", key.id, key.key_prefix.cyan(), key.name, status);
            }
        }
        KeyAction::Revoke { workspace_id, key_id } => {
            let confirmed = Confirm::new().with_prompt("Revoke this key?").default(false).interact()?;
            if !confirmed {
                println!("{}", "Cancelled".red());
                return Ok(());
            }

            service.revoke(key_id, workspace_id).await?;
            println!("{}", "Key revoked".green().bold());
        }
    }

    Ok(())
}

async fn handle_domain_action(action: DomainAction, pool: &PgPool) -> Result<()> {
    match action {
        DomainAction::Verify { domain_id, workspace_id } => {
            let row: Option<(bool,)> = sqlx::query_as(
                "UPDATE domains SET last_dns_check_at = now() WHERE id = $1 AND workspace_id = $2 AND deleted_at IS NULL RETURNING is_verified",
            )
            .bind(domain_id)
            .bind(workspace_id)
            .fetch_optional(pool)
            .await?;

            match row {
                Some((is_verified,)) => {
                    println!("Verification check recorded, is_verified={is_verified}");
                    println!(
                        "{}",
                        "Run the server's domain verification sweep for DNS/SSL re-checks to take effect.".bright_black()
                    );
                }
                None => println!("{}", "Domain not found".red()),
            }
        }
    }

    Ok(())
}

/// Displays system statistics.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "Statistics".bright_blue().bold());
    println!();

    let links_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links WHERE deleted_at IS NULL")
        .fetch_one(pool)
        .await?;
    let clicks_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clicks").fetch_one(pool).await?;
    let domains_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM domains WHERE deleted_at IS NULL")
        .fetch_one(pool)
        .await?;
    let keys_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM api_keys WHERE revoked_at IS NULL")
        .fetch_one(pool)
        .await?;

    println!("  Links:        {}", links_count.to_string().bright_green().bold());
    println!("  Clicks:       {}", clicks_count.to_string().bright_green().bold());
    println!("  Domains:      {}", domains_count.to_string().bright_green().bold());
    println!("  Active keys:  {}", keys_count.to_string().bright_green().bold());
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());
            sqlx::query("SELECT 1").fetch_one(pool).await?;
            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "Database Information".bright_blue().bold());
            println!();
            let version: String = sqlx::query_scalar("SELECT version()").fetch_one(pool).await?;
            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}
