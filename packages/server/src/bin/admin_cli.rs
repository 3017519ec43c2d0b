//! Operator CLI: migrations, default catalog data, and listing expiry
//!
//! Prints one JSON line per command so scripts can parse the result.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use server_core::domains::jobs::Job;
use server_core::seed::seed_defaults;
use sqlx::PgPool;

#[derive(Parser)]
#[command(name = "admin_cli")]
#[command(about = "Job board administration")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate,

    /// Insert default categories, job types, payment methods and products
    Seed,

    /// Mark active jobs past their expiry date as expired
    ExpireJobs,
}

#[derive(Serialize, Default)]
struct Response {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<u64>,
}

fn output(resp: Response) -> Result<()> {
    println!("{}", serde_json::to_string(&resp)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let pool = get_pool().await?;

    match cli.command {
        Commands::Migrate => cmd_migrate(&pool).await,
        Commands::Seed => cmd_seed(&pool).await,
        Commands::ExpireJobs => cmd_expire_jobs(&pool).await,
    }
}

/// Only the database is needed here, so the full server config is not loaded
async fn get_pool() -> Result<PgPool> {
    let _ = dotenvy::dotenv();
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")
}

// ============================================================================
// Commands
// ============================================================================

async fn cmd_migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run migrations")?;

    output(Response {
        success: true,
        message: Some("Migrations applied".to_string()),
        ..Default::default()
    })
}

/// Safe to run repeatedly: existing rows are left alone
async fn cmd_seed(pool: &PgPool) -> Result<()> {
    let created = seed_defaults(pool).await?;

    output(Response {
        success: true,
        message: Some("Seed complete".to_string()),
        count: Some(created),
    })
}

async fn cmd_expire_jobs(pool: &PgPool) -> Result<()> {
    let expired = Job::expire_past_due(pool).await?;
    tracing::info!(expired, "Expired past-due jobs");

    output(Response {
        success: true,
        message: None,
        count: Some(expired),
    })
}
