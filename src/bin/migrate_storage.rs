//! Copies locally stored documents into a remote storage provider.
//!
//! Usage:
//!   migrate-storage --dry-run          - Check every document, write nothing
//!   migrate-storage                    - Migrate into STORAGE_PROVIDER
//!   migrate-storage --target gcs       - Migrate into an explicit provider
//!   migrate-storage --delete-source    - Remove local copies once uploaded
//!   migrate-storage --json             - Print the report as JSON

use anyhow::Context;
use clap::Parser;
use grc_storage::core::config::{DatabaseConfig, LocalStorageConfig, ProviderConfig, StorageConfig};
use grc_storage::core::database;
use grc_storage::features::migration::{
    MigrationOptions, MigrationService, PgDocumentSource,
};
use grc_storage::modules::storage::{ProviderKind, StorageGateway};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "migrate-storage")]
#[command(about = "Migrate locally stored GRC documents to a cloud provider", long_about = None)]
struct Args {
    /// Read and check every document without uploading
    #[arg(long = "dry-run")]
    dry_run: bool,

    /// Delete the local file after a successful upload
    #[arg(long = "delete-source", conflicts_with = "dry_run")]
    delete_source: bool,

    /// Process at most N documents (N >= 1)
    #[arg(long = "limit", value_parser = clap::value_parser!(i64).range(1..))]
    limit: Option<i64>,

    /// Target provider (s3, azure, gcs). Defaults to STORAGE_PROVIDER.
    #[arg(long = "target")]
    target: Option<ProviderKind>,

    /// Print the final report as JSON on stdout
    #[arg(long = "json")]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let target_config = match args.target {
        Some(kind) => ProviderConfig::from_env_for(kind),
        None => StorageConfig::from_env().map(|c| c.provider),
    }
    .map_err(|e| anyhow::anyhow!(e))?;

    if target_config.kind() == ProviderKind::Local {
        anyhow::bail!(
            "Migration target must be s3, azure or gcs; set STORAGE_PROVIDER or pass --target"
        );
    }

    let db_config = DatabaseConfig::from_env().map_err(|e| anyhow::anyhow!(e))?;
    let pool = database::create_pool(&db_config)
        .await
        .context("Failed to connect to the document database")?;

    let local = StorageGateway::for_provider(&ProviderConfig::Local(LocalStorageConfig::from_env()))
        .await
        .context("Failed to open local storage")?;
    let target = StorageGateway::for_provider(&target_config)
        .await
        .with_context(|| format!("Failed to initialize '{}' storage", target_config.kind()))?;

    let service = MigrationService::new(
        Arc::new(PgDocumentSource::new(pool)),
        Arc::new(local),
        Arc::new(target),
    );

    let report = service
        .run(MigrationOptions {
            dry_run: args.dry_run,
            delete_source: args.delete_source,
            limit: args.limit,
        })
        .await?;

    report.log_summary();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_must_be_positive() {
        for bad in ["0", "-1"] {
            let parsed = Args::try_parse_from(["migrate-storage", "--limit", bad]);
            assert!(parsed.is_err(), "--limit {} was accepted", bad);
        }

        let args = Args::try_parse_from(["migrate-storage", "--limit", "5"]).unwrap();
        assert_eq!(args.limit, Some(5));
        assert!(Args::try_parse_from(["migrate-storage"]).unwrap().limit.is_none());
    }

    #[test]
    fn test_delete_source_conflicts_with_dry_run() {
        let parsed = Args::try_parse_from(["migrate-storage", "--dry-run", "--delete-source"]);
        assert!(parsed.is_err());
    }
}
