// ABOUTME: CLI entry point for hubdb-sync
// ABOUTME: Parses commands, resolves the account and routes to table operations

use anyhow::Context;
use clap::{Parser, Subcommand};
use hubdb_sync::commands;
use hubdb_sync::config::{self, EnvCredentials};
use hubdb_sync::hubdb::{HubDbClient, TableId};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hubdb-sync")]
#[command(about = "Keep HubDB tables in sync with local JSON documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Set the log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log: String,
    /// Path to the accounts config file (defaults to ~/.hubdb-sync/config.toml)
    #[arg(long, env = "HUBDB_SYNC_CONFIG", global = true)]
    config: Option<PathBuf>,
    /// Account name or id from the config file
    #[arg(long, global = true)]
    account: Option<String>,
    /// Access token (falls back to HUBDB_ACCESS_TOKEN env)
    #[arg(
        long = "access-token",
        env = "HUBDB_ACCESS_TOKEN",
        global = true,
        hide_env_values = true
    )]
    access_token: Option<String>,
    /// Account id used together with --access-token (falls back to HUBDB_ACCOUNT_ID env)
    #[arg(long = "account-id", env = "HUBDB_ACCOUNT_ID", global = true)]
    account_id: Option<u64>,
    /// API base URL override (falls back to HUBDB_API_URL env)
    #[arg(long = "api-url", env = "HUBDB_API_URL", global = true)]
    api_url: Option<String>,
    /// Use credentials from the environment instead of the config file
    #[arg(long = "use-env", global = true)]
    use_env: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new table from a local JSON document
    Create {
        /// Local path to the table document
        src: PathBuf,
    },
    /// Upload a local JSON document over an existing table
    Upload {
        /// Table id
        table_id: String,
        /// Local path to the table document
        src: PathBuf,
        /// Leave the changes in draft instead of publishing
        #[arg(long)]
        no_publish: bool,
        /// Print the reconciliation report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Download a table and its rows to a local JSON document
    Fetch {
        /// Table id
        table_id: String,
        /// Destination path (defaults to <table name>.hubdb.json)
        dest: Option<PathBuf>,
    },
    /// Delete every row of a table
    Clear {
        /// Table id
        table_id: String,
        /// Publish the table after clearing it
        #[arg(long)]
        publish: bool,
    },
    /// Publish a table's draft changes
    Publish {
        /// Table id
        table_id: String,
    },
    /// Delete a table
    Delete {
        /// Table id
        table_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // 1. RUST_LOG environment variable has highest precedence
    // 2. --log flag is used if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.log.clone()));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    // Local documents are checked before credentials so bad input fails fast
    match &cli.command {
        Commands::Create { src } | Commands::Upload { src, .. } => {
            hubdb_sync::document::validate_json_file(src)?;
        }
        _ => {}
    }

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => config::default_config_path()?,
    };
    let config = config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    let env = EnvCredentials {
        account_id: cli.account_id,
        access_token: cli.access_token.clone(),
        api_base_url: cli.api_url.clone(),
    };
    let account = config::resolve_account(&config, cli.account.as_deref(), env, cli.use_env)?;
    tracing::debug!("Using account {} ({})", account.name, account.account_id);

    let client = HubDbClient::new(&account).context("Failed to create HubDB client")?;

    match cli.command {
        Commands::Create { src } => {
            let result = commands::create_table(&client, &src)
                .await
                .with_context(|| format!("Creating the table at \"{}\" failed", src.display()))?;
            println!(
                "The table {} was created in {} from {} with {} rows",
                result.table_id,
                account.account_id,
                src.display(),
                result.row_count
            );

            for error in &result.errors {
                tracing::error!("{}", error);
            }
            result.ensure_clean()?;
            Ok(())
        }
        Commands::Upload {
            table_id,
            src,
            no_publish,
            json,
        } => {
            let table_id = TableId::from(table_id);
            let report = commands::update_table(&client, &table_id, &src, !no_publish)
                .await
                .with_context(|| format!("Uploading the table {} failed", table_id))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "Uploaded HubDB table {} from {}, updating {} rows, creating {} rows, deleting {} rows",
                    table_id,
                    src.display(),
                    report.update_count,
                    report.create_count,
                    report.delete_count
                );
            }

            for error in &report.errors {
                tracing::error!("{}", error);
            }
            report.ensure_clean()?;
            Ok(())
        }
        Commands::Fetch { table_id, dest } => {
            let table_id = TableId::from(table_id);
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            let result = commands::download_table(&client, &table_id, dest.as_deref(), &cwd)
                .await
                .with_context(|| format!("Fetching the table {} failed", table_id))?;
            println!(
                "Downloaded HubDB table {} to {}",
                table_id,
                result.file_path.display()
            );
            Ok(())
        }
        Commands::Clear { table_id, publish } => {
            let table_id = TableId::from(table_id);
            let result = commands::clear_table_rows(&client, &table_id)
                .await
                .with_context(|| format!("Clearing the table {} failed", table_id))?;
            println!(
                "Removed {} of {} rows from HubDB table {}",
                result.deleted_row_count, result.planned_deletions, table_id
            );

            for error in &result.errors {
                tracing::error!("{}", error);
            }
            result.ensure_clean()?;

            if publish {
                commands::publish_table(&client, &table_id)
                    .await
                    .with_context(|| format!("Publishing the table {} failed", table_id))?;
                println!("Published HubDB table {}", table_id);
            }
            Ok(())
        }
        Commands::Publish { table_id } => {
            let table_id = TableId::from(table_id);
            let result = commands::publish_table(&client, &table_id)
                .await
                .with_context(|| format!("Publishing the table {} failed", table_id))?;
            match result.row_count {
                Some(rows) => println!("Published HubDB table {} ({} rows)", table_id, rows),
                None => println!("Published HubDB table {}", table_id),
            }
            Ok(())
        }
        Commands::Delete { table_id } => {
            let table_id = TableId::from(table_id);
            commands::delete_table(&client, &table_id)
                .await
                .with_context(|| format!("Deleting the table {} failed", table_id))?;
            println!("Deleted HubDB table {}", table_id);
            Ok(())
        }
    }
}
