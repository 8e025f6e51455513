//! wdrb-ingest - wardrobe upload and catalog tool
//!
//! Uploads clothing photos through the two-phase upload flow and lists what
//! the backend has indexed. This binary is the composition root: it resolves
//! configuration, decides who is signed in and wires the HTTP clients.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wdrb_common::config::{ConfigOverrides, LoggingConfig, TomlConfig};
use wdrb_common::events::EventBus;
use wdrb_common::models::CatalogView;
use wdrb_common::{Category, CategoryFilter};
use wdrb_ingest::{
    IdentityProvider, IndexWait, LocalFile, Outcome, StaticIdentity, WardrobeClient,
    WardrobeSummary,
};

#[derive(Parser, Debug)]
#[command(name = "wdrb-ingest")]
#[command(about = "Upload clothing photos to your wardrobe and browse the catalog")]
#[command(version)]
struct Args {
    /// Config file (default: ~/.config/wardrobe/config.toml)
    #[arg(short, long, env = "WDRB_CONFIG")]
    config: Option<PathBuf>,

    /// Signed-in user id
    #[arg(short, long, env = "WDRB_USER_ID")]
    user: Option<String>,

    /// Upload-URL service endpoint
    #[arg(long, env = "WDRB_AUTHORIZATION_URL")]
    authorization_url: Option<String>,

    /// Catalog query endpoint
    #[arg(long, env = "WDRB_CATALOG_URL")]
    catalog_url: Option<String>,

    /// Bearer token for the backend services
    #[arg(long, env = "WDRB_AUTH_TOKEN", hide_env_values = true)]
    auth_token: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload one or more photos into a category
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Spectacles, Upper Wear, Lower Wear, Accessory, Socks, Shoes or Uncategorized
        #[arg(short = 'k', long, default_value = "Uncategorized")]
        category: Category,

        /// Wait for the backend to index the uploads, then list the category
        #[arg(long)]
        wait: bool,
    },

    /// List wardrobe items, optionally for one category
    List {
        #[arg(short = 'k', long)]
        category: Option<Category>,
    },

    /// Item counts per category
    Summary,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::load(args.config.as_deref())
        .context("Failed to load configuration")?
        .with_overrides(ConfigOverrides {
            authorization_url: args.authorization_url.clone(),
            catalog_url: args.catalog_url.clone(),
            auth_token: args.auth_token.clone(),
            user_id: args.user.clone(),
            log_level: args.log_level.clone(),
        });

    init_tracing(&config.logging)?;

    info!(
        "Starting wdrb-ingest v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let endpoints = config.endpoints().context("Backend endpoints are not configured")?;
    let policy = config.refresh.policy().context("Invalid refresh settings")?;

    let identity = StaticIdentity::new(config.user_id.as_deref());
    let user = identity
        .current_user()
        .ok_or_else(|| anyhow!("Not signed in: set --user, WDRB_USER_ID or user_id in the config file"))?;
    let user_id = user.as_str();

    let event_bus = EventBus::new(100);
    let client = WardrobeClient::connect(&endpoints, policy, event_bus)
        .context("Failed to create HTTP client")?;

    match args.command {
        Command::Upload {
            files,
            category,
            wait,
        } => upload(&client, user_id, files, category, wait).await,
        Command::List { category } => {
            let view = client
                .refresher
                .refresh(user_id, CategoryFilter::from(category))
                .await?;
            print_view(&view);
            Ok(())
        }
        Command::Summary => {
            let view = client.refresher.refresh(user_id, CategoryFilter::All).await?;
            println!("{}", WardrobeSummary::from_view(&view));
            Ok(())
        }
    }
}

async fn upload(
    client: &WardrobeClient,
    user_id: &str,
    paths: Vec<PathBuf>,
    category: Category,
    wait: bool,
) -> Result<()> {
    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        let file = LocalFile::load(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        files.push(file);
    }

    // The catalog is only read for --wait; an outage there must not block uploads
    let filter = CategoryFilter::Only(category);
    let baseline = if wait {
        match client.refresher.refresh(user_id, filter).await {
            Ok(view) => Some(view),
            Err(e) => {
                warn!("Cannot read the catalog before uploading, not waiting for indexing: {}", e);
                None
            }
        }
    } else {
        None
    };

    let results = client.coordinator.ingest_all(files, category, user_id).await;

    let mut accepted = 0;
    for result in &results {
        match &result.outcome {
            Outcome::Accepted { key } => {
                accepted += 1;
                println!("✓ {} -> {} ({})", result.file_name, result.category, key);
            }
            Outcome::Failed(failure) => {
                println!("✗ {}: {}", result.file_name, failure);
            }
        }
    }

    if let Some(baseline) = baseline {
        if accepted > 0 {
            match client
                .refresher
                .await_new_items(user_id, filter, &baseline, accepted)
                .await
            {
                Ok(IndexWait::Visible(view)) => print_view(&view),
                Ok(IndexWait::Pending(view)) => {
                    println!("Uploads stored; the wardrobe has not listed them yet.");
                    print_view(&view);
                }
                Err(e) => {
                    warn!("Uploads stored but the catalog could not be re-read: {}", e);
                    println!("Uploads stored; the wardrobe could not be refreshed.");
                }
            }
        }
    }

    let failed = results.len() - accepted;
    if failed > 0 {
        return Err(anyhow!("{} of {} uploads failed", failed, results.len()));
    }
    Ok(())
}

fn print_view(view: &CatalogView) {
    println!("{} ({} items)", view.filter(), view.len());
    for item in view.items() {
        println!(
            "  {:<14} {}  {}",
            item.category.label(),
            item.id,
            item.file_name.as_deref().unwrap_or(&item.image_url)
        );
    }
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    Ok(())
}
