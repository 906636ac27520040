use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::sync::Arc;

use beacon::analytics::{AnalyticsService, NewEvent, SystemClock};
use beacon::config::Config;
use beacon::models::ContentEntity;
use beacon::storage;

#[derive(Parser)]
#[command(name = "beacon-admin")]
#[command(about = "Beacon content analytics CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Interaction {
    Impression,
    View,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the analytics report as JSON
    Report {
        /// Trailing window length in days
        #[arg(long)]
        days: Option<i64>,
        /// Number of entities in the summary ranking
        #[arg(long)]
        top_n: Option<i64>,
    },
    /// Record one event for a content entity
    Record {
        #[arg(value_enum)]
        kind: Interaction,
        entity_id: String,
        /// Optional actor identifier
        #[arg(long)]
        actor: Option<String>,
        /// Optional JSON context attached to the event
        #[arg(long)]
        context: Option<String>,
    },
    /// Create or update a content entity
    UpsertEntity {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        slug: Option<String>,
        /// Publish timestamp, e.g. 2024-05-01T09:00:00Z
        #[arg(long)]
        published_at: Option<String>,
    },
    /// Delete a content entity; its events stop counting
    DeleteEntity { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let store = storage::connect(&config.database).await?;
    let analytics = AnalyticsService::new(
        Arc::clone(&store),
        Arc::new(SystemClock),
        config.analytics.row_cap,
    );

    match cli.command {
        Commands::Report { days, top_n } => {
            let days = days.unwrap_or(config.analytics.default_days);
            let top_n = top_n.unwrap_or(config.analytics.default_top_n);
            let report = analytics.report(days, top_n).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Record {
            kind,
            entity_id,
            actor,
            context,
        } => {
            let context = context
                .map(|raw| serde_json::from_str(&raw))
                .transpose()
                .context("--context must be valid JSON")?;
            let event = NewEvent {
                entity_id: entity_id.clone(),
                actor_id: actor,
                context,
            };
            match kind {
                Interaction::Impression => analytics.record_impressions(&[event]).await?,
                Interaction::View => analytics.record_views(&[event]).await?,
            };
            println!("✓ Recorded event for '{}'", entity_id);
        }
        Commands::UpsertEntity {
            id,
            title,
            slug,
            published_at,
        } => {
            store
                .upsert_entity(&ContentEntity {
                    id: id.clone(),
                    title,
                    slug,
                    published_at,
                })
                .await?;
            println!("✓ Saved entity '{}'", id);
        }
        Commands::DeleteEntity { id } => {
            if store.delete_entity(&id).await? {
                println!("✓ Deleted entity '{}'", id);
            } else {
                println!("⚠ Entity '{}' not found", id);
            }
        }
    }

    Ok(())
}
