// src/profile_cli.rs
use crate::core::config_manager::ConfigManager;
use crate::core::database::{Database, ProfileFilter, ProfileService};
use crate::linkedin_analysis::{extract_profile_id, normalize_profile_url, resolve_lookup_key};
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Args)]
#[command(about = "Inspect stored profiles")]
pub struct ProfileCli {
    #[command(subcommand)]
    pub command: ProfileCommand,

    /// Overrides the configured database path
    #[arg(long)]
    pub database_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum ProfileCommand {
    /// List analyzed profiles, newest first
    List {
        /// Substring match on name, headline or profile URL
        #[arg(long)]
        search: Option<String>,
        /// Exact primary DISC type, e.g. "Influence (I)"
        #[arg(long)]
        disc: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
    /// Show the stored analysis and raw data for an identifier or URL
    Show { key: String },
    /// Print the identifier a LinkedIn URL resolves to
    IdFor { url: String },
    /// Create the database and tables
    Init,
}

pub async fn handle_profile_command(cli: ProfileCli, config: &ConfigManager) -> Result<()> {
    let database_path = cli
        .database_path
        .unwrap_or_else(|| config.environment.database_path.clone());

    match cli.command {
        ProfileCommand::IdFor { url } => match extract_profile_id(&url) {
            Some(id) => {
                println!("{}", id);
                info!("Normalized URL: {}", normalize_profile_url(&url));
            }
            None => error!("❌ No /in/<identifier> segment in: {}", url),
        },

        ProfileCommand::List {
            search,
            disc,
            limit,
        } => {
            let database = Database::connect(&database_path).await?;
            let service = ProfileService::new(database.pool());
            let profiles = service
                .list_profiles(&ProfileFilter {
                    search,
                    disc_primary: disc,
                    limit: limit.max(1),
                    offset: 0,
                })
                .await?;

            if profiles.is_empty() {
                info!("No analyzed profiles found.");
            } else {
                println!(
                    "{:<30} {:<25} {:<16} {:<5} {:<17}",
                    "Profile ID", "Name", "DISC", "Rev", "Updated"
                );
                println!("{}", "-".repeat(96));
                for profile in profiles {
                    println!(
                        "{:<30} {:<25} {:<16} {:<5} {:<17}",
                        profile.profile_id,
                        profile.name,
                        profile.disc_primary.as_deref().unwrap_or("-"),
                        profile.revision,
                        profile.updated_at.format("%Y-%m-%d %H:%M")
                    );
                }
            }
        }

        ProfileCommand::Show { key } => {
            let Some(profile_id) = resolve_lookup_key(&key) else {
                error!("❌ Could not resolve a profile identifier from: {}", key);
                return Ok(());
            };

            let database = Database::connect(&database_path).await?;
            let service = ProfileService::new(database.pool());

            match service.analyzed_profile(&profile_id).await? {
                Some(profile) => println!(
                    "{}",
                    serde_json::to_string_pretty(&profile)
                        .context("Failed to render analyzed profile")?
                ),
                None => info!("❌ No analyzed profile stored for: {}", profile_id),
            }

            match service.raw_data(&profile_id).await? {
                Some(raw) => info!(
                    "Raw data: revision {}, {} posts, updated {}",
                    raw.revision,
                    raw.posts.0.len(),
                    raw.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
                ),
                None => info!("No raw data stored for: {}", profile_id),
            }
        }

        ProfileCommand::Init => {
            let database = Database::connect(&database_path).await?;
            database.health_check().await?;
            info!("✅ Database initialized at: {}", database_path.display());
            info!("   Tables: raw_data, analyzed_profiles (unique on profile_id)");
        }
    }

    Ok(())
}
