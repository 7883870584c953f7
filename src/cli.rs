// src/cli.rs
use crate::analysis::{profile::PROFILE_ANALYZER, AnalysisInput, AnalyzerSet};
use crate::config::ConfigManager;
use crate::database::DatabaseConfig;
use crate::marketplace::{import_jobs, MarketplaceService};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "freelance-match")]
#[command(about = "Freelance job board with keyword based skill analysis")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Overrides DATABASE_PATH
    #[arg(long, global = true)]
    pub database_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP API
    Serve {
        /// Overrides ROCKET_PORT
        #[arg(long)]
        port: Option<u16>,
    },
    /// Analyze a piece of text and print the result as JSON
    Analyze {
        #[arg(long)]
        text: Option<String>,
        /// Comma separated skill list
        #[arg(long, value_delimiter = ',')]
        skills: Vec<String>,
        #[arg(long)]
        experience: Option<String>,
        #[arg(long, default_value = PROFILE_ANALYZER)]
        profile: String,
    },
    /// Import jobs from a spreadsheet CSV export
    ImportJobs { csv_file: PathBuf },
    /// Initialize the database
    Init,
}

async fn open_database(config: &ConfigManager) -> Result<DatabaseConfig> {
    config.ensure_directories().await?;
    let mut db_config = DatabaseConfig::new(config.database_path.clone());
    db_config.init_pool().await?;
    db_config.migrate().await?;
    Ok(db_config)
}

pub async fn run(cli: Cli, config: ConfigManager) -> Result<()> {
    let config = config.with_database_path(cli.database_path);

    match cli.command {
        Command::Serve { port } => {
            let port = port.unwrap_or(config.port);
            let profiles = config.load_profiles()?;
            let db_config = open_database(&config).await?;
            crate::web::start_web_server(
                AnalyzerSet::new(&profiles),
                config.session.clone(),
                db_config,
                port,
            )
            .await
        }

        Command::Analyze {
            text,
            skills,
            experience,
            profile,
        } => {
            let analyzers = AnalyzerSet::new(&config.load_profiles()?);
            if analyzers.get(&profile).is_none() {
                warn!("Unknown analyzer profile '{}', using the default", profile);
            }

            let skills: Vec<String> = skills
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            let input = AnalysisInput {
                text,
                bio: None,
                experience,
                skills: (!skills.is_empty()).then_some(skills),
            };

            let result = analyzers.get_or_default(&profile).analyze(&input)?;
            let json =
                serde_json::to_string_pretty(&result).context("Failed to encode analysis")?;
            println!("{}", json);
            Ok(())
        }

        Command::ImportJobs { csv_file } => {
            if !csv_file.exists() {
                anyhow::bail!("CSV file not found: {}", csv_file.display());
            }

            let db_config = open_database(&config).await?;
            let service = MarketplaceService::new(db_config.pool()?);
            let summary = import_jobs(&service, &csv_file).await?;

            info!("Import completed:");
            info!("  Imported: {}", summary.imported);
            info!("  Replaced: {}", summary.replaced);
            info!("  Skipped:  {}", summary.skipped.len());
            for reason in &summary.skipped {
                warn!("  {}", reason);
            }
            Ok(())
        }

        Command::Init => {
            open_database(&config).await?;
            info!(
                "Database initialized at: {}",
                config.database_path.display()
            );
            info!("Tables created: users, jobs, applications");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_analyze_arguments() {
        let cli = Cli::parse_from([
            "freelance-match",
            "analyze",
            "--text",
            "Senior Rust engineer",
            "--skills",
            "Rust,Docker",
            "--profile",
            "skills",
        ]);
        match cli.command {
            Command::Analyze {
                text,
                skills,
                profile,
                ..
            } => {
                assert_eq!(text.as_deref(), Some("Senior Rust engineer"));
                assert_eq!(skills, vec!["Rust", "Docker"]);
                assert_eq!(profile, "skills");
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_global_database_path() {
        let cli = Cli::parse_from(["freelance-match", "init", "--database-path", "/tmp/x.db"]);
        assert_eq!(cli.database_path, Some(PathBuf::from("/tmp/x.db")));
        assert!(matches!(cli.command, Command::Init));
    }
}
