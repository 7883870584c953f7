// src/config.rs
//! Process configuration, read once from the environment at startup.

use crate::analysis::ProfileRegistry;
use crate::auth::SessionConfig;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{info, warn};

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_SESSION_TTL_HOURS: i64 = 24;
const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;
const DEV_SESSION_SECRET: &str = "freelance-match-local-secret";

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment: String,
    pub database_path: PathBuf,
    pub port: u16,
    pub session: SessionConfig,
    pub analyzer_config: Option<PathBuf>,
}

impl ConfigManager {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `load` uses the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = var("ENVIRONMENT").unwrap_or_else(|| "local".to_string());
        info!("Loading configuration for environment: {}", environment);
        let production = environment == "production";

        let base_dir = if production {
            PathBuf::from("/app")
        } else {
            std::env::current_dir().context("Failed to get current directory")?
        };

        let database_path = var("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| base_dir.join("data").join("freelance_match.db"));

        let port = match var("ROCKET_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("ROCKET_PORT must be a valid port number"))?,
            None => DEFAULT_PORT,
        };

        let secret = match var("SESSION_SECRET") {
            Some(secret) => secret,
            None if production => anyhow::bail!("SESSION_SECRET must be set in production"),
            None => {
                warn!("SESSION_SECRET not set, using the local development secret");
                DEV_SESSION_SECRET.to_string()
            }
        };

        let ttl_hours = match var("SESSION_TTL_HOURS") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|h| (1..=MAX_SESSION_TTL_HOURS).contains(h))
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "SESSION_TTL_HOURS must be a number of hours between 1 and {}",
                        MAX_SESSION_TTL_HOURS
                    )
                })?,
            None => DEFAULT_SESSION_TTL_HOURS,
        };

        Ok(Self {
            environment,
            database_path,
            port,
            session: SessionConfig::new(secret, ttl_hours),
            analyzer_config: var("ANALYZER_CONFIG").map(PathBuf::from),
        })
    }

    pub fn with_database_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.database_path = path;
        }
        self
    }

    /// Built-in analyzer profiles, patched by the YAML file when one is configured.
    pub fn load_profiles(&self) -> Result<ProfileRegistry> {
        match &self.analyzer_config {
            Some(path) => ProfileRegistry::from_yaml_file(path),
            None => Ok(ProfileRegistry::builtin()),
        }
    }

    pub async fn ensure_directories(&self) -> Result<()> {
        if let Some(parent) = self.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create directory: {}", parent.display())
                })?;
            }
        }
        Ok(())
    }
}
