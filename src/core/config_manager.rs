// src/core/config_manager.rs
//! Environment-driven configuration with optional config.yaml overrides

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigManager {
    pub environment: String,
    pub database_path: PathBuf,
    pub log_path: PathBuf,
}

/// One environment section of config.yaml; every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
struct EnvironmentSection {
    database_path: Option<PathBuf>,
    log_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: EnvironmentSection,
    #[serde(default)]
    production: EnvironmentSection,
}

impl ConfigManager {
    pub fn load() -> Result<Self> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "local".to_string());

        let base_dir = if environment == "production" {
            PathBuf::from("/app")
        } else {
            std::env::current_dir().context("Failed to get current directory")?
        };

        let mut config = Self::defaults(&environment, &base_dir);

        let config_path = base_dir.join(CONFIG_FILE);
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            config.apply_file(&content, &base_dir)?;
        }

        if let Ok(path) = std::env::var("WORKMATES_DATABASE") {
            config.database_path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("WORKMATES_LOG") {
            config.log_path = PathBuf::from(path);
        }

        Ok(config)
    }

    fn defaults(environment: &str, base_dir: &Path) -> Self {
        Self {
            environment: environment.to_string(),
            database_path: base_dir.join("workmates.db"),
            log_path: base_dir.join("workmates.log"),
        }
    }

    /// Apply the section of config.yaml matching this environment
    fn apply_file(&mut self, content: &str, base_dir: &Path) -> Result<()> {
        let file: ConfigFile =
            serde_yaml::from_str(content).with_context(|| format!("Failed to parse {}", CONFIG_FILE))?;

        let section = match self.environment.as_str() {
            "production" => file.production,
            _ => file.local,
        };

        if let Some(path) = section.database_path {
            self.database_path = resolve_path(&path, base_dir);
        }
        if let Some(path) = section.log_path {
            self.log_path = resolve_path(&path, base_dir);
        }
        Ok(())
    }

    /// Ensure directories holding the database and log exist
    pub async fn ensure_directories(&self) -> Result<()> {
        crate::utils::ensure_parent_dir(&self.database_path).await?;
        crate::utils::ensure_parent_dir(&self.log_path).await?;
        Ok(())
    }
}

fn resolve_path(path: &Path, base_dir: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
