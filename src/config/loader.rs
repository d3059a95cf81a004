//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/clozeforge/config.toml)
//! 3. Project config (.clozeforge/config.toml)
//! 4. Environment variables (CLOZEFORGE_* prefix)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::debug;

use super::types::Config;
use crate::types::{ForgeError, Result};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        let project_path = Self::project_config_path();
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        // e.g. CLOZEFORGE_LLM_PROVIDER -> llm.provider
        figment = figment.merge(Env::prefixed("CLOZEFORGE_").split('_').lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| ForgeError::Config(format!("Configuration error: {e}")))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| ForgeError::Config(format!("Configuration error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Global config directory (~/.config/clozeforge/ on Linux)
    pub fn global_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "clozeforge").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Project config file path
    pub fn project_config_path() -> PathBuf {
        PathBuf::from(".clozeforge/config.toml")
    }

    /// Project data directory
    pub fn project_dir() -> PathBuf {
        PathBuf::from(".clozeforge")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Show current effective configuration
    pub fn show_config(as_json: bool) -> Result<()> {
        let config = Self::load()?;

        if as_json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            println!(
                "{}",
                toml::to_string_pretty(&config).map_err(|e| ForgeError::Config(e.to_string()))?
            );
        }

        Ok(())
    }

    /// Write a default project config, refusing to overwrite unless forced.
    pub fn init_project(force: bool) -> Result<PathBuf> {
        let path = Self::project_config_path();
        Self::write_default(&path, force)?;
        Ok(path)
    }

    /// Write a default global config, refusing to overwrite unless forced.
    pub fn init_global(force: bool) -> Result<PathBuf> {
        let path = Self::global_config_path()
            .ok_or_else(|| ForgeError::Config("no global config directory available".into()))?;
        Self::write_default(&path, force)?;
        Ok(path)
    }

    fn write_default(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            return Err(ForgeError::Config(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            )));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let rendered = toml::to_string_pretty(&Config::default())
            .map_err(|e| ForgeError::Config(e.to_string()))?;
        fs::write(path, rendered)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_from_file_merges_over_defaults() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        write!(
            file,
            "[generation]\nmin_words = 3\nrequested_count = 5\n\n[llm]\nprovider = \"openai\"\n"
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(file.path()).unwrap();
        assert_eq!(config.generation.min_words, 3);
        assert_eq!(config.generation.requested_count, 5);
        // Untouched fields keep their defaults.
        assert_eq!(config.generation.max_words, 7);
        assert_eq!(config.llm.provider, "openai");
    }

    #[test]
    fn test_load_from_file_rejects_invalid_values() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        write!(file, "[generation]\nmin_words = 10\nmax_words = 4\n").unwrap();

        assert!(ConfigLoader::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_project_paths() {
        assert_eq!(
            ConfigLoader::project_config_path(),
            PathBuf::from(".clozeforge/config.toml")
        );
        assert_eq!(ConfigLoader::project_dir(), PathBuf::from(".clozeforge"));
    }
}
