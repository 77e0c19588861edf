//! Configuration storage
//!
//! Stores which portal to talk to and as whom. The password is never
//! written to disk.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::auth::{Credentials, PortalSettings};
use crate::portal::Environment;

/// Application configuration
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Portal environment to log in to
    #[serde(default)]
    pub environment: Environment,
    /// Portal username
    pub username: Option<String>,
    /// Base address used when `environment = "custom"`
    pub custom_url: Option<String>,
}

impl Config {
    /// Get config directory path
    fn config_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "osr-login", "osr-login")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }

    /// Get config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from disk
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).context("Failed to write config file")?;

        // Username and portal address are not secret, but keep them private
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(path, perms).context("Failed to set config permissions")?;
        }

        Ok(())
    }

    /// Build portal settings, pairing the stored username with `password`.
    pub fn settings(&self, password: &str) -> Result<PortalSettings> {
        let username = self
            .username
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .context("No username configured. Pass --username or run 'osr-login config set'.")?;

        Ok(PortalSettings {
            environment: self.environment,
            credentials: Credentials::new(username, password),
            custom_url: self.custom_url.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("osr-login-test-{}", uuid::Uuid::new_v4()))
            .join(name)
    }

    #[test]
    fn test_missing_file_is_default() {
        let config = Config::load_from(&temp_path("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.environment, Environment::Production);
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("config.toml");
        let config = Config {
            environment: Environment::Custom,
            username: Some("ada".into()),
            custom_url: Some("https://portal.acme.test".into()),
        };
        config.save_to(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("environment = \"custom\""));
        assert!(!content.contains("password"));
        assert_eq!(Config::load_from(&path).unwrap(), config);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_settings_requires_username() {
        let mut config = Config::default();
        assert!(config.settings("pw").is_err());

        config.username = Some("ada".into());
        let settings = config.settings("pw").unwrap();
        assert_eq!(settings.credentials.username(), "ada");
        assert_eq!(settings.environment, Environment::Production);
    }
}
