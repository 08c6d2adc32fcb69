//! Configuration management for borg-recent.
//!
//! Loaded from an optional TOML file; command-line flags override it.

use crate::borg::artifacts::{GlobSet, DEFAULT_GLOBS};
use crate::utils::errors::{RecentError, Result};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub borg: BorgConfig,
    pub artifacts: ArtifactsConfig,
    pub log: LogConfig,
    pub performance: PerformanceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to
    #[serde(default = "default_bind")]
    pub bind: IpAddr,

    /// HTTP port
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorgConfig {
    /// Executable name searched in the working directory, then PATH
    #[serde(default = "default_borg_name")]
    pub name: String,

    /// Explicit binary path, skips the search
    #[serde(default)]
    pub binary: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    /// Look up the newest database dump in every reported archive
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Fail the request when an archive can't be listed or parsed
    #[serde(default)]
    pub strict: bool,

    /// Archive paths that count as a database dump
    #[serde(default = "default_globs")]
    pub globs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    /// Repositories listed at the same time (1 = sequential)
    #[serde(default = "default_max_concurrent_listings")]
    pub max_concurrent_listings: usize,
}

// Default values
fn default_bind() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    2674
}

fn default_borg_name() -> String {
    "borg".to_string()
}

fn default_true() -> bool {
    true
}

fn default_globs() -> Vec<String> {
    DEFAULT_GLOBS.iter().map(|g| g.to_string()).collect()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_concurrent_listings() -> usize {
    1
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl Default for BorgConfig {
    fn default() -> Self {
        Self {
            name: default_borg_name(),
            binary: None,
        }
    }
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            strict: false,
            globs: default_globs(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            max_concurrent_listings: default_max_concurrent_listings(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RecentError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
            .map_err(|e| RecentError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| RecentError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.performance.max_concurrent_listings == 0 {
            return Err(RecentError::Config(
                "performance.max_concurrent_listings must be at least 1".to_string(),
            ));
        }
        self.glob_set()?;
        Ok(())
    }

    pub fn glob_set(&self) -> Result<GlobSet> {
        GlobSet::new(&self.artifacts.globs)
    }
}
