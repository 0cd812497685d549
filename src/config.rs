use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::models::Ecosystem;

/// Root configuration structure, deserialized from `.vibe-validator/config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scan: ScanConfig,
    pub network: NetworkConfig,
    pub registries: RegistryUrls,
}

/// Controls which files the walker hands to the parsers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Also parse lockfiles (transitive dependencies).
    pub include_lockfiles: bool,
    /// Descend into vendored directories such as `node_modules` or `vendor`.
    pub include_vendor: bool,
    /// Directory names pruned in every ecosystem, on top of the built-in sets.
    pub extra_excluded_dirs: Vec<String>,
    /// Not read from the file; set from `-v`.
    #[serde(skip)]
    pub verbosity: u8,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Maximum number of registry lookups in flight.
    pub concurrency: usize,
    /// Per-request timeout in seconds. Must be non-zero.
    pub timeout_secs: u64,
    /// Packages first published less than this many days ago are flagged.
    pub age_threshold_days: u32,
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            concurrency: 8,
            timeout_secs: 10,
            age_threshold_days: 30,
            user_agent: concat!("vibe-validator/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl NetworkConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Always in range: `u32::MAX` days is far below chrono's limit.
    pub fn age_threshold(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.age_threshold_days))
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            bail!("network.timeout_secs must be at least 1");
        }
        if self.concurrency == 0 {
            bail!("network.concurrency must be at least 1");
        }
        Ok(())
    }
}

/// Base URLs of the public registries, without trailing slash.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistryUrls {
    pub pypi: String,
    pub npm: String,
    pub go: String,
    pub packagist: String,
    pub rubygems: String,
    pub crates_io: String,
}

impl Default for RegistryUrls {
    fn default() -> Self {
        RegistryUrls {
            pypi: "https://pypi.org".to_string(),
            npm: "https://registry.npmjs.org".to_string(),
            go: "https://proxy.golang.org".to_string(),
            packagist: "https://repo.packagist.org".to_string(),
            rubygems: "https://rubygems.org".to_string(),
            crates_io: "https://crates.io".to_string(),
        }
    }
}

impl RegistryUrls {
    /// Point every registry at the same host. Used by tests.
    #[cfg(test)]
    pub fn all(base: &str) -> Self {
        RegistryUrls {
            pypi: base.to_string(),
            npm: base.to_string(),
            go: base.to_string(),
            packagist: base.to_string(),
            rubygems: base.to_string(),
            crates_io: base.to_string(),
        }
    }

    pub fn base_for(&self, ecosystem: Ecosystem) -> &str {
        let url = match ecosystem {
            Ecosystem::Python => &self.pypi,
            Ecosystem::Npm => &self.npm,
            Ecosystem::Go => &self.go,
            Ecosystem::Php => &self.packagist,
            Ecosystem::Ruby => &self.rubygems,
            Ecosystem::Rust => &self.crates_io,
        };
        url.trim_end_matches('/')
    }
}

/// Load the configuration, searching in order:
///
/// 1. `config_override`: path passed via `--config`
/// 2. `<project_path>/.vibe-validator/config.toml`
/// 3. `~/.config/vibe-validator/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = project_path.join(".vibe-validator").join("config.toml");
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("vibe-validator")
            .join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    tracing::debug!("no config file found, using defaults");
    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: Config =
        toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))?;
    config
        .network
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    tracing::info!("loaded config from {}", path.display());
    Ok(config)
}
