use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lineboard::api::BackendConfig;
use lineboard::rank::SortOptions;
use lineboard::rotation::RotationSettings;
use lineboard::tui::DashboardConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub backend: BackendSection,
    pub rotation: RotationConfig,
    pub refresh: RefreshConfig,
    pub sort: SortConfig,
}

/// Backend overrides; environment variables fill anything left unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSection {
    pub url: Option<String>,
    pub anon_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    pub interval_ms: u64,
    /// Page-level cadence; falls back to `interval_ms` when unset.
    pub page_interval_ms: Option<u64>,
    pub items_per_page: usize,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            interval_ms: 10000,
            page_interval_ms: None,
            items_per_page: 6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Backstop refetch period in minutes; push updates normally beat it.
    pub auto_refresh_minutes: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self { auto_refresh_minutes: 5 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SortConfig {
    /// Boost overdue orders above same-tier peers.
    pub prioritize_old_orders: bool,
    /// Secondary sort by part name length.
    pub group_by_size: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            backend: BackendSection::default(),
            rotation: RotationConfig::default(),
            refresh: RefreshConfig::default(),
            sort: SortConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let project_name = env!("CARGO_PKG_NAME");
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Backend connection: file overrides win, environment fills the rest.
    pub fn backend_config(&self) -> lineboard::Result<BackendConfig> {
        match (&self.backend.url, &self.backend.anon_key) {
            (Some(url), Some(key)) => BackendConfig::new(url, key),
            _ => {
                let env = BackendConfig::from_env()?;
                let url = self.backend.url.clone().unwrap_or_else(|| env.url.to_string());
                let key = self.backend.anon_key.clone().unwrap_or_else(|| env.key.clone());
                BackendConfig::new(&url, &key)
            }
        }
    }

    pub fn sort_options(&self) -> SortOptions {
        SortOptions {
            prioritize_old_orders: self.sort.prioritize_old_orders,
            group_by_size: self.sort.group_by_size,
        }
    }

    pub fn dashboard_config(&self) -> DashboardConfig {
        DashboardConfig {
            rotation: RotationSettings {
                rotation_interval: Duration::from_millis(self.rotation.interval_ms),
                page_rotation_interval: self.rotation.page_interval_ms.map(Duration::from_millis),
                items_per_page: self.rotation.items_per_page,
            },
            sort: self.sort_options(),
            auto_refresh: Duration::from_secs(self.refresh.auto_refresh_minutes * 60),
        }
    }
}
