//! Configuration for trailer-sync.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (TRAILER_SYNC_ENABLED, TRAILER_SYNC_PROVIDER,
//!    TRAILER_SYNC_MANIFEST)
//! 2. Config file (.trailer-sync/config.yaml, then the user config dir)
//! 3. Defaults (disabled, provider MetaTube, daily at 01:00)
//!
//! Config file discovery:
//! - Searches current directory and parents for .trailer-sync/config.yaml
//! - Falls back to <user config dir>/trailer-sync/config.yaml
//! - The manifest path is relative to the project root (parent of .trailer-sync/)

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use chrono::NaiveTime;
use serde::Deserialize;

use crate::core::DEFAULT_TRIGGER_HOUR;
use crate::domain::TaskTrigger;
use crate::trailers::{TrailerConfig, DEFAULT_PROVIDER};

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

const CONFIG_DIR: &str = ".trailer-sync";
const CONFIG_FILE: &str = "config.yaml";

const ENV_ENABLED: &str = "TRAILER_SYNC_ENABLED";
const ENV_PROVIDER: &str = "TRAILER_SYNC_PROVIDER";
const ENV_MANIFEST: &str = "TRAILER_SYNC_MANIFEST";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub trailers: TrailersSection,
    #[serde(default)]
    pub schedule: Option<ScheduleSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrailersSection {
    /// Master switch
    pub enabled: Option<bool>,
    /// Provider whose identifiers mark candidate items
    pub provider: Option<String>,
    /// Library manifest (relative to the project root)
    pub manifest: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleSection {
    /// Local time of day, "HH:MM"
    pub time_of_day: Option<String>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Settings handed to the reconciler
    pub trailers: TrailerConfig,
    /// Library manifest (if configured)
    pub manifest: Option<PathBuf>,
    /// When the daemon runs the task
    pub trigger: TaskTrigger,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            trailers: TrailerConfig::default(),
            manifest: None,
            trigger: default_trigger(),
            config_file: None,
        }
    }
}

fn default_trigger() -> TaskTrigger {
    TaskTrigger::Daily {
        time_of_day: NaiveTime::from_hms_opt(DEFAULT_TRIGGER_HOUR, 0, 0).unwrap_or_default(),
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    if let Ok(mut current) = std::env::current_dir() {
        loop {
            let config_path = current.join(CONFIG_DIR).join(CONFIG_FILE);
            if config_path.exists() {
                return Some(config_path);
            }

            if !current.pop() {
                break;
            }
        }
    }

    dirs::config_dir()
        .map(|dir| dir.join("trailer-sync").join(CONFIG_FILE))
        .filter(|path| path.exists())
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Parse a boolean environment value
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse an "HH:MM" time of day
fn parse_time_of_day(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .with_context(|| format!("Invalid time of day (expected HH:MM): {}", value))
}

/// Merge a config file and environment lookups into a resolved config
fn resolve_config<E>(file: Option<(&Path, ConfigFile)>, env: E) -> Result<ResolvedConfig>
where
    E: Fn(&str) -> Option<String>,
{
    let mut resolved = ResolvedConfig::default();

    if let Some((config_path, config)) = file {
        // Base directory is the parent of .trailer-sync/ (i.e., grandparent of config.yaml)
        let base_dir = config_path
            .parent()
            .and_then(|p| p.parent())
            .unwrap_or(Path::new("."));

        if let Some(enabled) = config.trailers.enabled {
            resolved.trailers.enable_trailers = enabled;
        }
        if let Some(provider) = config.trailers.provider {
            resolved.trailers.provider_name = provider;
        }
        if let Some(ref manifest) = config.trailers.manifest {
            resolved.manifest = Some(resolve_path(base_dir, manifest));
        }
        if let Some(time) = config.schedule.and_then(|s| s.time_of_day) {
            resolved.trigger = TaskTrigger::Daily {
                time_of_day: parse_time_of_day(&time)?,
            };
        }

        resolved.config_file = Some(config_path.to_path_buf());
    }

    if let Some(value) = env(ENV_ENABLED) {
        resolved.trailers.enable_trailers = parse_bool(&value)
            .with_context(|| format!("Invalid {} value: {}", ENV_ENABLED, value))?;
    }
    if let Some(provider) = env(ENV_PROVIDER).filter(|p| !p.trim().is_empty()) {
        resolved.trailers.provider_name = provider;
    }
    if let Some(manifest) = env(ENV_MANIFEST) {
        resolved.manifest = Some(PathBuf::from(manifest));
    }

    if resolved.trailers.provider_name.trim().is_empty() {
        resolved.trailers.provider_name = DEFAULT_PROVIDER.to_string();
    }

    Ok(resolved)
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let config_path = find_config_file();
    let file = match config_path {
        Some(ref path) => Some((path.as_path(), load_config_file(path)?)),
        None => None,
    };

    resolve_config(file, |key| std::env::var(key).ok())
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (the daemon re-reads before every run)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}
