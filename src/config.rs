use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const DEFAULT_ENV_PREFIX: &str = "FEEDSIFT";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub filter: FilterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

fn default_storage_path() -> Option<PathBuf> {
    crate::storage::default_path()
}

/// Selectors locating posts and their text regions, plus the re-scan
/// debounce window. Selectors are configuration data: when the host
/// page's markup changes, these change with it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilterConfig {
    #[serde(default = "default_post_selector")]
    pub post_selector: String,
    /// Extraction order is fixed: region texts are concatenated in this
    /// order with single-space separators.
    #[serde(default = "default_region_selectors")]
    pub region_selectors: Vec<String>,
    #[serde(default = "default_feed_root_selector")]
    pub feed_root_selector: String,
    #[serde(default = "default_debounce_window", with = "humantime_serde")]
    pub debounce_window: Duration,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            post_selector: default_post_selector(),
            region_selectors: default_region_selectors(),
            feed_root_selector: default_feed_root_selector(),
            debounce_window: default_debounce_window(),
        }
    }
}

fn default_post_selector() -> String {
    "div.new-status.status-wrapper".into()
}

fn default_region_selectors() -> Vec<String> {
    [
        "span.reshared_by",
        "div.text",
        "div.content p",
        "div.content a",
        "blockquote p",
        "blockquote a",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_feed_root_selector() -> String {
    "div.stream-items".into()
}

fn default_debounce_window() -> Duration {
    Duration::from_millis(200)
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub config_file: Option<PathBuf>,
    pub env_prefix: Option<String>,
}

pub fn load(options: LoadOptions) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(path) = options.config_file.as_ref() {
        if path.exists() {
            let from_file = read_config_file(path)?;
            cfg = merge_config(cfg, from_file);
        }
    } else if let Some(default_path) = default_config_path() {
        if default_path.exists() {
            let from_file = read_config_file(&default_path)?;
            cfg = merge_config(cfg, from_file);
        }
    }

    let prefix = options.env_prefix.as_deref().unwrap_or(DEFAULT_ENV_PREFIX);
    cfg = merge_config(cfg, load_env(prefix));

    Ok(cfg)
}

fn read_config_file(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&data)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))?;
    Ok(config)
}

fn merge_config(mut base: Config, other: Config) -> Config {
    if other.storage.path.is_some() {
        base.storage.path = other.storage.path;
    }

    if !other.filter.post_selector.is_empty() {
        base.filter.post_selector = other.filter.post_selector;
    }
    if !other.filter.region_selectors.is_empty() {
        base.filter.region_selectors = other.filter.region_selectors;
    }
    if !other.filter.feed_root_selector.is_empty() {
        base.filter.feed_root_selector = other.filter.feed_root_selector;
    }
    if !other.filter.debounce_window.is_zero() {
        base.filter.debounce_window = other.filter.debounce_window;
    }

    base
}

/// An all-unset config for layering: merge treats empty strings, empty
/// lists, `None` paths, and a zero window as "not provided".
fn unset_config() -> Config {
    Config {
        storage: StorageConfig { path: None },
        filter: FilterConfig {
            post_selector: String::new(),
            region_selectors: Vec::new(),
            feed_root_selector: String::new(),
            debounce_window: Duration::ZERO,
        },
    }
}

fn load_env(prefix: &str) -> Config {
    let mut map: HashMap<String, String> = HashMap::new();
    let upper_prefix = format!("{}_", prefix.to_uppercase());

    for (key, value) in env::vars() {
        if let Some(stripped) = key.strip_prefix(&upper_prefix) {
            let normalized = stripped.to_ascii_lowercase().replace("__", ".");
            map.insert(normalized, value);
        }
    }

    let mut cfg = unset_config();

    for (key, value) in map {
        apply_env_value(&mut cfg, &key, value);
    }

    cfg
}

fn apply_env_value(cfg: &mut Config, key: &str, value: String) {
    match key {
        "storage.path" => cfg.storage.path = Some(PathBuf::from(value)),
        "filter.post_selector" => cfg.filter.post_selector = value,
        "filter.region_selectors" => {
            cfg.filter.region_selectors = value
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        "filter.feed_root_selector" => cfg.filter.feed_root_selector = value,
        "filter.debounce_window" => {
            if let Ok(duration) = humantime::parse_duration(&value) {
                cfg.filter.debounce_window = duration;
            }
        }
        _ => {}
    }
}

pub fn default_path() -> Option<PathBuf> {
    default_config_path()
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("feedsift").join("config.yaml"))
}
