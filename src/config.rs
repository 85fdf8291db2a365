use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::map::MapOptions;

pub const DEFAULT_TABLE: &str = "properties";
pub const DEFAULT_ROW_LIMIT: usize = 200;
pub const DEFAULT_SEARCHBOX_URL: &str = "https://api.mapbox.com/search/searchbox/v1";
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub supabase: SupabaseConfig,
    pub mapbox: MapboxConfig,
    pub map: MapOptions,
}

/// Hosted database settings. Missing url or key is not fatal; queries fail
/// at call time instead.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SupabaseConfig {
    pub url: Option<String>,
    pub anon_key: Option<String>,
    pub table: String,
    pub row_limit: usize,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            table: DEFAULT_TABLE.to_string(),
            row_limit: DEFAULT_ROW_LIMIT,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MapboxConfig {
    pub access_token: Option<String>,
    pub searchbox_url: String,
    pub suggestion_limit: usize,
}

impl Default for MapboxConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            searchbox_url: DEFAULT_SEARCHBOX_URL.to_string(),
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Names of the secrets that are not set
    pub fn missing_secrets(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.supabase.url.as_deref().map_or(true, str::is_empty) {
            missing.push("SUPABASE_URL");
        }
        if self.supabase.anon_key.as_deref().map_or(true, str::is_empty) {
            missing.push("SUPABASE_ANON_KEY");
        }
        if self.mapbox.access_token.as_deref().map_or(true, str::is_empty) {
            missing.push("MAPBOX_ACCESS_TOKEN");
        }
        missing
    }
}
