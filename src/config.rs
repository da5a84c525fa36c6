//! Configuration Module
//!
//! Loads proxy configuration from an optional TOML file, with environment
//! variables taking precedence.

use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigError;

/// Config file used when neither `CONFIG_FILE` nor `CONFIGFILE` is set
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Names read for the config file path, in order of preference.
const CONFIG_FILE_VARS: &[&str] = &["CONFIG_FILE", "CONFIGFILE"];

/// Proxy configuration parameters.
///
/// Cache limits stay signed so that negative values reach the cache
/// constructor, which rejects them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address of the backing Redis server (`host:port`)
    pub redis_address: String,
    /// HTTP listen port
    pub proxy_port: u16,
    /// Entry lifetime in milliseconds
    pub cache_expiry: i64,
    /// Maximum number of cached entries
    pub cache_capacity: i64,
}

/// Shape of the TOML file; every field is optional.
///
/// Keys may be written in snake_case or in the PascalCase form
/// (`CacheCapacity`) older deployments use. Any other key is an error.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    #[serde(alias = "RedisAddress")]
    redis_address: Option<String>,
    #[serde(alias = "ProxyPort")]
    proxy_port: Option<u16>,
    #[serde(alias = "CacheExpiry")]
    cache_expiry: Option<i64>,
    #[serde(alias = "CacheCapacity")]
    cache_capacity: Option<i64>,
}

impl Config {
    /// Loads configuration from the file named by `CONFIG_FILE` and the
    /// process environment.
    ///
    /// # Environment Variables
    /// Each variable also has an underscore-free spelling (`CACHECAPACITY`),
    /// read when the underscored one is unset.
    /// - `CONFIG_FILE` - TOML file to read (default: config.toml, skipped if absent)
    /// - `REDIS_ADDRESS` - Backing store address (default: 127.0.0.1:6379)
    /// - `PROXY_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_EXPIRY` - Entry lifetime in milliseconds (default: 1000)
    /// - `CACHE_CAPACITY` - Maximum cached entries (default: 1000)
    pub fn load() -> Result<Self, ConfigError> {
        let process_env = |name: &str| env::var(name).ok();
        let path = config_path(&process_env);
        Self::load_from(Path::new(&path), process_env)
    }

    /// Loads configuration from `path` (if it exists) and then applies
    /// overrides looked up through `env`.
    pub fn load_from<F>(path: &Path, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if path.exists() {
            let display = path.display().to_string();
            let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: display.clone(),
                source,
            })?;
            let file: FileConfig = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: display,
                source,
            })?;
            config.apply_file(file);
        }

        if let Some((_, address)) = lookup(&env, &["REDIS_ADDRESS", "REDISADDRESS"]) {
            config.redis_address = address;
        }
        if let Some(port) = parse_var(&env, &["PROXY_PORT", "PROXYPORT"])? {
            config.proxy_port = port;
        }
        if let Some(expiry) = parse_var(&env, &["CACHE_EXPIRY", "CACHEEXPIRY"])? {
            config.cache_expiry = expiry;
        }
        if let Some(capacity) = parse_var(&env, &["CACHE_CAPACITY", "CACHECAPACITY"])? {
            config.cache_capacity = capacity;
        }

        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(address) = file.redis_address {
            self.redis_address = address;
        }
        if let Some(port) = file.proxy_port {
            self.proxy_port = port;
        }
        if let Some(expiry) = file.cache_expiry {
            self.cache_expiry = expiry;
        }
        if let Some(capacity) = file.cache_capacity {
            self.cache_capacity = capacity;
        }
    }
}

/// Resolves the config file path from the environment.
fn config_path<F>(env: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(env, CONFIG_FILE_VARS)
        .map(|(_, path)| path)
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string())
}

/// Returns the first of `names` set to a non-empty value.
fn lookup<F>(env: &F, names: &[&'static str]) -> Option<(&'static str, String)>
where
    F: Fn(&str) -> Option<String>,
{
    names
        .iter()
        .find_map(|&name| env(name).filter(|v| !v.is_empty()).map(|v| (name, v)))
}

/// Parses an environment override, treating empty values as unset.
fn parse_var<T, F>(env: &F, names: &[&'static str]) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(env, names) {
        None => Ok(None),
        Some((name, value)) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { name, value }),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_address: "127.0.0.1:6379".to_string(),
            proxy_port: 3000,
            cache_expiry: 1000,
            cache_capacity: 1000,
        }
    }
}
