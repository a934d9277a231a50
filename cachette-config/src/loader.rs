//! Options loading and environment variable handling

use crate::domains::utils::parse_bool;
use crate::domains::{BackendKind, CacheOptions};
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Options loader with environment variable support
pub struct OptionsLoader {
    /// Environment variable prefix
    prefix: String,
}

impl OptionsLoader {
    /// Create a new loader with the default prefix
    pub fn new() -> Self {
        Self {
            prefix: "CACHETTE".to_string(),
        }
    }

    /// Create a new loader with a custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load options from a YAML file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<CacheOptions> {
        let path = path.as_ref();
        log::debug!("Loading cache options from {}", path.display());

        let content = std::fs::read_to_string(path)?;
        self.from_yaml_str(&content)
    }

    /// Load options from a YAML document with environment overrides
    pub fn from_yaml_str(&self, content: &str) -> ConfigResult<CacheOptions> {
        let mut options: CacheOptions = serde_yaml::from_str(content)?;
        self.apply_env_overrides(&mut options)?;
        Ok(options)
    }

    /// Load options from environment variables only
    pub fn from_env(&self) -> ConfigResult<CacheOptions> {
        let mut options = CacheOptions::default();
        self.apply_env_overrides(&mut options)?;
        Ok(options)
    }

    /// Load options with fallback chain
    pub fn load(&self, path: Option<impl AsRef<Path>>) -> ConfigResult<CacheOptions> {
        match path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Apply environment variable overrides to the options
    fn apply_env_overrides(&self, options: &mut CacheOptions) -> ConfigResult<()> {
        if let Ok(backend) = self.get_env_var("BACKEND") {
            options.backend = BackendKind::from_str(&backend).map_err(ConfigError::EnvError)?;
        }

        if let Ok(ttl) = self.get_env_var("TTL") {
            let seconds: u64 = ttl
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid TTL: {}", e)))?;
            options.ttl = Duration::from_secs(seconds);
        }

        if let Some(runtime) = self.get_env_bool("RUNTIME")? {
            options.runtime = runtime;
        }

        self.apply_accelerator_overrides(options)?;
        self.apply_distributed_overrides(options)?;
        self.apply_document_overrides(options)?;

        Ok(())
    }

    fn apply_accelerator_overrides(&self, options: &mut CacheOptions) -> ConfigResult<()> {
        if let Ok(capacity) = self.get_env_var("ACCELERATOR_MAX_CAPACITY") {
            let capacity = capacity.parse().map_err(|e| {
                ConfigError::EnvError(format!("Invalid ACCELERATOR_MAX_CAPACITY: {}", e))
            })?;
            options.accelerator.max_capacity = Some(capacity);
        }

        Ok(())
    }

    fn apply_distributed_overrides(&self, options: &mut CacheOptions) -> ConfigResult<()> {
        let distributed = &mut options.distributed;

        // Comma separated host:port list
        if let Ok(servers) = self.get_env_var("DISTRIBUTED_SERVERS") {
            distributed.servers = servers
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.parse())
                .collect::<Result<_, _>>()
                .map_err(|e| ConfigError::InvalidValue {
                    key: "distributed.servers".to_string(),
                    message: e,
                })?;
        }

        if let Ok(pool) = self.get_env_var("DISTRIBUTED_POOL") {
            distributed.pool = Some(pool).filter(|p| !p.is_empty());
        }

        if let Some(compress) = self.get_env_bool("DISTRIBUTED_COMPRESS")? {
            distributed.compress = compress;
        }

        Ok(())
    }

    fn apply_document_overrides(&self, options: &mut CacheOptions) -> ConfigResult<()> {
        let document = &mut options.document;

        if let Ok(host) = self.get_env_var("DOCUMENT_HOST") {
            document.host = host;
        }

        if let Ok(port) = self.get_env_var("DOCUMENT_PORT") {
            let port = port
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid DOCUMENT_PORT: {}", e)))?;
            document.port = Some(port);
        }

        if let Ok(username) = self.get_env_var("DOCUMENT_USERNAME") {
            document.username = Some(username);
        }

        if let Ok(password) = self.get_env_var("DOCUMENT_PASSWORD") {
            document.password = Some(password);
        }

        if let Ok(database) = self.get_env_var("DOCUMENT_DATABASE") {
            document.database = Some(database);
        }

        if let Ok(collection) = self.get_env_var("DOCUMENT_COLLECTION") {
            document.collection = collection;
        }

        if let Some(safe) = self.get_env_bool("DOCUMENT_SAFE")? {
            document.safe = safe;
        }

        if let Some(pool) = self.get_env_bool("DOCUMENT_POOL")? {
            document.pool = pool;
        }

        Ok(())
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }

    fn get_env_bool(&self, name: &str) -> ConfigResult<Option<bool>> {
        match self.get_env_var(name) {
            Ok(value) => parse_bool(&value)
                .map(Some)
                .ok_or_else(|| ConfigError::EnvError(format!("Invalid {}: {}", name, value))),
            Err(_) => Ok(None),
        }
    }
}

impl Default for OptionsLoader {
    fn default() -> Self {
        Self::new()
    }
}
