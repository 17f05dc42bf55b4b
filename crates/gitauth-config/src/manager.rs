use crate::config::{Config, ConfigError, ConfigResult};
use regex::Regex;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Configuration manager
#[derive(Clone)]
pub struct ConfigManager {
    path: PathBuf,
    config: Arc<RwLock<Config>>,
}

impl ConfigManager {
    /// Load the configuration file, creating a default one when missing
    pub async fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            info!("Config file not found, creating default config at {:?}", path);
            let manager = Self::new(Config::default(), path.to_path_buf());
            manager.save().await?;
            return Ok(manager);
        }

        info!("Loading config from {:?}", path);
        let content = tokio::fs::read_to_string(path).await?;
        let content = Self::expand_env_vars(&content)?;
        let config: Config = serde_json::from_str(&content)?;
        Self::validate(&config)?;

        Ok(Self::new(config, path.to_path_buf()))
    }

    /// Load from the default location
    pub async fn load_default() -> ConfigResult<Self> {
        let config_path = Self::default_config_path()?;
        Self::load(&config_path).await
    }

    /// Default config path (~/.gitauth/config.json)
    pub fn default_config_path() -> ConfigResult<PathBuf> {
        crate::default_config_path()
            .ok_or_else(|| ConfigError::InvalidPath("Could not find home directory".to_string()))
    }

    /// Create a manager around an in-memory config
    pub fn new(config: Config, path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(config)),
        }
    }

    pub fn get(&self) -> Arc<RwLock<Config>> {
        Arc::clone(&self.config)
    }

    /// Write the in-memory configuration to disk.
    ///
    /// Values come out with `${VAR}` references already expanded; use [`Self::set_value`] to
    /// change a single key of a templated file.
    pub async fn save(&self) -> ConfigResult<()> {
        let config = self.config.read().await;
        Self::validate(&config)?;
        let content = serde_json::to_string_pretty(&*config)?;
        drop(config);

        self.write_file(&content).await?;
        debug!("Config saved to {:?}", self.path);
        Ok(())
    }

    /// Change one dotted key, in memory and on disk.
    ///
    /// Only that entry of the file is rewritten; everything else, `${VAR}` references included,
    /// stays as written.
    pub async fn set_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let mut config = self.config.write().await;
        let mut updated = config.clone();
        updated.set_value(key, value)?;
        Self::validate(&updated)?;

        let mut raw = if self.path.exists() {
            let content = tokio::fs::read_to_string(&self.path).await?;
            serde_json::from_str(&content)?
        } else {
            serde_json::to_value(&*config)?
        };
        set_dotted(&mut raw, &serde_json::to_value(&updated)?, key)?;

        self.write_file(&serde_json::to_string_pretty(&raw)?).await?;
        *config = updated;
        debug!("Config key {} saved to {:?}", key, self.path);
        Ok(())
    }

    async fn write_file(&self, content: &str) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, content).await?;

        // The file may hold a session token
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&self.path, perms).await?;
        }
        Ok(())
    }

    /// Apply a change and persist it
    pub async fn update<F>(&self, f: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut Config),
    {
        let mut config = self.config.write().await;
        f(&mut config);
        drop(config);
        self.save().await
    }

    pub fn validate(config: &Config) -> ConfigResult<()> {
        let url = config.server.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "Server url must start with http:// or https://, got '{}'",
                config.server.url
            )));
        }

        if config.server.session_header.trim().is_empty() {
            return Err(ConfigError::Validation(
                "Session header name cannot be empty".to_string(),
            ));
        }

        if config.http.timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "HTTP timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if config.flow.min_poll_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "Flow min_poll_interval_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Expand ${VAR} and ${VAR:-default}
    pub(crate) fn expand_env_vars(content: &str) -> ConfigResult<String> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| ConfigError::Validation(e.to_string()))?;
        let mut result = content.to_string();

        for cap in re.captures_iter(content) {
            let full_match = &cap[0];
            let var_expr = &cap[1];

            let (var_name, default_value) = match var_expr.split_once(":-") {
                Some((name, default)) => (name, Some(default)),
                None => (var_expr, None),
            };

            let replacement = match std::env::var(var_name) {
                Ok(val) => val,
                Err(_) => match default_value {
                    Some(default) => default.to_string(),
                    None => return Err(ConfigError::EnvVarNotFound(var_name.to_string())),
                },
            };

            result = result.replace(full_match, &replacement);
        }

        Ok(result)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Copy `key` from `source` into `target`. A missing section is copied whole.
fn set_dotted(target: &mut Value, source: &Value, key: &str) -> ConfigResult<()> {
    let mut node = target;
    let mut source = source;
    let mut parts = key.split('.').peekable();

    while let Some(part) = parts.next() {
        let object = node.as_object_mut().ok_or_else(|| {
            ConfigError::Validation(format!("Cannot set {}: parent of '{}' is not an object", key, part))
        })?;
        source = &source[part];
        if parts.peek().is_none() || !object.contains_key(part) {
            object.insert(part.to_string(), source.clone());
            return Ok(());
        }
        node = object.entry(part.to_string()).or_insert(Value::Null);
    }

    Ok(())
}
