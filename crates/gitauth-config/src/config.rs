use serde::{Deserialize, Serialize};

/// Default header carrying the platform session token.
pub const DEFAULT_SESSION_HEADER: &str = "Session-Token";

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub version: String,
    pub server: ServerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub flow: FlowConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            server: ServerConfig::default(),
            http: HttpConfig::default(),
            flow: FlowConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Look up a value by dotted key. The session token is never returned in clear.
    pub fn get_value(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();
        match parts.as_slice() {
            ["version"] => Some(self.version.clone()),
            ["server", "url"] => Some(self.server.url.clone()),
            ["server", "session_token"] => self
                .server
                .session_token
                .as_ref()
                .map(|_| "********".to_string()),
            ["server", "session_header"] => Some(self.server.session_header.clone()),
            ["http", "timeout_seconds"] => Some(self.http.timeout_seconds.to_string()),
            ["http", "user_agent"] => Some(self.http.user_agent.clone()),
            ["flow", "min_poll_interval_secs"] => Some(self.flow.min_poll_interval_secs.to_string()),
            ["flow", "open_browser"] => Some(self.flow.open_browser.to_string()),
            ["logging", "level"] => Some(self.logging.level.as_str().to_string()),
            _ => None,
        }
    }

    /// Set a value by dotted key
    pub fn set_value(&mut self, key: &str, value: &str) -> ConfigResult<()> {
        let parts: Vec<&str> = key.split('.').collect();
        match parts.as_slice() {
            ["server", "url"] => {
                self.server.url = value.to_string();
            }
            ["server", "session_token"] => {
                self.server.session_token = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            ["server", "session_header"] => {
                self.server.session_header = value.to_string();
            }
            ["http", "timeout_seconds"] => {
                self.http.timeout_seconds = value.parse().map_err(|_| {
                    ConfigError::Validation(format!("Invalid number: {}", value))
                })?;
            }
            ["http", "user_agent"] => {
                self.http.user_agent = value.to_string();
            }
            ["flow", "min_poll_interval_secs"] => {
                self.flow.min_poll_interval_secs = value.parse().map_err(|_| {
                    ConfigError::Validation(format!("Invalid number: {}", value))
                })?;
            }
            ["flow", "open_browser"] => {
                self.flow.open_browser = value.parse().map_err(|_| {
                    ConfigError::Validation(format!("Invalid boolean: {}", value))
                })?;
            }
            ["logging", "level"] => {
                self.logging.level = value.parse()?;
            }
            _ => return Err(ConfigError::KeyNotFound(key.to_string())),
        }
        Ok(())
    }
}

/// Platform API endpoint and session settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Base URL of the platform API (e.g., "https://dev.example.com")
    pub url: String,
    /// Session token sent with every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
    /// Header name the session token is sent under
    #[serde(default = "default_session_header")]
    pub session_header: String,
}

fn default_session_header() -> String {
    DEFAULT_SESSION_HEADER.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:3000".to_string(),
            session_token: None,
            session_header: default_session_header(),
        }
    }
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: concat!("gitauth/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Device flow polling settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlowConfig {
    /// Lower bound applied on top of the interval announced by the provider
    pub min_poll_interval_secs: u64,
    pub open_browser: bool,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            min_poll_interval_secs: 5,
            open_browser: true,
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::Validation(format!("Invalid log level: {}", s))),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LoggingConfig {
    pub level: LogLevel,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.session_header, DEFAULT_SESSION_HEADER);
        assert_eq!(config.flow.min_poll_interval_secs, 5);
        assert!(config.server.session_token.is_none());
    }

    #[test]
    fn test_session_token_is_masked() {
        let mut config = Config::default();
        assert_eq!(config.get_value("server.session_token"), None);

        config.set_value("server.session_token", "s3cr3t").unwrap();
        assert_eq!(config.server.session_token.as_deref(), Some("s3cr3t"));
        assert_eq!(
            config.get_value("server.session_token").as_deref(),
            Some("********")
        );
    }

    #[test]
    fn test_set_value_rejects_bad_input() {
        let mut config = Config::default();
        assert!(matches!(
            config.set_value("http.timeout_seconds", "soon"),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            config.set_value("server.port", "80"),
            Err(ConfigError::KeyNotFound(_))
        ));

        config.set_value("logging.level", "WARNING").unwrap();
        assert_eq!(config.logging.level, LogLevel::Warn);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let json = r#"{"version":"0.1.0","server":{"url":"https://dev.example.com"}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.server.url, "https://dev.example.com");
        assert_eq!(config.server.session_header, DEFAULT_SESSION_HEADER);
        assert_eq!(config.http, HttpConfig::default());
    }
}
