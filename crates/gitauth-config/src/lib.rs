pub mod config;
pub mod manager;

pub use config::{
    Config, ConfigError, ConfigResult, FlowConfig, HttpConfig, LogLevel, LoggingConfig,
    ServerConfig, DEFAULT_SESSION_HEADER,
};
pub use manager::ConfigManager;

use std::path::PathBuf;

/// ~/.gitauth
pub fn gitauth_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".gitauth"))
}

/// ~/.gitauth/config.json
pub fn default_config_path() -> Option<PathBuf> {
    gitauth_dir().map(|dir| dir.join("config.json"))
}

/// Expand a leading `~/` to the user's home directory
pub fn expand_tilde(path: &str) -> Option<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
        None => Some(PathBuf::from(path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gitauth_dir() {
        let dir = gitauth_dir();
        assert!(dir.is_some());
        assert!(dir.unwrap().to_string_lossy().contains(".gitauth"));
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = expand_tilde("~/.gitauth/config.json").unwrap();
        assert!(!expanded.to_string_lossy().starts_with('~'));

        let untouched = expand_tilde("/etc/gitauth.json").unwrap();
        assert_eq!(untouched, PathBuf::from("/etc/gitauth.json"));
    }
}
