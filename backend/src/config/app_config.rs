use serde::{Deserialize, Serialize};
use std::env;

pub const CONFIG_PATH_VAR: &str = "SCREENTASK_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("ANTHROPIC_API_KEY is not set")]
    MissingApiKey,
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: String,
    pub model: ModelConfig,
    pub upload: UploadLimits,
}

/// Fixed parameters of the vision model call. These are server-wide and never
/// taken from a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    #[serde(skip)]
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadLimits {
    pub max_file_size: usize,
    pub max_files: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            static_dir: "public".to_string(),
            model: ModelConfig::default(),
            upload: UploadLimits::default(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: "https://api.anthropic.com/".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 1000,
        }
    }
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024,
            max_files: 100,
        }
    }
}

impl AppConfig {
    /// Reads the optional YAML file named by `SCREENTASK_CONFIG`, then applies
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_PATH_VAR) {
            Some(path) => {
                let contents = std::fs::read_to_string(&path)
                    .map_err(|source| ConfigError::Io { path: path.clone(), source })?;
                Self::from_yaml(&contents)?
            }
            None => Self::default(),
        };

        if let Some(port) = lookup("PORT") {
            config.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidValue { name: "PORT", value: port })?;
        }
        if let Some(dir) = lookup("STATIC_DIR") {
            config.static_dir = dir;
        }
        if let Some(key) = lookup("ANTHROPIC_API_KEY") {
            config.model.api_key = key;
        }
        if let Some(url) = lookup("ANTHROPIC_API_URL") {
            config.model.api_url = url;
        }
        if let Some(model) = lookup("ANTHROPIC_MODEL") {
            config.model.model = model;
        }
        if let Some(max_tokens) = lookup("ANTHROPIC_MAX_TOKENS") {
            config.model.max_tokens = max_tokens.parse().map_err(|_| ConfigError::InvalidValue {
                name: "ANTHROPIC_MAX_TOKENS",
                value: max_tokens,
            })?;
        }

        if config.model.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(config)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_yaml::from_str(contents)?;
        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn defaults_match_fixed_model_parameters() {
        let config = AppConfig::from_lookup(lookup_from(&[("ANTHROPIC_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.model.model, "claude-sonnet-4-20250514");
        assert_eq!(config.model.max_tokens, 1000);
        assert_eq!(config.upload.max_files, 100);
        assert_eq!(config.upload.max_file_size, 10 * 1024 * 1024);
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("PORT", "8081"),
            ("STATIC_DIR", "web"),
            ("ANTHROPIC_MAX_TOKENS", "512"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8081);
        assert_eq!(config.static_dir, "web");
        assert_eq!(config.model.max_tokens, 512);
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "PORT", .. }));
    }

    #[test]
    fn yaml_fills_only_given_fields() {
        let config = AppConfig::from_yaml("port: 9000\nupload:\n  max_files: 5\n").unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.upload.max_files, 5);
        assert_eq!(config.upload.max_file_size, 10 * 1024 * 1024);
        assert_eq!(config.model.max_tokens, 1000);
    }
}
