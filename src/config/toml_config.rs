use crate::core::catalog::DEFAULT_DASH_ROOT;
use crate::core::transfer::DEFAULT_CHUNK_SIZE;
use crate::core::ConfigProvider;
use crate::domain::model::DOI_PREFIX;
use crate::utils::error::{RetrievalError, Result};
use crate::utils::validation::{validate_positive_number, validate_prefix, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Settings file for the downloader. Every section and key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub service: ServiceConfig,
    pub transfer: TransferConfig,
    pub datasets: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub root: String,
    pub timeout_seconds: u64,
    pub connect_timeout_seconds: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            root: DEFAULT_DASH_ROOT.to_string(),
            timeout_seconds: 600,
            connect_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    pub chunk_size_bytes: usize,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            chunk_size_bytes: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RetrievalError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content)
            .map_err(|e| RetrievalError::config(format!("TOML parsing error: {}", e)))
    }

    /// Replaces `${VAR}` with the environment value; unset variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| RetrievalError::config(format!("invalid substitution pattern: {}", e)))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_url("service.root", &self.service.root)?;
        validate_positive_number("service.timeout_seconds", self.service.timeout_seconds, 1)?;
        validate_positive_number(
            "service.connect_timeout_seconds",
            self.service.connect_timeout_seconds,
            1,
        )?;
        validate_positive_number(
            "transfer.chunk_size_bytes",
            self.transfer.chunk_size_bytes as u64,
            1,
        )?;
        for (name, doi) in &self.datasets {
            validate_prefix(&format!("datasets.{}", name), doi, DOI_PREFIX)?;
        }
        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn service_root(&self) -> &str {
        &self.service.root
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.service.timeout_seconds)
    }

    fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.service.connect_timeout_seconds)
    }

    fn chunk_size(&self) -> usize {
        self.transfer.chunk_size_bytes
    }

    fn dataset_aliases(&self) -> &HashMap<String, String> {
        &self.datasets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.service_root(), "https://dash.ucop.edu");
        assert_eq!(config.chunk_size(), 4096);
        assert_eq!(config.request_timeout(), Duration::from_secs(600));
        assert!(config.dataset_aliases().is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_file() {
        let config = TomlConfig::from_toml_str(
            r#"
[service]
root = "http://127.0.0.1:9000"
timeout_seconds = 60

[transfer]
chunk_size_bytes = 65536

[datasets]
staging = "doi:10.0000/STAGING"
"#,
        )
        .unwrap();

        assert_eq!(config.service_root(), "http://127.0.0.1:9000");
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        assert_eq!(config.connect_timeout(), Duration::from_secs(30));
        assert_eq!(config.chunk_size(), 65536);
        assert_eq!(
            config.dataset_aliases().get("staging").map(String::as_str),
            Some("doi:10.0000/STAGING")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("BEHR_TEST_DASH_ROOT", "http://mirror.example.org");
        let config = TomlConfig::from_toml_str(
            r#"
[service]
root = "${BEHR_TEST_DASH_ROOT}"
"#,
        )
        .unwrap();
        assert_eq!(config.service_root(), "http://mirror.example.org");
    }

    #[test]
    fn test_validation_failures() {
        let mut config = TomlConfig::default();
        config.transfer.chunk_size_bytes = 0;
        assert!(config.validate().is_err());

        let mut config = TomlConfig::default();
        config.service.root = "ftp://dash.ucop.edu".to_string();
        assert!(config.validate().is_err());

        let mut config = TomlConfig::default();
        config
            .datasets
            .insert("broken".to_string(), "10.6078/D12D5X".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let err = TomlConfig::from_toml_str("[service\nroot = 1").unwrap_err();
        assert!(matches!(err, RetrievalError::ConfigError { .. }));
    }
}
