use crate::utils::error::{RetrievalError, Result};
use std::path::Path;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(RetrievalError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(RetrievalError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(RetrievalError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(RetrievalError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(RetrievalError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// The output directory must already exist; it is never created on the caller's behalf.
pub fn validate_existing_dir(field_name: &str, path: &Path) -> Result<()> {
    validate_path(field_name, &path.to_string_lossy())?;
    if !path.is_dir() {
        return Err(RetrievalError::config(format!(
            "{} must be an existing directory, got {}",
            field_name,
            path.display()
        )));
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(RetrievalError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_prefix(field_name: &str, value: &str, prefix: &str) -> Result<()> {
    if !value.starts_with(prefix) {
        return Err(RetrievalError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must start with \"{}\"", prefix),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("service.root", "https://dash.ucop.edu").is_ok());
        assert!(validate_url("service.root", "http://127.0.0.1:8080").is_ok());
        assert!(validate_url("service.root", "").is_err());
        assert!(validate_url("service.root", "invalid-url").is_err());
        assert!(validate_url("service.root", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("transfer.chunk_size_bytes", 4096, 1).is_ok());
        assert!(validate_positive_number("transfer.chunk_size_bytes", 0, 1).is_err());
    }

    #[test]
    fn test_validate_existing_dir() {
        let temp_dir = TempDir::new().unwrap();
        assert!(validate_existing_dir("out_dir", temp_dir.path()).is_ok());

        let missing = temp_dir.path().join("missing");
        let err = validate_existing_dir("out_dir", &missing).unwrap_err();
        assert!(matches!(err, RetrievalError::ConfigError { .. }));
    }

    #[test]
    fn test_validate_prefix() {
        assert!(validate_prefix("datasets.x", "doi:10.6078/D12D5X", "doi:").is_ok());
        assert!(validate_prefix("datasets.x", "10.6078/D12D5X", "doi:").is_err());
    }
}
