use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Dataset resolution failed: {message}")]
    ResolutionError { message: String },

    #[error("Transfer of {url} failed: {message}")]
    TransferError { url: String, message: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Attempted path traversal in {}: member {member:?} escapes {}", .archive.display(), .target.display())]
    PathTraversalError {
        archive: PathBuf,
        target: PathBuf,
        member: String,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value {value:?} for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("The link format \"{format}\" is not recognized")]
    FormatError { format: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Resolution,
    Transfer,
    Extraction,
    Configuration,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit code used by the CLI for an error of this severity.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl RetrievalError {
    pub fn resolution(message: impl Into<String>) -> Self {
        RetrievalError::ResolutionError {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        RetrievalError::ConfigError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            RetrievalError::ResolutionError { .. } => ErrorCategory::Resolution,
            RetrievalError::TransferError { .. } | RetrievalError::HttpError(_) => {
                ErrorCategory::Transfer
            }
            RetrievalError::PathTraversalError { .. } => ErrorCategory::Extraction,
            RetrievalError::ConfigError { .. }
            | RetrievalError::InvalidConfigValueError { .. }
            | RetrievalError::FormatError { .. } => ErrorCategory::Configuration,
            RetrievalError::IoError(_) => ErrorCategory::Io,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Transfer => ErrorSeverity::Medium,
            ErrorCategory::Resolution | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Extraction | ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            RetrievalError::ResolutionError { message } => {
                format!("Could not build the file catalog: {}", message)
            }
            RetrievalError::TransferError { url, message } => {
                format!("Download of {} failed ({})", url, message)
            }
            RetrievalError::HttpError(e) => format!("Network request failed: {}", e),
            RetrievalError::PathTraversalError { archive, member, .. } => format!(
                "Refused to extract {}: member {:?} would be written outside the archive directory",
                archive.display(),
                member
            ),
            RetrievalError::ConfigError { message } => message.clone(),
            RetrievalError::InvalidConfigValueError {
                field,
                value,
                reason,
            } => format!("Invalid {} {:?}: {}", field, value, reason),
            RetrievalError::FormatError { format } => {
                format!("Unknown link format \"{}\"", format)
            }
            RetrievalError::IoError(e) => format!("File system error: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Resolution => {
                "Check the dataset identifier and that the repository API is reachable"
            }
            ErrorCategory::Transfer => "Check your network connection and try again",
            ErrorCategory::Extraction => {
                "Do not trust this archive; report it to the dataset maintainers"
            }
            ErrorCategory::Configuration => "Review the command line options and config file",
            ErrorCategory::Io => "Check that the output directory is writable and has free space",
        }
    }
}

pub type Result<T> = std::result::Result<T, RetrievalError>;
