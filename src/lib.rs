pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{OutputTarget, TomlConfig};

pub use crate::core::{
    catalog::DashClient,
    engine::{list_links, Action, DownloadOptions, Outcome, RetrievalEngine, RetrievalRequest},
    extract::extract_archive,
    months::{match_files, months_in_range},
    transfer::download,
};
pub use domain::model::{DatasetId, DatasetRegistry, FileCatalog, LinkFormat, MonthKey};
pub use utils::error::{Result, RetrievalError};
