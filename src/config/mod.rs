pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
mod args;

#[cfg(feature = "cli")]
pub use args::{CliAction, CliConfig};
pub use cli::OutputTarget;
pub use toml_config::TomlConfig;
