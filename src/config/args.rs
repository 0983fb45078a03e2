use crate::core::engine::{Action, DownloadOptions, RetrievalRequest};
use crate::core::months::parse_month;
use crate::domain::model::LinkFormat;
use crate::utils::error::Result;
use crate::utils::validation::{validate_existing_dir, validate_path, Validate};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliAction {
    /// Print download links for the matching archives
    List,
    /// Download the matching archives
    Download,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "behr-downloader")]
#[command(about = "Batch download BEHR files from the University of California Dash repository")]
#[command(after_help = "Example: behr-downloader list daily-gridded 2005-01 2005-02")]
pub struct CliConfig {
    /// What to do with the matching archives
    #[arg(value_enum)]
    pub action: CliAction,

    /// Dataset name (daily-gridded, monthly-gridded, daily-native, monthly-native) or a "doi:" identifier
    pub dataset: String,

    /// First month to retrieve, yyyy-mm
    #[arg(value_parser = parse_month)]
    pub start: NaiveDate,

    /// Last month to retrieve, yyyy-mm
    #[arg(value_parser = parse_month)]
    pub end: NaiveDate,

    /// Increase logging to the console (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// TOML settings file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Emit log lines as JSON
    #[arg(long)]
    pub log_json: bool,

    /// Log process CPU and memory usage after each archive
    #[arg(long)]
    pub monitor: bool,

    /// File to save the links to; "-" prints them to stdout
    #[arg(short = 'f', long, default_value = "-", help_heading = "List")]
    pub out_file: String,

    /// raw (one URL per line), unix (wget commands) or powershell (Invoke-WebRequest commands)
    #[arg(long, default_value = "raw", help_heading = "List")]
    pub link_format: String,

    /// Directory to save downloads to
    #[arg(short = 'o', long, default_value = ".", help_heading = "Download")]
    pub out_dir: PathBuf,

    /// Extract the tar files after downloading
    #[arg(short = 'e', long, help_heading = "Download")]
    pub extract_tar: bool,

    /// Delete each tar file after extracting it; no effect without --extract-tar
    #[arg(short = 'd', long, help_heading = "Download")]
    pub delete_tar: bool,
}

impl CliConfig {
    pub fn request(&self) -> RetrievalRequest {
        let action = match self.action {
            CliAction::List => Action::List {
                link_format: self.link_format.clone(),
            },
            CliAction::Download => Action::Download(DownloadOptions {
                out_dir: self.out_dir.clone(),
                extract: self.extract_tar,
                delete_archive: self.delete_tar,
            }),
        };

        RetrievalRequest {
            dataset: self.dataset.clone(),
            start: self.start,
            end: self.end,
            action,
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if self.start > self.end {
            tracing::warn!(
                "Start month {} is after end month {}, nothing will match",
                self.start.format("%Y-%m"),
                self.end.format("%Y-%m")
            );
        }

        match self.action {
            CliAction::List => {
                validate_path("out_file", &self.out_file)?;
                self.link_format.parse::<LinkFormat>()?;
            }
            CliAction::Download => {
                validate_existing_dir("out_dir", &self.out_dir)?;
                if self.delete_tar && !self.extract_tar {
                    tracing::warn!("--delete-tar has no effect without --extract-tar");
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_arguments() {
        let config = CliConfig::try_parse_from([
            "behr-downloader",
            "list",
            "daily-gridded",
            "2005-01",
            "2005-03",
            "--link-format",
            "unix",
            "-vv",
        ])
        .unwrap();

        assert_eq!(config.action, CliAction::List);
        assert_eq!(config.verbose, 2);
        assert_eq!(config.out_file, "-");
        assert!(config.validate().is_ok());

        let request = config.request();
        assert_eq!(request.start, NaiveDate::from_ymd_opt(2005, 1, 1).unwrap());
        assert_eq!(request.end, NaiveDate::from_ymd_opt(2005, 3, 1).unwrap());
        assert!(matches!(request.action, Action::List { ref link_format } if link_format == "unix"));
    }

    #[test]
    fn test_parse_download_arguments() {
        let config = CliConfig::try_parse_from([
            "behr-downloader",
            "download",
            "doi:10.6078/D1N086",
            "2006-07",
            "2006-08",
            "-o",
            "/tmp",
            "-e",
            "-d",
        ])
        .unwrap();

        match config.request().action {
            Action::Download(options) => {
                assert_eq!(options.out_dir, PathBuf::from("/tmp"));
                assert!(options.extract);
                assert!(options.delete_archive);
            }
            other => panic!("unexpected action: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_malformed_month() {
        assert!(CliConfig::try_parse_from([
            "behr-downloader",
            "list",
            "daily-gridded",
            "2005/01",
            "2005-03",
        ])
        .is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_link_format() {
        let config = CliConfig::try_parse_from([
            "behr-downloader",
            "list",
            "daily-gridded",
            "2005-01",
            "2005-03",
            "--link-format",
            "csv",
        ])
        .unwrap();
        assert!(config.validate().is_err());
    }
}
