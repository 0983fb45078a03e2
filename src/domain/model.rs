use crate::utils::error::{RetrievalError, Result};
use chrono::{Datelike, NaiveDate};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Scheme prefix every raw dataset identifier starts with.
pub const DOI_PREFIX: &str = "doi:";

/// Symbolic BEHR dataset names and the DOIs they stand for.
pub const KNOWN_DATASETS: &[(&str, &str)] = &[
    ("daily-gridded", "doi:10.6078/D12D5X"),
    ("monthly-gridded", "doi:10.6078/D1RQ3G"),
    ("daily-native", "doi:10.6078/D1WH41"),
    ("monthly-native", "doi:10.6078/D1N086"),
];

/// A resolved dataset identifier, always of the form `doi:...`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetId(String);

impl DatasetId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lookup table from symbolic dataset names to identifiers.
///
/// Built once from [`KNOWN_DATASETS`] plus any aliases supplied by the
/// configuration file, then only read.
#[derive(Debug, Clone)]
pub struct DatasetRegistry {
    aliases: BTreeMap<String, String>,
}

impl DatasetRegistry {
    pub fn new(extra: &HashMap<String, String>) -> Self {
        let mut aliases: BTreeMap<String, String> = KNOWN_DATASETS
            .iter()
            .map(|(name, doi)| (name.to_string(), doi.to_string()))
            .collect();
        aliases.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self { aliases }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.aliases.keys().map(String::as_str)
    }

    /// Accepts either a raw `doi:` identifier or one of the registered names.
    pub fn resolve(&self, dataset: &str) -> Result<DatasetId> {
        if dataset.starts_with(DOI_PREFIX) {
            return Ok(DatasetId(dataset.to_string()));
        }

        self.aliases
            .get(dataset)
            .map(|doi| DatasetId(doi.clone()))
            .ok_or_else(|| {
                RetrievalError::config(format!(
                    "dataset must be a DOI string beginning with \"{}\" or one of the following strings: {}",
                    DOI_PREFIX,
                    self.names().collect::<Vec<_>>().join(", ")
                ))
            })
    }
}

impl Default for DatasetRegistry {
    fn default() -> Self {
        Self::new(&HashMap::new())
    }
}

/// One revision of a dataset as listed by the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionDescriptor {
    pub version_number: i64,
    pub files_link: String,
}

/// Archive file name to download URL, for one dataset version, kept in the
/// order the repository listed the files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCatalog {
    files: IndexMap<String, String>,
}

impl FileCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later inserts of the same name replace the earlier URL but keep the
    /// name where it was first listed.
    pub fn insert(&mut self, file_name: impl Into<String>, url: impl Into<String>) {
        self.files.insert(file_name.into(), url.into());
    }

    pub fn get(&self, file_name: &str) -> Option<&str> {
        self.files.get(file_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FileCatalog {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut catalog = FileCatalog::new();
        for (name, url) in iter {
            catalog.insert(name, url);
        }
        catalog
    }
}

/// First day of a reporting month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey(NaiveDate);

impl MonthKey {
    pub fn containing(date: NaiveDate) -> Self {
        // Day 1 exists in every month
        Self(date - chrono::Days::new(u64::from(date.day0())))
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// `YYYYMM`, the form month stamps take inside archive names.
    pub fn stamp(&self) -> String {
        self.0.format("%Y%m").to_string()
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub file_name: String,
    pub url: String,
    pub destination: PathBuf,
}

/// How `list` renders each matched archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkFormat {
    Raw,
    Unix,
    Powershell,
}

impl LinkFormat {
    pub fn render(&self, file_name: &str, url: &str) -> String {
        match self {
            LinkFormat::Raw => url.to_string(),
            LinkFormat::Unix => format!("wget -O {} {}", file_name, url),
            LinkFormat::Powershell => format!("Invoke-WebRequest {} -OutFile {}", url, file_name),
        }
    }
}

impl FromStr for LinkFormat {
    type Err = RetrievalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "raw" => Ok(LinkFormat::Raw),
            "unix" => Ok(LinkFormat::Unix),
            "powershell" => Ok(LinkFormat::Powershell),
            _ => Err(RetrievalError::FormatError {
                format: s.to_string(),
            }),
        }
    }
}
