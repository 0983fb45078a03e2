use crate::core::catalog::DashClient;
use crate::core::extract::extract_archive;
use crate::core::months::match_files;
use crate::core::transfer::download;
use crate::core::ConfigProvider;
use crate::domain::model::{DatasetId, DatasetRegistry, DownloadTask, FileCatalog, LinkFormat};
use crate::utils::error::{RetrievalError, Result};
use crate::utils::monitor::SystemMonitor;
use crate::utils::validation::validate_existing_dir;
use chrono::NaiveDate;
use reqwest::Client;
use std::path::{Component, Path, PathBuf};
use tracing::info;

/// Options for the `download` action.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub out_dir: PathBuf,
    pub extract: bool,
    /// Only honoured together with `extract`.
    pub delete_archive: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
            extract: false,
            delete_archive: false,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    List { link_format: String },
    Download(DownloadOptions),
}

/// One end-user invocation: which dataset, which months, what to do.
#[derive(Debug, Clone)]
pub struct RetrievalRequest {
    pub dataset: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Links(Vec<String>),
    Downloaded(Vec<PathBuf>),
}

/// Renders one line per matched archive. The format name is checked before
/// anything is rendered.
pub fn list_links(
    catalog: &FileCatalog,
    start: NaiveDate,
    end: NaiveDate,
    link_format: &str,
) -> Result<Vec<String>> {
    let format: LinkFormat = link_format.parse()?;
    Ok(match_files(catalog, start, end)
        .map(|(file_name, url)| format.render(file_name, url))
        .collect())
}

/// Catalog names become file names under the output directory, so they
/// must be a single plain path component.
fn plan_download(out_dir: &Path, file_name: &str, url: &str) -> Result<DownloadTask> {
    let mut components = Path::new(file_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(DownloadTask {
            file_name: file_name.to_string(),
            url: url.to_string(),
            destination: out_dir.join(file_name),
        }),
        _ => Err(RetrievalError::PathTraversalError {
            archive: PathBuf::from(url),
            target: out_dir.to_path_buf(),
            member: file_name.to_string(),
        }),
    }
}

pub struct RetrievalEngine {
    client: Client,
    dash: DashClient,
    registry: DatasetRegistry,
    chunk_size: usize,
    monitor: SystemMonitor,
}

impl RetrievalEngine {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;
        let dash = DashClient::new(client.clone(), config.service_root())?;

        Ok(Self {
            client,
            dash,
            registry: DatasetRegistry::new(config.dataset_aliases()),
            chunk_size: config.chunk_size(),
            monitor: SystemMonitor::new(false),
        })
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor = SystemMonitor::new(enabled);
        self
    }

    pub async fn catalog(&self, dataset: &DatasetId) -> Result<FileCatalog> {
        let catalog = self.dash.resolve(dataset).await?;
        self.monitor.log_stats("Catalog resolved");
        Ok(catalog)
    }

    /// Downloads every matched archive into `options.out_dir`, one at a time in
    /// month order, extracting each right after its download when asked to.
    /// The first failure stops the run.
    pub async fn download_and_extract(
        &self,
        catalog: &FileCatalog,
        start: NaiveDate,
        end: NaiveDate,
        options: &DownloadOptions,
    ) -> Result<Vec<PathBuf>> {
        validate_existing_dir("out_dir", &options.out_dir)?;

        let mut downloaded = Vec::new();
        for (file_name, url) in match_files(catalog, start, end) {
            let task = plan_download(&options.out_dir, file_name, url)?;
            download(&self.client, &task.url, &task.destination, self.chunk_size).await?;

            if options.extract {
                let archive = task.destination.clone();
                let delete_archive = options.delete_archive;
                tokio::task::spawn_blocking(move || extract_archive(&archive, delete_archive))
                    .await
                    .map_err(|e| RetrievalError::IoError(std::io::Error::other(e)))??;
            }

            self.monitor.log_stats(&task.file_name);
            downloaded.push(task.destination);
        }

        info!("Retrieved {} archives", downloaded.len());
        Ok(downloaded)
    }

    pub async fn run(&self, request: &RetrievalRequest) -> Result<Outcome> {
        let dataset = self.registry.resolve(&request.dataset)?;
        // Reject a bad format before any network traffic
        if let Action::List { link_format } = &request.action {
            link_format.parse::<LinkFormat>()?;
        }

        let catalog = self.catalog(&dataset).await?;

        let outcome = match &request.action {
            Action::List { link_format } => Outcome::Links(list_links(
                &catalog,
                request.start,
                request.end,
                link_format,
            )?),
            Action::Download(options) => Outcome::Downloaded(
                self.download_and_extract(&catalog, request.start, request.end, options)
                    .await?,
            ),
        };

        self.monitor.log_final_stats();
        Ok(outcome)
    }
}
