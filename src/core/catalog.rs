//! Dash REST client: dataset identifier → newest version → paginated file listing.
//!
//! The service speaks HAL-flavoured JSON: collections live under `_embedded`
//! and navigation under `_links`. Only the fields the catalog needs are
//! modelled; anything else in the payload is ignored.

use crate::domain::model::{DatasetId, FileCatalog, VersionDescriptor};
use crate::utils::error::{RetrievalError, Result};
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_DASH_ROOT: &str = "https://dash.ucop.edu";

/// Characters escaped before an identifier is placed in a request path.
const PATH_ESCAPES: &[(char, &str)] = &[(':', "%3A"), ('/', "%2F")];

#[derive(Debug, Deserialize)]
struct Link {
    href: String,
}

#[derive(Debug, Deserialize)]
struct VersionList {
    #[serde(rename = "_embedded")]
    embedded: VersionListEmbedded,
}

#[derive(Debug, Deserialize)]
struct VersionListEmbedded {
    #[serde(rename = "stash:versions", default)]
    versions: Vec<VersionRecord>,
}

#[derive(Debug, Deserialize)]
struct VersionRecord {
    #[serde(rename = "versionNumber")]
    version_number: i64,
    #[serde(rename = "_links")]
    links: VersionLinks,
}

#[derive(Debug, Deserialize)]
struct VersionLinks {
    #[serde(rename = "stash:files")]
    files: Link,
}

#[derive(Debug, Deserialize)]
struct FilePage {
    #[serde(rename = "_embedded")]
    embedded: FilePageEmbedded,
    #[serde(rename = "_links", default)]
    links: PageLinks,
}

#[derive(Debug, Deserialize)]
struct FilePageEmbedded {
    #[serde(rename = "stash:files", default)]
    files: Vec<FileRecord>,
}

#[derive(Debug, Default, Deserialize)]
struct PageLinks {
    next: Option<Link>,
}

#[derive(Debug, Deserialize)]
struct FileRecord {
    path: String,
    #[serde(rename = "_links")]
    links: FileLinks,
}

#[derive(Debug, Deserialize)]
struct FileLinks {
    #[serde(rename = "stash:download")]
    download: Link,
}

pub fn encode_identifier(identifier: &str) -> String {
    let mut encoded = String::with_capacity(identifier.len());
    for c in identifier.chars() {
        match PATH_ESCAPES.iter().find(|(reserved, _)| *reserved == c) {
            Some((_, escape)) => encoded.push_str(escape),
            None => encoded.push(c),
        }
    }
    encoded
}

/// Highest `version_number`; the earliest in list order wins a tie.
pub fn newest_version(versions: &[VersionDescriptor]) -> Option<&VersionDescriptor> {
    versions.iter().fold(None, |best, candidate| match best {
        Some(current) if current.version_number >= candidate.version_number => Some(current),
        _ => Some(candidate),
    })
}

#[derive(Debug, Clone)]
pub struct DashClient {
    client: Client,
    root: Url,
}

impl DashClient {
    pub fn new(client: Client, root: &str) -> Result<Self> {
        let root = Url::parse(root).map_err(|e| RetrievalError::InvalidConfigValueError {
            field: "service.root".to_string(),
            value: root.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;
        Ok(Self { client, root })
    }

    /// Links handed out by the service are usually root-relative paths.
    fn resolve_href(&self, href: &str) -> Result<Url> {
        self.root.join(href).map_err(|e| {
            RetrievalError::resolution(format!("invalid link {:?} in response: {}", href, e))
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        debug!("Requesting {}", url);
        let response = self
            .client
            .get(url.clone())
            .query(&[("accept", "application/json")])
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RetrievalError::TransferError {
                url: url.to_string(),
                message: status.to_string(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| {
            RetrievalError::resolution(format!("unexpected response shape from {}: {}", url, e))
        })
    }

    pub async fn versions(&self, dataset: &DatasetId) -> Result<Vec<VersionDescriptor>> {
        let base = self.root.as_str().trim_end_matches('/');
        let url = format!(
            "{}/api/datasets/{}/versions",
            base,
            encode_identifier(dataset.as_str())
        );
        let url = Url::parse(&url)
            .map_err(|e| RetrievalError::resolution(format!("invalid versions URL {}: {}", url, e)))?;

        let list: VersionList = self.get_json(&url).await?;
        Ok(list
            .embedded
            .versions
            .into_iter()
            .map(|record| VersionDescriptor {
                version_number: record.version_number,
                files_link: record.links.files.href,
            })
            .collect())
    }

    /// Walks every page of a version's file listing, following `next` links
    /// until a page has none.
    pub async fn list_files(&self, files_link: &str) -> Result<FileCatalog> {
        let mut catalog = FileCatalog::new();
        let mut visited = HashSet::new();
        let mut next_page = Some(self.resolve_href(files_link)?);
        let mut pages = 0usize;

        while let Some(page_url) = next_page.take() {
            if !visited.insert(page_url.clone()) {
                return Err(RetrievalError::resolution(format!(
                    "file listing loops back to already visited page {}",
                    page_url
                )));
            }

            let page: FilePage = self.get_json(&page_url).await?;
            pages += 1;
            debug!(
                "Page {} listed {} files",
                pages,
                page.embedded.files.len()
            );

            for record in page.embedded.files {
                let url = self.resolve_href(&record.links.download.href)?;
                catalog.insert(record.path, url.to_string());
            }

            if let Some(next) = page.links.next {
                next_page = Some(self.resolve_href(&next.href)?);
            }
        }

        debug!("File listing complete after {} pages", pages);
        Ok(catalog)
    }

    pub async fn resolve(&self, dataset: &DatasetId) -> Result<FileCatalog> {
        let versions = self.versions(dataset).await?;
        let newest = newest_version(&versions).ok_or_else(|| {
            RetrievalError::resolution(format!("failed to find the newest version of {}", dataset))
        })?;

        info!(
            "Using version {} of {} ({} versions listed)",
            newest.version_number,
            dataset,
            versions.len()
        );

        let catalog = self.list_files(&newest.files_link).await?;
        info!("Catalog for {} holds {} files", dataset, catalog.len());
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn version(number: i64, link: &str) -> VersionDescriptor {
        VersionDescriptor {
            version_number: number,
            files_link: link.to_string(),
        }
    }

    #[test]
    fn test_encode_identifier() {
        assert_eq!(encode_identifier("doi:10.6078/D12D5X"), "doi%3A10.6078%2FD12D5X");
        assert_eq!(encode_identifier("plain"), "plain");
    }

    #[test]
    fn test_newest_version_picks_maximum() {
        let versions = vec![version(1, "url1"), version(3, "url2"), version(2, "url3")];
        assert_eq!(newest_version(&versions).unwrap().files_link, "url2");
    }

    #[test]
    fn test_newest_version_tie_keeps_first() {
        let versions = vec![version(2, "first"), version(2, "second"), version(1, "old")];
        assert_eq!(newest_version(&versions).unwrap().files_link, "first");
    }

    #[test]
    fn test_newest_version_empty() {
        assert!(newest_version(&[]).is_none());
    }

    #[tokio::test]
    async fn test_versions_request_for_dataset() {
        let server = MockServer::start();
        let versions_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/datasets/doi%3A10.6078%2FD12D5X/versions")
                .query_param("accept", "application/json");
            then.status(200).json_body(serde_json::json!({
                "_embedded": {"stash:versions": [
                    {"versionNumber": 1, "_links": {"stash:files": {"href": "/api/versions/1/files"}}}
                ]}
            }));
        });

        let client = DashClient::new(Client::new(), &server.base_url()).unwrap();
        let dataset = crate::domain::model::DatasetRegistry::default()
            .resolve("daily-gridded")
            .unwrap();
        let versions = client.versions(&dataset).await.unwrap();

        versions_mock.assert();
        assert_eq!(versions, vec![version(1, "/api/versions/1/files")]);
    }

    #[tokio::test]
    async fn test_malformed_listing_is_resolution_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/versions/1/files");
            then.status(200).json_body(serde_json::json!({"unexpected": true}));
        });

        let client = DashClient::new(Client::new(), &server.base_url()).unwrap();
        let err = client.list_files("/api/versions/1/files").await.unwrap_err();
        assert!(matches!(err, RetrievalError::ResolutionError { .. }));
    }

    #[tokio::test]
    async fn test_listing_failure_status_is_transfer_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/versions/1/files");
            then.status(503);
        });

        let client = DashClient::new(Client::new(), &server.base_url()).unwrap();
        let err = client.list_files("/api/versions/1/files").await.unwrap_err();
        assert!(matches!(err, RetrievalError::TransferError { .. }));
    }

    #[tokio::test]
    async fn test_self_referencing_next_link_is_rejected() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/versions/1/files");
            then.status(200).json_body(serde_json::json!({
                "_embedded": {"stash:files": []},
                "_links": {"next": {"href": "/api/versions/1/files"}}
            }));
        });

        let client = DashClient::new(Client::new(), &server.base_url()).unwrap();
        let err = client.list_files("/api/versions/1/files").await.unwrap_err();
        assert!(matches!(err, RetrievalError::ResolutionError { .. }));
    }
}
