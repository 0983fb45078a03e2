#![allow(dead_code)]

use behr_downloader::TomlConfig;
use flate2::write::GzEncoder;
use flate2::Compression;
use httpmock::prelude::*;
use httpmock::Mock;

pub fn config_for(server: &MockServer) -> TomlConfig {
    let mut config = TomlConfig::default();
    config.service.root = server.base_url();
    config
}

/// Gzip-tar with the given regular-file members and their text contents.
pub fn tgz_bytes(members: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (name, data) in members {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, data.as_bytes()).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// Gzip-tar whose member names bypass the builder's path checks.
pub fn hostile_tgz_bytes(members: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (name, data) in members {
        let mut header = tar::Header::new_gnu();
        header.as_old_mut().name[..name.len()].copy_from_slice(name.as_bytes());
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append(&header, data.as_bytes()).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// Versions listing for the daily gridded dataset, newest version in the middle.
pub fn mock_versions<'a>(server: &'a MockServer) -> Mock<'a> {
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/datasets/doi%3A10.6078%2FD12D5X/versions");
        then.status(200).json_body(serde_json::json!({
            "_links": {"self": {"href": "/api/datasets/doi%3A10.6078%2FD12D5X/versions"}},
            "_embedded": {"stash:versions": [
                {"versionNumber": 1, "_links": {"stash:files": {"href": "/api/versions/101/files"}}},
                {"versionNumber": 3, "_links": {"stash:files": {"href": "/api/versions/103/files?page=1"}}},
                {"versionNumber": 2, "_links": {"stash:files": {"href": "/api/versions/102/files"}}}
            ]}
        }));
    })
}

fn file_record(name: &str, download: &str) -> serde_json::Value {
    serde_json::json!({
        "path": name,
        "size": 1024,
        "mimeType": "application/x-gzip",
        "_links": {"stash:download": {"href": download}}
    })
}

/// Two listing pages for version 3.
pub fn mock_file_pages<'a>(server: &'a MockServer) -> (Mock<'a>, Mock<'a>) {
    let first = server.mock(|when, then| {
        when.method(GET)
            .path("/api/versions/103/files")
            .query_param("page", "1");
        then.status(200).json_body(serde_json::json!({
            "_links": {
                "self": {"href": "/api/versions/103/files?page=1"},
                "next": {"href": "/api/versions/103/files?page=2"}
            },
            "_embedded": {"stash:files": [
                file_record("OMI_BEHR-DAILY_US_v3-0B_200501.tgz", "/api/downloads/501"),
                file_record("OMI_BEHR-DAILY_US_v3-0B_200502.tgz", "/api/downloads/502")
            ]}
        }));
    });

    let second = server.mock(|when, then| {
        when.method(GET)
            .path("/api/versions/103/files")
            .query_param("page", "2");
        then.status(200).json_body(serde_json::json!({
            "_links": {"self": {"href": "/api/versions/103/files?page=2"}},
            "_embedded": {"stash:files": [
                file_record("OMI_BEHR-DAILY_US_v3-0B_200504.tgz", "/api/downloads/504"),
                file_record("README.txt", "/api/downloads/1")
            ]}
        }));
    });

    (first, second)
}
