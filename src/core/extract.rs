//! Gzip-tar extraction that refuses archives with members escaping the
//! archive's own directory.
//!
//! Every member is checked before anything is written: a single offending
//! path rejects the whole archive.

use crate::utils::error::{RetrievalError, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::path::{Component, Path, PathBuf};
use tar::Archive;
use tracing::{debug, info};

fn open_archive(archive_path: &Path) -> Result<Archive<GzDecoder<File>>> {
    let file = File::open(archive_path)?;
    Ok(Archive::new(GzDecoder::new(file)))
}

/// Resolves `.` and `..` without touching the file system.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Whether `directory/target` stays inside `directory`. Containment is
/// judged per path component, so `/data/out` does not contain `/data/outside`.
pub fn is_within_directory(directory: &Path, target: &Path) -> bool {
    let directory = normalize(directory);
    normalize(&directory.join(target)).starts_with(&directory)
}

/// Directory the archive is unpacked into: the one holding the archive.
fn target_directory(archive_path: &Path) -> Result<PathBuf> {
    let parent = match archive_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok(normalize(&std::path::absolute(parent)?))
}

fn check_members(archive_path: &Path, target: &Path) -> Result<Vec<PathBuf>> {
    let mut archive = open_archive(archive_path)?;
    let mut members = Vec::new();

    let traversal = |member: &Path| RetrievalError::PathTraversalError {
        archive: archive_path.to_path_buf(),
        target: target.to_path_buf(),
        member: member.display().to_string(),
    };

    for entry in archive.entries()? {
        let entry = entry?;
        let member = entry.path()?.into_owned();
        if !is_within_directory(target, &member) {
            return Err(traversal(&member));
        }

        let entry_type = entry.header().entry_type();
        if entry_type.is_symlink() || entry_type.is_hard_link() {
            if let Some(link) = entry.link_name()? {
                // Symlinks resolve next to the member, hard links from the archive root
                let base = if entry_type.is_symlink() {
                    member.parent().map(Path::to_path_buf).unwrap_or_default()
                } else {
                    PathBuf::new()
                };
                if !is_within_directory(target, &base.join(&link)) {
                    return Err(traversal(&member));
                }
            }
        }

        members.push(member);
    }

    Ok(members)
}

/// Unpacks a `.tgz` next to itself and returns the member paths.
///
/// Fails with [`RetrievalError::PathTraversalError`] without writing anything
/// if any member would land outside the archive's directory. With
/// `delete_after` the archive is removed once every member is written.
pub fn extract_archive(archive_path: &Path, delete_after: bool) -> Result<Vec<PathBuf>> {
    let target = target_directory(archive_path)?;
    info!("Extracting {}", archive_path.display());

    let members = check_members(archive_path, &target)?;
    debug!(
        "{} members of {} verified inside {}",
        members.len(),
        archive_path.display(),
        target.display()
    );

    open_archive(archive_path)?.unpack(&target)?;

    if delete_after {
        info!("Deleting {}", archive_path.display());
        std::fs::remove_file(archive_path)?;
    }

    Ok(members)
}
