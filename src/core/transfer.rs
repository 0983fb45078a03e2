use crate::utils::error::{RetrievalError, Result};
use reqwest::Client;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info};

pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Streams `url` into `destination`, replacing whatever was there.
///
/// The body is written as it arrives, `chunk_size` bytes at a time, so an
/// archive is never held in memory as a whole. Returns the number of bytes
/// written.
pub async fn download(
    client: &Client,
    url: &str,
    destination: &Path,
    chunk_size: usize,
) -> Result<u64> {
    let mut response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(RetrievalError::TransferError {
            url: url.to_string(),
            message: status.to_string(),
        });
    }

    info!("Saving {} as {}", url, destination.display());

    let chunk_size = chunk_size.max(1);
    let file = File::create(destination).await?;
    let mut writer = BufWriter::with_capacity(chunk_size, file);
    let mut written = 0u64;

    while let Some(chunk) = response.chunk().await? {
        // Network chunks can be any size; split them to the configured one
        for piece in chunk.chunks(chunk_size) {
            writer.write_all(piece).await?;
            written += piece.len() as u64;
        }
    }

    writer.flush().await?;
    writer.into_inner().sync_all().await?;

    debug!("Wrote {} bytes to {}", written, destination.display());
    Ok(written)
}
