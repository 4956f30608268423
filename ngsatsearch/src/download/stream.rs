//! Chunked streaming of a response body to disk.
//!
//! Bodies are written to a `<dest>.part` sibling and renamed into place once
//! complete, so a file at `dest` is always a finished download. Any failure
//! removes the partial file.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, warn};

use super::outcome::DownloadOutcome;
use super::progress::ProgressCallback;
use crate::error::{CatalogError, CatalogResult};
use crate::http::{HttpClient, HttpRequest, HttpResponse};

/// Bytes read from the network per iteration.
pub const CHUNK_SIZE: usize = 4096;

/// Streams `response` into `dest`, returning the number of bytes written.
///
/// Read failures surface as [`CatalogError::Connection`], write failures as
/// [`CatalogError::Io`]. In both cases nothing is left at `dest`.
pub fn stream_to_file(
    response: HttpResponse,
    dest: &Path,
    progress: Option<&ProgressCallback>,
) -> CatalogResult<u64> {
    let part = part_path(dest);
    let result = write_part(response, dest, &part, progress).and_then(|written| {
        fs::rename(&part, dest)
            .map(|_| written)
            .map_err(|e| CatalogError::io(dest, e))
    });

    if result.is_err() && part.exists() {
        if let Err(e) = fs::remove_file(&part) {
            warn!(path = %part.display(), error = %e, "failed to remove partial download");
        }
    }
    result
}

fn write_part(
    response: HttpResponse,
    dest: &Path,
    part: &Path,
    progress: Option<&ProgressCallback>,
) -> CatalogResult<u64> {
    let filename = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let total = response.content_length;
    let mut body = response.into_body();

    let file = File::create(part).map_err(|e| CatalogError::io(part, e))?;
    let mut writer = BufWriter::new(file);
    let mut buffer = [0u8; CHUNK_SIZE];
    let mut written: u64 = 0;

    loop {
        let bytes_read = body
            .read(&mut buffer)
            .map_err(|e| CatalogError::Connection(format!("read error while downloading {}: {}", filename, e)))?;
        if bytes_read == 0 {
            break;
        }

        writer
            .write_all(&buffer[..bytes_read])
            .map_err(|e| CatalogError::io(part, e))?;
        written += bytes_read as u64;

        if let Some(cb) = progress {
            cb(&filename, written, total);
        }
    }

    writer.flush().map_err(|e| CatalogError::io(part, e))?;
    Ok(written)
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(OsString::from).unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

/// Downloads one asset to `dest`.
///
/// Status errors from the transport (authorization, not found, ...)
/// propagate; a failure while streaming degrades to an `error` outcome.
pub fn download_single<C: HttpClient + ?Sized>(
    client: &C,
    request: &HttpRequest,
    dest: &Path,
    progress: Option<&ProgressCallback>,
) -> CatalogResult<DownloadOutcome> {
    let filename = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    debug!(url = %request.url, dest = %dest.display(), "starting download");
    let response = client.get(request)?.error_for_status("download")?;

    let started = Instant::now();
    match stream_to_file(response, dest, progress) {
        Ok(bytes) => {
            info!(
                file = %filename,
                bytes,
                elapsed_secs = started.elapsed().as_secs_f64(),
                "download complete"
            );
            Ok(DownloadOutcome::ok(vec![filename]))
        }
        Err(e) => {
            warn!(file = %filename, error = %e, "download failed");
            Ok(DownloadOutcome::nothing_downloaded())
        }
    }
}
