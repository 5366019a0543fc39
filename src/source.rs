// src/source.rs

//! Source acquisition: download, verify, cache, extract
//!
//! Archives are fetched over HTTPS, verified against the recipe's pinned
//! SHA-256 digest, and cached keyed by that digest. A checksum mismatch
//! is fatal: the bad download is deleted and the error surfaces to the
//! caller with no retry.

use crate::error::{Error, Result};
use crate::recipe::Recipe;
use flate2::read::GzDecoder;
use indicatif::{ProgressBar, ProgressStyle};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tar::Archive;
use tracing::{debug, info, warn};

/// Default timeout for HTTP requests
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Buffer size for streaming downloads (8 KB)
const STREAM_BUFFER_SIZE: usize = 8192;

/// Canonical name of the source directory after extraction
pub const SOURCE_DIR: &str = "src";

/// Fetch a recipe's source archive into the cache, verifying its digest.
///
/// The cache is keyed by the pinned digest. A cached file is re-verified
/// before reuse; a corrupt entry is discarded and re-downloaded.
pub fn fetch_source(recipe: &Recipe, cache_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(cache_dir)?;

    let (algorithm, expected) = recipe.checksum_parts()?;
    if algorithm != "sha256" {
        return Err(Error::Unsupported(format!(
            "checksum algorithm: {} (only sha256)",
            algorithm
        )));
    }

    let cached_path = cache_dir.join(format!("{}_{}", algorithm, expected));

    if cached_path.exists() {
        debug!("Using cached source: {}", cached_path.display());
        let actual = sha256_file(&cached_path)?;
        if actual == expected {
            return Ok(cached_path);
        }
        warn!("Cached archive digest mismatch, re-downloading");
        fs::remove_file(&cached_path)?;
    }

    let url = recipe.archive_url();
    info!("Downloading: {}", url);

    let temp_path = cache_dir.join(format!("{}.tmp", expected));
    download_file(&url, &temp_path, &recipe.archive_filename())?;

    let actual = sha256_file(&temp_path)?;
    if actual != expected {
        fs::remove_file(&temp_path)?;
        return Err(Error::ChecksumMismatch {
            expected: expected.to_string(),
            actual,
        });
    }
    debug!("Digest verified: {}", expected);

    fs::rename(&temp_path, &cached_path)?;
    Ok(cached_path)
}

/// Download a URL to a file, streaming with a progress bar.
///
/// A download that fails mid-stream removes its partial file so the
/// cache directory never accumulates residue.
fn download_file(url: &str, dest: &Path, display_name: &str) -> Result<()> {
    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()?;

    let mut response = client.get(url).send()?;

    if !response.status().is_success() {
        return Err(Error::Download(format!(
            "{} returned HTTP {}",
            url,
            response.status()
        )));
    }

    let total_size = response.content_length().unwrap_or(0);
    let progress = progress_bar(total_size, display_name);

    let result = stream_to_file(&mut response, dest, &progress);
    progress.finish_and_clear();

    match result {
        Ok(downloaded) => {
            info!("Downloaded {} bytes to {}", downloaded, dest.display());
            Ok(())
        }
        Err(e) => {
            let _ = fs::remove_file(dest);
            Err(e)
        }
    }
}

/// Stream a response body into a file, returning the bytes written
fn stream_to_file(
    response: &mut reqwest::blocking::Response,
    dest: &Path,
    progress: &ProgressBar,
) -> Result<u64> {
    let mut file = File::create(dest)?;
    let mut buffer = [0u8; STREAM_BUFFER_SIZE];
    let mut downloaded: u64 = 0;

    loop {
        let bytes_read = response.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        file.write_all(&buffer[..bytes_read])?;
        downloaded += bytes_read as u64;
        progress.set_position(downloaded);
    }

    Ok(downloaded)
}

fn progress_bar(total_size: u64, display_name: &str) -> ProgressBar {
    let pb = if total_size > 0 {
        let pb = ProgressBar::new(total_size);
        pb.set_style(
            ProgressStyle::with_template(
                "{msg} [{bar:40}] {bytes}/{total_bytes} ({bytes_per_sec})",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb
    } else {
        ProgressBar::new_spinner()
    };
    pb.set_message(display_name.to_string());
    pb
}

/// Compute the SHA-256 digest of a file as lowercase hex
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = BufReader::new(File::open(path)?);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; STREAM_BUFFER_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Extract the archive into `work_dir` and rename the versioned top-level
/// directory to the canonical `src` name.
///
/// Returns the path to the canonical source directory.
pub fn unpack(recipe: &Recipe, archive_path: &Path, work_dir: &Path) -> Result<PathBuf> {
    extract_tar_gz(archive_path, work_dir)?;

    let extracted = work_dir.join(recipe.extract_dir());
    if !extracted.is_dir() {
        return Err(Error::NotFound(extracted));
    }

    let canonical = work_dir.join(SOURCE_DIR);
    fs::rename(&extracted, &canonical)?;
    info!("Extracted source to {}", canonical.display());

    Ok(canonical)
}

/// Extract a `.tar.gz` archive into the destination directory
fn extract_tar_gz(archive_path: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest)?;

    let file = File::open(archive_path)?;
    let decoder = GzDecoder::new(BufReader::new(file));
    let mut archive = Archive::new(decoder);
    archive.unpack(dest)?;

    Ok(())
}
