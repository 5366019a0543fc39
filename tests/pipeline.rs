// tests/pipeline.rs

//! Integration tests for the recipe data and the source stage.
//!
//! These tests verify that:
//! 1. The embedded recipe yields a deterministic URL and digest
//! 2. The CMake definition map pins every auto-detected dependency off
//! 3. The source cache serves verified archives without touching the
//!    network, and rejects corrupted entries
//! 4. A fetch that fails or serves the wrong bytes leaves nothing
//!    behind in the cache
//!
//! The full build path (cmake configure/build/install) needs a toolchain
//! and the real tarball, so it is not exercised here.

use mongoc_recipe::{CMakeConfig, Error, Os, Recipe, RecipeOptions, Settings, source};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use tempfile::TempDir;

#[test]
fn test_builtin_recipe_is_deterministic() {
    let a = Recipe::builtin().unwrap();
    let b = Recipe::builtin().unwrap();

    assert_eq!(a.archive_url(), b.archive_url());
    assert_eq!(a.source.checksum, b.source.checksum);
    assert_eq!(
        a.archive_url(),
        "https://github.com/mongodb/mongo-c-driver/releases/download/1.16.1/mongo-c-driver-1.16.1.tar.gz"
    );
}

#[test]
fn test_builtin_recipe_checksum_well_formed() {
    let recipe = Recipe::builtin().unwrap();
    let (algo, digest) = recipe.checksum_parts().unwrap();
    assert_eq!(algo, "sha256");
    assert_eq!(digest.len(), 64);
}

#[test]
fn test_definition_map_disables_autodetection() {
    let mut settings = Settings::for_os(Os::Linux).unwrap();
    settings.strip_cxx();

    let config = CMakeConfig::prepare(&settings, &RecipeOptions::default());

    // Every auto-detected optional dependency must be pinned off so the
    // artifact ABI does not depend on the host machine
    for key in [
        "ENABLE_SASL",
        "ENABLE_SNAPPY",
        "ENABLE_ZSTD",
        "ENABLE_SRV",
        "ENABLE_SHM_COUNTERS",
        "ENABLE_TESTS",
        "ENABLE_EXAMPLES",
        "ENABLE_AUTOMATIC_INIT_AND_CLEANUP",
    ] {
        assert_eq!(config.get(key), Some("OFF"));
    }

    assert_eq!(config.get("ENABLE_BSON"), Some("ON"));
    assert_eq!(config.get("ENABLE_ZLIB"), Some("BUNDLED"));
    assert_eq!(config.get("ENABLE_STATIC"), Some("ON"));
}

#[test]
fn test_definition_map_static_shared_symmetry() {
    let settings = Settings::for_os(Os::Linux).unwrap();

    for shared in [false, true] {
        let options = RecipeOptions {
            shared,
            ..Default::default()
        };
        let config = CMakeConfig::prepare(&settings, &options);
        let expected = if shared { "OFF" } else { "ON" };
        assert_eq!(config.get("ENABLE_STATIC"), Some(expected));
    }
}

/// Recipe pointing at an arbitrary archive URL
fn recipe_at(archive: &str, digest: &str) -> Recipe {
    Recipe::parse(&format!(
        r#"
[package]
name = "offline"
version = "0.1"

[source]
archive = "{archive}"
checksum = "sha256:{digest}"
extract_dir = "offline-%(version)s"
"#
    ))
    .unwrap()
}

/// Recipe pointing at an unreachable host, used to prove the cache is
/// consulted before the network
fn offline_recipe(digest: &str) -> Recipe {
    recipe_at("https://host.invalid/offline-%(version)s.tar.gz", digest)
}

/// Bind a local port and answer the first request with `respond`,
/// returning the base URL to hit
fn serve_once<F>(respond: F) -> String
where
    F: FnOnce(&mut TcpStream) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut request = [0u8; 1024];
            let _ = stream.read(&mut request);
            respond(&mut stream);
        }
    });

    format!("http://{addr}")
}

#[test]
fn test_cache_hit_avoids_network() {
    let cache = TempDir::new().unwrap();
    let payload = b"pre-fetched archive";
    let digest = hex::encode(Sha256::digest(payload));

    fs::write(cache.path().join(format!("sha256_{}", digest)), payload).unwrap();

    let recipe = offline_recipe(&digest);
    let path = source::fetch_source(&recipe, cache.path()).unwrap();
    assert_eq!(fs::read(path).unwrap(), payload);
}

#[test]
fn test_corrupt_cache_entry_rejected() {
    let cache = TempDir::new().unwrap();
    let digest = "f".repeat(64);

    let entry = cache.path().join(format!("sha256_{}", digest));
    fs::write(&entry, b"tampered").unwrap();

    // The entry is discarded; the re-download then fails because the
    // host does not exist, which is the fatal path we expect
    let recipe = offline_recipe(&digest);
    assert!(source::fetch_source(&recipe, cache.path()).is_err());
    assert!(!entry.exists());
}

#[test]
fn test_wrong_archive_bytes_rejected() {
    let cache = TempDir::new().unwrap();

    // The server answers with bytes whose digest is not the pinned one
    let body = b"not the pinned archive";
    let url = serve_once(move |stream| {
        let _ = write!(
            stream,
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        let _ = stream.write_all(body);
    });

    let recipe = recipe_at(&format!("{url}/offline-%(version)s.tar.gz"), &"a".repeat(64));
    let result = source::fetch_source(&recipe, cache.path());
    assert!(matches!(result, Err(Error::ChecksumMismatch { .. })));

    // The bad download was deleted, not cached
    let leftovers: Vec<_> = fs::read_dir(cache.path()).unwrap().collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_interrupted_download_leaves_no_cache_residue() {
    let cache = TempDir::new().unwrap();

    // Chunked response with no terminating chunk: the connection drops
    // mid-body and the stream read fails partway through
    let url = serve_once(|stream| {
        let _ = stream.write_all(
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n5\r\nhello\r\n",
        );
        let _ = stream.shutdown(std::net::Shutdown::Both);
    });

    let recipe = recipe_at(&format!("{url}/offline-%(version)s.tar.gz"), &"a".repeat(64));
    assert!(source::fetch_source(&recipe, cache.path()).is_err());

    // No partial download survives the failure
    let leftovers: Vec<_> = fs::read_dir(cache.path()).unwrap().collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_fetch_failure_leaves_no_cache_residue() {
    let cache = TempDir::new().unwrap();

    // Unreachable host and nothing cached: the fetch fails outright
    let recipe = offline_recipe(&"a".repeat(64));
    let result = source::fetch_source(&recipe, cache.path());
    assert!(result.is_err());

    // Nothing was left behind in the cache
    let leftovers: Vec<_> = fs::read_dir(cache.path()).unwrap().collect();
    assert!(leftovers.is_empty());
}
