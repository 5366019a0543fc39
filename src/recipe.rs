// src/recipe.rs

//! Recipe file format
//!
//! A recipe is a TOML file describing what to fetch and how to label the
//! result: package metadata, a versioned source archive with its pinned
//! checksum, and the license files to ship with the package. The recipe
//! for the MongoDB C driver is embedded at compile time.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// The embedded recipe this tool exists to execute
const MONGO_C_DRIVER: &str = include_str!("../recipes/mongo-c-driver.toml");

/// A complete recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// Package metadata
    pub package: PackageSection,

    /// Source archive and its checksum
    pub source: SourceSection,

    /// License files to copy into the package
    #[serde(default)]
    pub licenses: LicenseSection,
}

impl Recipe {
    /// Parse the embedded mongo-c-driver recipe
    pub fn builtin() -> Result<Self> {
        Self::parse(MONGO_C_DRIVER)
    }

    /// Parse a recipe from TOML text
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Parse(format!("invalid recipe: {}", e)))
    }

    /// Substitute `%(version)s` in a template string
    pub fn substitute(&self, template: &str) -> String {
        template.replace("%(version)s", &self.package.version)
    }

    /// The archive URL with the pinned version substituted
    pub fn archive_url(&self) -> String {
        self.substitute(&self.source.archive)
    }

    /// The archive filename, taken from the URL's last path segment
    pub fn archive_filename(&self) -> String {
        self.archive_url()
            .split('/')
            .next_back()
            .unwrap_or("source.tar.gz")
            .to_string()
    }

    /// Directory name the archive extracts to
    pub fn extract_dir(&self) -> String {
        self.substitute(&self.source.extract_dir)
    }

    /// The checksum split into (algorithm, hex digest)
    pub fn checksum_parts(&self) -> Result<(&str, &str)> {
        self.source
            .checksum
            .split_once(':')
            .ok_or_else(|| Error::Parse(format!("invalid checksum: {}", self.source.checksum)))
    }
}

/// Package metadata section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSection {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
}

/// Source archive section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSection {
    /// Archive URL template; supports `%(version)s` substitution
    pub archive: String,

    /// Pinned checksum in `algorithm:hexdigest` form (sha256 only)
    pub checksum: String,

    /// Directory name the archive unpacks to; supports `%(version)s`
    pub extract_dir: String,
}

/// License files to ship with the package
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LicenseSection {
    /// Filename patterns matched at the source tree root (`*` suffix
    /// wildcard only)
    #[serde(default)]
    pub patterns: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_recipe_parses() {
        let recipe = Recipe::builtin().unwrap();
        assert_eq!(recipe.package.name, "mongo-c-driver");
        assert_eq!(recipe.package.version, "1.16.1");
        assert_eq!(recipe.package.license.as_deref(), Some("Apache-2.0"));
        assert!(!recipe.licenses.patterns.is_empty());
    }

    #[test]
    fn test_archive_url_substitution() {
        let recipe = Recipe::builtin().unwrap();
        let url = recipe.archive_url();
        assert!(url.contains("1.16.1"));
        assert!(!url.contains("%(version)s"));
        assert!(url.starts_with("https://"));
    }

    #[test]
    fn test_archive_filename() {
        let recipe = Recipe::builtin().unwrap();
        assert_eq!(recipe.archive_filename(), "mongo-c-driver-1.16.1.tar.gz");
    }

    #[test]
    fn test_extract_dir() {
        let recipe = Recipe::builtin().unwrap();
        assert_eq!(recipe.extract_dir(), "mongo-c-driver-1.16.1");
    }

    #[test]
    fn test_checksum_is_full_sha256() {
        let recipe = Recipe::builtin().unwrap();
        let (algo, digest) = recipe.checksum_parts().unwrap();
        assert_eq!(algo, "sha256");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_url_and_checksum_deterministic() {
        // Repeated parses of the same recipe yield identical fetch inputs
        let a = Recipe::builtin().unwrap();
        let b = Recipe::builtin().unwrap();
        assert_eq!(a.archive_url(), b.archive_url());
        assert_eq!(a.source.checksum, b.source.checksum);
    }

    #[test]
    fn test_invalid_checksum_rejected() {
        let recipe = Recipe::parse(
            r#"
[package]
name = "x"
version = "1.0"

[source]
archive = "https://example.com/x-1.0.tar.gz"
checksum = "nocolon"
extract_dir = "x-1.0"
"#,
        )
        .unwrap();
        assert!(recipe.checksum_parts().is_err());
    }
}
